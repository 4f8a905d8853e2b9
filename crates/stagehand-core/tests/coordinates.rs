use stagehand_core::coordinates::MavenCentralCoordinates;

#[test]
fn test_parse_valid_coordinates() {
    let coords: MavenCentralCoordinates = "com.example:core:1.0.0".parse().unwrap();
    assert_eq!(coords.group, "com.example");
    assert_eq!(coords.artifact_id, "core");
    assert_eq!(coords.version, "1.0.0");
}

#[test]
fn test_parse_rejects_missing_parts() {
    assert!("com.example:core".parse::<MavenCentralCoordinates>().is_err());
    assert!("com.example::1.0".parse::<MavenCentralCoordinates>().is_err());
    assert!("a:b:c:d".parse::<MavenCentralCoordinates>().is_err());
}

#[test]
fn test_snapshot_version() {
    let coords: MavenCentralCoordinates = "com.example:core:2.0.0-SNAPSHOT".parse().unwrap();
    assert!(coords.is_snapshot());
}
