use stagehand_core::outcome::BuildOutcome;

#[test]
fn test_outcome_starts_successful() {
    assert!(!BuildOutcome::new().is_failure());
}

#[test]
fn test_successful_tasks_keep_success() {
    let outcome = BuildOutcome::new();
    assert!(!outcome.record(":lib:jar", true));
    assert!(!outcome.record(":app:jar", true));
    assert!(!outcome.is_failure());
}

#[test]
fn test_first_failure_flips_permanently() {
    let outcome = BuildOutcome::new();
    assert!(outcome.record(":lib:compile", false));
    assert!(!outcome.record(":app:compile", false));
    assert!(!outcome.record(":app:jar", true));
    assert!(outcome.is_failure());
}
