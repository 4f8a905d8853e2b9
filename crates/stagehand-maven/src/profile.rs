//! Staging profile resolution: map a Maven group to the account's profile.

use serde::{Deserialize, Serialize};
use stagehand_util::errors::StagehandError;

/// A namespace-scoped publishing permission on the Nexus account.
///
/// `name` is normally a reversed-domain group such as `com.example`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingProfile {
    pub id: String,
    pub name: String,
}

/// Pick the staging profile responsible for `group`.
///
/// A single profile is returned unconditionally. Otherwise an exact name
/// match wins, then the longest profile name that is a prefix of `group`
/// (first one on ties).
pub fn resolve_profile<'a>(
    profiles: &'a [StagingProfile],
    group: &str,
) -> Result<&'a StagingProfile, StagehandError> {
    match profiles {
        [] => return Err(StagehandError::NoProfilesFound),
        [only] => return Ok(only),
        _ => {}
    }

    if let Some(exact) = profiles.iter().find(|p| p.name == group) {
        return Ok(exact);
    }

    let mut best: Option<&StagingProfile> = None;
    for profile in profiles.iter().filter(|p| group.starts_with(p.name.as_str())) {
        let longer = best.map_or(true, |b| {
            common_prefix_len(&profile.name, group) > common_prefix_len(&b.name, group)
        });
        if longer {
            best = Some(profile);
        }
    }

    best.ok_or_else(|| StagehandError::NoMatchingProfile {
        group: group.to_string(),
        available: profile_names(profiles),
    })
}

/// Find a profile by id or name, for an explicitly configured profile.
pub fn find_profile<'a>(
    profiles: &'a [StagingProfile],
    selector: &str,
) -> Result<&'a StagingProfile, StagehandError> {
    profiles
        .iter()
        .find(|p| p.id == selector || p.name == selector)
        .ok_or_else(|| StagehandError::Configuration {
            message: format!(
                "Configured staging profile '{selector}' does not exist. Available profiles: {}",
                profile_names(profiles)
            ),
        })
}

fn profile_names(profiles: &[StagingProfile]) -> String {
    profiles
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, name: &str) -> StagingProfile {
        StagingProfile {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn empty_list_fails() {
        let err = resolve_profile(&[], "com.example").unwrap_err();
        assert!(matches!(err, StagehandError::NoProfilesFound));
    }

    #[test]
    fn single_profile_returned_unconditionally() {
        let profiles = vec![profile("1", "io.unrelated")];
        assert_eq!(resolve_profile(&profiles, "com.example").unwrap().id, "1");
    }

    #[test]
    fn exact_name_match_wins() {
        let profiles = vec![
            profile("1", "com"),
            profile("2", "com.example"),
            profile("3", "com.example.lib"),
        ];
        for p in &profiles {
            assert_eq!(resolve_profile(&profiles, &p.name).unwrap(), p);
        }
    }

    #[test]
    fn longest_prefix_wins() {
        let profiles = vec![profile("a", "A"), profile("ab", "A.B")];
        assert_eq!(resolve_profile(&profiles, "A.B.C").unwrap().id, "ab");

        let reversed = vec![profile("ab", "A.B"), profile("a", "A")];
        assert_eq!(resolve_profile(&reversed, "A.B.C").unwrap().id, "ab");
    }

    #[test]
    fn ties_pick_first_encountered() {
        let profiles = vec![
            profile("first", "com.example"),
            profile("second", "com.example"),
            profile("other", "org"),
        ];
        assert_eq!(
            resolve_profile(&profiles, "com.example.lib").unwrap().id,
            "first"
        );
    }

    #[test]
    fn no_prefix_match_lists_names() {
        let profiles = vec![profile("1", "com.example"), profile("2", "io.acme")];
        let err = resolve_profile(&profiles, "org.other").unwrap_err();
        assert!(matches!(err, StagehandError::NoMatchingProfile { .. }));
        let msg = err.to_string();
        assert!(msg.contains("com.example"), "got: {msg}");
        assert!(msg.contains("io.acme"), "got: {msg}");
    }

    #[test]
    fn find_profile_by_id_or_name() {
        let profiles = vec![profile("12ab", "com.example"), profile("34cd", "io.acme")];
        assert_eq!(find_profile(&profiles, "34cd").unwrap().name, "io.acme");
        assert_eq!(find_profile(&profiles, "com.example").unwrap().id, "12ab");
        assert!(find_profile(&profiles, "org.none").is_err());
    }
}
