use std::collections::BTreeMap;
use std::path::Path;

use stagehand_util::errors::StagehandError;

/// File name of the per-directory secrets file.
pub const ENV_FILE_NAME: &str = ".stagehand.env";

/// Loads a `.stagehand.env` file (shell-style `KEY=value` format).
///
/// The file typically holds the portal user token or Nexus password so they
/// stay out of `config.toml`. Values feed `${env:VAR}` interpolation.
/// A missing file yields an empty map.
pub fn load_env_file(path: &Path) -> Result<BTreeMap<String, String>, StagehandError> {
    let mut map = BTreeMap::new();
    if !path.is_file() {
        return Ok(map);
    }
    let content = std::fs::read_to_string(path)?;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
        if let Some((key, value)) = trimmed.split_once('=') {
            let value = value.trim().trim_matches('"');
            map.insert(key.trim().to_string(), value.to_string());
        }
    }
    Ok(map)
}

/// Interpolate `${env:VAR}` references in a string.
///
/// Looks up values first from `env_overrides` (populated from
/// `.stagehand.env`), then from the process environment. Unknown keys expand
/// to the empty string.
pub fn interpolate(input: &str, env_overrides: &BTreeMap<String, String>) -> String {
    let mut result = input.to_string();
    while let Some(start) = result.find("${env:") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let end = start + end;
        let key = &result[start + 6..end];
        let value = env_overrides
            .get(key)
            .cloned()
            .or_else(|| std::env::var(key).ok())
            .unwrap_or_default();
        result.replace_range(start..=end, &value);
    }
    result
}
