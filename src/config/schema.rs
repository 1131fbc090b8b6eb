use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::rubric::ReviewLevel;

pub const DEFAULT_FLASH_DURATION: Duration = Duration::from_secs(3);

/// Contents of config.yaml. Every field is optional.
///
/// Example YAML:
/// ```yaml
/// data_path: /home/me/halaqah/students.json
/// default_level: advanced
/// report_dir: /home/me/halaqah/reports
/// flash_duration: 5s
/// parent_emails:
///   Aisha: parent@example.com
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_level: Option<ReviewLevel>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_dir: Option<String>,

    /// Student name -> parent email, used by the email action
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parent_emails: BTreeMap<String, String>,

    /// How long TUI status messages stay up, e.g. "3s"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flash_duration: Option<String>,
}

impl Config {
    pub fn data_path(&self) -> PathBuf {
        self.data_path
            .as_deref()
            .map(expand_home)
            .unwrap_or_else(crate::storage::get_data_path)
    }

    pub fn default_level(&self) -> ReviewLevel {
        self.default_level.unwrap_or_default()
    }

    pub fn report_dir(&self) -> PathBuf {
        self.report_dir
            .as_deref()
            .map(expand_home)
            .unwrap_or_else(|| super::get_config_dir().join("reports"))
    }

    /// Parent email for a student, matched case-insensitively by name
    pub fn parent_email(&self, student_name: &str) -> Option<&str> {
        self.parent_emails
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(student_name))
            .map(|(_, email)| email.as_str())
    }

    /// Falls back to the default when unset or unparseable (validation reports the latter)
    pub fn flash_duration(&self) -> Duration {
        self.flash_duration
            .as_deref()
            .and_then(|s| humantime::parse_duration(s).ok())
            .unwrap_or(DEFAULT_FLASH_DURATION)
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_defaults() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.default_level(), ReviewLevel::Basic);
        assert_eq!(config.flash_duration(), DEFAULT_FLASH_DURATION);
        assert!(config.data_path().ends_with("students.json"));
        assert!(config.report_dir().ends_with("reports"));
    }

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
data_path: /tmp/halaqah/students.json
default_level: advanced
report_dir: /tmp/halaqah/reports
flash_duration: 5s
parent_emails:
  Aisha: aisha.parent@example.com
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.data_path(), PathBuf::from("/tmp/halaqah/students.json"));
        assert_eq!(config.default_level(), ReviewLevel::Advanced);
        assert_eq!(config.report_dir(), PathBuf::from("/tmp/halaqah/reports"));
        assert_eq!(config.flash_duration(), Duration::from_secs(5));
        assert_eq!(config.parent_email("aisha"), Some("aisha.parent@example.com"));
        assert_eq!(config.parent_email("Omar"), None);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<Config, _> = serde_saphyr::from_str("queries: []");
        assert!(result.is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut config = Config {
            default_level: Some(ReviewLevel::Advanced),
            flash_duration: Some("2s".to_string()),
            ..Config::default()
        };
        config
            .parent_emails
            .insert("Bilal".to_string(), "home@example.com".to_string());
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/data.json"), home.join("data.json"));
        }
    }
}
