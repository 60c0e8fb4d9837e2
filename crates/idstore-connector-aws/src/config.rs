//! Identity store settings.
//!
//! Loaded once at start-up from a YAML file:
//!
//! ```yaml
//! IDENTITY_STORE_ID: d-1234567890
//! SSO_PROFILE: admin-sso
//! REGION: eu-west-1   # optional
//! ```
//!
//! Environment variables override file values after loading:
//! `IDSTORE_IDENTITY_STORE_ID`, `IDSTORE_SSO_PROFILE`, `IDSTORE_REGION`.

use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Errors raised while loading settings. All of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("Failed to read settings file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid YAML or has the wrong shape.
    #[error("Failed to parse settings: {detail}")]
    Parse { detail: String },

    /// A required value is present but empty.
    #[error("Invalid settings: {detail}")]
    Invalid { detail: String },
}

/// Identity store connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Identity store identifier (e.g. `d-1234567890`).
    #[serde(rename = "IDENTITY_STORE_ID")]
    pub identity_store_id: String,

    /// Named AWS profile used to authenticate (typically an SSO profile).
    #[serde(rename = "SSO_PROFILE")]
    pub sso_profile: String,

    /// Region override. When absent the profile's region is used.
    #[serde(rename = "REGION", default)]
    pub region: Option<String>,
}

impl Settings {
    /// Load settings from a YAML file, apply `IDSTORE_*` environment
    /// overrides, then validate.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        Self::load_with(path, |key| env::var(key).ok())
    }

    /// Load settings from a YAML file, apply overrides from `lookup`, then
    /// validate. Overrides may fill values the file leaves empty.
    pub fn load_with<P, F>(path: P, lookup: F) -> Result<Self, SettingsError>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::from_file(path)?;
        settings.apply_overrides(lookup);
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a YAML file without overrides or validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|source| SettingsError::Read {
                path: path.as_ref().to_path_buf(),
                source,
            })?;

        Self::from_yaml(&content)
    }

    /// Parse settings from a YAML string. Values are not validated.
    pub fn from_yaml(content: &str) -> Result<Self, SettingsError> {
        serde_yaml::from_str(content).map_err(|e| SettingsError::Parse {
            detail: e.to_string(),
        })
    }

    /// Apply overrides from an arbitrary key lookup. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(id) = get("IDSTORE_IDENTITY_STORE_ID") {
            self.identity_store_id = id;
        }
        if let Some(profile) = get("IDSTORE_SSO_PROFILE") {
            self.sso_profile = profile;
        }
        if let Some(region) = get("IDSTORE_REGION") {
            self.region = Some(region);
        }
    }

    /// Reject empty required values.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.identity_store_id.trim().is_empty() {
            return Err(SettingsError::Invalid {
                detail: "IDENTITY_STORE_ID must not be empty".to_string(),
            });
        }
        if self.sso_profile.trim().is_empty() {
            return Err(SettingsError::Invalid {
                detail: "SSO_PROFILE must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_parse_minimal_settings() {
        let yaml = r#"
IDENTITY_STORE_ID: d-1234567890
SSO_PROFILE: admin-sso
"#;

        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.identity_store_id, "d-1234567890");
        assert_eq!(settings.sso_profile, "admin-sso");
        assert!(settings.region.is_none());
    }

    #[test]
    fn test_parse_settings_with_region() {
        let yaml = "IDENTITY_STORE_ID: d-1\nSSO_PROFILE: p\nREGION: ap-northeast-1\n";

        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.region.as_deref(), Some("ap-northeast-1"));
    }

    #[test]
    fn test_missing_key_is_parse_error() {
        let yaml = "IDENTITY_STORE_ID: d-1\n";

        let err = Settings::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
        assert!(err.to_string().contains("SSO_PROFILE"));
    }

    #[test]
    fn test_empty_value_is_invalid() {
        let yaml = "IDENTITY_STORE_ID: \"  \"\nSSO_PROFILE: p\n";

        let settings = Settings::from_yaml(yaml).unwrap();
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { .. }));
    }

    #[test]
    fn test_load_rejects_empty_value_without_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "IDENTITY_STORE_ID: \"\"").unwrap();
        writeln!(file, "SSO_PROFILE: ops").unwrap();

        let err = Settings::load_with(file.path(), |_| None).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { .. }));
        assert!(err.to_string().contains("IDENTITY_STORE_ID"));
    }

    #[test]
    fn test_override_fills_value_empty_in_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "IDENTITY_STORE_ID: \"\"").unwrap();
        writeln!(file, "SSO_PROFILE: ops").unwrap();

        let settings = Settings::load_with(file.path(), |key| {
            (key == "IDSTORE_IDENTITY_STORE_ID").then(|| "d-123".to_string())
        })
        .unwrap();

        assert_eq!(settings.identity_store_id, "d-123");
        assert_eq!(settings.sso_profile, "ops");
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yml");

        let err = Settings::from_file(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Read { .. }));
        assert!(err.to_string().contains("settings.yml"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "IDENTITY_STORE_ID: d-42").unwrap();
        writeln!(file, "SSO_PROFILE: ops").unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.identity_store_id, "d-42");
        assert_eq!(settings.sso_profile, "ops");
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let mut settings = Settings::from_yaml("IDENTITY_STORE_ID: d-1\nSSO_PROFILE: p\n").unwrap();
        let vars: HashMap<&str, &str> = [
            ("IDSTORE_SSO_PROFILE", "other"),
            ("IDSTORE_REGION", "us-east-1"),
            ("IDSTORE_IDENTITY_STORE_ID", ""),
        ]
        .into_iter()
        .collect();

        settings.apply_overrides(|key| vars.get(key).map(|v| (*v).to_string()));

        assert_eq!(settings.identity_store_id, "d-1");
        assert_eq!(settings.sso_profile, "other");
        assert_eq!(settings.region.as_deref(), Some("us-east-1"));
    }
}
