use serde::{Deserialize, Serialize};

use super::atomic::{FileAccess, write_bytes_atomic};
use super::{ProjectPaths, WorkspaceError, WorkspaceResult};

/// Deposition API used when none is configured.
pub const DEFAULT_API_URL: &str = "https://sandbox.zenodo.org/api";

const DEFAULT_QUEUE_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSettings {
    pub name: String,
    pub token: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_queue_capacity")]
    pub worker_queue_capacity: usize,
    pub created_at: String,
}

impl ProjectSettings {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            token: None,
            api_url: default_api_url(),
            worker_queue_capacity: DEFAULT_QUEUE_CAPACITY,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Check that the settings are complete enough to publish.
    pub fn validate(&self) -> WorkspaceResult<()> {
        match self.token.as_deref() {
            None => {
                return Err(WorkspaceError::InvalidConfig(
                    "access token is not set; use `lycophron configure --token <TOKEN>`"
                        .to_string(),
                ));
            }
            Some(token) if token.trim().is_empty() => {
                return Err(WorkspaceError::InvalidConfig(
                    "access token is empty".to_string(),
                ));
            }
            Some(_) => {}
        }
        if self.api_url.trim().is_empty() {
            return Err(WorkspaceError::InvalidConfig("api_url is empty".to_string()));
        }
        if self.worker_queue_capacity == 0 {
            return Err(WorkspaceError::InvalidConfig(
                "worker_queue_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

pub fn load_settings(paths: &ProjectPaths) -> WorkspaceResult<ProjectSettings> {
    paths.require_initialized()?;
    let content = std::fs::read_to_string(paths.settings_path())?;
    Ok(toml::from_str(&content)?)
}

pub fn load_or_create_settings(
    paths: &ProjectPaths,
    name: &str,
) -> WorkspaceResult<ProjectSettings> {
    if paths.is_initialized() {
        return load_settings(paths);
    }

    let settings = ProjectSettings::new(name);
    save_settings(paths, &settings)?;
    Ok(settings)
}

/// Persist settings; the file holds the access token so it is owner-only.
pub fn save_settings(paths: &ProjectPaths, settings: &ProjectSettings) -> WorkspaceResult<()> {
    let path = paths.settings_path();
    let encoded = toml::to_string_pretty(settings)?;
    write_bytes_atomic(&path, encoded.as_bytes(), FileAccess::Private)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_then_reloads_settings() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = ProjectPaths::new(dir.path().to_path_buf());
        paths.ensure_dirs().expect("dirs");

        let mut settings = load_or_create_settings(&paths, "survey").expect("create");
        assert_eq!(settings.name, "survey");
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert!(settings.validate().is_err());

        settings.token = Some("secret".to_string());
        save_settings(&paths, &settings).expect("save");

        let reloaded = load_or_create_settings(&paths, "ignored").expect("reload");
        assert_eq!(reloaded, settings);
        assert!(reloaded.validate().is_ok());
    }

    #[test]
    fn missing_optional_keys_use_defaults() {
        let parsed: ProjectSettings =
            toml::from_str("name = \"x\"\ncreated_at = \"2024-01-01T00:00:00Z\"\n")
                .expect("parse settings");
        assert_eq!(parsed.token, None);
        assert_eq!(parsed.api_url, DEFAULT_API_URL);
        assert_eq!(parsed.worker_queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }

    #[test]
    fn blank_token_is_rejected() {
        let mut settings = ProjectSettings::new("x");
        settings.token = Some("  ".to_string());
        let err = settings.validate().expect_err("blank token");
        assert_eq!(err.to_string(), "invalid configuration: access token is empty");
    }

    #[cfg(unix)]
    #[test]
    fn settings_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let paths = ProjectPaths::new(dir.path().to_path_buf());
        save_settings(&paths, &ProjectSettings::new("x")).expect("save");
        let mode = std::fs::metadata(paths.settings_path())
            .expect("metadata")
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
