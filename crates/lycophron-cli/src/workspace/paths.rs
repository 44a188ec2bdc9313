use std::path::{Path, PathBuf};

use super::{WorkspaceError, WorkspaceResult};

/// Directory layout of a Lycophron project.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub logs_dir: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: PathBuf) -> Self {
        let config_dir = root.join("config");
        let data_dir = root.join("data");
        let logs_dir = root.join("logs");
        Self {
            root,
            config_dir,
            data_dir,
            logs_dir,
        }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join("settings.toml")
    }

    pub fn records_path(&self) -> PathBuf {
        self.data_dir.join("records.json")
    }

    pub fn log_path(&self) -> PathBuf {
        self.logs_dir.join("lycophron.ndjson")
    }

    /// A project exists once its settings file has been written.
    pub fn is_initialized(&self) -> bool {
        self.settings_path().is_file()
    }

    pub fn require_initialized(&self) -> WorkspaceResult<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(WorkspaceError::NotInitialized(self.root.display().to_string()))
        }
    }

    /// Project name derived from the root directory.
    pub fn default_name(&self) -> String {
        self.root
            .canonicalize()
            .ok()
            .as_deref()
            .and_then(Path::file_name)
            .or_else(|| self.root.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "lycophron".to_string())
    }

    pub fn ensure_dirs(&self) -> WorkspaceResult<()> {
        for dir in [&self.root, &self.config_dir, &self.data_dir, &self.logs_dir] {
            if !dir.exists() {
                std::fs::create_dir_all(dir)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_dirs_creates_layout() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = ProjectPaths::new(dir.path().join("survey"));
        assert!(!paths.is_initialized());
        assert!(paths.require_initialized().is_err());

        paths.ensure_dirs().expect("create dirs");
        assert!(paths.config_dir.is_dir());
        assert!(paths.data_dir.is_dir());
        assert!(paths.logs_dir.is_dir());
        assert_eq!(paths.default_name(), "survey");
    }
}
