use std::env;
use std::fs;
use std::path::PathBuf;

use crate::core::errors::ConfigError;

/// Filesystem locations used by the service.
///
/// `data_dir` holds `secrets.yaml`, an optional `config.yml` override and
/// the `logs/` directory. It defaults to the project root.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub project_root: PathBuf,
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub secrets_path: PathBuf,
}

impl AppPaths {
    /// Resolves `SENPAI_ROOT` (else the working directory) and
    /// `SENPAI_DATA_DIR` (else the project root).
    pub fn from_env() -> Result<Self, ConfigError> {
        let (project_root, data_dir) = resolve_dirs(|key| env::var_os(key).map(PathBuf::from))?;
        Self::with_dirs(project_root, data_dir)
    }

    /// Uses the given directories, creating `data_dir/logs` if needed.
    pub fn with_dirs(project_root: PathBuf, data_dir: PathBuf) -> Result<Self, ConfigError> {
        let log_dir = data_dir.join("logs");
        fs::create_dir_all(&log_dir).map_err(|source| ConfigError::Io {
            path: log_dir.clone(),
            source,
        })?;

        Ok(Self {
            secrets_path: data_dir.join("secrets.yaml"),
            project_root,
            data_dir,
            log_dir,
        })
    }
}

fn resolve_dirs<F>(lookup: F) -> Result<(PathBuf, PathBuf), ConfigError>
where
    F: Fn(&str) -> Option<PathBuf>,
{
    let project_root = match lookup("SENPAI_ROOT") {
        Some(root) => root,
        None => env::current_dir().map_err(|source| ConfigError::Io {
            path: PathBuf::from("."),
            source,
        })?,
    };
    let data_dir = lookup("SENPAI_DATA_DIR").unwrap_or_else(|| project_root.clone());
    Ok((project_root, data_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn data_dir_defaults_to_project_root() {
        let (root, data) =
            resolve_dirs(|key| (key == "SENPAI_ROOT").then(|| PathBuf::from("/srv/senpai")))
                .unwrap();
        assert_eq!(root, Path::new("/srv/senpai"));
        assert_eq!(data, root);
    }

    #[test]
    fn data_dir_override_is_honored() {
        let (root, data) = resolve_dirs(|key| match key {
            "SENPAI_ROOT" => Some(PathBuf::from("/srv/senpai")),
            "SENPAI_DATA_DIR" => Some(PathBuf::from("/var/lib/senpai")),
            _ => None,
        })
        .unwrap();
        assert_eq!(root, Path::new("/srv/senpai"));
        assert_eq!(data, Path::new("/var/lib/senpai"));
    }

    #[test]
    fn with_dirs_creates_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        let paths = AppPaths::with_dirs(dir.path().to_path_buf(), data.clone()).unwrap();

        assert!(paths.log_dir.is_dir());
        assert_eq!(paths.secrets_path, data.join("secrets.yaml"));
    }

    #[test]
    fn unwritable_data_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "not a directory").unwrap();

        let err = AppPaths::with_dirs(dir.path().to_path_buf(), blocker).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
