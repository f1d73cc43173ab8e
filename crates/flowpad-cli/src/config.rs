//! Where the CLI finds its `config.toml`.
//!
//! An explicit `--config` path wins. Otherwise `flowpad/config.toml` in the
//! working directory is tried, then the platform config directory. With no
//! file anywhere the defaults apply.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use flowpad::{
    FlowpadError,
    config::{AppConfig, StorageConfig},
};

const LOCAL_CONFIG: &str = "flowpad/config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for FlowpadError {
    fn from(err: ConfigError) -> Self {
        FlowpadError::Io(io::Error::other(err))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "flowpad", "flowpad")
}

/// Loads the configuration, searching the usual places when `explicit_path`
/// is `None`.
///
/// # Errors
///
/// Fails when an explicit path does not exist, or when the file found
/// is not valid TOML for [`AppConfig`].
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, FlowpadError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path:? = path; "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let system_config = project_dirs().map(|dirs| dirs.config_dir().join("config.toml"));
    let candidates = std::iter::once(PathBuf::from(LOCAL_CONFIG)).chain(system_config);

    for candidate in candidates {
        if candidate.exists() {
            info!(path:? = candidate; "Loading configuration");
            return load_config_file(&candidate);
        }
        debug!(path:? = candidate; "No configuration file here");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Points storage at `storage.json` in the platform data directory when the
/// configuration names no file, so `--save` and `--restore` outlive the
/// process.
pub fn with_default_storage(config: AppConfig) -> AppConfig {
    if config.storage().path().is_some() {
        return config;
    }
    let Some(dirs) = project_dirs() else {
        debug!("Could not determine platform-specific data directory");
        return config;
    };

    let path = dirs.data_dir().join("storage.json");
    debug!(path:? = path; "Using default storage file");
    AppConfig::new(
        config.layout().clone(),
        StorageConfig::new(Some(path), config.storage().key()),
        config.style().clone(),
    )
}

fn load_config_file(path: &Path) -> Result<AppConfig, FlowpadError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|err| {
        ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use flowpad::direction::Direction;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_explicit_file_is_loaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
                [layout]
                node_width = 200.0
                direction = "RIGHT"

                [storage]
                key = "custom"

                [style]
                background_color = "white"
            "#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.layout().node_size().width(), 200.0);
        assert_eq!(config.layout().node_size().height(), 50.0);
        assert_eq!(config.layout().direction(), Direction::Right);
        assert_eq!(config.storage().key(), "custom");
        assert!(config.style().background_color().unwrap().is_some());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = load_config(Some(dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("Missing configuration file"));
    }

    #[test]
    fn test_configured_storage_path_is_kept() {
        let config = AppConfig::new(
            Default::default(),
            StorageConfig::new(Some(PathBuf::from("here.json")), "slot"),
            Default::default(),
        );
        let config = with_default_storage(config);
        assert_eq!(config.storage().path(), Some(Path::new("here.json")));
        assert_eq!(config.storage().key(), "slot");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[layout\nnode_width = ").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML"));
    }
}
