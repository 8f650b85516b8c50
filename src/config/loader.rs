//! Configuration loading and discovery for `pxe.toml`

use super::schema::EditorConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "pxe.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse pxe.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// Where the editor settings came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Passed with `--config`
    Explicit(PathBuf),
    /// Found next to the project, in the working directory or an ancestor
    Project(PathBuf),
    /// The per-user file under the XDG config directory
    User(PathBuf),
    /// Nothing found; built-in defaults
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::Explicit(p) | ConfigSource::Project(p) | ConfigSource::User(p) => {
                Some(p.as_path())
            }
            ConfigSource::Defaults => None,
        }
    }
}

/// Nearest pxe.toml in `start` or any of its ancestors.
pub fn find_config_from(start: &Path) -> Option<PathBuf> {
    start.ancestors().map(|dir| dir.join(CONFIG_FILE_NAME)).find(|p| p.is_file())
}

/// `pixedit/pxe.toml` under `$XDG_CONFIG_HOME`, falling back to `~/.config`.
pub fn user_config_path() -> Option<PathBuf> {
    let base = match env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(env::var_os("HOME")?).join(".config"),
    };
    Some(base.join("pixedit").join(CONFIG_FILE_NAME))
}

/// Resolve which settings file applies: explicit path, then the nearest
/// project file above `cwd`, then the user file.
pub fn resolve_config(explicit: Option<&Path>, cwd: Option<&Path>) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path.to_path_buf());
    }
    if let Some(path) = cwd.and_then(find_config_from) {
        return ConfigSource::Project(path);
    }
    match user_config_path() {
        Some(path) if path.is_file() => ConfigSource::User(path),
        _ => ConfigSource::Defaults,
    }
}

/// Load the settings that apply in the current working directory.
///
/// An explicit path must exist. Without one, a missing file means defaults.
pub fn load_config(path: Option<&Path>) -> Result<EditorConfig, ConfigError> {
    let cwd = env::current_dir().ok();
    let source = resolve_config(path, cwd.as_deref());
    match source.path() {
        Some(p) => {
            log::debug!("loading config from {} ({:?})", p.display(), source);
            load_config_file(p)
        }
        None => Ok(EditorConfig::default()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<EditorConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parse and validate configuration text.
pub fn parse_config(contents: &str) -> Result<EditorConfig, ConfigError> {
    let config: EditorConfig = toml::from_str(contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::Tool;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &Path, contents: &str) -> PathBuf {
        let config_path = dir.join(CONFIG_FILE_NAME);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(contents.as_bytes())
            .expect("should write config content");
        config_path
    }

    #[test]
    fn test_project_config_found_from_nested_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "[brush]\nsize = 2");
        assert_eq!(find_config_from(temp.path()), Some(config_path.clone()));

        let subdir = temp.path().join("art").join("sprites");
        fs::create_dir_all(&subdir).expect("should create subdirectories");
        assert_eq!(find_config_from(&subdir), Some(config_path.clone()));
        assert_eq!(resolve_config(None, Some(subdir.as_path())), ConfigSource::Project(config_path));
    }

    #[test]
    fn test_directory_named_like_config_is_skipped() {
        let temp = TempDir::new().expect("should create temp dir");
        fs::create_dir(temp.path().join(CONFIG_FILE_NAME)).expect("should create dir");
        assert_eq!(find_config_from(temp.path()), None);
    }

    #[test]
    fn test_explicit_path_wins() {
        let temp = TempDir::new().expect("should create temp dir");
        write_config(temp.path(), "[brush]\nsize = 2");
        let explicit = temp.path().join("other.toml");
        let source = resolve_config(Some(explicit.as_path()), Some(temp.path()));
        assert_eq!(source, ConfigSource::Explicit(explicit.clone()));
        assert_eq!(source.path(), Some(explicit.as_path()));
        assert_eq!(ConfigSource::Defaults.path(), None);
    }

    #[test]
    fn test_load_config_from_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(
            temp.path(),
            r##"
[brush]
tool = "eraser"
size = 5

[color]
primary = "#00ff00"
"##,
        );

        let config = load_config(Some(&config_path)).expect("should load valid config");
        assert_eq!(config.brush.size, 5);
        assert_eq!(config.tool_settings().tool, Tool::Eraser);
        assert_eq!(config.history.max, crate::history::DEFAULT_MAX_HISTORY);
    }

    #[test]
    fn test_load_config_missing_explicit_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let result = load_config(Some(&temp.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_parse_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "[brush\nsize = 2");
        assert!(matches!(load_config(Some(&config_path)), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_validation_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "[dither]\ndensity = 0");

        let err = load_config(Some(&config_path)).unwrap_err();
        match &err {
            ConfigError::Validation(messages) => {
                assert_eq!(messages.len(), 1);
                assert!(messages[0].contains("dither.density"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(err.to_string().starts_with("Config validation failed:"));
    }
}
