// Inputbind Settings Module
// Where the front end finds bind documents and the user override file

use std::path::{Path, PathBuf};

use crate::config::source::BINDS_EXTENSION;

/// Settings for the inputbind front end
///
/// Loaded from a TOML file (default: ~/.config/inputbind/settings.toml).
/// Relative paths in the file are resolved against the file's directory.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Directory scanned for bind documents
    binds_dir: Option<PathBuf>,

    /// User override store (JSON)
    user_config: Option<PathBuf>,

    /// Extension of bind documents, without the dot
    binds_extension: Option<String>,

    /// Path to the settings file, when loaded from one
    source_path: Option<PathBuf>,
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid setting value: {0}")]
    InvalidValue(String),
}

/// TOML representation for deserializing settings
#[derive(Debug, Clone, serde::Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SettingsToml {
    #[serde(default)]
    paths: Option<PathSettings>,

    #[serde(default)]
    binds: Option<BindSettings>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
struct PathSettings {
    #[serde(default)]
    binds_dir: Option<PathBuf>,

    #[serde(default)]
    user_config: Option<PathBuf>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
struct BindSettings {
    #[serde(default)]
    extension: Option<String>,
}

impl Settings {
    /// Create a new empty settings object
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut settings = Self::from_toml(&content)?;
        if let Some(base) = path.parent() {
            settings.resolve_relative(base);
        }
        settings.source_path = Some(path.to_path_buf());
        Ok(settings)
    }

    /// Load settings from TOML string
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let toml_settings: SettingsToml =
            toml::from_str(content).map_err(|e| SettingsError::TomlParse(e.to_string()))?;

        let mut settings = Self::new();

        if let Some(paths) = toml_settings.paths {
            settings.binds_dir = paths.binds_dir;
            settings.user_config = paths.user_config;
        }

        if let Some(binds) = toml_settings.binds {
            if let Some(extension) = binds.extension {
                let extension = extension.trim_start_matches('.');
                if extension.is_empty() {
                    return Err(SettingsError::InvalidValue(
                        "binds.extension must not be empty".to_string(),
                    ));
                }
                settings.binds_extension = Some(extension.to_string());
            }
        }

        Ok(settings)
    }

    fn resolve_relative(&mut self, base: &Path) {
        for path in [&mut self.binds_dir, &mut self.user_config].into_iter().flatten() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Get the default settings path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("inputbind").join("settings.toml"))
    }

    /// Load from default location (~/.config/inputbind/settings.toml)
    pub fn load_default() -> Result<Self, SettingsError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::from_file(path);
            }
        }
        // Return default settings if file doesn't exist
        Ok(Self::new())
    }

    /// Directory holding bind documents, if configured
    pub fn binds_dir(&self) -> Option<&Path> {
        self.binds_dir.as_deref()
    }

    /// User override file, if configured
    pub fn user_config(&self) -> Option<&Path> {
        self.user_config.as_deref()
    }

    /// Extension of bind documents ("binds" unless overridden)
    pub fn binds_extension(&self) -> &str {
        self.binds_extension.as_deref().unwrap_or(BINDS_EXTENSION)
    }

    pub fn set_binds_dir(&mut self, dir: impl Into<PathBuf>) {
        self.binds_dir = Some(dir.into());
    }

    pub fn set_user_config(&mut self, path: impl Into<PathBuf>) {
        self.user_config = Some(path.into());
    }

    /// Path the settings were loaded from
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }
}

/// Create default settings content for a new installation
pub fn default_settings_content() -> &'static str {
    r#"# Inputbind Settings
# Place this file at: ~/.config/inputbind/settings.toml

[paths]
# Directory scanned recursively for bind documents
# binds_dir = "binds"

# User bind overrides (defaults to ~/.config/inputbind/config.json)
# user_config = "config.json"

[binds]
# Extension of bind documents
extension = "binds"
"#
}
