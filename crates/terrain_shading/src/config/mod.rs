//! Configuration file support
//!
//! Settings live in `.toml` or `.ron` files; the extension picks the format.
//! Every load runs [`Config::check`] so a file that parses but describes an
//! unusable pipeline is rejected at load time.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// On-disk configuration formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML via the `toml` crate
    Toml,
    /// Rusty Object Notation via the `ron` crate
    Ron,
}

impl ConfigFormat {
    /// Format implied by the file extension of `path`
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn parse<T: for<'de> Deserialize<'de>>(self, contents: &str) -> Result<T, ConfigError> {
        match self {
            Self::Toml => toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Self::Ron => ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    fn render<T: Serialize>(self, value: &T) -> Result<String, ConfigError> {
        match self {
            Self::Toml => toml::to_string_pretty(value).map_err(|e| ConfigError::Serialize(e.to_string())),
            Self::Ron => ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string())),
        }
    }
}

/// A settings type that can be read from and written to disk
///
/// Missing fields fall back to `Default` when the type opts into
/// `#[serde(default)]`.
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Reject values that parse but cannot be used
    fn check(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Read, parse and check a configuration file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        Self::from_str_with_format(&contents, path)
    }

    /// Parse and check configuration text; `path` only selects the format
    fn from_str_with_format(contents: &str, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let parsed: Self = ConfigFormat::from_path(path.as_ref())?.parse(contents)?;
        parsed.check()?;
        Ok(parsed)
    }

    /// Write the configuration in the format implied by `path`
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = ConfigFormat::from_path(path)?.render(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Errors from loading, saving or checking configuration
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The text is not valid for the format
    #[error("Could not parse config: {0}")]
    Parse(String),

    /// The value could not be written in the format
    #[error("Could not serialize config: {0}")]
    Serialize(String),

    /// Neither `.toml` nor `.ron`
    #[error("Unsupported config format for '{0}', expected .toml or .ron")]
    UnsupportedFormat(String),

    /// A value failed validation
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
