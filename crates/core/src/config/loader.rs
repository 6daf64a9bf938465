//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result, ResultExt};
use std::path::{Path, PathBuf};

/// File names searched, in order, when no path is given.
pub const CONFIG_CANDIDATES: [&str; 3] = [
    ".openmarket.toml",
    "openmarket.toml",
    ".config/openmarket.toml",
];

/// Configuration wrapper
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed settings
    pub schema: ConfigSchema,
    /// File the settings came from, if any
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load from `path`, or from the first candidate in the current directory,
    /// or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::config_not_found(p));
                }
                Self::from_file(p)
            }
            None => Self::load_from_dir(Path::new(".")),
        }
    }

    /// Load the first candidate found under `dir`, or defaults.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        match find_config_file(dir) {
            Some(p) => Self::from_file(&p),
            None => Ok(Self::default()),
        }
    }

    /// Parse and validate a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let schema = load_config_file(path)?;
        Ok(Self {
            schema,
            path: Some(path.to_path_buf()),
        })
    }

    /// Parse and validate TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let schema = parse(content)?;
        Ok(Self { schema, path: None })
    }
}

/// Find configuration file in standard locations
fn find_config_file(dir: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(|candidate| dir.join(candidate))
        .find(|p| p.is_file())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::config(format!("Failed to read config file {}: {}", path.display(), e)))?;

    parse(&content).context(format!("While loading {}", path.display()))
}

fn parse(content: &str) -> Result<ConfigSchema> {
    let schema: ConfigSchema = toml::from_str(content)?;
    schema
        .prepare
        .validate()
        .map_err(|e| Error::config_invalid(e.to_string()))?;
    Ok(schema)
}
