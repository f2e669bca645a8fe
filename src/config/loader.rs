//! Configuration and mapping table loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::mapping::MappingTable;

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: GatewayConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build the mapping table: compiled-in defaults, overlaid entry-by-entry
/// with the configured mapping file when one is given.
pub fn load_mapping(config: &GatewayConfig) -> Result<MappingTable, ConfigError> {
    match &config.mapping.file {
        None => Ok(MappingTable::with_defaults()),
        Some(path) => {
            let text = fs::read_to_string(path).map_err(ConfigError::Io)?;
            let table = MappingTable::with_overrides(&text);
            tracing::info!(file = %path, entries = table.len(), "Mapping table loaded");
            Ok(table)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mapping_loads_without_a_file() {
        let table = load_mapping(&GatewayConfig::default()).unwrap();
        assert!(!table.is_empty());
    }

    #[test]
    fn missing_mapping_file_is_an_io_error() {
        let mut config = GatewayConfig::default();
        config.mapping.file = Some("/nonexistent/mapping.properties".into());
        assert!(matches!(load_mapping(&config), Err(ConfigError::Io(_))));
    }
}
