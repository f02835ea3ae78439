use super::*;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Sub choice shown for a main choice that has none of its own.
pub const DEFAULT_PLACEHOLDER: &str = "---";

/// Separator between the main and the sub value in a compressed field value.
pub const DEFAULT_SEPARATOR: &str = ">>>";

/// Widget settings.
///
/// # TOML Example
///
/// ```toml
/// placeholder = "(none)"
/// separator = "::"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WidgetConfig {
    pub placeholder: String,
    pub separator: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl WidgetConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|err| Error::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!("configuration file not found: {}", path.display()))
            } else {
                Error::Config(err.to_string())
            }
        })?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "loaded widget configuration");
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `Error::Config` if `separator` is empty.
    pub fn validate(&self) -> Result<()> {
        if self.separator.is_empty() {
            return Err(Error::Config("separator cannot be empty".to_string()));
        }
        Ok(())
    }
}
