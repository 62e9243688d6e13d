use crate::error::{Result, SuiteError};
use crate::model::ALIAS_MARKER;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "suitectl.json";

/// Controller configuration, stored in `suitectl.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Extensions (without the dot) that mark a resource import as a file
    /// whose format can be changed, e.g. "html", "txt".
    #[serde(default = "default_resource_extensions")]
    pub resource_extensions: Vec<String>,

    /// Token placed between library arguments and the alias in display values.
    #[serde(default = "default_alias_marker")]
    pub alias_marker: String,
}

fn default_resource_extensions() -> Vec<String> {
    vec!["html".to_string(), "txt".to_string(), "tsv".to_string()]
}

fn default_alias_marker() -> String {
    ALIAS_MARKER.to_string()
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            resource_extensions: default_resource_extensions(),
            alias_marker: default_alias_marker(),
        }
    }
}

impl ControllerConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(SuiteError::Io)?;
        let config: ControllerConfig =
            serde_json::from_str(&content).map_err(SuiteError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(SuiteError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(SuiteError::Serialization)?;
        fs::write(config_path, content).map_err(SuiteError::Io)?;
        Ok(())
    }

    /// Case-insensitive; a leading dot on `ext` is ignored.
    pub fn is_resource_extension(&self, ext: &str) -> bool {
        let ext = ext.trim_start_matches('.').to_lowercase();
        self.resource_extensions
            .iter()
            .any(|known| known.trim_start_matches('.').to_lowercase() == ext)
    }
}
