use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::defaults;
use crate::error::{ReportError, Result};
use crate::grouping::GroupingEngine;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Step name prefix that opens a business step group
    pub marker_prefix: String,
    /// Summary file written into the results directory
    pub summary_file_name: String,
    pub diagram: DiagramSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramSettings {
    pub enabled: bool,
    pub attachment_name: String,
    pub file_suffix: String,
    pub title: String,
    pub mermaid_script_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            marker_prefix: defaults::MARKER_PREFIX.to_string(),
            summary_file_name: defaults::SUMMARY_FILE_NAME.to_string(),
            diagram: DiagramSettings::default(),
        }
    }
}

impl Default for DiagramSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            attachment_name: "Business Steps Flow".to_string(),
            file_suffix: "-business-steps.html".to_string(),
            title: "Business Steps Flow".to_string(),
            mermaid_script_url: "https://cdn.jsdelivr.net/npm/mermaid/dist/mermaid.min.js"
                .to_string(),
        }
    }
}

impl Config {
    /// Load `explicit` if given, otherwise the user config file, falling back
    /// to defaults when that file does not exist.
    pub async fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path).await,
            None => {
                let config_path = Self::get_config_path()?;
                if config_path.exists() {
                    Self::load_from(&config_path).await
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub async fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|source| ReportError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_toml(path, &contents)
    }

    pub fn from_toml(path: &Path, contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|source| ReportError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ReportError::Config(format!("Failed to serialize config: {}", e)))
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| ReportError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let contents = self.to_toml()?;
        fs::write(path, contents)
            .await
            .map_err(|source| ReportError::Write {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ReportError::Config("Could not find config directory".to_string()))?
            .join(defaults::CONFIG_DIR_NAME);

        Ok(config_dir.join(defaults::CONFIG_FILE_NAME))
    }

    pub fn grouping_engine(&self) -> GroupingEngine {
        GroupingEngine::new(&self.marker_prefix)
    }

    /// Name of the diagram written next to the result file `report_path`.
    pub fn diagram_file_name(&self, report_path: &Path) -> String {
        let base_name = report_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{}{}", base_name, self.diagram.file_suffix)
    }
}
