use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::render::Layout;

pub const DEFAULT_API_BASE: &str = "https://openrpg.de/srd/5e/de/api";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct Config {
    pub api_base: String,
    pub data_dir: Option<PathBuf>,
    pub restore_umlauts: bool,
    pub layout: Layout,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            data_dir: None,
            restore_umlauts: true,
            layout: Layout::Grid,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Read a config file. `.json` files are parsed as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let cfg = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse config JSON: {}", path.display()))?
        } else {
            serde_yaml::from_str(&text)
                .with_context(|| format!("failed to parse config YAML: {}", path.display()))?
        };
        Ok(cfg)
    }

    pub fn directory_url(&self) -> String {
        format!("{}/monster", self.api_base.trim_end_matches('/'))
    }

    pub fn content_url(&self, slug: &str) -> String {
        format!(
            "{}/monster/{}/fantasystatblocks.yaml",
            self.api_base.trim_end_matches('/'),
            slug
        )
    }

    /// Explicit `data_dir`, else the platform data directory, else `./statblocks-data`.
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        match ProjectDirs::from("", "", "statblocks") {
            Some(dirs) => dirs.data_dir().to_path_buf(),
            None => {
                tracing::warn!("no platform data directory found, using ./statblocks-data");
                PathBuf::from("statblocks-data")
            }
        }
    }
}
