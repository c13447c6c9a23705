use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use geonames_cities::validate::DEFAULT_MIN_ROWS;

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub sources: SourcesConfig,
    pub warehouse: WarehouseConfig,
    pub validation: ValidationConfig,
    pub notify: NotifyConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SourcesConfig {
    pub cities_file: PathBuf,
    pub country_file: PathBuf,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            cities_file: PathBuf::from("cities1000.txt"),
            country_file: PathBuf::from("countryInfo.txt"),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WarehouseConfig {
    pub root: PathBuf,
    pub namespace: String,
    pub table: String,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./data"),
            namespace: "fan_search".to_string(),
            table: "geonames_cities1000".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ValidationConfig {
    pub min_rows: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_rows: DEFAULT_MIN_ROWS,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct NotifyConfig {
    pub discord_webhook: Option<String>,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}
