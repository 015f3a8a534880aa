use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::pip::{DuplicatePolicy, IndexMode};

/// Run configuration, loaded from TOML. Every field has a default.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub classification: ClassificationConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    /// Headerless boundary table
    pub records: PathBuf,
    /// GeoJSON reference geometry
    pub geometry: PathBuf,
    pub mode: IndexMode,
    /// Feature property holding the country name (name-keyed mode)
    pub name_property: String,
    /// Field delimiter of the boundary table
    pub delimiter: char,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            records: PathBuf::from("country-borders.csv"),
            geometry: PathBuf::from("ne_110m_admin_0_countries.geojson"),
            mode: IndexMode::default(),
            name_property: "NAME_EN".to_string(),
            delimiter: ',',
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ClassificationConfig {
    pub duplicate_names: DuplicatePolicy,
    pub parallel: bool,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            duplicate_names: DuplicatePolicy::default(),
            parallel: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub export: PathBuf,
    /// Optional GeoJSON of the mainland boundaries
    pub drawables: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            export: PathBuf::from("mainlandPolygonIds.csv"),
            drawables: None,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read {}", path.as_ref().display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.delimiter_byte()?;
        if self.input.name_property.trim().is_empty() {
            bail!("input.name_property must not be empty");
        }
        Ok(())
    }

    /// The table delimiter as the single byte the CSV reader expects
    pub fn delimiter_byte(&self) -> Result<u8> {
        let delimiter = self.input.delimiter;
        if !delimiter.is_ascii() || delimiter == '\n' || delimiter == '"' {
            bail!("Unsupported field delimiter {:?}", delimiter);
        }
        Ok(delimiter as u8)
    }
}
