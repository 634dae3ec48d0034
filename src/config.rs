use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown transport mode: {0}")]
    UnknownTransportMode(String),
    #[error("unknown layout: {0} (expected 'grid' or 'radial')")]
    UnknownLayout(String),
}

/// Primary transport mode the city is planned around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum TransportMode {
    #[default]
    Car,
    PublicTransit,
    Walk,
}

impl FromStr for TransportMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "car" => Ok(TransportMode::Car),
            "public" | "public_transit" | "transit" => Ok(TransportMode::PublicTransit),
            "walk" | "pedestrian" => Ok(TransportMode::Walk),
            _ => Err(ConfigError::UnknownTransportMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for TransportMode {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportMode::Car => write!(f, "car"),
            TransportMode::PublicTransit => write!(f, "public_transit"),
            TransportMode::Walk => write!(f, "walk"),
        }
    }
}

/// Road network strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum LayoutMode {
    #[default]
    Grid,
    Radial,
}

impl FromStr for LayoutMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grid" => Ok(LayoutMode::Grid),
            "radial" => Ok(LayoutMode::Radial),
            _ => Err(ConfigError::UnknownLayout(s.to_string())),
        }
    }
}

impl TryFrom<String> for LayoutMode {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutMode::Grid => write!(f, "grid"),
            LayoutMode::Radial => write!(f, "radial"),
        }
    }
}

/// Largest accepted grid resolution. Bounds the `size * size` zone grid.
pub const MAX_GRID_SIZE: i64 = 4_096;

fn default_population() -> i64 {
    100_000
}

fn default_grid_size() -> i64 {
    100
}

fn default_city_radius() -> f64 {
    0.8
}

fn default_hospitals() -> i64 {
    1
}

fn default_schools() -> i64 {
    5
}

fn default_green_m2_per_capita() -> f64 {
    8.0
}

fn default_output_prefix() -> String {
    "city".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// City configuration as written by the user. Values are clamped by
/// [`CityConfig::normalize`] before generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub seed: u32,
    #[serde(default = "default_population")]
    pub population: i64,
    /// Square grid resolution (N x N cells).
    #[serde(default = "default_grid_size")]
    pub grid_size: i64,
    /// Radius of the developed area as a fraction of the half grid.
    #[serde(default = "default_city_radius")]
    pub city_radius: f64,
    #[serde(default = "default_hospitals")]
    pub hospitals: i64,
    #[serde(default = "default_schools")]
    pub schools: i64,
    /// Minimal green area per inhabitant, m^2.
    #[serde(default = "default_green_m2_per_capita")]
    pub green_m2_per_capita: f64,
    #[serde(default)]
    pub transport: TransportMode,
    #[serde(default)]
    pub layout: LayoutMode,
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            name: None,
            seed: 0,
            population: default_population(),
            grid_size: default_grid_size(),
            city_radius: default_city_radius(),
            hospitals: default_hospitals(),
            schools: default_schools(),
            green_m2_per_capita: default_green_m2_per_capita(),
            transport: TransportMode::default(),
            layout: LayoutMode::default(),
            output_prefix: default_output_prefix(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Normalized inputs consumed by the generation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorSettings {
    pub seed: u32,
    pub population: u64,
    pub grid_size: usize,
    pub city_radius: f64,
    pub hospitals: u32,
    pub schools: u32,
    pub green_m2_per_capita: f64,
    pub transport: TransportMode,
    pub layout: LayoutMode,
}

impl GeneratorSettings {
    /// Grid centre coordinate (both axes).
    pub fn centre(&self) -> f64 {
        self.grid_size as f64 * 0.5
    }

    /// Developed-area radius in grid cells.
    pub fn radius(&self) -> f64 {
        self.grid_size as f64 * self.city_radius * 0.5
    }
}

impl CityConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: CityConfig = serde_yaml::from_str(text).context("invalid city config")?;
        Ok(config)
    }

    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        Ok(())
    }

    pub fn normalize(&self) -> GeneratorSettings {
        let city_radius = if self.city_radius.is_nan() || self.city_radius <= 0.0 {
            0.1
        } else {
            self.city_radius.min(1.0)
        };
        let green = if self.green_m2_per_capita.is_nan() {
            0.0
        } else {
            self.green_m2_per_capita.max(0.0)
        };
        GeneratorSettings {
            seed: self.seed,
            population: self.population.max(0) as u64,
            grid_size: self.grid_size.clamp(10, MAX_GRID_SIZE) as usize,
            city_radius,
            hospitals: self.hospitals.clamp(0, u32::MAX as i64) as u32,
            schools: self.schools.clamp(0, u32::MAX as i64) as u32,
            green_m2_per_capita: green,
            transport: self.transport,
            layout: self.layout,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.output_prefix)
    }
}

pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<CityConfig> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: CityConfig = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }
}
