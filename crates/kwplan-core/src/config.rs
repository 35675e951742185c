use crate::error::Result;
use crate::filters::GeoMode;
use crate::io::atomic_write;
use crate::paths;
use crate::planner::{GrowthSettings, DEFAULT_SEED};
use crate::types::{Locale, ObjectiveSelection};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

impl ConfigWarning {
    fn warning(message: impl Into<String>) -> Self {
        Self {
            level: WarnLevel::Warning,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: WarnLevel::Error,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// GeoFilterConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoFilterConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub mode: GeoMode,
    /// Place-name list; the embedded Brazilian city list when unset.
    #[serde(default)]
    pub gazetteer: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for GeoFilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: GeoMode::default(),
            gazetteer: None,
        }
    }
}

// ---------------------------------------------------------------------------
// NegativeFilterConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NegativeFilterConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub stop_list: Option<PathBuf>,
}

impl Default for NegativeFilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stop_list: None,
        }
    }
}

// ---------------------------------------------------------------------------
// GrowthConfig
// ---------------------------------------------------------------------------

/// Partial growth inputs. Planning runs once all four are known, either from
/// the file or from CLI flags layered on top.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthConfig {
    #[serde(default)]
    pub current_volume: Option<f64>,
    #[serde(default)]
    pub growth_percent: Option<f64>,
    #[serde(default)]
    pub months: Option<u32>,
    #[serde(default)]
    pub keywords_per_month: Option<u32>,
}

impl GrowthConfig {
    /// Fields set in `other` win.
    pub fn overlay(self, other: GrowthConfig) -> GrowthConfig {
        GrowthConfig {
            current_volume: other.current_volume.or(self.current_volume),
            growth_percent: other.growth_percent.or(self.growth_percent),
            months: other.months.or(self.months),
            keywords_per_month: other.keywords_per_month.or(self.keywords_per_month),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == GrowthConfig::default()
    }

    pub fn settings(&self) -> Option<GrowthSettings> {
        Some(GrowthSettings {
            current_volume: self.current_volume?,
            growth_percent: self.growth_percent?,
            months: self.months?,
            keywords_per_month: self.keywords_per_month?,
        })
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.current_volume.is_none() {
            missing.push("current_volume");
        }
        if self.growth_percent.is_none() {
            missing.push("growth_percent");
        }
        if self.months.is_none() {
            missing.push("months");
        }
        if self.keywords_per_month.is_none() {
            missing.push("keywords_per_month");
        }
        missing
    }
}

// ---------------------------------------------------------------------------
// ClusteringConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_max_iterations() -> usize {
    100
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            max_iterations: default_max_iterations(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub locale: Locale,
    /// Menu number, label or free text; see [`ObjectiveSelection::parse`].
    #[serde(default = "default_objective")]
    pub objective: String,
    #[serde(default)]
    pub geo_filter: GeoFilterConfig,
    #[serde(default)]
    pub negative_filter: NegativeFilterConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub growth: Option<GrowthConfig>,
    #[serde(default)]
    pub clustering: ClusteringConfig,
}

fn default_objective() -> String {
    "3".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            objective: default_objective(),
            geo_filter: GeoFilterConfig::default(),
            negative_filter: NegativeFilterConfig::default(),
            growth: None,
            clustering: ClusteringConfig::default(),
        }
    }
}

impl Config {
    /// Load `kwplan.yaml` from `dir`. A missing file yields defaults.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = paths::config_path(dir);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        let path = paths::config_path(dir);
        let data = serde_yaml::to_string(self)?;
        atomic_write(&path, data.as_bytes())
    }

    pub fn objective_selection(&self) -> ObjectiveSelection {
        ObjectiveSelection::parse(&self.objective)
    }

    /// List files are resolved against the input directory when relative.
    pub fn resolve(dir: &Path, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            dir.join(file)
        }
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.objective.trim().is_empty() {
            warnings.push(ConfigWarning::warning(
                "objective is empty; runs will report a blank objective",
            ));
        }

        if let Some(growth) = &self.growth {
            if let Some(v) = growth.current_volume {
                if !(v.is_finite() && v > 0.0) {
                    warnings.push(ConfigWarning::error(format!(
                        "growth.current_volume must be positive, got {v}"
                    )));
                }
            }
            if let Some(p) = growth.growth_percent {
                if !(p.is_finite() && p > 0.0) {
                    warnings.push(ConfigWarning::error(format!(
                        "growth.growth_percent must be positive, got {p}"
                    )));
                }
            }
            if growth.months == Some(0) {
                warnings.push(ConfigWarning::error("growth.months must be at least 1"));
            }
            if growth.keywords_per_month == Some(0) {
                warnings.push(ConfigWarning::error(
                    "growth.keywords_per_month must be at least 1",
                ));
            }
            let missing = growth.missing_fields();
            if !missing.is_empty() && !growth.is_empty() {
                warnings.push(ConfigWarning::warning(format!(
                    "growth is missing {}; planning needs all four values",
                    missing.join(", ")
                )));
            }
        }

        if self.geo_filter.enabled && self.geo_filter.mode == GeoMode::Loose {
            warnings.push(ConfigWarning::warning(
                "geo_filter.mode is loose: any two or three letter word excludes a keyword",
            ));
        }

        if self.clustering.max_iterations == 0 {
            warnings.push(ConfigWarning::error(
                "clustering.max_iterations must be at least 1",
            ));
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
