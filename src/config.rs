//! Analysis configuration: mining thresholds, rule ranking and layered loading

use crate::error::{MiningError, MiningResult};
use crate::ranking::SortKey;
use anyhow::Context;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_MIN_SUPPORT: f64 = 0.02;
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.2;
pub const DEFAULT_MIN_LIFT: f64 = 1.5;
pub const DEFAULT_TOP: usize = 10;

/// Environment variable prefix, e.g. `BASKETFORGE_MIN_SUPPORT=0.05`
pub const ENV_PREFIX: &str = "BASKETFORGE";

/// Thresholds for one mining run
#[derive(Debug, Clone, PartialEq)]
pub struct MiningConfig {
    /// Minimum fraction of transactions an itemset must appear in, in (0, 1]
    pub min_support: f64,
    /// Minimum rule confidence, in (0, 1]
    pub min_confidence: f64,
    /// Minimum rule lift, >= 0
    pub min_lift: f64,
    /// Largest itemset size to search for; `None` searches until exhaustion
    pub max_length: Option<usize>,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            min_support: DEFAULT_MIN_SUPPORT,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            min_lift: DEFAULT_MIN_LIFT,
            max_length: None,
        }
    }
}

impl MiningConfig {
    pub fn new(min_support: f64, min_confidence: f64, min_lift: f64) -> Self {
        Self {
            min_support,
            min_confidence,
            min_lift,
            max_length: None,
        }
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Check every threshold before any work is done.
    pub fn validate(&self) -> MiningResult<()> {
        validate_support(self.min_support)?;
        validate_confidence(self.min_confidence)?;
        validate_lift(self.min_lift)?;
        validate_max_length(self.max_length)
    }
}

pub(crate) fn validate_support(min_support: f64) -> MiningResult<()> {
    validate_unit_interval("min_support", min_support)
}

pub(crate) fn validate_confidence(min_confidence: f64) -> MiningResult<()> {
    validate_unit_interval("min_confidence", min_confidence)
}

pub(crate) fn validate_lift(min_lift: f64) -> MiningResult<()> {
    if min_lift.is_finite() && min_lift >= 0.0 {
        Ok(())
    } else {
        Err(MiningError::threshold(
            "min_lift",
            min_lift,
            "a finite value >= 0",
        ))
    }
}

pub(crate) fn validate_max_length(max_length: Option<usize>) -> MiningResult<()> {
    match max_length {
        Some(0) => Err(MiningError::InvalidMaxLength),
        _ => Ok(()),
    }
}

fn validate_unit_interval(name: &'static str, value: f64) -> MiningResult<()> {
    // NaN fails both comparisons
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(MiningError::threshold(name, value, "a value in (0, 1]"))
    }
}

/// Full configuration for an analysis run: mining thresholds plus how the
/// resulting rules are presented.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub mining: MiningConfig,
    /// Ordering applied to the rules before display
    pub sort_by: SortKey,
    /// Number of rules to display, 0 shows all
    pub top: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            mining: MiningConfig::default(),
            sort_by: SortKey::Confidence,
            top: DEFAULT_TOP,
        }
    }
}

/// Flat on-disk / environment representation
#[derive(Debug, Deserialize)]
struct RawSettings {
    min_support: f64,
    min_confidence: f64,
    min_lift: f64,
    #[serde(default)]
    max_length: Option<usize>,
    sort_by: SortKey,
    top: usize,
}

impl AnalysisConfig {
    /// Load configuration from built-in defaults, an optional TOML file and
    /// `BASKETFORGE_*` environment variables, in increasing precedence.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        let mut builder = Config::builder()
            .set_default("min_support", DEFAULT_MIN_SUPPORT)?
            .set_default("min_confidence", DEFAULT_MIN_CONFIDENCE)?
            .set_default("min_lift", DEFAULT_MIN_LIFT)?
            .set_default("sort_by", SortKey::Confidence.as_str())?
            .set_default("top", DEFAULT_TOP as i64)?;

        if let Some(path) = path {
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            builder = builder.add_source(File::from(path));
        }

        let raw: RawSettings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Ok(Self {
            mining: MiningConfig {
                min_support: raw.min_support,
                min_confidence: raw.min_confidence,
                min_lift: raw.min_lift,
                max_length: raw.max_length,
            },
            sort_by: raw.sort_by,
            top: raw.top,
        })
    }
}
