//! config — engine configuration loaded from `zoneguard.toml`
//!
//! Every field has a default, so an empty file is a valid configuration.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::annotation::{AnnotationStyles, OverlayStyle};
use crate::association::HelmetMatcher;
use crate::compliance::DEFAULT_WARNING_SUFFIX;
use crate::detection::LabelSet;
use crate::metrics::DEFAULT_REPORT_INTERVAL;
use crate::zones::DEFAULT_RESTRICTED_ZONE;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Zone names that count as restricted.
    pub restricted_zones: Vec<String>,
    /// Appended to the label of an in-zone person without a helmet.
    pub warning_suffix: String,
    pub labels: LabelSet,
    pub association: HelmetMatcher,
    /// Cross-frame verdict hold; absent means frame-local association.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hold: Option<HoldConfig>,
    pub style: AnnotationStyles,
    pub overlay: OverlayStyle,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HoldConfig {
    /// Reset period in frames, per stream.
    pub frames: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsConfig {
    pub report_interval_secs: u64,
}

impl MetricsConfig {
    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval_secs)
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            report_interval_secs: DEFAULT_REPORT_INTERVAL.as_secs(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            restricted_zones: vec![DEFAULT_RESTRICTED_ZONE.to_string()],
            warning_suffix: DEFAULT_WARNING_SUFFIX.to_string(),
            labels: LabelSet::default(),
            association: HelmetMatcher::default(),
            hold: None,
            style: AnnotationStyles::default(),
            overlay: OverlayStyle::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Read, parse and validate a TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialise config")
    }

    pub fn validate(&self) -> Result<()> {
        if self.restricted_zones.is_empty() {
            bail!("restricted_zones must name at least one zone");
        }
        let divisor = self.association.head_divisor;
        if !divisor.is_finite() || divisor <= 0.0 {
            bail!("association.head_divisor must be a positive number, got {divisor}");
        }
        if self.labels.person.is_empty() || self.labels.helmet.is_empty() {
            bail!("labels.person and labels.helmet must each list at least one label");
        }
        if let Some(hold) = self.hold {
            if hold.frames == 0 {
                bail!("hold.frames must be at least 1");
            }
        }
        Ok(())
    }
}
