use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{InsightsError, Result};
use crate::plan::TARGET_GRADE;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapConfig {
    /// Target used for `gapToTarget`; the improvement plan always aims at 85.
    pub custom_target: f64,
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            custom_target: TARGET_GRADE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub rank_limit: usize,
    pub include_plan: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            rank_limit: 10,
            include_plan: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gaps: GapConfig,
    pub report: ReportConfig,
}

impl AppConfig {
    /// Loads `path` when given, otherwise returns defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        debug!("loading config from {}", path.display());
        let raw = std::fs::read_to_string(path).map_err(|source| InsightsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&raw).map_err(|source| InsightsError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn validate(&self) -> Result<()> {
        let target = self.gaps.custom_target;
        if !(target > 0.0 && target <= 100.0) {
            return Err(InsightsError::InvalidConfig(format!(
                "gaps.custom_target must be within (0, 100], got {target}"
            )));
        }
        if self.report.rank_limit == 0 {
            return Err(InsightsError::InvalidConfig(
                "report.rank_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_path_uses_defaults() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.gaps.custom_target, 85.0);
        assert_eq!(config.report.rank_limit, 10);
        assert!(config.report.include_plan);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[gaps]\ncustom_target = 90.0").unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.gaps.custom_target, 90.0);
        assert_eq!(config.report, ReportConfig::default());
    }

    #[test]
    fn rejects_out_of_range_target() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[gaps]\ncustom_target = 120.0").unwrap();

        let err = AppConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, InsightsError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_malformed_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[report\nrank_limit = 3").unwrap();

        let err = AppConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, InsightsError::Config { .. }));
    }

    #[test]
    fn zero_rank_limit_is_invalid() {
        let config = AppConfig::from_toml("[report]\nrank_limit = 0").unwrap();
        assert!(config.validate().is_err());
    }
}
