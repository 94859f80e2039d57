use crate::core::memo::DEFAULT_CACHE_CAPACITY;
use crate::core::timing::{SizeSchedule, DEFAULT_CEILING};
use crate::domain::model::Strategy;
use crate::domain::ports::{ConfigProvider, ExperimentConfig};
use crate::utils::error::{OptimizerError, Result};
use crate::utils::validation::{self, Validate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Timing experiment described in a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub experiment: ExperimentSection,
    pub catalogue: CatalogueSection,
    pub search: SearchSection,
    pub timing: Option<TimingSection>,
    pub load: LoadSection,
    pub monitoring: Option<MonitoringSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentSection {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogueSection {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSection {
    pub budget: Decimal,
    pub strategy: Option<Strategy>,
    /// 0 關閉記憶化
    pub cache_capacity: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimingSection {
    pub start: Option<usize>,
    pub end: Option<usize>,
    pub step: Option<usize>,
    pub ceiling_seconds: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadSection {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionSection {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringSection {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| OptimizerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CATALOGUE_DIR})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| OptimizerError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("experiment.name", &self.experiment.name)?;
        validation::validate_path("catalogue.path", &self.catalogue.path)?;
        validation::validate_budget("search.budget", self.search.budget)?;
        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_output_formats("load.output_formats", &self.load.output_formats)?;

        if let Some(timing) = &self.timing {
            if let Some(step) = timing.step {
                validation::validate_positive_number("timing.step", step, 1)?;
            }
            if let (Some(start), Some(end)) = (timing.start, timing.end) {
                if start > end {
                    return Err(OptimizerError::InvalidConfigValueError {
                        field: "timing.end".to_string(),
                        value: end.to_string(),
                        reason: format!("must not be smaller than timing.start ({})", start),
                    });
                }
            }
            if let Some(seconds) = timing.ceiling_seconds {
                if !seconds.is_finite() {
                    return Err(OptimizerError::InvalidConfigValueError {
                        field: "timing.ceiling_seconds".to_string(),
                        value: seconds.to_string(),
                        reason: "must be a finite number of seconds".to_string(),
                    });
                }
                validation::validate_range("timing.ceiling_seconds", seconds, 0.001, 86_400.0)?;
            }
        }

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.search.strategy = Some(strategy);
    }

    pub fn set_budget(&mut self, budget: Decimal) {
        self.search.budget = budget;
    }
}

impl ConfigProvider for TomlConfig {
    fn catalogue_path(&self) -> &str {
        &self.catalogue.path
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn budget(&self) -> Decimal {
        self.search.budget
    }

    fn strategy(&self) -> Strategy {
        self.search.strategy.unwrap_or_default()
    }

    fn cache_capacity(&self) -> usize {
        self.search.cache_capacity.unwrap_or(DEFAULT_CACHE_CAPACITY)
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn compress(&self) -> bool {
        self.load.compression.as_ref().map(|c| c.enabled).unwrap_or(false)
    }
}

impl ExperimentConfig for TomlConfig {
    fn experiment_name(&self) -> &str {
        &self.experiment.name
    }

    fn size_schedule(&self) -> SizeSchedule {
        let defaults = SizeSchedule::default();
        match &self.timing {
            Some(timing) => SizeSchedule {
                start: timing.start.unwrap_or(defaults.start),
                end: timing.end,
                step: timing.step.unwrap_or(defaults.step),
            },
            None => defaults,
        }
    }

    fn ceiling(&self) -> Duration {
        self.timing
            .as_ref()
            .and_then(|timing| timing.ceiling_seconds)
            .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
            .unwrap_or(DEFAULT_CEILING)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
