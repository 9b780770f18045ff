//! Configuration for prodalloc optimization runs.
//!
//! A run is controlled by a single [`OptimizerConfig`], loaded from TOML or
//! YAML files or from the flat key/value parameters the surrounding system
//! hands over.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use prodalloc_config::{OptimizationMode, OptimizerConfig, PlanningStrategy};
//! use std::time::Duration;
//!
//! let config = OptimizerConfig::from_toml_str(r#"
//!     optimization_mode = "min"
//!     planning_strategy = 3
//!     time_limit_ms = 5000
//!     attribute_map = "PRODUCT_ID=article,MACHINE_ID=line"
//! "#).unwrap();
//!
//! assert_eq!(config.optimization_mode, OptimizationMode::Min);
//! assert_eq!(config.planning_strategy, PlanningStrategy::Cautious);
//! assert_eq!(config.time_limit(), Duration::from_millis(5000));
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use prodalloc_config::OptimizerConfig;
//!
//! let config = OptimizerConfig::load("optimizer.toml").unwrap_or_default();
//! // Proceeds with defaults if file doesn't exist
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use prodalloc_core::scale::MAX_PRECISION;
use prodalloc_core::{AttributeDictionary, DictionaryError, Precision};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_GLOBAL_LOW_VALUE: i64 = 0;
pub const DEFAULT_GLOBAL_HIGH_VALUE: i64 = 1_000_000;
pub const DEFAULT_GLOBAL_LOW_COST: i64 = 1;
pub const DEFAULT_GLOBAL_HIGH_COST: i64 = 1_000_000_000;
pub const DEFAULT_TIME_LIMIT_MS: u64 = 30_000;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid attribute map: {0}")]
    Dictionary(#[from] DictionaryError),

    #[error("Invalid parameter {key}='{value}': {reason}")]
    Parameter {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Run configuration for one optimization.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct OptimizerConfig {
    /// Objective direction.
    #[serde(default)]
    pub optimization_mode: OptimizationMode,

    /// Relation binding each (product, step) total to the plan value.
    #[serde(default)]
    pub planning_strategy: PlanningStrategy,

    /// Representation of allocation variable domains.
    #[serde(default)]
    pub domain_option: DomainOption,

    /// Allocation lower bound for records without an override (unscaled).
    #[serde(default = "default_global_low_value")]
    pub global_low_value: i64,

    /// Allocation upper bound for records without an override (unscaled).
    #[serde(default = "default_global_high_value")]
    pub global_high_value: i64,

    /// Lower bound of the auxiliary cost variable (unscaled).
    #[serde(default = "default_global_low_cost")]
    pub global_low_cost: i64,

    /// Upper bound of the auxiliary cost variable (unscaled).
    #[serde(default = "default_global_high_cost")]
    pub global_high_cost: i64,

    /// Decimal digits preserved when scaling inputs to integers.
    #[serde(default)]
    pub precision: u32,

    /// Search deadline in milliseconds.
    #[serde(default = "default_time_limit_ms")]
    pub time_limit_ms: u64,

    /// `KEY=value,...` mapping of canonical attributes to source fields.
    #[serde(default)]
    pub attribute_map: Option<String>,

    /// Which machine figure caps utilization.
    #[serde(default)]
    pub capacity_bound: CapacityBound,

    /// Explicit admissible allocation values for [`DomainOption::List`] (unscaled).
    #[serde(default)]
    pub admissible_values: Option<Vec<Decimal>>,

    /// Step between generated admissible values for [`DomainOption::List`] (unscaled).
    #[serde(default = "default_list_step")]
    pub list_step: i64,

    /// Maximum number of search nodes.
    #[serde(default)]
    pub node_limit: Option<u64>,
}

fn default_global_low_value() -> i64 {
    DEFAULT_GLOBAL_LOW_VALUE
}

fn default_global_high_value() -> i64 {
    DEFAULT_GLOBAL_HIGH_VALUE
}

fn default_global_low_cost() -> i64 {
    DEFAULT_GLOBAL_LOW_COST
}

fn default_global_high_cost() -> i64 {
    DEFAULT_GLOBAL_HIGH_COST
}

fn default_time_limit_ms() -> u64 {
    DEFAULT_TIME_LIMIT_MS
}

fn default_list_step() -> i64 {
    1
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            optimization_mode: OptimizationMode::default(),
            planning_strategy: PlanningStrategy::default(),
            domain_option: DomainOption::default(),
            global_low_value: DEFAULT_GLOBAL_LOW_VALUE,
            global_high_value: DEFAULT_GLOBAL_HIGH_VALUE,
            global_low_cost: DEFAULT_GLOBAL_LOW_COST,
            global_high_cost: DEFAULT_GLOBAL_HIGH_COST,
            precision: 0,
            time_limit_ms: DEFAULT_TIME_LIMIT_MS,
            attribute_map: None,
            capacity_bound: CapacityBound::default(),
            admissible_values: None,
            list_step: default_list_step(),
            node_limit: None,
        }
    }
}

impl OptimizerConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist, contains invalid TOML or fails
    /// [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds configuration from flat string parameters.
    ///
    /// Keys are the camelCase parameter names (`optimizationMode`,
    /// `planningStrategy`, `timeLimitMs`, ...). Keys not recognized here are
    /// skipped; blank values keep the default.
    ///
    /// # Examples
    ///
    /// ```
    /// use prodalloc_config::{DomainOption, OptimizerConfig, PlanningStrategy};
    ///
    /// let config = OptimizerConfig::from_parameters([
    ///     ("planningStrategy", "AGGRESSIVE"),
    ///     ("domainOption", "list"),
    ///     ("globalHighValue", "500"),
    /// ]).unwrap();
    ///
    /// assert_eq!(config.planning_strategy, PlanningStrategy::Aggressive);
    /// assert_eq!(config.domain_option, DomainOption::List);
    /// assert_eq!(config.global_high_value, 500);
    /// ```
    pub fn from_parameters<I, K, V>(parameters: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in parameters {
            config.apply_parameter(key.as_ref(), value.as_ref())?;
        }
        config.validate()?;
        Ok(config)
    }

    fn apply_parameter(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(());
        }
        match key.trim() {
            "optimizationMode" => self.optimization_mode = OptimizationMode::parse(value),
            "planningStrategy" => self.planning_strategy = parse_parameter(key, value)?,
            "domainOption" => self.domain_option = parse_parameter(key, value)?,
            "globalLowValue" => self.global_low_value = parse_parameter(key, value)?,
            "globalHighValue" => self.global_high_value = parse_parameter(key, value)?,
            "globalLowCost" => self.global_low_cost = parse_parameter(key, value)?,
            "globalHighCost" => self.global_high_cost = parse_parameter(key, value)?,
            "precision" => self.precision = parse_parameter(key, value)?,
            "timeLimitMs" => self.time_limit_ms = parse_parameter(key, value)?,
            "attributeMap" => self.attribute_map = Some(value.to_string()),
            "capacityBound" => self.capacity_bound = parse_parameter(key, value)?,
            "listStep" => self.list_step = parse_parameter(key, value)?,
            "nodeLimit" => self.node_limit = Some(parse_parameter(key, value)?),
            "admissibleValues" => {
                let values = value
                    .split([';', ','])
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| parse_parameter::<Decimal>(key, v))
                    .collect::<Result<Vec<_>, _>>()?;
                self.admissible_values = Some(values);
            }
            other => debug!(event = "unknown_parameter", key = other, "skipping parameter"),
        }
        Ok(())
    }

    pub fn with_optimization_mode(mut self, mode: OptimizationMode) -> Self {
        self.optimization_mode = mode;
        self
    }

    pub fn with_planning_strategy(mut self, strategy: PlanningStrategy) -> Self {
        self.planning_strategy = strategy;
        self
    }

    pub fn with_domain_option(mut self, option: DomainOption) -> Self {
        self.domain_option = option;
        self
    }

    /// Sets the global allocation bounds.
    pub fn with_value_bounds(mut self, low: i64, high: i64) -> Self {
        self.global_low_value = low;
        self.global_high_value = high;
        self
    }

    /// Sets the auxiliary cost variable bounds.
    pub fn with_cost_bounds(mut self, low: i64, high: i64) -> Self {
        self.global_low_cost = low;
        self.global_high_cost = high;
        self
    }

    pub fn with_precision(mut self, digits: u32) -> Self {
        self.precision = digits;
        self
    }

    pub fn with_time_limit_ms(mut self, millis: u64) -> Self {
        self.time_limit_ms = millis;
        self
    }

    pub fn with_attribute_map(mut self, map: impl Into<String>) -> Self {
        self.attribute_map = Some(map.into());
        self
    }

    pub fn with_capacity_bound(mut self, bound: CapacityBound) -> Self {
        self.capacity_bound = bound;
        self
    }

    pub fn with_admissible_values(mut self, values: impl IntoIterator<Item = Decimal>) -> Self {
        self.admissible_values = Some(values.into_iter().collect());
        self
    }

    pub fn with_list_step(mut self, step: i64) -> Self {
        self.list_step = step;
        self
    }

    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    /// Returns the search deadline.
    pub fn time_limit(&self) -> Duration {
        Duration::from_millis(self.time_limit_ms)
    }

    /// Returns the configured scaling precision.
    pub fn precision(&self) -> Result<Precision, ConfigError> {
        Precision::new(self.precision).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Builds the attribute dictionary from `attribute_map`.
    pub fn attribute_dictionary(&self) -> Result<AttributeDictionary, ConfigError> {
        match &self.attribute_map {
            Some(map) => Ok(AttributeDictionary::parse(map)?),
            None => Ok(AttributeDictionary::new()),
        }
    }

    /// Checks bound ordering and numeric limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.global_low_value < 0 {
            return Err(ConfigError::Invalid(format!(
                "global_low_value must not be negative, got {}",
                self.global_low_value
            )));
        }
        if self.global_low_value > self.global_high_value {
            return Err(ConfigError::Invalid(format!(
                "global_low_value {} exceeds global_high_value {}",
                self.global_low_value, self.global_high_value
            )));
        }
        if self.global_low_cost > self.global_high_cost {
            return Err(ConfigError::Invalid(format!(
                "global_low_cost {} exceeds global_high_cost {}",
                self.global_low_cost, self.global_high_cost
            )));
        }
        if self.precision > MAX_PRECISION {
            return Err(ConfigError::Invalid(format!(
                "precision {} exceeds maximum {}",
                self.precision, MAX_PRECISION
            )));
        }
        if self.time_limit_ms == 0 {
            return Err(ConfigError::Invalid(
                "time_limit_ms must be at least 1".to_string(),
            ));
        }
        if self.list_step < 1 {
            return Err(ConfigError::Invalid(format!(
                "list_step must be at least 1, got {}",
                self.list_step
            )));
        }
        Ok(())
    }
}

fn parse_parameter<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Parameter {
        key: key.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Objective direction.
///
/// Parsing is lenient: `"min"` in any case selects [`Min`](Self::Min),
/// every other value selects [`Max`](Self::Max).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OptimizationMode {
    /// Minimize total cost.
    Min,

    /// Maximize total machine utilization.
    #[default]
    Max,
}

impl OptimizationMode {
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("min") {
            OptimizationMode::Min
        } else {
            OptimizationMode::Max
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OptimizationMode::Min => "MIN",
            OptimizationMode::Max => "MAX",
        }
    }
}

impl fmt::Display for OptimizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OptimizationMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OptimizationMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(OptimizationMode::parse(&s))
    }
}

/// Relation binding each (product, step) total to the plan value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PlanningStrategy {
    /// `total >= plan`
    Aggressive,

    /// `total == plan`
    #[default]
    Balanced,

    /// `total <= plan`
    Cautious,
}

impl PlanningStrategy {
    /// Numeric code used by the surrounding system.
    pub fn code(self) -> u8 {
        match self {
            PlanningStrategy::Aggressive => 1,
            PlanningStrategy::Balanced => 2,
            PlanningStrategy::Cautious => 3,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(PlanningStrategy::Aggressive),
            2 => Some(PlanningStrategy::Balanced),
            3 => Some(PlanningStrategy::Cautious),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlanningStrategy::Aggressive => "AGGRESSIVE",
            PlanningStrategy::Balanced => "BALANCED",
            PlanningStrategy::Cautious => "CAUTIOUS",
        }
    }
}

impl fmt::Display for PlanningStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanningStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u64>() {
            return Self::from_code(code).ok_or_else(|| format!("unknown strategy code {code}"));
        }
        [
            PlanningStrategy::Aggressive,
            PlanningStrategy::Balanced,
            PlanningStrategy::Cautious,
        ]
        .into_iter()
        .find(|p| p.as_str().eq_ignore_ascii_case(s))
        .ok_or_else(|| format!("unknown strategy '{s}'"))
    }
}

impl Serialize for PlanningStrategy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PlanningStrategy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Code(u64),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Code(code) => Self::from_code(code)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown strategy code {code}"))),
            Raw::Name(name) => name.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Representation of allocation variable domains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainOption {
    /// Interval `[low, high]`.
    #[default]
    #[serde(alias = "BOUND")]
    Bound,

    /// Explicit enumeration of admissible values.
    #[serde(alias = "LIST")]
    List,
}

impl FromStr for DomainOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bound" => Ok(DomainOption::Bound),
            "list" => Ok(DomainOption::List),
            other => Err(format!("unknown domain option '{other}'")),
        }
    }
}

/// Machine figure used as the utilization upper bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityBound {
    /// The machine's `upperBound`.
    #[default]
    #[serde(alias = "UPPER_BOUND")]
    UpperBound,

    /// The machine's `resourceTotal`.
    #[serde(alias = "RESOURCE_TOTAL")]
    ResourceTotal,
}

impl FromStr for CapacityBound {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upper_bound" | "upper" => Ok(CapacityBound::UpperBound),
            "resource_total" | "total" => Ok(CapacityBound::ResourceTotal),
            other => Err(format!("unknown capacity bound '{other}'")),
        }
    }
}
