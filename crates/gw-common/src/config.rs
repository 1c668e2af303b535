//! Default processing options.

use crate::codes::{ExtrapolationMethod, FactorFileFormat, FactorMethod};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Default values applied when a caller does not override them per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostprocConfig {
    /// Value written where interpolation is not possible.
    pub no_interp_value: f64,

    /// Absolute value at or above which a cell value is dry/inactive.
    pub interp_threshold: f64,

    /// Rescale surviving donor weights when some donors are dry.
    pub reapportion: bool,

    /// Extrapolation used outside the span of simulation times.
    pub extrapolation: ExtrapolationMethod,

    /// Maximum time distance over which extrapolation is permitted.
    pub time_extrap: f64,

    /// Donor selection for new factor sets.
    pub factor_method: FactorMethod,

    /// Encoding of new factor artifacts.
    pub factor_format: FactorFileFormat,
}

impl Default for PostprocConfig {
    fn default() -> Self {
        Self {
            no_interp_value: 1.0e30,
            interp_threshold: 1.0e20,
            reapportion: false,
            extrapolation: ExtrapolationMethod::Linear,
            time_extrap: 0.0,
            factor_method: FactorMethod::Smooth,
            factor_format: FactorFileFormat::Ascii,
        }
    }
}

impl PostprocConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("GWPP_NO_INTERP_VALUE") {
            if let Ok(v) = val.parse() {
                config.no_interp_value = v;
            }
        }

        if let Ok(val) = std::env::var("GWPP_INTERP_THRESHOLD") {
            if let Ok(v) = val.parse() {
                config.interp_threshold = v;
            }
        }

        if let Ok(val) = std::env::var("GWPP_REAPPORTION") {
            config.reapportion = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("GWPP_EXTRAPOLATION") {
            if let Ok(method) = ExtrapolationMethod::from_str(&val) {
                config.extrapolation = method;
            }
        }

        if let Ok(val) = std::env::var("GWPP_TIME_EXTRAP") {
            if let Ok(v) = val.parse() {
                config.time_extrap = v;
            }
        }

        if let Ok(val) = std::env::var("GWPP_FACTOR_METHOD") {
            if let Ok(method) = FactorMethod::from_str(&val) {
                config.factor_method = method;
            }
        }

        if let Ok(val) = std::env::var("GWPP_FACTOR_FORMAT") {
            if let Ok(format) = FactorFileFormat::from_str(&val) {
                config.factor_format = format;
            }
        }

        config
    }

    /// Parse configuration from a YAML document; missing keys keep defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.interp_threshold.is_finite() || self.interp_threshold <= 0.0 {
            return Err("interp_threshold must be a positive finite number".to_string());
        }

        if !self.time_extrap.is_finite() || self.time_extrap < 0.0 {
            return Err("time_extrap must be >= 0".to_string());
        }

        if self.no_interp_value.is_nan() {
            return Err("no_interp_value must not be NaN".to_string());
        }

        Ok(())
    }
}
