//! Decoding parameters that drive a [`SamplerChain`](crate::SamplerChain).
//!
//! The parameter set can be built in code or read from a TOML document whose
//! keys mirror the field names; missing keys fall back to the defaults.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SamplerError};
use crate::penalty::check_penalty;
use crate::temperature::check_temperature;
use crate::top_p::{check_top_p, NucleusRule};

/// Default values, chosen to leave the model distribution unchanged.
pub mod defaults {
    /// Plain softmax.
    pub const TEMPERATURE: f64 = 1.0;
    /// Keep the full support.
    pub const TOP_P: f64 = 1.0;
    /// No presence penalty.
    pub const PRESENCE_PENALTY: f64 = 0.0;
    /// No frequency penalty.
    pub const FREQUENCY_PENALTY: f64 = 0.0;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingParams {
    pub temperature: f64,
    pub top_p: f64,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
    pub nucleus_rule: NucleusRule,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: defaults::TEMPERATURE,
            top_p: defaults::TOP_P,
            presence_penalty: defaults::PRESENCE_PENALTY,
            frequency_penalty: defaults::FREQUENCY_PENALTY,
            nucleus_rule: NucleusRule::default(),
        }
    }
}

impl SamplingParams {
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn with_penalties(mut self, presence_penalty: f64, frequency_penalty: f64) -> Self {
        self.presence_penalty = presence_penalty;
        self.frequency_penalty = frequency_penalty;
        self
    }

    pub fn with_nucleus_rule(mut self, rule: NucleusRule) -> Self {
        self.nucleus_rule = rule;
        self
    }

    /// Check every scalar against the preconditions of the stage that uses it.
    ///
    /// Penalties outside `[-2, 2]` pass; only non-finite penalties fail. The
    /// range warning is left to the penalty stage, which logs it when the
    /// coefficient is actually applied.
    pub fn validate(&self) -> Result<()> {
        check_temperature(self.temperature)?;
        check_top_p(self.top_p)?;
        check_penalty("presence_penalty", self.presence_penalty)?;
        check_penalty("frequency_penalty", self.frequency_penalty)?;
        Ok(())
    }

    /// Parse and validate parameters from a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let params: SamplingParams =
            toml::from_str(s).map_err(|e| SamplerError::Config(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| SamplerError::Config(e.to_string()))
    }
}
