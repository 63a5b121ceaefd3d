//! Orchestrator configuration
//!
//! Configuration is loaded from TOML (missing keys fall back to defaults) and
//! may be overridden from `PLAYTEST_*` environment variables. Every loader
//! validates before handing the value back.

use crate::{
    error::{PlaytestError, PlaytestResult},
    types::normalize_token,
};
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path, str::FromStr, time::Duration};

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "PLAYTEST_";

/// Model tier requested from the model client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTier {
    /// Cheapest, lowest-latency model
    Fast,
    /// Default trade-off between cost and quality
    #[default]
    Balanced,
    /// Highest quality model
    Quality,
}

impl ModelTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelTier::Fast => "fast",
            ModelTier::Balanced => "balanced",
            ModelTier::Quality => "quality",
        }
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelTier {
    type Err = PlaytestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "fast" => Ok(ModelTier::Fast),
            "balanced" => Ok(ModelTier::Balanced),
            "quality" => Ok(ModelTier::Quality),
            other => Err(PlaytestError::InvalidConfiguration(format!(
                "unknown model tier: '{other}'"
            ))),
        }
    }
}

/// Configuration consumed by [`PlaytestOrchestrator`](crate::PlaytestOrchestrator)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Run all testers concurrently instead of one at a time
    pub parallel_tests: bool,
    /// Sampling temperature forwarded to the model client
    pub temperature: f32,
    /// Model tier forwarded to the model client
    pub model: ModelTier,
    /// Hard deadline for a single tester's model call
    pub request_timeout_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            parallel_tests: true,
            temperature: 0.7,
            model: ModelTier::Balanced,
            request_timeout_ms: 60_000,
        }
    }
}

impl OrchestratorConfig {
    /// Maximum accepted sampling temperature
    pub const MAX_TEMPERATURE: f32 = 2.0;

    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> PlaytestResult<Self> {
        let config: Self = toml::from_str(source)
            .map_err(|e| PlaytestError::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> PlaytestResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| PlaytestError::ConfigLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| PlaytestError::ConfigLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `PLAYTEST_*` overrides from the process environment
    pub fn with_env_overrides(self) -> PlaytestResult<Self> {
        self.with_overrides_from(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok())
    }

    /// Apply overrides from an arbitrary key lookup (keys without prefix)
    pub fn with_overrides_from<F>(mut self, lookup: F) -> PlaytestResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("PARALLEL_TESTS") {
            self.parallel_tests = parse_bool(&value).ok_or_else(|| {
                invalid_override("PARALLEL_TESTS", &value)
            })?;
        }
        if let Some(value) = lookup("TEMPERATURE") {
            self.temperature = value
                .trim()
                .parse()
                .map_err(|_| invalid_override("TEMPERATURE", &value))?;
        }
        if let Some(value) = lookup("MODEL") {
            self.model = value.parse()?;
        }
        if let Some(value) = lookup("REQUEST_TIMEOUT_MS") {
            self.request_timeout_ms = value
                .trim()
                .parse()
                .map_err(|_| invalid_override("REQUEST_TIMEOUT_MS", &value))?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Check value ranges
    pub fn validate(&self) -> PlaytestResult<()> {
        if !self.temperature.is_finite()
            || self.temperature < 0.0
            || self.temperature > Self::MAX_TEMPERATURE
        {
            return Err(PlaytestError::InvalidConfiguration(format!(
                "temperature must be within [0.0, {}], got {}",
                Self::MAX_TEMPERATURE,
                self.temperature
            )));
        }

        if self.request_timeout_ms == 0 {
            return Err(PlaytestError::InvalidConfiguration(
                "request_timeout_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Per-call deadline as a [`Duration`]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn with_parallel_tests(mut self, parallel: bool) -> Self {
        self.parallel_tests = parallel;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_model(mut self, model: ModelTier) -> Self {
        self.model = model;
        self
    }

    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn invalid_override(key: &str, value: &str) -> PlaytestError {
    PlaytestError::InvalidConfiguration(format!("{ENV_PREFIX}{key} has invalid value '{value}'"))
}
