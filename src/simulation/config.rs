// src/simulation/config.rs
use crate::core::{QsimError, QsimResult};
use serde::{Deserialize, Serialize};

/// Shot count used when none is configured.
pub const DEFAULT_SHOTS: u64 = 1024;

/// Run settings for [`Simulator`](super::Simulator).
///
/// Missing JSON fields fall back to [`Default`]:
///
/// ```
/// use qsim::SimulatorConfig;
///
/// let config = SimulatorConfig::from_json(r#"{"seed": 42}"#).unwrap();
/// assert_eq!(config.shots, 1024);
/// assert_eq!(config.seed, Some(42));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Samples drawn per run. Must be positive.
    pub shots: u64,
    /// Sampler seed; `None` draws a fresh one per run.
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self { shots: DEFAULT_SHOTS, seed: None }
    }
}

impl SimulatorConfig {
    pub fn with_shots(mut self, shots: u64) -> Self {
        self.shots = shots;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// # Errors
    /// `InvalidConfiguration` when `shots` is zero.
    pub fn validate(&self) -> QsimResult<()> {
        if self.shots == 0 {
            return Err(QsimError::config("shots must be greater than zero"));
        }
        Ok(())
    }

    /// Parses and validates a JSON config.
    pub fn from_json(json: &str) -> QsimResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| QsimError::config(format!("invalid simulator config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> QsimResult<String> {
        serde_json::to_string(self).map_err(|e| QsimError::config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SimulatorConfig::default();
        assert_eq!(config.shots, DEFAULT_SHOTS);
        assert_eq!(config.seed, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_and_json_agree() {
        let config = SimulatorConfig::default().with_shots(100).with_seed(9);
        let parsed = SimulatorConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn zero_shots_rejected() {
        let err = SimulatorConfig::from_json(r#"{"shots": 0}"#).unwrap_err();
        assert!(matches!(err, QsimError::InvalidConfiguration { .. }));
    }

    #[test]
    fn malformed_json_rejected() {
        let err = SimulatorConfig::from_json(r#"{"shots": "many"}"#).unwrap_err();
        assert!(matches!(err, QsimError::InvalidConfiguration { .. }));
    }
}
