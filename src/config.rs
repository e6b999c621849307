//! Engine configuration.
//!
//! Loaded from TOML or built in code; [`MktrConfig::resolve`] validates the
//! encoder/policy names and numeric bounds before any plan processing
//! begins, so an unsupported configuration never gets as far as building a
//! structure.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::encode::EncoderKind;
use crate::errors::ConfigError;
use crate::policy::PolicyKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MktrConfig {
    /// CSP encoder name, see [`EncoderKind::from_name`].
    pub encoder: String,
    /// Relaxation policy name, see [`PolicyKind::from_name`].
    pub policy: String,
    /// Treewidth budget for the working structure's encoded CSP.
    pub max_treewidth: usize,
    /// Candidate links attempted per batch.
    pub links_per_step: usize,
    /// Wall-clock budget for the relax loop in seconds; 0 means no limit.
    pub time_limit_secs: u64,
    /// Time limit for post-run count/enumeration queries; 0 means no limit.
    pub query_time_limit_secs: u64,
    /// Validate every newly found instantiation during the run.
    pub validate_instantiations: bool,
    /// Per-iteration treewidth estimates and instantiation counts.
    pub verbose: bool,
}

impl Default for MktrConfig {
    fn default() -> Self {
        Self {
            encoder: EncoderKind::ModalTruth.name().to_owned(),
            policy: PolicyKind::MinimumArity.name().to_owned(),
            max_treewidth: 2,
            links_per_step: 1,
            time_limit_secs: 0,
            query_time_limit_secs: 0,
            validate_instantiations: false,
            verbose: false,
        }
    }
}

impl MktrConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Validates the configuration into concrete registry entries.
    pub fn resolve(&self) -> Result<(EncoderKind, PolicyKind), ConfigError> {
        if self.links_per_step == 0 {
            return Err(ConfigError::InvalidLinksPerStep);
        }
        let encoder = EncoderKind::from_name(&self.encoder)?;
        let policy = PolicyKind::from_name(&self.policy)?;
        Ok((encoder, policy))
    }

    /// The relax-loop budget; `None` blocks until completion or external
    /// cancellation.
    pub fn time_limit(&self) -> Option<Duration> {
        (self.time_limit_secs > 0).then(|| Duration::from_secs(self.time_limit_secs))
    }

    /// The post-run query budget.
    pub fn query_time_limit(&self) -> Option<Duration> {
        (self.query_time_limit_secs > 0).then(|| Duration::from_secs(self.query_time_limit_secs))
    }
}
