//! Configuration errors, raised before any plan processing begins.

/// Errors raised while loading or validating an [`MktrConfig`].
///
/// [`MktrConfig`]: crate::config::MktrConfig
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown CSP encoder: {0}")]
    UnknownEncoder(String),

    #[error("unknown relaxation policy: {0}")]
    UnknownPolicy(String),

    #[error("links per step must be positive")]
    InvalidLinksPerStep,

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
