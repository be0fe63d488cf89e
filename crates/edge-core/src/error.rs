//! Configuration error type.

/// Error type for configuration loading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("variable '{0}' must not be empty")]
    Empty(&'static str),

    #[error("invalid store location '{0}': expected 'kv:<label>' or an http(s) URL")]
    InvalidStore(String),

    #[error("invalid log format '{0}': expected 'json' or 'human'")]
    InvalidLogFormat(String),
}
