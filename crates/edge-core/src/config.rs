//! Site configuration.

use crate::error::ConfigError;

/// Domain all traffic is redirected to unless configured otherwise.
pub const DEFAULT_CANONICAL_HOST: &str = "multichzzk.tv";

/// Key-value store label used for static assets unless configured otherwise.
pub const DEFAULT_STORE_LABEL: &str = "default";

/// Application variable names read at startup.
pub mod variables {
    /// Canonical host name (e.g. `multichzzk.tv`).
    pub const CANONICAL_HOST: &str = "canonical_host";
    /// Static asset store: `kv:<label>` or an `https://` origin base URL.
    pub const STATIC_STORE: &str = "static_store";
    /// Log output format: `json` or `human`.
    pub const LOG_FORMAT: &str = "log_format";
}

/// Output format for logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON format (for production/log aggregation).
    #[default]
    Json,
    /// Human-readable format (for development).
    Human,
}

impl LogFormat {
    /// Parse from a variable value.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "human" => Ok(Self::Human),
            _ => Err(ConfigError::InvalidLogFormat(value.to_string())),
        }
    }
}

/// Where static assets are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// A Spin key-value store, by label.
    KeyValue(String),
    /// An HTTP origin; object keys are appended to the base URL.
    Origin(String),
}

impl StoreLocation {
    /// Parse `kv:<label>` or an `http://` / `https://` base URL.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let value = value.trim();

        if let Some(label) = value.strip_prefix("kv:") {
            if label.is_empty() {
                return Err(ConfigError::InvalidStore(value.to_string()));
            }
            return Ok(Self::KeyValue(label.to_string()));
        }

        if value.starts_with("https://") || value.starts_with("http://") {
            let mut base = value.to_string();
            if !base.ends_with('/') {
                base.push('/');
            }
            return Ok(Self::Origin(base));
        }

        Err(ConfigError::InvalidStore(value.to_string()))
    }
}

impl Default for StoreLocation {
    fn default() -> Self {
        Self::KeyValue(DEFAULT_STORE_LABEL.to_string())
    }
}

/// Process-wide site configuration.
///
/// Built once per instance and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// The single authoritative host name.
    pub canonical_host: String,
    /// Static asset store.
    pub store: StoreLocation,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            canonical_host: DEFAULT_CANONICAL_HOST.to_string(),
            store: StoreLocation::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl SiteConfig {
    /// Build the configuration from a variable lookup.
    ///
    /// Missing variables fall back to defaults; present but malformed ones
    /// are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup(variables::CANONICAL_HOST) {
            let host = host.trim().to_ascii_lowercase();
            if host.is_empty() {
                return Err(ConfigError::Empty(variables::CANONICAL_HOST));
            }
            config.canonical_host = host;
        }

        if let Some(store) = lookup(variables::STATIC_STORE) {
            config.store = StoreLocation::parse(&store)?;
        }

        if let Some(format) = lookup(variables::LOG_FORMAT) {
            config.log_format = LogFormat::parse(&format)?;
        }

        Ok(config)
    }

    /// Absolute HTTPS URL on the canonical host for a path.
    pub fn canonical_url(&self, path: &str) -> String {
        format!("https://{}{}", self.canonical_host, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_variables_missing() {
        let config = SiteConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, SiteConfig::default());
        assert_eq!(config.canonical_host, "multichzzk.tv");
        assert_eq!(config.store, StoreLocation::KeyValue("default".into()));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_variables_override_defaults() {
        let config = SiteConfig::from_lookup(lookup_from(&[
            ("canonical_host", "Example.COM"),
            ("static_store", "https://assets.example.com/bucket"),
            ("log_format", "human"),
        ]))
        .unwrap();

        assert_eq!(config.canonical_host, "example.com");
        assert_eq!(
            config.store,
            StoreLocation::Origin("https://assets.example.com/bucket/".into())
        );
        assert_eq!(config.log_format, LogFormat::Human);
    }

    #[test]
    fn test_empty_canonical_host_rejected() {
        let err = SiteConfig::from_lookup(lookup_from(&[("canonical_host", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::Empty("canonical_host"));
    }

    #[test]
    fn test_store_location_parse() {
        assert_eq!(
            StoreLocation::parse("kv:static").unwrap(),
            StoreLocation::KeyValue("static".into())
        );
        assert!(StoreLocation::parse("kv:").is_err());
        assert!(StoreLocation::parse("ftp://nope").is_err());
    }

    #[test]
    fn test_invalid_log_format_rejected() {
        assert!(SiteConfig::from_lookup(lookup_from(&[("log_format", "xml")])).is_err());
    }

    #[test]
    fn test_canonical_url() {
        let config = SiteConfig::default();
        assert_eq!(config.canonical_url("/abc"), "https://multichzzk.tv/abc");
    }
}
