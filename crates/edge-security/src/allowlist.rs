//! Host allowlist for embedded frames.

use url::Url;

/// Result type for allowlist operations.
pub type AllowlistResult<T> = Result<T, AllowlistError>;

/// Errors from allowlist checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllowlistError {
    #[error("host not allowed: {0}")]
    HostNotAllowed(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("scheme not allowed: {0}")]
    SchemeNotAllowed(String),
}

/// Hosts an embedded frame may load from.
///
/// Entries are exact hosts (`chzzk.naver.com`) or leading-wildcard patterns
/// (`*.twitch.tv`); a wildcard never matches the bare parent domain, the
/// same way CSP host sources behave.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameAllowlist {
    allow_self: bool,
    /// Entries in declaration order, lowercased.
    entries: Vec<String>,
}

impl FrameAllowlist {
    /// Create an empty allowlist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow same-origin frames (`'self'`).
    pub fn allow_self(mut self) -> Self {
        self.allow_self = true;
        self
    }

    /// Allow a specific host.
    pub fn allow_host(mut self, host: impl Into<String>) -> Self {
        self.entries.push(host.into().to_lowercase());
        self
    }

    /// Allow a host pattern of the form `*.example.com`.
    pub fn allow_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.entries.push(pattern.into().to_lowercase());
        self
    }

    /// Check whether a host is allowed.
    pub fn check_host(&self, host: &str) -> AllowlistResult<()> {
        let host_lower = host.to_lowercase();
        if self
            .entries
            .iter()
            .any(|entry| matches_pattern(&host_lower, entry))
        {
            Ok(())
        } else {
            Err(AllowlistError::HostNotAllowed(host.to_string()))
        }
    }

    /// Check whether a frame URL is allowed. Only `https` is accepted.
    pub fn check_url(&self, url: &str) -> AllowlistResult<()> {
        let parsed = Url::parse(url).map_err(|e| AllowlistError::InvalidUrl(e.to_string()))?;

        if parsed.scheme() != "https" {
            return Err(AllowlistError::SchemeNotAllowed(parsed.scheme().to_string()));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| AllowlistError::InvalidUrl(format!("no host in {}", url)))?;
        self.check_host(host)
    }

    /// Sources for a CSP `frame-src` directive.
    pub fn csp_sources(&self) -> Vec<String> {
        let mut sources = Vec::with_capacity(self.entries.len() + 1);
        if self.allow_self {
            sources.push("'self'".to_string());
        }
        sources.extend(self.entries.iter().cloned());
        sources
    }
}

fn matches_pattern(host: &str, pattern: &str) -> bool {
    match pattern.strip_prefix('*') {
        // "*.example.com" matches any subdomain but not "example.com"
        Some(suffix) => host.len() > suffix.len() && host.ends_with(suffix),
        None => host == pattern,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowlist() -> FrameAllowlist {
        FrameAllowlist::new()
            .allow_self()
            .allow_host("chzzk.naver.com")
            .allow_pattern("*.twitch.tv")
    }

    #[test]
    fn test_exact_and_wildcard_hosts() {
        let list = allowlist();
        assert!(list.check_host("chzzk.naver.com").is_ok());
        assert!(list.check_host("Player.Twitch.TV").is_ok());
        assert!(list.check_host("twitch.tv").is_err());
        assert!(list.check_host("evil-twitch.tv").is_err());
        assert!(list.check_host("m.chzzk.naver.com").is_err());
    }

    #[test]
    fn test_check_url() {
        let list = allowlist();
        assert!(list.check_url("https://www.twitch.tv/embed/x/chat").is_ok());
        assert_eq!(
            list.check_url("http://www.twitch.tv/"),
            Err(AllowlistError::SchemeNotAllowed("http".into()))
        );
        assert!(matches!(
            list.check_url("not a url"),
            Err(AllowlistError::InvalidUrl(_))
        ));
        assert!(matches!(
            list.check_url("https://example.com/"),
            Err(AllowlistError::HostNotAllowed(_))
        ));
    }

    #[test]
    fn test_csp_sources() {
        assert_eq!(
            allowlist().csp_sources(),
            vec!["'self'", "chzzk.naver.com", "*.twitch.tv"]
        );
        assert!(FrameAllowlist::new().csp_sources().is_empty());
    }
}
