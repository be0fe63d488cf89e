//! Content-Security-Policy and companion security headers.

use std::fmt;

/// Header names for security headers.
pub mod header_names {
    pub const CONTENT_SECURITY_POLICY: &str = "content-security-policy";
    pub const STRICT_TRANSPORT_SECURITY: &str = "strict-transport-security";
    pub const X_CONTENT_TYPE_OPTIONS: &str = "x-content-type-options";
}

/// CSP directive names used by the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    BaseUri,
    DefaultSrc,
    ScriptSrc,
    StyleSrc,
    FrameSrc,
    ObjectSrc,
}

impl Directive {
    /// Directive name as it appears in the header.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BaseUri => "base-uri",
            Self::DefaultSrc => "default-src",
            Self::ScriptSrc => "script-src",
            Self::StyleSrc => "style-src",
            Self::FrameSrc => "frame-src",
            Self::ObjectSrc => "object-src",
        }
    }
}

/// Ordered Content-Security-Policy builder.
///
/// Directives render in insertion order; setting a directive twice replaces
/// its sources in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentSecurityPolicy {
    directives: Vec<(Directive, Vec<String>)>,
}

impl ContentSecurityPolicy {
    /// Create an empty policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sources of a directive.
    pub fn with<I, S>(mut self, directive: Directive, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sources: Vec<String> = sources.into_iter().map(Into::into).collect();
        match self.directives.iter_mut().find(|(d, _)| *d == directive) {
            Some((_, existing)) => *existing = sources,
            None => self.directives.push((directive, sources)),
        }
        self
    }

    /// Render the header value.
    pub fn render(&self) -> String {
        self.directives
            .iter()
            .map(|(directive, sources)| {
                if sources.is_empty() {
                    directive.as_str().to_string()
                } else {
                    format!("{} {}", directive.as_str(), sources.join(" "))
                }
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl fmt::Display for ContentSecurityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Security headers attached to rendered documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityHeaders {
    /// HSTS max-age in seconds; `None` omits the header.
    pub hsts_max_age: Option<u64>,
    /// Add `includeSubDomains` to HSTS.
    pub hsts_include_subdomains: bool,
    /// Send `x-content-type-options: nosniff`.
    pub nosniff: bool,
    /// Content security policy; `None` omits the header.
    pub csp: Option<ContentSecurityPolicy>,
}

impl Default for SecurityHeaders {
    fn default() -> Self {
        Self {
            hsts_max_age: Some(31_536_000),
            hsts_include_subdomains: true,
            nosniff: true,
            csp: None,
        }
    }
}

impl SecurityHeaders {
    /// HSTS for one year including subdomains, plus nosniff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a content security policy.
    pub fn with_csp(mut self, csp: ContentSecurityPolicy) -> Self {
        self.csp = Some(csp);
        self
    }

    /// Header name/value pairs.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(csp) = &self.csp {
            pairs.push((header_names::CONTENT_SECURITY_POLICY, csp.render()));
        }

        if let Some(max_age) = self.hsts_max_age {
            let mut value = format!("max-age={}", max_age);
            if self.hsts_include_subdomains {
                value.push_str("; includeSubDomains");
            }
            pairs.push((header_names::STRICT_TRANSPORT_SECURITY, value));
        }

        if self.nosniff {
            pairs.push((header_names::X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()));
        }

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_preserves_order() {
        let csp = ContentSecurityPolicy::new()
            .with(Directive::BaseUri, ["'self'"])
            .with(Directive::DefaultSrc, ["'self'"])
            .with(Directive::ObjectSrc, ["'none'"]);

        assert_eq!(
            csp.render(),
            "base-uri 'self'; default-src 'self'; object-src 'none'"
        );
    }

    #[test]
    fn test_with_replaces_existing_directive() {
        let csp = ContentSecurityPolicy::new()
            .with(Directive::DefaultSrc, ["'none'"])
            .with(Directive::FrameSrc, ["'self'"])
            .with(Directive::DefaultSrc, ["'self'"]);

        assert_eq!(csp.render(), "default-src 'self'; frame-src 'self'");
    }

    #[test]
    fn test_security_header_pairs() {
        let pairs = SecurityHeaders::new()
            .with_csp(ContentSecurityPolicy::new().with(Directive::DefaultSrc, ["'self'"]))
            .to_pairs();

        assert_eq!(
            pairs,
            vec![
                ("content-security-policy", "default-src 'self'".to_string()),
                (
                    "strict-transport-security",
                    "max-age=31536000; includeSubDomains".to_string()
                ),
                ("x-content-type-options", "nosniff".to_string()),
            ]
        );
    }
}
