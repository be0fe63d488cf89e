//! Request context with typed method and host.

use std::sync::atomic::{AtomicU32, Ordering};

use http::HeaderMap;

/// Unique request identifier for tracing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generate a new request ID.
    pub fn generate() -> Self {
        static COUNTER: AtomicU32 = AtomicU32::new(0);

        let id = format!(
            "{:x}-{:x}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos(),
            COUNTER.fetch_add(1, Ordering::Relaxed)
        );
        Self(id)
    }

    /// Create from an existing ID string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// HTTP method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Options,
    Post,
    Put,
    Delete,
    Patch,
    /// Any other method token, kept verbatim.
    Other(String),
}

/// Methods the handler answers; everything else gets a 405.
pub const ALLOWED_METHODS: [Method; 3] = [Method::Options, Method::Get, Method::Head];

impl Method {
    /// Parse a method token. Method names are case-sensitive.
    pub fn parse(s: &str) -> Self {
        match s {
            "GET" => Self::Get,
            "HEAD" => Self::Head,
            "OPTIONS" => Self::Options,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "PATCH" => Self::Patch,
            other => Self::Other(other.to_string()),
        }
    }

    /// Convert to HTTP method string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Other(s) => s,
        }
    }

    /// Whether the handler answers this method.
    pub fn is_allowed(&self) -> bool {
        ALLOWED_METHODS.contains(self)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of the `Allow` header: the allowed methods, comma-joined.
pub fn allow_header_value() -> String {
    ALLOWED_METHODS
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Typed request context passed to the router.
#[derive(Debug)]
pub struct RequestContext {
    /// Unique request identifier.
    pub request_id: RequestId,
    /// HTTP method.
    pub method: Method,
    /// Host name without port, lowercased.
    pub host: String,
    /// Request path, still percent-encoded.
    pub path: String,
    /// Raw query string, if any.
    pub query: Option<String>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl RequestContext {
    /// Create a new request context.
    pub fn new(method: Method, host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::generate(),
            method,
            host: host.into(),
            path: path.into(),
            query: None,
            headers: HeaderMap::new(),
        }
    }

    /// Build a context from an `http` request.
    ///
    /// The host comes from the `Host` header and falls back to the URI
    /// authority.
    pub fn from_http<B>(req: &http::Request<B>) -> Self {
        let uri = req.uri();
        let host = req
            .headers()
            .get(http::header::HOST)
            .and_then(|v| v.to_str().ok())
            .or_else(|| uri.host())
            .map(normalize_host)
            .unwrap_or_default();

        let path = match uri.path() {
            "" => "/".to_string(),
            p => p.to_string(),
        };

        Self {
            request_id: RequestId::generate(),
            method: Method::parse(req.method().as_str()),
            host,
            path,
            query: uri.query().map(String::from),
            headers: req.headers().clone(),
        }
    }

    /// Whether the request is a HEAD request.
    pub fn is_head(&self) -> bool {
        self.method == Method::Head
    }
}

/// Strip any port and lowercase a host value.
fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let without_port = if host.starts_with('[') {
        // IPv6 literal: keep everything up to the closing bracket
        host.split_once(']')
            .map(|(h, _)| format!("{}]", h))
            .unwrap_or_else(|| host.to_string())
    } else {
        host.split(':').next().unwrap_or(host).to_string()
    };
    without_port.to_ascii_lowercase()
}
