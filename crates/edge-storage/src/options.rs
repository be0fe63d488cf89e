//! Read options derived from request headers.

use http::header::{self, HeaderMap, HeaderName};

use crate::error::StorageError;
use crate::object::ByteRange;

/// Request headers forwarded to the store untouched.
const FORWARDED_HEADERS: [HeaderName; 5] = [
    header::RANGE,
    header::IF_MATCH,
    header::IF_NONE_MATCH,
    header::IF_MODIFIED_SINCE,
    header::IF_UNMODIFIED_SINCE,
];

/// A single-range `Range` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSpec {
    /// `bytes=<offset>-` or `bytes=<offset>-<last>`.
    From { offset: u64, last: Option<u64> },
    /// `bytes=-<suffix>`: the final `suffix` bytes.
    Suffix(u64),
}

impl RangeSpec {
    /// Parse a `Range` header value.
    ///
    /// Only single `bytes` ranges are understood; anything else yields
    /// `None` and the read falls back to the full object.
    pub fn parse(value: &str) -> Option<Self> {
        let spec = value.trim().strip_prefix("bytes=")?.trim();
        if spec.contains(',') {
            return None;
        }

        let (start, end) = spec.split_once('-')?;
        let (start, end) = (start.trim(), end.trim());

        if start.is_empty() {
            return end.parse().ok().map(Self::Suffix);
        }

        let offset = start.parse().ok()?;
        let last = if end.is_empty() {
            None
        } else {
            let last: u64 = end.parse().ok()?;
            if last < offset {
                return None;
            }
            Some(last)
        };

        Some(Self::From { offset, last })
    }

    /// Resolve against an object of `size` bytes.
    pub fn resolve(&self, size: u64) -> Result<ByteRange, StorageError> {
        match *self {
            Self::From { offset, last } => {
                if offset >= size {
                    return Err(StorageError::RangeNotSatisfiable { size });
                }
                let last = last.map_or(size - 1, |l| l.min(size - 1));
                Ok(ByteRange {
                    offset,
                    length: last - offset + 1,
                })
            }
            Self::Suffix(suffix) => {
                if suffix == 0 || size == 0 {
                    return Err(StorageError::RangeNotSatisfiable { size });
                }
                let length = suffix.min(size);
                Ok(ByteRange {
                    offset: size - length,
                    length,
                })
            }
        }
    }
}

/// An entity tag from a conditional header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityTag {
    /// `*`
    Any,
    /// A tag value without quotes. `weak` is set for `W/` tags.
    Tag { value: String, weak: bool },
}

impl EntityTag {
    fn parse_list(value: &str) -> Vec<Self> {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s == "*" {
                    return Self::Any;
                }
                let (s, weak) = match s.strip_prefix("W/") {
                    Some(rest) => (rest, true),
                    None => (s, false),
                };
                Self::Tag {
                    value: s.trim_matches('"').to_string(),
                    weak,
                }
            })
            .collect()
    }

    /// Strong comparison: a weak tag never matches.
    fn strong_match(&self, etag: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Tag { value, weak } => !weak && value == etag,
        }
    }

    /// Weak comparison: only the tag values are compared.
    fn weak_match(&self, etag: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Tag { value, .. } => value == etag,
        }
    }
}

/// Conditional read requirements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conditions {
    /// `If-Match` tags.
    pub if_match: Option<Vec<EntityTag>>,
    /// `If-None-Match` tags.
    pub if_none_match: Option<Vec<EntityTag>>,
    /// Raw `If-Modified-Since` value.
    pub if_modified_since: Option<String>,
    /// Raw `If-Unmodified-Since` value.
    pub if_unmodified_since: Option<String>,
}

impl Conditions {
    /// Read the conditional headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let text = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };

        Self {
            if_match: text(header::IF_MATCH).map(|v| EntityTag::parse_list(&v)),
            if_none_match: text(header::IF_NONE_MATCH).map(|v| EntityTag::parse_list(&v)),
            if_modified_since: text(header::IF_MODIFIED_SINCE),
            if_unmodified_since: text(header::IF_UNMODIFIED_SINCE),
        }
    }

    /// Whether a read of an object with `etag` should return content.
    ///
    /// Only entity-tag conditions are evaluated here; date conditions are
    /// left to backends that track modification times.
    pub fn permits(&self, etag: &str) -> bool {
        if let Some(tags) = &self.if_match {
            if !tags.iter().any(|t| t.strong_match(etag)) {
                return false;
            }
        }

        if let Some(tags) = &self.if_none_match {
            if tags.iter().any(|t| t.weak_match(etag)) {
                return false;
            }
        }

        true
    }
}

/// Options for `ObjectStore::get`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetOptions {
    /// Requested range, if the `Range` header was understood.
    pub range: Option<RangeSpec>,
    /// Conditional requirements.
    pub only_if: Conditions,
    /// The range and conditional headers exactly as received.
    pub forwarded: Vec<(HeaderName, String)>,
}

impl GetOptions {
    /// Derive options from the incoming request headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let forwarded = FORWARDED_HEADERS
            .iter()
            .filter_map(|name| {
                headers
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(|v| (name.clone(), v.to_string()))
            })
            .collect();

        Self {
            range: headers
                .get(header::RANGE)
                .and_then(|v| v.to_str().ok())
                .and_then(RangeSpec::parse),
            only_if: Conditions::from_headers(headers),
            forwarded,
        }
    }
}
