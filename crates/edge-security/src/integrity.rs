//! SHA-256 hashes for pinning inline script and style blocks.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};

/// SHA-256 digest of a block of content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentHash {
    digest: [u8; 32],
}

impl ContentHash {
    /// SHA-256 of `data`.
    pub fn sha256(data: impl AsRef<[u8]>) -> Self {
        Self {
            digest: Sha256::digest(data.as_ref()).into(),
        }
    }

    /// CSP hash source, e.g. `'sha256-<base64>'`.
    pub fn csp_source(&self) -> String {
        format!("'sha256-{}'", STANDARD.encode(self.digest))
    }

    /// Whether `data` hashes to this digest.
    pub fn matches(&self, data: impl AsRef<[u8]>) -> bool {
        *self == Self::sha256(data)
    }
}
