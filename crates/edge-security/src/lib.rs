//! Response security policy for the MultiChzzk edge handler.
//!
//! This crate provides:
//! - `ContentSecurityPolicy` - Ordered CSP directive builder
//! - `ContentHash` - SHA-256 digests of inline content, rendered as CSP hash sources
//! - `FrameAllowlist` - Host patterns that embedded frames may load from
//! - `SecurityHeaders` - HSTS, nosniff and CSP as response header pairs
//!
//! # Example
//!
//! ```ignore
//! use edge_security::{ContentHash, ContentSecurityPolicy, Directive, FrameAllowlist};
//!
//! let frames = FrameAllowlist::new()
//!     .allow_self()
//!     .allow_host("www.youtube.com")
//!     .allow_pattern("*.twitch.tv");
//!
//! let csp = ContentSecurityPolicy::new()
//!     .with(Directive::DefaultSrc, ["'self'"])
//!     .with(Directive::ScriptSrc, [ContentHash::sha256(SCRIPT).csp_source()])
//!     .with(Directive::FrameSrc, frames.csp_sources());
//! ```

mod allowlist;
mod csp;
mod integrity;

pub use allowlist::*;
pub use csp::*;
pub use integrity::*;
