//! Core abstractions for the MultiChzzk edge handler.
//!
//! This crate provides the fundamental types:
//! - `SiteConfig` - Process-wide site configuration
//! - `RequestContext` - Typed view of an incoming request
//! - `Method` - The request methods the handler distinguishes

mod config;
mod context;
mod error;

pub use config::*;
pub use context::*;
pub use error::*;
