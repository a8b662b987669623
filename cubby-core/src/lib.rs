//! Cubby Core - shared types and infrastructure for the cubby session store
//!
//! This crate carries the vocabulary the session store speaks: session
//! and token identifiers, the caller-facing `SessionStore` snapshot,
//! the error taxonomy, configuration with TOML loading, and logging
//! setup. The store itself lives in `cubby-session`.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use error::*;
pub use logging::*;
pub use types::*;
