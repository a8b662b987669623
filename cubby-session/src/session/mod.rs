//! Session storage and lifecycle

pub mod manager;
mod types;

pub use manager::SessionManager;
