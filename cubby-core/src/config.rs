//! Configuration loading and validation

use crate::error::{SessionError, SessionResult};
use crate::types::SessionConfig;
use std::path::Path;

/// Upper bound on the expiry window and gc interval, in seconds (ten
/// years). Deadline arithmetic on the monotonic clock must stay in
/// range for any interval a validated config can carry.
pub const MAX_INTERVAL_SECS: u64 = 60 * 60 * 24 * 365 * 10;

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            expiry_window_secs: 180,
            gc_interval_secs: 60,
            command_buffer: 1,
        }
    }
}

impl SessionConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SessionResult<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            SessionError::config_with_source(
                format!("Failed to read config file: {}", path.as_ref().display()),
                e,
            )
        })?;

        let config: SessionConfig = toml::from_str(&content).map_err(|e| {
            SessionError::config_with_source(
                format!("Failed to parse config file: {}", path.as_ref().display()),
                e,
            )
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> SessionResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SessionError::config_with_source("Failed to serialize config", e))?;

        std::fs::write(&path, content).map_err(|e| {
            SessionError::config_with_source(
                format!("Failed to write config file: {}", path.as_ref().display()),
                e,
            )
        })?;

        Ok(())
    }

    /// Check that the configuration describes a runnable store.
    pub fn validate(&self) -> SessionResult<()> {
        if self.expiry_window_secs == 0 {
            return Err(SessionError::config("expiry_window_secs must be greater than zero"));
        }

        if self.expiry_window_secs > MAX_INTERVAL_SECS {
            return Err(SessionError::config(format!(
                "expiry_window_secs must be at most {}",
                MAX_INTERVAL_SECS
            )));
        }

        if self.gc_interval_secs == 0 {
            return Err(SessionError::config("gc_interval_secs must be greater than zero"));
        }

        if self.gc_interval_secs > MAX_INTERVAL_SECS {
            return Err(SessionError::config(format!(
                "gc_interval_secs must be at most {}",
                MAX_INTERVAL_SECS
            )));
        }

        if self.command_buffer == 0 {
            return Err(SessionError::config("command_buffer must be at least 1"));
        }

        Ok(())
    }
}
