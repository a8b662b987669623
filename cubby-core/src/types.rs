//! Core data types for the session store

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

use crate::error::SessionError;

/// Unique identifier of one session.
///
/// Ids are random UUIDs with no structure callers may rely on; an id
/// is never reused. The string form (`Display`/`FromStr`) is the
/// transport representation, e.g. the value stored in a cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| SessionError::bad_parameter(format!("invalid session id '{}': {}", s, e)))
    }
}

/// Write fence carried by every [`SessionStore`].
///
/// The store issues a new token on each successful save. A save whose
/// token is not the session's current one is rejected, which is how
/// concurrent writers are kept from silently overwriting each other.
/// Tokens are minted by the store; a caller-made token never matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConsistencyToken(Uuid);

impl ConsistencyToken {
    /// Mint a fresh token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConsistencyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A caller-owned copy of one session's data.
///
/// `data` is free to read and modify; handing the whole store back to
/// a save publishes the change. `consistency_token` must be echoed back
/// unchanged from the load that produced the copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStore {
    /// Key/value payload of the session.
    pub data: HashMap<String, String>,
    /// Token the store compares on save, see [`ConsistencyToken`].
    pub consistency_token: ConsistencyToken,
}

/// Tuning knobs for the session store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Sliding expiration window in seconds. Every successful load or
    /// save pushes the session's expiry this far into the future.
    pub expiry_window_secs: u64,
    /// Period of the garbage collector sweep in seconds.
    pub gc_interval_secs: u64,
    /// Depth of the store worker's inbound command queue. At the
    /// default depth of 1, a caller awaits acceptance of the previous
    /// command before its own is queued.
    pub command_buffer: usize,
}

impl SessionConfig {
    pub fn expiry_window(&self) -> Duration {
        Duration::from_secs(self.expiry_window_secs)
    }

    pub fn gc_interval(&self) -> Duration {
        Duration::from_secs(self.gc_interval_secs)
    }
}
