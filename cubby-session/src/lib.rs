//! Cubby Session - an in-memory session store owned by a single worker task
//!
//! All session state lives in one `HashMap` on the store worker's
//! stack. Nothing else can reach it: callers describe what they want as
//! typed commands, and the worker executes them strictly in arrival
//! order, answering each one exactly once over its own reply channel.
//! That total ordering is the whole concurrency story - no locks, no
//! shared memory.
//!
//! ```text
//! callers --> bounded command channel --> store worker (owns the map)
//!                      ^
//! gc loop -------------+  (sweeps expired sessions on a fixed period)
//! ```
//!
//! Writes are fenced by a consistency token. Every load hands out the
//! session's current token next to a copy of its data; a save must echo
//! that token back and is rejected with `InvalidToken` when another
//! writer got in first. Sessions expire on a sliding window: loads and
//! saves push the expiry out, the gc loop reclaims whatever lapsed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cubby_session::prelude::*;
//!
//! # async fn example() -> SessionResult<()> {
//! let manager = SessionManager::start(SessionConfig::default())?;
//!
//! let id = manager.create().await?;
//! let mut store = manager.load_store(id).await?;
//! store.data.insert("user".to_string(), "alice".to_string());
//! manager.save_store(id, store).await?;
//!
//! manager.stop().await?;
//! # Ok(())
//! # }
//! ```

pub mod session;

pub use session::SessionManager;

// Re-export the core vocabulary so embedders need a single import.
pub use cubby_core::{
    ConsistencyToken, SessionConfig, SessionError, SessionId, SessionResult, SessionStore,
};

/// Commonly used types, importable in one line.
pub mod prelude {
    pub use crate::session::SessionManager;
    pub use cubby_core::{
        ConsistencyToken, SessionConfig, SessionError, SessionId, SessionResult, SessionStore,
    };
}
