//! Internal session record bookkeeping

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use cubby_core::{ConsistencyToken, SessionStore};
use tokio::time::Instant;

/// One live session as the store worker sees it.
///
/// Records never leave the worker task; callers only ever receive
/// [`SessionStore`] copies taken from them. Expiry runs on the
/// monotonic clock; `created_at` is wall-clock metadata for
/// eviction-age logging.
#[derive(Debug)]
pub(crate) struct SessionRecord {
    data: HashMap<String, String>,
    consistency_token: ConsistencyToken,
    created_at: DateTime<Utc>,
    expires_at: Instant,
}

impl SessionRecord {
    /// A fresh, empty record whose expiry sits one full window away.
    pub(crate) fn new(window: Duration) -> Self {
        Self {
            data: HashMap::new(),
            consistency_token: ConsistencyToken::generate(),
            created_at: Utc::now(),
            expires_at: Instant::now() + window,
        }
    }

    /// Push the expiry one full window past now (sliding expiration).
    pub(crate) fn touch(&mut self, window: Duration) {
        self.expires_at = Instant::now() + window;
    }

    /// A record is expired from its deadline onward. Expired records
    /// are invisible to every operation except the sweep that reclaims
    /// them.
    pub(crate) fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    pub(crate) fn token_matches(&self, token: ConsistencyToken) -> bool {
        self.consistency_token == token
    }

    /// Replace the payload wholesale, rotate the token, extend expiry.
    pub(crate) fn commit(&mut self, data: HashMap<String, String>, window: Duration) {
        self.data = data;
        self.consistency_token = ConsistencyToken::generate();
        self.touch(window);
    }

    /// An independent copy of the payload plus the current token.
    pub(crate) fn snapshot(&self) -> SessionStore {
        SessionStore {
            data: self.data.clone(),
            consistency_token: self.consistency_token,
        }
    }

    pub(crate) fn age_seconds(&self) -> i64 {
        (Utc::now() - self.created_at).num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fresh_record_expires_at_deadline() {
        let record = SessionRecord::new(Duration::from_secs(30));

        assert!(!record.is_expired_at(Instant::now()));
        // The deadline itself already counts as expired.
        assert!(record.is_expired_at(record.expires_at));
        assert!(record.is_expired_at(record.expires_at + Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn test_touch_extends_deadline() {
        let mut record = SessionRecord::new(Duration::from_secs(30));
        let old_deadline = record.expires_at;

        record.touch(Duration::from_secs(60));

        assert!(!record.is_expired_at(old_deadline));
    }

    #[tokio::test]
    async fn test_commit_replaces_data_and_rotates_token() {
        let mut record = SessionRecord::new(Duration::from_secs(30));
        let first_token = record.snapshot().consistency_token;

        let mut data = HashMap::new();
        data.insert("user".to_string(), "alice".to_string());
        record.commit(data, Duration::from_secs(30));

        let after = record.snapshot();
        assert_ne!(after.consistency_token, first_token);
        assert_eq!(after.data.get("user").map(String::as_str), Some("alice"));
        assert!(record.token_matches(after.consistency_token));
        assert!(!record.token_matches(first_token));
    }

    #[tokio::test]
    async fn test_snapshot_is_independent_copy() {
        let record = SessionRecord::new(Duration::from_secs(30));

        let mut copy = record.snapshot();
        copy.data.insert("scratch".to_string(), "caller only".to_string());

        assert!(record.snapshot().data.is_empty());
    }
}
