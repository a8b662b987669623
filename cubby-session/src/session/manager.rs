//! Session manager built around a single store-owning worker task
//!
//! The worker owns the session map outright. Callers reach it only by
//! sending [`Command`] values over a bounded channel, so operations are
//! serialized: each command runs to completion before the next one is
//! dequeued, and no lock ever guards the map. The garbage collector is
//! a second task that submits a sweep command through the same channel
//! on a fixed period, which keeps eviction ordered with live traffic.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use cubby_core::{SessionConfig, SessionError, SessionId, SessionResult, SessionStore};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::types::SessionRecord;

/// One message to the store worker. Every variant carries the sender
/// for its reply, and the worker answers exactly once per command.
enum Command {
    Create {
        response_tx: oneshot::Sender<SessionResult<SessionId>>,
    },
    LoadStore {
        session_id: SessionId,
        response_tx: oneshot::Sender<SessionResult<SessionStore>>,
    },
    SaveStore {
        session_id: SessionId,
        store: SessionStore,
        response_tx: oneshot::Sender<SessionResult<()>>,
    },
    Delete {
        session_id: SessionId,
        response_tx: oneshot::Sender<SessionResult<()>>,
    },
    DeleteExpired {
        response_tx: oneshot::Sender<usize>,
    },
}

/// Handle to a running session store.
///
/// The handle is not `Clone`; share it by reference (or behind an
/// `Arc`) and shut it down with [`stop`](Self::stop). Dropping it
/// without stopping also winds the background tasks down, just without
/// waiting for them to finish.
pub struct SessionManager {
    command_tx: mpsc::Sender<Command>,
    worker_handle: JoinHandle<()>,
    gc_shutdown_tx: oneshot::Sender<()>,
    gc_handle: JoinHandle<()>,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager").finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Validate `config`, then spawn the store worker and the garbage
    /// collector loop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: SessionConfig) -> SessionResult<Self> {
        config.validate()?;

        info!(
            "Starting session manager (expiry window {}s, gc every {}s)",
            config.expiry_window_secs, config.gc_interval_secs
        );

        let gc_period = config.gc_interval();
        let (command_tx, mut command_rx) = mpsc::channel(config.command_buffer);
        let (gc_shutdown_tx, gc_shutdown_rx) = oneshot::channel();

        let worker_handle = tokio::spawn(async move {
            let mut sessions: HashMap<SessionId, SessionRecord> = HashMap::new();
            info!("Session store worker started");
            while let Some(command) = command_rx.recv().await {
                Self::process_command(&mut sessions, &config, command);
            }
            info!(
                "Session store worker stopped ({} sessions discarded)",
                sessions.len()
            );
        });

        let gc_handle = tokio::spawn(Self::gc_loop(
            command_tx.clone(),
            gc_period,
            gc_shutdown_rx,
        ));

        Ok(Self {
            command_tx,
            worker_handle,
            gc_shutdown_tx,
            gc_handle,
        })
    }

    /// Create a new, empty session and return its id.
    pub async fn create(&self) -> SessionResult<SessionId> {
        self.submit(|response_tx| Command::Create { response_tx }).await?
    }

    /// Fetch an independent copy of the session's data together with
    /// its current consistency token. Extends the session's expiry.
    pub async fn load_store(&self, session_id: SessionId) -> SessionResult<SessionStore> {
        self.submit(|response_tx| Command::LoadStore {
            session_id,
            response_tx,
        })
        .await?
    }

    /// Replace the session's data with `store.data`.
    ///
    /// The save is accepted only when `store.consistency_token` is the
    /// session's current token; on success the session gets a new token
    /// and its expiry is extended. `InvalidToken` means another writer
    /// saved first - reload, then reapply and save.
    pub async fn save_store(
        &self,
        session_id: SessionId,
        store: SessionStore,
    ) -> SessionResult<()> {
        self.submit(|response_tx| Command::SaveStore {
            session_id,
            store,
            response_tx,
        })
        .await?
    }

    /// Remove the session immediately.
    pub async fn delete(&self, session_id: SessionId) -> SessionResult<()> {
        self.submit(|response_tx| Command::Delete {
            session_id,
            response_tx,
        })
        .await?
    }

    /// Sweep every expired session out of the store and return how many
    /// were evicted. The gc loop runs this on its own period; it is
    /// public so embedders can force a sweep.
    pub async fn delete_expired(&self) -> SessionResult<usize> {
        self.submit(|response_tx| Command::DeleteExpired { response_tx })
            .await
    }

    /// Stop the store in two phases: first shut the gc loop down and
    /// wait for it to exit, then close the command channel and wait for
    /// the worker to drain every command already queued. Consuming the
    /// handle means a stopped manager cannot be reused.
    pub async fn stop(self) -> SessionResult<()> {
        let Self {
            command_tx,
            worker_handle,
            gc_shutdown_tx,
            gc_handle,
        } = self;

        // The send fails only when the gc loop already exited on its own.
        let _ = gc_shutdown_tx.send(());
        gc_handle
            .await
            .map_err(|e| SessionError::other(format!("gc loop task failed: {}", e)))?;

        // With the gc's sender gone, dropping ours closes the channel;
        // the worker sees the disconnect only after draining the queue.
        drop(command_tx);
        worker_handle
            .await
            .map_err(|e| SessionError::other(format!("store worker task failed: {}", e)))?;

        info!("Session manager stopped");
        Ok(())
    }

    /// Send one command and wait for its reply.
    async fn submit<R>(
        &self,
        build: impl FnOnce(oneshot::Sender<R>) -> Command,
    ) -> SessionResult<R> {
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(build(response_tx))
            .await
            .map_err(|_| SessionError::other("session store worker is not running"))?;

        response_rx
            .await
            .map_err(|_| SessionError::other("session store worker dropped the reply"))
    }

    fn process_command(
        sessions: &mut HashMap<SessionId, SessionRecord>,
        config: &SessionConfig,
        command: Command,
    ) {
        match command {
            Command::Create { response_tx } => {
                let session_id = SessionId::generate();
                sessions.insert(session_id, SessionRecord::new(config.expiry_window()));
                debug!("Created session {}", session_id);
                let _ = response_tx.send(Ok(session_id));
            }
            Command::LoadStore {
                session_id,
                response_tx,
            } => {
                let _ = response_tx.send(Self::load_record(sessions, config, session_id));
            }
            Command::SaveStore {
                session_id,
                store,
                response_tx,
            } => {
                let _ = response_tx.send(Self::save_record(sessions, config, session_id, store));
            }
            Command::Delete {
                session_id,
                response_tx,
            } => {
                let _ = response_tx.send(Self::delete_record(sessions, session_id));
            }
            Command::DeleteExpired { response_tx } => {
                let _ = response_tx.send(Self::sweep_expired(sessions));
            }
        }
    }

    fn load_record(
        sessions: &mut HashMap<SessionId, SessionRecord>,
        config: &SessionConfig,
        session_id: SessionId,
    ) -> SessionResult<SessionStore> {
        let now = Instant::now();
        let record = match sessions.get_mut(&session_id) {
            Some(record) if !record.is_expired_at(now) => record,
            _ => {
                debug!("Load failed, session {} not found", session_id);
                return Err(SessionError::not_found(session_id));
            }
        };

        record.touch(config.expiry_window());
        Ok(record.snapshot())
    }

    fn save_record(
        sessions: &mut HashMap<SessionId, SessionRecord>,
        config: &SessionConfig,
        session_id: SessionId,
        store: SessionStore,
    ) -> SessionResult<()> {
        let now = Instant::now();
        let record = match sessions.get_mut(&session_id) {
            Some(record) if !record.is_expired_at(now) => record,
            _ => {
                debug!("Save failed, session {} not found", session_id);
                return Err(SessionError::not_found(session_id));
            }
        };

        if !record.token_matches(store.consistency_token) {
            debug!("Save failed, stale token for session {}", session_id);
            return Err(SessionError::invalid_token(session_id));
        }

        record.commit(store.data, config.expiry_window());
        debug!("Saved session {}", session_id);
        Ok(())
    }

    fn delete_record(
        sessions: &mut HashMap<SessionId, SessionRecord>,
        session_id: SessionId,
    ) -> SessionResult<()> {
        let now = Instant::now();
        let live = sessions
            .get(&session_id)
            .is_some_and(|record| !record.is_expired_at(now));
        if !live {
            // An expired record is left in place for the next sweep.
            debug!("Delete failed, session {} not found", session_id);
            return Err(SessionError::not_found(session_id));
        }

        sessions.remove(&session_id);
        debug!("Deleted session {}", session_id);
        Ok(())
    }

    fn sweep_expired(sessions: &mut HashMap<SessionId, SessionRecord>) -> usize {
        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|session_id, record| {
            if record.is_expired_at(now) {
                debug!(
                    "Evicting expired session {} (lived {}s)",
                    session_id,
                    record.age_seconds()
                );
                false
            } else {
                true
            }
        });

        before - sessions.len()
    }

    /// Submit a sweep on every tick until shutdown is signalled or the
    /// worker goes away. The first tick fires one full period after
    /// start.
    async fn gc_loop(
        command_tx: mpsc::Sender<Command>,
        period: Duration,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) {
        info!("Session gc loop started (period {}s)", period.as_secs());
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    debug!("Running session gc sweep");
                    let (response_tx, response_rx) = oneshot::channel();
                    if command_tx
                        .send(Command::DeleteExpired { response_tx })
                        .await
                        .is_err()
                    {
                        warn!("Session store worker is gone, stopping gc loop");
                        break;
                    }

                    match response_rx.await {
                        Ok(evicted) if evicted > 0 => {
                            info!("Session gc evicted {} expired sessions", evicted);
                        }
                        Ok(_) => {}
                        Err(_) => {
                            warn!("Session store worker dropped the gc reply, stopping gc loop");
                            break;
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    break;
                }
            }
        }

        info!("Session gc loop stopped");
    }
}
