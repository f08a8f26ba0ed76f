//! Study-session timer.
//!
//! Tracks elapsed wall-clock study time for a knowledge point and keeps
//! a remote session record alive with periodic heartbeats. The local
//! clock is authoritative for "am I studying": heartbeat and end-session
//! failures are logged and discarded, never allowed to stop the timer.

use crate::backend::SessionBackend;
use std::sync::{Arc, Mutex};
use studykit_core::{CredentialStore, KnowledgePointId, SessionId};
use tokio::task::JoinHandle;
use tokio::time::{Duration, interval};
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug)]
pub struct TimerConfig {
    pub tick_interval: Duration,
    pub heartbeat_interval: Duration,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            heartbeat_interval: Duration::from_secs(60),
        }
    }
}

struct TimerState {
    session_id: Option<SessionId>,
    elapsed_seconds: u64,
    is_running: bool,
    // Bumped by every start/stop/drop. A tick, heartbeat or pending
    // begin_session holding a stale generation must not touch state.
    generation: u64,
    tasks: Vec<JoinHandle<()>>,
}

pub struct StudyTimer {
    backend: Arc<dyn SessionBackend>,
    credentials: Arc<dyn CredentialStore>,
    knowledge_point: Option<KnowledgePointId>,
    config: TimerConfig,
    state: Arc<Mutex<TimerState>>,
}

impl StudyTimer {
    pub fn new(
        backend: Arc<dyn SessionBackend>,
        credentials: Arc<dyn CredentialStore>,
        knowledge_point: Option<KnowledgePointId>,
        config: TimerConfig,
    ) -> Self {
        Self {
            backend,
            credentials,
            knowledge_point,
            config,
            state: Arc::new(Mutex::new(TimerState {
                session_id: None,
                elapsed_seconds: 0,
                is_running: false,
                generation: 0,
                tasks: Vec::new(),
            })),
        }
    }

    /// Begin a study session. No-op when already running or when no
    /// credential is available. On remote failure the timer stays fully
    /// stopped; the local clock never starts without an acknowledged
    /// session.
    pub async fn start(&self) {
        let Some(credential) = self.credentials.credential() else {
            warn!("study timer not started: no credential available");
            return;
        };
        let generation = {
            let mut state = self.state.lock().expect("timer state poisoned");
            if state.is_running {
                debug!("start ignored: timer already running");
                return;
            }
            state.generation += 1;
            state.generation
        };
        match self
            .backend
            .begin_session(&credential, self.knowledge_point.as_ref())
            .await
        {
            Ok(session_id) => {
                let superseded = {
                    let mut state = self.state.lock().expect("timer state poisoned");
                    if state.generation == generation {
                        debug!(session = %session_id, "study session started");
                        state.session_id = Some(session_id.clone());
                        state.is_running = true;
                        state.elapsed_seconds = 0;
                        let tick = self.spawn_tick(generation);
                        let heartbeat = self.spawn_heartbeat(generation);
                        state.tasks.push(tick);
                        state.tasks.push(heartbeat);
                        false
                    } else {
                        true
                    }
                };
                if superseded {
                    // a stop() arrived while begin_session was in
                    // flight; the stop wins and the remote session is
                    // closed rather than resurrected
                    warn!(session = %session_id, "start superseded by stop; ending orphaned session");
                    if let Err(err) = self.backend.end_session(&credential, &session_id).await {
                        warn!(error = %err, session = %session_id, "failed to end orphaned session");
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "begin session failed; timer not started");
                let mut state = self.state.lock().expect("timer state poisoned");
                if state.generation == generation {
                    state.session_id = None;
                    state.is_running = false;
                    state.elapsed_seconds = 0;
                }
            }
        }
    }

    /// Stop the session. Periodic tasks are cancelled synchronously and
    /// local state is reset whatever the remote end-session outcome.
    /// Elapsed seconds survive for display until the next start.
    pub async fn stop(&self) {
        let session_id = {
            let mut state = self.state.lock().expect("timer state poisoned");
            state.generation += 1;
            for task in state.tasks.drain(..) {
                task.abort();
            }
            state.is_running = false;
            state.session_id.take()
        };
        let Some(session_id) = session_id else {
            return;
        };
        let Some(credential) = self.credentials.credential() else {
            debug!(session = %session_id, "no credential at stop; local state reset only");
            return;
        };
        if let Err(err) = self.backend.end_session(&credential, &session_id).await {
            warn!(error = %err, session = %session_id, "end session failed; local state reset regardless");
        }
    }

    /// Zero the elapsed display without touching the session.
    pub fn reset(&self) {
        self.state.lock().expect("timer state poisoned").elapsed_seconds = 0;
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.state.lock().expect("timer state poisoned").elapsed_seconds
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().expect("timer state poisoned").is_running
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.state.lock().expect("timer state poisoned").session_id.clone()
    }

    fn spawn_tick(&self, generation: u64) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        // created here so the interval epoch is the moment the session
        // started, not the first poll of the task
        let mut ticks = interval(self.config.tick_interval);
        tokio::spawn(async move {
            ticks.tick().await; // first tick completes immediately
            loop {
                ticks.tick().await;
                let mut state = state.lock().expect("timer state poisoned");
                if state.generation != generation || !state.is_running {
                    break;
                }
                state.elapsed_seconds += 1;
            }
        })
    }

    fn spawn_heartbeat(&self, generation: u64) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let backend = Arc::clone(&self.backend);
        let credentials = Arc::clone(&self.credentials);
        let mut beats = interval(self.config.heartbeat_interval);
        tokio::spawn(async move {
            beats.tick().await; // first tick completes immediately
            loop {
                beats.tick().await;
                let session_id = {
                    let state = state.lock().expect("timer state poisoned");
                    if state.generation != generation || !state.is_running {
                        break;
                    }
                    state.session_id.clone()
                };
                let Some(session_id) = session_id else { continue };
                let Some(credential) = credentials.credential() else {
                    debug!("heartbeat skipped: no credential");
                    continue;
                };
                if let Err(err) = backend.heartbeat(&credential, &session_id).await {
                    warn!(error = %err, session = %session_id, "heartbeat failed");
                }
            }
        })
    }
}

impl Drop for StudyTimer {
    fn drop(&mut self) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        state.generation += 1;
        for task in state.tasks.drain(..) {
            task.abort();
        }
        state.is_running = false;
        let session_id = state.session_id.take();
        drop(state);
        let (Some(session_id), Some(credential)) = (session_id, self.credentials.credential())
        else {
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(session = %session_id, "timer dropped outside a runtime; session left to expire");
            return;
        };
        let backend = Arc::clone(&self.backend);
        handle.spawn(async move {
            if let Err(err) = backend.end_session(&credential, &session_id).await {
                warn!(error = %err, session = %session_id, "end session at teardown failed");
            }
        });
    }
}
