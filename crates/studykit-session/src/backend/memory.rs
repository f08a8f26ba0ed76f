use super::{BackendError, BackendResult, SessionBackend};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use studykit_core::{Credential, KnowledgePointId, SessionId};
use tracing::debug;

/// In-process session ledger for the demo binary and tests. Hands out
/// monotonic ids and tracks which sessions are still open.
#[derive(Default)]
pub struct MemorySessionBackend {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    next_id: u64,
    active: HashSet<SessionId>,
    begun: u64,
    heartbeats: u64,
    ended: u64,
}

impl MemorySessionBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sessions_begun(&self) -> u64 {
        self.inner.lock().expect("ledger poisoned").begun
    }

    pub fn heartbeats_received(&self) -> u64 {
        self.inner.lock().expect("ledger poisoned").heartbeats
    }

    pub fn sessions_ended(&self) -> u64 {
        self.inner.lock().expect("ledger poisoned").ended
    }

    pub fn open_sessions(&self) -> usize {
        self.inner.lock().expect("ledger poisoned").active.len()
    }
}

#[async_trait]
impl SessionBackend for MemorySessionBackend {
    async fn begin_session(
        &self,
        _credential: &Credential,
        knowledge_point: Option<&KnowledgePointId>,
    ) -> BackendResult<SessionId> {
        let mut inner = self.inner.lock().expect("ledger poisoned");
        inner.next_id += 1;
        inner.begun += 1;
        let id = SessionId(format!("mem-{}", inner.next_id));
        inner.active.insert(id.clone());
        debug!(session = %id, knowledge_point = ?knowledge_point, "session begun");
        Ok(id)
    }

    async fn heartbeat(&self, _credential: &Credential, session: &SessionId) -> BackendResult<()> {
        let mut inner = self.inner.lock().expect("ledger poisoned");
        if !inner.active.contains(session) {
            return Err(BackendError::Protocol(format!("unknown session {session}")));
        }
        inner.heartbeats += 1;
        Ok(())
    }

    async fn end_session(&self, _credential: &Credential, session: &SessionId) -> BackendResult<()> {
        let mut inner = self.inner.lock().expect("ledger poisoned");
        if !inner.active.remove(session) {
            return Err(BackendError::Protocol(format!("unknown session {session}")));
        }
        inner.ended += 1;
        debug!(session = %session, "session ended");
        Ok(())
    }
}
