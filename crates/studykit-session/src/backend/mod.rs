pub mod http;
pub mod memory;

use async_trait::async_trait;
use studykit_core::{Credential, KnowledgePointId, SessionId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("credential missing or rejected: {0}")]
    Unauthorized(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Protocol(String),
}

pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Remote session ledger. `begin_session` failures abort the start;
/// `heartbeat` and `end_session` are best-effort from the caller's
/// point of view and their errors are logged, never propagated.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    async fn begin_session(
        &self,
        credential: &Credential,
        knowledge_point: Option<&KnowledgePointId>,
    ) -> BackendResult<SessionId>;

    async fn heartbeat(&self, credential: &Credential, session: &SessionId) -> BackendResult<()>;

    async fn end_session(&self, credential: &Credential, session: &SessionId) -> BackendResult<()>;
}
