use super::{BackendError, BackendResult, SessionBackend};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use studykit_core::{Credential, KnowledgePointId, SessionId};
use tracing::trace;

/// `SessionBackend` bound to the platform's JSON API over HTTP.
pub struct HttpSessionBackend {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BeginSessionRequest<'a> {
    knowledge_point_id: Option<&'a KnowledgePointId>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BeginSessionResponse {
    session_id: SessionId,
}

impl HttpSessionBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post_ack(&self, credential: &Credential, path: &str) -> BackendResult<()> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&credential.0)
            .send()
            .await?;
        check_status(response.status())?;
        Ok(())
    }
}

fn check_status(status: StatusCode) -> BackendResult<()> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(BackendError::Unauthorized(status.to_string()));
    }
    if !status.is_success() {
        return Err(BackendError::Protocol(format!("status {status}")));
    }
    Ok(())
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        BackendError::Transport(err.to_string())
    }
}

#[async_trait]
impl SessionBackend for HttpSessionBackend {
    async fn begin_session(
        &self,
        credential: &Credential,
        knowledge_point: Option<&KnowledgePointId>,
    ) -> BackendResult<SessionId> {
        trace!(knowledge_point = ?knowledge_point, "begin session");
        let response = self
            .client
            .post(self.url("study-sessions/start"))
            .bearer_auth(&credential.0)
            .json(&BeginSessionRequest {
                knowledge_point_id: knowledge_point,
            })
            .send()
            .await?;
        check_status(response.status())?;
        let body: BeginSessionResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Protocol(e.to_string()))?;
        Ok(body.session_id)
    }

    async fn heartbeat(&self, credential: &Credential, session: &SessionId) -> BackendResult<()> {
        trace!(%session, "heartbeat");
        self.post_ack(credential, &format!("study-sessions/{session}/heartbeat"))
            .await
    }

    async fn end_session(&self, credential: &Credential, session: &SessionId) -> BackendResult<()> {
        trace!(%session, "end session");
        self.post_ack(credential, &format!("study-sessions/{session}/end"))
            .await
    }
}
