use super::KnowledgePointContext;
use super::ids::Credential;
use std::sync::RwLock;

/// Tutoring chat surface the intervention layer drives. Implemented by
/// the host UI; `TranscriptSurface` is the in-memory stand-in.
pub trait ChatSurface: Send + Sync {
    /// Bring the chat surface up, scoped to the given knowledge point.
    /// Must be safe to call when the surface is already open.
    fn open(&self, context: &KnowledgePointContext);

    /// Append a message authored by the assistant.
    fn append_assistant_message(&self, text: &str);
}

/// Source of the learner's credential. The timer consults this at every
/// operation rather than capturing the token once, so rotation or
/// logout takes effect on the next call.
pub trait CredentialStore: Send + Sync {
    fn credential(&self) -> Option<Credential>;
}

/// Credential store backed by a settable in-memory slot.
#[derive(Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set(Some(Credential(token.into())));
        store
    }

    pub fn set(&self, credential: Option<Credential>) {
        *self.token.write().expect("credential slot poisoned") = credential;
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn credential(&self) -> Option<Credential> {
        self.token.read().expect("credential slot poisoned").clone()
    }
}
