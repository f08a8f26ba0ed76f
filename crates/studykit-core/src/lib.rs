pub mod context;

pub use context::chat::{ChatSurface, CredentialStore, MemoryCredentialStore};
pub use context::ids::{Credential, KnowledgePointId, SessionId};
pub use context::message::{ChatMessage, Sender};
pub use context::{KnowledgePointContext, TranscriptSurface};
