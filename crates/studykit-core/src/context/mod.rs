pub mod chat;
pub mod ids;
pub mod message;

use chat::ChatSurface;
use ids::KnowledgePointId;
use message::ChatMessage;
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::debug;

/// Knowledge point a timer or chat surface is scoped to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KnowledgePointContext {
    pub id: KnowledgePointId,
    pub title: String,
}

impl KnowledgePointContext {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: KnowledgePointId(id.into()),
            title: title.into(),
        }
    }
}

/// In-memory chat surface holding a bounded transcript. Oldest messages
/// are evicted once the capacity is reached.
pub struct TranscriptSurface {
    capacity: usize,
    inner: Mutex<TranscriptInner>,
}

struct TranscriptInner {
    open_for: Option<KnowledgePointContext>,
    opened: usize,
    messages: VecDeque<ChatMessage>,
}

impl TranscriptSurface {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(TranscriptInner {
                open_for: None,
                opened: 0,
                messages: VecDeque::new(),
            }),
        }
    }

    pub fn cap(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("transcript poisoned").messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of times the surface has been opened.
    pub fn open_count(&self) -> usize {
        self.inner.lock().expect("transcript poisoned").opened
    }

    /// Knowledge point the surface is currently scoped to, if open.
    pub fn open_for(&self) -> Option<KnowledgePointContext> {
        self.inner.lock().expect("transcript poisoned").open_for.clone()
    }

    pub fn push(&self, msg: ChatMessage) {
        let mut inner = self.inner.lock().expect("transcript poisoned");
        if inner.messages.len() == self.capacity {
            inner.messages.pop_front();
        }
        inner.messages.push_back(msg);
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        let inner = self.inner.lock().expect("transcript poisoned");
        inner.messages.iter().cloned().collect()
    }

    pub fn last(&self) -> Option<ChatMessage> {
        let inner = self.inner.lock().expect("transcript poisoned");
        inner.messages.back().cloned()
    }
}

impl ChatSurface for TranscriptSurface {
    fn open(&self, context: &KnowledgePointContext) {
        debug!(knowledge_point = %context.id, "chat surface opened");
        let mut inner = self.inner.lock().expect("transcript poisoned");
        inner.open_for = Some(context.clone());
        inner.opened += 1;
    }

    fn append_assistant_message(&self, text: &str) {
        self.push(ChatMessage::assistant(text));
    }
}
