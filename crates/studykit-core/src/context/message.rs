#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Sender {
    Learner,
    Assistant,
}

#[derive(Clone, Debug)]
pub struct ChatMessage {
    pub from: Sender,
    pub text: String,
}

impl ChatMessage {
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            from: Sender::Assistant,
            text: text.into(),
        }
    }

    pub fn learner(text: impl Into<String>) -> Self {
        Self {
            from: Sender::Learner,
            text: text.into(),
        }
    }
}
