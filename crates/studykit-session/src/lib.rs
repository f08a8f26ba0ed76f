pub mod backend;
pub mod format;
pub mod timer;

pub use backend::{BackendError, SessionBackend};
pub use backend::http::HttpSessionBackend;
pub use backend::memory::MemorySessionBackend;
pub use format::{format_elapsed, format_seconds};
pub use timer::{StudyTimer, TimerConfig};
