pub mod monitor;
pub mod templates;

pub use monitor::{ActivityEvent, InterventionConfig, InterventionMonitor};
