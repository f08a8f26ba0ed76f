//! Idle and failure intervention detection.
//!
//! Two independent channels, each a one-shot latch: idle time crossing
//! a threshold, and repeated quiz failures. Crossing a threshold opens
//! the tutoring chat surface and, after a short fixed delay so the
//! surface can mount, appends a templated assistant prompt. A latched
//! channel stays quiet until its explicit reset, even while the
//! condition keeps holding.

use crate::templates;
use std::sync::{Arc, Mutex};
use studykit_core::{ChatSurface, KnowledgePointContext};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, interval, sleep_until};
use tracing::{debug, trace};

#[derive(Clone, Copy, Debug)]
pub struct InterventionConfig {
    pub idle_threshold_secs: u64,
    pub failure_threshold: u32,
    pub enable_idle_detection: bool,
    pub enable_failure_detection: bool,
    /// Delay between opening the chat surface and appending the prompt.
    /// An approximation of "surface mounted"; there is no real signal.
    pub message_delay: Duration,
    pub idle_tick: Duration,
}

impl Default for InterventionConfig {
    fn default() -> Self {
        Self {
            idle_threshold_secs: 300,
            failure_threshold: 2,
            enable_idle_detection: true,
            enable_failure_detection: true,
            message_delay: Duration::from_millis(500),
            idle_tick: Duration::from_secs(1),
        }
    }
}

/// User activity kinds that reset the idle clock.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ActivityEvent {
    PointerDown,
    KeyDown,
    Scroll,
    TouchStart,
}

#[derive(Default)]
struct MonitorState {
    idle_seconds: u64,
    idle_latched: bool,
    failure_count: u32,
    failure_latched: bool,
    pending: Vec<JoinHandle<()>>,
}

pub struct InterventionMonitor {
    config: InterventionConfig,
    context: Option<KnowledgePointContext>,
    chat: Arc<dyn ChatSurface>,
    state: Arc<Mutex<MonitorState>>,
    idle_task: Option<JoinHandle<()>>,
}

impl InterventionMonitor {
    /// Build the monitor and start idle tracking. Must be called inside
    /// a tokio runtime. Without a knowledge-point context no channel
    /// ever fires.
    pub fn spawn(
        config: InterventionConfig,
        context: Option<KnowledgePointContext>,
        chat: Arc<dyn ChatSurface>,
    ) -> Self {
        let state = Arc::new(Mutex::new(MonitorState::default()));
        let idle_task = match (&context, config.enable_idle_detection) {
            (Some(ctx), true) => Some(spawn_idle_watch(
                config,
                ctx.clone(),
                Arc::clone(&chat),
                Arc::clone(&state),
            )),
            _ => None,
        };
        Self {
            config,
            context,
            chat,
            state,
            idle_task,
        }
    }

    /// Report a tracked user-activity event. Zeroes the idle clock and
    /// re-arms the idle latch.
    pub fn record_activity(&self, event: ActivityEvent) {
        if !self.config.enable_idle_detection {
            return;
        }
        trace!(?event, "activity observed");
        self.reset_idle_timer();
    }

    pub fn reset_idle_timer(&self) {
        let mut state = self.state.lock().expect("monitor state poisoned");
        state.idle_seconds = 0;
        state.idle_latched = false;
    }

    /// Report a failed quiz attempt. Fires the failure intervention
    /// once when the count reaches the threshold.
    pub fn record_failure(&self) {
        if !self.config.enable_failure_detection {
            return;
        }
        let Some(context) = self.context.as_ref() else {
            return;
        };
        let fire = {
            let mut state = self.state.lock().expect("monitor state poisoned");
            state.failure_count += 1;
            if state.failure_count >= self.config.failure_threshold && !state.failure_latched {
                state.failure_latched = true;
                true
            } else {
                false
            }
        };
        if fire {
            debug!(knowledge_point = %context.id, "failure intervention triggered");
            deliver(
                &self.chat,
                context,
                self.config.message_delay,
                templates::failure_prompt(&context.title),
                &self.state,
            );
        }
    }

    pub fn reset_failure_count(&self) {
        let mut state = self.state.lock().expect("monitor state poisoned");
        state.failure_count = 0;
        state.failure_latched = false;
    }

    pub fn idle_seconds(&self) -> u64 {
        self.state.lock().expect("monitor state poisoned").idle_seconds
    }

    pub fn failure_count(&self) -> u32 {
        self.state.lock().expect("monitor state poisoned").failure_count
    }

    /// Cancel the idle ticker and any prompt still waiting on its
    /// delay. Idempotent; also runs on drop.
    pub fn shutdown(&mut self) {
        if let Some(task) = self.idle_task.take() {
            task.abort();
        }
        if let Ok(mut state) = self.state.lock() {
            for task in state.pending.drain(..) {
                task.abort();
            }
        }
    }
}

impl Drop for InterventionMonitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_idle_watch(
    config: InterventionConfig,
    context: KnowledgePointContext,
    chat: Arc<dyn ChatSurface>,
    state: Arc<Mutex<MonitorState>>,
) -> JoinHandle<()> {
    let mut ticks = interval(config.idle_tick);
    tokio::spawn(async move {
        ticks.tick().await; // first tick completes immediately
        loop {
            ticks.tick().await;
            let fire = {
                let mut state = state.lock().expect("monitor state poisoned");
                state.idle_seconds += 1;
                if state.idle_seconds >= config.idle_threshold_secs && !state.idle_latched {
                    state.idle_latched = true;
                    true
                } else {
                    false
                }
            };
            if fire {
                debug!(knowledge_point = %context.id, "idle intervention triggered");
                deliver(
                    &chat,
                    &context,
                    config.message_delay,
                    templates::idle_prompt(&context.title),
                    &state,
                );
            }
        }
    })
}

/// Open the chat surface now, append the prompt after the mount delay.
fn deliver(
    chat: &Arc<dyn ChatSurface>,
    context: &KnowledgePointContext,
    delay: Duration,
    text: String,
    state: &Arc<Mutex<MonitorState>>,
) {
    chat.open(context);
    let chat = Arc::clone(chat);
    let deadline = Instant::now() + delay;
    let handle = tokio::spawn(async move {
        sleep_until(deadline).await;
        chat.append_assistant_message(&text);
    });
    state
        .lock()
        .expect("monitor state poisoned")
        .pending
        .push(handle);
}

#[cfg(test)]
mod tests {
    use super::*;
    use studykit_core::TranscriptSurface;
    use tokio::time::advance;

    fn test_config() -> InterventionConfig {
        InterventionConfig {
            idle_threshold_secs: 5,
            failure_threshold: 2,
            ..Default::default()
        }
    }

    fn context() -> KnowledgePointContext {
        KnowledgePointContext::new("cs402-17", "Recursion")
    }

    async fn advance_secs(n: u64) {
        for _ in 0..n {
            advance(Duration::from_secs(1)).await;
        }
        settle().await;
    }

    async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn idle_intervention_fires_once_at_threshold() {
        let surface = Arc::new(TranscriptSurface::new(8));
        let monitor = InterventionMonitor::spawn(test_config(), Some(context()), surface.clone());
        settle().await;

        advance_secs(4).await;
        assert_eq!(surface.open_count(), 0);

        advance_secs(1).await;
        assert_eq!(surface.open_count(), 1);
        // prompt is still waiting on the mount delay
        assert!(surface.is_empty());

        advance(Duration::from_millis(400)).await;
        settle().await;
        assert!(surface.is_empty());
        advance(Duration::from_millis(100)).await;
        settle().await;
        let messages = surface.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].text.contains("Recursion"));

        // idle keeps growing but the latch holds
        advance_secs(30).await;
        assert_eq!(surface.open_count(), 1);
        assert_eq!(surface.len(), 1);
        assert!(monitor.idle_seconds() > 30);
    }

    #[tokio::test(start_paused = true)]
    async fn activity_resets_idle_clock_and_rearms_latch() {
        let surface = Arc::new(TranscriptSurface::new(8));
        let monitor = InterventionMonitor::spawn(test_config(), Some(context()), surface.clone());
        settle().await;

        advance_secs(3).await;
        monitor.record_activity(ActivityEvent::KeyDown);
        assert_eq!(monitor.idle_seconds(), 0);

        advance_secs(4).await;
        assert_eq!(surface.open_count(), 0);

        advance_secs(1).await;
        assert_eq!(surface.open_count(), 1);

        monitor.reset_idle_timer();
        advance_secs(5).await;
        assert_eq!(surface.open_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_intervention_fires_once_per_reset_cycle() {
        let surface = Arc::new(TranscriptSurface::new(8));
        let monitor = InterventionMonitor::spawn(test_config(), Some(context()), surface.clone());

        monitor.record_failure();
        assert_eq!(surface.open_count(), 0);

        monitor.record_failure();
        assert_eq!(surface.open_count(), 1);

        // the latch gates a third failure
        monitor.record_failure();
        assert_eq!(surface.open_count(), 1);
        assert_eq!(monitor.failure_count(), 3);

        advance(Duration::from_millis(500)).await;
        settle().await;
        let messages = surface.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].text.contains("Recursion"));
        assert!(messages[0].text.contains("3)"));

        monitor.reset_failure_count();
        assert_eq!(monitor.failure_count(), 0);
        monitor.record_failure();
        monitor.record_failure();
        assert_eq!(surface.open_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_channels_never_fire() {
        let surface = Arc::new(TranscriptSurface::new(8));
        let config = InterventionConfig {
            enable_idle_detection: false,
            enable_failure_detection: false,
            ..test_config()
        };
        let monitor = InterventionMonitor::spawn(config, Some(context()), surface.clone());
        settle().await;

        advance_secs(600).await;
        for _ in 0..5 {
            monitor.record_failure();
        }
        assert_eq!(surface.open_count(), 0);
        assert_eq!(monitor.idle_seconds(), 0);
        assert_eq!(monitor.failure_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn one_disabled_channel_leaves_the_other_intact() {
        let surface = Arc::new(TranscriptSurface::new(8));
        let config = InterventionConfig {
            enable_idle_detection: false,
            ..test_config()
        };
        let monitor = InterventionMonitor::spawn(config, Some(context()), surface.clone());
        settle().await;

        advance_secs(600).await;
        assert_eq!(surface.open_count(), 0);

        monitor.record_failure();
        monitor.record_failure();
        assert_eq!(surface.open_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn without_context_nothing_fires() {
        let surface = Arc::new(TranscriptSurface::new(8));
        let monitor = InterventionMonitor::spawn(test_config(), None, surface.clone());
        settle().await;

        advance_secs(600).await;
        monitor.record_failure();
        monitor.record_failure();
        assert_eq!(surface.open_count(), 0);
        assert!(surface.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_ticker_and_pending_prompts() {
        let surface = Arc::new(TranscriptSurface::new(8));
        let monitor = InterventionMonitor::spawn(test_config(), Some(context()), surface.clone());
        settle().await;

        monitor.record_failure();
        monitor.record_failure();
        assert_eq!(surface.open_count(), 1);

        // torn down before the mount delay elapses
        drop(monitor);
        advance_secs(10).await;
        assert!(surface.is_empty());
        assert_eq!(surface.open_count(), 1);
    }
}
