// src/publisher/scheduler.rs
//! Fetch, render and publish loop
//!
//! Cycles run strictly one after another: the next tick is only awaited
//! once the previous cycle has finished, so a slow cycle delays the
//! schedule instead of overlapping with the next one.

use crate::publisher::sink::MessageSink;
use crate::stats::client::StatsSource;
use crate::stats::format::Renderer;
use crate::types::MessageHandle;
use crate::utils::error::BotError;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};

/// Lifecycle of the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Waiting for the chat session to become ready
    Idle,
    /// Timer armed, cycles firing
    Running,
}

/// What to do with a failed cycle besides logging it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorReporting {
    /// Log only
    #[default]
    LogOnly,
    /// Also post a plain-text notice to the channel, best effort
    NotifyChannel,
}

/// What to do when the status message was deleted by someone else
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingMessagePolicy {
    /// Keep the handle and fail the cycle
    #[default]
    Report,
    /// Post a replacement message in the same cycle and adopt its handle
    Recreate,
}

/// Result of a single cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A new status message was posted
    Created(MessageHandle),
    /// The existing status message was updated
    Edited(MessageHandle),
    /// The cycle failed; the error was logged
    Failed,
}

/// Drives the publishing loop and owns the status message handle
pub struct Scheduler {
    source: Arc<dyn StatsSource>,
    sink: MessageSink,
    renderer: Renderer,
    interval: Duration,
    error_reporting: ErrorReporting,
    missing_message: MissingMessagePolicy,
    state: SchedulerState,
    /// Handle of the one message this process owns
    message: Option<MessageHandle>,
    /// Set once a deleted status message has been announced in the channel
    missing_reported: bool,
    /// Number of cycles started so far
    cycles: u64,
}

impl Scheduler {
    /// Creates an idle scheduler
    ///
    /// # Arguments
    /// * `source` - Where snapshots come from
    /// * `sink` - Where rendered snapshots go
    /// * `renderer` - Snapshot formatting options
    /// * `interval` - Time between cycle starts
    pub fn new(
        source: Arc<dyn StatsSource>,
        sink: MessageSink,
        renderer: Renderer,
        interval: Duration,
    ) -> Self {
        Scheduler {
            source,
            sink,
            renderer,
            interval,
            error_reporting: ErrorReporting::default(),
            missing_message: MissingMessagePolicy::default(),
            state: SchedulerState::Idle,
            message: None,
            missing_reported: false,
            cycles: 0,
        }
    }

    /// Sets the failure notification policy
    pub fn with_error_reporting(mut self, policy: ErrorReporting) -> Self {
        self.error_reporting = policy;
        self
    }

    /// Sets the deleted-message policy
    pub fn with_missing_message_policy(mut self, policy: MissingMessagePolicy) -> Self {
        self.missing_message = policy;
        self
    }

    /// Current lifecycle state
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Handle of the status message, once one has been created
    pub fn message(&self) -> Option<&MessageHandle> {
        self.message.as_ref()
    }

    /// Number of cycles started so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Waits for the chat session, then runs cycles until `shutdown` resolves
    ///
    /// The first cycle fires immediately, later ones every `interval`. A
    /// cycle in progress always completes before shutdown is honoured.
    ///
    /// # Errors
    /// Returns the readiness error if the chat session can't be
    /// established; the scheduler then stays `Idle`
    pub async fn run(&mut self, shutdown: impl Future<Output = ()>) -> Result<(), BotError> {
        let tag = self.sink.ready().await?;
        log::info!("✅ Logged in as {}", tag);

        self.state = SchedulerState::Running;
        log::info!("Publishing stats every {:?}", self.interval);

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    log::info!("Stopping after {} cycles", self.cycles);
                    return Ok(());
                }
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
            }
        }
    }

    /// Runs one fetch → render → publish cycle
    ///
    /// Never fails: errors are logged (and optionally posted to the
    /// channel) and reported as [`CycleOutcome::Failed`].
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        self.cycles += 1;
        let cycle = self.cycles;

        match self.publish_snapshot().await {
            Ok(outcome) => {
                log::debug!("Cycle {} finished: {:?}", cycle, outcome);
                self.missing_reported = false;
                outcome
            }
            Err(e) => {
                log::error!(
                    "Cycle {} failed at {}: {}",
                    cycle,
                    Utc::now().to_rfc3339(),
                    e
                );
                self.report(&e).await;
                CycleOutcome::Failed
            }
        }
    }

    async fn publish_snapshot(&mut self) -> Result<CycleOutcome, BotError> {
        let snapshot = self.source.fetch().await?;
        let rendered = self.renderer.render_summary(&snapshot, Utc::now());

        let Some(current) = self.message.clone() else {
            let handle = self.sink.publish(None, &rendered).await?;
            self.message = Some(handle.clone());
            return Ok(CycleOutcome::Created(handle));
        };

        match self.sink.publish(Some(&current), &rendered).await {
            Ok(handle) => Ok(CycleOutcome::Edited(handle)),
            Err(BotError::MessageNotFound(id))
                if self.missing_message == MissingMessagePolicy::Recreate =>
            {
                log::warn!("Status message {} is gone, posting a new one", id);
                let handle = self.sink.publish(None, &rendered).await?;
                self.message = Some(handle.clone());
                Ok(CycleOutcome::Created(handle))
            }
            Err(e) => Err(e),
        }
    }

    /// Best-effort channel notice; its own failure is only logged
    ///
    /// A deleted status message keeps failing every cycle until it is
    /// replaced, so it is announced only once.
    async fn report(&mut self, error: &BotError) {
        if self.error_reporting != ErrorReporting::NotifyChannel {
            return;
        }

        if let BotError::MessageNotFound(_) = error {
            if self.missing_reported {
                return;
            }
            self.missing_reported = true;
        }

        let notice = format!("⚠️ Error fetching mining stats: {}", error);
        if let Err(e) = self.sink.notify(&notice).await {
            log::warn!("Failed to post error notice: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::fakes::{FakeChat, FakeStats};
    use std::sync::atomic::Ordering;
    use tokio::sync::oneshot;

    const CHANNEL: &str = "42";

    fn scheduler(stats: Arc<FakeStats>, chat: Arc<FakeChat>) -> Scheduler {
        Scheduler::new(
            stats,
            MessageSink::new(chat, CHANNEL),
            Renderer::default(),
            Duration::from_secs(20),
        )
    }

    #[tokio::test]
    async fn creates_once_then_only_edits() {
        let stats = Arc::new(FakeStats::default());
        let chat = Arc::new(FakeChat::default());
        let mut scheduler = scheduler(stats, chat.clone());

        let CycleOutcome::Created(handle) = scheduler.run_cycle().await else {
            panic!("expected a new message");
        };
        assert_eq!(scheduler.message(), Some(&handle));

        for _ in 0..3 {
            assert_eq!(
                scheduler.run_cycle().await,
                CycleOutcome::Edited(handle.clone())
            );
        }

        assert_eq!(chat.created(), 1);
        assert_eq!(chat.writes(), 4);
        assert_eq!(scheduler.message(), Some(&handle));
        assert_eq!(scheduler.cycles(), 4);
    }

    #[tokio::test]
    async fn failed_fetch_does_not_stop_next_cycle() {
        let stats = Arc::new(FakeStats::failing_on([2]));
        let chat = Arc::new(FakeChat::default());
        let mut scheduler = scheduler(stats.clone(), chat.clone());

        assert!(matches!(scheduler.run_cycle().await, CycleOutcome::Created(_)));
        assert_eq!(scheduler.run_cycle().await, CycleOutcome::Failed);
        assert!(matches!(scheduler.run_cycle().await, CycleOutcome::Edited(_)));

        assert_eq!(stats.calls(), 3);
        assert_eq!(chat.created(), 1);
        assert!(chat.notices().is_empty());
    }

    #[tokio::test]
    async fn failure_on_first_cycle_leaves_no_handle() {
        let stats = Arc::new(FakeStats::failing_on([1]));
        let chat = Arc::new(FakeChat::default());
        let mut scheduler = scheduler(stats, chat.clone());

        assert_eq!(scheduler.run_cycle().await, CycleOutcome::Failed);
        assert_eq!(scheduler.message(), None);
        assert!(matches!(scheduler.run_cycle().await, CycleOutcome::Created(_)));
        assert_eq!(chat.created(), 1);
    }

    #[tokio::test]
    async fn notify_policy_posts_error_notice() {
        let stats = Arc::new(FakeStats::failing_on([1]));
        let chat = Arc::new(FakeChat::default());
        let mut scheduler =
            scheduler(stats, chat.clone()).with_error_reporting(ErrorReporting::NotifyChannel);

        assert_eq!(scheduler.run_cycle().await, CycleOutcome::Failed);

        let notices = chat.notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].starts_with("⚠️ Error fetching mining stats:"));
        assert!(notices[0].contains("HTTP 503"));
    }

    #[tokio::test]
    async fn failing_notice_is_swallowed() {
        let stats = Arc::new(FakeStats::failing_on([1]));
        let chat = Arc::new(FakeChat::default());
        chat.fail_text.store(true, Ordering::SeqCst);
        let mut scheduler =
            scheduler(stats, chat.clone()).with_error_reporting(ErrorReporting::NotifyChannel);

        assert_eq!(scheduler.run_cycle().await, CycleOutcome::Failed);
        assert!(matches!(scheduler.run_cycle().await, CycleOutcome::Created(_)));
    }

    #[tokio::test]
    async fn deleted_message_is_reported_by_default() {
        let stats = Arc::new(FakeStats::default());
        let chat = Arc::new(FakeChat::default());
        let mut scheduler = scheduler(stats, chat.clone());

        let CycleOutcome::Created(handle) = scheduler.run_cycle().await else {
            panic!("expected a new message");
        };
        chat.delete(&handle);

        assert_eq!(scheduler.run_cycle().await, CycleOutcome::Failed);
        assert_eq!(scheduler.run_cycle().await, CycleOutcome::Failed);
        assert_eq!(scheduler.message(), Some(&handle));
        assert_eq!(chat.created(), 1);
    }

    #[tokio::test]
    async fn deleted_message_notice_is_posted_once() {
        let stats = Arc::new(FakeStats::default());
        let chat = Arc::new(FakeChat::default());
        let mut scheduler =
            scheduler(stats, chat.clone()).with_error_reporting(ErrorReporting::NotifyChannel);

        let CycleOutcome::Created(handle) = scheduler.run_cycle().await else {
            panic!("expected a new message");
        };
        chat.delete(&handle);

        for _ in 0..10 {
            assert_eq!(scheduler.run_cycle().await, CycleOutcome::Failed);
        }

        let notices = chat.notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].contains(&handle.to_string()));
        assert_eq!(scheduler.message(), Some(&handle));
        assert_eq!(chat.created(), 1);
    }

    #[tokio::test]
    async fn other_failures_still_notify_while_message_is_missing() {
        let stats = Arc::new(FakeStats::failing_on([3]));
        let chat = Arc::new(FakeChat::default());
        let mut scheduler =
            scheduler(stats, chat.clone()).with_error_reporting(ErrorReporting::NotifyChannel);

        let CycleOutcome::Created(handle) = scheduler.run_cycle().await else {
            panic!("expected a new message");
        };
        chat.delete(&handle);

        // Missing message, failed fetch, missing message again
        for _ in 0..3 {
            assert_eq!(scheduler.run_cycle().await, CycleOutcome::Failed);
        }

        let notices = chat.notices();
        assert_eq!(notices.len(), 2);
        assert!(notices[1].contains("HTTP 503"));
    }

    #[tokio::test]
    async fn deleted_message_is_recreated_when_configured() {
        let stats = Arc::new(FakeStats::default());
        let chat = Arc::new(FakeChat::default());
        let mut scheduler = scheduler(stats, chat.clone())
            .with_missing_message_policy(MissingMessagePolicy::Recreate);

        let CycleOutcome::Created(old) = scheduler.run_cycle().await else {
            panic!("expected a new message");
        };
        chat.delete(&old);

        let CycleOutcome::Created(new) = scheduler.run_cycle().await else {
            panic!("expected a replacement message");
        };
        assert_ne!(old, new);
        assert_eq!(scheduler.message(), Some(&new));
        assert_eq!(
            scheduler.run_cycle().await,
            CycleOutcome::Edited(new.clone())
        );
        assert_eq!(chat.created(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn run_fires_immediately_then_on_interval() {
        let stats = Arc::new(FakeStats::default());
        let chat = Arc::new(FakeChat::default());
        let mut scheduler = scheduler(stats.clone(), chat.clone());
        assert_eq!(scheduler.state(), SchedulerState::Idle);

        let (stop, stopped) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let result = scheduler
                .run(async {
                    let _ = stopped.await;
                })
                .await;
            (scheduler, result)
        });

        // Cycles at t = 0s, 20s and 40s
        time::sleep(Duration::from_secs(45)).await;
        stop.send(()).unwrap();

        let (scheduler, result) = task.await.unwrap();
        assert!(result.is_ok());
        assert_eq!(scheduler.state(), SchedulerState::Running);
        assert_eq!(scheduler.cycles(), 3);
        assert_eq!(stats.calls(), 3);
        assert_eq!(chat.created(), 1);
    }

    #[tokio::test]
    async fn failed_login_never_starts_cycles() {
        let stats = Arc::new(FakeStats::default());
        let chat = Arc::new(FakeChat::default());
        chat.fail_login.store(true, Ordering::SeqCst);
        let mut scheduler = scheduler(stats.clone(), chat);

        let err = scheduler.run(std::future::pending()).await.unwrap_err();

        assert!(matches!(err, BotError::ChatPlatform(_)));
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(stats.calls(), 0);
    }
}
