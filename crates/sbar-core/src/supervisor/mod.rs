//! Per-monitor control loop.
//!
//! A [`TaskSupervisor`] owns one monitor and drives it through update/render/sleep cycles:
//! - every update result is rendered into the task's slot;
//! - a terminal result (`Flow::Finish` or a fatal error) ends the loop for good;
//! - interval `0` ends the loop after the first update;
//! - a transient error replaces the regular sleep with a [`retry_delay`] tier;
//! - during the sleep a refresh signal wakes the task early and a stop signal ends it.
mod backoff;
pub use backoff::retry_delay;

mod handle;
pub use handle::{SignalSend, TaskHandle};
pub(crate) use handle::TaskSignals;

use std::{sync::Arc, time::Duration};

use tokio::time::{self, Instant};
use tracing::{debug, error, info, warn};

use crate::{
    metrics::{FinishReason, MetricsHandle, UpdateOutcome},
    monitor::{Flow, Monitor},
    slots::SlotWriter,
};

/// What the loop does after publishing an update.
enum Next {
    Sleep(Duration),
    Finish(FinishReason),
}

pub(crate) struct TaskSupervisor {
    handle: Arc<TaskHandle>,
    monitor: Box<dyn Monitor>,
    signals: TaskSignals,
    slot: SlotWriter,
    metrics: MetricsHandle,
}

impl TaskSupervisor {
    pub(crate) fn new(
        handle: Arc<TaskHandle>,
        monitor: Box<dyn Monitor>,
        signals: TaskSignals,
        slot: SlotWriter,
        metrics: MetricsHandle,
    ) -> Self {
        Self {
            handle,
            monitor,
            signals,
            slot,
            metrics,
        }
    }

    /// Run the loop until the task reaches its terminal state.
    pub(crate) async fn run(mut self) -> FinishReason {
        self.handle.mark_started();
        info!(
            module = %self.handle.id(),
            name = self.handle.name(),
            interval = self.handle.interval(),
            slot = self.slot.index(),
            "task started"
        );

        let reason = self.drive().await;

        self.handle.mark_finished();
        self.metrics
            .record_task_finished(self.handle.id().as_str(), reason);
        info!(module = %self.handle.id(), reason = reason.as_label(), "task finished");
        reason
    }

    async fn drive(&mut self) -> FinishReason {
        loop {
            let delay = match self.cycle().await {
                Next::Sleep(delay) => delay,
                Next::Finish(reason) => return reason,
            };

            tokio::select! {
                biased;
                _ = self.signals.stop.recv() => {
                    debug!(module = %self.handle.id(), "stop requested");
                    return FinishReason::Stopped;
                }
                Some(()) = self.signals.refresh.recv() => {
                    debug!(module = %self.handle.id(), "refresh requested");
                }
                _ = time::sleep(delay) => {}
            }
        }
    }

    /// One update: call the monitor, publish its output, decide what comes next.
    async fn cycle(&mut self) -> Next {
        let module = self.handle.id().as_str();
        let t0 = Instant::now();
        let result = self.monitor.update().await;
        let took = t0.elapsed();

        let (output, outcome) = match &result {
            Ok(_) => (self.monitor.render(), UpdateOutcome::Success),
            Err(e) if e.is_fatal() => {
                error!(module, name = self.monitor.display_name(), reason = e.reason(), "monitor failed permanently");
                (self.monitor.render_error(), UpdateOutcome::Fatal)
            }
            Err(e) => {
                warn!(module, name = self.monitor.display_name(), reason = e.reason(), "monitor update failed");
                (self.monitor.render_error(), UpdateOutcome::Transient)
            }
        };
        self.slot.write(output);
        self.metrics
            .record_update(module, outcome, took.as_millis() as u64);

        match (&result, outcome) {
            (Ok(Flow::Finish), _) => return Next::Finish(FinishReason::Completed),
            (_, UpdateOutcome::Fatal) => return Next::Finish(FinishReason::Failed),
            _ => {}
        }

        let interval = self.handle.interval();
        if interval == 0 {
            return Next::Finish(FinishReason::Completed);
        }

        // Both the regular interval and the retry tier count from the start of the update.
        let period = if outcome == UpdateOutcome::Transient {
            let delay = retry_delay(interval);
            debug!(module, delay_ms = delay.as_millis() as u64, "retry scheduled");
            delay
        } else {
            Duration::from_secs(interval)
        };
        Next::Sleep(period.saturating_sub(t0.elapsed()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::{
        metrics::noop_metrics,
        monitor::MonitorError,
        slots::SlotBoard,
        testing::{ScriptedMonitor, count},
    };
    use sbar_model::{IntervalSecs, ModuleId};

    struct Harness {
        handle: Arc<TaskHandle>,
        board: SlotBoard,
        calls: Arc<AtomicUsize>,
        task: tokio::task::JoinHandle<FinishReason>,
    }

    fn spawn(monitor: ScriptedMonitor, interval: IntervalSecs) -> Harness {
        let calls = monitor.calls();
        let board = SlotBoard::new(1);
        let (handle, signals) = TaskHandle::new(
            ModuleId::from_display_name(monitor.display_name()),
            monitor.display_name(),
            interval,
        );
        let sup = TaskSupervisor::new(
            Arc::clone(&handle),
            Box::new(monitor),
            signals,
            board.writer(0),
            noop_metrics(),
        );
        Harness {
            handle,
            board,
            calls,
            task: tokio::spawn(sup.run()),
        }
    }

    async fn at(ms: u64) {
        time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn single_shot_updates_once() {
        let h = spawn(ScriptedMonitor::new("once"), 0);

        assert_eq!(h.task.await.unwrap(), FinishReason::Completed);
        assert_eq!(count(&h.calls), 1);
        assert_eq!(h.board.snapshot(), vec!["once#1".to_string()]);
        assert!(!h.handle.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_error_ends_task_with_error_output() {
        let h = spawn(
            ScriptedMonitor::new("vpn").then(Err(MonitorError::fatal("no binary"))),
            1,
        );

        assert_eq!(h.task.await.unwrap(), FinishReason::Failed);
        at(30_000).await;

        assert_eq!(count(&h.calls), 1);
        assert_eq!(h.board.snapshot(), vec!["vpn err".to_string()]);
        assert!(!h.handle.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn finish_keeps_success_output() {
        let h = spawn(ScriptedMonitor::new("cpu").then(Ok(Flow::Finish)), 1);

        assert_eq!(h.task.await.unwrap(), FinishReason::Completed);
        assert_eq!(count(&h.calls), 1);
        assert_eq!(h.board.snapshot(), vec!["cpu#1".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_error_retries_after_backoff_tier() {
        let h = spawn(
            ScriptedMonitor::new("net").then(Err(MonitorError::transient("timeout"))),
            1,
        );

        at(4_900).await;
        assert_eq!(count(&h.calls), 1);
        assert_eq!(h.board.snapshot(), vec!["net err".to_string()]);

        at(200).await;
        assert_eq!(count(&h.calls), 2);
        assert_eq!(h.board.snapshot(), vec!["net#2".to_string()]);
        assert!(h.handle.is_active());

        // back on the regular 1s cadence
        at(1_000).await;
        assert_eq!(count(&h.calls), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_error_on_slow_task_uses_slow_tier() {
        let h = spawn(
            ScriptedMonitor::new("weather").then(Err(MonitorError::transient("http 502"))),
            3_600,
        );

        at(299_000).await;
        assert_eq!(count(&h.calls), 1);
        at(2_000).await;
        assert_eq!(count(&h.calls), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn sleep_subtracts_update_time() {
        let h = spawn(
            ScriptedMonitor::new("slow").working_for(Duration::from_millis(300)),
            1,
        );

        // second update starts at 1.0s and returns at 1.3s
        at(1_100).await;
        assert_eq!(count(&h.calls), 2);
        at(1_000).await;
        assert_eq!(count(&h.calls), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_tier_subtracts_update_time() {
        let h = spawn(
            ScriptedMonitor::new("dns")
                .working_for(Duration::from_secs(2))
                .then(Err(MonitorError::transient("no route"))),
            1,
        );

        // first update fails at 2s, retry starts 5s after it began
        at(4_900).await;
        assert_eq!(count(&h.calls), 1);
        assert_eq!(h.board.snapshot(), vec!["dns err".to_string()]);
        at(200).await;
        assert_eq!(count(&h.calls), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn refreshes_coalesce_into_one_update() {
        let h = spawn(ScriptedMonitor::new("mail"), 100);
        at(10).await;
        assert_eq!(count(&h.calls), 1);

        assert_eq!(h.handle.request_refresh(), SignalSend::Sent);
        assert_eq!(h.handle.request_refresh(), SignalSend::Pending);

        at(10).await;
        assert_eq!(count(&h.calls), 2);
        at(50_000).await;
        assert_eq!(count(&h.calls), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn interval_patch_applies_on_next_sleep() {
        let h = spawn(ScriptedMonitor::new("clock"), 1);
        at(500).await;
        h.handle.set_interval(10);

        // the sleep already in progress is not interrupted
        at(1_000).await;
        assert_eq!(count(&h.calls), 2);

        at(9_000).await;
        assert_eq!(count(&h.calls), 2);
        at(1_000).await;
        assert_eq!(count(&h.calls), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_loop() {
        let h = spawn(ScriptedMonitor::new("disk"), 100);
        at(10).await;
        assert!(h.handle.is_active());

        assert_eq!(h.handle.request_stop(), SignalSend::Sent);
        assert_eq!(h.task.await.unwrap(), FinishReason::Stopped);
        assert!(!h.handle.is_active());
        assert_eq!(h.handle.uptime(), 0);
        assert_eq!(h.board.snapshot(), vec!["disk#1".to_string()]);
    }
}
