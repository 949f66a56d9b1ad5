use std::sync::{
    Arc, OnceLock,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use tokio::{
    sync::mpsc::{self, error::TrySendError},
    time::Instant,
};

use sbar_model::{IntervalSecs, ModuleId, TaskInfo};

/// Result of a non-blocking signal send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalSend {
    /// Signal queued.
    Sent,
    /// A signal of the same kind is already pending; this one was coalesced into it.
    Pending,
    /// The task loop is gone.
    Closed,
}

/// Receiving side of a task's control signals, owned by its supervisor.
#[derive(Debug)]
pub(crate) struct TaskSignals {
    pub(crate) refresh: mpsc::Receiver<()>,
    pub(crate) stop: mpsc::Receiver<()>,
}

/// Shared descriptor of one registered task.
///
/// Read by the control plane and written by the task's supervisor. Status fields are
/// eventually consistent; the signal channels hold at most one pending signal each.
#[derive(Debug)]
pub struct TaskHandle {
    id: ModuleId,
    name: String,
    interval: AtomicU64,
    active: AtomicBool,
    started_at: OnceLock<Instant>,
    refresh_tx: mpsc::Sender<()>,
    stop_tx: mpsc::Sender<()>,
}

impl TaskHandle {
    pub(crate) fn new(
        id: ModuleId,
        name: impl Into<String>,
        interval: IntervalSecs,
    ) -> (Arc<Self>, TaskSignals) {
        let (refresh_tx, refresh) = mpsc::channel(1);
        let (stop_tx, stop) = mpsc::channel(1);

        let handle = Arc::new(Self {
            id,
            name: name.into(),
            interval: AtomicU64::new(interval),
            active: AtomicBool::new(false),
            started_at: OnceLock::new(),
            refresh_tx,
            stop_tx,
        });
        (handle, TaskSignals { refresh, stop })
    }

    /// Module id.
    #[inline]
    pub fn id(&self) -> &ModuleId {
        &self.id
    }

    /// Display name captured at registration.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current interval in seconds.
    #[inline]
    pub fn interval(&self) -> IntervalSecs {
        self.interval.load(Ordering::Acquire)
    }

    /// Replace the interval; read again on the next sleep computation.
    ///
    /// Returns the previous value.
    pub fn set_interval(&self, interval: IntervalSecs) -> IntervalSecs {
        self.interval.swap(interval, Ordering::AcqRel)
    }

    /// Whether the task loop is running.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Seconds since the task loop started, `0` while inactive.
    pub fn uptime(&self) -> u64 {
        if !self.is_active() {
            return 0;
        }
        self.started_at
            .get()
            .map(|t| t.elapsed().as_secs())
            .unwrap_or(0)
    }

    /// Status snapshot.
    pub fn info(&self) -> TaskInfo {
        TaskInfo {
            name: self.name.clone(),
            uptime: self.uptime(),
            interval: self.interval(),
            active: self.is_active(),
        }
    }

    /// Ask the task to skip its remaining sleep and update now.
    pub fn request_refresh(&self) -> SignalSend {
        try_signal(&self.refresh_tx)
    }

    /// Ask the task to stop after its current update.
    pub fn request_stop(&self) -> SignalSend {
        try_signal(&self.stop_tx)
    }

    pub(crate) fn mark_started(&self) {
        let _ = self.started_at.set(Instant::now());
        self.active.store(true, Ordering::Release);
    }

    pub(crate) fn mark_finished(&self) {
        self.active.store(false, Ordering::Release);
    }
}

fn try_signal(tx: &mpsc::Sender<()>) -> SignalSend {
    match tx.try_send(()) {
        Ok(()) => SignalSend::Sent,
        Err(TrySendError::Full(())) => SignalSend::Pending,
        Err(TrySendError::Closed(())) => SignalSend::Closed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(interval: IntervalSecs) -> (Arc<TaskHandle>, TaskSignals) {
        TaskHandle::new(ModuleId::new("clock").unwrap(), "Clock", interval)
    }

    #[test]
    fn new_handle_is_inactive() {
        let (h, _signals) = handle(5);
        let info = h.info();

        assert_eq!(h.id().as_str(), "clock");
        assert_eq!(info.name, "Clock");
        assert_eq!(info.interval, 5);
        assert!(!info.active);
        assert_eq!(info.uptime, 0);
    }

    #[test]
    fn refresh_signal_coalesces() {
        let (h, mut signals) = handle(5);

        assert_eq!(h.request_refresh(), SignalSend::Sent);
        assert_eq!(h.request_refresh(), SignalSend::Pending);

        assert!(signals.refresh.try_recv().is_ok());
        assert!(signals.refresh.try_recv().is_err());
        assert_eq!(h.request_refresh(), SignalSend::Sent);
    }

    #[test]
    fn signals_report_closed_after_receiver_drop() {
        let (h, signals) = handle(5);
        drop(signals);

        assert_eq!(h.request_stop(), SignalSend::Closed);
        assert_eq!(h.request_refresh(), SignalSend::Closed);
    }

    #[test]
    fn set_interval_returns_previous() {
        let (h, _signals) = handle(1);
        assert_eq!(h.set_interval(10), 1);
        assert_eq!(h.interval(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn uptime_tracks_active_period() {
        let (h, _signals) = handle(1);
        h.mark_started();
        tokio::time::advance(std::time::Duration::from_secs(7)).await;

        assert!(h.is_active());
        assert_eq!(h.uptime(), 7);

        h.mark_finished();
        assert_eq!(h.uptime(), 0);
    }
}
