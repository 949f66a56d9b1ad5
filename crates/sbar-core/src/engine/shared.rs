use std::{
    sync::{
        Arc, Mutex, OnceLock,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, Instant},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use sbar_model::{EngineConfig, ModuleId};

use super::{EngineState, ShutdownOutcome, Terminator};
use crate::{display::SinkHandle, metrics::MetricsHandle, slots::SlotBoard, supervisor::TaskHandle};

/// Engine state shared by the engine handle, the control plane and background tasks.
pub(crate) struct Shared {
    pub(crate) cfg: EngineConfig,
    pub(crate) handles: Vec<Arc<TaskHandle>>,
    pub(crate) board: SlotBoard,
    pub(crate) sink: SinkHandle,
    pub(crate) metrics: MetricsHandle,
    /// Stops the aggregator and the signal watcher.
    pub(crate) cancel: CancellationToken,
    terminator: Arc<dyn Terminator>,
    state: watch::Sender<EngineState>,
    /// Tasks that have not reached their terminal state yet.
    remaining: watch::Sender<usize>,
    started_at: OnceLock<Instant>,
    aggregator: Mutex<Option<JoinHandle<()>>>,
    finalizing: AtomicBool,
}

impl Shared {
    pub(crate) fn new(
        cfg: EngineConfig,
        handles: Vec<Arc<TaskHandle>>,
        sink: SinkHandle,
        metrics: MetricsHandle,
        terminator: Arc<dyn Terminator>,
    ) -> Self {
        let board = SlotBoard::new(handles.len());
        let (state, _) = watch::channel(EngineState::Idle);
        let (remaining, _) = watch::channel(handles.len());

        Self {
            cfg,
            handles,
            board,
            sink,
            metrics,
            cancel: CancellationToken::new(),
            terminator,
            state,
            remaining,
            started_at: OnceLock::new(),
            aggregator: Mutex::new(None),
            finalizing: AtomicBool::new(false),
        }
    }

    pub(crate) fn state(&self) -> EngineState {
        *self.state.borrow()
    }

    pub(crate) fn subscribe_state(&self) -> watch::Receiver<EngineState> {
        self.state.subscribe()
    }

    /// `Idle → Running`; records the engine start time.
    pub(crate) fn start(&self) -> bool {
        let started = self.state.send_if_modified(|s| {
            if *s == EngineState::Idle {
                *s = EngineState::Running;
                true
            } else {
                false
            }
        });
        if started {
            let _ = self.started_at.set(Instant::now());
        }
        started
    }

    /// `Running → Draining`. Returns `false` from any other state.
    pub(crate) fn begin_draining(&self) -> bool {
        let draining = self.state.send_if_modified(|s| {
            if *s == EngineState::Running {
                *s = EngineState::Draining;
                true
            } else {
                false
            }
        });
        if draining {
            info!("engine draining");
        }
        draining
    }

    /// Seconds since `run` started, `0` before.
    pub(crate) fn uptime(&self) -> u64 {
        self.started_at
            .get()
            .map(|t| t.elapsed().as_secs())
            .unwrap_or(0)
    }

    pub(crate) fn find(&self, id: &str) -> Option<&Arc<TaskHandle>> {
        self.handles.iter().find(|h| h.id().as_str() == id)
    }

    pub(crate) fn set_aggregator(&self, task: JoinHandle<()>) {
        *self.aggregator.lock().unwrap_or_else(|e| e.into_inner()) = Some(task);
    }

    pub(crate) fn task_finished(&self) {
        self.remaining.send_modify(|n| *n = n.saturating_sub(1));
    }

    /// Resolves once every task has reached its terminal state.
    pub(crate) async fn all_tasks_finished(&self) {
        let mut rx = self.remaining.subscribe();
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    /// Resolves once the engine has left `Running` through a stop request or a shutdown.
    pub(crate) async fn wait_draining(&self) {
        let mut rx = self.state.subscribe();
        let _ = rx
            .wait_for(|s| matches!(s, EngineState::Draining | EngineState::Stopped))
            .await;
    }

    pub(crate) async fn wait_stopped(&self) {
        let mut rx = self.state.subscribe();
        let _ = rx.wait_for(|s| *s == EngineState::Stopped).await;
    }

    /// Stop every task and wait up to `grace` for them to finish.
    pub(crate) async fn shutdown(&self, grace: Duration) -> ShutdownOutcome {
        let never_started = self.state.send_if_modified(|s| {
            if *s == EngineState::Idle {
                *s = EngineState::Stopped;
                true
            } else {
                false
            }
        });
        if never_started {
            self.finalizing.store(true, Ordering::Release);
            self.cancel.cancel();
            info!("engine stopped before start");
            return ShutdownOutcome::Graceful;
        }
        if self.state() == EngineState::Stopped {
            return ShutdownOutcome::Graceful;
        }

        self.begin_draining();
        for handle in &self.handles {
            handle.request_stop();
        }
        debug!(grace_ms = grace.as_millis() as u64, "waiting for tasks to stop");

        let drained = time::timeout(grace, self.all_tasks_finished()).await.is_ok();
        let outcome = if drained {
            ShutdownOutcome::Graceful
        } else {
            ShutdownOutcome::GraceExceeded {
                stuck: self
                    .handles
                    .iter()
                    .filter(|h| h.is_active())
                    .map(|h| h.id().clone())
                    .collect(),
            }
        };

        self.finalize(&outcome, grace).await;
        outcome
    }

    /// Stop the aggregator, enter `Stopped`, force termination after a grace overrun.
    ///
    /// Runs once; concurrent callers wait for `Stopped`.
    async fn finalize(&self, outcome: &ShutdownOutcome, grace: Duration) {
        if self.finalizing.swap(true, Ordering::AcqRel) {
            self.wait_stopped().await;
            return;
        }

        self.cancel.cancel();
        let aggregator = self
            .aggregator
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(task) = aggregator {
            if let Err(e) = task.await {
                warn!(error = %e, "aggregator task failed");
            }
        }
        self.state.send_replace(EngineState::Stopped);

        match outcome {
            ShutdownOutcome::Graceful => info!(uptime = self.uptime(), "engine stopped"),
            ShutdownOutcome::GraceExceeded { stuck } => {
                error!(
                    grace_ms = grace.as_millis() as u64,
                    stuck = ?stuck.iter().map(ModuleId::as_str).collect::<Vec<_>>(),
                    "shutdown grace exceeded, forcing termination"
                );
                self.terminator.terminate(stuck.len());
            }
        }
    }
}
