use std::sync::{Arc, Mutex};

use tracing::debug;

use sbar_model::{EngineConfig, IntervalSecs, ModuleId};

use super::{Engine, KillProcess, Pending, Shared, Terminator};
use crate::{
    display::{SinkHandle, StdoutSink},
    error::CoreError,
    metrics::{MetricsHandle, noop_metrics},
    monitor::Monitor,
    supervisor::{TaskHandle, TaskSignals},
};

pub(super) struct Registration {
    pub(super) handle: Arc<TaskHandle>,
    pub(super) monitor: Box<dyn Monitor>,
    pub(super) signals: TaskSignals,
}

/// Collects monitors and collaborators before the engine is built.
///
/// The task list is frozen by [`EngineBuilder::build`]; nothing can be registered on a built engine.
pub struct EngineBuilder {
    cfg: EngineConfig,
    tasks: Vec<Registration>,
    sink: SinkHandle,
    metrics: MetricsHandle,
    terminator: Arc<dyn Terminator>,
    signal_handler: bool,
}

impl EngineBuilder {
    pub(super) fn new(cfg: EngineConfig) -> Self {
        Self {
            cfg,
            tasks: Vec::new(),
            sink: Arc::new(StdoutSink),
            metrics: noop_metrics(),
            terminator: Arc::new(KillProcess),
            signal_handler: true,
        }
    }

    /// Display sink receiving the aggregated output (default: [`StdoutSink`]).
    pub fn with_sink(mut self, sink: SinkHandle) -> Self {
        self.sink = sink;
        self
    }

    /// Metrics backend (default: no-op).
    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    /// Hook invoked after a shutdown grace overrun (default: [`KillProcess`]).
    pub fn with_terminator(mut self, terminator: Arc<dyn Terminator>) -> Self {
        self.terminator = terminator;
        self
    }

    /// Whether `run` installs the SIGINT/SIGTERM/SIGQUIT watcher (default: `true`).
    pub fn with_signal_handler(mut self, enabled: bool) -> Self {
        self.signal_handler = enabled;
        self
    }

    /// Register a monitor under an id derived from its display name.
    pub fn register<M: Monitor>(
        &mut self,
        monitor: M,
        interval: IntervalSecs,
    ) -> Result<ModuleId, CoreError> {
        let id = ModuleId::from_display_name(monitor.display_name());
        self.push(id, Box::new(monitor), interval)
    }

    /// Register a monitor under an explicit id.
    pub fn register_as<M: Monitor>(
        &mut self,
        id: &str,
        monitor: M,
        interval: IntervalSecs,
    ) -> Result<ModuleId, CoreError> {
        let id = ModuleId::new(id)?;
        self.push(id, Box::new(monitor), interval)
    }

    /// Put the split marker after the most recently registered task.
    pub fn split(&mut self) -> &mut Self {
        match self.tasks.len().checked_sub(1) {
            Some(last) => self.cfg.layout.split_after = Some(last),
            None => debug!("split requested before any registration, ignored"),
        }
        self
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Validate the configuration and freeze the task list.
    pub fn build(self) -> Result<Engine, CoreError> {
        self.cfg.validate()?;

        let mut handles = Vec::with_capacity(self.tasks.len());
        let mut pending = Vec::with_capacity(self.tasks.len());
        for reg in self.tasks {
            handles.push(Arc::clone(&reg.handle));
            pending.push(reg);
        }

        let shared = Shared::new(self.cfg, handles, self.sink, self.metrics, self.terminator);
        Ok(Engine {
            shared: Arc::new(shared),
            pending: Mutex::new(Some(Pending {
                tasks: pending,
                signal_handler: self.signal_handler,
            })),
        })
    }

    fn push(
        &mut self,
        id: ModuleId,
        monitor: Box<dyn Monitor>,
        interval: IntervalSecs,
    ) -> Result<ModuleId, CoreError> {
        if self.tasks.iter().any(|t| t.handle.id() == &id) {
            return Err(CoreError::DuplicateModule(id));
        }

        let (handle, signals) = TaskHandle::new(id.clone(), monitor.display_name(), interval);
        debug!(module = %id, interval, slot = self.tasks.len(), "task registered");
        self.tasks.push(Registration {
            handle,
            monitor,
            signals,
        });
        Ok(id)
    }
}
