//! Transport-independent control surface over a running engine.
//!
//! Reads task status and sends refresh/stop signals; never touches the output slots.
//! Signal sends never block: a signal slot that is already full is reported, not waited on.
//! Repeating a request (same interval, stopping a stopped task) is a successful no-op.
mod error;
pub use error::ControlError;

use std::{collections::BTreeMap, sync::Arc};

use tracing::{debug, info};

use sbar_model::{IntervalSecs, ModuleId, TaskInfo};

use crate::{
    engine::{EngineState, Shared},
    supervisor::{SignalSend, TaskHandle},
};

/// Cloneable handle for inspecting and steering tasks at runtime.
#[derive(Clone)]
pub struct ControlPlane {
    shared: Arc<Shared>,
}

impl ControlPlane {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Status of every task, keyed by module id.
    pub fn list(&self) -> BTreeMap<ModuleId, TaskInfo> {
        self.shared
            .handles
            .iter()
            .map(|h| (h.id().clone(), h.info()))
            .collect()
    }

    /// Status of one task.
    pub fn get(&self, id: &str) -> Result<TaskInfo, ControlError> {
        self.find(id).map(|h| h.info())
    }

    /// Wake every active task for an immediate update.
    ///
    /// Tasks with a refresh already pending are reported as [`ControlError::Busy`];
    /// all other active tasks are still signalled.
    pub fn refresh_all(&self) -> Result<(), ControlError> {
        let busy: Vec<&str> = self
            .shared
            .handles
            .iter()
            .filter(|h| h.is_active())
            .filter(|h| h.request_refresh() == SignalSend::Pending)
            .map(|h| h.id().as_str())
            .collect();

        if busy.is_empty() {
            debug!("refresh requested for all tasks");
            return Ok(());
        }
        self.shared.metrics.record_control_rejected("refresh_all");
        Err(ControlError::Busy(format!(
            "refresh already pending for: {}",
            busy.join(", ")
        )))
    }

    /// Wake one task for an immediate update. No-op for an inactive task.
    pub fn refresh(&self, id: &str) -> Result<(), ControlError> {
        let handle = self.find(id)?;
        if !handle.is_active() {
            debug!(module = id, "refresh of inactive task ignored");
            return Ok(());
        }

        match handle.request_refresh() {
            SignalSend::Pending => {
                self.shared.metrics.record_control_rejected("refresh");
                Err(ControlError::Busy(format!("refresh already pending for {id}")))
            }
            SignalSend::Sent | SignalSend::Closed => Ok(()),
        }
    }

    /// Change a task's interval; applies from its next sleep.
    ///
    /// With `refresh`, the task is also woken so the new interval applies right away.
    /// A refresh that is already pending satisfies that request.
    pub fn patch_interval(&self, id: &str, interval: i64, refresh: bool) -> Result<(), ControlError> {
        let handle = self.find(id)?;
        let interval = IntervalSecs::try_from(interval).map_err(|_| {
            ControlError::InvalidArgument(format!("interval must be >= 0, got {interval}"))
        })?;

        let previous = handle.set_interval(interval);
        if previous != interval {
            info!(module = id, from = previous, to = interval, "interval changed");
        }
        if refresh && handle.is_active() {
            handle.request_refresh();
        }
        Ok(())
    }

    /// Stop every task and move the engine to `Draining`.
    pub fn stop_all(&self) {
        self.shared.begin_draining();
        for handle in &self.shared.handles {
            handle.request_stop();
        }
        info!("stop requested for all tasks");
    }

    /// Stop one task. Stopping an inactive task is a no-op.
    pub fn stop(&self, id: &str) -> Result<(), ControlError> {
        let handle = self.find(id)?;
        if handle.request_stop() == SignalSend::Sent {
            info!(module = id, "stop requested");
        }
        Ok(())
    }

    /// Engine uptime in seconds.
    pub fn uptime(&self) -> u64 {
        self.shared.uptime()
    }

    /// Engine lifecycle state.
    pub fn state(&self) -> EngineState {
        self.shared.state()
    }

    fn find(&self, id: &str) -> Result<&Arc<TaskHandle>, ControlError> {
        self.shared
            .find(id)
            .ok_or_else(|| ControlError::NotFound(id.to_string()))
    }
}
