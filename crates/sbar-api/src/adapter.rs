use std::collections::BTreeMap;

use async_trait::async_trait;
use sbar_core::control::ControlPlane;
use sbar_model::{ModuleId, TaskInfo};

use crate::error::ApiError;
use crate::handler::ApiHandler;

/// Adapter that bridges the engine's `ControlPlane` to `ApiHandler`.
///
/// This is a ready-to-use implementation that directly delegates to `ControlPlane`.
#[derive(Clone)]
pub struct EngineApiAdapter {
    control: ControlPlane,
}

impl EngineApiAdapter {
    /// Create a new adapter over the given control plane.
    pub fn new(control: ControlPlane) -> Self {
        Self { control }
    }
}

#[async_trait]
impl ApiHandler for EngineApiAdapter {
    async fn list_routines(&self) -> Result<BTreeMap<ModuleId, TaskInfo>, ApiError> {
        Ok(self.control.list())
    }

    async fn get_routine(&self, id: &str) -> Result<TaskInfo, ApiError> {
        self.control.get(id).map_err(ApiError::from)
    }

    async fn refresh_all(&self) -> Result<(), ApiError> {
        self.control.refresh_all().map_err(ApiError::from)
    }

    async fn refresh(&self, id: &str) -> Result<(), ApiError> {
        self.control.refresh(id).map_err(ApiError::from)
    }

    async fn patch_interval(&self, id: &str, interval: i64, refresh: bool) -> Result<(), ApiError> {
        self.control
            .patch_interval(id, interval, refresh)
            .map_err(ApiError::from)
    }

    async fn stop_all(&self) -> Result<(), ApiError> {
        self.control.stop_all();
        Ok(())
    }

    async fn stop(&self, id: &str) -> Result<(), ApiError> {
        self.control.stop(id).map_err(ApiError::from)
    }
}
