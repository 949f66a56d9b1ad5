use std::collections::BTreeMap;

use async_trait::async_trait;
use sbar_model::{ModuleId, TaskInfo};

use crate::error::ApiError;

/// Routine control API handler.
///
/// This trait abstracts the backend implementation, allowing users to:
/// - Use the provided `EngineApiAdapter`
/// - Implement custom handlers with additional logic (auth, rate limiting, etc.)
#[async_trait]
pub trait ApiHandler: Send + Sync + 'static {
    /// Status of every routine, keyed by module id.
    async fn list_routines(&self) -> Result<BTreeMap<ModuleId, TaskInfo>, ApiError>;

    /// Status of one routine.
    async fn get_routine(&self, id: &str) -> Result<TaskInfo, ApiError>;

    /// Trigger an immediate update of every active routine.
    async fn refresh_all(&self) -> Result<(), ApiError>;

    /// Trigger an immediate update of one routine.
    async fn refresh(&self, id: &str) -> Result<(), ApiError>;

    /// Change a routine's interval, optionally refreshing it right away.
    async fn patch_interval(&self, id: &str, interval: i64, refresh: bool) -> Result<(), ApiError>;

    /// Stop every routine (and therefore the engine).
    async fn stop_all(&self) -> Result<(), ApiError>;

    /// Stop one routine.
    async fn stop(&self, id: &str) -> Result<(), ApiError>;
}
