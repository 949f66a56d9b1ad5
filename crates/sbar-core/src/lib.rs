pub mod aggregator;
pub mod control;
pub mod display;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod monitor;
pub mod slots;
pub mod supervisor;

#[cfg(test)]
pub(crate) mod testing;

pub mod prelude {
    pub use crate::control::{ControlError, ControlPlane};
    pub use crate::display::{DisplaySink, MemorySink, SinkHandle, StdoutSink};
    pub use crate::engine::{Engine, EngineBuilder, EngineState, KillProcess, ShutdownOutcome, Terminator};
    pub use crate::error::CoreError;
    pub use crate::metrics::{FinishReason, MetricsBackend, MetricsHandle, UpdateOutcome};
    pub use crate::monitor::{Flow, Monitor, MonitorError};
    pub use crate::supervisor::TaskHandle;
}
