//! Engine: owns the registered tasks and runs the system as a whole.
//!
//! Lifecycle: `Idle → Running → Draining → Stopped`.
//! - [`Engine::run`] starts one supervisor per task plus the aggregator, then blocks until `Stopped`;
//! - an OS signal, [`ControlPlane::stop_all`] or [`Engine::shutdown`] moves the engine to `Draining`;
//! - `Stopped` is reached once all tasks are terminal or the grace period has run out.
//!   In the latter case the configured [`Terminator`] is invoked.
mod builder;
pub use builder::EngineBuilder;

mod shared;
pub(crate) use shared::Shared;

mod terminate;
pub use terminate::{KillProcess, Terminator};

mod signals;
use signals::ShutdownSignals;

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use tracing::{info, warn};

use sbar_model::{EngineConfig, ModuleId};

use crate::{
    aggregator::Aggregator, control::ControlPlane, error::CoreError,
    supervisor::{TaskHandle, TaskSupervisor},
};
use builder::Registration;

/// Engine lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Running,
    Draining,
    Stopped,
}

/// Result of [`Engine::shutdown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every task stopped within the grace period.
    Graceful,
    /// Listed tasks were still active at the deadline.
    GraceExceeded { stuck: Vec<ModuleId> },
}

struct Pending {
    tasks: Vec<Registration>,
    signal_handler: bool,
}

/// Runs registered monitors and aggregates their output.
pub struct Engine {
    shared: Arc<Shared>,
    pending: Mutex<Option<Pending>>,
}

impl Engine {
    /// Start building an engine.
    pub fn builder(cfg: EngineConfig) -> EngineBuilder {
        EngineBuilder::new(cfg)
    }

    /// Start all tasks and block until the engine is `Stopped`.
    ///
    /// Shuts the engine down on its own once every task is terminal.
    /// Returns [`CoreError::AlreadyStarted`] if the engine has already been run or shut down.
    pub async fn run(&self) -> Result<(), CoreError> {
        let pending = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or(CoreError::AlreadyStarted)?;
        if !self.shared.start() {
            return Err(CoreError::AlreadyStarted);
        }
        let shared = &self.shared;
        info!(tasks = shared.handles.len(), "engine started");

        let aggregator = Aggregator::new(
            shared.board.clone(),
            shared.cfg.layout.clone(),
            Arc::clone(&shared.sink),
            shared.cfg.tick(),
        );
        shared.set_aggregator(tokio::spawn(aggregator.run(shared.cancel.clone())));

        for (index, reg) in pending.tasks.into_iter().enumerate() {
            let sup = TaskSupervisor::new(
                reg.handle,
                reg.monitor,
                reg.signals,
                shared.board.writer(index),
                Arc::clone(&shared.metrics),
            );
            let shared = Arc::clone(shared);
            tokio::spawn(async move {
                sup.run().await;
                shared.task_finished();
            });
        }

        if pending.signal_handler {
            tokio::spawn(watch_signals(Arc::clone(shared)));
        }

        // Whoever moved the engine out of `Running`, the grace deadline starts here.
        tokio::select! {
            _ = shared.all_tasks_finished() => info!("all tasks finished"),
            _ = shared.wait_draining() => {}
        }
        // A concurrent `shutdown` with a shorter grace may reach `Stopped` first.
        tokio::select! {
            _ = shared.shutdown(shared.cfg.grace()) => {}
            _ = shared.wait_stopped() => {}
        }
        Ok(())
    }

    /// Stop every task, wait up to `grace`, then enter `Stopped`.
    ///
    /// After a grace overrun the configured [`Terminator`] is invoked once.
    pub async fn shutdown(&self, grace: Duration) -> ShutdownOutcome {
        self.shared.shutdown(grace).await
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.shared.state()
    }

    /// Watch lifecycle transitions.
    pub fn subscribe_state(&self) -> tokio::sync::watch::Receiver<EngineState> {
        self.shared.subscribe_state()
    }

    /// Resolves once the engine is `Stopped`.
    pub async fn wait_stopped(&self) {
        self.shared.wait_stopped().await
    }

    /// Seconds since [`Engine::run`] started, `0` before.
    pub fn uptime(&self) -> u64 {
        self.shared.uptime()
    }

    /// Control plane handle.
    pub fn control(&self) -> ControlPlane {
        ControlPlane::new(Arc::clone(&self.shared))
    }

    /// Registered tasks in registration order.
    pub fn tasks(&self) -> &[Arc<TaskHandle>] {
        &self.shared.handles
    }

    /// Current slot contents in registration order.
    pub fn outputs(&self) -> Vec<String> {
        self.shared.board.snapshot()
    }

    /// Engine configuration after registration (split position included).
    pub fn config(&self) -> &EngineConfig {
        &self.shared.cfg
    }
}

async fn watch_signals(shared: Arc<Shared>) {
    let mut signals = match ShutdownSignals::install() {
        Ok(signals) => signals,
        Err(e) => {
            warn!(error = %e, "cannot install signal handlers");
            return;
        }
    };
    tokio::select! {
        _ = shared.cancel.cancelled() => {}
        signal = signals.recv() => {
            info!(signal, "shutdown signal received");
            shared.shutdown(shared.cfg.grace()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::{self, Instant};

    use super::*;
    use crate::{
        display::MemorySink,
        monitor::{Flow, MonitorError},
        testing::{RecordingTerminator, ScriptedMonitor, count},
    };

    struct Fixture {
        engine: Arc<Engine>,
        sink: MemorySink,
        terminator: RecordingTerminator,
    }

    fn fixture(monitors: Vec<(ScriptedMonitor, u64)>) -> Fixture {
        let sink = MemorySink::new();
        let terminator = RecordingTerminator::default();
        let mut builder = Engine::builder(EngineConfig::default())
            .with_sink(Arc::new(sink.clone()))
            .with_terminator(Arc::new(terminator.clone()))
            .with_signal_handler(false);
        for (monitor, interval) in monitors {
            builder.register(monitor, interval).unwrap();
        }
        Fixture {
            engine: Arc::new(builder.build().unwrap()),
            sink,
            terminator,
        }
    }

    fn start(engine: &Arc<Engine>) -> tokio::task::JoinHandle<Result<(), CoreError>> {
        let engine = Arc::clone(engine);
        tokio::spawn(async move { engine.run().await })
    }

    #[tokio::test(start_paused = true)]
    async fn single_shot_task_finishes_while_others_keep_running() {
        let f = fixture(vec![
            (ScriptedMonitor::new("fast"), 1),
            (ScriptedMonitor::new("once"), 0),
            (ScriptedMonitor::new("slow"), 5),
        ]);
        let run = start(&f.engine);

        time::sleep(Duration::from_millis(600)).await;
        let tasks = f.engine.tasks();
        assert_eq!(f.engine.state(), EngineState::Running);
        assert_eq!(f.engine.outputs()[1], "once#1");
        assert!(tasks[0].is_active());
        assert!(!tasks[1].is_active());
        assert!(tasks[2].is_active());
        assert_eq!(f.sink.last().as_deref(), Some("[fast#1] [once#1] [slow#1]"));

        assert_eq!(f.engine.shutdown(Duration::from_secs(5)).await, ShutdownOutcome::Graceful);
        run.await.unwrap().unwrap();

        assert_eq!(f.engine.state(), EngineState::Stopped);
        assert_eq!(f.sink.last().as_deref(), Some("Statusbar stopped"));
        assert!(f.terminator.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn run_twice_is_rejected() {
        let f = fixture(vec![(ScriptedMonitor::new("clock"), 1)]);
        let run = start(&f.engine);
        time::sleep(Duration::from_millis(10)).await;

        assert!(matches!(f.engine.run().await, Err(CoreError::AlreadyStarted)));

        f.engine.shutdown(Duration::from_secs(1)).await;
        run.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_all_then_shutdown_is_graceful() {
        let f = fixture(vec![
            (ScriptedMonitor::new("a"), 1),
            (ScriptedMonitor::new("b"), 30),
        ]);
        let run = start(&f.engine);
        time::sleep(Duration::from_millis(100)).await;

        f.engine.control().stop_all();
        assert_eq!(f.engine.state(), EngineState::Draining);

        let t0 = Instant::now();
        let outcome = f.engine.shutdown(Duration::from_secs(5)).await;
        assert_eq!(outcome, ShutdownOutcome::Graceful);
        assert!(t0.elapsed() < Duration::from_secs(5));

        run.await.unwrap().unwrap();
        assert_eq!(f.engine.state(), EngineState::Stopped);
        assert!(f.engine.tasks().iter().all(|t| !t.is_active()));
        assert!(f.terminator.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn hung_task_forces_termination_at_grace_deadline() {
        let f = fixture(vec![
            (ScriptedMonitor::new("ok"), 1),
            (ScriptedMonitor::new("stuck").hanging(), 1),
        ]);
        let run = start(&f.engine);
        time::sleep(Duration::from_millis(100)).await;

        f.engine.control().stop_all();
        let t0 = Instant::now();
        let outcome = f.engine.shutdown(Duration::from_secs(5)).await;

        assert_eq!(t0.elapsed(), Duration::from_secs(5));
        assert_eq!(
            outcome,
            ShutdownOutcome::GraceExceeded {
                stuck: vec![ModuleId::new("stuck").unwrap()]
            }
        );
        assert_eq!(f.engine.state(), EngineState::Stopped);
        assert_eq!(f.terminator.calls(), vec![1]);

        run.await.unwrap().unwrap();
        assert_eq!(f.terminator.calls(), vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_all_alone_enforces_grace_deadline() {
        let f = fixture(vec![
            (ScriptedMonitor::new("ok"), 1),
            (ScriptedMonitor::new("stuck").hanging(), 1),
        ]);
        let run = start(&f.engine);
        time::sleep(Duration::from_millis(100)).await;

        let t0 = Instant::now();
        f.engine.control().stop_all();
        run.await.unwrap().unwrap();

        assert_eq!(t0.elapsed(), Duration::from_secs(5));
        assert_eq!(f.engine.state(), EngineState::Stopped);
        assert_eq!(f.terminator.calls(), vec![1]);
        assert_eq!(f.sink.last().as_deref(), Some("Statusbar stopped"));
        assert!(f.engine.tasks()[1].is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn run_returns_with_a_shorter_explicit_grace() {
        let f = fixture(vec![(ScriptedMonitor::new("stuck").hanging(), 1)]);
        let run = start(&f.engine);
        time::sleep(Duration::from_millis(100)).await;

        let t0 = Instant::now();
        let shutdown = {
            let engine = Arc::clone(&f.engine);
            tokio::spawn(async move { engine.shutdown(Duration::from_secs(1)).await })
        };
        run.await.unwrap().unwrap();

        assert_eq!(t0.elapsed(), Duration::from_secs(1));
        assert!(matches!(
            shutdown.await.unwrap(),
            ShutdownOutcome::GraceExceeded { .. }
        ));
        assert_eq!(f.terminator.calls(), vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn engine_stops_when_every_task_is_terminal() {
        let once = ScriptedMonitor::new("once");
        let broken = ScriptedMonitor::new("broken").then(Err(MonitorError::fatal("gone")));
        let done = ScriptedMonitor::new("done").then(Ok(Flow::Finish));
        let calls = once.calls();
        let f = fixture(vec![(once, 0), (broken, 1), (done, 1)]);

        start(&f.engine).await.unwrap().unwrap();

        assert_eq!(f.engine.state(), EngineState::Stopped);
        assert_eq!(count(&calls), 1);
        assert_eq!(
            f.engine.outputs(),
            vec!["once#1".to_string(), "broken err".to_string(), "done#1".to_string()]
        );
        assert_eq!(f.sink.last().as_deref(), Some("Statusbar stopped"));
    }

    #[tokio::test(start_paused = true)]
    async fn uptime_counts_from_run() {
        let f = fixture(vec![(ScriptedMonitor::new("clock"), 1)]);
        assert_eq!(f.engine.uptime(), 0);

        let run = start(&f.engine);
        time::sleep(Duration::from_millis(3_100)).await;
        assert_eq!(f.engine.uptime(), 3);
        assert_eq!(f.engine.tasks()[0].uptime(), 3);

        f.engine.shutdown(Duration::from_secs(1)).await;
        run.await.unwrap().unwrap();
        assert_eq!(f.engine.tasks()[0].uptime(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_before_run_stops_engine() {
        let f = fixture(vec![(ScriptedMonitor::new("clock"), 1)]);

        assert_eq!(f.engine.shutdown(Duration::from_secs(1)).await, ShutdownOutcome::Graceful);
        assert_eq!(f.engine.state(), EngineState::Stopped);
        assert!(matches!(f.engine.run().await, Err(CoreError::AlreadyStarted)));
    }

    #[test]
    fn registration_rules() {
        let mut builder = Engine::builder(EngineConfig::default());

        let id = builder.register(ScriptedMonitor::new("CPU Temp"), 2).unwrap();
        assert_eq!(id.as_str(), "cpu-temp");
        builder.split();

        let err = builder
            .register(ScriptedMonitor::new("cpu temp"), 2)
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateModule(ref id) if id.as_str() == "cpu-temp"));

        let err = builder
            .register_as("  ", ScriptedMonitor::new("x"), 1)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidModuleId(_)));

        builder
            .register_as("load", ScriptedMonitor::new("cpu temp"), 1)
            .unwrap();
        assert_eq!(builder.len(), 2);

        let engine = builder.build().unwrap();
        assert_eq!(engine.config().layout.split_after, Some(0));
        assert_eq!(engine.tasks()[1].id().as_str(), "load");
        assert_eq!(engine.tasks()[1].name(), "cpu temp");
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn build_rejects_invalid_config() {
        let mut cfg = EngineConfig::default();
        cfg.tick_ms = 0;
        assert!(matches!(Engine::builder(cfg).build(), Err(CoreError::Config(_))));
    }
}
