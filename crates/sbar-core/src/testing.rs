//! Monitors and helpers shared by the crate's unit tests.
use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;

use sbar_model::{EngineConfig, IntervalSecs};

use crate::{
    display::MemorySink,
    engine::{Engine, Terminator},
    error::CoreError,
    monitor::{Flow, Monitor, MonitorError},
};

/// Monitor replaying a fixed script of update results.
///
/// Once the script is exhausted every update returns `Ok(Flow::Continue)`.
/// Success output is `"{name}#{n}"` where `n` counts update calls.
pub(crate) struct ScriptedMonitor {
    name: String,
    script: VecDeque<Result<Flow, MonitorError>>,
    calls: Arc<AtomicUsize>,
    work: Duration,
    hang: bool,
    output: String,
}

impl ScriptedMonitor {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            script: VecDeque::new(),
            calls: Arc::new(AtomicUsize::new(0)),
            work: Duration::ZERO,
            hang: false,
            output: String::new(),
        }
    }

    pub(crate) fn then(mut self, result: Result<Flow, MonitorError>) -> Self {
        self.script.push_back(result);
        self
    }

    /// Each update sleeps for `work` before returning.
    pub(crate) fn working_for(mut self, work: Duration) -> Self {
        self.work = work;
        self
    }

    /// Updates never return.
    pub(crate) fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    /// Shared update call counter.
    pub(crate) fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl Monitor for ScriptedMonitor {
    async fn update(&mut self) -> Result<Flow, MonitorError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.hang {
            std::future::pending::<()>().await;
        }
        if !self.work.is_zero() {
            tokio::time::sleep(self.work).await;
        }
        self.output = format!("{}#{n}", self.name);
        self.script.pop_front().unwrap_or(Ok(Flow::Continue))
    }

    fn render(&self) -> String {
        self.output.clone()
    }

    fn render_error(&self) -> String {
        format!("{} err", self.name)
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

/// Terminator counting its invocations instead of killing the test process.
#[derive(Debug, Default, Clone)]
pub(crate) struct RecordingTerminator {
    calls: Arc<Mutex<Vec<usize>>>,
}

impl RecordingTerminator {
    /// Stuck-task counts passed to each invocation.
    pub(crate) fn calls(&self) -> Vec<usize> {
        self.calls.lock().unwrap().clone()
    }
}

impl Terminator for RecordingTerminator {
    fn terminate(&self, stuck: usize) {
        self.calls.lock().unwrap().push(stuck);
    }
}

pub(crate) fn count(calls: &AtomicUsize) -> usize {
    calls.load(Ordering::SeqCst)
}

/// Build an engine over `monitors` and run it in the background.
///
/// Output goes to a [`MemorySink`], forced termination to a [`RecordingTerminator`]; no signal watcher.
pub(crate) fn spawn_engine(
    monitors: Vec<(ScriptedMonitor, IntervalSecs)>,
) -> (Arc<Engine>, tokio::task::JoinHandle<Result<(), CoreError>>) {
    let mut builder = Engine::builder(EngineConfig::default())
        .with_sink(Arc::new(MemorySink::new()))
        .with_terminator(Arc::new(RecordingTerminator::default()))
        .with_signal_handler(false);
    for (monitor, interval) in monitors {
        builder.register(monitor, interval).unwrap();
    }

    let engine = Arc::new(builder.build().unwrap());
    let runner = Arc::clone(&engine);
    let run = tokio::spawn(async move { runner.run().await });
    (engine, run)
}
