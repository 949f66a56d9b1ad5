use std::{ffi::OsString, sync::Arc, time::Duration};

use serde::Deserialize;
use tokio::{process::Command, sync::watch, time};
use tracing::{debug, warn};

use sbar_core::prelude::{DisplaySink, SinkHandle, StdoutSink};

/// Upper bound for one external command run; the child is killed after it.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(2);

/// Where the aggregated bar goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// One line per tick on stdout.
    #[default]
    Stdout,
    /// X11 root window name, read by dwm.
    Xsetroot,
}

impl SinkKind {
    /// Must be called inside a tokio runtime.
    pub fn build(self) -> SinkHandle {
        match self {
            SinkKind::Stdout => Arc::new(StdoutSink),
            SinkKind::Xsetroot => Arc::new(CommandSink::spawn("xsetroot", ["-name"])),
        }
    }
}

/// Hands each bar to an external command as its last argument, e.g. `xsetroot -name <bar>`.
///
/// `display` only publishes the bar. A background task runs the command, at most one at a time;
/// bars published while it runs collapse into the latest one, and an unchanged bar is skipped.
pub struct CommandSink {
    latest: watch::Sender<String>,
}

impl CommandSink {
    /// Start the runner task. It exits once the sink is dropped.
    pub fn spawn<I, A>(program: impl Into<OsString>, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        let (latest, rx) = watch::channel(String::new());
        let runner = Runner {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            failing: false,
        };
        tokio::spawn(runner.run(rx));
        Self { latest }
    }
}

impl DisplaySink for CommandSink {
    fn display(&self, output: &str) {
        self.latest.send_if_modified(|current| {
            if current == output {
                return false;
            }
            output.clone_into(current);
            true
        });
    }
}

struct Runner {
    program: OsString,
    args: Vec<OsString>,
    /// Warn on the first failure of a streak only.
    failing: bool,
}

impl Runner {
    async fn run(mut self, mut rx: watch::Receiver<String>) {
        while rx.changed().await.is_ok() {
            let output = rx.borrow_and_update().clone();
            let result = self.exec(&output).await;
            self.report(result);
        }
        debug!(program = ?self.program, "command sink closed");
    }

    async fn exec(&self, output: &str) -> Result<(), String> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(output)
            .kill_on_drop(true)
            .status();
        match time::timeout(COMMAND_TIMEOUT, status).await {
            Ok(Ok(status)) if status.success() => Ok(()),
            Ok(Ok(status)) => Err(format!("exited with {status}")),
            Ok(Err(e)) => Err(format!("spawn failed: {e}")),
            Err(_) => Err(format!("timed out after {COMMAND_TIMEOUT:?}")),
        }
    }

    fn report(&mut self, result: Result<(), String>) {
        match result {
            Ok(()) => self.failing = false,
            Err(reason) => {
                if !self.failing {
                    warn!(program = ?self.program, %reason, "display command failed");
                }
                self.failing = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    async fn wait_for_content(path: &Path, expected: &str) -> String {
        let mut last = String::new();
        for _ in 0..100 {
            last = tokio::fs::read_to_string(path).await.unwrap_or_default();
            if last == expected {
                break;
            }
            time::sleep(Duration::from_millis(50)).await;
        }
        last
    }

    fn writer_sink(path: &Path) -> CommandSink {
        // sh -c '<script>' sh <output>
        let script = format!(r#"printf '%s' "$1" > '{}'"#, path.display());
        CommandSink::spawn("sh", ["-c".to_string(), script, "sh".to_string()])
    }

    #[tokio::test]
    async fn display_returns_without_waiting_for_the_command() {
        let path = std::env::temp_dir().join(format!("sbar-sink-slow-{}", std::process::id()));
        let script = format!(r#"sleep 1; printf '%s' "$1" > '{}'"#, path.display());
        let sink = CommandSink::spawn("sh", ["-c".to_string(), script, "sh".to_string()]);

        let t0 = std::time::Instant::now();
        sink.display("[12:00]");
        assert!(t0.elapsed() < Duration::from_millis(100));

        assert_eq!(wait_for_content(&path, "[12:00]").await, "[12:00]");
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn latest_output_wins() {
        let path = std::env::temp_dir().join(format!("sbar-sink-latest-{}", std::process::id()));
        let sink = writer_sink(&path);

        for bar in ["[a]", "[a] [b]", "[a] [b] [c]"] {
            sink.display(bar);
        }

        assert_eq!(wait_for_content(&path, "[a] [b] [c]").await, "[a] [b] [c]");
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn missing_program_does_not_break_the_sink() {
        let sink = CommandSink::spawn("/nonexistent/xsetroot", ["-name"]);
        sink.display("[a]");
        sink.display("[b]");
        time::sleep(Duration::from_millis(100)).await;

        assert_eq!(*sink.latest.borrow(), "[b]");
    }
}
