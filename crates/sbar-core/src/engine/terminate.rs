use tracing::error;

/// Last-resort hook invoked when tasks outlive the shutdown grace period.
///
/// Called at most once per engine, after the engine has reached `Stopped`.
pub trait Terminator: Send + Sync + 'static {
    /// `stuck` is the number of tasks still active at the deadline.
    fn terminate(&self, stuck: usize);
}

/// Kills the current process.
///
/// Sends `SIGKILL` to itself on Unix; exits with status `1` elsewhere or if the signal is not delivered.
#[derive(Debug, Default, Clone, Copy)]
pub struct KillProcess;

impl Terminator for KillProcess {
    fn terminate(&self, stuck: usize) {
        error!(stuck, "killing process");

        #[cfg(unix)]
        {
            // SAFETY: `kill` on our own pid has no memory-safety preconditions.
            let rc = unsafe { libc::kill(libc::getpid(), libc::SIGKILL) };
            if rc != 0 {
                error!(error = %std::io::Error::last_os_error(), "SIGKILL failed");
            }
        }
        std::process::exit(1);
    }
}
