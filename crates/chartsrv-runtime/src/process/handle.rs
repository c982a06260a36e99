//! Ownership of the spawned chart server child.

use std::io;
use std::process::ExitStatus;

use tokio::process::Child;
use tracing::{debug, warn};

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// Exclusive handle to the running chart server process.
///
/// Dropping the handle kills the child (`kill_on_drop`).
#[derive(Debug)]
pub struct ServerHandle {
    child: Child,
    pid: Option<u32>,
    port: u16,
}

impl ServerHandle {
    pub(crate) fn new(child: Child, port: u16) -> Self {
        let pid = child.id();
        Self { child, pid, port }
    }

    pub const fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Whether the OS reports the child as exited.
    ///
    /// An error querying the child counts as exited.
    pub fn has_exited(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(Some(status)) => {
                debug!(pid = ?self.pid, %status, "Chart server has exited");
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!(pid = ?self.pid, error = %e, "Failed to query chart server process");
                true
            }
        }
    }

    /// Kill the child and its descendants without waiting.
    pub fn force_terminate(&mut self) {
        #[cfg(unix)]
        self.kill_process_group();
        #[cfg(windows)]
        self.kill_process_tree();

        if let Err(e) = self.child.start_kill() {
            debug!(pid = ?self.pid, error = %e, "start_kill failed (process likely gone)");
        }
    }

    #[cfg(unix)]
    fn kill_process_group(&self) {
        let Some(pgid) = self.pid.and_then(|pid| i32::try_from(pid).ok()) else {
            return;
        };
        match signal::killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
            Ok(()) | Err(nix::errno::Errno::ESRCH) => {}
            Err(e) => warn!(pgid = %pgid, error = %e, "Failed to kill chart server process group"),
        }
    }

    /// `taskkill /T /F` the child and everything it started.
    #[cfg(windows)]
    fn kill_process_tree(&self) {
        use std::os::windows::process::CommandExt;
        use std::process::{Command, Stdio};

        let Some(pid) = self.pid else {
            return;
        };
        let result = Command::new("taskkill")
            .args(["/T", "/F", "/PID", &pid.to_string()])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .creation_flags(super::spawn::CREATE_NO_WINDOW)
            .status();
        match result {
            Ok(status) if status.success() => {}
            Ok(status) => debug!(pid = %pid, %status, "taskkill failed (process likely gone)"),
            Err(e) => warn!(pid = %pid, error = %e, "Failed to run taskkill for chart server"),
        }
    }

    /// Wait for the child to exit and reap it.
    pub async fn wait(&mut self) -> io::Result<ExitStatus> {
        self.child.wait().await
    }
}
