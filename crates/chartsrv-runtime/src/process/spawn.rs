//! Spawning the chart server executable.

use std::io;
use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info};

use super::handle::ServerHandle;

/// Trailing argument that stops the server from writing its info file.
pub const SERVER_ARGS_TAIL: &str = "--no-info-file";

#[cfg(windows)]
pub(super) const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Spawn `executable --host <host> --port <port> --no-info-file`.
///
/// The child runs in the executable's directory, has no stdin, and its
/// stdout/stderr are forwarded to `tracing` at debug level. On Unix it leads
/// its own process group so force termination reaches its descendants.
pub fn spawn_server(executable: &Path, host: &str, port: u16) -> io::Result<ServerHandle> {
    let mut cmd = Command::new(executable);
    cmd.arg("--host")
        .arg(host)
        .arg("--port")
        .arg(port.to_string())
        .arg(SERVER_ARGS_TAIL)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if let Some(dir) = executable.parent().filter(|d| !d.as_os_str().is_empty()) {
        cmd.current_dir(dir);
    }

    #[cfg(unix)]
    cmd.process_group(0);

    #[cfg(windows)]
    cmd.creation_flags(CREATE_NO_WINDOW);

    let mut child = cmd.spawn()?;
    info!(
        executable = %executable.display(),
        pid = ?child.id(),
        port = %port,
        "Spawned chart server"
    );

    spawn_log_readers(&mut child, port);
    Ok(ServerHandle::new(child, port))
}

fn spawn_log_readers(child: &mut Child, port: u16) {
    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(port = %port, stream = "stdout", "{line}");
            }
            debug!(port = %port, "stdout reader task exiting");
        });
    }

    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(port = %port, stream = "stderr", "{line}");
            }
            debug!(port = %port, "stderr reader task exiting");
        });
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::time::Duration;
    use tempfile::TempDir;

    fn script(dir: &TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("chart_server");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_spawn_passes_arguments() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("args.txt");
        let exe = script(&dir, &format!("echo \"$@\" > {}", out.display()));

        let mut handle = spawn_server(&exe, "127.0.0.1", 8512).unwrap();
        assert_eq!(handle.port(), 8512);
        assert!(handle.pid().is_some());
        handle.wait().await.unwrap();

        let args = std::fs::read_to_string(out).unwrap();
        assert_eq!(args.trim(), "--host 127.0.0.1 --port 8512 --no-info-file");
    }

    #[tokio::test]
    async fn test_runs_in_executable_directory() {
        let dir = TempDir::new().unwrap();
        let exe = script(&dir, "pwd > cwd.txt");

        let mut handle = spawn_server(&exe, "127.0.0.1", 8513).unwrap();
        handle.wait().await.unwrap();

        let cwd = std::fs::read_to_string(dir.path().join("cwd.txt")).unwrap();
        assert_eq!(
            std::path::Path::new(cwd.trim()).canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[tokio::test]
    async fn test_force_terminate_kills_long_running_child() {
        let dir = TempDir::new().unwrap();
        let exe = script(&dir, "exec sleep 30");

        let mut handle = spawn_server(&exe, "127.0.0.1", 8514).unwrap();
        assert!(!handle.has_exited());

        handle.force_terminate();
        let status = tokio::time::timeout(Duration::from_secs(5), handle.wait())
            .await
            .unwrap()
            .unwrap();
        assert!(!status.success());
        assert!(handle.has_exited());
    }

    #[tokio::test]
    async fn test_force_terminate_takes_descendants() {
        use nix::sys::signal::kill;
        use nix::unistd::Pid;

        let dir = TempDir::new().unwrap();
        let pid_file = dir.path().join("grandchild.pid");
        let exe = script(
            &dir,
            &format!("sleep 30 &\necho $! > {}\nwait", pid_file.display()),
        );

        let mut handle = spawn_server(&exe, "127.0.0.1", 8516).unwrap();
        let mut grandchild = None;
        for _ in 0..100 {
            if let Ok(raw) = std::fs::read_to_string(&pid_file) {
                if let Ok(pid) = raw.trim().parse::<i32>() {
                    grandchild = Some(Pid::from_raw(pid));
                    break;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        let grandchild = grandchild.expect("grandchild never started");
        assert!(kill(grandchild, None).is_ok());

        handle.force_terminate();
        tokio::time::timeout(Duration::from_secs(5), handle.wait())
            .await
            .unwrap()
            .unwrap();

        // A killed but unreaped grandchild shows up as a zombie until its
        // new parent collects it.
        let alive = |pid: Pid| {
            if kill(pid, None).is_err() {
                return false;
            }
            std::fs::read_to_string(format!("/proc/{pid}/stat")).map_or(true, |stat| {
                !stat
                    .rsplit(')')
                    .next()
                    .is_some_and(|rest| rest.trim_start().starts_with('Z'))
            })
        };
        let mut gone = false;
        for _ in 0..100 {
            if !alive(grandchild) {
                gone = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(gone, "grandchild {grandchild} outlived force_terminate");
    }

    #[tokio::test]
    async fn test_missing_executable_fails() {
        let result = spawn_server(Path::new("/nonexistent/chart_server"), "127.0.0.1", 8515);
        assert!(result.is_err());
    }
}
