use std::io;
use std::process::Stdio;

use tokio::process::{Child, Command};

use tvdeck_core::process::{ChildStatus, LaunchError, Supervisor};

/// The program currently holding the display
struct SupervisedProcess {
    child: Child,
    pid: Option<u32>,
    command: String,
}

/// Runs launched apps as detached `sh -c` children and tracks the last one.
///
/// Must be used from inside a tokio runtime; the runtime reaps children whose
/// handles were dropped.
pub struct ProcessSupervisor {
    current: Option<SupervisedProcess>,
}

impl ProcessSupervisor {
    pub fn new() -> Self {
        Self { current: None }
    }

    #[cfg(test)]
    pub fn tracked_pid(&self) -> Option<u32> {
        self.current.as_ref().and_then(|p| p.pid)
    }
}

impl Default for ProcessSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn `command` through the shell in a new session so that signals aimed
/// at the launcher never reach it.
fn spawn_detached(command: &str) -> io::Result<Child> {
    let mut cmd = Command::new("sh");
    cmd.arg("-c");
    cmd.arg(command);

    #[cfg(unix)]
    unsafe {
        cmd.pre_exec(|| {
            libc::setsid();
            Ok(())
        });
    }

    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::null());

    cmd.spawn()
}

impl Supervisor for ProcessSupervisor {
    fn launch(&mut self, command: &str) -> Result<Option<u32>, LaunchError> {
        let child = spawn_detached(command).map_err(|e| LaunchError::SpawnFailed {
            command: command.to_string(),
            reason: e.to_string(),
        })?;
        let pid = child.id();

        let previous = self.current.replace(SupervisedProcess {
            child,
            pid,
            command: command.to_string(),
        });
        if let Some(previous) = previous {
            tracing::warn!(
                command = %previous.command,
                pid = ?previous.pid,
                "replacing a still-tracked process"
            );
        }

        Ok(pid)
    }

    fn poll(&mut self) -> ChildStatus {
        let Some(process) = self.current.as_mut() else {
            return ChildStatus::NotTracked;
        };

        match process.child.try_wait() {
            Ok(None) => ChildStatus::Running,
            Ok(Some(status)) => {
                tracing::debug!(command = %process.command, %status, "child exited");
                self.current = None;
                ChildStatus::Exited {
                    code: status.code(),
                }
            }
            Err(e) => {
                tracing::warn!(command = %process.command, error = %e, "poll failed, treating as exited");
                self.current = None;
                ChildStatus::Exited { code: None }
            }
        }
    }

    fn issue(&mut self, command: &str) -> Result<(), LaunchError> {
        spawn_detached(command)
            .map(|_| ())
            .map_err(|e| LaunchError::SpawnFailed {
                command: command.to_string(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn wait_for_exit(supervisor: &mut ProcessSupervisor) -> ChildStatus {
        for _ in 0..200 {
            match supervisor.poll() {
                ChildStatus::Running => tokio::time::sleep(Duration::from_millis(25)).await,
                other => return other,
            }
        }
        panic!("child did not exit in time");
    }

    #[tokio::test]
    async fn test_nothing_tracked_initially() {
        let mut supervisor = ProcessSupervisor::new();
        assert_eq!(supervisor.poll(), ChildStatus::NotTracked);
    }

    #[tokio::test]
    async fn test_running_then_exited_once() {
        let mut supervisor = ProcessSupervisor::new();
        let pid = supervisor.launch("sleep 0.3").unwrap();
        assert!(pid.is_some());
        assert_eq!(supervisor.tracked_pid(), pid);
        assert_eq!(supervisor.poll(), ChildStatus::Running);

        assert_eq!(
            wait_for_exit(&mut supervisor).await,
            ChildStatus::Exited { code: Some(0) }
        );
        assert_eq!(supervisor.poll(), ChildStatus::NotTracked);
        assert_eq!(supervisor.tracked_pid(), None);
    }

    #[tokio::test]
    async fn test_exit_code_is_reported() {
        let mut supervisor = ProcessSupervisor::new();
        supervisor.launch("exit 3").unwrap();
        assert_eq!(
            wait_for_exit(&mut supervisor).await,
            ChildStatus::Exited { code: Some(3) }
        );
    }

    #[tokio::test]
    async fn test_child_runs_in_its_own_session() {
        let mut supervisor = ProcessSupervisor::new();
        let pid = supervisor.launch("sleep 0.5").unwrap().unwrap();
        // Give the child time to reach exec
        tokio::time::sleep(Duration::from_millis(100)).await;

        let sid = unsafe { libc::getsid(pid as libc::pid_t) };
        assert_eq!(sid, pid as libc::pid_t);
        wait_for_exit(&mut supervisor).await;
    }

    #[tokio::test]
    async fn test_issue_is_untracked() {
        let mut supervisor = ProcessSupervisor::new();
        supervisor.issue("true").unwrap();
        assert_eq!(supervisor.poll(), ChildStatus::NotTracked);
    }
}
