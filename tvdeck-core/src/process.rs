/// Observed state of the supervised child
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChildStatus {
    Running,
    /// Reported once, after which the slot is empty
    Exited { code: Option<i32> },
    /// Nothing is being supervised
    NotTracked,
}

#[derive(Clone, Debug)]
pub enum LaunchError {
    SpawnFailed { command: String, reason: String },
}

impl std::fmt::Display for LaunchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SpawnFailed { command, reason } => {
                write!(f, "failed to spawn '{}': {}", command, reason)
            }
        }
    }
}

impl std::error::Error for LaunchError {}

/// Starts external programs and watches the one that owns the display.
///
/// Implementations:
/// - `ProcessSupervisor` (tvdeck-cli): detached `sh -c` children via tokio
/// - test fakes that script exit timing
///
/// There is a single tracked slot. A second `launch` before the first child
/// exits replaces the slot; the launcher never does this because it hides
/// itself while a child runs.
pub trait Supervisor {
    /// Start `command` in its own session without waiting for it. Returns the
    /// child's pid when known.
    fn launch(&mut self, command: &str) -> Result<Option<u32>, LaunchError>;

    /// Non-blocking status check of the tracked child. A failed query counts
    /// as an exit.
    fn poll(&mut self) -> ChildStatus;

    /// Start `command` detached and forget about it.
    fn issue(&mut self, command: &str) -> Result<(), LaunchError>;
}
