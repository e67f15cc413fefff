use nix::sys::wait::WaitStatus;
use std::fmt;

/// How the most recent foreground child terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Exited(i32),
    Signaled(i32),
}

impl Default for ProcessStatus {
    /// Nothing has run yet, so report success.
    fn default() -> Self {
        ProcessStatus::Exited(0)
    }
}

impl ProcessStatus {
    /// Maps a wait result to a termination status. Returns `None` for
    /// dispositions that do not end the process (stopped, continued, still alive).
    pub fn from_wait(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(_, code) => Some(ProcessStatus::Exited(code)),
            WaitStatus::Signaled(_, signal, _) => Some(ProcessStatus::Signaled(signal as i32)),
            _ => None,
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessStatus::Exited(code) => write!(f, "exit value {}", code),
            ProcessStatus::Signaled(signal) => write!(f, "terminated by signal {}", signal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::Signal;
    use nix::unistd::Pid;

    #[test]
    fn test_default_is_success() {
        assert_eq!(ProcessStatus::default(), ProcessStatus::Exited(0));
        assert_eq!(ProcessStatus::default().to_string(), "exit value 0");
    }

    #[test]
    fn test_display() {
        assert_eq!(ProcessStatus::Exited(1).to_string(), "exit value 1");
        assert_eq!(
            ProcessStatus::Signaled(9).to_string(),
            "terminated by signal 9"
        );
    }

    #[test]
    fn test_from_wait() {
        let pid = Pid::from_raw(42);
        assert_eq!(
            ProcessStatus::from_wait(WaitStatus::Exited(pid, 2)),
            Some(ProcessStatus::Exited(2))
        );
        assert_eq!(
            ProcessStatus::from_wait(WaitStatus::Signaled(pid, Signal::SIGKILL, false)),
            Some(ProcessStatus::Signaled(9))
        );
        assert_eq!(
            ProcessStatus::from_wait(WaitStatus::Stopped(pid, Signal::SIGTSTP)),
            None
        );
        assert_eq!(ProcessStatus::from_wait(WaitStatus::StillAlive), None);
    }
}
