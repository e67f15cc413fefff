use crate::status::ProcessStatus;
use log::{debug, warn};
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// How long background jobs get to exit after SIGTERM before SIGKILL.
const TERM_GRACE: Duration = Duration::from_millis(500);
const REAP_POLL: Duration = Duration::from_millis(10);

/// A background child the shell has not reaped yet.
#[derive(Debug)]
pub struct Job {
    pub pid: Pid,
    pub cmdline: String,
}

/// Tracks background children, keyed by process ID.
///
/// Reaping is driven by a flag raised from the SIGCHLD handler so the
/// job table is only polled after some child changed state.
pub struct JobList {
    jobs: HashMap<Pid, Job>,
    child_exited: Arc<AtomicBool>,
}

impl JobList {
    pub fn new(child_exited: Arc<AtomicBool>) -> Self {
        JobList {
            jobs: HashMap::new(),
            child_exited,
        }
    }

    pub fn add(&mut self, pid: Pid, cmdline: String) {
        debug!("tracking background job {} ({})", pid, cmdline);
        self.jobs.insert(pid, Job { pid, cmdline });
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Polls every tracked job without blocking and returns the ones that
    /// finished, in ascending pid order.
    pub fn reap(&mut self) -> Vec<(Job, ProcessStatus)> {
        if !self.child_exited.swap(false, Ordering::SeqCst) {
            return Vec::new();
        }

        let mut pids: Vec<Pid> = self.jobs.keys().copied().collect();
        pids.sort_by_key(|pid| pid.as_raw());

        let mut finished = Vec::new();
        for pid in pids {
            match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
                Ok(status) => {
                    if let Some(status) = ProcessStatus::from_wait(status) {
                        if let Some(job) = self.jobs.remove(&pid) {
                            debug!("reaped background job {}: {}", pid, status);
                            finished.push((job, status));
                        }
                    }
                }
                Err(Errno::ECHILD) => {
                    warn!("background job {} vanished before it was reaped", pid);
                    self.jobs.remove(&pid);
                }
                Err(err) => warn!("waitpid({}) failed: {}", pid, err),
            }
        }
        finished
    }

    /// Sends SIGTERM to every job still running, gives them `TERM_GRACE`
    /// to exit, then kills and reaps whatever is left.
    pub fn terminate_all(&mut self) {
        let mut pending = Vec::new();
        for (pid, job) in self.jobs.drain() {
            debug!("terminating background job {} ({})", pid, job.cmdline);
            match kill(pid, Signal::SIGTERM) {
                Ok(()) => pending.push(pid),
                Err(err) => warn!("kill({}) failed: {}", pid, err),
            }
        }

        let deadline = Instant::now() + TERM_GRACE;
        while !pending.is_empty() && Instant::now() < deadline {
            pending.retain(|&pid| !try_reap(pid));
            if !pending.is_empty() {
                thread::sleep(REAP_POLL);
            }
        }

        for pid in pending {
            debug!("background job {} ignored SIGTERM, killing it", pid);
            if let Err(err) = kill(pid, Signal::SIGKILL) {
                warn!("kill({}) failed: {}", pid, err);
                continue;
            }
            while !try_reap_blocking(pid) {}
        }
    }
}

/// Reaps `pid` if it has terminated. Returns true once it is gone.
fn try_reap(pid: Pid) -> bool {
    match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
        Ok(status) => ProcessStatus::from_wait(status).is_some(),
        Err(Errno::EINTR) => false,
        Err(err) => {
            warn!("waitpid({}) failed: {}", pid, err);
            true
        }
    }
}

fn try_reap_blocking(pid: Pid) -> bool {
    match waitpid(pid, None) {
        Ok(WaitStatus::Exited(..)) | Ok(WaitStatus::Signaled(..)) => true,
        Ok(_) | Err(Errno::EINTR) => false,
        Err(err) => {
            warn!("waitpid({}) failed: {}", pid, err);
            true
        }
    }
}

/// Prints a completion notice for each reaped background job.
pub fn report_finished(finished: &[(Job, ProcessStatus)]) {
    for (job, status) in finished {
        println!("background pid {} is done: {}", job.pid, status);
    }
}
