//! Background job table.
//!
//! Background children are registered here after they are forked. A single
//! collector thread, started the first time a background stage is launched,
//! wakes on every SIGCHLD and polls the registered pids without blocking.
//! Only registered pids are ever waited for, so foreground children stay
//! with the executor's blocking wait.

use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread;

use nix::errno::Errno;
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::Pid;
use signal_hook::consts::SIGCHLD;
use signal_hook::iterator::{Handle, Signals};
use tracing::{debug, warn};

use crate::error::ExecError;

/// A background child that has been collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reaped {
    pub pid: Pid,
    pub status: i32,
}

#[derive(Clone, Default)]
pub struct JobTable {
    inner: Arc<Shared>,
}

#[derive(Default)]
struct Shared {
    tracked: Mutex<HashSet<Pid>>,
    subscribers: Mutex<Vec<Sender<Reaped>>>,
    collector: Mutex<Option<Handle>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the SIGCHLD collector. Calling this again is a no-op.
    ///
    /// Call before forking the child to be tracked so its exit cannot
    /// slip past the handler.
    pub fn install(&self) -> Result<(), ExecError> {
        let mut collector = lock(&self.inner.collector);
        if collector.is_some() {
            return Ok(());
        }

        let mut signals = Signals::new([SIGCHLD]).map_err(ExecError::Reaper)?;
        let handle = signals.handle();
        let shared: Weak<Shared> = Arc::downgrade(&self.inner);
        thread::Builder::new()
            .name("sigchld-collector".to_string())
            .spawn(move || {
                for _ in signals.forever() {
                    match shared.upgrade() {
                        Some(shared) => {
                            shared.collect();
                        }
                        None => break,
                    }
                }
                debug!("sigchld collector stopped");
            })
            .map_err(ExecError::Reaper)?;

        debug!("sigchld collector installed");
        *collector = Some(handle);
        Ok(())
    }

    pub fn is_installed(&self) -> bool {
        lock(&self.inner.collector).is_some()
    }

    /// Register a background child and collect anything already finished.
    pub fn track(&self, pid: Pid) {
        debug!(%pid, "tracking background job");
        lock(&self.inner.tracked).insert(pid);
        self.inner.collect();
    }

    /// One non-blocking pass over the registered children.
    pub fn collect(&self) -> Vec<Reaped> {
        self.inner.collect()
    }

    pub fn subscribe(&self) -> Receiver<Reaped> {
        let (tx, rx) = channel();
        lock(&self.inner.subscribers).push(tx);
        rx
    }

    pub fn tracked(&self) -> Vec<Pid> {
        lock(&self.inner.tracked).iter().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.inner.tracked).is_empty()
    }
}

impl Shared {
    fn collect(&self) -> Vec<Reaped> {
        let mut done = Vec::new();
        {
            let mut tracked = lock(&self.tracked);
            tracked.retain(|&pid| match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::Exited(_, code)) => {
                    done.push(Reaped { pid, status: code });
                    false
                }
                Ok(WaitStatus::Signaled(_, sig, _)) => {
                    done.push(Reaped { pid, status: 128 + sig as i32 });
                    false
                }
                Ok(_) => true,
                Err(Errno::ECHILD) => {
                    warn!(%pid, "background job vanished before it was collected");
                    false
                }
                Err(_) => true,
            });
        }

        for reaped in &done {
            self.report(*reaped);
        }
        done
    }

    fn report(&self, reaped: Reaped) {
        debug!(pid = %reaped.pid, status = reaped.status, "background job finished");
        let _ = writeln!(io::stdout(), "[{}]", reaped.pid);
        lock(&self.subscribers).retain(|tx| tx.send(reaped).is_ok());
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.collector).take() {
            handle.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use std::time::Duration;

    #[test]
    fn test_install_is_idempotent() {
        let jobs = JobTable::new();
        assert!(!jobs.is_installed());
        jobs.install().unwrap();
        jobs.install().unwrap();
        assert!(jobs.is_installed());
    }

    #[test]
    fn test_collects_tracked_child() {
        let jobs = JobTable::new();
        let rx = jobs.subscribe();
        jobs.install().unwrap();

        let child = Command::new("true").spawn().unwrap();
        let pid = Pid::from_raw(child.id() as i32);
        jobs.track(pid);

        let reaped = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(reaped, Reaped { pid, status: 0 });
        assert!(jobs.is_empty());
    }

    #[test]
    fn test_untracked_children_are_left_alone() {
        let jobs = JobTable::new();
        let mut child = Command::new("true").spawn().unwrap();
        std::thread::sleep(Duration::from_millis(100));
        assert!(jobs.collect().is_empty());
        // still waitable by its owner
        assert!(child.wait().unwrap().success());
    }

    #[test]
    fn test_running_child_stays_tracked() {
        let jobs = JobTable::new();
        let mut child = Command::new("sleep").arg("5").spawn().unwrap();
        let pid = Pid::from_raw(child.id() as i32);
        jobs.track(pid);
        assert!(jobs.collect().is_empty());
        assert_eq!(jobs.tracked(), vec![pid]);

        child.kill().unwrap();
        let mut reaped = Vec::new();
        for _ in 0..100 {
            reaped = jobs.collect();
            if !reaped.is_empty() {
                break;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
        assert_eq!(reaped[0].pid, pid);
        assert_eq!(reaped[0].status, 128 + libc::SIGKILL);
    }
}
