//! Fixed-interval scheduler with cooperative cancellation.
//!
//! Two states: `Idle` (waiting out the interval) and `Running` (one cycle).
//! The first cycle starts immediately. After each cycle the scheduler returns
//! to `Idle` regardless of what the cycle reported. Cancelling the token wakes
//! an idle scheduler at once; a running cycle is never interrupted.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
}

/// Shared stop signal. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (lock, cvar) = &*self.inner;
        let mut cancelled = lock.lock().unwrap_or_else(|p| p.into_inner());
        *cancelled = true;
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Block for up to `timeout`. Returns `true` if cancelled meanwhile.
    ///
    /// A timeout too large to express as a deadline waits for cancellation
    /// alone.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let mut cancelled = lock.lock().unwrap_or_else(|p| p.into_inner());

        let Some(deadline) = Instant::now().checked_add(timeout) else {
            while !*cancelled {
                cancelled = cvar.wait(cancelled).unwrap_or_else(|p| p.into_inner());
            }
            return true;
        };

        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            cancelled = match cvar.wait_timeout(cancelled, deadline - now) {
                Ok((guard, _)) => guard,
                Err(p) => p.into_inner().0,
            };
        }
        *cancelled
    }
}

pub struct Scheduler {
    interval: Duration,
    token: CancellationToken,
}

impl Scheduler {
    pub fn new(interval: Duration, token: CancellationToken) -> Self {
        Self { interval, token }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Run `cycle` every `interval` until cancelled; returns completed cycles.
    pub fn run<F: FnMut()>(&self, mut cycle: F) -> u64 {
        let mut completed: u64 = 0;
        let mut state = SchedulerState::Running;

        info!(interval_secs = self.interval.as_secs(), "scheduler started");

        while !self.token.is_cancelled() {
            match state {
                SchedulerState::Running => {
                    debug!(cycle = completed + 1, "running cycle");
                    cycle();
                    completed += 1;
                    state = SchedulerState::Idle;
                }
                SchedulerState::Idle => {
                    if self.token.wait_timeout(self.interval) {
                        break;
                    }
                    state = SchedulerState::Running;
                }
            }
        }

        info!(cycles = completed, "scheduler stopped");
        completed
    }
}
