// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared timer service
//!
//! One scheduler serves every challenge expiry and turn timer in the
//! process. Entities own only a [`TimerHandle`]; dropping the handle
//! guarantees the timer can no longer fire on their behalf.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Spawns delayed tasks on the tokio runtime
#[derive(Debug, Clone, Copy, Default)]
pub struct Scheduler;

impl Scheduler {
    /// Create a new scheduler
    pub fn new() -> Self {
        Self
    }

    /// Run `task` after `delay`, returning a cancellable handle
    pub fn after<F>(&self, delay: Duration, task: F) -> TimerHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });
        TimerHandle { task: handle }
    }
}

/// Handle to one outstanding delayed task
///
/// Cancellation is best-effort: a callback that has already begun running
/// may still complete, so callbacks must re-check entity liveness under
/// the registry lock before acting. The handle aborts its task on drop,
/// so a removed challenge or game can never fire a timer.
#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Prevent a not-yet-fired task from running
    ///
    /// Safe to call after the task has already run.
    pub fn cancel(&self) {
        self.task.abort();
    }

    /// Whether the task has run to completion or been aborted
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
