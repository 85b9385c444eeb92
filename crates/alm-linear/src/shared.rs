//! Shared access to a specification.
//!
//! A [`LinearSpec`] has a single writer. [`SharedSpec`] puts it behind a
//! mutex so the add/solve/read cycle of one thread is exclusive, and
//! readers keep `Arc<Solution>` snapshots that need no lock at all.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use alm_core::{LayoutError, LayoutResult};
use log::warn;
use parking_lot::{Mutex, MutexGuard};

use crate::solution::{SolveReport, Solution};
use crate::spec::LinearSpec;

#[derive(Debug, Clone, Default)]
pub struct SharedSpec {
    inner: Arc<Mutex<LinearSpec>>,
}

impl SharedSpec {
    pub fn new(spec: LinearSpec) -> Self {
        Self {
            inner: Arc::new(Mutex::new(spec)),
        }
    }

    /// Exclusive access for the duration of the guard.
    pub fn lock(&self) -> MutexGuard<'_, LinearSpec> {
        self.inner.lock()
    }

    /// The last published snapshot.
    pub fn last_solution(&self) -> Option<Arc<Solution>> {
        self.inner.lock().last_solution()
    }

    /// Solve on a worker thread, giving up after `timeout`.
    ///
    /// The lock is only held while preparing and publishing, so other
    /// threads may mutate the specification meanwhile; the result is then
    /// rejected as stale. A timed-out solve publishes nothing.
    pub fn solve_with_timeout(&self, timeout: Duration) -> LayoutResult<SolveReport> {
        let job = self.inner.lock().prepare()?;
        let solver = job.solver();
        let (sender, receiver) = mpsc::channel();

        thread::Builder::new()
            .name("alm-solve".to_string())
            .spawn(move || {
                // The receiver is gone if the caller already timed out
                let _ = sender.send(job.run(&solver));
            })
            .map_err(|err| LayoutError::Solver(err.to_string()))?;

        match receiver.recv_timeout(timeout) {
            Ok(outcome) => self.inner.lock().publish(outcome),
            Err(RecvTimeoutError::Timeout) => {
                warn!("solve did not finish within {timeout:?}");
                Err(LayoutError::Timeout(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => {
                Err(LayoutError::Solver("solve worker exited without a result".to_string()))
            }
        }
    }
}

impl From<LinearSpec> for SharedSpec {
    fn from(spec: LinearSpec) -> Self {
        Self::new(spec)
    }
}
