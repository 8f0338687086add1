//! Per-path write queue.
//!
//! One entry per resolved path while a write is running there. The entry
//! holds the writes submitted after it, in submission order.
//!
//! ```text
//! Idle ──submit──▶ Running ──next() = None──▶ Idle
//!                    │  ▲
//!                    └──┘ submit: append; next(): pop front
//! ```
//!
//! Every transition happens under the table lock, and the lock is never held
//! across an `.await`. Popping the last pending write and clearing the entry
//! are one step, so a write submitted after that finds the path idle and
//! starts its own drain.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

use libutil_core::WriteResult;

use crate::error::GenerateError;
use crate::generator::{Content, GenerateOptions};

pub(crate) type TaskResult = Result<WriteResult, GenerateError>;

/// The request half of a write: what to write and how.
pub(crate) struct Job {
    pub content: Content,
    pub options: GenerateOptions,
}

/// A job waiting behind the running one, with the channel its caller awaits.
pub(crate) struct Pending {
    pub job: Job,
    pub respond_to: oneshot::Sender<TaskResult>,
}

/// Result of [`WriteQueue::submit`].
pub(crate) enum Slot {
    /// The path was idle; the caller now drives it and must run `Job` first.
    Claimed(Job),
    /// Another call is driving the path; await the receiver for the result.
    Queued(oneshot::Receiver<TaskResult>),
}

#[derive(Default)]
pub(crate) struct WriteQueue {
    table: Mutex<HashMap<PathBuf, VecDeque<Pending>>>,
}

impl WriteQueue {
    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, VecDeque<Pending>>> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim `path` if idle, otherwise append `job` to its pending list.
    pub fn submit(&self, path: &Path, job: Job) -> Slot {
        let mut table = self.lock();
        match table.get_mut(path) {
            Some(pending) => {
                let (respond_to, rx) = oneshot::channel();
                pending.push_back(Pending { job, respond_to });
                Slot::Queued(rx)
            }
            None => {
                table.insert(path.to_path_buf(), VecDeque::new());
                Slot::Claimed(job)
            }
        }
    }

    /// Pop the next pending job for `path`. When none is left the entry is
    /// removed and `None` returned.
    pub fn next(&self, path: &Path) -> Option<Pending> {
        let mut table = self.lock();
        let next = table.get_mut(path).and_then(VecDeque::pop_front);
        if next.is_none() {
            table.remove(path);
        }
        next
    }

    /// Remove the entry for `path`, handing back whatever was still pending.
    pub fn take(&self, path: &Path) -> VecDeque<Pending> {
        self.lock().remove(path).unwrap_or_default()
    }

    #[cfg(test)]
    pub fn is_running(&self, path: &Path) -> bool {
        self.lock().contains_key(path)
    }
}

/// Clears a claimed path if the driving future is dropped mid-drain.
///
/// Pending senders are dropped with the entry, so their callers observe
/// [`GenerateError::Cancelled`].
pub(crate) struct DrainGuard<'a> {
    queue: &'a WriteQueue,
    path: &'a Path,
    armed: bool,
}

impl<'a> DrainGuard<'a> {
    pub fn new(queue: &'a WriteQueue, path: &'a Path) -> Self {
        DrainGuard {
            queue,
            path,
            armed: true,
        }
    }

    /// The drain finished and already cleared the entry.
    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let dropped = self.queue.take(self.path);
            tracing::debug!(
                pending = dropped.len(),
                "queue driver dropped: {}",
                self.path.display()
            );
        }
    }
}
