//! Bounded cooperative task queue.
//!
//! Runs at most N independent async jobs at a time and exposes "wait until
//! all pending and in-flight jobs have drained". The orchestrator schedules
//! tool executions here so they never stall text-delta forwarding.

use std::collections::VecDeque;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use tokio::sync::Notify;

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

#[derive(Default)]
struct QueueState {
    pending: VecDeque<Job>,
    in_flight: usize,
    cancelled: bool,
}

/// A minimal bounded-concurrency scheduler.
///
/// Jobs are zero-argument futures with no output; each job reports its own
/// errors through its own side channel, and a panicking job is contained so
/// the scheduler can never wedge. All queue state lives behind one mutex,
/// which serialises mutation even on a multi-threaded runtime.
pub struct TaskQueue {
    limit: usize,
    state: Mutex<QueueState>,
    idle: Notify,
}

impl TaskQueue {
    /// Create a queue running at most `max_concurrency` jobs at a time.
    /// The limit is clamped to a minimum of 1.
    pub fn new(max_concurrency: usize) -> Arc<Self> {
        Arc::new(Self {
            limit: max_concurrency.max(1),
            state: Mutex::new(QueueState::default()),
            idle: Notify::new(),
        })
    }

    /// The concurrency limit this queue was built with.
    pub fn max_concurrency(&self) -> usize {
        self.limit
    }

    /// Accept a job. Dropped silently (never polled) when the queue has
    /// been cancelled; otherwise scheduling is attempted immediately.
    pub fn enqueue<F>(self: &Arc<Self>, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        {
            let mut state = self.lock_state();
            if state.cancelled {
                return;
            }
            state.pending.push_back(Box::pin(job));
        }
        self.schedule();
    }

    /// Start pending jobs while capacity allows.
    fn schedule(self: &Arc<Self>) {
        loop {
            let job = {
                let mut state = self.lock_state();
                if state.cancelled || state.in_flight >= self.limit {
                    return;
                }
                match state.pending.pop_front() {
                    Some(job) => {
                        state.in_flight += 1;
                        job
                    }
                    None => return,
                }
            };
            let queue = Arc::clone(self);
            tokio::spawn(async move {
                if AssertUnwindSafe(job).catch_unwind().await.is_err() {
                    tracing::warn!("queued job panicked");
                }
                queue.complete_one();
            });
        }
    }

    fn complete_one(self: &Arc<Self>) {
        let now_idle = {
            let mut state = self.lock_state();
            state.in_flight -= 1;
            state.in_flight == 0 && state.pending.is_empty()
        };
        if now_idle {
            self.idle.notify_waiters();
        }
        self.schedule();
    }

    /// Mark the queue cancelled: discard all not-yet-started jobs and
    /// release everyone waiting on idle. Jobs already started are not
    /// aborted; cancelling their own I/O is each job's responsibility.
    pub fn cancel(&self) {
        {
            let mut state = self.lock_state();
            state.cancelled = true;
            state.pending.clear();
        }
        self.idle.notify_waiters();
    }

    /// Whether the queue has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.lock_state().cancelled
    }

    /// Resolve once no jobs are pending or in flight (or the queue is
    /// cancelled). Resolves immediately when already idle; any number of
    /// concurrent waiters are released together.
    pub async fn wait_for_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            // Register before checking so a completion between the check
            // and the await cannot be missed.
            notified.as_mut().enable();
            if self.is_idle() {
                return;
            }
            notified.await;
        }
    }

    fn is_idle(&self) -> bool {
        let state = self.lock_state();
        state.cancelled || (state.pending.is_empty() && state.in_flight == 0)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, QueueState> {
        // The mutex is never held across an await, so poisoning can only
        // come from a panic inside this module's own critical sections.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
