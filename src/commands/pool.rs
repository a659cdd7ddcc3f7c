//! Bounded worker pool for command execution.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use futures::future::join_all;
use log::{debug, info, warn};
use tokio::sync::Semaphore;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time;

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Pending tasks held while every worker is busy.
const QUEUE_CAPACITY: usize = 1000;

/// How long [`DispatchPool::shutdown`] waits for in-flight and queued tasks
/// before cancelling them.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// How a submitted task was executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Placed on the backlog queue for a resident worker.
    Queued,
    /// The backlog was full; a temporary burst task took it.
    Burst,
    /// Backlog and burst capacity were exhausted; the submitting task ran
    /// it inline before returning.
    Inline,
    /// The pool was already shut down; the task was dropped.
    Discarded,
}

/// Fixed-size worker pool with a bounded backlog and caller-runs overflow.
///
/// The pool starts one resident worker per unit of available parallelism
/// and accepts up to [`QUEUE_CAPACITY`] queued tasks. When the queue is
/// full, up to the same number of temporary burst tasks may run submissions
/// concurrently, doubling the effective worker count. When burst capacity
/// is exhausted too, the submitting task executes the job itself. Overload
/// therefore slows the submitter down instead of dropping work.
///
/// Must be constructed inside a Tokio runtime.
///
/// # Shutdown
///
/// [`shutdown`](Self::shutdown) closes the queue, waits up to
/// [`SHUTDOWN_GRACE`] for outstanding tasks to finish and then cancels
/// whatever remains. Tasks submitted afterwards are discarded with a debug
/// log. Dropping the pool cancels outstanding tasks without the grace
/// period.
pub struct DispatchPool {
    queue: tokio::sync::Mutex<Option<mpsc::Sender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    burst: Arc<Semaphore>,
    burst_tasks: Mutex<Vec<JoinHandle<()>>>,
    inline_runs: AtomicU64,
}

impl DispatchPool {
    /// Creates a pool sized from the host's available parallelism.
    pub fn new() -> Self {
        let core_workers = thread::available_parallelism()
            .map(usize::from)
            .unwrap_or(1);
        Self::with_capacity(core_workers, QUEUE_CAPACITY)
    }

    /// Creates a pool with an explicit worker count and backlog capacity.
    ///
    /// Burst capacity always equals the resident worker count, so at most
    /// `2 * core_workers` tasks run concurrently.
    pub fn with_capacity(core_workers: usize, queue_capacity: usize) -> Self {
        let core_workers = core_workers.max(1);
        let (tx, rx) = mpsc::channel::<Job>(queue_capacity.max(1));
        let rx = Arc::new(tokio::sync::Mutex::new(rx));

        let mut workers = Vec::with_capacity(core_workers);
        for _ in 0..core_workers {
            let rx = Arc::clone(&rx);
            workers.push(tokio::spawn(async move {
                loop {
                    // Release the receiver lock before running the job so
                    // the other workers keep draining the queue.
                    let job = { rx.lock().await.recv().await };
                    match job {
                        Some(job) => job.await,
                        None => break,
                    }
                }
            }));
        }

        info!("dispatch pool started with {core_workers} workers");

        DispatchPool {
            queue: tokio::sync::Mutex::new(Some(tx)),
            workers: Mutex::new(workers),
            burst: Arc::new(Semaphore::new(core_workers)),
            burst_tasks: Mutex::new(Vec::new()),
            inline_runs: AtomicU64::new(0),
        }
    }

    /// Submits a task for execution.
    ///
    /// Returns once the task is queued, handed to a burst task, or, under
    /// full saturation, after running it inline on the current task.
    pub async fn submit<F>(&self, job: F) -> SubmitOutcome
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let job: Job = Box::pin(job);

        let Some(queue) = self.queue.lock().await.clone() else {
            debug!("dispatch pool is shut down, discarding task");
            return SubmitOutcome::Discarded;
        };

        match queue.try_send(job) {
            Ok(()) => SubmitOutcome::Queued,
            Err(TrySendError::Closed(_)) => {
                debug!("dispatch pool is shut down, discarding task");
                SubmitOutcome::Discarded
            }
            Err(TrySendError::Full(job)) => match Arc::clone(&self.burst).try_acquire_owned() {
                Ok(permit) => {
                    let handle = tokio::spawn(async move {
                        job.await;
                        drop(permit);
                    });
                    let mut burst_tasks = self.burst_tasks.lock().unwrap();
                    burst_tasks.retain(|task| !task.is_finished());
                    burst_tasks.push(handle);
                    SubmitOutcome::Burst
                }
                Err(_) => {
                    self.inline_runs.fetch_add(1, Ordering::Relaxed);
                    job.await;
                    SubmitOutcome::Inline
                }
            },
        }
    }

    /// Number of tasks that ran inline on their submitter under saturation.
    pub fn inline_executions(&self) -> u64 {
        self.inline_runs.load(Ordering::Relaxed)
    }

    /// Shuts the pool down, draining outstanding tasks first.
    ///
    /// Closes the queue to new submissions, waits up to [`SHUTDOWN_GRACE`]
    /// for workers and burst tasks to finish and cancels whatever is still
    /// running afterwards.
    pub async fn shutdown(&self) {
        self.queue.lock().await.take();

        let mut tasks: Vec<JoinHandle<()>> = self.workers.lock().unwrap().drain(..).collect();
        tasks.extend(self.burst_tasks.lock().unwrap().drain(..));
        if tasks.is_empty() {
            return;
        }

        let aborts: Vec<AbortHandle> = tasks.iter().map(JoinHandle::abort_handle).collect();
        if time::timeout(SHUTDOWN_GRACE, join_all(tasks)).await.is_err() {
            warn!("dispatch pool did not drain in time, cancelling remaining tasks");
            for handle in aborts {
                handle.abort();
            }
        }
    }
}

impl Default for DispatchPool {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DispatchPool {
    fn drop(&mut self) {
        if let Ok(workers) = self.workers.get_mut() {
            for handle in workers.drain(..) {
                handle.abort();
            }
        }
        if let Ok(burst_tasks) = self.burst_tasks.get_mut() {
            for handle in burst_tasks.drain(..) {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    async fn wait_for_count(counter: &AtomicUsize, expected: usize) {
        let deadline = time::Instant::now() + Duration::from_secs(10);
        while counter.load(Ordering::SeqCst) < expected {
            assert!(
                time::Instant::now() < deadline,
                "only {} of {expected} tasks completed",
                counter.load(Ordering::SeqCst)
            );
            time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn test_submitted_tasks_run() {
        let pool = DispatchPool::with_capacity(2, 8);
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            let counter = Arc::clone(&counter);
            let outcome = pool
                .submit(async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .await;
            assert_eq!(outcome, SubmitOutcome::Queued);
        }

        wait_for_count(&counter, 5).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_no_task_is_dropped_under_saturation() {
        let pool = DispatchPool::with_capacity(4, 100);
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..2000 {
            let counter = Arc::clone(&counter);
            pool.submit(async move {
                time::sleep(Duration::from_millis(1)).await;
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await;
        }

        wait_for_count(&counter, 2000).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2000);
        // The backlog holds 100 tasks at most, so some of the 2000 must
        // have run inline on the submitter.
        assert!(pool.inline_executions() > 0);
    }

    #[tokio::test]
    async fn test_inline_runs_on_full_backlog() {
        // One worker stuck on a slow job, a single queue slot and a single
        // burst slot: the third submission has to run inline.
        let pool = DispatchPool::with_capacity(1, 1);
        let counter = Arc::new(AtomicUsize::new(0));

        let blocker = Arc::clone(&counter);
        pool.submit(async move {
            time::sleep(Duration::from_millis(200)).await;
            blocker.fetch_add(1, Ordering::SeqCst);
        })
        .await;

        let mut outcomes = Vec::new();
        for _ in 0..3 {
            let counter = Arc::clone(&counter);
            outcomes.push(
                pool.submit(async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .await,
            );
        }

        assert!(outcomes.contains(&SubmitOutcome::Inline));
        wait_for_count(&counter, 4).await;
    }

    #[tokio::test]
    async fn test_shutdown_drains_pending_tasks() {
        let pool = DispatchPool::with_capacity(2, 32);
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..10 {
            let counter = Arc::clone(&counter);
            pool.submit(async move {
                time::sleep(Duration::from_millis(5)).await;
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await;
        }

        pool.shutdown().await;
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_submit_after_shutdown_is_discarded() {
        let pool = DispatchPool::with_capacity(2, 8);
        pool.shutdown().await;

        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);
        let outcome = pool
            .submit(async move {
                counter_clone.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        assert_eq!(outcome, SubmitOutcome::Discarded);
        time::sleep(Duration::from_millis(20)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_shutdown_twice_is_noop() {
        let pool = DispatchPool::with_capacity(1, 1);
        pool.shutdown().await;
        pool.shutdown().await;
    }
}
