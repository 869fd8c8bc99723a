//! Fixed-size thread pool for height and mesh generation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::Instant;

use crossbeam_channel::{Sender, unbounded};
use dashmap::DashMap;

use crate::dispatch::{Dispatch, GenerationError, Job, JobKey, panic_message};

struct Task {
    key: JobKey,
    job: Job,
}

/// Runs submitted jobs on a set of named worker threads.
pub struct WorkerPool {
    /// Dropped on shutdown so workers drain the queue and exit.
    task_sender: Option<Sender<Task>>,
    handles: Vec<JoinHandle<()>>,
    /// Submitted jobs that have not finished, with their submit time.
    pending: Arc<DashMap<JobKey, Instant>>,
    in_flight: Arc<AtomicU64>,
}

impl WorkerPool {
    pub fn new(thread_count: usize) -> Self {
        let thread_count = thread_count.max(1);
        let (task_sender, task_receiver) = unbounded::<Task>();
        let pending = Arc::new(DashMap::new());
        let in_flight = Arc::new(AtomicU64::new(0));

        let handles = (0..thread_count)
            .map(|index| {
                let receiver = task_receiver.clone();
                let pending: Arc<DashMap<JobKey, Instant>> = Arc::clone(&pending);
                let in_flight = Arc::clone(&in_flight);

                std::thread::Builder::new()
                    .name(format!("terrain-worker-{index}"))
                    .spawn(move || {
                        while let Ok(task) = receiver.recv() {
                            let Task { key, job } = task;
                            if let Err(payload) =
                                std::panic::catch_unwind(std::panic::AssertUnwindSafe(job))
                            {
                                tracing::error!(
                                    ?key,
                                    message = %panic_message(payload.as_ref()),
                                    "terrain job panicked"
                                );
                            }
                            if let Some((_, submitted)) = pending.remove(&key) {
                                tracing::trace!(
                                    ?key,
                                    elapsed_us = submitted.elapsed().as_micros() as u64,
                                    "terrain job finished"
                                );
                            }
                            in_flight.fetch_sub(1, Ordering::Relaxed);
                        }
                    })
                    .expect("Failed to spawn terrain worker thread")
            })
            .collect();

        tracing::debug!(threads = thread_count, "started terrain worker pool");

        Self {
            task_sender: Some(task_sender),
            handles,
            pending,
            in_flight,
        }
    }

    /// A pool sized from the CPU count, leaving headroom for the main thread.
    pub fn with_defaults() -> Self {
        let cpus = num_cpus::get().max(2);
        Self::new((cpus - 1).max(1))
    }

    /// A pool with `threads` workers, or the default count when `None`.
    pub fn with_threads(threads: Option<usize>) -> Self {
        match threads {
            Some(threads) => Self::new(threads),
            None => Self::with_defaults(),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// Returns `true` if a job for `key` has been submitted and not finished.
    pub fn is_pending(&self, key: &JobKey) -> bool {
        self.pending.contains_key(key)
    }

    /// Stop accepting jobs, finish the queued ones, and join the workers.
    pub fn shutdown(&mut self) {
        self.task_sender.take();
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Dispatch for WorkerPool {
    fn submit(&self, key: JobKey, job: Job) -> Result<(), GenerationError> {
        let Some(sender) = &self.task_sender else {
            return Err(GenerationError::Disconnected { key });
        };
        self.pending.insert(key, Instant::now());
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        sender.send(Task { key, job }).map_err(|_| {
            self.in_flight.fetch_sub(1, Ordering::Relaxed);
            self.pending.remove(&key);
            GenerationError::Disconnected { key }
        })
    }

    fn in_flight(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::ChunkCoord;
    use crate::queue::CompletionQueue;
    use std::time::Duration;

    fn key(x: i32) -> JobKey {
        JobKey::Height(ChunkCoord::new(x, 0))
    }

    fn wait_for<T>(queue: &CompletionQueue<T>, expected: usize) -> Vec<crate::Completion<T>> {
        let mut received = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(10);
        while received.len() < expected && Instant::now() < deadline {
            received.extend(queue.drain());
            if received.len() < expected {
                std::thread::sleep(Duration::from_millis(5));
            }
        }
        received
    }

    #[test]
    fn test_all_jobs_complete() {
        let pool = WorkerPool::new(4);
        let queue = CompletionQueue::new();
        for x in 0..32 {
            let sender = queue.sender();
            pool.submit(
                key(x),
                Box::new(move || {
                    sender.send(key(x), Ok(x * 2));
                }),
            )
            .unwrap();
        }

        let results = wait_for(&queue, 32);
        assert_eq!(results.len(), 32, "got {}/32 completions", results.len());
        for completion in results {
            let x = completion.key.coord().x;
            assert_eq!(completion.result, Ok(x * 2));
        }
    }

    #[test]
    fn test_panicking_job_does_not_kill_worker() {
        let pool = WorkerPool::new(1);
        let queue = CompletionQueue::new();

        pool.submit(key(0), Box::new(|| panic!("boom"))).unwrap();
        let sender = queue.sender();
        pool.submit(
            key(1),
            Box::new(move || {
                sender.send(key(1), Ok(()));
            }),
        )
        .unwrap();

        let results = wait_for(&queue, 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].key, key(1));
    }

    #[test]
    fn test_in_flight_drops_to_zero() {
        let pool = WorkerPool::new(2);
        for x in 0..8 {
            pool.submit(key(x), Box::new(|| std::thread::sleep(Duration::from_millis(2))))
                .unwrap();
        }
        let deadline = Instant::now() + Duration::from_secs(10);
        while pool.in_flight() > 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(pool.in_flight(), 0);
        assert!(!pool.is_pending(&key(3)));
    }

    #[test]
    fn test_submit_after_shutdown_is_rejected() {
        let mut pool = WorkerPool::new(1);
        pool.shutdown();
        assert_eq!(pool.worker_count(), 0);
        assert_eq!(
            pool.submit(key(0), Box::new(|| {})),
            Err(GenerationError::Disconnected { key: key(0) })
        );
    }

    #[test]
    fn test_shutdown_finishes_queued_jobs() {
        let mut pool = WorkerPool::new(1);
        let queue = CompletionQueue::new();
        for x in 0..4 {
            let sender = queue.sender();
            pool.submit(
                key(x),
                Box::new(move || {
                    sender.send(key(x), Ok(()));
                }),
            )
            .unwrap();
        }
        pool.shutdown();
        assert_eq!(queue.drain().len(), 4);
    }
}
