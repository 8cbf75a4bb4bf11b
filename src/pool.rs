//! Bounded worker pool.
//!
//! A fixed set of worker threads consuming dispatch jobs from an mpsc
//! channel. Submission is fire-and-forget and the queue is unbounded: when
//! every worker is busy, `execute` still returns immediately and the job
//! waits its turn. Callers wanting backpressure must add it in front.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed-size pool of worker threads.
///
/// Dropping the pool closes the queue, lets queued jobs drain, and joins
/// every worker.
pub struct WorkerPool {
    workers: Vec<Worker>,
    sender: Option<Sender<Job>>,
}

impl WorkerPool {
    /// Spawns `size` workers.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero or a worker thread cannot be spawned.
    #[must_use]
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "worker pool requires at least one worker");

        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));
        let workers = (0..size)
            .map(|id| Worker::spawn(id, Arc::clone(&receiver)))
            .collect();

        Self {
            workers,
            sender: Some(sender),
        }
    }

    /// Submits a job without waiting for it to run.
    pub fn execute<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Some(sender) = &self.sender {
            if sender.send(Box::new(job)).is_err() {
                warn!("worker queue closed, dropping job");
            }
        }
    }

    /// Returns the number of workers.
    #[must_use]
    pub fn size(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the channel ends each worker's recv loop after the queue
        // drains.
        drop(self.sender.take());
        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                if thread.join().is_err() {
                    warn!(id = worker.id, "worker thread exited by panic");
                }
            }
        }
    }
}

struct Worker {
    id: usize,
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    fn spawn(id: usize, receiver: Arc<Mutex<Receiver<Job>>>) -> Self {
        let builder = thread::Builder::new().name(format!("worker-{id}"));
        let thread = builder
            .spawn(move || {
                debug!(id, "worker started");
                loop {
                    // The lock is held only while receiving; it is released
                    // before the job runs.
                    let job = match receiver.lock() {
                        Ok(guard) => guard.recv(),
                        Err(_) => break,
                    };
                    match job {
                        Ok(job) => {
                            // A panicking job must not take the worker with
                            // it; other connections keep being served.
                            if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                                warn!(id, "job panicked");
                            }
                        }
                        Err(_) => break,
                    }
                }
                debug!(id, "worker stopped");
            })
            .expect("failed to spawn worker thread");

        Self {
            id,
            thread: Some(thread),
        }
    }
}
