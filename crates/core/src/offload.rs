//! Bounded worker pool for blocking collaborator calls.
//!
//! Sessions run on the async event loop; collaborator calls are blocking HTTP
//! requests. The pool keeps the two apart: a fixed set of OS threads drains a
//! FIFO queue of boxed jobs, and each submission hands back a [`TaskHandle`]
//! the session awaits. Work starts as soon as a worker is free, whether or
//! not anyone is still waiting on the handle — a disconnecting session drops
//! its handle and the job simply finishes into the void.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use tokio::sync::oneshot;
use tracing::warn;

pub const DEFAULT_WORKERS: usize = 4;

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum OffloadError {
    /// The job was dropped before producing a result (it panicked, or the
    /// pool shut down before running it).
    #[error("offloaded task was lost before completing")]
    TaskLost,
}

/// Completion future for one submitted job.
pub struct TaskHandle<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> TaskHandle<T> {
    pub async fn join(self) -> Result<T, OffloadError> {
        self.rx.await.map_err(|_| OffloadError::TaskLost)
    }
}

pub struct WorkerPool {
    queue: Option<mpsc::Sender<Job>>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `workers` threads (clamped to at least one) sharing one FIFO
    /// queue. Submissions beyond the worker count queue up without bound.
    pub fn new(workers: usize) -> Self {
        let (tx, rx) = mpsc::channel::<Job>();
        let rx = Arc::new(Mutex::new(rx));
        let workers = (0..workers.max(1))
            .map(|i| {
                let rx = Arc::clone(&rx);
                thread::Builder::new()
                    .name(format!("sabaq-worker-{i}"))
                    .spawn(move || worker_loop(&rx))
                    .expect("failed to spawn worker thread")
            })
            .collect();
        Self {
            queue: Some(tx),
            workers,
        }
    }

    /// Enqueues `work` and returns a handle resolving to its output. The
    /// closure runs on a pool thread, so it may block freely.
    pub fn submit<F, T>(&self, work: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: Job = Box::new(move || {
            // The receiver may be gone; the work still ran to completion.
            let _ = tx.send(work());
        });
        if let Some(queue) = &self.queue {
            let _ = queue.send(job);
        }
        TaskHandle { rx }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the queue lets the workers drain what is left and exit.
        drop(self.queue.take());
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

fn worker_loop(rx: &Mutex<mpsc::Receiver<Job>>) {
    loop {
        let job = match rx.lock() {
            Ok(guard) => guard.recv(),
            Err(_) => break,
        };
        match job {
            Ok(job) => {
                if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                    warn!("offloaded task panicked; worker continues");
                }
            }
            Err(_) => break,
        }
    }
}
