//! Bounded worker pool for blocking probes.
//!
//! A [`ProbeExecutor`] is constructed and owned by whoever issues commands;
//! there is no process-global pool. Its only contract is bounding how many
//! probes run at once. It keeps no domain state.
//!
//! Shutdown drains: queued jobs still run before the workers exit.

use std::panic::AssertUnwindSafe;
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::error::{ProbeError, Result};

/// Worker count used when the caller has no preference.
pub const DEFAULT_MAX_WORKERS: usize = 4;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed-size thread pool running probe jobs.
pub struct ProbeExecutor {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    max_workers: usize,
}

/// Receipt for a submitted job.
pub struct JobHandle<T> {
    rx: Receiver<Option<T>>,
}

impl<T> JobHandle<T> {
    /// Block until the job finishes and return its value.
    ///
    /// A job that panicked, or never ran because its executor went away,
    /// surfaces as [`ProbeError::Io`].
    pub fn wait(self) -> Result<T> {
        match self.rx.recv() {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(ProbeError::io(
                "probe job",
                std::io::Error::other("probe job panicked"),
            )),
            Err(_) => Err(ProbeError::io(
                "probe job",
                std::io::Error::other("executor shut down before the job ran"),
            )),
        }
    }
}

impl ProbeExecutor {
    /// Start `max_workers` worker threads (at least one).
    pub fn new(max_workers: usize) -> Result<Self> {
        let max_workers = max_workers.max(1);
        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));

        let mut workers = Vec::with_capacity(max_workers);
        for i in 0..max_workers {
            let receiver = Arc::clone(&receiver);
            let handle = std::thread::Builder::new()
                .name(format!("diskpulse-probe-{i}"))
                .spawn(move || worker_loop(&receiver))
                .map_err(|e| ProbeError::io("spawning probe worker", e))?;
            workers.push(handle);
        }

        Ok(Self {
            sender: Some(sender),
            workers,
            max_workers,
        })
    }

    /// Upper bound on concurrently running jobs.
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Queue `job` and return a handle to its result.
    pub fn submit<T, F>(&self, job: F) -> JobHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx): (SyncSender<Option<T>>, _) = mpsc::sync_channel(1);
        let wrapped: Job = Box::new(move || {
            let outcome = std::panic::catch_unwind(AssertUnwindSafe(job)).ok();
            let _ = tx.send(outcome);
        });
        if let Some(sender) = &self.sender {
            // A failed send drops `wrapped` and with it `tx`, so `wait` reports it.
            let _ = sender.send(wrapped);
        }
        JobHandle { rx }
    }

    /// Stop accepting work, run everything already queued, and join the workers.
    pub fn shutdown(mut self) {
        self.drain();
    }

    fn drain(&mut self) {
        // Closing the channel lets each worker exit once the queue is empty.
        drop(self.sender.take());
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        log::debug!("probe executor drained ({} workers)", self.max_workers);
    }
}

impl Drop for ProbeExecutor {
    fn drop(&mut self) {
        if self.sender.is_some() {
            self.drain();
        }
    }
}

fn worker_loop(receiver: &Mutex<Receiver<Job>>) {
    loop {
        let job = {
            let guard = match receiver.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.recv()
        };
        match job {
            Ok(job) => job(),
            Err(_) => break,
        }
    }
}
