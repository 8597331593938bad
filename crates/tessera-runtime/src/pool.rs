use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, bounded};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::RuntimeError;
use crate::queue::WorkQueue;

/// Named workers draining one [`WorkQueue`]. Each worker reports on an exit
/// channel when its queue closes, so [`WorkerPool::join`] knows when all of
/// them are done.
pub struct WorkerPool {
    _pool: ThreadPool,
    exit_rx: Receiver<usize>,
    workers: usize,
    exited: usize,
}

impl WorkerPool {
    pub fn spawn<T, F>(workers: usize, queue: Arc<WorkQueue<T>>, handler: F) -> Result<Self, RuntimeError>
    where
        T: Send + 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        let workers = workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("tessera-worker-{i}"))
            .build()?;
        let (exit_tx, exit_rx) = bounded(workers);
        let handler = Arc::new(handler);
        for i in 0..workers {
            let queue = Arc::clone(&queue);
            let handler = Arc::clone(&handler);
            let exit_tx = exit_tx.clone();
            pool.spawn(move || {
                let mut handled = 0u64;
                while let Some(item) = queue.recv() {
                    handler(item);
                    handled += 1;
                }
                log::debug!("worker {i} exiting after {handled} tasks");
                let _ = exit_tx.send(i);
            });
        }
        log::info!("started {workers} workers");
        Ok(Self {
            _pool: pool,
            exit_rx,
            workers,
            exited: 0,
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Waits until every worker has exited. The queue must already be shut
    /// down. `idle` runs between polls, letting the caller drain whatever
    /// the workers may be blocked on.
    pub fn join(&mut self, mut idle: impl FnMut()) {
        while self.exited < self.workers {
            match self.exit_rx.recv_timeout(Duration::from_millis(5)) {
                Ok(_) => self.exited += 1,
                Err(RecvTimeoutError::Timeout) => idle(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }
}
