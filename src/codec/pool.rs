//! Fixed-size worker pool for codec execution.

use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

/// Runs codec work on a dedicated rayon pool, or on the global pool when no
/// thread count was configured.
pub struct WorkerPool {
    pool: Option<ThreadPool>,
}

impl WorkerPool {
    /// Build a pool with `threads` workers; `None` or `Some(0)` uses the global pool.
    pub fn new(threads: Option<usize>) -> Result<Self, ThreadPoolBuildError> {
        let pool = match threads {
            Some(count) if count > 0 => Some(
                ThreadPoolBuilder::new()
                    .num_threads(count)
                    .thread_name(|i| format!("aeroseg-worker-{}", i))
                    .build()?,
            ),
            _ => None,
        };
        Ok(Self { pool })
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Run `op` inside the pool; parallel iterators in `op` use its workers.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.threads())
            .field("dedicated", &self.pool.is_some())
            .finish()
    }
}
