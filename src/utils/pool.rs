//! Bounded worker pool for the embarrassingly parallel stages.
//!
//! Codec attempts and the keyed-transform string scan are pure functions of one input.
//! They run inside a dedicated rayon pool so the caller controls the number of threads;
//! results are always collected in input order, never in completion order.

use rayon::{ThreadPool, ThreadPoolBuilder};

fn build_pool(workers: usize) -> Option<ThreadPool> {
    match ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|index| format!("fasscope-worker-{index}"))
        .build()
    {
        Ok(pool) => Some(pool),
        Err(error) => {
            log::warn!("worker pool unavailable, running on the global pool: {error}");
            None
        }
    }
}

/// Run `op` inside a pool of `workers` threads (0 = one per core).
///
/// With `workers == 1` the operation runs on the calling thread's pool of one, so
/// `par_iter` inside `op` degenerates to sequential evaluation.
pub(crate) fn with_worker_pool<R, F>(workers: usize, op: F) -> R
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    match build_pool(workers) {
        Some(pool) => pool.install(op),
        None => op(),
    }
}
