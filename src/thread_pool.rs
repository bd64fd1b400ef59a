//! Shared thread pool for parallel resampling.
//!
//! All parallel runs share one pool with an increased stack size, so that
//! user statistics with deep recursion do not overflow worker stacks.

use rayon::ThreadPool;

use std::sync::OnceLock;

static THREAD_POOL: OnceLock<Option<ThreadPool>> = OnceLock::new();

/// Get or initialize the shared thread pool.
///
/// The thread pool is configured with:
/// - Stack size: 8 MB (vs rayon's default 2 MB)
/// - Thread count: Number of logical CPUs
///
/// Returns `None` if the pool could not be built; callers then fall back to
/// rayon's global pool.
pub fn get_thread_pool() -> Option<&'static ThreadPool> {
    THREAD_POOL
        .get_or_init(|| {
            rayon::ThreadPoolBuilder::new()
                .stack_size(8 * 1024 * 1024) // 8 MB stack per thread
                .thread_name(|i| format!("resampled-{}", i))
                .build()
                .map_err(|e| tracing::warn!(error = %e, "failed to build thread pool, using global pool"))
                .ok()
        })
        .as_ref()
}

/// Execute a parallel operation using the shared thread pool.
///
/// This ensures all parallel runs in the library use the same pool with
/// the same stack configuration.
pub fn install<OP, R>(op: OP) -> R
where
    OP: FnOnce() -> R + Send,
    R: Send,
{
    match get_thread_pool() {
        Some(pool) => pool.install(op),
        None => op(),
    }
}
