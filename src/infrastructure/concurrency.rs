/// Concurrency management for TraceSift.
/// Configures the rayon pool used by the parallel trace passes.

use anyhow::Result;

/// Initialize the global rayon thread pool with controlled worker count.
/// Reserves ~50% of CPU capacity so a surrounding UI or report renderer
/// stays responsive while large traces are distilled.
pub fn init_thread_pool() -> Result<()> {
    let cores = num_cpus::get();
    let workers = std::cmp::max(1, cores / 2);

    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()?;

    println!(
        "[TraceSift] Initialized thread pool: {} workers (system has {} cores)",
        workers, cores
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_thread_pool_is_callable() {
        // The global pool may already be initialized by another test; both
        // outcomes are fine, we only check the call does not panic.
        let result = init_thread_pool();
        assert!(result.is_ok() || result.is_err());
    }
}
