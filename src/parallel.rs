//! Parallel execution policy
//!
//! Elementwise and reduction engines split work across the rayon pool only
//! when the operation touches enough bytes to amortize the fork/join cost.
//! The thresholds are a process-global, runtime-settable policy rather
//! than compile-time constants.

use parking_lot::RwLock;

/// When and how to parallelize bulk operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelPolicy {
    /// Minimum total bytes touched before any parallel split
    pub byte_threshold: usize,
    /// Target bytes of work per worker chunk
    pub bytes_per_thread: usize,
}

impl Default for ParallelPolicy {
    fn default() -> Self {
        Self {
            byte_threshold: 1 << 20,
            bytes_per_thread: 1 << 20,
        }
    }
}

impl ParallelPolicy {
    /// Whether an operation touching `total_bytes` should run in parallel
    pub fn should_parallelize(&self, total_bytes: usize) -> bool {
        total_bytes > self.byte_threshold
    }

    /// Number of chunks to split `total_bytes` of work into
    ///
    /// At least 1; capped by the rayon pool size.
    pub fn chunk_count(&self, total_bytes: usize) -> usize {
        if !self.should_parallelize(total_bytes) {
            return 1;
        }
        let by_work = total_bytes / self.bytes_per_thread.max(1);
        by_work.clamp(1, rayon::current_num_threads())
    }
}

static POLICY: RwLock<ParallelPolicy> = RwLock::new(ParallelPolicy {
    byte_threshold: 1 << 20,
    bytes_per_thread: 1 << 20,
});

/// Read the current global policy
pub fn parallel_policy() -> ParallelPolicy {
    *POLICY.read()
}

/// Replace the global policy
///
/// Takes effect for operations started after the call.
pub fn set_parallel_policy(policy: ParallelPolicy) {
    *POLICY.write() = policy;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let p = ParallelPolicy::default();
        assert_eq!(p.byte_threshold, 1 << 20);
        assert!(!p.should_parallelize(1 << 20));
        assert!(p.should_parallelize((1 << 20) + 1));
    }

    #[test]
    fn test_chunk_count_serial_below_threshold() {
        let p = ParallelPolicy::default();
        assert_eq!(p.chunk_count(1024), 1);
    }

    #[test]
    fn test_chunk_count_caps_at_pool_size() {
        let p = ParallelPolicy {
            byte_threshold: 0,
            bytes_per_thread: 1,
        };
        assert!(p.chunk_count(usize::MAX) <= rayon::current_num_threads());
    }

    #[test]
    fn test_global_policy_roundtrip() {
        let orig = parallel_policy();
        set_parallel_policy(ParallelPolicy {
            byte_threshold: 123,
            bytes_per_thread: 456,
        });
        assert_eq!(parallel_policy().byte_threshold, 123);
        set_parallel_policy(orig);
    }
}
