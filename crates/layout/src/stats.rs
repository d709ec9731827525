use std::time::Duration;

/// Counters collected over one call to `LayoutEngine::format_root`,
/// including every nested root (floats, inline-blocks, absolutes, cells)
/// formatted during it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PassStats {
    /// Independent roots formatted.
    pub roots: usize,
    /// Children passes run by roots, summed.
    pub root_attempts: usize,
    /// The largest number of children passes any single root needed.
    pub max_root_attempts: usize,
    /// Closes that reset their own context and asked for a local retry.
    pub local_reformats: usize,
    /// Closes that reset their parent.
    pub parent_reformats: usize,
    /// Times a children pass restarted from the first sibling.
    pub sibling_restarts: usize,
    pub nodes_acquired: usize,
    pub peak_live_nodes: usize,
    pub elapsed: Duration,
}

impl PassStats {
    /// True when every root committed on its first attempt without any
    /// reformat or restart.
    pub fn single_pass(&self) -> bool {
        self.root_attempts == self.roots
            && self.local_reformats == 0
            && self.parent_reformats == 0
            && self.sibling_restarts == 0
    }

    pub(crate) fn record_root_attempts(&mut self, attempts: usize) {
        self.roots += 1;
        self.root_attempts += attempts;
        self.max_root_attempts = self.max_root_attempts.max(attempts);
    }

    pub fn log_summary(&self, label: &str) {
        log::info!("=== Layout Summary ({}) ===", label);
        log::info!(
            "Roots: {} ({} attempts, max {} per root)",
            self.roots,
            self.root_attempts,
            self.max_root_attempts
        );
        log::info!(
            "Reformats: {} local, {} parent, {} sibling restarts",
            self.local_reformats,
            self.parent_reformats,
            self.sibling_restarts
        );
        log::info!(
            "Nodes: {} acquired, {} peak live, {:?} elapsed",
            self.nodes_acquired,
            self.peak_live_nodes,
            self.elapsed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_pass_requires_no_retries() {
        let mut stats = PassStats::default();
        stats.record_root_attempts(1);
        stats.record_root_attempts(1);
        assert!(stats.single_pass());
        stats.record_root_attempts(2);
        assert!(!stats.single_pass());
        assert_eq!(stats.max_root_attempts, 2);
        assert_eq!(stats.roots, 3);
    }
}
