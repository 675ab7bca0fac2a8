//! Plain data types shared across the crate.

/// Native layer allocation counters.
///
/// Both counters only grow, so a difference between two snapshots is a lower
/// bound on the activity in between even when other threads allocate too.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NativeStats {
    /// Native objects allocated since process start.
    pub allocations: u64,
    /// Native objects destroyed since process start.
    pub deallocations: u64,
}

impl NativeStats {
    /// Objects currently alive in the native layer.
    pub fn live(&self) -> u64 {
        self.allocations.saturating_sub(self.deallocations)
    }
}
