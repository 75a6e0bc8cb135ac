use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter backing [`InstanceId::fresh`]. Starts at 1 so `#0` never appears.
static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity token for one value instance
///
/// Every construction path mints a fresh id, and the id stays with the
/// instance for its whole lifetime. Moving state out of an instance does
/// not move its id: the destination gets a new token and the source keeps
/// its own, so trace output can tell the two apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Mint a new, process-unique id
    pub fn fresh() -> Self {
        InstanceId(NEXT_INSTANCE_ID.fetch_add(1, Ordering::SeqCst))
    }

    /// Get the underlying number
    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
