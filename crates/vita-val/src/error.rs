//! Error types for lifecycle operations
//!
//! The lifecycle contract makes both failure classes unreachable through
//! the operations themselves: release is idempotent and the moved-from
//! state is explicit. The errors exist on the checked accessor surface
//! (`try_auxiliary`, `try_release_auxiliary`), where a caller asks for a
//! guarantee the instance can no longer give.

use crate::InstanceId;
use thiserror::Error;

/// Error type for checked lifecycle accessors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VitaError {
    /// Reading the auxiliary of an instance that has been moved from
    #[error("use after move: instance {id} no longer owns its auxiliary storage")]
    UseAfterMove {
        /// The moved-from instance
        id: InstanceId,
    },

    /// Releasing storage that is already gone
    #[error("double release: auxiliary storage of instance {id} was already released")]
    DoubleRelease {
        /// The instance whose storage is already released
        id: InstanceId,
    },
}

/// Result alias for fallible lifecycle accessors
pub type VitaResult<T> = Result<T, VitaError>;
