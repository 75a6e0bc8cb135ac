//! Exclusively-owned auxiliary storage
//!
//! An [`AuxSlot`] is the one piece of heap state an [`OwningValue`] owns:
//! a single boxed integer that exists while the instance is live and is
//! gone once the instance has been moved from. The slot tracks its own
//! state explicitly, so reading a moved-from instance is an ordinary
//! `None`, never a dangling access, and releasing twice is a no-op.
//!
//! [`OwningValue`]: crate::OwningValue

use std::fmt;

/// Whether a slot currently owns its storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SlotState {
    /// Storage is allocated and owned by this slot
    Held,
    /// Storage has been released or transferred away
    Released,
}

impl SlotState {
    /// Check if the slot still owns its storage
    pub fn is_held(&self) -> bool {
        matches!(self, Self::Held)
    }

    /// Check if the storage is gone
    pub fn is_released(&self) -> bool {
        matches!(self, Self::Released)
    }
}

/// Uniquely-owned optional allocation holding one auxiliary integer
///
/// The backing storage is a real `Box`, so [`transfer`] moves the
/// allocation itself to the new owner without reallocating, while
/// [`release`] drops it in place. Both leave the slot in the
/// [`SlotState::Released`] state, from which every read is `None`.
///
/// [`transfer`]: AuxSlot::transfer
/// [`release`]: AuxSlot::release
///
/// # Example
/// ```
/// use vita_val::AuxSlot;
///
/// let mut slot = AuxSlot::alloc(18);
/// assert_eq!(slot.get(), Some(18));
///
/// let moved = slot.transfer();
/// assert_eq!(slot.get(), None);
/// assert_eq!(moved.get(), Some(18));
/// ```
#[derive(Debug)]
pub struct AuxSlot {
    cell: Option<Box<i64>>,
}

impl AuxSlot {
    /// Allocate fresh storage holding `aux`
    pub fn alloc(aux: i64) -> Self {
        Self {
            cell: Some(Box::new(aux)),
        }
    }

    /// Create a slot that owns nothing
    pub fn absent() -> Self {
        Self { cell: None }
    }

    /// Read the stored auxiliary, or `None` once released
    pub fn get(&self) -> Option<i64> {
        self.cell.as_deref().copied()
    }

    /// Current ownership state
    pub fn state(&self) -> SlotState {
        if self.cell.is_some() {
            SlotState::Held
        } else {
            SlotState::Released
        }
    }

    /// Check if the slot still owns its storage
    pub fn is_held(&self) -> bool {
        self.state().is_held()
    }

    /// Drop the owned storage, if any
    ///
    /// Idempotent: releasing an already-released slot does nothing.
    /// Returns whether storage was actually released by this call.
    pub fn release(&mut self) -> bool {
        self.cell.take().is_some()
    }

    /// Move the allocation out, leaving this slot released
    ///
    /// The returned slot owns the very same allocation; nothing is
    /// reallocated or recomputed.
    pub fn transfer(&mut self) -> AuxSlot {
        Self {
            cell: self.cell.take(),
        }
    }
}

impl fmt::Display for AuxSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(aux) => write!(f, "{}", aux),
            None => write!(f, "absent"),
        }
    }
}
