//! Resource-owning value with explicit lifecycle semantics
//!
//! [`OwningValue`] pairs a plain integer with an exclusively-owned
//! auxiliary integer kept in an [`AuxSlot`]. The auxiliary is always
//! `value + AUX_STEP` right after construction or copy, lives in its own
//! allocation, and belongs to exactly one live instance at a time:
//!
//! - copying (construct or assign) recomputes the auxiliary from the
//!   source's `value` into a fresh allocation,
//! - moving (construct or assign) transfers the allocation itself and
//!   resets the source to the moved-from state (`value = 0`, slot
//!   released),
//! - destruction releases whatever the instance still owns, exactly once.
//!
//! Every transition is reported to the instance's [`Tracer`].

use crate::{
    AuxSlot, InstanceId, LifecycleEvent, LifecycleOp, Shared, SlotState, Tracer, VitaError,
    VitaResult,
};
use std::fmt;
use std::rc::Rc;

/// Offset between a value and its auxiliary
pub const AUX_STEP: i64 = 3;

/// Value an instance is reset to when moved from
pub const DEFAULT_VALUE: i64 = 0;

/// Integer value owning one auxiliary allocation
///
/// # Example
/// ```
/// use vita_val::{console_tracer, OwningValue, AUX_STEP};
///
/// let tracer = console_tracer();
/// let a = OwningValue::new(15, tracer.clone());
/// assert_eq!(a.value(), 15);
/// assert_eq!(a.auxiliary(), Some(15 + AUX_STEP));
///
/// let mut source = OwningValue::new(15, tracer);
/// let b = OwningValue::adopt(&mut source);
/// assert_eq!(b.auxiliary(), Some(18));
/// assert!(source.is_moved());
/// ```
pub struct OwningValue {
    id: InstanceId,
    value: i64,
    aux: AuxSlot,
    tracer: Tracer,
}

impl OwningValue {
    /// Construct from an explicit value
    ///
    /// Allocates a fresh auxiliary equal to `value + AUX_STEP` and
    /// reports a [`LifecycleOp::Construct`] transition.
    pub fn new(value: i64, tracer: Tracer) -> Self {
        let val = Self {
            id: InstanceId::fresh(),
            value,
            aux: AuxSlot::alloc(value + AUX_STEP),
            tracer,
        };
        val.emit(LifecycleOp::Construct);
        val
    }

    /// Construct with the default value
    pub fn with_default(tracer: Tracer) -> Self {
        Self::new(DEFAULT_VALUE, tracer)
    }

    /// Identity token, stable for this instance's lifetime
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Primary value
    pub fn value(&self) -> i64 {
        self.value
    }

    /// Owned auxiliary, or `None` once moved from
    pub fn auxiliary(&self) -> Option<i64> {
        self.aux.get()
    }

    /// Ownership state of the auxiliary storage
    pub fn state(&self) -> SlotState {
        self.aux.state()
    }

    /// Check if this instance has been moved from
    pub fn is_moved(&self) -> bool {
        self.aux.state().is_released()
    }

    /// Owned auxiliary, or [`VitaError::UseAfterMove`] once moved from
    pub fn try_auxiliary(&self) -> VitaResult<i64> {
        self.aux
            .get()
            .ok_or(VitaError::UseAfterMove { id: self.id })
    }

    /// Release the auxiliary early, returning the released content
    ///
    /// The instance stays valid with an absent auxiliary, exactly like a
    /// moved-from instance. Releasing twice is
    /// [`VitaError::DoubleRelease`]; destruction afterwards is still fine
    /// since release is idempotent there.
    pub fn try_release_auxiliary(&mut self) -> VitaResult<i64> {
        match self.aux.get() {
            Some(aux) => {
                self.aux.release();
                Ok(aux)
            }
            None => Err(VitaError::DoubleRelease { id: self.id }),
        }
    }

    /// Copy-construct a new instance from this one
    ///
    /// The copy gets a fresh identity and a fresh allocation whose
    /// content is recomputed from this instance's `value` — the stored
    /// auxiliary is never duplicated directly. This instance is not
    /// touched.
    pub fn duplicate(&self) -> Self {
        let copy = Self {
            id: InstanceId::fresh(),
            value: self.value,
            aux: AuxSlot::alloc(self.value + AUX_STEP),
            tracer: self.tracer.clone(),
        };
        copy.emit(LifecycleOp::CopyConstruct);
        copy
    }

    /// Copy-assign from `source` onto this instance
    ///
    /// Releases the currently-owned auxiliary, copies the value, and
    /// allocates a recomputed auxiliary. Use [`copy_assign`] when the two
    /// sides may alias.
    pub fn assign_from(&mut self, source: &OwningValue) -> &mut Self {
        self.aux.release();
        self.value = source.value;
        self.aux = AuxSlot::alloc(source.value + AUX_STEP);
        self.emit(LifecycleOp::CopyAssign);
        self
    }

    /// Move-construct a new instance out of `source`
    ///
    /// The new instance takes the source's value and its auxiliary
    /// allocation as-is. The source is reset to the moved-from state:
    /// `value = 0`, auxiliary absent. Its only remaining legal uses are
    /// observation, reassignment, and destruction.
    pub fn adopt(source: &mut OwningValue) -> Self {
        let moved = Self {
            id: InstanceId::fresh(),
            value: source.value,
            aux: source.aux.transfer(),
            tracer: source.tracer.clone(),
        };
        source.value = DEFAULT_VALUE;
        moved.emit(LifecycleOp::MoveConstruct);
        moved
    }

    /// Move-assign from `source` onto this instance
    ///
    /// Releases the currently-owned auxiliary, then takes the source's
    /// value and allocation, resetting the source to the moved-from
    /// state. Use [`move_assign`] when the two sides may alias.
    pub fn move_from(&mut self, source: &mut OwningValue) -> &mut Self {
        self.aux.release();
        self.value = source.value;
        self.aux = source.aux.transfer();
        source.value = DEFAULT_VALUE;
        self.emit(LifecycleOp::MoveAssign);
        self
    }

    fn emit(&self, op: LifecycleOp) {
        let event = LifecycleEvent::new(self.id, op, self.value, self.aux.get());
        self.tracer.borrow_mut().record(event);
    }
}

/// `Clone` is copy construction
impl Clone for OwningValue {
    fn clone(&self) -> Self {
        self.duplicate()
    }
}

impl Drop for OwningValue {
    fn drop(&mut self) {
        self.emit(LifecycleOp::DropBegin);
        // No-op for a moved-from instance: the transferred allocation
        // belongs to its new owner.
        self.aux.release();
        self.emit(LifecycleOp::DropEnd);
    }
}

impl fmt::Debug for OwningValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwningValue")
            .field("id", &self.id)
            .field("value", &self.value)
            .field("aux", &self.aux)
            .finish()
    }
}

/// Copy-assign between possibly-aliasing handles
///
/// Assigning a handle onto itself must not release storage that is about
/// to serve as the source, so identity is checked first. A self-assign
/// still reports its [`LifecycleOp::CopyAssign`] transition; it just
/// changes nothing.
pub fn copy_assign(dst: &Shared<OwningValue>, src: &Shared<OwningValue>) {
    if Rc::ptr_eq(dst, src) {
        dst.borrow().emit(LifecycleOp::CopyAssign);
        return;
    }
    let source = src.borrow();
    dst.borrow_mut().assign_from(&source);
}

/// Move-assign between possibly-aliasing handles
///
/// Identity check as in [`copy_assign`]: a self-move reports its
/// transition and leaves the instance untouched.
pub fn move_assign(dst: &Shared<OwningValue>, src: &Shared<OwningValue>) {
    if Rc::ptr_eq(dst, src) {
        dst.borrow().emit(LifecycleOp::MoveAssign);
        return;
    }
    let mut source = src.borrow_mut();
    dst.borrow_mut().move_from(&mut source);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{shared, MemorySink};

    fn memory_tracer() -> (Shared<MemorySink>, Tracer) {
        let sink = shared(MemorySink::new());
        let tracer: Tracer = sink.clone();
        (sink, tracer)
    }

    #[test]
    fn test_construct_allocates_aux() {
        let (_, tracer) = memory_tracer();
        for v in [-4, 0, 7, 15, 1000] {
            let val = OwningValue::new(v, tracer.clone());
            assert_eq!(val.value(), v);
            assert_eq!(val.auxiliary(), Some(v + AUX_STEP));
            assert!(val.state().is_held());
        }
    }

    #[test]
    fn test_with_default() {
        let (_, tracer) = memory_tracer();
        let val = OwningValue::with_default(tracer);
        assert_eq!(val.value(), DEFAULT_VALUE);
        assert_eq!(val.auxiliary(), Some(AUX_STEP));
    }

    #[test]
    fn test_copy_construct_recomputes_and_leaves_source() {
        let (_, tracer) = memory_tracer();
        let a = OwningValue::new(15, tracer);
        let b = a.duplicate();

        assert_eq!(b.value(), 15);
        assert_eq!(b.auxiliary(), Some(18));
        assert_ne!(b.id(), a.id());

        // source untouched
        assert_eq!(a.value(), 15);
        assert_eq!(a.auxiliary(), Some(18));
        assert!(a.state().is_held());
    }

    #[test]
    fn test_clone_is_copy_construction() {
        let (sink, tracer) = memory_tracer();
        let a = OwningValue::new(15, tracer);
        let b = a.clone();

        assert_eq!(b.value(), 15);
        assert_eq!(b.auxiliary(), Some(18));
        assert_eq!(
            sink.borrow().ops(),
            vec![LifecycleOp::Construct, LifecycleOp::CopyConstruct]
        );
    }

    #[test]
    fn test_copy_assign_releases_then_recomputes() {
        let (_, tracer) = memory_tracer();
        let a = OwningValue::new(15, tracer.clone());
        let mut c = OwningValue::with_default(tracer);
        assert_eq!(c.auxiliary(), Some(3));

        c.assign_from(&a);
        assert_eq!(c.value(), 15);
        assert_eq!(c.auxiliary(), Some(18));

        // source untouched
        assert_eq!(a.value(), 15);
        assert_eq!(a.auxiliary(), Some(18));
    }

    #[test]
    fn test_self_copy_assign_changes_nothing() {
        let (sink, tracer) = memory_tracer();
        let x = shared(OwningValue::new(15, tracer));

        copy_assign(&x, &x);

        assert_eq!(x.borrow().value(), 15);
        assert_eq!(x.borrow().auxiliary(), Some(18));
        assert!(x.borrow().state().is_held());
        // the transition is still reported
        assert_eq!(
            sink.borrow().ops(),
            vec![LifecycleOp::Construct, LifecycleOp::CopyAssign]
        );
    }

    #[test]
    fn test_move_construct_transfers_and_resets_source() {
        let (_, tracer) = memory_tracer();
        let mut a = OwningValue::new(15, tracer);
        let a_id = a.id();

        let d = OwningValue::adopt(&mut a);

        assert_eq!(d.value(), 15);
        assert_eq!(d.auxiliary(), Some(18));
        assert_ne!(d.id(), a_id);

        assert_eq!(a.id(), a_id);
        assert_eq!(a.value(), DEFAULT_VALUE);
        assert_eq!(a.auxiliary(), None);
        assert!(a.is_moved());
    }

    #[test]
    fn test_move_assign_transfers_and_resets_source() {
        let (_, tracer) = memory_tracer();
        let mut b = OwningValue::new(15, tracer.clone());
        let mut e = OwningValue::with_default(tracer);

        e.move_from(&mut b);

        assert_eq!(e.value(), 15);
        assert_eq!(e.auxiliary(), Some(18));
        assert_eq!(b.value(), DEFAULT_VALUE);
        assert!(b.is_moved());
    }

    #[test]
    fn test_self_move_assign_changes_nothing() {
        let (sink, tracer) = memory_tracer();
        let x = shared(OwningValue::new(15, tracer));

        move_assign(&x, &x);

        assert_eq!(x.borrow().value(), 15);
        assert_eq!(x.borrow().auxiliary(), Some(18));
        assert!(x.borrow().state().is_held());
        assert_eq!(
            sink.borrow().ops(),
            vec![LifecycleOp::Construct, LifecycleOp::MoveAssign]
        );
    }

    #[test]
    fn test_drop_of_moved_from_releases_nothing() {
        let (sink, tracer) = memory_tracer();
        let mut a = OwningValue::new(15, tracer);
        let d = OwningValue::adopt(&mut a);
        let a_id = a.id();

        drop(a);

        // the transferred allocation still belongs to d
        assert_eq!(d.auxiliary(), Some(18));

        let events = sink.borrow().events().to_vec();
        let drop_begin = events
            .iter()
            .find(|event| event.op == LifecycleOp::DropBegin)
            .unwrap();
        assert_eq!(drop_begin.id, a_id);
        assert_eq!(drop_begin.value, DEFAULT_VALUE);
        assert_eq!(drop_begin.aux, None);
    }

    #[test]
    fn test_drop_emits_begin_and_end() {
        let (sink, tracer) = memory_tracer();
        {
            let _val = OwningValue::new(15, tracer);
        }
        assert_eq!(
            sink.borrow().ops(),
            vec![
                LifecycleOp::Construct,
                LifecycleOp::DropBegin,
                LifecycleOp::DropEnd
            ]
        );
        let events = sink.borrow().events().to_vec();
        assert_eq!(events[1].aux, Some(18));
        assert_eq!(events[2].aux, None);
    }

    #[test]
    fn test_try_auxiliary() {
        let (_, tracer) = memory_tracer();
        let mut a = OwningValue::new(15, tracer);
        assert_eq!(a.try_auxiliary(), Ok(18));

        let _d = OwningValue::adopt(&mut a);
        assert_eq!(
            a.try_auxiliary(),
            Err(VitaError::UseAfterMove { id: a.id() })
        );
    }

    #[test]
    fn test_try_release_auxiliary() {
        let (_, tracer) = memory_tracer();
        let mut val = OwningValue::with_default(tracer);

        assert_eq!(val.try_release_auxiliary(), Ok(3));
        assert_eq!(
            val.try_release_auxiliary(),
            Err(VitaError::DoubleRelease { id: val.id() })
        );
        // destruction after early release stays safe (idempotent release)
    }

    #[test]
    fn test_assignment_event_carries_post_state() {
        let (sink, tracer) = memory_tracer();
        let a = shared(OwningValue::new(15, tracer.clone()));
        let c = shared(OwningValue::with_default(tracer));

        copy_assign(&c, &a);

        let events = sink.borrow().events().to_vec();
        let assign = events
            .iter()
            .find(|event| event.op == LifecycleOp::CopyAssign)
            .unwrap();
        assert_eq!(assign.id, c.borrow().id());
        assert_eq!(assign.value, 15);
        assert_eq!(assign.aux, Some(18));
    }
}
