//! Lifecycle tracing as an injected side-channel
//!
//! Every lifecycle transition of an [`OwningValue`] is reported as a
//! [`LifecycleEvent`] to a [`TraceSink`] handed in at construction time.
//! Keeping the sink outside the value keeps the lifecycle logic testable
//! independent of output formatting: the demo binary plugs in
//! [`ConsoleSink`], tests plug in [`MemorySink`] and assert on the
//! recorded stream.
//!
//! [`OwningValue`]: crate::OwningValue

use crate::InstanceId;
use ecow::eco_format;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub use ecow::EcoString as VitaStr;

pub type Shared<T> = Rc<RefCell<T>>;

pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// Shared handle to the trace sink observing a set of values
pub type Tracer = Rc<RefCell<dyn TraceSink>>;

/// The lifecycle transition an event reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum LifecycleOp {
    /// Fresh construction from an explicit or default value
    #[strum(serialize = "created by the constructor")]
    Construct,
    /// Deep copy of a live source
    #[strum(serialize = "created by the copy constructor")]
    CopyConstruct,
    /// Overwrite of an existing instance with a copy of the source
    #[strum(serialize = "updated by copy assignment")]
    CopyAssign,
    /// Fresh construction that takes over the source's storage
    #[strum(serialize = "created by the move constructor")]
    MoveConstruct,
    /// Overwrite of an existing instance that takes over the source's storage
    #[strum(serialize = "updated by move assignment")]
    MoveAssign,
    /// Destruction is starting; storage not yet released
    #[strum(serialize = "being destroyed")]
    DropBegin,
    /// Destruction finished; storage released
    #[strum(serialize = "destroyed")]
    DropEnd,
}

/// One observed lifecycle transition
///
/// Carries the identity of the affected instance and its state *after*
/// the transition. A `None` auxiliary means the instance no longer owns
/// its storage and renders as `absent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleEvent {
    pub id: InstanceId,
    pub op: LifecycleOp,
    pub value: i64,
    pub aux: Option<i64>,
}

impl LifecycleEvent {
    pub fn new(id: InstanceId, op: LifecycleOp, value: i64, aux: Option<i64>) -> Self {
        Self { id, op, value, aux }
    }

    /// Render the event as one diagnostic line
    pub fn message(&self) -> VitaStr {
        match self.aux {
            Some(aux) => eco_format!(
                "instance {} {}: value = {}, aux = {}",
                self.id, self.op, self.value, aux
            ),
            None => eco_format!(
                "instance {} {}: value = {}, aux = absent",
                self.id, self.op, self.value
            ),
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Observer invoked after each lifecycle transition
pub trait TraceSink {
    fn record(&mut self, event: LifecycleEvent);
}

/// Sink that prints each event to stdout, one line per transition
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl TraceSink for ConsoleSink {
    fn record(&mut self, event: LifecycleEvent) {
        println!("{}", event);
    }
}

/// Sink that accumulates events in order, for assertions
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Vec<LifecycleEvent>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events, oldest first
    pub fn events(&self) -> &[LifecycleEvent] {
        &self.events
    }

    /// Just the operations, in recording order
    pub fn ops(&self) -> Vec<LifecycleOp> {
        self.events.iter().map(|event| event.op).collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl TraceSink for MemorySink {
    fn record(&mut self, event: LifecycleEvent) {
        self.events.push(event);
    }
}

/// Tracer printing to stdout
pub fn console_tracer() -> Tracer {
    Rc::new(RefCell::new(ConsoleSink))
}
