//! Reactive Substrate Boundary
//!
//! Components never talk to a concrete reactive engine directly. They are
//! written against the [`ReactiveRegistrar`] trait, which captures the
//! contract an external substrate must honor:
//!
//! 1. **Cells** are addressed by [`CellRef`]: a component-scoped identifier
//!    plus an attribute name. Two cells are the same exactly when both
//!    parts match.
//!
//! 2. **Callbacks** declare their entire cell footprint up front in a
//!    [`CallbackSpec`]: outputs they write, inputs and triggers they react
//!    to, and states they read passively. Registering a callback makes all
//!    of its declared cells known, so wiring never depends on layout
//!    delivery order.
//!
//! 3. **Exclusive writers.** A cell has at most one writing callback,
//!    unless every writer of that cell shares the same group key. Grouped
//!    writers are expected to be mutually exclusive per cycle, which the
//!    components in this crate arrange by fanning an entry callback out to
//!    disjoint intermediate cells.
//!
//! 4. **The no-update sentinel.** A callback returns one [`Update`] per
//!    declared output; [`Update::NoUpdate`] leaves that cell and its
//!    downstream watchers completely untouched for the cycle.
//!
//! The crate ships one substrate of its own, [`LocalRuntime`], an
//! in-process engine used by the test suite and by embeddings that do not
//! bridge to an external renderer.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

mod graph;
mod local;

pub use graph::CallbackId;
pub use local::LocalRuntime;

// ----------------------------------------------------------------------------
// Cell Addressing
// ----------------------------------------------------------------------------

/// Address of one reactive cell: an element identifier plus the attribute
/// of that element the cell stores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CellRef {
    /// Identifier of the owning element, usually produced by
    /// [`scoped_id`](crate::ident::scoped_id).
    pub id: String,

    /// Attribute slot on the element, e.g. `data` or `children`.
    pub attribute: String,
}

impl CellRef {
    /// Build a cell address from its two parts.
    pub fn new(id: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attribute: attribute.into(),
        }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.id, self.attribute)
    }
}

// ----------------------------------------------------------------------------
// Callback Declarations
// ----------------------------------------------------------------------------

/// How a cell participates in one callback registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingRole {
    /// The callback writes this cell.
    Output,
    /// A change to this cell runs the callback; its value is passed in.
    Input,
    /// A change to this cell runs the callback; its value is passed in and
    /// is typically ignored.
    Trigger,
    /// The callback reads this cell's current value without reacting to
    /// changes of it.
    State,
}

/// A cell address paired with its role, ready to be folded into a
/// [`CallbackSpec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub cell: CellRef,
    pub role: BindingRole,
}

impl Binding {
    /// Bind `cell` as a written output.
    pub fn output(cell: CellRef) -> Self {
        Self {
            cell,
            role: BindingRole::Output,
        }
    }

    /// Bind `cell` as a reactive input.
    pub fn input(cell: CellRef) -> Self {
        Self {
            cell,
            role: BindingRole::Input,
        }
    }

    /// Bind `cell` as a reactive trigger.
    pub fn trigger(cell: CellRef) -> Self {
        Self {
            cell,
            role: BindingRole::Trigger,
        }
    }

    /// Bind `cell` as passively read state.
    pub fn state(cell: CellRef) -> Self {
        Self {
            cell,
            role: BindingRole::State,
        }
    }
}

/// Complete declared footprint of one callback.
///
/// Order matters: outputs pair positionally with the returned updates, and
/// inputs/triggers/states pair positionally with [`CallbackArgs`].
///
/// # Example
///
/// ```rust,ignore
/// let spec = CallbackSpec::new()
///     .with(Binding::output(label))
///     .with(signal.input())
///     .with(Binding::state(url))
///     .in_group("sidebar-store");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackSpec {
    pub outputs: Vec<CellRef>,
    pub inputs: Vec<CellRef>,
    pub triggers: Vec<CellRef>,
    pub states: Vec<CellRef>,

    /// Optional group key shared by callbacks allowed to write the same
    /// output cells.
    pub group: Option<String>,
}

impl CallbackSpec {
    /// Start an empty declaration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one binding into the declaration, appending to the list for
    /// its role.
    pub fn with(mut self, binding: Binding) -> Self {
        let Binding { cell, role } = binding;
        match role {
            BindingRole::Output => self.outputs.push(cell),
            BindingRole::Input => self.inputs.push(cell),
            BindingRole::Trigger => self.triggers.push(cell),
            BindingRole::State => self.states.push(cell),
        }
        self
    }

    /// Place this callback in a named writer group.
    pub fn in_group(mut self, key: impl Into<String>) -> Self {
        self.group = Some(key.into());
        self
    }

    /// All cells the callback reacts to: inputs first, then triggers.
    pub fn watched(&self) -> impl Iterator<Item = &CellRef> {
        self.inputs.iter().chain(self.triggers.iter())
    }

    /// All cells named anywhere in the declaration.
    pub fn declared(&self) -> impl Iterator<Item = &CellRef> {
        self.outputs
            .iter()
            .chain(self.inputs.iter())
            .chain(self.triggers.iter())
            .chain(self.states.iter())
    }
}

// ----------------------------------------------------------------------------
// Callback Invocation
// ----------------------------------------------------------------------------

/// Current cell values handed to a callback, in declared order.
#[derive(Debug, Clone, Default)]
pub struct CallbackArgs {
    pub triggers: Vec<Value>,
    pub inputs: Vec<Value>,
    pub states: Vec<Value>,
}

impl CallbackArgs {
    /// Value of the `index`-th declared input, or null when absent.
    pub fn input(&self, index: usize) -> &Value {
        self.inputs.get(index).unwrap_or(&Value::Null)
    }

    /// Value of the `index`-th declared trigger, or null when absent.
    pub fn trigger(&self, index: usize) -> &Value {
        self.triggers.get(index).unwrap_or(&Value::Null)
    }

    /// Value of the `index`-th declared state, or null when absent.
    pub fn state(&self, index: usize) -> &Value {
        self.states.get(index).unwrap_or(&Value::Null)
    }
}

/// One returned slot of a callback, paired positionally with a declared
/// output cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Commit this value to the output cell.
    Set(Value),
    /// Leave the output cell untouched this cycle. Downstream watchers of
    /// the cell do not run on its account.
    NoUpdate,
}

/// Boxed callback body: declared argument values in, one update per
/// declared output out.
pub type CallbackFn = Box<dyn Fn(&CallbackArgs) -> Result<Vec<Update>> + Send + Sync>;

// ----------------------------------------------------------------------------
// The Registrar Contract
// ----------------------------------------------------------------------------

/// The contract the component layer requires from a reactive substrate.
///
/// Implementations must make every cell named in a registered spec known
/// immediately, so callbacks can be wired against cells whose layout has
/// not been delivered yet.
pub trait ReactiveRegistrar {
    /// Register one callback with its full declared footprint.
    ///
    /// Fails with [`DuplicateOutputBinding`](crate::Error::DuplicateOutputBinding)
    /// when an output cell is already claimed outside the spec's group.
    fn register_callback(&mut self, spec: CallbackSpec, callback: CallbackFn) -> Result<()>;

    /// Declare `cell` with an initial value, as happens when a layout
    /// carrying the cell is delivered. Re-mounting resets the value.
    fn mount(&mut self, cell: &CellRef, initial: Value);

    /// Write `value` into `cell` and run the affected callbacks to
    /// quiescence.
    fn fire(&mut self, cell: &CellRef, value: Value) -> Result<()>;

    /// Write `value` into `cell` without running any callbacks.
    fn set_value(&mut self, cell: &CellRef, value: Value) -> Result<()>;

    /// Current value of `cell`, if the cell is known.
    fn value(&self, cell: &CellRef) -> Option<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_refs_compare_by_both_parts() {
        let a = CellRef::new("x-sig", "data");
        let b = CellRef::new("x-sig", "data");
        let c = CellRef::new("x-sig", "children");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn cell_ref_displays_as_dotted_pair() {
        let cell = CellRef::new("a1b2c3d-nav-url", "pathname");
        assert_eq!(cell.to_string(), "a1b2c3d-nav-url.pathname");
    }

    #[test]
    fn spec_folds_bindings_by_role() {
        let spec = CallbackSpec::new()
            .with(Binding::output(CellRef::new("a", "data")))
            .with(Binding::input(CellRef::new("b", "data")))
            .with(Binding::trigger(CellRef::new("c", "data")))
            .with(Binding::state(CellRef::new("d", "data")))
            .in_group("g");

        assert_eq!(spec.outputs.len(), 1);
        assert_eq!(spec.inputs.len(), 1);
        assert_eq!(spec.triggers.len(), 1);
        assert_eq!(spec.states.len(), 1);
        assert_eq!(spec.group.as_deref(), Some("g"));
        assert_eq!(spec.watched().count(), 2);
        assert_eq!(spec.declared().count(), 4);
    }

    #[test]
    fn args_accessors_fall_back_to_null() {
        let args = CallbackArgs {
            triggers: vec![],
            inputs: vec![Value::from(1)],
            states: vec![],
        };
        assert_eq!(args.input(0), &Value::from(1));
        assert_eq!(args.input(5), &Value::Null);
        assert_eq!(args.state(0), &Value::Null);
    }
}
