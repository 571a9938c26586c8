//! Signal Component
//!
//! A [`Signal`] wraps exactly one reactive cell and gives it a place in
//! the component tree. Components communicate by binding signals into
//! their callbacks: a producer declares a signal as an output, consumers
//! declare the same signal as an input or trigger, and the substrate
//! carries values across without either side knowing the other.
//!
//! By default the cell lives on an invisible anchor under the `data`
//! attribute. A signal built with [`Signal::with_attribute`] and
//! `children` instead renders a visible container and carries layout
//! content, which is how a page region can be treated as a signal.

use serde_json::{Map, Value};

use crate::error::Result;
use crate::ident::scoped_id;
use crate::layout::{LayoutArgs, LayoutNode};
use crate::runtime::{Binding, CellRef};
use crate::tree::{Component, ComponentCore};

/// A named reactive cell, usable as a component.
///
/// # Example
///
/// ```rust,ignore
/// let selection = Arc::new(Signal::new("selection"));
///
/// // Producer side:
/// let spec = CallbackSpec::new()
///     .with(selection.output())
///     .with(Binding::input(button_cell));
///
/// // Consumer side:
/// let spec = CallbackSpec::new()
///     .with(Binding::output(label_cell))
///     .with(selection.input());
/// ```
pub struct Signal {
    core: ComponentCore,
    attribute: String,
}

impl Signal {
    /// A signal carrying its value on the `data` attribute of an
    /// invisible anchor.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_attribute(name, "data")
    }

    /// A signal carrying its value on a chosen attribute. `children`
    /// renders a visible container instead of an anchor.
    pub fn with_attribute(name: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            core: ComponentCore::new(name),
            attribute: attribute.into(),
        }
    }

    /// The cell this signal wraps.
    pub fn cell(&self) -> CellRef {
        CellRef::new(scoped_id(&self.core, "signal"), self.attribute.clone())
    }

    /// Group key scoped to this signal, for callbacks that must share
    /// write access to a cell.
    pub fn group_key(&self) -> String {
        scoped_id(&self.core, "group")
    }

    /// The value a signal's cell starts with: an empty object.
    pub fn default_value() -> Value {
        Value::Object(Map::new())
    }

    /// Bind this signal as a reactive input.
    pub fn input(&self) -> Binding {
        Binding::input(self.cell())
    }

    /// Bind this signal as a written output.
    pub fn output(&self) -> Binding {
        Binding::output(self.cell())
    }

    /// Bind this signal as a reactive trigger.
    pub fn trigger(&self) -> Binding {
        Binding::trigger(self.cell())
    }

    /// Bind this signal as passively read state.
    pub fn state(&self) -> Binding {
        Binding::state(self.cell())
    }
}

impl Component for Signal {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn layout(&self, _args: &LayoutArgs) -> Result<LayoutNode> {
        let cell = self.cell();
        if self.attribute == "children" {
            Ok(LayoutNode::element(cell.id))
        } else {
            Ok(LayoutNode::CellAnchor {
                cell,
                initial: Self::default_value(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cell_is_scoped_to_the_signal_field() {
        let signal = Signal::new("selection");
        let cell = signal.cell();
        assert_eq!(cell.id, format!("{}-signal", signal.core().id()));
        assert_eq!(cell.attribute, "data");
    }

    #[test]
    fn group_key_differs_from_the_cell_id() {
        let signal = Signal::new("selection");
        assert_ne!(signal.group_key(), signal.cell().id);
        assert!(signal.group_key().ends_with("-group"));
    }

    #[test]
    fn bindings_wrap_the_same_cell() {
        let signal = Signal::new("selection");
        assert_eq!(signal.input().cell, signal.cell());
        assert_eq!(signal.output().cell, signal.cell());
        assert_eq!(signal.trigger().cell, signal.cell());
        assert_eq!(signal.state().cell, signal.cell());
    }

    #[test]
    fn data_signal_renders_an_anchor_with_empty_object() {
        let signal = Signal::new("selection");
        let layout = signal.layout(&LayoutArgs::Plain).unwrap();
        assert_eq!(
            layout,
            LayoutNode::CellAnchor {
                cell: signal.cell(),
                initial: json!({}),
            }
        );
    }

    #[test]
    fn children_signal_renders_a_visible_element() {
        let signal = Signal::with_attribute("panel", "children");
        let layout = signal.layout(&LayoutArgs::Plain).unwrap();
        assert_eq!(layout, LayoutNode::element(signal.cell().id));
        assert_eq!(signal.cell().attribute, "children");
    }

    #[test]
    fn two_signals_never_share_a_cell() {
        let a = Signal::new("same");
        let b = Signal::new("same");
        assert_ne!(a.cell(), b.cell());
    }
}
