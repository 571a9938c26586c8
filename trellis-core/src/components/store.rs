//! Store Component
//!
//! A [`Store`] is a composite reactive cell edited through three
//! operations:
//!
//! - **store** replaces the whole value,
//! - **merge** folds an object into the current value, incoming keys
//!   winning,
//! - **clean** resets the value to an empty object.
//!
//! Producers do not write the store cell directly. They send an
//! `{op, data}` event to the store's input signal; an entry callback
//! parses the event and forwards the payload to exactly one of three
//! internal signals, leaving the other two on the no-update sentinel.
//! Each internal signal drives its own writer callback, and the three
//! writers share a group key so the substrate accepts them as writers of
//! the same cell. Mutual exclusion per cycle is guaranteed by the entry
//! fan-out.
//!
//! Consumers bind the store cell itself as input or state and never see
//! the internal plumbing.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::ident::scoped_id;
use crate::layout::{LayoutArgs, LayoutNode};
use crate::runtime::{Binding, CallbackSpec, CellRef, ReactiveRegistrar, Update};
use crate::tree::{Component, ComponentCore, ComponentHandle};

use super::signal::Signal;

/// Operations accepted by a store's input signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    /// Replace the whole value with the event's data.
    Store,
    /// Fold the event's object data into the current value.
    Merge,
    /// Reset the value to an empty object.
    Clean,
}

impl StoreOp {
    /// Wire name of the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreOp::Store => "store",
            StoreOp::Merge => "merge",
            StoreOp::Clean => "clean",
        }
    }

    fn parse(op: &str) -> Option<Self> {
        match op {
            "store" => Some(StoreOp::Store),
            "merge" => Some(StoreOp::Merge),
            "clean" => Some(StoreOp::Clean),
            _ => None,
        }
    }
}

/// Composite reactive cell with store/merge/clean semantics.
///
/// # Example
///
/// ```rust,ignore
/// let store = Arc::new(Store::new("settings"));
///
/// // Somewhere after the tree is built:
/// store.send(&mut runtime, StoreOp::Merge, json!({"theme": "dark"}))?;
/// assert_eq!(runtime.value(&store.cell()), Some(json!({"theme": "dark"})));
/// ```
pub struct Store {
    core: ComponentCore,
    input_signal: Arc<Signal>,
    store_signal: Arc<Signal>,
    merge_signal: Arc<Signal>,
    clean_signal: Arc<Signal>,
}

impl Store {
    /// Create a store with empty-object contents.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            core: ComponentCore::new(name),
            input_signal: Arc::new(Signal::new("input_signal")),
            store_signal: Arc::new(Signal::new("store_signal")),
            merge_signal: Arc::new(Signal::new("merge_signal")),
            clean_signal: Arc::new(Signal::new("clean_signal")),
        }
    }

    /// The composite cell consumers read.
    pub fn cell(&self) -> CellRef {
        CellRef::new(scoped_id(&self.core, "store"), "data")
    }

    /// The signal producers send `{op, data}` events to.
    pub fn input_signal(&self) -> &Arc<Signal> {
        &self.input_signal
    }

    /// Group key shared by the three writer callbacks.
    fn group_key(&self) -> String {
        scoped_id(&self.core, "group")
    }

    /// Bind the store cell as a reactive input.
    pub fn input(&self) -> Binding {
        Binding::input(self.cell())
    }

    /// Bind the store cell as passively read state.
    pub fn state(&self) -> Binding {
        Binding::state(self.cell())
    }

    /// Build the `{op, data}` event for one operation.
    pub fn request(op: StoreOp, data: Value) -> Value {
        json!({ "op": op.as_str(), "data": data })
    }

    /// Fire one operation at the store through `registrar`.
    pub fn send(
        &self,
        registrar: &mut dyn ReactiveRegistrar,
        op: StoreOp,
        data: Value,
    ) -> Result<()> {
        registrar.fire(&self.input_signal.cell(), Self::request(op, data))
    }
}

impl Component for Store {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn child_nodes(&self) -> Vec<ComponentHandle> {
        let children: Vec<ComponentHandle> = vec![
            self.clean_signal.clone(),
            self.store_signal.clone(),
            self.merge_signal.clone(),
            self.input_signal.clone(),
        ];
        children
    }

    fn layout(&self, args: &LayoutArgs) -> Result<LayoutNode> {
        Ok(LayoutNode::fragment(vec![
            self.clean_signal.layout(args)?,
            self.store_signal.layout(args)?,
            self.merge_signal.layout(args)?,
            self.input_signal.layout(args)?,
            LayoutNode::CellAnchor {
                cell: self.cell(),
                initial: Signal::default_value(),
            },
        ]))
    }

    fn register_callbacks(&self, registrar: &mut dyn ReactiveRegistrar) -> Result<()> {
        // Entry: parse the event and forward its payload to exactly one
        // internal signal.
        let spec = CallbackSpec::new()
            .with(self.store_signal.output())
            .with(self.merge_signal.output())
            .with(self.clean_signal.output())
            .with(self.input_signal.input());
        registrar.register_callback(
            spec,
            Box::new(|args| {
                let (op, data) = parse_store_event(args.input(0))?;
                debug!(op = op.as_str(), "routing store event");
                Ok(match op {
                    StoreOp::Store => {
                        vec![Update::Set(data), Update::NoUpdate, Update::NoUpdate]
                    }
                    StoreOp::Merge => {
                        vec![Update::NoUpdate, Update::Set(data), Update::NoUpdate]
                    }
                    StoreOp::Clean => vec![
                        Update::NoUpdate,
                        Update::NoUpdate,
                        Update::Set(Signal::default_value()),
                    ],
                })
            }),
        )?;

        // Writer: replace the whole value.
        let spec = CallbackSpec::new()
            .with(Binding::output(self.cell()))
            .with(self.store_signal.input())
            .in_group(self.group_key());
        registrar.register_callback(
            spec,
            Box::new(|args| Ok(vec![Update::Set(args.input(0).clone())])),
        )?;

        // Writer: fold the incoming object into the current value.
        let spec = CallbackSpec::new()
            .with(Binding::output(self.cell()))
            .with(self.merge_signal.input())
            .with(Binding::state(self.cell()))
            .in_group(self.group_key());
        registrar.register_callback(
            spec,
            Box::new(|args| {
                let merged = merge_into(args.state(0), args.input(0))?;
                Ok(vec![Update::Set(Value::Object(merged))])
            }),
        )?;

        // Writer: reset to empty.
        let spec = CallbackSpec::new()
            .with(Binding::output(self.cell()))
            .with(self.clean_signal.trigger())
            .in_group(self.group_key());
        registrar.register_callback(
            spec,
            Box::new(|_args| Ok(vec![Update::Set(Value::Object(Map::new()))])),
        )?;

        Ok(())
    }
}

/// Parse an `{op, data}` event delivered to a store's input signal.
fn parse_store_event(event: &Value) -> Result<(StoreOp, Value)> {
    let op_name = event
        .get("op")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::MalformedStoreEvent {
            reason: "missing string `op` field".to_string(),
        })?;

    let op = StoreOp::parse(op_name).ok_or_else(|| Error::UnknownStoreOperation {
        op: op_name.to_string(),
    })?;

    let data = match op {
        // Clean carries no payload; any present data is ignored.
        StoreOp::Clean => Value::Null,
        StoreOp::Store | StoreOp::Merge => {
            event
                .get("data")
                .cloned()
                .ok_or_else(|| Error::MalformedStoreEvent {
                    reason: format!("missing `data` field for `{}`", op.as_str()),
                })?
        }
    };

    Ok((op, data))
}

/// Shallow merge of `incoming` over `current`, incoming keys winning.
///
/// A null current value counts as an empty object, so merging into a
/// never-written store behaves like storing.
fn merge_into(current: &Value, incoming: &Value) -> Result<Map<String, Value>> {
    let mut merged = match current {
        Value::Object(map) => map.clone(),
        Value::Null => Map::new(),
        other => {
            return Err(Error::MalformedStoreEvent {
                reason: format!("cannot merge into non-object store value `{other}`"),
            })
        }
    };

    let Value::Object(incoming) = incoming else {
        return Err(Error::MalformedStoreEvent {
            reason: "merge data must be an object".to_string(),
        });
    };

    for (key, value) in incoming {
        merged.insert(key.clone(), value.clone());
    }
    Ok(merged)
}
