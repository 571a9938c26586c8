//! Redirect Component
//!
//! Components inside a prefixed application cannot know the absolute
//! paths they live under. A [`Redirect`] bridges that gap: callbacks fire
//! an in-app navigation request (`{url, target}`) at its request cell,
//! and the redirect combines it with the resolved prefix into a browser
//! navigation command on its command cell, which the embedding watches
//! and executes.
//!
//! The prefix is resolved once, while the layout is built, and parked on
//! an anchor cell; dispatch reads it back as state.

use serde_json::{json, Value};
use tracing::debug;

use crate::error::Result;
use crate::ident::scoped_id;
use crate::layout::{LayoutArgs, LayoutNode};
use crate::runtime::{Binding, CallbackSpec, CellRef, ReactiveRegistrar, Update};
use crate::tree::{Component, ComponentCore};

use super::resolve_prefix;

/// Turns in-app navigation requests into prefixed browser commands.
pub struct Redirect {
    core: ComponentCore,
    use_prefix: bool,
}

impl Redirect {
    /// A redirect with prefixing disabled; commands carry the url
    /// unchanged.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            core: ComponentCore::new(name),
            use_prefix: false,
        }
    }

    /// Resolve the context's `prefix` value while building the layout
    /// and prepend it to every command.
    pub fn with_prefix(mut self) -> Self {
        self.use_prefix = true;
        self
    }

    /// The cell navigation requests are fired at.
    pub fn request_cell(&self) -> CellRef {
        CellRef::new(scoped_id(&self.core, "href"), "data")
    }

    /// The cell the resolved prefix is parked on.
    fn prefix_cell(&self) -> CellRef {
        CellRef::new(scoped_id(&self.core, "prefix"), "data")
    }

    /// The cell browser navigation commands are committed to.
    pub fn command_cell(&self) -> CellRef {
        CellRef::new(scoped_id(&self.core, "command"), "data")
    }

    /// Build the `{url, target}` request payload.
    pub fn request(url: impl Into<String>, target: impl Into<String>) -> Value {
        json!({ "url": url.into(), "target": target.into() })
    }

    /// Fire one navigation request through `registrar`.
    pub fn send(
        &self,
        registrar: &mut dyn ReactiveRegistrar,
        url: impl Into<String>,
        target: impl Into<String>,
    ) -> Result<()> {
        registrar.fire(&self.request_cell(), Self::request(url, target))
    }
}

impl Component for Redirect {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn layout(&self, _args: &LayoutArgs) -> Result<LayoutNode> {
        let prefix = resolve_prefix(self.use_prefix, &self.core.context())?;
        Ok(LayoutNode::fragment(vec![
            LayoutNode::CellAnchor {
                cell: self.prefix_cell(),
                initial: json!({ "prefix": prefix }),
            },
            LayoutNode::CellAnchor {
                cell: self.request_cell(),
                initial: Value::Null,
            },
            LayoutNode::CellAnchor {
                cell: self.command_cell(),
                initial: Value::Null,
            },
        ]))
    }

    fn register_callbacks(&self, registrar: &mut dyn ReactiveRegistrar) -> Result<()> {
        let spec = CallbackSpec::new()
            .with(Binding::output(self.command_cell()))
            .with(Binding::input(self.request_cell()))
            .with(Binding::state(self.prefix_cell()));

        registrar.register_callback(
            spec,
            Box::new(|args| {
                let request = args.input(0);
                if request.is_null() {
                    return Ok(vec![Update::NoUpdate]);
                }

                let url = request
                    .get("url")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let target = request
                    .get("target")
                    .and_then(Value::as_str)
                    .unwrap_or("_self");
                let prefix = args
                    .state(0)
                    .get("prefix")
                    .and_then(Value::as_str)
                    .unwrap_or_default();

                let destination = format!("{prefix}{url}");
                debug!(url = %destination, "emitting navigation command");
                Ok(vec![Update::Set(json!({
                    "url": destination,
                    "target": target,
                }))])
            }),
        )
    }
}
