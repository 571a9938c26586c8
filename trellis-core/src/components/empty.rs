//! Empty layout placeholder.

use crate::error::Result;
use crate::ident::scoped_id;
use crate::layout::{LayoutArgs, LayoutNode};
use crate::tree::{Component, ComponentCore};

/// A component that renders an empty container.
///
/// Useful as a stand-in page while a tree is being sketched out, or as a
/// deliberately blank not-found target.
pub struct EmptyLayout {
    core: ComponentCore,
}

impl EmptyLayout {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            core: ComponentCore::new(name),
        }
    }
}

impl Component for EmptyLayout {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn layout(&self, _args: &LayoutArgs) -> Result<LayoutNode> {
        Ok(LayoutNode::element(scoped_id(&self.core, "empty")))
    }
}
