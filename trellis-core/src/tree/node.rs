//! Component Nodes
//!
//! A component is one unit of the interface tree. Every component embeds
//! a [`ComponentCore`] carrying the state the tree builder manages:
//!
//! - a random instance tag drawn at construction (see [`crate::ident`]),
//! - a mutable logical name; the derived identifier is `{tag}-{name}`,
//! - the recorded list of owned children,
//! - weak links upward to the parent and to the page root,
//! - a handle to the tree-wide shared [`Context`].
//!
//! # Ownership
//!
//! Downward links own ([`Arc`]); upward links are weak. That shape is what
//! makes a built tree droppable: the root going away releases everything
//! below it, with no reference cycles keeping nodes alive.
//!
//! Components that must reference a node *outside* the ownership
//! structure (a navbar pointing at a page it does not own, say) hold a
//! [`Detached`] reference, which never contributes to ownership and never
//! shows up in child discovery.
//!
//! # Thread Safety
//!
//! Handles are shared freely across threads; all core state sits behind
//! locks. The builder is the only writer of children, parent, page root
//! and context, and it runs before the tree is shared.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::context::Context;
use crate::error::Result;
use crate::ident::{random_tag, DEFAULT_COMPONENT_NAME};
use crate::layout::{LayoutArgs, LayoutNode};
use crate::runtime::ReactiveRegistrar;

/// Shared handle to a node of the component tree.
pub type ComponentHandle = Arc<dyn Component>;

/// One unit of the interface tree.
///
/// Implementations embed a [`ComponentCore`] and expose it through
/// [`core`](Component::core); everything else has a default that suits
/// leaf components with no children and no callbacks.
///
/// # Example
///
/// ```rust,ignore
/// struct Counter {
///     core: ComponentCore,
///     count: Arc<Signal>,
/// }
///
/// impl Component for Counter {
///     fn core(&self) -> &ComponentCore {
///         &self.core
///     }
///
///     fn child_nodes(&self) -> Vec<ComponentHandle> {
///         let children: Vec<ComponentHandle> = vec![self.count.clone()];
///         children
///     }
///
///     fn layout(&self, args: &LayoutArgs) -> Result<LayoutNode> {
///         Ok(LayoutNode::fragment(vec![self.count.layout(args)?]))
///     }
/// }
/// ```
pub trait Component: Send + Sync {
    /// The node's embedded state block.
    fn core(&self) -> &ComponentCore;

    /// The nodes this component structurally owns, in declaration order.
    ///
    /// The builder calls this once per construction and records the
    /// result on the core; components list their owned fields here
    /// explicitly. [`Detached`] references are *not* children and must
    /// not appear.
    fn child_nodes(&self) -> Vec<ComponentHandle> {
        Vec::new()
    }

    /// One-time setup hook. Runs root-to-leaf after parent, page root and
    /// context assignment, before any layout is built.
    fn initialize(&self) {}

    /// Wire this component's callbacks into the reactive substrate. Runs
    /// root-to-leaf after the root layout has been built and mounted.
    fn register_callbacks(&self, registrar: &mut dyn ReactiveRegistrar) -> Result<()> {
        let _ = registrar;
        Ok(())
    }

    /// Produce this component's layout. Parents pull their children's
    /// layout while assembling their own.
    fn layout(&self, args: &LayoutArgs) -> Result<LayoutNode>;

    /// Whether this component's direct children begin independent page
    /// scopes. Routers return `true`; everything else keeps the default.
    fn starts_page_scope(&self) -> bool {
        false
    }
}

// ----------------------------------------------------------------------------
// Component Core
// ----------------------------------------------------------------------------

/// Builder-managed state embedded in every component.
pub struct ComponentCore {
    /// Random instance tag, fixed for the lifetime of the component.
    tag: String,

    /// Mutable logical name; part of the derived identifier.
    name: RwLock<String>,

    /// Children recorded by the builder's discovery phase.
    children: RwLock<Vec<ComponentHandle>>,

    /// Weak link to the owning parent, if any.
    parent: RwLock<Option<Weak<dyn Component>>>,

    /// Weak link to the root of this node's page scope, if any.
    page_root: RwLock<Option<Weak<dyn Component>>>,

    /// Handle to the tree-wide shared context.
    context: RwLock<Context>,
}

impl ComponentCore {
    /// Create a core with the given logical name and a fresh random tag.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            tag: random_tag(),
            name: RwLock::new(name.into()),
            children: RwLock::new(Vec::new()),
            parent: RwLock::new(None),
            page_root: RwLock::new(None),
            context: RwLock::new(Context::new()),
        }
    }

    /// Create a core with the default name.
    pub fn unnamed() -> Self {
        Self::new(DEFAULT_COMPONENT_NAME)
    }

    /// The random instance tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The current logical name.
    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    /// Rename the component. The identifier is derived on read, so it
    /// reflects the new name immediately; the tag never changes.
    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.write() = name.into();
    }

    /// The derived identifier, `{tag}-{name}`.
    pub fn id(&self) -> String {
        format!("{}-{}", self.tag, self.name.read())
    }

    /// The children recorded during discovery.
    pub fn children(&self) -> Vec<ComponentHandle> {
        self.children.read().clone()
    }

    pub(crate) fn set_children(&self, children: Vec<ComponentHandle>) {
        *self.children.write() = children;
    }

    /// The owning parent, if assigned and still alive.
    pub fn parent(&self) -> Option<ComponentHandle> {
        self.parent.read().as_ref().and_then(Weak::upgrade)
    }

    pub(crate) fn set_parent(&self, parent: Option<&ComponentHandle>) {
        *self.parent.write() = parent.map(Arc::downgrade);
    }

    /// The root of this node's page scope, if assigned and still alive.
    ///
    /// `None` for the tree root, for routers' direct children (each of
    /// which *is* a page root), and for nodes of a tree built without
    /// routing.
    pub fn page_root(&self) -> Option<ComponentHandle> {
        self.page_root.read().as_ref().and_then(Weak::upgrade)
    }

    pub(crate) fn set_page_root(&self, page_root: Option<&ComponentHandle>) {
        *self.page_root.write() = page_root.map(Arc::downgrade);
    }

    /// Handle to the shared context this node was built with.
    pub fn context(&self) -> Context {
        self.context.read().clone()
    }

    pub(crate) fn set_context(&self, context: &Context) {
        *self.context.write() = context.clone();
    }
}

impl Default for ComponentCore {
    fn default() -> Self {
        Self::unnamed()
    }
}

impl fmt::Debug for ComponentCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentCore")
            .field("id", &self.id())
            .field("children", &self.children.read().len())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Detached References
// ----------------------------------------------------------------------------

/// Non-owning reference to a component elsewhere in the tree.
///
/// A `Detached<C>` never contributes to ownership: the referenced node is
/// kept alive by its place in the tree, not by this reference, and child
/// discovery does not traverse it. Use it wherever a component needs to
/// *talk about* a node it does not own, e.g. a navbar addressing the
/// pages it links to.
pub struct Detached<C: ?Sized> {
    inner: Weak<C>,
}

impl<C: ?Sized> Detached<C> {
    /// Create a detached reference to `component`.
    pub fn new(component: &Arc<C>) -> Self {
        Self {
            inner: Arc::downgrade(component),
        }
    }

    /// The referenced component, if it is still part of a live tree.
    pub fn upgrade(&self) -> Option<Arc<C>> {
        self.inner.upgrade()
    }
}

impl<C: ?Sized> Clone for Detached<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C: ?Sized> fmt::Debug for Detached<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Detached")
    }
}
