//! Tree Assembly
//!
//! [`App::build`] turns a root component into a fully annotated tree
//! wired into a reactive substrate. Assembly runs a fixed sequence of
//! phases, each exactly once per construction:
//!
//! 1. **Discovery.** Depth-first walk recording every component's
//!    children on its core. Ownership cycles are detected here and abort
//!    the build.
//! 2. **Page roots.** The root gets none. When the root starts page
//!    scopes (it is a router), each of its children becomes a page root
//!    with no page root of its own, and their subtrees point at them.
//!    Otherwise every descendant points at the root.
//! 3. **Parents.** Same shape as phase 2: children of a scope-starting
//!    root get no parent; everything below chains normally.
//! 4. **Context.** Every node, the root included, receives a handle to
//!    the same shared context.
//! 5. **Initialize hooks**, root to leaves.
//! 6. **Layout.** The root's layout is built and mounted, declaring its
//!    cells in the registrar.
//! 7. **Callback registration**, root to leaves. A node that appears in
//!    several places of the tree registers once. Any registration error
//!    aborts the build.
//!
//! Phases never interleave: when a node's `initialize` runs, the whole
//! tree already has children, links and context in place.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::context::Context;
use crate::error::{Error, Result};
use crate::layout::{LayoutArgs, LayoutNode};
use crate::runtime::ReactiveRegistrar;

use super::node::{Component, ComponentHandle};

/// A fully assembled component tree.
///
/// # Example
///
/// ```rust,ignore
/// let mut runtime = LocalRuntime::new();
/// let context = Context::new().with_value("prefix", "/app");
/// let app = App::build(Arc::new(root), context, &mut runtime)?;
/// ```
pub struct App {
    root: ComponentHandle,
    context: Context,
    layout: LayoutNode,
}

impl App {
    /// Assemble the tree under `root` and wire it into `registrar`.
    pub fn build(
        root: ComponentHandle,
        context: Context,
        registrar: &mut dyn ReactiveRegistrar,
    ) -> Result<Self> {
        info!(root = %root.core().id(), "discovering children");
        let mut path = Vec::new();
        discover_children(&root, &mut path)?;

        info!("assigning page roots");
        root.core().set_page_root(None);
        if root.starts_page_scope() {
            for child in root.core().children() {
                child.core().set_page_root(None);
                debug!(page_root = %child.core().id(), "starting page scope");
                for grand_child in child.core().children() {
                    assign_page_root(&grand_child, &child);
                }
            }
        } else {
            for child in root.core().children() {
                assign_page_root(&child, &root);
            }
        }

        info!("assigning parents");
        root.core().set_parent(None);
        if root.starts_page_scope() {
            for child in root.core().children() {
                child.core().set_parent(None);
                for grand_child in child.core().children() {
                    assign_parent(&grand_child, &child);
                }
            }
        } else {
            for child in root.core().children() {
                assign_parent(&child, &root);
            }
        }

        info!("propagating the shared context");
        assign_context(&root, &context);

        info!("running initialize hooks");
        run_initialize(&root);

        info!("building and mounting the root layout");
        let layout = root.layout(&LayoutArgs::Plain)?;
        layout.mount(registrar);

        info!("registering callbacks");
        let mut registered = Vec::new();
        register_callbacks(&root, registrar, &mut registered)?;

        Ok(Self {
            root,
            context,
            layout,
        })
    }

    /// The root component the tree was built from.
    pub fn root(&self) -> &ComponentHandle {
        &self.root
    }

    /// The shared context every node of the tree sees.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The root layout as built during assembly.
    pub fn layout(&self) -> &LayoutNode {
        &self.layout
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("root", &self.root.core().id())
            .finish()
    }
}

/// Stable address of a node, used for cycle and revisit checks.
fn address_of(component: &ComponentHandle) -> *const () {
    Arc::as_ptr(component) as *const ()
}

fn discover_children(component: &ComponentHandle, path: &mut Vec<*const ()>) -> Result<()> {
    let address = address_of(component);
    if path.contains(&address) {
        return Err(Error::CyclicComponentTree {
            id: component.core().id(),
        });
    }
    path.push(address);

    debug!(component = %component.core().id(), "recording children");
    let children = component.child_nodes();
    component.core().set_children(children.clone());

    for child in &children {
        discover_children(child, path)?;
    }
    path.pop();
    Ok(())
}

fn assign_page_root(component: &ComponentHandle, page_root: &ComponentHandle) {
    debug!(
        component = %component.core().id(),
        page_root = %page_root.core().id(),
        "assigning page root"
    );
    component.core().set_page_root(Some(page_root));
    for child in component.core().children() {
        assign_page_root(&child, page_root);
    }
}

fn assign_parent(component: &ComponentHandle, parent: &ComponentHandle) {
    component.core().set_parent(Some(parent));
    for child in component.core().children() {
        assign_parent(&child, component);
    }
}

fn assign_context(component: &ComponentHandle, context: &Context) {
    component.core().set_context(context);
    for child in component.core().children() {
        assign_context(&child, context);
    }
}

fn run_initialize(component: &ComponentHandle) {
    component.initialize();
    for child in component.core().children() {
        run_initialize(&child);
    }
}

fn register_callbacks(
    component: &ComponentHandle,
    registrar: &mut dyn ReactiveRegistrar,
    registered: &mut Vec<*const ()>,
) -> Result<()> {
    // A node reachable along several paths (one page shared by two
    // routes) must register its callbacks once, not once per path.
    let address = address_of(component);
    if !registered.contains(&address) {
        registered.push(address);
        debug!(component = %component.core().id(), "registering callbacks");
        component.register_callbacks(registrar)?;
    }
    for child in component.core().children() {
        register_callbacks(&child, registrar, registered)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::LocalRuntime;
    use crate::tree::ComponentCore;
    use parking_lot::RwLock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Test component with externally poked children and counters.
    struct Probe {
        core: ComponentCore,
        links: RwLock<Vec<ComponentHandle>>,
        scope_starter: bool,
        init_calls: AtomicUsize,
        register_calls: AtomicUsize,
    }

    impl Probe {
        fn new(name: &str) -> Arc<Self> {
            Arc::new(Self {
                core: ComponentCore::new(name),
                links: RwLock::new(Vec::new()),
                scope_starter: false,
                init_calls: AtomicUsize::new(0),
                register_calls: AtomicUsize::new(0),
            })
        }

        fn scope_root(name: &str) -> Arc<Self> {
            Arc::new(Self {
                core: ComponentCore::new(name),
                links: RwLock::new(Vec::new()),
                scope_starter: true,
                init_calls: AtomicUsize::new(0),
                register_calls: AtomicUsize::new(0),
            })
        }

        fn adopt(&self, child: &Arc<Probe>) {
            self.links.write().push(child.clone());
        }
    }

    impl Component for Probe {
        fn core(&self) -> &ComponentCore {
            &self.core
        }

        fn child_nodes(&self) -> Vec<ComponentHandle> {
            self.links.read().clone()
        }

        fn initialize(&self) {
            self.init_calls.fetch_add(1, Ordering::SeqCst);
        }

        fn register_callbacks(&self, _registrar: &mut dyn ReactiveRegistrar) -> Result<()> {
            self.register_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn layout(&self, _args: &LayoutArgs) -> Result<LayoutNode> {
            Ok(LayoutNode::Empty)
        }

        fn starts_page_scope(&self) -> bool {
            self.scope_starter
        }
    }

    fn handle(probe: &Arc<Probe>) -> ComponentHandle {
        probe.clone()
    }

    #[test]
    fn plain_tree_chains_parents_and_page_roots() {
        let root = Probe::new("root");
        let branch = Probe::new("branch");
        let leaf = Probe::new("leaf");
        root.adopt(&branch);
        branch.adopt(&leaf);

        let mut runtime = LocalRuntime::new();
        App::build(handle(&root), Context::new(), &mut runtime).unwrap();

        assert!(root.core().parent().is_none());
        assert!(root.core().page_root().is_none());

        let branch_parent = branch.core().parent().unwrap();
        assert!(Arc::ptr_eq(&branch_parent, &handle(&root)));
        let leaf_parent = leaf.core().parent().unwrap();
        assert!(Arc::ptr_eq(&leaf_parent, &handle(&branch)));

        // Every descendant of a plain root points at the root itself.
        let branch_page = branch.core().page_root().unwrap();
        let leaf_page = leaf.core().page_root().unwrap();
        assert!(Arc::ptr_eq(&branch_page, &handle(&root)));
        assert!(Arc::ptr_eq(&leaf_page, &handle(&root)));
    }

    #[test]
    fn scope_starting_root_detaches_its_children() {
        let root = Probe::scope_root("router");
        let page = Probe::new("page");
        let widget = Probe::new("widget");
        root.adopt(&page);
        page.adopt(&widget);

        let mut runtime = LocalRuntime::new();
        App::build(handle(&root), Context::new(), &mut runtime).unwrap();

        // Pages under a scope-starting root stand alone.
        assert!(page.core().parent().is_none());
        assert!(page.core().page_root().is_none());

        // Their subtrees chain from the page, not from the root.
        let widget_parent = widget.core().parent().unwrap();
        let widget_page = widget.core().page_root().unwrap();
        assert!(Arc::ptr_eq(&widget_parent, &handle(&page)));
        assert!(Arc::ptr_eq(&widget_page, &handle(&page)));
    }

    #[test]
    fn context_is_shared_by_identity() {
        let root = Probe::new("root");
        let leaf = Probe::new("leaf");
        root.adopt(&leaf);

        let context = Context::new().with_value("prefix", "/app");
        let mut runtime = LocalRuntime::new();
        let app = App::build(handle(&root), context, &mut runtime).unwrap();

        assert!(root.core().context().ptr_eq(app.context()));
        assert!(leaf.core().context().ptr_eq(app.context()));

        // A write through one node is visible through any other.
        root.core().context().insert("theme", "dark");
        assert_eq!(
            leaf.core().context().get("theme"),
            Some(serde_json::Value::String("dark".into()))
        );
    }

    #[test]
    fn hooks_run_once_per_construction() {
        let root = Probe::new("root");
        let leaf = Probe::new("leaf");
        root.adopt(&leaf);

        let mut runtime = LocalRuntime::new();
        App::build(handle(&root), Context::new(), &mut runtime).unwrap();

        assert_eq!(root.init_calls.load(Ordering::SeqCst), 1);
        assert_eq!(leaf.init_calls.load(Ordering::SeqCst), 1);
        assert_eq!(root.register_calls.load(Ordering::SeqCst), 1);
        assert_eq!(leaf.register_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn app_debug_names_the_root() {
        let root = Probe::new("root");
        let mut runtime = LocalRuntime::new();
        let app = App::build(handle(&root), Context::new(), &mut runtime).unwrap();

        // Build results get debug-printed by failing assertions, so the
        // output must identify the tree without dumping it.
        let printed = format!("{app:?}");
        assert!(printed.contains("App"));
        assert!(printed.contains(&root.core().id()));
    }

    #[test]
    fn ownership_cycle_aborts_the_build() {
        let a = Probe::new("a");
        let b = Probe::new("b");
        a.adopt(&b);
        b.adopt(&a);

        let mut runtime = LocalRuntime::new();
        let err = App::build(handle(&a), Context::new(), &mut runtime).unwrap_err();
        assert!(matches!(err, Error::CyclicComponentTree { .. }));
    }

    #[test]
    fn shared_subtree_is_legal_and_registers_once() {
        // The same page is owned by two branches; discovery visits it
        // twice but callbacks register once.
        let root = Probe::new("root");
        let left = Probe::new("left");
        let right = Probe::new("right");
        let shared = Probe::new("shared");
        root.adopt(&left);
        root.adopt(&right);
        left.adopt(&shared);
        right.adopt(&shared);

        let mut runtime = LocalRuntime::new();
        App::build(handle(&root), Context::new(), &mut runtime).unwrap();

        assert_eq!(shared.register_calls.load(Ordering::SeqCst), 1);

        // The later visit wins the parent link.
        let parent = shared.core().parent().unwrap();
        assert!(Arc::ptr_eq(&parent, &handle(&right)));
    }

    #[test]
    fn registration_failure_aborts_the_build() {
        struct Faulty {
            core: ComponentCore,
        }

        impl Component for Faulty {
            fn core(&self) -> &ComponentCore {
                &self.core
            }

            fn register_callbacks(&self, _registrar: &mut dyn ReactiveRegistrar) -> Result<()> {
                Err(Error::DuplicateOutputBinding {
                    cell: "taken.data".to_string(),
                })
            }

            fn layout(&self, _args: &LayoutArgs) -> Result<LayoutNode> {
                Ok(LayoutNode::Empty)
            }
        }

        let root: ComponentHandle = Arc::new(Faulty {
            core: ComponentCore::new("faulty"),
        });
        let mut runtime = LocalRuntime::new();
        let err = App::build(root, Context::new(), &mut runtime).unwrap_err();
        assert!(matches!(err, Error::DuplicateOutputBinding { .. }));
    }

    #[test]
    fn layout_cells_are_mounted_during_build() {
        struct Anchored {
            core: ComponentCore,
        }

        impl Component for Anchored {
            fn core(&self) -> &ComponentCore {
                &self.core
            }

            fn layout(&self, _args: &LayoutArgs) -> Result<LayoutNode> {
                Ok(LayoutNode::element("stage"))
            }
        }

        let root: ComponentHandle = Arc::new(Anchored {
            core: ComponentCore::new("anchored"),
        });
        let mut runtime = LocalRuntime::new();
        App::build(root, Context::new(), &mut runtime).unwrap();

        assert!(runtime.knows(&crate::runtime::CellRef::new("stage", "children")));
    }
}
