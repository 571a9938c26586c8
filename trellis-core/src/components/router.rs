//! Path Router
//!
//! A [`Router`] owns a table of pages and swaps one of them into its
//! content element whenever the location changes. Matching is literal:
//! the current pathname must equal `{prefix}{route}` exactly, no
//! patterns, no parameter extraction. The table keeps insertion order
//! and the first matching entry wins, so overlapping entries are
//! resolved by registration order.
//!
//! A router's direct children are page roots: the tree builder gives
//! them no parent and no page root of their own, and their subtrees hang
//! off them instead of the router (see [`crate::tree`]).

use tracing::info;

use crate::error::Result;
use crate::ident::scoped_id;
use crate::layout::{LayoutArgs, LayoutNode, Navigation};
use crate::runtime::{Binding, CallbackSpec, CellRef, ReactiveRegistrar, Update};
use crate::tree::{Component, ComponentCollection, ComponentCore, ComponentHandle};

use super::{nav_from_args, resolve_prefix};

/// Ordered route table mapping literal paths to page components.
///
/// Duplicate paths are allowed; dispatch takes the first match.
#[derive(Clone, Default)]
pub struct Routes {
    entries: Vec<(String, ComponentHandle)>,
}

impl Routes {
    /// Start an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one route.
    pub fn route(mut self, path: impl Into<String>, component: ComponentHandle) -> Self {
        self.entries.push((path.into(), component));
        self
    }

    /// The entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ComponentHandle)> {
        self.entries
            .iter()
            .map(|(path, component)| (path.as_str(), component))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ComponentCollection for Routes {
    fn components(&self) -> Vec<ComponentHandle> {
        self.entries
            .iter()
            .map(|(_, component)| component.clone())
            .collect()
    }
}

/// Swaps routed pages into a content element on navigation.
///
/// # Example
///
/// ```rust,ignore
/// let router = Arc::new(
///     Router::new(
///         Routes::new()
///             .route("/", home.clone())
///             .route("/settings", settings.clone()),
///         not_found.clone(),
///     )
///     .with_prefix(),
/// );
/// ```
pub struct Router {
    core: ComponentCore,
    routes: Routes,
    not_found: ComponentHandle,
    use_prefix: bool,
}

impl Router {
    /// A router over `routes`, dispatching `not_found` when nothing
    /// matches.
    pub fn new(routes: Routes, not_found: ComponentHandle) -> Self {
        Self {
            core: ComponentCore::new("router"),
            routes,
            not_found,
            use_prefix: false,
        }
    }

    /// Prepend the context's `prefix` value to every route when
    /// matching.
    pub fn with_prefix(mut self) -> Self {
        self.use_prefix = true;
        self
    }

    /// Rename the router.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.core.set_name(name);
        self
    }

    /// One of the four navigation cells owned by this router's location
    /// widget.
    pub fn location_cell(&self, attribute: &str) -> CellRef {
        CellRef::new(scoped_id(&self.core, "url"), attribute)
    }

    /// The content cell routed pages are swapped into.
    pub fn content_cell(&self) -> CellRef {
        CellRef::new(scoped_id(&self.core, "content"), "children")
    }

    /// Deliver a navigation event: the secondary location facts are
    /// written silently, then the pathname fires and dispatch runs.
    pub fn navigate(
        &self,
        registrar: &mut dyn ReactiveRegistrar,
        nav: Navigation,
    ) -> Result<()> {
        registrar.set_value(&self.location_cell("hash"), nav.hash.into())?;
        registrar.set_value(&self.location_cell("href"), nav.href.into())?;
        registrar.set_value(&self.location_cell("search"), nav.search.into())?;
        registrar.fire(&self.location_cell("pathname"), nav.pathname.into())
    }
}

impl Component for Router {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn child_nodes(&self) -> Vec<ComponentHandle> {
        let mut children = self.routes.components();
        children.push(self.not_found.clone());
        children
    }

    fn starts_page_scope(&self) -> bool {
        true
    }

    fn layout(&self, _args: &LayoutArgs) -> Result<LayoutNode> {
        Ok(LayoutNode::fragment(vec![
            LayoutNode::Location {
                id: scoped_id(&self.core, "url"),
            },
            LayoutNode::element(scoped_id(&self.core, "content")),
        ]))
    }

    fn register_callbacks(&self, registrar: &mut dyn ReactiveRegistrar) -> Result<()> {
        let spec = CallbackSpec::new()
            .with(Binding::output(self.content_cell()))
            .with(Binding::input(self.location_cell("pathname")))
            .with(Binding::state(self.location_cell("hash")))
            .with(Binding::state(self.location_cell("href")))
            .with(Binding::state(self.location_cell("search")));

        let routes = self.routes.clone();
        let not_found = self.not_found.clone();
        let use_prefix = self.use_prefix;
        let context = self.core.context();

        registrar.register_callback(
            spec,
            Box::new(move |args| {
                let nav = nav_from_args(args);
                let prefix = resolve_prefix(use_prefix, &context)?;

                for (path, page) in routes.iter() {
                    if nav.pathname == format!("{prefix}{path}") {
                        info!(route = path, "route matched");
                        let rendered = page.layout(&LayoutArgs::Page(nav.clone()))?;
                        return Ok(vec![Update::Set(rendered.to_value())]);
                    }
                }

                info!(pathname = %nav.pathname, "no route matched");
                let rendered = not_found.layout(&LayoutArgs::NotFound {
                    pathname: nav.pathname.clone(),
                })?;
                Ok(vec![Update::Set(rendered.to_value())])
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::runtime::LocalRuntime;
    use crate::tree::App;
    use serde_json::Value;
    use std::sync::Arc;

    /// Page that renders its own name and the navigation it received.
    struct Page {
        core: ComponentCore,
    }

    impl Page {
        fn new(name: &str) -> Arc<Self> {
            Arc::new(Self {
                core: ComponentCore::new(name),
            })
        }
    }

    impl Component for Page {
        fn core(&self) -> &ComponentCore {
            &self.core
        }

        fn layout(&self, args: &LayoutArgs) -> Result<LayoutNode> {
            let text = match args {
                LayoutArgs::Page(nav) => format!("{}:{}", self.core.name(), nav.pathname),
                LayoutArgs::NotFound { pathname } => {
                    format!("{}:{}", self.core.name(), pathname)
                }
                _ => self.core.name(),
            };
            Ok(LayoutNode::text(text))
        }
    }

    fn rendered_text(runtime: &LocalRuntime, router: &Router) -> String {
        let value = runtime
            .value(&router.content_cell())
            .unwrap_or(Value::Null);
        value
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    fn build_router(use_prefix: bool, context: Context) -> (Arc<Router>, LocalRuntime) {
        let routes = Routes::new()
            .route("/", Page::new("home"))
            .route("/a", Page::new("a"));
        let mut router = Router::new(routes, Page::new("missing"));
        if use_prefix {
            router = router.with_prefix();
        }
        let router = Arc::new(router);

        let mut runtime = LocalRuntime::new();
        App::build(router.clone(), context, &mut runtime).unwrap();
        (router, runtime)
    }

    #[test]
    fn dispatches_the_matching_page() {
        let (router, mut runtime) = build_router(false, Context::new());

        router.navigate(&mut runtime, Navigation::to("/a")).unwrap();
        assert_eq!(rendered_text(&runtime, &router), "a:/a");

        router.navigate(&mut runtime, Navigation::to("/")).unwrap();
        assert_eq!(rendered_text(&runtime, &router), "home:/");
    }

    #[test]
    fn unmatched_paths_dispatch_not_found() {
        let (router, mut runtime) = build_router(false, Context::new());

        router
            .navigate(&mut runtime, Navigation::to("/nope"))
            .unwrap();
        assert_eq!(rendered_text(&runtime, &router), "missing:/nope");
    }

    #[test]
    fn matching_is_exact_not_by_prefix() {
        let (router, mut runtime) = build_router(false, Context::new());

        router
            .navigate(&mut runtime, Navigation::to("/a/sub"))
            .unwrap();
        assert_eq!(rendered_text(&runtime, &router), "missing:/a/sub");
    }

    #[test]
    fn first_matching_entry_wins() {
        let routes = Routes::new()
            .route("/dup", Page::new("first"))
            .route("/dup", Page::new("second"));
        let router = Arc::new(Router::new(routes, Page::new("missing")));

        let mut runtime = LocalRuntime::new();
        App::build(router.clone(), Context::new(), &mut runtime).unwrap();

        router
            .navigate(&mut runtime, Navigation::to("/dup"))
            .unwrap();
        assert_eq!(rendered_text(&runtime, &router), "first:/dup");
    }

    #[test]
    fn prefix_is_prepended_when_enabled() {
        let context = Context::new().with_value("prefix", "/app");
        let (router, mut runtime) = build_router(true, context);

        router
            .navigate(&mut runtime, Navigation::to("/app/a"))
            .unwrap();
        assert_eq!(rendered_text(&runtime, &router), "a:/app/a");

        // The bare path no longer matches.
        router.navigate(&mut runtime, Navigation::to("/a")).unwrap();
        assert_eq!(rendered_text(&runtime, &router), "missing:/a");
    }

    #[test]
    fn missing_prefix_key_surfaces_on_dispatch() {
        let (router, mut runtime) = build_router(true, Context::new());

        let err = router
            .navigate(&mut runtime, Navigation::to("/a"))
            .unwrap_err();
        assert!(matches!(err, crate::Error::MissingPrefixContext));
    }

    #[test]
    fn routed_pages_become_page_roots() {
        let home = Page::new("home");
        let missing = Page::new("missing");
        let routes = Routes::new().route("/", home.clone());
        let router = Arc::new(Router::new(routes, missing.clone()));

        let mut runtime = LocalRuntime::new();
        App::build(router.clone(), Context::new(), &mut runtime).unwrap();

        // Pages and the not-found component all stand alone.
        assert!(home.core().parent().is_none());
        assert!(home.core().page_root().is_none());
        assert!(missing.core().parent().is_none());
        assert!(missing.core().page_root().is_none());
    }

    #[test]
    fn layout_declares_location_and_content_cells() {
        let (router, runtime) = build_router(false, Context::new());

        assert!(runtime.knows(&router.content_cell()));
        for attribute in ["pathname", "hash", "href", "search"] {
            assert!(runtime.knows(&router.location_cell(attribute)));
        }
    }

    #[test]
    fn secondary_location_facts_reach_the_page() {
        struct Echo {
            core: ComponentCore,
        }

        impl Component for Echo {
            fn core(&self) -> &ComponentCore {
                &self.core
            }

            fn layout(&self, args: &LayoutArgs) -> Result<LayoutNode> {
                match args {
                    LayoutArgs::Page(nav) => Ok(LayoutNode::text(format!(
                        "{}|{}|{}|{}",
                        nav.pathname, nav.hash, nav.href, nav.search
                    ))),
                    _ => Ok(LayoutNode::Empty),
                }
            }
        }

        let routes = Routes::new().route(
            "/x",
            Arc::new(Echo {
                core: ComponentCore::new("echo"),
            }),
        );
        let router = Arc::new(Router::new(routes, Page::new("missing")));
        let mut runtime = LocalRuntime::new();
        App::build(router.clone(), Context::new(), &mut runtime).unwrap();

        router
            .navigate(
                &mut runtime,
                Navigation::new("/x", "#frag", "https://h/x?q#frag", "?q"),
            )
            .unwrap();

        let value = runtime.value(&router.content_cell()).unwrap();
        assert_eq!(
            value.get("text").and_then(Value::as_str),
            Some("/x|#frag|https://h/x?q#frag|?q")
        );
    }

    #[test]
    fn routes_collection_exposes_pages_in_order() {
        let a = Page::new("a");
        let b = Page::new("b");
        let routes = Routes::new()
            .route("/a", a.clone())
            .route("/b", b.clone());

        let components = routes.components();
        let first: ComponentHandle = a;
        let second: ComponentHandle = b;
        assert_eq!(components.len(), 2);
        assert!(Arc::ptr_eq(&components[0], &first));
        assert!(Arc::ptr_eq(&components[1], &second));
        assert_eq!(routes.len(), 2);
        assert!(!routes.is_empty());
    }
}
