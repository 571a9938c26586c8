//! Auth-Gated Path Router
//!
//! [`AuthRouter`] matches paths exactly like [`Router`](super::Router),
//! but each route declares whether it requires a logged-in user. On a
//! gated match the requester's session is consulted:
//!
//! - a user value present: the page renders with that value,
//! - no user value: the *login route's* component renders instead,
//!   handed the prefixed route originally requested so it can send the
//!   client back after login.
//!
//! The router only ever reads the session. Writing the user value on
//! login (and removing it on logout) is the embedding's business.

use std::sync::Arc;

use tracing::info;

use crate::error::{Error, Result};
use crate::ident::scoped_id;
use crate::layout::{LayoutArgs, LayoutNode, Navigation};
use crate::runtime::{Binding, CallbackSpec, CellRef, ReactiveRegistrar, Update};
use crate::session::SessionStore;
use crate::tree::{Component, ComponentCollection, ComponentCore, ComponentHandle};

use super::{nav_from_args, resolve_prefix};

/// Session key the user value is looked up under by default.
pub const DEFAULT_USER_SESSION_KEY: &str = "user";

/// Route the login page is looked up under by default.
pub const DEFAULT_LOGIN_ROUTE: &str = "/login";

/// One entry of an auth route table.
#[derive(Clone)]
pub struct AuthRoute {
    path: String,
    component: ComponentHandle,
    login_required: bool,
}

impl AuthRoute {
    /// The literal path this entry matches.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The page dispatched on a match.
    pub fn component(&self) -> &ComponentHandle {
        &self.component
    }

    /// Whether a session user is required to see the page.
    pub fn login_required(&self) -> bool {
        self.login_required
    }
}

/// Ordered route table with per-route login gating.
///
/// Duplicate paths are allowed; dispatch takes the first match.
#[derive(Clone, Default)]
pub struct AuthRoutes {
    entries: Vec<AuthRoute>,
}

impl AuthRoutes {
    /// Start an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one route with an explicit gating flag.
    pub fn route(
        mut self,
        path: impl Into<String>,
        component: ComponentHandle,
        login_required: bool,
    ) -> Self {
        self.entries.push(AuthRoute {
            path: path.into(),
            component,
            login_required,
        });
        self
    }

    /// Append a route anyone can see.
    pub fn open(self, path: impl Into<String>, component: ComponentHandle) -> Self {
        self.route(path, component, false)
    }

    /// Append a route requiring a session user.
    pub fn protected(self, path: impl Into<String>, component: ComponentHandle) -> Self {
        self.route(path, component, true)
    }

    /// The entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &AuthRoute> {
        self.entries.iter()
    }

    /// First entry registered under `path`, if any.
    pub fn get(&self, path: &str) -> Option<&AuthRoute> {
        self.entries.iter().find(|entry| entry.path == path)
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

impl ComponentCollection for AuthRoutes {
    fn components(&self) -> Vec<ComponentHandle> {
        self.entries
            .iter()
            .map(|entry| entry.component.clone())
            .collect()
    }
}

/// Session-aware router.
///
/// # Example
///
/// ```rust,ignore
/// let session = Arc::new(MemorySession::new());
/// let router = Arc::new(AuthRouter::new(
///     AuthRoutes::new()
///         .protected("/", dashboard.clone())
///         .open("/login", login.clone()),
///     not_found.clone(),
///     session.clone(),
/// ));
/// ```
pub struct AuthRouter {
    core: ComponentCore,
    routes: AuthRoutes,
    not_found: ComponentHandle,
    session: Arc<dyn SessionStore>,
    user_session_key: String,
    login_route: String,
    use_prefix: bool,
}

impl AuthRouter {
    /// A gated router over `routes`, reading `session` for the user.
    pub fn new(
        routes: AuthRoutes,
        not_found: ComponentHandle,
        session: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            core: ComponentCore::new("auth_router"),
            routes,
            not_found,
            session,
            user_session_key: DEFAULT_USER_SESSION_KEY.to_string(),
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            use_prefix: false,
        }
    }

    /// Look the user value up under a different session key.
    pub fn with_user_session_key(mut self, key: impl Into<String>) -> Self {
        self.user_session_key = key.into();
        self
    }

    /// Dispatch login fallbacks to a different route.
    pub fn with_login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
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

    /// Deliver a navigation event, exactly as
    /// [`Router::navigate`](super::Router::navigate) does.
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

impl Component for AuthRouter {
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
        let session = self.session.clone();
        let user_session_key = self.user_session_key.clone();
        let login_route = self.login_route.clone();
        let use_prefix = self.use_prefix;
        let context = self.core.context();

        registrar.register_callback(
            spec,
            Box::new(move |args| {
                let nav = nav_from_args(args);
                let prefix = resolve_prefix(use_prefix, &context)?;

                for entry in routes.iter() {
                    if nav.pathname != format!("{prefix}{}", entry.path()) {
                        continue;
                    }
                    info!(route = entry.path(), "route matched");

                    if !entry.login_required() {
                        let rendered =
                            entry.component().layout(&LayoutArgs::Page(nav.clone()))?;
                        return Ok(vec![Update::Set(rendered.to_value())]);
                    }

                    if let Some(user) = session.get(&user_session_key) {
                        let rendered = entry.component().layout(&LayoutArgs::AuthPage {
                            nav: nav.clone(),
                            user,
                        })?;
                        return Ok(vec![Update::Set(rendered.to_value())]);
                    }

                    // Gated and not logged in: hand the login page the
                    // prefixed route it should send the client back to.
                    let login =
                        routes
                            .get(&login_route)
                            .ok_or_else(|| Error::MissingLoginRoute {
                                route: login_route.clone(),
                            })?;
                    let redirect_to = format!("{prefix}{}", entry.path());
                    info!(redirect_to = %redirect_to, "no session user, dispatching login");
                    let rendered = login.component().layout(&LayoutArgs::LoginPage {
                        nav: nav.clone(),
                        redirect_to,
                    })?;
                    return Ok(vec![Update::Set(rendered.to_value())]);
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
