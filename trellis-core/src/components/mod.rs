//! Built-in Components
//!
//! The component library shipped with the crate:
//!
//! - [`Signal`]: a single reactive cell with helpers for binding it into
//!   callbacks.
//! - [`Store`]: a composite cell updated through store/merge/clean
//!   operations sent to one entry signal.
//! - [`Router`] and [`AuthRouter`]: swap a page subtree into a content
//!   element on navigation, the latter gated by session state.
//! - [`Redirect`]: turn in-app navigation requests into prefixed browser
//!   navigation commands.
//! - [`EmptyLayout`]: a placeholder that renders an empty container.

use serde_json::Value;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::layout::Navigation;
use crate::runtime::CallbackArgs;

mod auth_router;
mod empty;
mod redirect;
mod router;
mod signal;
mod store;

pub use auth_router::{AuthRoute, AuthRouter, AuthRoutes};
pub use empty::EmptyLayout;
pub use redirect::Redirect;
pub use router::{Router, Routes};
pub use signal::Signal;
pub use store::{Store, StoreOp};

/// Resolve the path prefix a component should apply.
///
/// With prefixing disabled the prefix is empty. With it enabled, the
/// shared context must hold a string under `prefix`; a missing or
/// non-string value raises [`Error::MissingPrefixContext`].
pub(crate) fn resolve_prefix(use_prefix: bool, context: &Context) -> Result<String> {
    if !use_prefix {
        return Ok(String::new());
    }
    context
        .get("prefix")
        .and_then(|value| value.as_str().map(str::to_owned))
        .ok_or(Error::MissingPrefixContext)
}

/// Reassemble a [`Navigation`] from router callback arguments.
///
/// Routers declare the pathname as their only input and hash, href and
/// search as states, in that order; this helper relies on that layout.
pub(crate) fn nav_from_args(args: &CallbackArgs) -> Navigation {
    let text = |value: &Value| value.as_str().unwrap_or_default().to_string();
    Navigation {
        pathname: text(args.input(0)),
        hash: text(args.state(0)),
        href: text(args.state(1)),
        search: text(args.state(2)),
    }
}
