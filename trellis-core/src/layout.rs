//! Layout Surface
//!
//! Components render into a [`LayoutNode`] tree, a renderer-neutral
//! description of structure and reactive anchor points. The tree is what
//! gets serialized and handed to whatever presents the interface; the
//! crate itself only cares about the cells a layout declares:
//!
//! - [`LayoutNode::Element`] declares a `children` cell for its
//!   identifier, which routers use as their swap target.
//! - [`LayoutNode::CellAnchor`] declares an invisible value-holding cell
//!   with an initial value.
//! - [`LayoutNode::Location`] declares the four navigation cells
//!   (`pathname`, `hash`, `href`, `search`) for its identifier.
//!
//! Mounting a layout into a registrar walks the tree and declares exactly
//! those cells, applying initial values.

use serde::Serialize;
use serde_json::Value;

use crate::runtime::{CellRef, ReactiveRegistrar};

/// The four location facts delivered on every navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigation {
    pub pathname: String,
    pub hash: String,
    pub href: String,
    pub search: String,
}

impl Navigation {
    /// Build a navigation event from all four parts.
    pub fn new(
        pathname: impl Into<String>,
        hash: impl Into<String>,
        href: impl Into<String>,
        search: impl Into<String>,
    ) -> Self {
        Self {
            pathname: pathname.into(),
            hash: hash.into(),
            href: href.into(),
            search: search.into(),
        }
    }

    /// A bare navigation to `pathname` with empty hash and search.
    pub fn to(pathname: impl Into<String>) -> Self {
        let pathname = pathname.into();
        Self {
            href: pathname.clone(),
            pathname,
            hash: String::new(),
            search: String::new(),
        }
    }
}

/// Arguments a component's layout is invoked with.
///
/// Plain containers receive [`LayoutArgs::Plain`]; the routed variants are
/// produced by the routers when they dispatch a page.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutArgs {
    /// No routing involved; the common case for nested children.
    Plain,

    /// A routed page render with the current navigation.
    Page(Navigation),

    /// An auth-gated page render: navigation plus the session user value.
    AuthPage { nav: Navigation, user: Value },

    /// The login page render: navigation plus the prefixed route the
    /// client should be sent back to after logging in.
    LoginPage { nav: Navigation, redirect_to: String },

    /// The not-found page render with the path that failed to match.
    NotFound { pathname: String },
}

/// One node of a rendered layout tree.
///
/// Serializes with an internal `kind` tag, e.g.
/// `{"kind": "element", "id": "...", "children": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutNode {
    /// Transparent grouping; contributes no cells of its own.
    Fragment { children: Vec<LayoutNode> },

    /// A visible container whose `children` attribute is a reactive cell.
    Element { id: String, children: Vec<LayoutNode> },

    /// An invisible value holder. Mounting applies `initial` to the cell.
    CellAnchor { cell: CellRef, initial: Value },

    /// The client location widget. Mounting declares the four navigation
    /// cells scoped under `id`.
    Location { id: String },

    /// Literal text content.
    Text { text: String },

    /// Nothing at all.
    Empty,
}

impl LayoutNode {
    /// Grouping of `children` with no element of its own.
    pub fn fragment(children: Vec<LayoutNode>) -> Self {
        Self::Fragment { children }
    }

    /// An empty container with the given identifier.
    pub fn element(id: impl Into<String>) -> Self {
        Self::Element {
            id: id.into(),
            children: Vec::new(),
        }
    }

    /// A container with the given identifier and children.
    pub fn element_with(id: impl Into<String>, children: Vec<LayoutNode>) -> Self {
        Self::Element {
            id: id.into(),
            children,
        }
    }

    /// Literal text.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// The serialized form committed to `children` cells.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Declare every cell this layout carries into `registrar`, applying
    /// initial values.
    pub fn mount(&self, registrar: &mut dyn ReactiveRegistrar) {
        match self {
            LayoutNode::Fragment { children } => {
                for child in children {
                    child.mount(registrar);
                }
            }
            LayoutNode::Element { id, children } => {
                let initial: Vec<Value> = children.iter().map(LayoutNode::to_value).collect();
                registrar.mount(&CellRef::new(id.clone(), "children"), Value::Array(initial));
                for child in children {
                    child.mount(registrar);
                }
            }
            LayoutNode::CellAnchor { cell, initial } => {
                registrar.mount(cell, initial.clone());
            }
            LayoutNode::Location { id } => {
                for attribute in ["pathname", "hash", "href", "search"] {
                    registrar.mount(&CellRef::new(id.clone(), attribute), Value::Null);
                }
            }
            LayoutNode::Text { .. } | LayoutNode::Empty => {}
        }
    }
}
