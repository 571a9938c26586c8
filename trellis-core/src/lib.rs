//! Trellis Core
//!
//! This crate provides the core runtime for the Trellis reactive
//! component framework. It implements:
//!
//! - A component tree with owning downward links, weak upward links and
//!   a shared per-tree context
//! - A fixed assembly sequence turning a root component into a wired
//!   application
//! - A component library built on reactive cells: signals, operation
//!   driven stores, path routers (plain and auth-gated) and redirects
//! - A substrate boundary trait plus an in-process reference substrate
//!
//! Components never talk to a reactive engine directly: they declare
//! callbacks against the [`ReactiveRegistrar`] contract, and the
//! substrate behind it carries values between cells.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `tree`: Component nodes, collections and the assembly sequence
//! - `components`: The built-in component library
//! - `runtime`: The registrar contract and the in-process substrate
//! - `layout`: Renderer-neutral layout trees and their cell declarations
//! - `context`: The shared per-tree key-value context
//! - `session`: Session state read by auth-gated routing
//! - `ident`: Random instance tags and scoped cell identifiers
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use trellis_core::{App, Context, LocalRuntime, Navigation, Router, Routes};
//!
//! let router = Arc::new(Router::new(
//!     Routes::new()
//!         .route("/", home.clone())
//!         .route("/settings", settings.clone()),
//!     not_found.clone(),
//! ));
//!
//! let mut runtime = LocalRuntime::new();
//! let app = App::build(router.clone(), Context::new(), &mut runtime)?;
//!
//! // Deliver a navigation; the matched page lands in the content cell.
//! router.navigate(&mut runtime, Navigation::to("/settings"))?;
//! ```

pub mod components;
pub mod context;
pub mod error;
pub mod ident;
pub mod layout;
pub mod runtime;
pub mod session;
pub mod tree;

pub use components::{
    AuthRoute, AuthRouter, AuthRoutes, EmptyLayout, Redirect, Router, Routes, Signal, Store,
    StoreOp,
};
pub use context::Context;
pub use error::{Error, Result};
pub use layout::{LayoutArgs, LayoutNode, Navigation};
pub use runtime::{
    Binding, BindingRole, CallbackArgs, CallbackFn, CallbackSpec, CellRef, LocalRuntime,
    ReactiveRegistrar, Update,
};
pub use session::{MemorySession, SessionStore};
pub use tree::{App, Component, ComponentCollection, ComponentCore, ComponentHandle, Detached};
