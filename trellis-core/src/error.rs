//! Error Types
//!
//! Every failure the crate can produce is collected in the single [`Error`]
//! enum. There are two broad families:
//!
//! 1. **Assembly errors** are raised while a component tree is being built
//!    (ownership cycles, conflicting output claims). They abort construction
//!    and leave no usable tree behind.
//!
//! 2. **Dispatch errors** are raised inside a running callback (missing
//!    context keys, malformed store events, absent login routes). They
//!    abort the current propagation cycle and surface through the
//!    registrar's error channel; the failing callback's outputs are left
//!    untouched.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors produced by tree assembly and reactive dispatch.
#[derive(Debug, Error)]
pub enum Error {
    /// A component is reachable as its own descendant through owning
    /// references. Detected during child discovery, before any other
    /// assembly phase runs.
    #[error("component `{id}` is part of an ownership cycle in the component tree")]
    CyclicComponentTree {
        /// Derived identifier of the component at which the cycle closed.
        id: String,
    },

    /// A reactive cell was fired or written before anything declared or
    /// mounted it. Usually an assembly-order defect in the embedding.
    #[error("reactive cell `{cell}` is not known to the registrar")]
    UnboundIdentifier { cell: String },

    /// A router or redirect was configured to resolve a path prefix but the
    /// shared context carries no `prefix` key at dispatch time.
    #[error("prefix resolution is enabled but the \"prefix\" key was not found in the context")]
    MissingPrefixContext,

    /// A store input event carried an operation outside the supported set.
    #[error("unknown store operation `{op}`")]
    UnknownStoreOperation { op: String },

    /// A store input event did not have the expected `{op, data}` shape.
    #[error("malformed store event: {reason}")]
    MalformedStoreEvent { reason: String },

    /// Auth gating needed to fall back to the login page but the route
    /// table has no entry under the configured login route.
    #[error("login route `{route}` is not present in the route table")]
    MissingLoginRoute { route: String },

    /// Two callbacks claimed the same output cell without sharing a group
    /// key. Rejected at registration time.
    #[error("output cell `{cell}` is already claimed by a callback outside this group")]
    DuplicateOutputBinding { cell: String },

    /// A callback returned a different number of updates than it declared
    /// outputs. The whole batch is discarded.
    #[error("callback produced {got} updates for {expected} declared outputs")]
    OutputArityMismatch { expected: usize, got: usize },
}
