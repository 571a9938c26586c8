//! Component Tree
//!
//! The tree layer: component nodes and their embedded cores
//! ([`node`]), containers enumerable as children ([`collection`]), and
//! the assembly sequence that turns a root component into a wired
//! application ([`builder`]).

mod builder;
mod collection;
mod node;

pub use builder::App;
pub use collection::ComponentCollection;
pub use node::{Component, ComponentCore, ComponentHandle, Detached};
