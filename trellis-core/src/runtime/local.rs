//! Local Reactive Substrate
//!
//! [`LocalRuntime`] is the in-process implementation of the
//! [`ReactiveRegistrar`] contract. It keeps every cell value in memory and
//! propagates synchronously: a [`fire`](ReactiveRegistrar::fire) call runs
//! all affected callbacks to quiescence before returning.
//!
//! # Propagation Model
//!
//! 1. The fired cell's value is committed.
//! 2. Callbacks watching the cell seed the dependency graph, which
//!    returns the reachable callbacks in writer-before-reader order.
//! 3. Each callback in that order runs only if at least one of its
//!    watched cells actually changed this cycle. A callback upstream of
//!    it returning [`Update::NoUpdate`] therefore cuts the chain off.
//! 4. Committed outputs join the changed set, which is what lets chains
//!    and diamonds settle in a single pass.
//!
//! A callback error aborts the cycle at that point: already-committed
//! writes stay, the failing callback's outputs do not change, and nothing
//! downstream runs.
//!
//! # Isolation
//!
//! One `LocalRuntime` serves one client. Embeddings that host several
//! independent clients build one runtime (and one component tree) per
//! client, which is what keeps their cell values from bleeding into each
//! other.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::{Error, Result};

use super::graph::{CallbackGraph, CallbackId};
use super::{CallbackArgs, CallbackFn, CallbackSpec, CellRef, ReactiveRegistrar, Update};

/// One registered callback together with its declaration.
struct RegisteredCallback {
    id: CallbackId,
    spec: CallbackSpec,
    callback: CallbackFn,
}

/// Claim a group of writers holds on an output cell.
#[derive(Debug, Default)]
struct OutputClaim {
    group: Option<String>,
}

/// In-process reactive substrate.
///
/// # Example
///
/// ```rust,ignore
/// let mut runtime = LocalRuntime::new();
/// let app = App::build(root, Context::new(), &mut runtime)?;
/// runtime.fire(&trigger_cell, Value::from(1))?;
/// ```
#[derive(Default)]
pub struct LocalRuntime {
    /// Current value of every known cell.
    cells: HashMap<CellRef, Value>,

    /// Registered callbacks, in registration order.
    callbacks: Vec<RegisteredCallback>,

    /// Cell -> callbacks watching it as input or trigger.
    watchers: HashMap<CellRef, SmallVec<[CallbackId; 4]>>,

    /// Cell -> the writer claim registered for it.
    claims: HashMap<CellRef, OutputClaim>,

    /// Dependency edges between callbacks.
    graph: CallbackGraph,
}

impl LocalRuntime {
    /// Create an empty runtime with no cells and no callbacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of known cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of registered callbacks.
    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    /// Whether `cell` has been declared or mounted.
    pub fn knows(&self, cell: &CellRef) -> bool {
        self.cells.contains_key(cell)
    }

    fn gather_args(cells: &HashMap<CellRef, Value>, spec: &CallbackSpec) -> CallbackArgs {
        let read = |list: &[CellRef]| -> Vec<Value> {
            list.iter()
                .map(|cell| cells.get(cell).cloned().unwrap_or(Value::Null))
                .collect()
        };
        CallbackArgs {
            triggers: read(&spec.triggers),
            inputs: read(&spec.inputs),
            states: read(&spec.states),
        }
    }
}

impl ReactiveRegistrar for LocalRuntime {
    fn register_callback(&mut self, spec: CallbackSpec, callback: CallbackFn) -> Result<()> {
        // Validate every output claim before committing any of them, so a
        // rejected registration leaves the claim table unchanged.
        for output in &spec.outputs {
            if let Some(claim) = self.claims.get(output) {
                let grouped_together = match (&claim.group, &spec.group) {
                    (Some(existing), Some(new)) => existing == new,
                    _ => false,
                };
                if !grouped_together {
                    return Err(Error::DuplicateOutputBinding {
                        cell: output.to_string(),
                    });
                }
            }
        }
        for output in &spec.outputs {
            self.claims
                .entry(output.clone())
                .or_insert_with(|| OutputClaim {
                    group: spec.group.clone(),
                });
        }

        // Every declared cell becomes known immediately, whether or not a
        // layout carrying it has been delivered yet.
        for cell in spec.declared() {
            self.cells.entry(cell.clone()).or_insert(Value::Null);
        }

        let id = CallbackId::new();
        self.graph.add_node(id);

        // Wire dependency edges against every callback already present.
        for existing in &self.callbacks {
            let feeds_new = existing
                .spec
                .outputs
                .iter()
                .any(|out| spec.watched().any(|watched| watched == out));
            if feeds_new {
                self.graph.add_edge(existing.id, id);
            }

            let feeds_existing = spec
                .outputs
                .iter()
                .any(|out| existing.spec.watched().any(|watched| watched == out));
            if feeds_existing {
                self.graph.add_edge(id, existing.id);
            }
        }

        for watched in spec.watched() {
            self.watchers.entry(watched.clone()).or_default().push(id);
        }

        debug!(
            callback = id.raw(),
            outputs = spec.outputs.len(),
            inputs = spec.inputs.len(),
            triggers = spec.triggers.len(),
            states = spec.states.len(),
            "callback registered"
        );

        self.callbacks.push(RegisteredCallback { id, spec, callback });
        Ok(())
    }

    fn mount(&mut self, cell: &CellRef, initial: Value) {
        trace!(cell = %cell, "cell mounted");
        self.cells.insert(cell.clone(), initial);
    }

    fn fire(&mut self, cell: &CellRef, value: Value) -> Result<()> {
        if !self.cells.contains_key(cell) {
            return Err(Error::UnboundIdentifier {
                cell: cell.to_string(),
            });
        }

        debug!(cell = %cell, "firing cell");
        self.cells.insert(cell.clone(), value);

        let mut changed: HashSet<CellRef> = HashSet::new();
        changed.insert(cell.clone());

        let seeds: Vec<CallbackId> = self
            .watchers
            .get(cell)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default();

        for id in self.graph.affected_from(seeds) {
            let index = match self.callbacks.iter().position(|c| c.id == id) {
                Some(index) => index,
                None => continue,
            };

            // Skip callbacks none of whose watched cells changed; this is
            // how the no-update sentinel stops a chain.
            let touched = self.callbacks[index]
                .spec
                .watched()
                .any(|watched| changed.contains(watched));
            if !touched {
                trace!(callback = id.raw(), "skipping untouched callback");
                continue;
            }

            let (updates, outputs) = {
                let registered = &self.callbacks[index];
                let args = Self::gather_args(&self.cells, &registered.spec);
                trace!(callback = id.raw(), "running callback");
                let updates = (registered.callback)(&args)?;
                (updates, registered.spec.outputs.clone())
            };

            if updates.len() != outputs.len() {
                return Err(Error::OutputArityMismatch {
                    expected: outputs.len(),
                    got: updates.len(),
                });
            }

            for (output, update) in outputs.iter().zip(updates) {
                match update {
                    Update::Set(next) => {
                        trace!(cell = %output, "committing output");
                        self.cells.insert(output.clone(), next);
                        changed.insert(output.clone());
                    }
                    Update::NoUpdate => {}
                }
            }
        }

        Ok(())
    }

    fn set_value(&mut self, cell: &CellRef, value: Value) -> Result<()> {
        if !self.cells.contains_key(cell) {
            return Err(Error::UnboundIdentifier {
                cell: cell.to_string(),
            });
        }
        self.cells.insert(cell.clone(), value);
        Ok(())
    }

    fn value(&self, cell: &CellRef) -> Option<Value> {
        self.cells.get(cell).cloned()
    }
}
