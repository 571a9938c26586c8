//! Component Collections
//!
//! Containers of components a parent can enumerate wholesale from
//! [`child_nodes`](super::Component::child_nodes). Keyed collections use
//! [`IndexMap`] when iteration order must follow insertion order.

use std::collections::HashMap;

use indexmap::IndexMap;

use super::node::ComponentHandle;

/// A container whose components can be enumerated as children.
pub trait ComponentCollection {
    /// The contained components, in collection order.
    fn components(&self) -> Vec<ComponentHandle>;
}

impl ComponentCollection for Vec<ComponentHandle> {
    fn components(&self) -> Vec<ComponentHandle> {
        self.clone()
    }
}

/// Keyed container; iteration order is unspecified.
impl ComponentCollection for HashMap<String, ComponentHandle> {
    fn components(&self) -> Vec<ComponentHandle> {
        self.values().cloned().collect()
    }
}

/// Keyed container preserving insertion order.
impl ComponentCollection for IndexMap<String, ComponentHandle> {
    fn components(&self) -> Vec<ComponentHandle> {
        self.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::layout::{LayoutArgs, LayoutNode};
    use crate::tree::{Component, ComponentCore};
    use std::sync::Arc;

    struct Leaf {
        core: ComponentCore,
    }

    impl Leaf {
        fn new(name: &str) -> ComponentHandle {
            Arc::new(Self {
                core: ComponentCore::new(name),
            })
        }
    }

    impl Component for Leaf {
        fn core(&self) -> &ComponentCore {
            &self.core
        }

        fn layout(&self, _args: &LayoutArgs) -> Result<LayoutNode> {
            Ok(LayoutNode::Empty)
        }
    }

    #[test]
    fn vec_preserves_order() {
        let a = Leaf::new("a");
        let b = Leaf::new("b");
        let list: Vec<ComponentHandle> = vec![a.clone(), b.clone()];

        let components = list.components();
        assert_eq!(components.len(), 2);
        assert!(Arc::ptr_eq(&components[0], &a));
        assert!(Arc::ptr_eq(&components[1], &b));
    }

    #[test]
    fn index_map_preserves_insertion_order() {
        let mut map: IndexMap<String, ComponentHandle> = IndexMap::new();
        map.insert("z".to_string(), Leaf::new("z"));
        map.insert("a".to_string(), Leaf::new("a"));
        map.insert("m".to_string(), Leaf::new("m"));

        let names: Vec<String> = map
            .components()
            .iter()
            .map(|component| component.core().name())
            .collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn hash_map_yields_all_members() {
        let mut map: HashMap<String, ComponentHandle> = HashMap::new();
        map.insert("a".to_string(), Leaf::new("a"));
        map.insert("b".to_string(), Leaf::new("b"));

        assert_eq!(map.components().len(), 2);
    }
}
