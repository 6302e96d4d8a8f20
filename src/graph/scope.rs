use std::collections::HashMap;

use super::NodeId;

/// Names visible at one point of the traversal, plus the function whose body
/// is being walked.
///
/// Branches get their own copy through [`Scope::child`] or
/// [`Scope::function_child`]; bindings made in a copy never reach the scope it
/// came from, while bindings made in the same copy stay visible to later
/// siblings.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    bindings: HashMap<String, NodeId>,
    enclosing_function: Option<NodeId>,
}

impl Scope {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self) -> Self {
        self.clone()
    }

    pub fn function_child(&self, function: NodeId) -> Self {
        Self {
            bindings: self.bindings.clone(),
            enclosing_function: Some(function),
        }
    }

    pub fn bind(&mut self, name: impl Into<String>, node: NodeId) {
        self.bindings.insert(name.into(), node);
    }

    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.bindings.get(name).copied()
    }

    pub fn enclosing_function(&self) -> Option<NodeId> {
        self.enclosing_function
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_bindings_do_not_leak_to_the_parent() {
        let mut root = Scope::root();
        root.bind("x", NodeId(1));

        let mut child = root.function_child(NodeId(2));
        child.bind("y", NodeId(3));
        child.bind("x", NodeId(4));

        assert_eq!(child.lookup("x"), Some(NodeId(4)));
        assert_eq!(child.lookup("y"), Some(NodeId(3)));
        assert_eq!(child.enclosing_function(), Some(NodeId(2)));

        assert_eq!(root.lookup("x"), Some(NodeId(1)));
        assert_eq!(root.lookup("y"), None);
        assert_eq!(root.enclosing_function(), None);
    }

    #[test]
    fn plain_children_keep_the_enclosing_function() {
        let root = Scope::root().function_child(NodeId(7));
        assert_eq!(root.child().enclosing_function(), Some(NodeId(7)));
    }
}
