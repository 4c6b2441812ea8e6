//! Caller/callee tree nodes.
//!
//! A node identifies one (class, method) pair. Recursive and mutually
//! recursive calls are expected in these trees and appear as repeated
//! subtrees, so any traversal must bound its depth explicitly instead of
//! relying on the structure to terminate.

/// One (class, method) pair with its discovered callees.
///
/// Equality is identity-pair equality only: `line_count` and `children`
/// never participate, so the same logical declaration discovered through
/// different call paths compares equal.
#[derive(Debug, Clone)]
pub struct CallHierarchyNode {
    pub class_name: String,
    pub method_name: String,
    pub line_count: usize,
    pub children: Vec<CallHierarchyNode>,
}

impl CallHierarchyNode {
    pub fn new(
        class_name: impl Into<String>,
        method_name: impl Into<String>,
        line_count: usize,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
            line_count,
            children: Vec::new(),
        }
    }

    /// Append a callee in discovery order. Duplicates are kept; the report
    /// layer emits calls exactly as often as they occur.
    pub fn attach(&mut self, child: CallHierarchyNode) {
        self.children.push(child);
    }

    /// Pre-order walk, visiting at most `max_depth` levels below this node.
    /// The bound is what makes walking cyclic call structures safe.
    pub fn walk<F: FnMut(&CallHierarchyNode, usize)>(&self, max_depth: usize, visit: &mut F) {
        self.walk_at(0, max_depth, visit);
    }

    fn walk_at<F: FnMut(&CallHierarchyNode, usize)>(
        &self,
        depth: usize,
        max_depth: usize,
        visit: &mut F,
    ) {
        visit(self, depth);
        if depth >= max_depth {
            return;
        }
        for child in &self.children {
            child.walk_at(depth + 1, max_depth, visit);
        }
    }
}

impl PartialEq for CallHierarchyNode {
    fn eq(&self, other: &Self) -> bool {
        self.class_name == other.class_name && self.method_name == other.method_name
    }
}

impl Eq for CallHierarchyNode {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_line_count_and_children() {
        let a = CallHierarchyNode::new("Ns.Widget", "Render", 10);
        let mut b = CallHierarchyNode::new("Ns.Widget", "Render", 99);
        b.attach(CallHierarchyNode::new("Ns.Other", "Helper", 3));

        assert_eq!(a, b);
    }

    #[test]
    fn equality_is_reflexive_symmetric_transitive() {
        let a = CallHierarchyNode::new("C", "M", 1);
        let b = CallHierarchyNode::new("C", "M", 2);
        let c = CallHierarchyNode::new("C", "M", 3);

        assert_eq!(a, a);
        assert_eq!(a, b);
        assert_eq!(b, a);
        assert_eq!(b, c);
        assert_eq!(a, c);
    }

    #[test]
    fn distinct_pairs_are_unequal() {
        let a = CallHierarchyNode::new("C", "M", 1);
        assert_ne!(a, CallHierarchyNode::new("C", "Other", 1));
        assert_ne!(a, CallHierarchyNode::new("Other", "M", 1));
    }

    #[test]
    fn attach_preserves_discovery_order() {
        let mut root = CallHierarchyNode::new("C", "M", 5);
        root.attach(CallHierarchyNode::new("C", "First", 0));
        root.attach(CallHierarchyNode::new("C", "Second", 0));
        root.attach(CallHierarchyNode::new("C", "First", 0));

        let names: Vec<&str> = root.children.iter().map(|c| c.method_name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second", "First"]);
    }

    #[test]
    fn bounded_walk_terminates_on_self_referential_shape() {
        // A calls B calls A, represented as a repeated subtree.
        let mut a = CallHierarchyNode::new("C", "A", 2);
        let mut b = CallHierarchyNode::new("C", "B", 2);
        b.attach(CallHierarchyNode::new("C", "A", 2));
        a.attach(b);

        let mut visited = Vec::new();
        a.walk(1, &mut |node, depth| {
            visited.push((node.method_name.clone(), depth));
        });

        // Depth bound of 1 stops before the repeated A.
        assert_eq!(
            visited,
            vec![("A".to_string(), 0), ("B".to_string(), 1)]
        );
    }
}
