//! Structural predicates common to every engine.
//!
//! Each predicate walks the tree read-only and reports independently, so a
//! failing map can say which invariant broke. Engine-specific balance
//! predicates live next to the engine and append to the same list.

use crate::error::Violation;
use crate::node::{self, TreeNode};

/// Runs the order, size and rank predicates against a tree holding `len`
/// entries.
pub(crate) fn common<N: TreeNode>(root: Option<&N>, len: usize) -> Vec<Violation> {
    let mut violations = Vec::new();
    if !is_bst(root, None, None) {
        violations.push(Violation::SymmetricOrder);
    }
    if node::size(root) != len || !is_size_consistent(root) {
        violations.push(Violation::SubtreeSize);
    }
    if !is_rank_consistent(root, len) {
        violations.push(Violation::Rank);
    }
    violations
}

/// Every key lies strictly between `min` and `max`. Strictness also rules out
/// a node being reachable twice.
fn is_bst<N: TreeNode>(node: Option<&N>, min: Option<&N::Key>, max: Option<&N::Key>) -> bool {
    let Some(node) = node else {
        return true;
    };
    if min.is_some_and(|min| node.key() <= min) || max.is_some_and(|max| node.key() >= max) {
        return false;
    }
    is_bst(node.left(), min, Some(node.key())) && is_bst(node.right(), Some(node.key()), max)
}

fn is_size_consistent<N: TreeNode>(node: Option<&N>) -> bool {
    let Some(node) = node else {
        return true;
    };
    node.size() == 1 + node::size(node.left()) + node::size(node.right())
        && is_size_consistent(node.left())
        && is_size_consistent(node.right())
}

fn is_rank_consistent<N: TreeNode>(root: Option<&N>, len: usize) -> bool {
    (0..len).all(|i| node::select(root, i).is_some_and(|n| node::rank(root, n.key()) == i))
}
