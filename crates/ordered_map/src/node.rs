//! Read-only queries shared by every tree engine.
//!
//! The engines differ only in how they restructure on mutation; searching,
//! order statistics and traversal read the same `key / left / right / size`
//! shape, so they are written once against [`TreeNode`].

use std::cmp::Ordering;

pub(crate) trait TreeNode: Sized {
    type Key: Ord;
    type Value;

    fn key(&self) -> &Self::Key;
    fn value(&self) -> &Self::Value;
    fn left(&self) -> Option<&Self>;
    fn right(&self) -> Option<&Self>;

    /// Number of nodes in the subtree rooted here, including `self`.
    fn size(&self) -> usize;
}

pub(crate) fn size<N: TreeNode>(node: Option<&N>) -> usize {
    node.map_or(0, N::size)
}

/// Longest root-to-leaf path counted in nodes; 0 for an empty subtree.
pub(crate) fn height<N: TreeNode>(node: Option<&N>) -> usize {
    match node {
        None => 0,
        Some(n) => 1 + height(n.left()).max(height(n.right())),
    }
}

pub(crate) fn find<'a, N: TreeNode>(root: Option<&'a N>, key: &N::Key) -> Option<&'a N> {
    let mut cur = root;
    while let Some(node) = cur {
        match key.cmp(node.key()) {
            Ordering::Less => cur = node.left(),
            Ordering::Greater => cur = node.right(),
            Ordering::Equal => return Some(node),
        }
    }
    None
}

pub(crate) fn first<N: TreeNode>(root: Option<&N>) -> Option<&N> {
    let mut node = root?;
    while let Some(left) = node.left() {
        node = left;
    }
    Some(node)
}

pub(crate) fn last<N: TreeNode>(root: Option<&N>) -> Option<&N> {
    let mut node = root?;
    while let Some(right) = node.right() {
        node = right;
    }
    Some(node)
}

/// Largest key `<= key`.
pub(crate) fn floor<'a, N: TreeNode>(root: Option<&'a N>, key: &N::Key) -> Option<&'a N> {
    let mut cur = root;
    let mut candidate = None;
    while let Some(node) = cur {
        match key.cmp(node.key()) {
            Ordering::Less => cur = node.left(),
            Ordering::Equal => return Some(node),
            Ordering::Greater => {
                candidate = Some(node);
                cur = node.right();
            }
        }
    }
    candidate
}

/// Smallest key `>= key`.
pub(crate) fn ceiling<'a, N: TreeNode>(root: Option<&'a N>, key: &N::Key) -> Option<&'a N> {
    let mut cur = root;
    let mut candidate = None;
    while let Some(node) = cur {
        match key.cmp(node.key()) {
            Ordering::Greater => cur = node.right(),
            Ordering::Equal => return Some(node),
            Ordering::Less => {
                candidate = Some(node);
                cur = node.left();
            }
        }
    }
    candidate
}

/// The node holding the `rank`-th smallest key (0-indexed).
pub(crate) fn select<N: TreeNode>(root: Option<&N>, rank: usize) -> Option<&N> {
    let mut cur = root;
    let mut rank = rank;
    while let Some(node) = cur {
        let left_size = size(node.left());
        match rank.cmp(&left_size) {
            Ordering::Less => cur = node.left(),
            Ordering::Equal => return Some(node),
            Ordering::Greater => {
                rank -= left_size + 1;
                cur = node.right();
            }
        }
    }
    None
}

/// Number of keys strictly less than `key`.
pub(crate) fn rank<N: TreeNode>(root: Option<&N>, key: &N::Key) -> usize {
    let mut cur = root;
    let mut rank = 0;
    while let Some(node) = cur {
        match key.cmp(node.key()) {
            Ordering::Less => cur = node.left(),
            Ordering::Greater => {
                rank += 1 + size(node.left());
                cur = node.right();
            }
            Ordering::Equal => return rank + size(node.left()),
        }
    }
    rank
}

/// In-order traversal with an explicit stack of pending ancestors.
pub(crate) struct InOrder<'a, N> {
    stack: Vec<&'a N>,
}

impl<'a, N: TreeNode> InOrder<'a, N> {
    pub(crate) fn new(root: Option<&'a N>) -> Self {
        let mut iter = Self { stack: Vec::new() };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut node: Option<&'a N>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left();
        }
    }
}

impl<'a, N: TreeNode> Iterator for InOrder<'a, N> {
    type Item = (&'a N::Key, &'a N::Value);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right());
        Some((node.key(), node.value()))
    }
}
