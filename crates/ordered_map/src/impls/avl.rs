use crate::check;
use crate::error::Violation;
use crate::node::{self, InOrder, TreeNode};
use crate::{EmptyTreeError, IntegrityError, OrderedMap};

/// Height-balanced binary search tree.
///
/// Every node stores its height and subtree size; after each structural change
/// the ancestors on the mutated path are rebalanced bottom-up.
pub struct AvlTreeMap<K: Ord, V> {
    root: Link<K, V>,
    len: usize,
}

type Link<K, V> = Option<Box<Node<K, V>>>;

struct Node<K, V> {
    key: K,
    value: V,
    height: i16,
    size: usize,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            height: 1,
            size: 1,
            left: None,
            right: None,
        }
    }

    fn height(node: &Link<K, V>) -> i16 {
        node.as_ref().map(|n| n.height).unwrap_or(0)
    }

    fn count(node: &Link<K, V>) -> usize {
        node.as_ref().map(|n| n.size).unwrap_or(0)
    }

    fn recalc(&mut self) {
        let hl = Self::height(&self.left);
        let hr = Self::height(&self.right);
        self.height = 1 + hl.max(hr);
        self.size = 1 + Self::count(&self.left) + Self::count(&self.right);
    }

    fn balance_factor(&self) -> i16 {
        Self::height(&self.left) - Self::height(&self.right)
    }
}

impl<K: Ord, V> TreeNode for Node<K, V> {
    type Key = K;
    type Value = V;

    fn key(&self) -> &K {
        &self.key
    }

    fn value(&self) -> &V {
        &self.value
    }

    fn left(&self) -> Option<&Self> {
        self.left.as_deref()
    }

    fn right(&self) -> Option<&Self> {
        self.right.as_deref()
    }

    fn size(&self) -> usize {
        self.size
    }
}

impl<K: Ord, V> AvlTreeMap<K, V> {
    //        y                x
    //       / \              / \
    //      x   T3   --->   T1   y
    //     / \                  / \
    //    T1  T2              T2  T3
    fn rotate_right(mut root: Box<Node<K, V>>) -> Box<Node<K, V>> {
        let mut left = match root.left.take() {
            Some(node) => node,
            None => return root,
        };
        root.left = left.right.take();
        root.recalc();
        left.right = Some(root);
        left.recalc();
        left
    }

    //      y                    x
    //     / \                  / \
    //   T1   x      --->      y   T3
    //       / \              / \
    //      T2  T3          T1  T2
    fn rotate_left(mut root: Box<Node<K, V>>) -> Box<Node<K, V>> {
        let mut right = match root.right.take() {
            Some(node) => node,
            None => return root,
        };
        root.right = right.left.take();
        root.recalc();
        right.left = Some(root);
        right.recalc();
        right
    }

    fn rebalance(mut root: Box<Node<K, V>>) -> Box<Node<K, V>> {
        root.recalc();
        let bf = root.balance_factor();
        if bf > 1 {
            if let Some(left) = root.left.take() {
                // left-right: straighten the left child first
                root.left = Some(if left.balance_factor() < 0 {
                    Self::rotate_left(left)
                } else {
                    left
                });
            }
            return Self::rotate_right(root);
        }
        if bf < -1 {
            if let Some(right) = root.right.take() {
                root.right = Some(if right.balance_factor() > 0 {
                    Self::rotate_right(right)
                } else {
                    right
                });
            }
            return Self::rotate_left(root);
        }
        root
    }

    fn pop_min(mut node: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
        let Some(left) = node.left.take() else {
            let right = node.right.take();
            return (right, node);
        };
        let (new_left, min_node) = Self::pop_min(left);
        node.left = new_left;
        (Some(Self::rebalance(node)), min_node)
    }

    fn pop_max(mut node: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
        let Some(right) = node.right.take() else {
            let left = node.left.take();
            return (left, node);
        };
        let (new_right, max_node) = Self::pop_max(right);
        node.right = new_right;
        (Some(Self::rebalance(node)), max_node)
    }

    fn insert_node(root: Link<K, V>, key: K, value: V) -> (Link<K, V>, Option<V>, bool) {
        let Some(mut node) = root else {
            return (Some(Box::new(Node::new(key, value))), None, true);
        };

        match key.cmp(&node.key) {
            std::cmp::Ordering::Less => {
                let (left, old, inserted) = Self::insert_node(node.left.take(), key, value);
                node.left = left;
                let node = Self::rebalance(node);
                (Some(node), old, inserted)
            }
            std::cmp::Ordering::Greater => {
                let (right, old, inserted) = Self::insert_node(node.right.take(), key, value);
                node.right = right;
                let node = Self::rebalance(node);
                (Some(node), old, inserted)
            }
            std::cmp::Ordering::Equal => {
                let old = std::mem::replace(&mut node.value, value);
                (Some(node), Some(old), false)
            }
        }
    }

    fn remove_node(root: Link<K, V>, key: &K) -> (Link<K, V>, Option<V>) {
        let Some(mut node) = root else {
            return (None, None);
        };

        match key.cmp(&node.key) {
            std::cmp::Ordering::Less => {
                let (left, removed) = Self::remove_node(node.left.take(), key);
                node.left = left;
                let node = Self::rebalance(node);
                (Some(node), removed)
            }
            std::cmp::Ordering::Greater => {
                let (right, removed) = Self::remove_node(node.right.take(), key);
                node.right = right;
                let node = Self::rebalance(node);
                (Some(node), removed)
            }
            std::cmp::Ordering::Equal => match (node.left.take(), node.right.take()) {
                (None, child) | (child, None) => (child, Some(node.value)),
                (Some(left), Some(right)) => {
                    let (right, successor) = Self::pop_min(right);
                    let Node { key, value, .. } = *successor;
                    node.key = key;
                    let removed = std::mem::replace(&mut node.value, value);
                    node.left = Some(left);
                    node.right = right;
                    (Some(Self::rebalance(node)), Some(removed))
                }
            },
        }
    }

    fn take_entry(node: Box<Node<K, V>>) -> (K, V) {
        let Node { key, value, .. } = *node;
        (key, value)
    }

    /// Recomputed height of `node`. The whole subtree is walked, and each kind
    /// of height violation is recorded in `found` at most once.
    fn audit_height(node: &Link<K, V>, found: &mut Vec<Violation>) -> i16 {
        let Some(n) = node else {
            return 0;
        };
        let hl = Self::audit_height(&n.left, found);
        let hr = Self::audit_height(&n.right, found);
        if (hl - hr).abs() > 1 && !found.contains(&Violation::HeightBalance) {
            found.push(Violation::HeightBalance);
        }
        let height = 1 + hl.max(hr);
        if height != n.height && !found.contains(&Violation::StaleHeight) {
            found.push(Violation::StaleHeight);
        }
        height
    }
}

impl<K: Ord, V> Default for AvlTreeMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> OrderedMap for AvlTreeMap<K, V> {
    type Key = K;
    type Value = V;

    fn new() -> Self {
        Self { root: None, len: 0 }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn get(&self, key: &Self::Key) -> Option<&Self::Value> {
        node::find(self.root.as_deref(), key).map(|n| &n.value)
    }

    fn insert(&mut self, key: Self::Key, value: Self::Value) -> Option<Self::Value> {
        let (root, old, inserted) = Self::insert_node(self.root.take(), key, value);
        self.root = root;
        if inserted {
            self.len += 1;
        }
        old
    }

    fn remove(&mut self, key: &Self::Key) -> Option<Self::Value> {
        let (root, removed) = Self::remove_node(self.root.take(), key);
        self.root = root;
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    fn remove_min(&mut self) -> Result<(Self::Key, Self::Value), EmptyTreeError> {
        let root = self.root.take().ok_or(EmptyTreeError)?;
        let (root, min_node) = Self::pop_min(root);
        self.root = root;
        self.len -= 1;
        Ok(Self::take_entry(min_node))
    }

    fn remove_max(&mut self) -> Result<(Self::Key, Self::Value), EmptyTreeError> {
        let root = self.root.take().ok_or(EmptyTreeError)?;
        let (root, max_node) = Self::pop_max(root);
        self.root = root;
        self.len -= 1;
        Ok(Self::take_entry(max_node))
    }

    fn min(&self) -> Option<&Self::Key> {
        node::first(self.root.as_deref()).map(|n| &n.key)
    }

    fn max(&self) -> Option<&Self::Key> {
        node::last(self.root.as_deref()).map(|n| &n.key)
    }

    fn floor(&self, key: &Self::Key) -> Option<&Self::Key> {
        node::floor(self.root.as_deref(), key).map(|n| &n.key)
    }

    fn ceiling(&self, key: &Self::Key) -> Option<&Self::Key> {
        node::ceiling(self.root.as_deref(), key).map(|n| &n.key)
    }

    fn select(&self, rank: usize) -> Option<&Self::Key> {
        node::select(self.root.as_deref(), rank).map(|n| &n.key)
    }

    fn rank(&self, key: &Self::Key) -> usize {
        node::rank(self.root.as_deref(), key)
    }

    fn height(&self) -> usize {
        Node::height(&self.root) as usize
    }

    fn clear(&mut self) {
        log::debug!("releasing {} avl nodes", self.len);
        self.root = None;
        self.len = 0;
    }

    fn iter(&self) -> impl Iterator<Item = (&Self::Key, &Self::Value)> {
        InOrder::new(self.root.as_deref())
    }

    fn verify(&self) -> Result<(), IntegrityError> {
        let mut violations = check::common(self.root.as_deref(), self.len);
        Self::audit_height(&self.root, &mut violations);
        IntegrityError::check(violations)
    }
}
