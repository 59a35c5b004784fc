use crate::check;
use crate::node::{self, InOrder, TreeNode};
use crate::{EmptyTreeError, IntegrityError, OrderedMap};

/// Unbalanced binary search tree.
///
/// Shape follows insertion order, so sorted input degenerates into a list.
/// Subtree sizes are not stored; `rank` and `select` recount them on demand.
/// On a degenerate shape that makes each of them linear per level, and
/// `check` (which pairs `select` with `rank` for every index) roughly cubic.
pub struct BstMap<K: Ord, V> {
    root: Link<K, V>,
    len: usize,
}

type Link<K, V> = Option<Box<Node<K, V>>>;

struct Node<K, V> {
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
        }
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
        1 + node::size(self.left()) + node::size(self.right())
    }
}

impl<K: Ord, V> BstMap<K, V> {
    fn insert_node(root: Link<K, V>, key: K, value: V) -> (Link<K, V>, Option<V>) {
        let Some(mut node) = root else {
            return (Some(Box::new(Node::new(key, value))), None);
        };

        let old = match key.cmp(&node.key) {
            std::cmp::Ordering::Less => {
                let (left, old) = Self::insert_node(node.left.take(), key, value);
                node.left = left;
                old
            }
            std::cmp::Ordering::Greater => {
                let (right, old) = Self::insert_node(node.right.take(), key, value);
                node.right = right;
                old
            }
            std::cmp::Ordering::Equal => Some(std::mem::replace(&mut node.value, value)),
        };
        (Some(node), old)
    }

    fn pop_min(mut node: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
        let Some(left) = node.left.take() else {
            let right = node.right.take();
            return (right, node);
        };
        let (new_left, min_node) = Self::pop_min(left);
        node.left = new_left;
        (Some(node), min_node)
    }

    fn pop_max(mut node: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
        let Some(right) = node.right.take() else {
            let left = node.left.take();
            return (left, node);
        };
        let (new_right, max_node) = Self::pop_max(right);
        node.right = new_right;
        (Some(node), max_node)
    }

    /// Hibbard deletion: a node with two children takes its successor's entry
    /// and the successor is unlinked from the right subtree instead.
    fn remove_node(root: Link<K, V>, key: &K) -> (Link<K, V>, Option<V>) {
        let Some(mut node) = root else {
            return (None, None);
        };

        match key.cmp(&node.key) {
            std::cmp::Ordering::Less => {
                let (left, removed) = Self::remove_node(node.left.take(), key);
                node.left = left;
                (Some(node), removed)
            }
            std::cmp::Ordering::Greater => {
                let (right, removed) = Self::remove_node(node.right.take(), key);
                node.right = right;
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
                    (Some(node), Some(removed))
                }
            },
        }
    }

    fn take_entry(node: Box<Node<K, V>>) -> (K, V) {
        let Node { key, value, .. } = *node;
        (key, value)
    }
}

impl<K: Ord, V> Default for BstMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> OrderedMap for BstMap<K, V> {
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
        let (root, old) = Self::insert_node(self.root.take(), key, value);
        self.root = root;
        if old.is_none() {
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
        node::height(self.root.as_deref())
    }

    fn clear(&mut self) {
        log::debug!("releasing {} bst nodes", self.len);
        self.root = None;
        self.len = 0;
    }

    fn iter(&self) -> impl Iterator<Item = (&Self::Key, &Self::Value)> {
        InOrder::new(self.root.as_deref())
    }

    fn verify(&self) -> Result<(), IntegrityError> {
        IntegrityError::check(check::common(self.root.as_deref(), self.len))
    }
}
