use crate::check;
use crate::error::Violation;
use crate::node::{self, InOrder, TreeNode};
use crate::{EmptyTreeError, IntegrityError, OrderedMap};

/// Red-black tree map.
///
/// Left-leaning variant: a node's color is the color of the link from its
/// parent, red links only lean left, and the root is always black. Every node
/// stores its subtree size, and the map's length is the root's size.
pub struct RbTreeMap<K: Ord, V> {
    root: Link<K, V>,
}

type Link<K, V> = Option<Box<Node<K, V>>>;

struct Node<K, V> {
    key: K,
    value: V,
    red: bool,
    size: usize,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V, red: bool) -> Self {
        Self {
            key,
            value,
            red,
            size: 1,
            left: None,
            right: None,
        }
    }

    fn is_red(node: &Link<K, V>) -> bool {
        node.as_ref().map(|n| n.red).unwrap_or(false)
    }

    fn count(node: &Link<K, V>) -> usize {
        node.as_ref().map(|n| n.size).unwrap_or(0)
    }

    fn left_is_red(node: &Link<K, V>) -> bool {
        node.as_ref().is_some_and(|n| Self::is_red(&n.left))
    }

    fn recalc(&mut self) {
        self.size = 1 + Self::count(&self.left) + Self::count(&self.right);
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

impl<K: Ord, V> RbTreeMap<K, V> {
    // make a right-leaning link lean to the left
    fn rotate_left(mut h: Box<Node<K, V>>) -> Box<Node<K, V>> {
        let Some(mut x) = h.right.take() else {
            return h;
        };
        h.right = x.left.take();
        x.red = h.red;
        x.size = h.size;
        h.red = true;
        h.recalc();
        x.left = Some(h);
        x
    }

    // make a left-leaning link lean to the right
    fn rotate_right(mut h: Box<Node<K, V>>) -> Box<Node<K, V>> {
        let Some(mut x) = h.left.take() else {
            return h;
        };
        h.left = x.right.take();
        x.red = h.red;
        x.size = h.size;
        h.red = true;
        h.recalc();
        x.right = Some(h);
        x
    }

    fn flip_colors(h: &mut Node<K, V>) {
        h.red = !h.red;
        if let Some(left) = h.left.as_deref_mut() {
            left.red = !left.red;
        }
        if let Some(right) = h.right.as_deref_mut() {
            right.red = !right.red;
        }
    }

    /// Restores the left-leaning shape on the way back up and refreshes the
    /// subtree size.
    fn balance(mut h: Box<Node<K, V>>) -> Box<Node<K, V>> {
        if Node::is_red(&h.right) && !Node::is_red(&h.left) {
            h = Self::rotate_left(h);
        }
        if Node::is_red(&h.left) && Node::left_is_red(&h.left) {
            h = Self::rotate_right(h);
        }
        if Node::is_red(&h.left) && Node::is_red(&h.right) {
            Self::flip_colors(&mut h);
        }
        h.recalc();
        h
    }

    // Assuming h is red and both h.left and h.left.left are black,
    // make h.left or one of its children red.
    fn move_red_left(mut h: Box<Node<K, V>>) -> Box<Node<K, V>> {
        Self::flip_colors(&mut h);
        if Node::left_is_red(&h.right) {
            h.right = h.right.take().map(Self::rotate_right);
            h = Self::rotate_left(h);
            Self::flip_colors(&mut h);
        }
        h
    }

    // Assuming h is red and both h.right and h.right.left are black,
    // make h.right or one of its children red.
    fn move_red_right(mut h: Box<Node<K, V>>) -> Box<Node<K, V>> {
        Self::flip_colors(&mut h);
        if Node::left_is_red(&h.left) {
            h = Self::rotate_right(h);
            Self::flip_colors(&mut h);
        }
        h
    }

    fn insert_node(h: Link<K, V>, key: K, value: V) -> (Link<K, V>, Option<V>) {
        let Some(mut h) = h else {
            return (Some(Box::new(Node::new(key, value, true))), None);
        };

        let old = match key.cmp(&h.key) {
            std::cmp::Ordering::Less => {
                let (left, old) = Self::insert_node(h.left.take(), key, value);
                h.left = left;
                old
            }
            std::cmp::Ordering::Greater => {
                let (right, old) = Self::insert_node(h.right.take(), key, value);
                h.right = right;
                old
            }
            std::cmp::Ordering::Equal => Some(std::mem::replace(&mut h.value, value)),
        };

        (Some(Self::balance(h)), old)
    }

    fn delete_min(mut h: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
        if h.left.is_none() {
            let right = h.right.take();
            return (right, h);
        }
        if !Node::is_red(&h.left) && !Node::left_is_red(&h.left) {
            h = Self::move_red_left(h);
        }
        let left = h.left.take().expect("move_red_left keeps a left child");
        let (new_left, min_node) = Self::delete_min(left);
        h.left = new_left;
        (Some(Self::balance(h)), min_node)
    }

    fn delete_max(mut h: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
        if Node::is_red(&h.left) {
            h = Self::rotate_right(h);
        }
        if h.right.is_none() {
            let left = h.left.take();
            return (left, h);
        }
        if !Node::is_red(&h.right) && !Node::left_is_red(&h.right) {
            h = Self::move_red_right(h);
        }
        let right = h.right.take().expect("move_red_right keeps a right child");
        let (new_right, max_node) = Self::delete_max(right);
        h.right = new_right;
        (Some(Self::balance(h)), max_node)
    }

    /// Removes `key` from the subtree at `h`. The caller guarantees `key` is
    /// present, which is what lets each step push a red link ahead of the
    /// descent.
    fn remove_node(mut h: Box<Node<K, V>>, key: &K) -> (Link<K, V>, Option<V>) {
        let removed = if *key < h.key {
            if !Node::is_red(&h.left) && !Node::left_is_red(&h.left) {
                h = Self::move_red_left(h);
            }
            let (new_left, removed) = match h.left.take() {
                Some(left) => Self::remove_node(left, key),
                None => (None, None),
            };
            h.left = new_left;
            removed
        } else {
            if Node::is_red(&h.left) {
                h = Self::rotate_right(h);
            }
            if *key == h.key && h.right.is_none() {
                // no right child and a black left link: the left link is empty too
                let Node { left, value, .. } = *h;
                return (left, Some(value));
            }
            if h.right.is_some() && !Node::is_red(&h.right) && !Node::left_is_red(&h.right) {
                h = Self::move_red_right(h);
            }
            if *key == h.key {
                match h.right.take() {
                    Some(right) => {
                        let (new_right, successor) = Self::delete_min(right);
                        h.right = new_right;
                        let Node { key, value, .. } = *successor;
                        h.key = key;
                        Some(std::mem::replace(&mut h.value, value))
                    }
                    None => None,
                }
            } else {
                let (new_right, removed) = match h.right.take() {
                    Some(right) => Self::remove_node(right, key),
                    None => (None, None),
                };
                h.right = new_right;
                removed
            }
        };

        (Some(Self::balance(h)), removed)
    }

    /// Reddens the root when both its children are black so the removal
    /// descent starts from a 3-node.
    fn prepare_root_for_removal(&mut self) {
        if let Some(root) = self.root.as_deref_mut()
            && !Node::is_red(&root.left)
            && !Node::is_red(&root.right)
        {
            root.red = true;
        }
    }

    fn blacken_root(&mut self) {
        if let Some(root) = self.root.as_deref_mut() {
            root.red = false;
        }
    }

    fn take_entry(node: Box<Node<K, V>>) -> (K, V) {
        let Node { key, value, .. } = *node;
        (key, value)
    }

    /// No red right links, and no two red links in a row below the root.
    fn is_two_three(node: &Link<K, V>, is_root: bool) -> bool {
        let Some(n) = node else {
            return true;
        };
        if Node::is_red(&n.right) {
            return false;
        }
        if !is_root && n.red && Node::is_red(&n.left) {
            return false;
        }
        Self::is_two_three(&n.left, false) && Self::is_two_three(&n.right, false)
    }

    /// Every root-to-leaf path crosses `black` black links.
    fn is_black_balanced(node: &Link<K, V>, black: usize) -> bool {
        let Some(n) = node else {
            return black == 0;
        };
        let Some(black) = (if n.red { Some(black) } else { black.checked_sub(1) }) else {
            return false;
        };
        Self::is_black_balanced(&n.left, black) && Self::is_black_balanced(&n.right, black)
    }

    fn black_height_along_left_spine(&self) -> usize {
        let mut black = 0;
        let mut cur = self.root.as_deref();
        while let Some(n) = cur {
            if !n.red {
                black += 1;
            }
            cur = n.left.as_deref();
        }
        black
    }
}

impl<K: Ord, V> Default for RbTreeMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> OrderedMap for RbTreeMap<K, V> {
    type Key = K;
    type Value = V;

    fn new() -> Self {
        Self { root: None }
    }

    fn len(&self) -> usize {
        Node::count(&self.root)
    }

    fn get(&self, key: &Self::Key) -> Option<&Self::Value> {
        node::find(self.root.as_deref(), key).map(|n| &n.value)
    }

    fn insert(&mut self, key: Self::Key, value: Self::Value) -> Option<Self::Value> {
        let (root, old) = Self::insert_node(self.root.take(), key, value);
        self.root = root;
        self.blacken_root();
        old
    }

    fn remove(&mut self, key: &Self::Key) -> Option<Self::Value> {
        if !self.contains_key(key) {
            return None;
        }
        self.prepare_root_for_removal();
        let removed = match self.root.take() {
            Some(root) => {
                let (root, removed) = Self::remove_node(root, key);
                self.root = root;
                removed
            }
            None => None,
        };
        self.blacken_root();
        removed
    }

    fn remove_min(&mut self) -> Result<(Self::Key, Self::Value), EmptyTreeError> {
        self.prepare_root_for_removal();
        let root = self.root.take().ok_or(EmptyTreeError)?;
        let (root, min_node) = Self::delete_min(root);
        self.root = root;
        self.blacken_root();
        Ok(Self::take_entry(min_node))
    }

    fn remove_max(&mut self) -> Result<(Self::Key, Self::Value), EmptyTreeError> {
        self.prepare_root_for_removal();
        let root = self.root.take().ok_or(EmptyTreeError)?;
        let (root, max_node) = Self::delete_max(root);
        self.root = root;
        self.blacken_root();
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
        log::debug!("releasing {} red-black nodes", self.len());
        self.root = None;
    }

    fn iter(&self) -> impl Iterator<Item = (&Self::Key, &Self::Value)> {
        InOrder::new(self.root.as_deref())
    }

    fn verify(&self) -> Result<(), IntegrityError> {
        let mut violations = check::common(self.root.as_deref(), self.len());
        if !Self::is_two_three(&self.root, true) {
            violations.push(Violation::NotTwoThree);
        }
        if !Self::is_black_balanced(&self.root, self.black_height_along_left_spine()) {
            violations.push(Violation::BlackBalance);
        }
        if Node::is_red(&self.root) {
            violations.push(Violation::RedRoot);
        }
        IntegrityError::check(violations)
    }
}
