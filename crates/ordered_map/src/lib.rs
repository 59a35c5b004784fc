mod check;
mod error;
mod node;

pub mod impls;

pub use error::{EmptyTreeError, IntegrityError, Violation};
pub use impls::{AvlTreeMap, BstMap, RbTreeMap};

/// Ordered symbol table with order statistics.
///
/// - Keys are unique.
/// - `insert` overwrites the existing value and returns the old one.
/// - `floor` / `ceiling` return the largest key `<= key` / smallest key `>= key`.
/// - `rank` counts keys strictly less than `key`; `select` is its inverse.
/// - Queries that find nothing return `None`; only `remove_min` /
///   `remove_max` fail, with [`EmptyTreeError`].
pub trait OrderedMap {
    type Key: Ord;
    type Value;

    fn new() -> Self;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains_key(&self, key: &Self::Key) -> bool {
        self.get(key).is_some()
    }

    fn get(&self, key: &Self::Key) -> Option<&Self::Value>;

    fn insert(&mut self, key: Self::Key, value: Self::Value) -> Option<Self::Value>;

    /// Removes `key`, returning its value. A missing key leaves the map untouched.
    fn remove(&mut self, key: &Self::Key) -> Option<Self::Value>;

    fn remove_min(&mut self) -> Result<(Self::Key, Self::Value), EmptyTreeError>;

    fn remove_max(&mut self) -> Result<(Self::Key, Self::Value), EmptyTreeError>;

    fn min(&self) -> Option<&Self::Key>;

    fn max(&self) -> Option<&Self::Key>;

    fn floor(&self, key: &Self::Key) -> Option<&Self::Key>;

    fn ceiling(&self, key: &Self::Key) -> Option<&Self::Key>;

    /// The `rank`-th smallest key, 0-indexed. `None` when `rank >= len()`.
    fn select(&self, rank: usize) -> Option<&Self::Key>;

    fn rank(&self, key: &Self::Key) -> usize;

    /// Nodes on the longest root-to-leaf path; 0 for an empty map.
    fn height(&self) -> usize;

    /// Drops every entry.
    fn clear(&mut self);

    /// Entries in ascending key order.
    fn iter(&self) -> impl Iterator<Item = (&Self::Key, &Self::Value)>;

    /// Runs every structural predicate and collects the ones that fail.
    fn verify(&self) -> Result<(), IntegrityError>;

    /// [`verify`](Self::verify) as a boolean, logging each failed predicate.
    fn check(&self) -> bool {
        match self.verify() {
            Ok(()) => true,
            Err(err) => {
                for violation in err.violations() {
                    log::warn!("{violation}");
                }
                false
            }
        }
    }

    /// Number of keys in `[lo, hi]`.
    fn range_count(&self, lo: &Self::Key, hi: &Self::Key) -> usize {
        if lo > hi {
            return 0;
        }
        let span = self.rank(hi) - self.rank(lo);
        if self.contains_key(hi) { span + 1 } else { span }
    }

    fn extend<I: IntoIterator<Item = (Self::Key, Self::Value)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}
