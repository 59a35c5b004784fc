mod avl;
mod bst;
mod rb;

pub use avl::AvlTreeMap;
pub use bst::BstMap;
pub use rb::RbTreeMap;
