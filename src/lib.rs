//! An ordered key/value tree whose balancing strategy is a pluggable
//! policy, shipped with an AVL variant.
//!
//! The engine ([`Tree`]) implements search, insert, remove, rotations
//! and ordered traversal; everything beyond the search order invariant
//! is delegated to a [`Policy`] through a small set of hooks. The
//! [`Avl`] policy keeps the tree height-balanced; [`Unbalanced`] keeps
//! nothing and yields a plain binary search tree.
//!
//! ```
//! use plytree::AvlTree;
//!
//! let mut tree = AvlTree::new();
//! tree.insert(1, "one");
//! tree.insert(2, "two");
//! tree.insert(3, "three");
//! assert_eq!(tree.get(&2), Some(&"two"));
//! assert_eq!(tree.remove(&2), Some("two"));
//! assert!(tree.get(&2).is_none());
//!
//! for (k, v) in &tree {
//!     println!("{k} => {v}");
//! }
//! ```
//!
//! Besides borrowing iterators, traversal is available through a
//! detachable [`Cursor`] in the style of a database cursor. A tree
//! refuses to be released while cursors are attached:
//!
//! ```
//! use plytree::{AvlTree, Cursor};
//!
//! let mut tree = AvlTree::new();
//! tree.insert(1, "one");
//!
//! let mut cursor = Cursor::new();
//! cursor.attach(&mut tree);
//! assert_eq!(cursor.next(&tree), Some(&"one"));
//! assert_eq!(cursor.next(&tree), None);
//!
//! let mut tree = tree.try_free().unwrap_err(); // still attached
//! cursor.detach(&mut tree);
//! assert!(tree.try_free().is_ok());
//! ```

mod arena;
mod avl;
mod cursor;
mod iter;
mod policy;
mod tree;

pub use arena::NodeId;
pub use avl::Avl;
pub use cursor::Cursor;
pub use iter::Iter;
pub use policy::{Policy, Unbalanced};
pub use tree::{AvlTree, Structure, Tree, UnbalancedTree};
