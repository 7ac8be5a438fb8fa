use std::cmp;
use std::fmt;

use crate::arena::NodeId;
use crate::policy::Policy;
use crate::tree::Tree;

/// The AVL balancing policy: every node stores its height and no two
/// sibling subtrees may differ in height by more than one.
///
/// After each insert or remove the policy walks from the change point up
/// to the root, recomputing heights and rotating where the balance factor
/// leaves `[-1, 1]`. The walk touches one node per level, so restoring
/// the invariant costs O(log n).
#[derive(Clone, Copy, Default, Debug)]
pub struct Avl;

impl Policy for Avl {
    /// Height of the node: 0 for a leaf, and an absent child counts -1.
    type State = i32;
    type TreeState = ();

    fn on_insert<K: Ord, V>(tree: &mut Tree<K, V, Self>, node: NodeId) {
        rebalance(tree, Some(node));
    }

    fn on_remove<K: Ord, V>(tree: &mut Tree<K, V, Self>, node: Option<NodeId>, _top_level: bool) {
        rebalance(tree, node);
    }

    fn on_rotate<K: Ord, V>(tree: &mut Tree<K, V, Self>, node: NodeId) {
        // The demoted node first, then the new subtree root above it.
        set_height(tree, node);
        if let Some(parent) = tree.parent(node) {
            set_height(tree, parent);
        }
    }

    fn fmt_state(state: &i32, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " h={}", state)
    }

    fn check_node<K: Ord, V>(tree: &Tree<K, V, Self>, node: NodeId) {
        let left_height = height(tree, tree.left(node));
        let right_height = height(tree, tree.right(node));
        assert_eq!(*tree.state(node), 1 + cmp::max(left_height, right_height));
        assert!((left_height - right_height).abs() <= 1);
    }
}

fn height<K: Ord, V>(tree: &Tree<K, V, Avl>, node: Option<NodeId>) -> i32 {
    match node {
        None => -1,
        Some(node) => *tree.state(node),
    }
}

fn set_height<K: Ord, V>(tree: &mut Tree<K, V, Avl>, node: NodeId) {
    let new_height = 1 + cmp::max(
        height(tree, tree.left(node)),
        height(tree, tree.right(node)),
    );
    *tree.state_mut(node) = new_height;
}

fn balance_factor<K: Ord, V>(tree: &Tree<K, V, Avl>, node: NodeId) -> i32 {
    height(tree, tree.left(node)) - height(tree, tree.right(node))
}

/// Walks from `start` up to the root, recomputing heights and rotating
/// out-of-balance nodes. After a rotation the walk resumes from the new
/// root of the rotated subtree, which now occupies this ancestor slot.
fn rebalance<K: Ord, V>(tree: &mut Tree<K, V, Avl>, start: Option<NodeId>) {
    let mut current = start;
    while let Some(node) = current {
        set_height(tree, node);
        let balance = balance_factor(tree, node);
        let subtree_root = if balance > 1 {
            // Heavy on the left.
            let left = tree.left(node).unwrap();
            if balance_factor(tree, left) < 0 {
                // Left-right case.
                tree.rotate_left(left);
            }
            tree.rotate_right(node)
        } else if balance < -1 {
            // Heavy on the right.
            let right = tree.right(node).unwrap();
            if balance_factor(tree, right) > 0 {
                // Right-left case.
                tree.rotate_right(right);
            }
            tree.rotate_left(node)
        } else {
            node
        };
        current = tree.parent(subtree_root);
    }
}
