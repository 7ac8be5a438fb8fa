use std::fmt;

use crate::arena::NodeId;
use crate::tree::Tree;

/// The hook set a balancing policy supplies to the tree engine.
///
/// The engine performs all structural work itself (linking, splicing,
/// rotations) and calls into the active policy at fixed points so the
/// policy can maintain whatever per-node bookkeeping its shape invariant
/// needs. Every hook defaults to a no-op; a policy that supplies nothing
/// yields a plain binary search tree (see [`Unbalanced`]).
///
/// Policies get at the tree through its public node accessors
/// ([`Tree::left`], [`Tree::state_mut`], ...) and restructure it with
/// [`Tree::rotate_left`] and [`Tree::rotate_right`], which call back into
/// [`Policy::on_rotate`] so derived state stays correct mid-walk.
pub trait Policy: Sized {
    /// Per-node auxiliary state, e.g. the height of an AVL node.
    /// `Default` provides the value for a freshly inserted node.
    type State: Default;

    /// Tree-level auxiliary state. `Default` provides the value for a
    /// freshly created tree.
    type TreeState: Default;

    /// Called after a successful insert with the newly linked node.
    fn on_insert<K: Ord, V>(tree: &mut Tree<K, V, Self>, node: NodeId) {
        let _ = (tree, node);
    }

    /// Called after a removal with the node that structurally replaced
    /// the removed position (`None` when the tree became empty or the
    /// root was spliced away without replacement). `top_level` is `false`
    /// only for removals cascaded from inside another removal; the
    /// engine's iterative two-child removal performs a single structural
    /// change, so it always reports `true`.
    fn on_remove<K: Ord, V>(tree: &mut Tree<K, V, Self>, node: Option<NodeId>, top_level: bool) {
        let _ = (tree, node, top_level);
    }

    /// Called after a rotation with the demoted node, i.e. the former
    /// subtree root that now hangs below its previous child.
    fn on_rotate<K: Ord, V>(tree: &mut Tree<K, V, Self>, node: NodeId) {
        let _ = (tree, node);
    }

    /// Debug hook: renders tree-level state in [`Tree::structure`] output.
    fn fmt_tree<K: Ord, V>(tree: &Tree<K, V, Self>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let _ = (tree, f);
        Ok(())
    }

    /// Debug hook: renders one node's state in [`Tree::structure`] output.
    fn fmt_state(state: &Self::State, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let _ = (state, f);
        Ok(())
    }

    /// Consistency hook: asserts the policy's invariant at one node.
    /// Called by `check_consistency` for every reachable node.
    fn check_node<K: Ord, V>(tree: &Tree<K, V, Self>, node: NodeId) {
        let _ = (tree, node);
    }
}

/// The empty policy: no per-node state, no rebalancing.
///
/// Trees under this policy keep only the search order invariant, so their
/// height depends entirely on the insertion sequence.
#[derive(Clone, Copy, Default, Debug)]
pub struct Unbalanced;

impl Policy for Unbalanced {
    type State = ();
    type TreeState = ();
}
