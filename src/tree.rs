use std::cmp::Ordering;
use std::fmt;

use crate::arena::{Arena, Node, NodeId};
use crate::avl::Avl;
use crate::iter::Iter;
use crate::policy::{Policy, Unbalanced};

/// An ordered map from keys to values, kept in shape by a balancing
/// policy `P`.
///
/// The engine stores nodes in a slot arena and links them by stable
/// [`NodeId`] indices, so parent links and the cached leftmost node are
/// plain back-references with no ownership of their own. All structural
/// invariants beyond search order are maintained by the policy through
/// its hooks; the engine itself never rebalances.
pub struct Tree<K: Ord, V, P: Policy> {
    arena: Arena<K, V, P::State>,
    root: Option<NodeId>,
    first: Option<NodeId>,
    len: usize,
    cursors: usize,
    state: P::TreeState,
}

/// An ordered map balanced with the AVL policy.
pub type AvlTree<K, V> = Tree<K, V, Avl>;

/// An ordered map with no balancing at all.
pub type UnbalancedTree<K, V> = Tree<K, V, Unbalanced>;

impl<K: Ord, V, P: Policy> Tree<K, V, P> {
    /// Creates an empty tree.
    /// No memory is allocated until the first item is inserted.
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            first: None,
            len: 0,
            cursors: 0,
            state: P::TreeState::default(),
        }
    }

    /// Creates an empty tree with explicit tree-level policy state, for
    /// policies whose state has no meaningful default.
    pub fn with_state(state: P::TreeState) -> Self {
        Self {
            state,
            ..Self::new()
        }
    }

    /// Returns true if the tree contains no elements.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of elements in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Clears the tree, deallocating all nodes.
    ///
    /// Cursors left attached keep counting against [`Tree::try_free`] but
    /// read as exhausted afterwards.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.first = None;
        self.len = 0;
    }

    /// Consumes and drops the tree if no cursor is attached.
    ///
    /// Fails while any cursor is attached, handing the tree back fully
    /// intact. This is the cooperative destruction gate: it does not
    /// detect mutation during an attached cursor's lifetime, it only
    /// refuses to release a tree a cursor still names.
    pub fn try_free(self) -> Result<(), Self> {
        if self.cursors > 0 {
            return Err(self);
        }
        Ok(())
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get(&self, key: &K) -> Option<&V> {
        let node = self.find(key)?;
        Some(&self.node(node).value)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let node = self.find(key)?;
        Some(&mut self.node_mut(node).value)
    }

    /// Returns references to the key-value pair corresponding to the key.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let node = self.find(key)?;
        let node = self.node(node);
        Some((&node.key, &node.value))
    }

    /// Returns true if the tree contains the key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Inserts a key-value pair into the tree.
    ///
    /// Fails without mutating anything if the key is already present;
    /// duplicates are rejected, not overwritten. On success the policy's
    /// insert hook runs with the new node and may rotate ancestors.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let mut parent = None;
        let mut went_left = false;
        let mut current = self.root;
        while let Some(node) = current {
            match key.cmp(&self.node(node).key) {
                Ordering::Equal => return false,
                Ordering::Less => {
                    parent = Some(node);
                    went_left = true;
                    current = self.node(node).left;
                }
                Ordering::Greater => {
                    parent = Some(node);
                    went_left = false;
                    current = self.node(node).right;
                }
            }
        }

        let new = self
            .arena
            .insert(Node::new(key, value, parent, P::State::default()));
        match parent {
            None => {
                self.root = Some(new);
                self.first = Some(new);
            }
            Some(parent) => {
                if went_left {
                    self.node_mut(parent).left = Some(new);
                    // Leftmost changes only when inserting left of it.
                    if self.first == Some(parent) {
                        self.first = Some(new);
                    }
                } else {
                    self.node_mut(parent).right = Some(new);
                }
            }
        }
        self.len += 1;
        P::on_insert(self, new);
        true
    }

    /// Removes a key from the tree.
    /// Returns the value at the key if the key was previously in the tree.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let node = self.find(key)?;
        debug_assert!(self.len >= 1);
        let value = self.remove_node(node);
        debug_assert!(self.get(key).is_none());
        Some(value)
    }

    fn remove_node(&mut self, node: NodeId) -> V {
        let left = self.node(node).left;
        let right = self.node(node).right;

        // A node with two children is not emptied out of its slot.
        // Instead its entry swaps with the in-order predecessor (the
        // rightmost node of the left subtree, which has at most a left
        // child) and the predecessor's slot is spliced out. No node is
        // ever re-linked after its slot has been freed.
        let target = if let (Some(left), Some(_)) = (left, right) {
            let pred = self.rightmost(left);
            debug_assert!(self.node(pred).right.is_none());
            self.arena.swap_key_value(node, pred);
            // If the predecessor was the leftmost node its entry now
            // lives in the surviving slot.
            if self.first == Some(pred) {
                self.first = Some(node);
            }
            pred
        } else {
            if self.first == Some(node) {
                self.first = self.next_node(node);
            }
            node
        };

        // Splice the target's lone child (if any) into its position.
        let child = {
            let target_node = self.node(target);
            target_node.left.or(target_node.right)
        };
        let parent = self.node(target).parent;
        if let Some(child) = child {
            self.node_mut(child).parent = parent;
        }
        match parent {
            None => self.root = child,
            Some(parent) => {
                let parent_node = self.node_mut(parent);
                if parent_node.left == Some(target) {
                    parent_node.left = child;
                } else {
                    parent_node.right = child;
                }
            }
        }

        let removed = self.arena.remove(target);
        self.len -= 1;
        P::on_remove(self, parent.or(child), true);
        removed.value
    }

    /// Rotates the subtree rooted at `node` to the left and returns the
    /// new subtree root (the former right child).
    ///
    /// The rotation hook runs afterwards with the demoted node so the
    /// policy can recompute derived state. Rotations preserve the
    /// in-order sequence and never change `len` or the leftmost node.
    /// Returns `node` unchanged if it has no right child.
    pub fn rotate_left(&mut self, node: NodeId) -> NodeId {
        let pivot = match self.node(node).right {
            Some(pivot) => pivot,
            None => return node,
        };
        let inner = self.node(pivot).left;
        self.node_mut(node).right = inner;
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(node);
        }
        self.replace_in_parent(node, pivot);
        self.node_mut(pivot).left = Some(node);
        self.node_mut(node).parent = Some(pivot);
        P::on_rotate(self, node);
        pivot
    }

    /// Rotates the subtree rooted at `node` to the right and returns the
    /// new subtree root (the former left child).
    ///
    /// Returns `node` unchanged if it has no left child.
    pub fn rotate_right(&mut self, node: NodeId) -> NodeId {
        let pivot = match self.node(node).left {
            Some(pivot) => pivot,
            None => return node,
        };
        let inner = self.node(pivot).right;
        self.node_mut(node).left = inner;
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(node);
        }
        self.replace_in_parent(node, pivot);
        self.node_mut(pivot).right = Some(node);
        self.node_mut(node).parent = Some(pivot);
        P::on_rotate(self, node);
        pivot
    }

    // Hangs `pivot` where `node` used to be, below node's parent or at
    // the root.
    fn replace_in_parent(&mut self, node: NodeId, pivot: NodeId) {
        let parent = self.node(node).parent;
        self.node_mut(pivot).parent = parent;
        match parent {
            None => self.root = Some(pivot),
            Some(parent) => {
                let parent_node = self.node_mut(parent);
                if parent_node.left == Some(node) {
                    parent_node.left = Some(pivot);
                } else {
                    parent_node.right = Some(pivot);
                }
            }
        }
    }

    /// Returns the root node.
    pub fn root_node(&self) -> Option<NodeId> {
        self.root
    }

    /// Returns the node with the smallest key, in constant time.
    pub fn first_node(&self) -> Option<NodeId> {
        self.first
    }

    /// Returns the node with the largest key.
    pub fn last_node(&self) -> Option<NodeId> {
        self.root.map(|root| self.rightmost(root))
    }

    /// Returns the in-order successor of `node`.
    pub fn next_node(&self, node: NodeId) -> Option<NodeId> {
        if let Some(right) = self.node(node).right {
            return Some(self.leftmost(right));
        }
        // Climb while arriving from the right.
        let mut current = node;
        let mut parent = self.node(node).parent;
        while let Some(up) = parent {
            if self.node(up).left == Some(current) {
                return Some(up);
            }
            current = up;
            parent = self.node(up).parent;
        }
        None
    }

    /// Returns the in-order predecessor of `node`.
    pub fn prev_node(&self, node: NodeId) -> Option<NodeId> {
        if let Some(left) = self.node(node).left {
            return Some(self.rightmost(left));
        }
        let mut current = node;
        let mut parent = self.node(node).parent;
        while let Some(up) = parent {
            if self.node(up).right == Some(current) {
                return Some(up);
            }
            current = up;
            parent = self.node(up).parent;
        }
        None
    }

    /// Returns the key stored at `node`.
    pub fn key(&self, node: NodeId) -> &K {
        &self.node(node).key
    }

    /// Returns the left child of `node`.
    pub fn left(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).left
    }

    /// Returns the right child of `node`.
    pub fn right(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).right
    }

    /// Returns the parent of `node`.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    /// Returns the policy state stored at `node`.
    pub fn state(&self, node: NodeId) -> &P::State {
        &self.node(node).state
    }

    /// Returns the policy state stored at `node` mutably.
    pub fn state_mut(&mut self, node: NodeId) -> &mut P::State {
        &mut self.node_mut(node).state
    }

    /// Returns the tree-level policy state.
    pub fn policy_state(&self) -> &P::TreeState {
        &self.state
    }

    /// Returns the tree-level policy state mutably.
    pub fn policy_state_mut(&mut self) -> &mut P::TreeState {
        &mut self.state
    }

    /// Gets an iterator over the entries of the tree in ascending key
    /// order. Reverse it for descending order.
    pub fn iter(&self) -> Iter<'_, K, V, P> {
        Iter::new(self)
    }

    /// Renders the node hierarchy, one node per line with policy state,
    /// for diagnostics.
    pub fn structure(&self) -> Structure<'_, K, V, P>
    where
        K: fmt::Debug,
    {
        Structure { tree: self }
    }

    /// Asserts that the internal structure is consistent: parent links,
    /// search order, node count, the leftmost cache, and the policy
    /// invariant at every node.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        if let Some(root) = self.root {
            assert!(self.node(root).parent.is_none());
        }

        let mut num_nodes = 0;
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(node) = stack.pop() {
            num_nodes += 1;
            if let Some(left) = self.node(node).left {
                assert_eq!(self.node(left).parent, Some(node));
                assert!(self.node(left).key < self.node(node).key);
                stack.push(left);
            }
            if let Some(right) = self.node(node).right {
                assert_eq!(self.node(right).parent, Some(node));
                assert!(self.node(right).key > self.node(node).key);
                stack.push(right);
            }
            P::check_node(self, node);
        }
        assert_eq!(num_nodes, self.len);

        assert_eq!(self.first, self.root.map(|root| self.leftmost(root)));

        let mut prev: Option<&K> = None;
        for (key, _) in self.iter() {
            if let Some(prev) = prev {
                assert!(prev < key);
            }
            prev = Some(key);
        }
    }

    pub(crate) fn attach_cursor(&mut self) {
        self.cursors += 1;
    }

    pub(crate) fn detach_cursor(&mut self) {
        debug_assert!(self.cursors > 0);
        self.cursors -= 1;
    }

    /// Entry access that tolerates a stale handle, for cursors whose
    /// position may have been removed since the last call.
    pub(crate) fn entry_checked(&self, node: NodeId) -> Option<(&K, &V)> {
        let node = self.arena.get(node)?;
        Some((&node.key, &node.value))
    }

    pub(crate) fn leftmost(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while let Some(left) = self.node(current).left {
            current = left;
        }
        current
    }

    fn rightmost(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while let Some(right) = self.node(current).right {
            current = right;
        }
        current
    }

    fn find(&self, key: &K) -> Option<NodeId> {
        let mut current = self.root;
        while let Some(node) = current {
            match key.cmp(&self.node(node).key) {
                Ordering::Equal => break,
                Ordering::Less => current = self.node(node).left,
                Ordering::Greater => current = self.node(node).right,
            }
        }
        current
    }

    fn node(&self, node: NodeId) -> &Node<K, V, P::State> {
        match self.arena.get(node) {
            Some(node) => node,
            None => panic!("stale node handle"),
        }
    }

    fn node_mut(&mut self, node: NodeId) -> &mut Node<K, V, P::State> {
        match self.arena.get_mut(node) {
            Some(node) => node,
            None => panic!("stale node handle"),
        }
    }
}

impl<K: Ord, V, P: Policy> Default for Tree<K, V, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone, V: Clone, P: Policy> Clone for Tree<K, V, P>
where
    P::State: Clone,
    P::TreeState: Clone,
{
    fn clone(&self) -> Self {
        Self {
            arena: self.arena.clone(),
            root: self.root,
            first: self.first,
            len: self.len,
            // Cursors stay attached to the original.
            cursors: 0,
            state: self.state.clone(),
        }
    }
}

impl<K: Ord + fmt::Debug, V: fmt::Debug, P: Policy> fmt::Debug for Tree<K, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K: Ord, V, P: Policy> IntoIterator for &'a Tree<K, V, P> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, P>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Displayable dump of a tree's node hierarchy.
///
/// This `struct` is created by the [`structure`](Tree::structure) method.
pub struct Structure<'a, K: Ord, V, P: Policy> {
    tree: &'a Tree<K, V, P>,
}

impl<K: Ord + fmt::Debug, V, P: Policy> fmt::Display for Structure<'_, K, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.tree;
        writeln!(
            f,
            "len: {}, root: {:?}, first: {:?}",
            tree.len,
            tree.root.map(|node| tree.key(node)),
            tree.first.map(|node| tree.key(node)),
        )?;
        P::fmt_tree(tree, f)?;

        let mut stack: Vec<(NodeId, usize)> = Vec::new();
        if let Some(root) = tree.root {
            stack.push((root, 0));
        }
        while let Some((node, depth)) = stack.pop() {
            write!(f, "{:indent$}{:?}", "", tree.key(node), indent = depth * 2)?;
            P::fmt_state(tree.state(node), f)?;
            writeln!(f)?;
            // Right below left so the left branch prints first.
            if let Some(right) = tree.right(node) {
                stack.push((right, depth + 1));
            }
            if let Some(left) = tree.left(node) {
                stack.push((left, depth + 1));
            }
        }
        Ok(())
    }
}
