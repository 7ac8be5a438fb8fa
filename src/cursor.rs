use crate::arena::NodeId;
use crate::policy::Policy;
use crate::tree::Tree;

enum Direction {
    Ascending,
    Descending,
}

/// A detachable in-order cursor.
///
/// A cursor is created detached and binds to a tree with
/// [`attach`](Cursor::attach) (ascending, positioned at the smallest key)
/// or [`attach_end`](Cursor::attach_end) (descending, at the largest).
/// Every operation takes the tree as an explicit argument; the cursor
/// itself holds only a position. While attached, the cursor counts
/// against [`Tree::try_free`], so a tree cannot be released out from
/// under it.
///
/// The count is a cooperative gate, not a lock: the tree may still be
/// mutated while a cursor is attached, and removing the node a cursor
/// stands on invalidates its position. A stale position reads as
/// exhausted (or, once the slot has been reused, as the entry now stored
/// there); it never touches freed memory. Passing a different tree than
/// the one attached to is likewise a logic error with unspecified (but
/// memory-safe) results.
pub struct Cursor {
    position: Option<NodeId>,
    direction: Direction,
    attached: bool,
}

impl Cursor {
    /// Creates a detached cursor.
    pub fn new() -> Self {
        Self {
            position: None,
            direction: Direction::Ascending,
            attached: false,
        }
    }

    /// Returns true while the cursor is bound to a tree.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Binds the cursor to `tree` for ascending traversal, positioned at
    /// the node with the smallest key (exhausted if the tree is empty).
    ///
    /// A cursor that is already attached only repositions; it must be
    /// detached from its previous tree first, or that tree's cursor
    /// count stays raised.
    pub fn attach<K: Ord, V, P: Policy>(&mut self, tree: &mut Tree<K, V, P>) {
        if !self.attached {
            self.attached = true;
            tree.attach_cursor();
        }
        self.direction = Direction::Ascending;
        self.position = tree.first_node();
    }

    /// Binds the cursor to `tree` for descending traversal, positioned
    /// at the node with the largest key.
    pub fn attach_end<K: Ord, V, P: Policy>(&mut self, tree: &mut Tree<K, V, P>) {
        if !self.attached {
            self.attached = true;
            tree.attach_cursor();
        }
        self.direction = Direction::Descending;
        self.position = tree.last_node();
    }

    /// Unbinds the cursor, releasing its claim on the tree.
    /// Detaching an already detached cursor does nothing.
    pub fn detach<K: Ord, V, P: Policy>(&mut self, tree: &mut Tree<K, V, P>) {
        if self.attached {
            self.attached = false;
            self.position = None;
            tree.detach_cursor();
        }
    }

    /// Returns the value at the current position without advancing, or
    /// `None` if the cursor is detached or exhausted.
    pub fn current<'a, K: Ord, V, P: Policy>(&self, tree: &'a Tree<K, V, P>) -> Option<&'a V> {
        self.entry(tree).map(|(_, value)| value)
    }

    /// Returns the key-value pair at the current position without
    /// advancing.
    pub fn entry<'a, K: Ord, V, P: Policy>(
        &self,
        tree: &'a Tree<K, V, P>,
    ) -> Option<(&'a K, &'a V)> {
        if !self.attached {
            return None;
        }
        tree.entry_checked(self.position?)
    }

    /// Returns the value at the current position, then advances to the
    /// in-order successor (ascending) or predecessor (descending).
    ///
    /// Past the last node the cursor reads as exhausted until it is
    /// re-attached.
    pub fn next<'a, K: Ord, V, P: Policy>(&mut self, tree: &'a Tree<K, V, P>) -> Option<&'a V> {
        if !self.attached {
            return None;
        }
        let node = self.position?;
        let entry = tree.entry_checked(node);
        if entry.is_none() {
            // Position was removed from under us; treat as exhausted.
            self.position = None;
            return None;
        }
        self.position = match self.direction {
            Direction::Ascending => tree.next_node(node),
            Direction::Descending => tree.prev_node(node),
        };
        entry.map(|(_, value)| value)
    }
}

impl Default for Cursor {
    /// Creates a detached cursor.
    fn default() -> Self {
        Self::new()
    }
}
