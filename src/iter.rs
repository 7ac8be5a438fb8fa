use crate::arena::NodeId;
use crate::policy::Policy;
use crate::tree::Tree;

/// An iterator over the entries of a tree in ascending key order.
///
/// Unlike [`Cursor`](crate::Cursor), this borrows the tree for its whole
/// lifetime, so the borrow checker rules out mutation while it is live.
pub struct Iter<'a, K: Ord, V, P: Policy> {
    tree: &'a Tree<K, V, P>,
    front: Option<NodeId>,
    back: Option<NodeId>,
    finished: bool,
}

impl<'a, K: Ord, V, P: Policy> Iter<'a, K, V, P> {
    pub(crate) fn new(tree: &'a Tree<K, V, P>) -> Self {
        Self {
            tree,
            front: tree.first_node(),
            back: tree.last_node(),
            finished: false,
        }
    }
}

// Auto derived clone would demand K: Clone and V: Clone.
impl<'a, K: Ord, V, P: Policy> Clone for Iter<'a, K, V, P> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            front: self.front,
            back: self.back,
            finished: self.finished,
        }
    }
}

impl<'a, K: Ord, V, P: Policy> Iterator for Iter<'a, K, V, P> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let node = match self.front {
            Some(node) => node,
            None => return None,
        };
        if self.front == self.back {
            self.finished = true;
        } else {
            self.front = self.tree.next_node(node);
        }
        self.tree.entry_checked(node)
    }
}

impl<'a, K: Ord, V, P: Policy> DoubleEndedIterator for Iter<'a, K, V, P> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let node = match self.back {
            Some(node) => node,
            None => return None,
        };
        if self.front == self.back {
            self.finished = true;
        } else {
            self.back = self.tree.prev_node(node);
        }
        self.tree.entry_checked(node)
    }
}
