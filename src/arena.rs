use std::mem;

/// A stable handle to a node inside a [`Tree`](crate::Tree).
///
/// Handles are plain arena indices. They stay valid while the node they
/// name is in the tree and must not be used after that node has been
/// removed; tree accessors panic on a handle whose slot has been freed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

pub(crate) struct Node<K, V, S> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) state: S,
}

impl<K, V, S> Node<K, V, S> {
    pub(crate) fn new(key: K, value: V, parent: Option<NodeId>, state: S) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
            parent,
            state,
        }
    }
}

impl<K: Clone, V: Clone, S: Clone> Clone for Node<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            value: self.value.clone(),
            left: self.left,
            right: self.right,
            parent: self.parent,
            state: self.state.clone(),
        }
    }
}

enum Slot<K, V, S> {
    Occupied(Node<K, V, S>),
    Vacant(Option<NodeId>),
}

impl<K: Clone, V: Clone, S: Clone> Clone for Slot<K, V, S> {
    fn clone(&self) -> Self {
        match self {
            Slot::Occupied(node) => Slot::Occupied(node.clone()),
            Slot::Vacant(next) => Slot::Vacant(*next),
        }
    }
}

/// Slot arena owning every node of a tree.
///
/// Freed slots are chained into a free list and reused by later inserts,
/// so a handle to a removed node may later name a different node. Reading
/// through a freed-but-not-reused handle yields `None` rather than
/// touching released memory.
pub(crate) struct Arena<K, V, S> {
    slots: Vec<Slot<K, V, S>>,
    free: Option<NodeId>,
}

impl<K, V, S> Arena<K, V, S> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: None,
        }
    }

    pub(crate) fn insert(&mut self, node: Node<K, V, S>) -> NodeId {
        match self.free {
            Some(id) => {
                self.free = match self.slots[id.index()] {
                    Slot::Vacant(next) => next,
                    Slot::Occupied(_) => unreachable!("occupied slot on free list"),
                };
                self.slots[id.index()] = Slot::Occupied(node);
                id
            }
            None => {
                let id = NodeId(self.slots.len() as u32);
                self.slots.push(Slot::Occupied(node));
                id
            }
        }
    }

    pub(crate) fn remove(&mut self, id: NodeId) -> Node<K, V, S> {
        let slot = mem::replace(&mut self.slots[id.index()], Slot::Vacant(self.free));
        match slot {
            Slot::Occupied(node) => {
                self.free = Some(id);
                node
            }
            Slot::Vacant(_) => unreachable!("removed vacant slot"),
        }
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node<K, V, S>> {
        match self.slots.get(id.index()) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<K, V, S>> {
        match self.slots.get_mut(id.index()) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }

    /// Swaps the key and value of two occupied slots, leaving links and
    /// per-node state in place. Used by two-child removal to move an
    /// entry without disturbing the structure around it.
    pub(crate) fn swap_key_value(&mut self, a: NodeId, b: NodeId) {
        debug_assert_ne!(a, b);
        let (lo, hi) = if a.index() < b.index() {
            (a.index(), b.index())
        } else {
            (b.index(), a.index())
        };
        let (head, tail) = self.slots.split_at_mut(hi);
        match (&mut head[lo], &mut tail[0]) {
            (Slot::Occupied(x), Slot::Occupied(y)) => {
                mem::swap(&mut x.key, &mut y.key);
                mem::swap(&mut x.value, &mut y.value);
            }
            _ => unreachable!("swapped vacant slot"),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free = None;
    }
}

impl<K: Clone, V: Clone, S: Clone> Clone for Arena<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            free: self.free,
        }
    }
}
