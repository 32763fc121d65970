//! Node storage for [`BalancedOrderedMap`](super::BalancedOrderedMap).
//!
//! Nodes live in a slot arena and refer to each other by [`NodeId`].
//! Slot 0 is the sentinel: a permanently black node standing in for every
//! missing child and for the parent of the root. Freed slots are threaded
//! into an intrusive free list through their `right` link and reused by
//! later inserts.

use std::collections::TryReserveError;
use std::fmt;
use std::mem;

// =============================================================================
// Color Definition
// =============================================================================

/// The color of a red-black tree node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Color {
    /// A red node. Never the root and never the parent of another red node.
    Red,
    /// A black node. The sentinel is always black.
    Black,
}

impl Color {
    /// Returns the single-letter form used by tree diagrams (`R` or `B`).
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Red => 'R',
            Self::Black => 'B',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.letter())
    }
}

// =============================================================================
// Side Definition
// =============================================================================

/// Which child link of a node is meant.
///
/// Every left/right-symmetric routine is written once against a `Side` and
/// its [`opposite`](Side::opposite).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

// =============================================================================
// Node Definition
// =============================================================================

/// Index of a node slot in the arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct NodeId(usize);

impl NodeId {
    /// The sentinel slot.
    pub(crate) const NIL: Self = Self(0);

    #[inline]
    pub(crate) const fn is_nil(self) -> bool {
        self.0 == 0
    }

    #[inline]
    const fn index(self) -> usize {
        self.0
    }
}

/// One stored entry plus its structural links.
#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) key: String,
    pub(crate) value: String,
    pub(crate) color: Color,
    pub(crate) parent: NodeId,
    pub(crate) left: NodeId,
    pub(crate) right: NodeId,
}

impl Node {
    const fn sentinel() -> Self {
        Self {
            key: String::new(),
            value: String::new(),
            color: Color::Black,
            parent: NodeId::NIL,
            left: NodeId::NIL,
            right: NodeId::NIL,
        }
    }

    /// Creates a detached red leaf.
    const fn new_red(key: String, value: String) -> Self {
        Self {
            key,
            value,
            color: Color::Red,
            parent: NodeId::NIL,
            left: NodeId::NIL,
            right: NodeId::NIL,
        }
    }

    #[inline]
    pub(crate) const fn child(&self, side: Side) -> NodeId {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) const fn child_mut(&mut self, side: Side) -> &mut NodeId {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Slot storage owning every node of one tree.
#[derive(Clone, Debug)]
pub(crate) struct Arena {
    slots: Vec<Node>,
    /// Head of the free list, linked through `Node::right`.
    free_head: NodeId,
}

impl Arena {
    pub(crate) fn new() -> Self {
        Self {
            slots: vec![Node::sentinel()],
            free_head: NodeId::NIL,
        }
    }

    /// Ensures the next [`allocate`](Self::allocate) does not need to grow
    /// the slot vector.
    pub(crate) fn try_reserve_one(&mut self) -> Result<(), TryReserveError> {
        if self.free_head.is_nil() {
            self.slots.try_reserve(1)?;
        }
        Ok(())
    }

    /// Stores a new red leaf and returns its id.
    pub(crate) fn allocate(&mut self, key: String, value: String) -> NodeId {
        let node = Node::new_red(key, value);
        if self.free_head.is_nil() {
            let id = NodeId(self.slots.len());
            self.slots.push(node);
            if self.slots.len().is_power_of_two() {
                log::debug!("node arena grew to {} slots", self.slots.len());
            }
            id
        } else {
            let id = self.free_head;
            self.free_head = self.slots[id.index()].right;
            self.slots[id.index()] = node;
            id
        }
    }

    /// Returns a detached slot to the free list, handing back its entry.
    pub(crate) fn release(&mut self, id: NodeId) -> (String, String) {
        debug_assert!(!id.is_nil(), "the sentinel is never released");
        let slot = &mut self.slots[id.index()];
        let key = mem::take(&mut slot.key);
        let value = mem::take(&mut slot.value);
        slot.color = Color::Black;
        slot.parent = NodeId::NIL;
        slot.left = NodeId::NIL;
        slot.right = self.free_head;
        self.free_head = id;
        (key, value)
    }

    /// Drops every node, keeping only the sentinel.
    pub(crate) fn clear(&mut self) {
        self.slots.truncate(1);
        self.free_head = NodeId::NIL;
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> &Node {
        &self.slots[id.index()]
    }

    /// Mutable access to a real node.
    ///
    /// The sentinel is read-only: the fixup routines never need to write it.
    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut Node {
        debug_assert!(!id.is_nil(), "attempted to mutate the sentinel");
        &mut self.slots[id.index()]
    }

    #[inline]
    pub(crate) fn color(&self, id: NodeId) -> Color {
        self.get(id).color
    }

    #[inline]
    pub(crate) fn is_red(&self, id: NodeId) -> bool {
        self.color(id) == Color::Red
    }

    #[inline]
    pub(crate) fn is_black(&self, id: NodeId) -> bool {
        self.color(id) == Color::Black
    }

    #[inline]
    pub(crate) fn parent(&self, id: NodeId) -> NodeId {
        self.get(id).parent
    }

    #[inline]
    pub(crate) fn child(&self, id: NodeId, side: Side) -> NodeId {
        self.get(id).child(side)
    }

    /// Returns which child of its parent `id` is.
    ///
    /// `parent` is passed explicitly so the sentinel can be classified: a
    /// sentinel child is on whichever side of `parent` is empty.
    #[inline]
    pub(crate) fn side_of(&self, id: NodeId, parent: NodeId) -> Side {
        if self.get(parent).left == id {
            Side::Left
        } else {
            Side::Right
        }
    }

    #[inline]
    pub(crate) fn set_color(&mut self, id: NodeId, color: Color) {
        self.get_mut(id).color = color;
    }

    /// Sets `id`'s parent link unless `id` is the sentinel.
    #[inline]
    pub(crate) fn set_parent(&mut self, id: NodeId, parent: NodeId) {
        if !id.is_nil() {
            self.get_mut(id).parent = parent;
        }
    }

    #[inline]
    pub(crate) fn set_child(&mut self, id: NodeId, side: Side, child: NodeId) {
        *self.get_mut(id).child_mut(side) = child;
    }
}

// =============================================================================
// Tests
// =============================================================================
