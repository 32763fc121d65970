//! The red-black tree engine behind [`BalancedOrderedMap`].
//!
//! # Overview
//!
//! `BalancedOrderedMap` is a red-black tree keyed by `String` that allows
//! duplicate keys.
//!
//! - O(log N) insert
//! - O(log N + k) find, where k is the number of entries sharing the key
//! - O(k log N) delete of k matching entries
//! - O(1) len and `is_empty`
//!
//! # Duplicates
//!
//! A new entry descends to the right of every entry with an equal key, so
//! entries sharing a key form one contiguous in-order run kept in insertion
//! order. Rotations never change in-order position, which keeps the run
//! intact across later inserts and deletes.
//!
//! # Internal Structure
//!
//! Nodes are stored in an [`Arena`] and linked by index. The sentinel slot
//! plays the role of every missing child and of the root's parent, so the
//! rebalancing code never has to special-case absent children.

use std::fmt;

use smallvec::SmallVec;

use super::error::TreeError;
use super::node::{Arena, Color, NodeId, Side};
use super::traverse::{Iter, ReverseInOrder, TreeDiagram};

/// Inline capacity for the ids collected by a single `delete`.
const DELETE_INLINE_CAPACITY: usize = 4;

// =============================================================================
// BalancedOrderedMap Definition
// =============================================================================

/// An ordered multimap from string keys to string values.
///
/// # Time Complexity
///
/// | Operation      | Complexity        |
/// |----------------|-------------------|
/// | `new`          | O(1)              |
/// | `insert`       | O(log N)          |
/// | `find`         | O(log N + k)      |
/// | `delete`       | O(k log N)        |
/// | `contains_key` | O(log N)          |
/// | `first`/`last` | O(log N)          |
/// | `len`          | O(1)              |
///
/// # Examples
///
/// ```rust
/// use rbmultimap::tree::BalancedOrderedMap;
///
/// let mut map = BalancedOrderedMap::new();
/// map.insert("fruit", "apple");
/// map.insert("fruit", "pear");
/// map.insert("nut", "pecan");
///
/// assert_eq!(map.find("fruit"), vec!["apple", "pear"]);
///
/// assert_eq!(map.delete("fruit", "apple"), 1);
/// assert_eq!(map.find("fruit"), vec!["pear"]);
/// assert_eq!(map.len(), 2);
/// ```
#[derive(Clone)]
pub struct BalancedOrderedMap {
    pub(super) arena: Arena,
    pub(super) root: NodeId,
    pub(super) length: usize,
}

static_assertions::assert_impl_all!(BalancedOrderedMap: Send, Sync, Clone);

impl BalancedOrderedMap {
    /// Creates a new empty map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmultimap::tree::BalancedOrderedMap;
    ///
    /// let map = BalancedOrderedMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: NodeId::NIL,
            length: 0,
        }
    }

    /// Returns the number of entries, counting every duplicate.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the map holds no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = NodeId::NIL;
        self.length = 0;
    }

    // =========================================================================
    // Insertion
    // =========================================================================

    /// Inserts an entry.
    ///
    /// Duplicate keys are kept as separate entries; a new duplicate is placed
    /// after every existing entry with the same key. Like the standard
    /// collections this aborts if memory runs out; use
    /// [`try_insert`](Self::try_insert) to observe allocation failure.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmultimap::tree::BalancedOrderedMap;
    ///
    /// let mut map = BalancedOrderedMap::new();
    /// map.insert("k", "first");
    /// map.insert("k", "second");
    /// assert_eq!(map.find("k"), vec!["first", "second"]);
    /// ```
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let node = self.arena.allocate(key.into(), value.into());
        self.attach(node);
    }

    /// Inserts an entry, reporting allocation failure instead of aborting.
    ///
    /// The tree is left untouched when an error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::AllocationFailed`] if the node arena cannot grow.
    pub fn try_insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), TreeError> {
        self.arena.try_reserve_one()?;
        self.insert(key, value);
        Ok(())
    }

    /// Links a freshly allocated red leaf into the tree and rebalances.
    fn attach(&mut self, node: NodeId) {
        let mut parent = NodeId::NIL;
        let mut current = self.root;
        while !current.is_nil() {
            parent = current;
            current = self.arena.child(current, self.descent_side(node, current));
        }

        self.arena.set_parent(node, parent);
        if parent.is_nil() {
            self.root = node;
        } else {
            let side = self.descent_side(node, parent);
            self.arena.set_child(parent, side, node);
        }
        self.length += 1;

        self.insert_fixup(node);
    }

    /// Equal keys go right so duplicates stay in insertion order.
    fn descent_side(&self, node: NodeId, at: NodeId) -> Side {
        if self.arena.get(node).key < self.arena.get(at).key {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Restores the red-black properties after attaching the red leaf `node`.
    fn insert_fixup(&mut self, mut node: NodeId) {
        while self.arena.is_red(self.arena.parent(node)) {
            let parent = self.arena.parent(node);
            let grandparent = self.arena.parent(parent);
            let side = self.arena.side_of(parent, grandparent);
            let uncle = self.arena.child(grandparent, side.opposite());

            if self.arena.is_red(uncle) {
                log::trace!("insert fixup: red uncle, recoloring ({side:?})");
                self.arena.set_color(parent, Color::Black);
                self.arena.set_color(uncle, Color::Black);
                self.arena.set_color(grandparent, Color::Red);
                node = grandparent;
                continue;
            }

            if node == self.arena.child(parent, side.opposite()) {
                log::trace!("insert fixup: inner grandchild, rotating parent ({side:?})");
                node = parent;
                self.rotate(node, side);
            }

            log::trace!("insert fixup: outer grandchild, rotating grandparent ({side:?})");
            let parent = self.arena.parent(node);
            let grandparent = self.arena.parent(parent);
            self.arena.set_color(parent, Color::Black);
            self.arena.set_color(grandparent, Color::Red);
            self.rotate(grandparent, side.opposite());
        }

        let root = self.root;
        self.arena.set_color(root, Color::Black);
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Returns every value stored under `key`, in insertion order.
    ///
    /// Returns an empty vector when the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmultimap::tree::BalancedOrderedMap;
    ///
    /// let mut map = BalancedOrderedMap::new();
    /// map.insert("a", "1");
    /// map.insert("b", "2");
    /// map.insert("a", "3");
    ///
    /// assert_eq!(map.find("a"), vec!["1", "3"]);
    /// assert!(map.find("z").is_empty());
    /// ```
    #[must_use]
    pub fn find(&self, key: &str) -> Vec<&str> {
        self.matching_run(key)
            .map(|node| self.arena.get(node).value.as_str())
            .collect()
    }

    /// Returns `true` if at least one entry has the given key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        !self.search(key).is_nil()
    }

    /// Returns the entry with the smallest key.
    ///
    /// Among duplicates of the smallest key, the earliest inserted is returned.
    #[must_use]
    pub fn first(&self) -> Option<(&str, &str)> {
        (!self.root.is_nil()).then(|| self.entry(self.minimum(self.root)))
    }

    /// Returns the entry with the largest key.
    ///
    /// Among duplicates of the largest key, the latest inserted is returned.
    #[must_use]
    pub fn last(&self) -> Option<(&str, &str)> {
        (!self.root.is_nil()).then(|| self.entry(self.maximum(self.root)))
    }

    fn entry(&self, node: NodeId) -> (&str, &str) {
        let node = self.arena.get(node);
        (node.key.as_str(), node.value.as_str())
    }

    /// Descends from the root to some node with `key`, or the sentinel.
    fn search(&self, key: &str) -> NodeId {
        let mut current = self.root;
        while !current.is_nil() {
            let current_key = self.arena.get(current).key.as_str();
            if key == current_key {
                break;
            }
            current = if key < current_key {
                self.arena.child(current, Side::Left)
            } else {
                self.arena.child(current, Side::Right)
            };
        }
        current
    }

    /// Yields every node with `key`, in in-order position.
    ///
    /// Starts from the node found by [`search`](Self::search), walks back
    /// through its predecessors to the start of the run, then forward
    /// through successors until the key changes.
    fn matching_run<'a>(&'a self, key: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        let found = self.search(key);
        let start = if found.is_nil() {
            None
        } else {
            let mut first = found;
            loop {
                let previous = self.predecessor(first);
                if previous.is_nil() || self.arena.get(previous).key != key {
                    break;
                }
                first = previous;
            }
            Some(first)
        };

        std::iter::successors(start, move |&node| {
            let next = self.successor(node);
            (!next.is_nil() && self.arena.get(next).key == key).then_some(next)
        })
    }

    /// Leftmost node of the subtree rooted at `node`.
    fn minimum(&self, node: NodeId) -> NodeId {
        self.extreme(node, Side::Left)
    }

    /// Rightmost node of the subtree rooted at `node`.
    fn maximum(&self, node: NodeId) -> NodeId {
        self.extreme(node, Side::Right)
    }

    fn extreme(&self, mut node: NodeId, side: Side) -> NodeId {
        loop {
            let next = self.arena.child(node, side);
            if next.is_nil() {
                return node;
            }
            node = next;
        }
    }

    fn successor(&self, node: NodeId) -> NodeId {
        self.neighbor(node, Side::Right)
    }

    fn predecessor(&self, node: NodeId) -> NodeId {
        self.neighbor(node, Side::Left)
    }

    /// In-order neighbor of `node` in direction `side`, or the sentinel.
    fn neighbor(&self, mut node: NodeId, side: Side) -> NodeId {
        let child = self.arena.child(node, side);
        if !child.is_nil() {
            return self.extreme(child, side.opposite());
        }
        let mut parent = self.arena.parent(node);
        while !parent.is_nil() && node == self.arena.child(parent, side) {
            node = parent;
            parent = self.arena.parent(parent);
        }
        parent
    }

    // =========================================================================
    // Deletion
    // =========================================================================

    /// Removes every entry whose key and value both match.
    ///
    /// Returns the number of entries removed; zero means the map is
    /// unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmultimap::tree::BalancedOrderedMap;
    ///
    /// let mut map = BalancedOrderedMap::new();
    /// map.insert("k", "a");
    /// map.insert("k", "b");
    /// map.insert("k", "a");
    ///
    /// assert_eq!(map.delete("k", "a"), 2);
    /// assert_eq!(map.find("k"), vec!["b"]);
    /// assert_eq!(map.delete("k", "missing"), 0);
    /// ```
    pub fn delete(&mut self, key: &str, value: &str) -> usize {
        let targets: SmallVec<[NodeId; DELETE_INLINE_CAPACITY]> = self
            .matching_run(key)
            .filter(|&node| self.arena.get(node).value == value)
            .collect();

        for &node in &targets {
            self.remove_node(node);
        }
        if !targets.is_empty() {
            log::debug!("deleted {} entries for key {key:?}", targets.len());
        }
        targets.len()
    }

    /// Unlinks `node`, rebalances, and frees its slot.
    ///
    /// A node with two children is replaced by its in-order successor, which
    /// is relinked into `node`'s position and takes over its color. Other
    /// nodes keep their ids, so ids collected before the call stay valid.
    fn remove_node(&mut self, node: NodeId) -> (String, String) {
        let left = self.arena.child(node, Side::Left);
        let right = self.arena.child(node, Side::Right);
        let mut removed_color = self.arena.color(node);

        let (replacement, replacement_parent) = if left.is_nil() {
            let parent = self.arena.parent(node);
            self.transplant(node, right);
            (right, parent)
        } else if right.is_nil() {
            let parent = self.arena.parent(node);
            self.transplant(node, left);
            (left, parent)
        } else {
            let successor = self.minimum(right);
            removed_color = self.arena.color(successor);
            let successor_right = self.arena.child(successor, Side::Right);

            let replacement_parent = if self.arena.parent(successor) == node {
                successor
            } else {
                let parent = self.arena.parent(successor);
                self.transplant(successor, successor_right);
                self.arena.set_child(successor, Side::Right, right);
                self.arena.set_parent(right, successor);
                parent
            };

            self.transplant(node, successor);
            self.arena.set_child(successor, Side::Left, left);
            self.arena.set_parent(left, successor);
            let color = self.arena.color(node);
            self.arena.set_color(successor, color);
            (successor_right, replacement_parent)
        };

        self.length -= 1;
        if removed_color == Color::Black {
            self.delete_fixup(replacement, replacement_parent);
        }
        self.arena.release(node)
    }

    /// Puts the subtree rooted at `with` where `target` hangs.
    fn transplant(&mut self, target: NodeId, with: NodeId) {
        let parent = self.arena.parent(target);
        if parent.is_nil() {
            self.root = with;
        } else {
            let side = self.arena.side_of(target, parent);
            self.arena.set_child(parent, side, with);
        }
        self.arena.set_parent(with, parent);
    }

    /// Restores the black-height after a black node left the position now
    /// held by `node`, whose parent is `parent`.
    ///
    /// `node` may be the sentinel; its parent is carried explicitly instead
    /// of being written into the sentinel.
    fn delete_fixup(&mut self, mut node: NodeId, mut parent: NodeId) {
        while node != self.root && self.arena.is_black(node) {
            let side = self.arena.side_of(node, parent);
            let mut sibling = self.arena.child(parent, side.opposite());

            if self.arena.is_red(sibling) {
                log::trace!("delete fixup: red sibling ({side:?})");
                self.arena.set_color(sibling, Color::Black);
                self.arena.set_color(parent, Color::Red);
                self.rotate(parent, side);
                sibling = self.arena.child(parent, side.opposite());
            }

            let near = self.arena.child(sibling, side);
            let far = self.arena.child(sibling, side.opposite());
            if self.arena.is_black(near) && self.arena.is_black(far) {
                log::trace!("delete fixup: black nephews, moving up ({side:?})");
                self.arena.set_color(sibling, Color::Red);
                node = parent;
                parent = self.arena.parent(node);
                continue;
            }

            if self.arena.is_black(far) {
                log::trace!("delete fixup: red near nephew, rotating sibling ({side:?})");
                self.arena.set_color(near, Color::Black);
                self.arena.set_color(sibling, Color::Red);
                self.rotate(sibling, side.opposite());
                sibling = self.arena.child(parent, side.opposite());
            }

            log::trace!("delete fixup: red far nephew, rotating parent ({side:?})");
            let parent_color = self.arena.color(parent);
            self.arena.set_color(sibling, parent_color);
            self.arena.set_color(parent, Color::Black);
            let far = self.arena.child(sibling, side.opposite());
            self.arena.set_color(far, Color::Black);
            self.rotate(parent, side);
            node = self.root;
        }

        if !node.is_nil() {
            self.arena.set_color(node, Color::Black);
        }
    }

    // =========================================================================
    // Rotation
    // =========================================================================

    /// Moves `node` down toward `side`, promoting its child on the other
    /// side into its place. In-order sequence is unchanged.
    fn rotate(&mut self, node: NodeId, side: Side) {
        let promoted = self.arena.child(node, side.opposite());
        let inner = self.arena.child(promoted, side);

        self.arena.set_child(node, side.opposite(), inner);
        self.arena.set_parent(inner, node);

        let parent = self.arena.parent(node);
        self.arena.set_parent(promoted, parent);
        if parent.is_nil() {
            self.root = promoted;
        } else {
            let parent_side = self.arena.side_of(node, parent);
            self.arena.set_child(parent, parent_side, promoted);
        }

        self.arena.set_child(promoted, side, node);
        self.arena.set_parent(node, promoted);
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Returns an iterator over entries in ascending key order.
    ///
    /// Duplicates appear in insertion order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmultimap::tree::BalancedOrderedMap;
    ///
    /// let map: BalancedOrderedMap = [("b", "2"), ("a", "1")].into_iter().collect();
    /// let entries: Vec<(&str, &str)> = map.iter().collect();
    /// assert_eq!(entries, vec![("a", "1"), ("b", "2")]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(&self.arena, self.root, self.length)
    }

    /// Walks the tree right subtree first, yielding each node's color and
    /// depth along with its entry.
    ///
    /// This is a diagnostic view of the tree's shape; use
    /// [`iter`](Self::iter) for ordered access. Each call starts a fresh
    /// walk.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmultimap::tree::{BalancedOrderedMap, Color};
    ///
    /// let map: BalancedOrderedMap = [("b", "2"), ("a", "1"), ("c", "3")].into_iter().collect();
    /// let shape: Vec<(&str, Color, usize)> = map
    ///     .traverse()
    ///     .map(|entry| (entry.key, entry.color, entry.depth))
    ///     .collect();
    ///
    /// assert_eq!(
    ///     shape,
    ///     vec![("c", Color::Red, 1), ("b", Color::Black, 0), ("a", Color::Red, 1)]
    /// );
    /// ```
    #[must_use]
    pub fn traverse(&self) -> ReverseInOrder<'_> {
        ReverseInOrder::new(&self.arena, self.root, self.length)
    }

    /// Returns a [`Display`](fmt::Display) adapter that draws the tree
    /// sideways, one entry per line, indented by depth.
    #[must_use]
    pub const fn diagram(&self) -> TreeDiagram<'_> {
        TreeDiagram::new(self)
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl Default for BalancedOrderedMap {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> FromIterator<(K, V)> for BalancedOrderedMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, V> Extend<(K, V)> for BalancedOrderedMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a> IntoIterator for &'a BalancedOrderedMap {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Two maps are equal when they hold the same entries in the same order,
/// regardless of tree shape.
impl PartialEq for BalancedOrderedMap {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl Eq for BalancedOrderedMap {}

impl fmt::Debug for BalancedOrderedMap {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl fmt::Display for BalancedOrderedMap {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for (key, value) in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Tests
// =============================================================================
