//! Iterators over a [`BalancedOrderedMap`] and its sideways diagram.

use std::fmt;
use std::iter::FusedIterator;

use smallvec::SmallVec;

use super::map::BalancedOrderedMap;
use super::node::{Arena, Color, NodeId, Side};

/// Inline stack capacity; enough for any tree of up to 65 535 entries.
const STACK_INLINE_CAPACITY: usize = 32;

// =============================================================================
// Walk
// =============================================================================

/// Explicit-stack in-order walk that descends toward `first` before
/// visiting a node and toward the other side after it.
#[derive(Clone)]
struct Walk<'a> {
    arena: &'a Arena,
    stack: SmallVec<[(NodeId, usize); STACK_INLINE_CAPACITY]>,
    first: Side,
    remaining: usize,
}

impl<'a> Walk<'a> {
    fn new(arena: &'a Arena, root: NodeId, length: usize, first: Side) -> Self {
        let mut walk = Self {
            arena,
            stack: SmallVec::new(),
            first,
            remaining: length,
        };
        walk.push_spine(root, 0);
        walk
    }

    fn push_spine(&mut self, mut node: NodeId, mut depth: usize) {
        while !node.is_nil() {
            self.stack.push((node, depth));
            node = self.arena.child(node, self.first);
            depth += 1;
        }
    }

    fn next_node(&mut self) -> Option<(NodeId, usize)> {
        let (node, depth) = self.stack.pop()?;
        let after = self.arena.child(node, self.first.opposite());
        self.push_spine(after, depth + 1);
        self.remaining = self.remaining.saturating_sub(1);
        Some((node, depth))
    }
}

// =============================================================================
// Ascending Iterator
// =============================================================================

/// An iterator over the entries of a [`BalancedOrderedMap`] in ascending
/// key order.
#[derive(Clone)]
pub struct Iter<'a> {
    walk: Walk<'a>,
}

impl<'a> Iter<'a> {
    pub(super) fn new(arena: &'a Arena, root: NodeId, length: usize) -> Self {
        Self {
            walk: Walk::new(arena, root, length, Side::Left),
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let (node, _) = self.walk.next_node()?;
        let node = self.walk.arena.get(node);
        Some((node.key.as_str(), node.value.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.walk.remaining, Some(self.walk.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

// =============================================================================
// Reverse In-Order Traversal
// =============================================================================

/// One node as seen by [`BalancedOrderedMap::traverse`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TreeEntry<'a> {
    /// The node's color.
    pub color: Color,
    /// The stored key.
    pub key: &'a str,
    /// The stored value.
    pub value: &'a str,
    /// Distance from the root; the root has depth 0.
    pub depth: usize,
}

/// Renders one diagram line: the color letter right-aligned in a field of
/// `depth * 4 + 4` columns, then the key and the value.
impl fmt::Display for TreeEntry<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.depth * 4 + 4;
        write!(
            formatter,
            "{:>width$} {} {}",
            self.color.letter(),
            self.key,
            self.value
        )
    }
}

/// Right-to-left depth-first walk of a [`BalancedOrderedMap`].
///
/// Created by [`BalancedOrderedMap::traverse`].
#[derive(Clone)]
pub struct ReverseInOrder<'a> {
    walk: Walk<'a>,
}

impl<'a> ReverseInOrder<'a> {
    pub(super) fn new(arena: &'a Arena, root: NodeId, length: usize) -> Self {
        Self {
            walk: Walk::new(arena, root, length, Side::Right),
        }
    }
}

impl<'a> Iterator for ReverseInOrder<'a> {
    type Item = TreeEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.walk.next_node()?;
        let node = self.walk.arena.get(id);
        Some(TreeEntry {
            color: node.color,
            key: node.key.as_str(),
            value: node.value.as_str(),
            depth,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.walk.remaining, Some(self.walk.remaining))
    }
}

impl ExactSizeIterator for ReverseInOrder<'_> {}

impl FusedIterator for ReverseInOrder<'_> {}

// =============================================================================
// Diagram
// =============================================================================

/// Sideways drawing of a tree: the rightmost entry on the first line, each
/// line indented by depth.
///
/// # Examples
///
/// ```rust
/// use rbmultimap::tree::BalancedOrderedMap;
///
/// let map: BalancedOrderedMap = [("b", "2"), ("a", "1"), ("c", "3")].into_iter().collect();
/// assert_eq!(
///     map.diagram().to_string(),
///     "       R c 3\n   B b 2\n       R a 1\n"
/// );
/// ```
#[derive(Clone, Copy)]
pub struct TreeDiagram<'a> {
    map: &'a BalancedOrderedMap,
}

impl<'a> TreeDiagram<'a> {
    pub(super) const fn new(map: &'a BalancedOrderedMap) -> Self {
        Self { map }
    }
}

impl fmt::Display for TreeDiagram<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in self.map.traverse() {
            writeln!(formatter, "{entry}")?;
        }
        Ok(())
    }
}
