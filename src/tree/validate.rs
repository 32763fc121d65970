//! Structural checks for [`BalancedOrderedMap`].

use smallvec::SmallVec;

use super::error::InvariantViolation;
use super::map::BalancedOrderedMap;
use super::node::{Color, NodeId, Side};

const STACK_INLINE_CAPACITY: usize = 32;

impl BalancedOrderedMap {
    /// Verifies every red-black and ordering property of the tree.
    ///
    /// Checks that the root is black and parentless, that no red node has a
    /// red child, that every root-to-leaf path carries the same number of
    /// black nodes, that parent links mirror child links, that in-order
    /// keys never decrease (so equal keys form one contiguous run), and that
    /// the recorded length matches the reachable nodes.
    ///
    /// Returns the black-height of the root: the number of black nodes on
    /// any path from the root down to a leaf.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmultimap::tree::BalancedOrderedMap;
    ///
    /// let map: BalancedOrderedMap = (0..100).map(|index| (index.to_string(), "v")).collect();
    /// assert!(map.check_invariants().is_ok());
    /// ```
    pub fn check_invariants(&self) -> Result<usize, InvariantViolation> {
        if self.root.is_nil() {
            return if self.length == 0 {
                Ok(0)
            } else {
                Err(InvariantViolation::LengthMismatch {
                    expected: self.length,
                    actual: 0,
                })
            };
        }
        if self.arena.is_red(self.root) {
            return Err(InvariantViolation::RedRoot);
        }
        if !self.arena.parent(self.root).is_nil() {
            return Err(InvariantViolation::RootHasParent);
        }

        let black_height = self.check_paths()?;
        self.check_order()?;
        Ok(black_height)
    }

    /// Depth-first pass over every node checking colors, parent links,
    /// black-heights and the node count.
    fn check_paths(&self) -> Result<usize, InvariantViolation> {
        let mut stack: SmallVec<[(NodeId, usize); STACK_INLINE_CAPACITY]> = SmallVec::new();
        stack.push((self.root, 0));
        let mut expected_black_height = None;
        let mut reachable = 0;

        while let Some((id, black_above)) = stack.pop() {
            reachable += 1;
            let node = self.arena.get(id);
            let black_count = black_above + usize::from(node.color == Color::Black);

            for side in [Side::Left, Side::Right] {
                let child = node.child(side);
                if child.is_nil() {
                    match expected_black_height {
                        None => expected_black_height = Some(black_count),
                        Some(expected) if expected != black_count => {
                            return Err(InvariantViolation::BlackHeightMismatch {
                                key: node.key.clone(),
                                expected,
                                found: black_count,
                            });
                        }
                        Some(_) => {}
                    }
                    continue;
                }

                if self.arena.parent(child) != id {
                    return Err(InvariantViolation::BrokenParentLink {
                        key: self.arena.get(child).key.clone(),
                    });
                }
                if node.color == Color::Red && self.arena.is_red(child) {
                    return Err(InvariantViolation::RedChildOfRed {
                        key: node.key.clone(),
                    });
                }
                stack.push((child, black_count));
            }
        }

        if reachable != self.length {
            return Err(InvariantViolation::LengthMismatch {
                expected: self.length,
                actual: reachable,
            });
        }
        Ok(expected_black_height.unwrap_or(0))
    }

    fn check_order(&self) -> Result<(), InvariantViolation> {
        let mut entries = self.iter();
        let Some((mut previous, _)) = entries.next() else {
            return Ok(());
        };
        for (next, _) in entries {
            if next < previous {
                return Err(InvariantViolation::OutOfOrder {
                    previous: previous.to_string(),
                    next: next.to_string(),
                });
            }
            previous = next;
        }
        Ok(())
    }

    /// Returns the number of nodes on the longest path from the root to a
    /// leaf; zero for an empty map.
    ///
    /// A red-black tree with `n` entries never exceeds `2 * log2(n + 1)`.
    #[must_use]
    pub fn height(&self) -> usize {
        let mut stack: SmallVec<[(NodeId, usize); STACK_INLINE_CAPACITY]> = SmallVec::new();
        if !self.root.is_nil() {
            stack.push((self.root, 1));
        }

        let mut height = 0;
        while let Some((id, depth)) = stack.pop() {
            height = height.max(depth);
            for side in [Side::Left, Side::Right] {
                let child = self.arena.child(id, side);
                if !child.is_nil() {
                    stack.push((child, depth + 1));
                }
            }
        }
        height
    }
}
