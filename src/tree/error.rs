//! Error types for the balanced ordered map.
//!
//! Lookups and removals never fail: a missing key is an empty result. The
//! only operational error is running out of memory while growing the node
//! arena. [`InvariantViolation`] is reported by the structural checker and
//! indicates a bug in the engine, never a caller mistake.

use std::collections::TryReserveError;
use std::fmt;

/// Represents errors returned by fallible map operations.
///
/// # Examples
///
/// ```rust
/// use rbmultimap::tree::{BalancedOrderedMap, TreeError};
///
/// let mut map = BalancedOrderedMap::new();
/// let result: Result<(), TreeError> = map.try_insert("key", "value");
/// assert!(result.is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The node arena could not grow to hold a new entry.
    AllocationFailed(TryReserveError),
}

impl fmt::Display for TreeError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailed(error) => {
                write!(formatter, "failed to allocate a tree node: {error}")
            }
        }
    }
}

impl std::error::Error for TreeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::AllocationFailed(error) => Some(error),
        }
    }
}

impl From<TryReserveError> for TreeError {
    fn from(error: TryReserveError) -> Self {
        Self::AllocationFailed(error)
    }
}

/// A broken red-black or binary-search-tree property.
///
/// Returned by [`BalancedOrderedMap::check_invariants`](super::BalancedOrderedMap::check_invariants).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The root node is red.
    RedRoot,
    /// The root's parent link does not point at the sentinel.
    RootHasParent,
    /// A red node has a red child.
    RedChildOfRed {
        /// Key of the red parent.
        key: String,
    },
    /// Two root-to-leaf paths pass through different numbers of black nodes.
    BlackHeightMismatch {
        /// Key of the node whose missing child ends the offending path.
        key: String,
        /// Black node count of the first path checked.
        expected: usize,
        /// Black node count of the offending path.
        found: usize,
    },
    /// Two consecutive in-order keys are out of order.
    OutOfOrder {
        /// The earlier key in in-order position.
        previous: String,
        /// The later key, which compares less than `previous`.
        next: String,
    },
    /// A child's parent link does not point back at its parent.
    BrokenParentLink {
        /// Key of the child with the wrong parent link.
        key: String,
    },
    /// The number of reachable nodes differs from the recorded length.
    LengthMismatch {
        /// The recorded length.
        expected: usize,
        /// The number of nodes reachable from the root.
        actual: usize,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RedRoot => write!(formatter, "root node is red"),
            Self::RootHasParent => write!(formatter, "root node has a parent"),
            Self::RedChildOfRed { key } => {
                write!(formatter, "red node {key:?} has a red child")
            }
            Self::BlackHeightMismatch {
                key,
                expected,
                found,
            } => write!(
                formatter,
                "path ending below {key:?} has {found} black nodes, expected {expected}"
            ),
            Self::OutOfOrder { previous, next } => {
                write!(formatter, "key {next:?} follows greater key {previous:?}")
            }
            Self::BrokenParentLink { key } => {
                write!(formatter, "node {key:?} does not link back to its parent")
            }
            Self::LengthMismatch { expected, actual } => write!(
                formatter,
                "tree records {expected} entries but {actual} are reachable"
            ),
        }
    }
}

impl std::error::Error for InvariantViolation {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_allocation_failed_display_and_source() {
        let reserve_error = Vec::<u8>::new().try_reserve(usize::MAX).unwrap_err();
        let error = TreeError::from(reserve_error);

        assert!(error.to_string().starts_with("failed to allocate a tree node"));
        assert!(std::error::Error::source(&error).is_some());
    }

    #[rstest]
    #[case(InvariantViolation::RedRoot, "root node is red")]
    #[case(
        InvariantViolation::RedChildOfRed { key: "k".to_string() },
        "red node \"k\" has a red child"
    )]
    #[case(
        InvariantViolation::BlackHeightMismatch { key: "k".to_string(), expected: 2, found: 1 },
        "path ending below \"k\" has 1 black nodes, expected 2"
    )]
    #[case(
        InvariantViolation::OutOfOrder { previous: "b".to_string(), next: "a".to_string() },
        "key \"a\" follows greater key \"b\""
    )]
    #[case(
        InvariantViolation::LengthMismatch { expected: 3, actual: 2 },
        "tree records 3 entries but 2 are reachable"
    )]
    fn test_invariant_violation_display(
        #[case] violation: InvariantViolation,
        #[case] expected: &str,
    ) {
        assert_eq!(violation.to_string(), expected);
    }
}
