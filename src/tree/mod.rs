//! Balanced ordered multimap from string keys to string values.
//!
//! This module provides [`BalancedOrderedMap`], a red-black tree that keeps
//! duplicate keys as separate entries:
//!
//! - [`BalancedOrderedMap::insert`] adds an entry, keeping earlier
//!   duplicates in front of it
//! - [`BalancedOrderedMap::find`] returns every value stored under a key
//! - [`BalancedOrderedMap::delete`] removes every entry matching a key and
//!   value exactly
//! - [`BalancedOrderedMap::traverse`] exposes the tree's shape for
//!   diagnostics
//!
//! # Examples
//!
//! ```rust
//! use rbmultimap::tree::BalancedOrderedMap;
//!
//! let mut map = BalancedOrderedMap::new();
//! for (key, value) in [("m", "1"), ("c", "2"), ("x", "3"), ("a", "4"), ("e", "5")] {
//!     map.insert(key, value);
//! }
//!
//! assert_eq!(map.find("m"), vec!["1"]);
//!
//! let ascending: Vec<(&str, &str)> = map.iter().collect();
//! assert_eq!(
//!     ascending,
//!     vec![("a", "4"), ("c", "2"), ("e", "5"), ("m", "1"), ("x", "3")]
//! );
//!
//! map.delete("c", "2");
//! assert!(map.find("c").is_empty());
//! ```
//!
//! # Invariants
//!
//! After every operation:
//! 1. Every node is either red or black
//! 2. The root and the sentinel are black
//! 3. Red nodes have only black children
//! 4. Every path from a node down to a leaf has the same number of black nodes
//! 5. In-order keys never decrease, and duplicates keep insertion order
//!
//! [`BalancedOrderedMap::check_invariants`] verifies all of them.

mod error;
mod map;
mod node;
mod traverse;
mod validate;

pub use error::InvariantViolation;
pub use error::TreeError;
pub use map::BalancedOrderedMap;
pub use node::Color;
pub use traverse::Iter;
pub use traverse::ReverseInOrder;
pub use traverse::TreeDiagram;
pub use traverse::TreeEntry;
