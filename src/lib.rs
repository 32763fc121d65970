//! # rbmultimap
//!
//! An in-memory ordered multimap from string keys to string values, built
//! on a red-black tree.
//!
//! ## Overview
//!
//! - **Duplicate keys**: every insert adds a separate entry; entries that
//!   share a key stay together in insertion order
//! - **Guaranteed balance**: insert, find and delete are O(log N) in the
//!   worst case
//! - **Exact-match deletion**: delete removes entries matching both key and
//!   value
//! - **Diagnostics**: the tree's shape and colors can be walked or drawn,
//!   and its invariants checked
//!
//! ## Example
//!
//! ```rust
//! use rbmultimap::prelude::*;
//!
//! let mut map = BalancedOrderedMap::new();
//! map.insert("color", "red");
//! map.insert("color", "black");
//! map.insert("shape", "tree");
//!
//! assert_eq!(map.find("color"), vec!["red", "black"]);
//! assert_eq!(map.delete("color", "red"), 1);
//! assert_eq!(map.len(), 2);
//! assert!(map.check_invariants().is_ok());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use rbmultimap::prelude::*;
/// ```
pub mod prelude {
    pub use crate::tree::*;
}

pub mod tree;
