//! stax-core - Branch stack graph layout
//!
//! This crate provides the building blocks for visualizing a stack of
//! dependent branches as a multi-lane ancestry graph:
//!
//! - Parsing newline-delimited JSON branch records from a stacking tool
//!   ([`parse_stack_output`])
//! - Reducing records to ordered display rows with lane assignment
//!   ([`build_rows`])
//! - The tree layout engine: computing per-row connector fragments
//!   ([`build_tree_fragments`])
//!
//! The layout engine is the heart of the crate. It is a pure function from a
//! row sequence to a fragment map: no I/O, no shared state, total over any
//! input. Dangling parent references degrade to disconnected roots instead
//! of errors.
//!
//! # Example
//!
//! ```
//! use stax_core::{BranchRow, build_tree_fragments};
//!
//! // Newest branches first, trunk last.
//! let rows = vec![
//!     BranchRow::new("feature", Some("main"), 1),
//!     BranchRow::new("main", None, 0),
//! ];
//!
//! let fragments = build_tree_fragments(&rows);
//!
//! // feature's lane exits below toward the fork at main's row...
//! assert!(fragments["feature"].lanes[1].continues_below);
//! // ...and main records the bend into lane 1.
//! assert_eq!(fragments["main"].child_fork_lanes[0].lane, 1);
//! ```

pub mod branch;
pub mod layout;
pub mod row;
pub mod stack;

pub use branch::{BranchRecord, DownLink, ParseWarning, PrInfo, StackParse, parse_stack_output};
pub use layout::{ForkPoint, LaneCell, TreeFragment, build_tree_fragments};
pub use row::{BranchRow, NodeStyle};
pub use stack::{UNCOMMITTED_ROW_NAME, build_rows};
