//! Abstract syntax tree for the Reef language.
//!
//! The tree is strictly owned: every child is held by value (`Box`/`Vec`) by
//! exactly one parent, so "moving a node out" is an ordinary Rust move and
//! destruction is `Drop`. The external parser produces these nodes through
//! the constructors in [`builder`], which perform constant folding.

pub mod builder;
pub mod nodes;
pub mod ops;

pub use nodes::*;
pub use ops::{BinOp, UnaryOp};
