//! # gridform-core
//!
//! Core data structures for the gridform formula library.
//!
//! This crate provides the fundamental types the formula front end builds
//! on:
//! - [`Pos`] and [`Range`] - cell addressing, including open-ended ranges
//! - [`Value`] - the tagged value domain (number, text, time, bool, error)
//! - [`Operator`] - typed arithmetic and cross-type comparison over values
//! - Excel fractional time conversion ([`to_excel`] / [`from_excel`])
//! - The [`Sheet`] contract and an in-memory reference implementation
//!
//! ## Example
//!
//! ```rust
//! use gridform_core::{Operator, Pos, Value};
//!
//! let pos = Pos::parse("CD45").unwrap();
//! assert_eq!((pos.row, pos.col), (44, 81));
//!
//! let sum = Operator::Add.apply(&Value::Number(2.0), &Value::Bool(true));
//! assert_eq!(sum, Value::Number(3.0));
//! ```

pub mod address;
pub mod error;
pub mod ops;
pub mod sheet;
pub mod time;
pub mod value;

// Re-exports for convenience
pub use address::{column_to_letters, letters_to_column, Pos, Range, RangePositions, MAX_COL, MAX_ROW};
pub use error::{Error, Result};
pub use ops::{compare_values, Operator};
pub use sheet::{Context, Dimensions, InMemorySheet, Sheet, SheetValueRange, ValueRange};
pub use time::{from_excel, parse_time, to_excel};
pub use value::{parse_bool, CellError, SingleValueIter, SliceValueIter, Value, ValueIter};
