//! # gridform
//!
//! A Rust library for parsing and manipulating spreadsheet-style formulas
//! over a two-dimensional grid of cells.
//!
//! Gridform provides:
//!
//! - Cell addressing (`CD45`) and ranges, including open-ended column and
//!   row ranges (`C:E`, `23:45`)
//! - A formula parser producing an immutable AST, with the three quote
//!   styles, sheet-qualified references, and named ranges
//! - A tagged value domain with typed arithmetic, cross-type comparison,
//!   and spreadsheet-semantic error propagation (`#DIV/0`, `#VALUE`, ...)
//! - Excel fractional date/time conversion
//! - The `Sheet` contract used by downstream evaluators, with an in-memory
//!   reference implementation
//!
//! ## Example
//!
//! ```rust
//! use gridform::prelude::*;
//!
//! let ast = parse_formula("VLOOKUP( M23, `Other Sheet`!A1:C45, 1, FALSE )").unwrap();
//! assert_eq!(ast.to_string(), "VLOOKUP(M23, `Other Sheet`!A1:C45, 1, FALSE)");
//!
//! let sum = Operator::Add.apply(&Value::Number(100.3), &Value::Bool(true));
//! assert_eq!(sum, Value::Number(101.3));
//! ```

pub mod prelude;

// Re-export core types
pub use gridform_core::{
    column_to_letters,
    compare_values,
    from_excel,
    letters_to_column,
    parse_bool,
    parse_time,
    to_excel,
    CellError,
    Context,
    Dimensions,
    Error,
    InMemorySheet,
    Operator,
    Pos,
    Range,
    RangePositions,
    Result,
    Sheet,
    SheetValueRange,
    SingleValueIter,
    SliceValueIter,
    Value,
    ValueIter,
    ValueRange,
    MAX_COL,
    MAX_ROW,
};

// Re-export formula types
pub use gridform_formula::{
    parse_formula, CellReference, Formula, FormulaResult, Lexer, ParseError, Position,
    RangeReference, Token, TokenKind,
};
