//! Prelude module - common imports for gridform users
//!
//! ```rust
//! use gridform::prelude::*;
//! ```

pub use crate::{
    parse_formula,
    CellError,
    CellReference,
    Context,
    Dimensions,
    // Error types
    Error,
    Formula,
    FormulaResult,
    InMemorySheet,
    Operator,
    ParseError,
    // Address types
    Pos,
    Range,
    RangeReference,
    Result,
    // Sheet contract
    Sheet,
    SheetValueRange,
    // Value types
    Value,
    ValueIter,
    ValueRange,
    MAX_COL,
    MAX_ROW,
};
