//! The sheet contract and its in-memory reference implementation
//!
//! A [`Sheet`] answers point lookups and hands out column-major iterators
//! over a [`Range`]. Retrieval methods take a [`Context`] so callers can
//! abort long-running retrievals from another thread; the in-memory
//! implementation honors it on every access.

use crate::address::{Pos, Range};
use crate::error::{Error, Result};
use crate::value::{Value, ValueIter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cancellation handle passed through sheet retrievals
///
/// Cloning is cheap and all clones share the same flag.
#[derive(Clone, Debug, Default)]
pub struct Context {
    cancelled: Arc<AtomicBool>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal every holder of this context to stop
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// The dimensions of a sheet (inclusive end bounds)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub end_row: i32,
    pub end_col: i32,
}

impl Dimensions {
    /// The range covering every cell within these dimensions
    pub fn full_range(&self) -> Range {
        Range::new(0, self.end_row, 0, self.end_col)
    }
}

/// Arbitrary access to a matrix of cells
pub trait Sheet {
    /// Retrieve the value at a position. The position must lie within
    /// [`dimensions`](Sheet::dimensions).
    fn get(&self, ctx: &Context, pos: Pos) -> Result<Value>;

    fn dimensions(&self) -> Dimensions;

    /// Iterate over the values of a range, column-major. Open sides of the
    /// range are resolved against [`dimensions`](Sheet::dimensions); both
    /// corners must then lie within the sheet.
    fn range(&self, _ctx: &Context, r: Range) -> Result<SheetValueRange<'_>>
    where
        Self: Sized,
    {
        let full = self.dimensions().full_range();
        let bounds = r.bounded(full.end_row, full.end_col);

        if !full.contains(bounds.start_pos()) {
            return Err(Error::PosOutOfBounds(bounds.start_pos()));
        }

        if !full.contains(bounds.end_pos()) {
            return Err(Error::PosOutOfBounds(bounds.end_pos()));
        }

        Ok(SheetValueRange {
            sheet: self,
            bounds,
            current: bounds.start_pos(),
            index: 0,
            value: None,
            err: None,
        })
    }
}

/// A [`ValueIter`] that can also report its position in the sheet
pub trait ValueRange: ValueIter {
    /// The sheet coordinate of the current value
    fn pos(&self) -> Pos;
}

/// Iterator over the values of a bounded range of a sheet
pub struct SheetValueRange<'a> {
    sheet: &'a dyn Sheet,
    bounds: Range,
    current: Pos,
    index: usize,
    value: Option<Value>,
    err: Option<Error>,
}

impl std::fmt::Debug for SheetValueRange<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetValueRange")
            .field("bounds", &self.bounds)
            .field("current", &self.current)
            .field("index", &self.index)
            .field("value", &self.value)
            .field("err", &self.err)
            .finish()
    }
}

impl ValueIter for SheetValueRange<'_> {
    fn next(&mut self, ctx: &Context) -> bool {
        if self.err.is_some() {
            return false;
        }

        if ctx.is_cancelled() {
            self.err = Some(Error::Cancelled);
            return false;
        }

        if self.value.is_none() {
            // First retrieval positions at the start of the range
            return self.fetch(ctx);
        }

        let Some(next) = self.bounds.next_pos(self.current) else {
            return false;
        };

        self.current = next;
        self.index += 1;
        self.fetch(ctx)
    }

    fn err(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    fn index(&self) -> usize {
        self.index
    }

    fn len(&self) -> usize {
        self.bounds.num_cells()
    }
}

impl ValueRange for SheetValueRange<'_> {
    fn pos(&self) -> Pos {
        self.current
    }
}

impl SheetValueRange<'_> {
    fn fetch(&mut self, ctx: &Context) -> bool {
        match self.sheet.get(ctx, self.current) {
            Ok(value) => {
                self.value = Some(value);
                true
            }
            Err(err) => {
                self.err = Some(err);
                false
            }
        }
    }
}

/// A sheet backed by a two-dimensional matrix of values
///
/// Rows may be ragged; positions past the end of a row read as empty text.
pub struct InMemorySheet {
    dims: Dimensions,
    values: Vec<Vec<Value>>,
}

impl InMemorySheet {
    pub fn new(values: Vec<Vec<Value>>) -> Self {
        let end_col = values
            .iter()
            .map(|row| row.len() as i32 - 1)
            .max()
            .unwrap_or(-1);

        Self {
            dims: Dimensions {
                end_row: values.len() as i32 - 1,
                end_col,
            },
            values,
        }
    }
}

impl Sheet for InMemorySheet {
    fn get(&self, ctx: &Context, pos: Pos) -> Result<Value> {
        if ctx.is_cancelled() {
            return Err(Error::Cancelled);
        }

        if !self.dims.full_range().contains(pos) {
            return Err(Error::PosOutOfBounds(pos));
        }

        let row = &self.values[pos.row as usize];
        if pos.col as usize >= row.len() {
            return Ok(Value::Text(String::new()));
        }

        Ok(row[pos.col as usize].clone())
    }

    fn dimensions(&self) -> Dimensions {
        self.dims
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number_sheet() -> InMemorySheet {
        // 3 rows x 4 cols, values encode row.col
        InMemorySheet::new(vec![
            vec![
                Value::Number(0.0),
                Value::Number(0.1),
                Value::Number(0.2),
                Value::Number(0.3),
            ],
            vec![Value::Number(1.0), Value::Number(1.1)],
            vec![
                Value::Number(2.0),
                Value::Number(2.1),
                Value::Number(2.2),
                Value::Number(2.3),
            ],
        ])
    }

    #[test]
    fn test_dimensions() {
        let sheet = number_sheet();
        assert_eq!(
            sheet.dimensions(),
            Dimensions {
                end_row: 2,
                end_col: 3
            }
        );
    }

    #[test]
    fn test_get() {
        let ctx = Context::new();
        let sheet = number_sheet();

        assert_eq!(
            sheet.get(&ctx, Pos::new(0, 0)).unwrap(),
            Value::Number(0.0)
        );
        assert_eq!(
            sheet.get(&ctx, Pos::new(2, 3)).unwrap(),
            Value::Number(2.3)
        );

        // Short rows read as empty text
        assert_eq!(
            sheet.get(&ctx, Pos::new(1, 3)).unwrap(),
            Value::Text(String::new())
        );

        // Out of bounds
        let err = sheet.get(&ctx, Pos::new(3, 0)).unwrap_err();
        assert_eq!(err, Error::PosOutOfBounds(Pos::new(3, 0)));
        let err = sheet.get(&ctx, Pos::new(0, 4)).unwrap_err();
        assert_eq!(err, Error::PosOutOfBounds(Pos::new(0, 4)));
    }

    #[test]
    fn test_range_iterates_column_major() {
        let ctx = Context::new();
        let sheet = number_sheet();

        let bounds = Range::parse("A1:B2").unwrap();
        let mut iter = sheet.range(&ctx, bounds).unwrap();
        assert_eq!(iter.len(), 4);

        let mut seen = Vec::new();
        while iter.next(&ctx) {
            seen.push((iter.pos().to_string(), iter.value().unwrap().clone()));
        }

        assert!(iter.err().is_none());
        assert_eq!(
            seen,
            [
                ("A1".to_string(), Value::Number(0.0)),
                ("B1".to_string(), Value::Number(0.1)),
                ("A2".to_string(), Value::Number(1.0)),
                ("B2".to_string(), Value::Number(1.1)),
            ]
        );
    }

    #[test]
    fn test_range_resolves_open_bounds() {
        let ctx = Context::new();
        let sheet = number_sheet();

        // B:B resolves to rows 0..=2 of column B
        let mut iter = sheet.range(&ctx, Range::parse("B:B").unwrap()).unwrap();
        assert_eq!(iter.len(), 3);

        let mut values = Vec::new();
        while iter.next(&ctx) {
            values.push(iter.value().unwrap().clone());
        }

        assert_eq!(
            values,
            [Value::Number(0.1), Value::Number(1.1), Value::Number(2.1)]
        );
    }

    #[test]
    fn test_range_out_of_bounds() {
        let ctx = Context::new();
        let sheet = number_sheet();

        let err = sheet
            .range(&ctx, Range::parse("A1:F2").unwrap())
            .unwrap_err();
        assert_eq!(err, Error::PosOutOfBounds(Pos::new(1, 5)));
    }

    #[test]
    fn test_cancellation_stops_iteration() {
        let ctx = Context::new();
        let sheet = number_sheet();

        let mut iter = sheet
            .range(&ctx, Range::parse("A1:D3").unwrap())
            .unwrap();
        assert!(iter.next(&ctx));

        ctx.cancel();
        assert!(!iter.next(&ctx));
        assert_eq!(iter.err(), Some(&Error::Cancelled));

        // get refuses cancelled contexts as well
        assert_eq!(
            sheet.get(&ctx, Pos::new(0, 0)).unwrap_err(),
            Error::Cancelled
        );
    }
}
