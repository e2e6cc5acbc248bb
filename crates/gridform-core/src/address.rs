//! Cell position and range types
//!
//! Positions use 0-based row/column indices internally and print in the
//! familiar "CD45" form (bijective base-26 column letters, 1-based row).
//! Ranges are inclusive rectangles that may be open on the row or column
//! side via the [`MAX_ROW`] / [`MAX_COL`] sentinels.

use crate::error::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// Used as the value of `end_row` to indicate that a range covers every row
/// in the sheet.
pub const MAX_ROW: i32 = -1;

/// Used as the value of `end_col` to indicate that a range covers every
/// column in the sheet.
pub const MAX_COL: i32 = -1;

/// The position of a cell in a sheet (0-based row and column)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Pos {
    pub row: i32,
    pub col: i32,
}

impl Pos {
    /// Create a new position
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Parse a position in the form "AA23", where "AA" is the column and 23
    /// is the 1-based row.
    ///
    /// # Examples
    /// ```
    /// use gridform_core::Pos;
    ///
    /// let pos = Pos::parse("CD45").unwrap();
    /// assert_eq!(pos.row, 44);
    /// assert_eq!(pos.col, 81);
    /// assert_eq!(pos.to_string(), "CD45");
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let caps = RE_POS
            .captures(s)
            .ok_or_else(|| Error::InvalidAddress(s.to_string()))?;

        let col = letters_to_column(&caps[1]);
        let row = row_offset(&caps[2]).ok_or_else(|| Error::InvalidAddress(s.to_string()))?;
        Ok(Self { row, col })
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_to_letters(self.col), self.row + 1)
    }
}

impl FromStr for Pos {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// An inclusive rectangle of cells in a sheet (0-based indices)
///
/// `end_row == MAX_ROW` / `end_col == MAX_COL` denote a range that is open
/// on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Range {
    pub start_row: i32,
    pub end_row: i32,
    pub start_col: i32,
    pub end_col: i32,
}

impl Range {
    /// Create a range from explicit bounds
    pub fn new(start_row: i32, end_row: i32, start_col: i32, end_col: i32) -> Self {
        Self {
            start_row,
            end_row,
            start_col,
            end_col,
        }
    }

    /// Parse a range in the form "AA23:BC45". Supports open forms:
    ///
    /// * `AA23:BC45` - all cells in columns AA-BC and rows 23-45
    /// * `AA:BC`     - all rows in columns AA-BC
    /// * `23:45`     - all columns in rows 23-45
    /// * `D23:45`    - rows 23-45 starting at column D
    pub fn parse(s: &str) -> Result<Self> {
        let caps = RE_RANGE
            .captures(s)
            .ok_or_else(|| Error::InvalidRange(s.to_string()))?;

        let start_col = caps.get(1).map(|m| m.as_str());
        let start_row = caps.get(2).map(|m| m.as_str());
        let end_col = caps.get(3).map(|m| m.as_str());
        let end_row = caps.get(4).map(|m| m.as_str());

        // A side must not be completely empty, and a column-to-row (or
        // row-to-column) mix like "A:23" has no rectangular meaning.
        let malformed = (start_col.is_none() && start_row.is_none())
            || (end_col.is_none() && end_row.is_none())
            || (start_col.is_some()
                && start_row.is_none()
                && end_row.is_some()
                && end_col.is_none())
            || (start_col.is_none()
                && start_row.is_some()
                && end_col.is_some()
                && end_row.is_none());
        if malformed {
            return Err(Error::InvalidRange(s.to_string()));
        }

        let mut r = Range {
            start_row: 0,
            end_row: MAX_ROW,
            start_col: 0,
            end_col: MAX_COL,
        };

        if let Some(letters) = start_col {
            r.start_col = letters_to_column(letters);
        }
        if let Some(letters) = end_col {
            r.end_col = letters_to_column(letters);
        }
        if let Some(digits) = start_row {
            r.start_row = row_offset(digits).ok_or_else(|| Error::InvalidRange(s.to_string()))?;
        }
        if let Some(digits) = end_row {
            r.end_row = row_offset(digits).ok_or_else(|| Error::InvalidRange(s.to_string()))?;
        }

        Ok(r)
    }

    /// The top-left position of the range
    pub fn start_pos(&self) -> Pos {
        Pos {
            row: self.start_row,
            col: self.start_col,
        }
    }

    /// The bottom-right position of the range. For open ranges the
    /// corresponding coordinate is the sentinel.
    pub fn end_pos(&self) -> Pos {
        Pos {
            row: self.end_row,
            col: self.end_col,
        }
    }

    /// Check whether a position falls within this range. Open sides contain
    /// every coordinate past the start.
    pub fn contains(&self, pos: Pos) -> bool {
        pos.row >= self.start_row
            && (self.end_row == MAX_ROW || pos.row <= self.end_row)
            && pos.col >= self.start_col
            && (self.end_col == MAX_COL || pos.col <= self.end_col)
    }

    /// Check whether another range lies entirely within this range
    pub fn contains_range(&self, other: &Range) -> bool {
        let rows_ok = other.start_row >= self.start_row
            && (self.end_row == MAX_ROW
                || (other.end_row != MAX_ROW && other.end_row <= self.end_row));
        let cols_ok = other.start_col >= self.start_col
            && (self.end_col == MAX_COL
                || (other.end_col != MAX_COL && other.end_col <= self.end_col));
        rows_ok && cols_ok
    }

    /// The number of cells in the range. Only meaningful for bounded ranges;
    /// an open range reports 0.
    pub fn num_cells(&self) -> usize {
        let rows = (self.end_row - self.start_row + 1).max(0) as usize;
        let cols = (self.end_col - self.start_col + 1).max(0) as usize;
        rows * cols
    }

    /// Step column-major to the next position: increment the column, and on
    /// reaching the last column wrap to the start column on the next row.
    /// Returns `None` once the next position falls outside the range.
    pub fn next_pos(&self, pos: Pos) -> Option<Pos> {
        let next = if pos.col == self.end_col {
            Pos {
                row: pos.row + 1,
                col: self.start_col,
            }
        } else {
            Pos {
                row: pos.row,
                col: pos.col + 1,
            }
        };

        self.contains(next).then_some(next)
    }

    /// Resolve open sides against concrete sheet bounds
    pub fn bounded(&self, end_row: i32, end_col: i32) -> Range {
        Range {
            start_row: self.start_row,
            end_row: if self.end_row == MAX_ROW {
                end_row
            } else {
                self.end_row
            },
            start_col: self.start_col,
            end_col: if self.end_col == MAX_COL {
                end_col
            } else {
                self.end_col
            },
        }
    }

    /// Iterate over all positions in the range, column-major.
    ///
    /// The iterator is unbounded in the open direction of an open range.
    pub fn positions(&self) -> RangePositions {
        RangePositions {
            range: *self,
            next: Some(self.start_pos()),
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut start = String::new();
        let mut end = String::new();

        // Only show the start column if this is not a row-only range
        if self.start_col != 0 || self.end_col != MAX_COL {
            start.push_str(&column_to_letters(self.start_col));
        }

        // Only show the start row if this is not a column-only range
        if self.start_row != 0 || self.end_row != MAX_ROW {
            start.push_str(&(self.start_row + 1).to_string());
        }

        // Only show an end coordinate if it doesn't cover the entire sheet
        if self.end_col != MAX_COL {
            end.push_str(&column_to_letters(self.end_col));
        }

        if self.end_row != MAX_ROW {
            end.push_str(&(self.end_row + 1).to_string());
        }

        write!(f, "{}:{}", start, end)
    }
}

impl FromStr for Range {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Iterator over the positions of a range, column-major
pub struct RangePositions {
    range: Range,
    next: Option<Pos>,
}

impl Iterator for RangePositions {
    type Item = Pos;

    fn next(&mut self) -> Option<Pos> {
        let pos = self.next?;
        self.next = self.range.next_pos(pos);
        Some(pos)
    }
}

/// Convert a column index to letters (0 = A, 25 = Z, 26 = AA, ...)
pub fn column_to_letters(col: i32) -> String {
    let mut letters = Vec::new();
    let mut n = col;
    while n >= 0 {
        letters.push(char::from(b'A' + (n % 26) as u8));
        n = n / 26 - 1;
    }

    letters.reverse();
    letters.into_iter().collect()
}

/// Convert column letters to an index (A = 0, Z = 25, AA = 26, ...).
/// Letters are case-insensitive; the caller guarantees they are ASCII
/// alphabetic (both address regexes do).
pub fn letters_to_column(letters: &str) -> i32 {
    let mut col = 0;
    for (i, c) in letters.chars().enumerate() {
        if i != 0 {
            col = (col + 1) * 26;
        }
        col += c.to_ascii_uppercase() as i32 - 'A' as i32;
    }

    col
}

fn row_offset(digits: &str) -> Option<i32> {
    let row: i32 = digits.parse().ok()?;
    if row < 1 {
        return None;
    }

    Some(row - 1)
}

lazy_static! {
    static ref RE_POS: Regex = Regex::new(r"^([A-Za-z]{1,3})(\d+)$").unwrap();
    static ref RE_RANGE: Regex =
        Regex::new(r"^([A-Za-z]{1,3})?(\d+)?\s*:\s*([A-Za-z]{1,3})?(\d+)?$").unwrap();
}
