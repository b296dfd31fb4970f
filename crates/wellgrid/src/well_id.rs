//! Well identifiers: a row letter followed by a 1-based column number.

use std::fmt;
use std::str::FromStr;

use crate::error::{malformed, MappingError, MappingResult};

/// Maximum number of plate rows expressible with single row letters.
pub const MAX_ROWS: usize = 26;

/// A well position on the plate.
///
/// Ordering is row-major (`A1 < A2 < ... < B1`), which is also the order in
/// which layouts enumerate wells and maps iterate them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WellId {
    row: u8,
    col: u16,
}

impl WellId {
    /// `row` is 0-based (`A` = 0), `col` is the 1-based column number.
    pub(crate) fn new(row: u8, col: u16) -> Self {
        debug_assert!((row as usize) < MAX_ROWS);
        debug_assert!(col >= 1);
        Self { row, col }
    }

    /// Parse a label such as `A6` or `h12`.
    ///
    /// This checks syntax only; use [`crate::PlateLayout::parse_well`] to
    /// also check that the well exists on a given plate.
    pub fn parse(label: &str) -> MappingResult<Self> {
        let trimmed = label.trim();
        let mut chars = trimmed.chars();
        let Some(letter) = chars.next() else {
            return Err(malformed(label, "empty identifier"));
        };
        if !letter.is_ascii_alphabetic() {
            return Err(malformed(label, "must start with a row letter"));
        }

        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed(
                label,
                "row letter must be followed by a column number",
            ));
        }
        let col: u16 = digits
            .parse()
            .map_err(|_| malformed(label, "column number out of range"))?;
        if col == 0 {
            return Err(malformed(label, "column numbers start at 1"));
        }

        let row = letter.to_ascii_uppercase() as u8 - b'A';
        Ok(Self::new(row, col))
    }

    /// 0-based row index (`A` = 0).
    pub fn row(&self) -> u8 {
        self.row
    }

    /// 1-based column number.
    pub fn col(&self) -> u16 {
        self.col
    }

    pub fn row_letter(&self) -> char {
        char::from(b'A' + self.row)
    }
}

impl fmt::Display for WellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row_letter(), self.col)
    }
}

impl FromStr for WellId {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for WellId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for WellId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Self::parse(&label).map_err(serde::de::Error::custom)
    }
}
