use serde::Deserialize;
use serde::Serialize;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;

/// A cell coordinate. Always in-bounds once constructed through
/// [`Position::checked`]; raw construction is for trusted callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Bounds-checked construction from signed wire input.
    pub fn checked(row: i32, col: i32) -> Option<Self> {
        let n = crate::SIZE as i32;
        if (0..n).contains(&row) && (0..n).contains(&col) {
            Some(Self::new(row as usize, col as usize))
        } else {
            None
        }
    }

    /// Step along an axis direction, None when leaving the board.
    pub fn step(&self, dr: isize, dc: isize) -> Option<Self> {
        let row = self.row as isize + dr;
        let col = self.col as isize + dc;
        let n = crate::SIZE as isize;
        if (0..n).contains(&row) && (0..n).contains(&col) {
            Some(Self::new(row as usize, col as usize))
        } else {
            None
        }
    }

    /// Taxicab distance, the opening book's centrality measure.
    pub fn manhattan(&self, other: &Position) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// Board midpoint, the opening book's anchor.
    pub fn center() -> Self {
        Self::new(crate::CENTER, crate::CENTER)
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}
