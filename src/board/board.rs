use super::Move;
use super::Position;
use super::Symbol;
use super::Violation;
use serde::Serialize;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;

/// The 15x15 grid. A plain value: `apply` returns a new board and
/// leaves the prior snapshot addressable, which is what the broadcast
/// path and the search rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Board([[Option<Symbol>; crate::SIZE]; crate::SIZE]);

impl Default for Board {
    fn default() -> Self {
        Self([[None; crate::SIZE]; crate::SIZE])
    }
}

impl Board {
    pub fn get(&self, position: Position) -> Option<Symbol> {
        self.0[position.row][position.col]
    }

    pub fn is_empty(&self, position: Position) -> bool {
        self.get(position).is_none()
    }

    pub fn is_full(&self) -> bool {
        self.0
            .iter()
            .all(|row| row.iter().all(|cell| cell.is_some()))
    }

    /// Count of placed stones, either side.
    pub fn stones(&self) -> usize {
        self.0
            .iter()
            .map(|row| row.iter().filter(|cell| cell.is_some()).count())
            .sum()
    }

    /// Gatekeeper for a proposed placement. Checks run cheapest first;
    /// turn and liveness come from the owning game.
    pub fn validate(
        &self,
        row: i32,
        col: i32,
        symbol: Symbol,
        turn: Symbol,
        active: bool,
    ) -> std::result::Result<Position, Violation> {
        if !active {
            return Err(Violation::NotActive);
        }
        if symbol != turn {
            return Err(Violation::NotYourTurn);
        }
        let position = Position::checked(row, col).ok_or(Violation::OutOfBounds)?;
        if !self.is_empty(position) {
            return Err(Violation::Occupied);
        }
        Ok(position)
    }

    /// New board with exactly one more stone. All prior cells carry over.
    pub fn apply(&self, mv: &Move) -> Board {
        let mut next = *self;
        next.0[mv.row][mv.col] = Some(mv.symbol);
        next
    }

    /// Direct placement for search make-moves and test setup.
    pub fn place(&self, position: Position, symbol: Symbol) -> Board {
        let mut next = *self;
        next.0[position.row][position.col] = Some(symbol);
        next
    }

    pub fn positions() -> impl Iterator<Item = Position> {
        (0..crate::SIZE)
            .flat_map(|row| (0..crate::SIZE).map(move |col| Position::new(row, col)))
    }

    pub fn empties(&self) -> impl Iterator<Item = Position> + '_ {
        Self::positions().filter(|p| self.is_empty(*p))
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter) -> Result {
        for row in &self.0 {
            for cell in row {
                match cell {
                    Some(symbol) => write!(f, "{} ", symbol)?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
