use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;

/// Reasons the board engine rejects a move. These surface on the HTTP
/// boundary as unprocessable (422) and never produce a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    NotActive,
    NotYourTurn,
    OutOfBounds,
    Occupied,
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            Violation::NotActive => write!(f, "game is not active"),
            Violation::NotYourTurn => write!(f, "not your turn"),
            Violation::OutOfBounds => write!(f, "position is out of bounds"),
            Violation::Occupied => write!(f, "position is occupied"),
        }
    }
}
