use serde::Deserialize;
use serde::Serialize;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;

/// Stone variants. X and O are the live two-player set; T and S exist
/// for the dormant multi-party room kind and are never assigned by any
/// reachable entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    X,
    O,
    T,
    S,
}

impl Symbol {
    /// The adversary in a two-player game. T and S pair with each other
    /// so the mapping stays total.
    pub fn opponent(&self) -> Symbol {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
            Symbol::T => Symbol::S,
            Symbol::S => Symbol::T,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Symbol::X => 0,
            Symbol::O => 1,
            Symbol::T => 2,
            Symbol::S => 3,
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            Symbol::X => write!(f, "X"),
            Symbol::O => write!(f, "O"),
            Symbol::T => write!(f, "T"),
            Symbol::S => write!(f, "S"),
        }
    }
}

impl TryFrom<&str> for Symbol {
    type Error = String;
    fn try_from(s: &str) -> std::result::Result<Self, Self::Error> {
        match s {
            "X" => Ok(Symbol::X),
            "O" => Ok(Symbol::O),
            "T" => Ok(Symbol::T),
            "S" => Ok(Symbol::S),
            other => Err(format!("unknown symbol: {}", other)),
        }
    }
}
