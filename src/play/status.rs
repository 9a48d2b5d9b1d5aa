use serde::Deserialize;
use serde::Serialize;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;

/// Game lifecycle. Won, Drawn and Abandoned are sinks; a reset swaps
/// the whole Game out rather than transitioning backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Waiting,
    Playing,
    Won,
    Drawn,
    Abandoned,
}

impl Status {
    pub fn is_active(&self) -> bool {
        matches!(self, Status::Playing)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Won | Status::Drawn | Status::Abandoned)
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            Status::Waiting => write!(f, "waiting"),
            Status::Playing => write!(f, "playing"),
            Status::Won => write!(f, "won"),
            Status::Drawn => write!(f, "drawn"),
            Status::Abandoned => write!(f, "abandoned"),
        }
    }
}
