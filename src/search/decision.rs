use crate::board::Position;
use serde::Serialize;

/// The searcher's reply: where to play plus how hard it looked.
/// Confidence is derived from reached depth, 0.5 when the opening
/// book or a tactical scan answered without searching.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub position: Position,
    pub score: i64,
    pub nodes: u64,
    pub depth: u8,
    pub elapsed_ms: u64,
    pub confidence: f64,
}

impl Decision {
    /// A reply that required no lookahead.
    pub fn immediate(position: Position, score: i64, elapsed_ms: u64) -> Self {
        Self {
            position,
            score,
            nodes: 0,
            depth: 0,
            elapsed_ms,
            confidence: 0.5,
        }
    }

    pub fn searched(position: Position, score: i64, nodes: u64, depth: u8, elapsed_ms: u64) -> Self {
        Self {
            position,
            score,
            nodes,
            depth,
            elapsed_ms,
            confidence: (0.5 + depth as f64 * 0.05).min(0.95),
        }
    }
}
