use crate::board::Move;
use crate::board::Position;
use crate::board::Symbol;
use crate::play::Milestone;
use crate::play::Snapshot;
use crate::play::WinStats;
use crate::search::Decision;
use serde_json::Value;
use serde_json::json;

/// Everything the game channel can say, one variant per wire type.
/// Terminal events are exempt from backpressure shedding; a socket
/// that cannot take one is closed instead.
#[derive(Debug, Clone)]
pub enum GameEvent {
    GameCreated { state: Snapshot },
    PlayerJoined { player_id: String, symbol: Symbol },
    PlayerLeft { player_id: String },
    MoveProcessing { player_id: String },
    MoveMade { mv: Move, state: Snapshot },
    AiThinking { symbol: Symbol },
    AiMove { mv: Move, decision: Decision, state: Snapshot },
    GameStateUpdate { state: Snapshot },
    GameOver(Box<Outcome>),
    GameReset { state: Snapshot },
    RoomClosed { reason: String },
    Error { error: String },
    Ping,
    Pong,
}

/// The game_over payload: who won, where, and the room's running tally.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub winner: Option<Symbol>,
    pub line: Option<[Position; crate::WIN]>,
    pub final_message: String,
    pub stats: Option<WinStats>,
    pub milestone: Option<Milestone>,
}

impl GameEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            GameEvent::GameCreated { .. } => "game_created",
            GameEvent::PlayerJoined { .. } => "player_joined",
            GameEvent::PlayerLeft { .. } => "player_left",
            GameEvent::MoveProcessing { .. } => "move_processing",
            GameEvent::MoveMade { .. } => "move_made",
            GameEvent::AiThinking { .. } => "ai_thinking",
            GameEvent::AiMove { .. } => "ai_move",
            GameEvent::GameStateUpdate { .. } => "game_state_update",
            GameEvent::GameOver(_) => "game_over",
            GameEvent::GameReset { .. } => "game_reset",
            GameEvent::RoomClosed { .. } => "room_closed",
            GameEvent::Error { .. } => "error",
            GameEvent::Ping => "ping",
            GameEvent::Pong => "pong",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GameEvent::GameOver(_) | GameEvent::RoomClosed { .. } | GameEvent::Error { .. }
        )
    }

    fn data(&self) -> Value {
        match self {
            GameEvent::GameCreated { state }
            | GameEvent::GameStateUpdate { state }
            | GameEvent::GameReset { state } => json!(state),
            GameEvent::PlayerJoined { player_id, symbol } => {
                json!({ "playerId": player_id, "symbol": symbol })
            }
            GameEvent::PlayerLeft { player_id } => json!({ "playerId": player_id }),
            GameEvent::MoveProcessing { player_id } => json!({ "playerId": player_id }),
            GameEvent::MoveMade { mv, state } => json!({ "move": mv, "gameState": state }),
            GameEvent::AiThinking { symbol } => json!({ "symbol": symbol }),
            GameEvent::AiMove { mv, decision, state } => {
                json!({ "move": mv, "decision": decision, "gameState": state })
            }
            GameEvent::GameOver(outcome) => json!({
                "winner": outcome.winner,
                "winningLine": outcome.line,
                "finalMessage": &outcome.final_message,
                "stats": outcome.stats,
                "milestone": &outcome.milestone,
            }),
            GameEvent::RoomClosed { reason } => json!({ "reason": reason }),
            GameEvent::Error { error } => json!({ "error": error }),
            GameEvent::Ping | GameEvent::Pong => json!({}),
        }
    }

    /// Rendered wire envelope. Rendered once per broadcast and shared
    /// across every subscriber's outbox.
    pub fn envelope(&self, room_id: Option<&str>, game_id: Option<&str>) -> String {
        json!({
            "type": self.kind(),
            "roomId": room_id,
            "gameId": game_id,
            "data": self.data(),
            "timestamp": crate::now_ms(),
        })
        .to_string()
    }
}
