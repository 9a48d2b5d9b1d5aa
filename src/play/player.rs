use crate::board::Symbol;
use serde::Serialize;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    Human,
    Ai,
}

impl Display for PlayerKind {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            PlayerKind::Human => write!(f, "human"),
            PlayerKind::Ai => write!(f, "ai"),
        }
    }
}

/// One seat in a game. The socket id tracks the live connection when
/// there is one; presence survives reconnects because the player, not
/// the socket, is the identity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub symbol: Symbol,
    pub kind: PlayerKind,
    #[serde(rename = "socketId")]
    pub socket: Option<String>,
    pub joined_at: u64,
    pub connected: bool,
    pub last_activity: u64,
}

impl Player {
    pub fn human(symbol: Symbol) -> Self {
        Self::new(symbol, PlayerKind::Human, false)
    }

    /// The AI seat counts as always connected.
    pub fn ai(symbol: Symbol) -> Self {
        Self::new(symbol, PlayerKind::Ai, true)
    }

    fn new(symbol: Symbol, kind: PlayerKind, connected: bool) -> Self {
        let now = crate::now_ms();
        Self {
            id: super::player_id(),
            symbol,
            kind,
            socket: None,
            joined_at: now,
            connected,
            last_activity: now,
        }
    }

    pub fn connect(&mut self, socket: String) {
        self.socket = Some(socket);
        self.connected = true;
        self.touch();
    }

    pub fn disconnect(&mut self) {
        self.socket = None;
        self.connected = false;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.last_activity = crate::now_ms();
    }
}

/// Seat assignment for a vs-AI game: the human gets the first-player
/// symbol unless they asked for the second.
pub fn assign_symbols_vs_ai(preference: Option<Symbol>) -> (Symbol, Symbol) {
    match preference {
        Some(Symbol::O) => (Symbol::O, Symbol::X),
        _ => (Symbol::X, Symbol::O),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_gets_first_move_unless_preferring_second() {
        assert_eq!(assign_symbols_vs_ai(None), (Symbol::X, Symbol::O));
        assert_eq!(assign_symbols_vs_ai(Some(Symbol::X)), (Symbol::X, Symbol::O));
        assert_eq!(assign_symbols_vs_ai(Some(Symbol::O)), (Symbol::O, Symbol::X));
    }

    #[test]
    fn presence_follows_the_socket() {
        let mut player = Player::human(Symbol::X);
        assert!(!player.connected);
        player.connect("s-1".into());
        assert!(player.connected);
        assert_eq!(player.socket.as_deref(), Some("s-1"));
        player.disconnect();
        assert!(!player.connected);
        assert!(player.socket.is_none());
    }
}
