use super::Game;
use super::Milestone;
use super::Player;
use super::PlayerKind;
use super::Status;
use super::WinStats;
use serde::Serialize;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoomKind {
    #[serde(rename = "human-vs-ai")]
    HumanVsAi,
    /// Data-model only: four seats, four symbols, no reachable entry
    /// point builds one.
    #[serde(rename = "multi-party")]
    MultiParty,
}

/// Why a seat request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    RoomFull,
    SymbolTaken,
    DuplicateKindInVsAi,
}

impl Display for Refusal {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            Refusal::RoomFull => write!(f, "room is full"),
            Refusal::SymbolTaken => write!(f, "symbol is taken"),
            Refusal::DuplicateKindInVsAi => write!(f, "seat kind already filled"),
        }
    }
}

/// The addressing unit for broadcast, and the exclusive owner of one
/// Game. Destroyed by the reaper or when the last human leaves.
#[derive(Debug, Clone)]
pub struct Room {
    pub code: String,
    pub kind: RoomKind,
    pub game: Game,
    pub max_players: usize,
    pub created: u64,
    pub activity: u64,
    /// Auto-reap deadline in unix millis.
    pub deadline: u64,
    pub stats: Option<WinStats>,
}

impl Room {
    pub fn vs_ai(code: String, game: Game, ttl: Duration) -> Self {
        let now = crate::now_ms();
        Self {
            code,
            kind: RoomKind::HumanVsAi,
            game,
            max_players: 2,
            created: now,
            activity: now,
            deadline: now + ttl.as_millis() as u64,
            stats: Some(WinStats::default()),
        }
    }

    pub fn touch(&mut self) {
        self.activity = crate::now_ms();
    }

    /// Pull the auto-reap deadline into the past; the next sweep takes
    /// the room.
    pub fn condemn(&mut self) {
        self.deadline = crate::now_ms();
    }

    pub fn add_player(&mut self, player: Player) -> std::result::Result<(), Refusal> {
        if self.game.players.len() >= self.max_players {
            return Err(Refusal::RoomFull);
        }
        if self.game.players.iter().any(|p| p.symbol == player.symbol) {
            return Err(Refusal::SymbolTaken);
        }
        if self.kind == RoomKind::HumanVsAi
            && self.game.players.iter().any(|p| p.kind == player.kind)
        {
            return Err(Refusal::DuplicateKindInVsAi);
        }
        self.game.players.push(player);
        self.touch();
        Ok(())
    }

    /// Drop a seat. True means the caller should schedule cleanup: the
    /// departing human was the room's reason to exist.
    pub fn remove_player(&mut self, id: &str) -> bool {
        let Some(index) = self.game.players.iter().position(|p| p.id == id) else {
            return false;
        };
        let player = self.game.players.remove(index);
        self.touch();
        if self.kind == RoomKind::HumanVsAi && player.kind == PlayerKind::Human {
            self.condemn();
            return true;
        }
        false
    }

    /// Fold a finished game into the streak counters.
    pub fn record_outcome(&mut self) -> Option<Milestone> {
        let winner = match self.game.status {
            Status::Won => self.game.winner,
            Status::Drawn => None,
            _ => return None,
        };
        let human = self.game.human()?.symbol;
        self.stats.as_mut()?.record(winner, human)
    }

    /// Fresh Game, same seats, same streak counters.
    pub fn reset_game(&mut self) {
        let mut players = std::mem::take(&mut self.game.players);
        for player in players.iter_mut() {
            player.touch();
        }
        self.game = Game::new(players);
        self.game.begin();
        self.touch();
    }

    /// Reap test: past the deadline, or deserted by humans, or settled
    /// and idle beyond the linger window.
    pub fn should_cleanup(&self, now: u64, linger: Duration) -> bool {
        if now > self.deadline {
            return true;
        }
        if self.game.connected_humans() == 0 && !self.game.players.is_empty() {
            return true;
        }
        matches!(self.game.status, Status::Won | Status::Drawn)
            && now.saturating_sub(self.game.activity) > linger.as_millis() as u64
    }
}
