use super::Player;
use super::PlayerKind;
use super::Status;
use crate::board::Board;
use crate::board::Move;
use crate::board::Position;
use crate::board::Symbol;
use crate::board::Violation;
use crate::board::check_win;
use serde::Serialize;

/// One playthrough: board, history, seats, outcome. Owned by exactly
/// one Room; a reset replaces the whole value.
#[derive(Debug, Clone)]
pub struct Game {
    pub id: String,
    pub board: Board,
    pub turn: Symbol,
    pub status: Status,
    pub winner: Option<Symbol>,
    pub line: Option<[Position; crate::WIN]>,
    pub moves: Vec<Move>,
    pub players: Vec<Player>,
    pub created: u64,
    pub activity: u64,
}

impl Game {
    pub fn new(players: Vec<Player>) -> Self {
        let now = crate::now_ms();
        Self {
            id: super::game_id(),
            board: Board::default(),
            turn: Symbol::X,
            status: Status::Waiting,
            winner: None,
            line: None,
            moves: Vec::new(),
            players,
            created: now,
            activity: now,
        }
    }

    /// Room readiness: waiting -> playing. Terminal states stay put.
    pub fn begin(&mut self) {
        if self.status == Status::Waiting {
            self.status = Status::Playing;
        }
    }

    pub fn abandon(&mut self) {
        if !self.status.is_terminal() {
            self.status = Status::Abandoned;
        }
    }

    /// Validate, apply, and settle one placement. On a winning move the
    /// status flips to Won with the five-stone line recorded; a full
    /// board without a winner is a draw; otherwise the turn passes.
    pub fn try_move(&mut self, row: i32, col: i32, symbol: Symbol) -> Result<Move, Violation> {
        let position = self.board.validate(
            row,
            col,
            symbol,
            self.turn,
            self.status.is_active(),
        )?;
        let mv = Move::new(position, symbol, self.moves.len() as u32 + 1);
        self.board = self.board.apply(&mv);
        self.moves.push(mv);
        self.activity = crate::now_ms();
        if let Some(line) = check_win(&self.board, position, symbol) {
            self.status = Status::Won;
            self.winner = Some(symbol);
            self.line = Some(line);
        } else if self.board.is_full() {
            self.status = Status::Drawn;
        } else {
            self.turn = self.turn.opponent();
        }
        Ok(mv)
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn by_symbol(&self, symbol: Symbol) -> Option<&Player> {
        self.players.iter().find(|p| p.symbol == symbol)
    }

    pub fn human(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.kind == PlayerKind::Human)
    }

    pub fn is_ai_turn(&self) -> bool {
        self.status.is_active()
            && self
                .by_symbol(self.turn)
                .is_some_and(|p| p.kind == PlayerKind::Ai)
    }

    pub fn connected_humans(&self) -> usize {
        self.players
            .iter()
            .filter(|p| p.kind == PlayerKind::Human && p.connected)
            .count()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            game_id: self.id.clone(),
            board: self.board,
            current_player: self.turn,
            status: self.status,
            winner: self.winner,
            winning_line: self.line,
            moves: self.moves.clone(),
            players: self.players.clone(),
            created_at: self.created,
            last_activity: self.activity,
        }
    }
}

/// Wire view of a game, the payload of state reads and resync events.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub game_id: String,
    pub board: Board,
    pub current_player: Symbol,
    pub status: Status,
    pub winner: Option<Symbol>,
    pub winning_line: Option<[Position; crate::WIN]>,
    pub moves: Vec<Move>,
    pub players: Vec<Player>,
    pub created_at: u64,
    pub last_activity: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vs_ai_game() -> Game {
        let mut game = Game::new(vec![Player::human(Symbol::X), Player::ai(Symbol::O)]);
        game.begin();
        game
    }

    #[test]
    fn moves_are_dense_from_one_and_alternate_turns() {
        let mut game = vs_ai_game();
        let first = game.try_move(7, 7, Symbol::X).expect("legal");
        assert_eq!(first.number, 1);
        assert_eq!(game.turn, Symbol::O);
        let second = game.try_move(8, 8, Symbol::O).expect("legal");
        assert_eq!(second.number, 2);
        assert_eq!(game.turn, Symbol::X);
    }

    #[test]
    fn replaying_a_move_is_rejected() {
        let mut game = vs_ai_game();
        game.try_move(7, 7, Symbol::X).expect("legal");
        assert_eq!(game.try_move(7, 7, Symbol::O), Err(Violation::Occupied));
    }

    #[test]
    fn turn_order_is_enforced() {
        let mut game = vs_ai_game();
        assert_eq!(game.try_move(7, 7, Symbol::O), Err(Violation::NotYourTurn));
    }

    #[test]
    fn waiting_games_refuse_moves() {
        let mut game = Game::new(vec![Player::human(Symbol::X), Player::ai(Symbol::O)]);
        assert_eq!(game.try_move(7, 7, Symbol::X), Err(Violation::NotActive));
    }

    #[test]
    fn winning_move_settles_the_game() {
        let mut game = vs_ai_game();
        for i in 0..4 {
            game.try_move(7, (3 + i) as i32, Symbol::X).expect("legal");
            game.try_move(10, (3 + i) as i32, Symbol::O).expect("legal");
        }
        game.try_move(7, 7, Symbol::X).expect("winning move");
        assert_eq!(game.status, Status::Won);
        assert_eq!(game.winner, Some(Symbol::X));
        let line = game.line.expect("winning line");
        assert!(line.contains(&Position::new(7, 7)));
        // terminal is a sink
        assert_eq!(game.try_move(0, 0, Symbol::O), Err(Violation::NotActive));
    }

    #[test]
    fn playing_implies_no_winner() {
        let mut game = vs_ai_game();
        game.try_move(7, 7, Symbol::X).expect("legal");
        assert!(game.status.is_active());
        assert!(game.winner.is_none());
    }

    #[test]
    fn full_board_without_winner_is_a_draw() {
        // a tiling with no five anywhere: period-four column stripes,
        // phase-shifted by two every other row
        let tiled = |r: usize, c: usize| {
            if (c + 2 * (r % 2)) % 4 < 2 {
                Symbol::X
            } else {
                Symbol::O
            }
        };
        let mut xs = Vec::new();
        let mut os = Vec::new();
        for r in 0..crate::SIZE {
            for c in 0..crate::SIZE {
                match tiled(r, c) {
                    Symbol::X => xs.push((r, c)),
                    _ => os.push((r, c)),
                }
            }
        }
        let mut game = vs_ai_game();
        let mut xs = xs.into_iter();
        let mut os = os.into_iter();
        loop {
            match game.turn {
                Symbol::X => match xs.next() {
                    Some((r, c)) => {
                        game.try_move(r as i32, c as i32, Symbol::X).expect("legal x");
                    }
                    None => break,
                },
                _ => match os.next() {
                    Some((r, c)) => {
                        game.try_move(r as i32, c as i32, Symbol::O).expect("legal o");
                    }
                    None => break,
                },
            }
            if game.status.is_terminal() {
                break;
            }
        }
        assert_eq!(game.status, Status::Drawn);
        assert!(game.winner.is_none());
        assert!(game.board.is_full());
    }

    #[test]
    fn vs_ai_seats_are_one_human_one_ai_with_distinct_symbols() {
        let game = vs_ai_game();
        assert_eq!(game.players.len(), 2);
        let human = game.human().expect("human seat");
        let ai = game
            .players
            .iter()
            .find(|p| p.kind == PlayerKind::Ai)
            .expect("ai seat");
        assert_ne!(human.symbol, ai.symbol);
    }
}
