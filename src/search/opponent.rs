use super::Cache;
use super::Decision;
use super::minimax;
use crate::board::Board;
use crate::board::Symbol;
use std::sync::Arc;
use std::time::Duration;

/// The seam between the orchestrator and whatever produces AI replies.
/// The orchestrator only ever talks to this trait; the in-process
/// searcher is injected at startup.
#[async_trait::async_trait]
pub trait Opponent: Send + Sync {
    /// Produce a reply for the given position. `number` is the move
    /// about to be played, 1-based.
    async fn decide(&self, board: Board, symbol: Symbol, number: u32) -> anyhow::Result<Decision>;

    /// Transposition entries currently held, for the status surface.
    fn cached(&self) -> usize;

    /// Reaper hook: shed the transposition cache if oversize.
    fn trim(&self);
}

/// Alpha-beta searcher with a shared transposition cache. The search
/// is CPU-bound and deadline-long, so it hops to a blocking thread
/// rather than stalling a request executor.
pub struct Searcher {
    cache: Arc<Cache>,
    deadline: Duration,
    depth: u8,
}

impl Searcher {
    pub fn new(deadline: Duration, depth: u8, ceiling: usize) -> Self {
        Self {
            cache: Arc::new(Cache::new(ceiling)),
            deadline,
            depth,
        }
    }
}

#[async_trait::async_trait]
impl Opponent for Searcher {
    async fn decide(&self, board: Board, symbol: Symbol, number: u32) -> anyhow::Result<Decision> {
        let cache = self.cache.clone();
        let deadline = self.deadline;
        let depth = self.depth;
        tokio::task::spawn_blocking(move || {
            minimax::best_move(&board, symbol, number, &cache, deadline, depth)
        })
        .await?
    }

    fn cached(&self) -> usize {
        self.cache.len()
    }

    fn trim(&self) {
        self.cache.trim();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Position;

    #[tokio::test]
    async fn searcher_answers_and_fills_its_cache() {
        let searcher = Searcher::new(Duration::from_millis(200), 2, 1024);
        let board = Board::default()
            .place(Position::new(7, 7), Symbol::X)
            .place(Position::new(6, 6), Symbol::O)
            .place(Position::new(8, 8), Symbol::X);
        // past the book, this goes through the full search path
        let mut board = board;
        let mut turn = Symbol::O;
        for number in 9..=12u32 {
            let decision = searcher
                .decide(board, turn, number)
                .await
                .expect("playable board");
            assert!(board.is_empty(decision.position));
            board = board.place(decision.position, turn);
            turn = turn.opponent();
        }
        assert!(searcher.cached() > 0);
        searcher.trim();
    }
}
