use super::Cache;
use super::Decision;
use super::Hit;
use super::fingerprint;
use super::opening;
use super::patterns;
use crate::board::Board;
use crate::board::Position;
use crate::board::Symbol;
use crate::board::check_win;
use std::time::Duration;
use std::time::Instant;

/// Reply selection. Policy order: tactical scan (an immediate five for
/// either side preempts everything, including the book), opening book,
/// then bounded alpha-beta over the pattern evaluator. Deterministic
/// except for the book's second-move diagonal; ties fall to the lower
/// row, then the lower column.
///
/// The deadline is a hard wall: whatever the deepest completed
/// iteration recommends is returned, and with no time at all the top
/// heuristic candidate stands. The returned cell is always empty.
pub fn best_move(
    board: &Board,
    symbol: Symbol,
    number: u32,
    cache: &Cache,
    deadline: Duration,
    depth_limit: u8,
) -> anyhow::Result<Decision> {
    let start = Instant::now();
    let candidates = ranked(board);
    if candidates.is_empty() {
        anyhow::bail!("no playable cell on the board");
    }
    let elapsed = |start: Instant| start.elapsed().as_millis() as u64;

    if let Some(p) = five(board, &candidates, symbol) {
        return Ok(Decision::immediate(p, patterns::FIVE, elapsed(start)));
    }
    if let Some(p) = five(board, &candidates, symbol.opponent()) {
        return Ok(Decision::immediate(p, patterns::FIVE / 2, elapsed(start)));
    }
    if let Some(p) = opening::book(board, symbol, number) {
        return Ok(Decision::immediate(p, 0, elapsed(start)));
    }

    let key = fingerprint(board, symbol);
    if let Some(hit) = cache.get(key).filter(|hit| board.is_empty(hit.best)) {
        return Ok(Decision::searched(hit.best, hit.score, 0, hit.depth, elapsed(start)));
    }

    let wall = start + deadline;
    let mut search = Search {
        ai: symbol,
        wall,
        nodes: 0,
    };
    let top = candidates
        .iter()
        .take(crate::SEARCH_WIDTH)
        .copied()
        .collect::<Vec<_>>();
    let mut best = top[0];
    let mut score = patterns::evaluate(&board.place(best, symbol), symbol);
    let mut reached = 0;
    for depth in 1..=depth_limit {
        match search.root(board, &top, depth) {
            Some((p, value)) => {
                best = p;
                score = value;
                reached = depth;
            }
            // iteration cut short: keep the last completed answer
            None => break,
        }
    }
    cache.put(
        key,
        Hit {
            depth: reached,
            score,
            best,
        },
    );
    Ok(Decision::searched(best, score, search.nodes, reached, elapsed(start)))
}

/// A single move completing five for `symbol`, if one exists. Any such
/// cell borders an existing run, so the candidate set covers it.
fn five(board: &Board, candidates: &[Position], symbol: Symbol) -> Option<Position> {
    candidates
        .iter()
        .copied()
        .find(|p| check_win(&board.place(*p, symbol), *p, symbol).is_some())
}

/// Candidate cells: empties within distance 2 of any stone, ranked by
/// local support and centrality, position-ordered among equals. An
/// empty board yields the center.
pub fn ranked(board: &Board) -> Vec<Position> {
    if board.stones() == 0 {
        return vec![Position::center()];
    }
    let center = Position::center();
    let mut scored = board
        .empties()
        .filter(|p| near_stone(board, *p))
        .map(|p| {
            let support = (-2..=2isize)
                .flat_map(|dr| (-2..=2isize).map(move |dc| (dr, dc)))
                .filter(|(dr, dc)| (*dr, *dc) != (0, 0))
                .filter(|(dr, dc)| p.step(*dr, *dc).is_some_and(|q| !board.is_empty(q)))
                .count() as i64;
            let rank = 3 * support + (crate::SIZE as i64 - p.manhattan(&center) as i64);
            (rank, p)
        })
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    scored.into_iter().map(|(_, p)| p).collect()
}

fn near_stone(board: &Board, p: Position) -> bool {
    (-2..=2isize)
        .flat_map(|dr| (-2..=2isize).map(move |dc| (dr, dc)))
        .any(|(dr, dc)| p.step(dr, dc).is_some_and(|q| !board.is_empty(q)))
}

struct Search {
    ai: Symbol,
    wall: Instant,
    nodes: u64,
}

impl Search {
    /// One full-width root iteration. None when the wall interrupts it.
    fn root(&mut self, board: &Board, candidates: &[Position], depth: u8) -> Option<(Position, i64)> {
        let mut best: Option<(Position, i64)> = None;
        let mut alpha = i64::MIN + 1;
        let beta = i64::MAX;
        for p in candidates.iter().copied() {
            if Instant::now() >= self.wall {
                return None;
            }
            let child = board.place(p, self.ai);
            let value = if check_win(&child, p, self.ai).is_some() {
                patterns::FIVE + depth as i64
            } else {
                self.descend(&child, self.ai.opponent(), depth - 1, alpha, beta)?
            };
            let better = match best {
                None => true,
                Some((q, top)) => value > top || (value == top && p < q),
            };
            if better {
                best = Some((p, value));
            }
            alpha = alpha.max(value);
        }
        best
    }

    /// Alpha-beta over the ranked candidate set, scored from the AI's
    /// perspective. None propagates a deadline interruption.
    fn descend(
        &mut self,
        board: &Board,
        turn: Symbol,
        depth: u8,
        mut alpha: i64,
        mut beta: i64,
    ) -> Option<i64> {
        self.nodes += 1;
        if Instant::now() >= self.wall {
            return None;
        }
        if depth == 0 {
            return Some(patterns::evaluate(board, self.ai));
        }
        let candidates = ranked(board);
        if candidates.is_empty() {
            // full board, a draw from here
            return Some(0);
        }
        let maximizing = turn == self.ai;
        let mut value = if maximizing { i64::MIN + 1 } else { i64::MAX };
        for p in candidates.into_iter().take(crate::SEARCH_WIDTH) {
            let child = board.place(p, turn);
            let score = if check_win(&child, p, turn).is_some() {
                let soon = patterns::FIVE + depth as i64;
                if maximizing { soon } else { -soon }
            } else {
                self.descend(&child, turn.opponent(), depth - 1, alpha, beta)?
            };
            if maximizing {
                value = value.max(score);
                alpha = alpha.max(value);
            } else {
                value = value.min(score);
                beta = beta.min(value);
            }
            if beta <= alpha {
                break;
            }
        }
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stones(board: Board, symbol: Symbol, cells: &[(usize, usize)]) -> Board {
        cells.iter().fold(board, |b, (r, c)| {
            b.place(Position::new(*r, *c), symbol)
        })
    }

    fn decide(board: &Board, symbol: Symbol, number: u32) -> Decision {
        let cache = Cache::new(64);
        best_move(
            board,
            symbol,
            number,
            &cache,
            Duration::from_millis(250),
            2,
        )
        .expect("a playable cell exists")
    }

    #[test]
    fn blocks_an_open_four_even_inside_book_range() {
        let board = stones(Board::default(), Symbol::X, &[(7, 5), (7, 6), (7, 7), (7, 8)]);
        let decision = decide(&board, Symbol::O, 5);
        let blocks = [Position::new(7, 4), Position::new(7, 9)];
        assert!(blocks.contains(&decision.position));
    }

    #[test]
    fn completes_its_own_five_over_blocking() {
        let board = stones(Board::default(), Symbol::O, &[(7, 5), (7, 6), (7, 7), (7, 8)]);
        let board = stones(board, Symbol::X, &[(3, 3), (3, 4), (3, 5), (3, 6)]);
        let decision = decide(&board, Symbol::O, 9);
        let wins = [Position::new(7, 4), Position::new(7, 9)];
        assert!(wins.contains(&decision.position));
        let after = board.place(decision.position, Symbol::O);
        assert!(check_win(&after, decision.position, Symbol::O).is_some());
    }

    #[test]
    fn zero_deadline_still_returns_a_legal_move() {
        let board = stones(Board::default(), Symbol::X, &[(9, 9), (10, 10)])
            .place(Position::new(9, 10), Symbol::O);
        let cache = Cache::new(64);
        let decision = best_move(&board, Symbol::O, 11, &cache, Duration::ZERO, 4)
            .expect("a playable cell exists");
        assert!(board.is_empty(decision.position));
        assert_eq!(decision.depth, 0);
    }

    #[test]
    fn never_returns_an_occupied_cell() {
        let mut board = Board::default();
        let mut turn = Symbol::X;
        for number in 1..=20u32 {
            let decision = decide(&board, turn, number);
            assert!(board.is_empty(decision.position), "move {}", number);
            board = board.place(decision.position, turn);
            turn = turn.opponent();
        }
    }

    #[test]
    fn search_results_land_in_the_cache() {
        let board = stones(
            Board::default(),
            Symbol::X,
            &[(7, 7), (7, 8), (6, 6), (5, 6), (8, 8)],
        );
        let board = stones(board, Symbol::O, &[(6, 7), (6, 8), (8, 6), (9, 9)]);
        let cache = Cache::new(64);
        let first = best_move(&board, Symbol::O, 10, &cache, Duration::from_millis(250), 2)
            .expect("search");
        assert!(cache.len() > 0);
        let again = best_move(&board, Symbol::O, 10, &cache, Duration::from_millis(250), 2)
            .expect("cached");
        assert_eq!(first.position, again.position);
        assert_eq!(again.nodes, 0);
    }

    #[test]
    fn full_board_is_an_error_not_a_panic() {
        let mut board = Board::default();
        for p in Board::positions() {
            board = board.place(p, Symbol::X);
        }
        let cache = Cache::new(64);
        assert!(best_move(&board, Symbol::O, 226, &cache, Duration::ZERO, 1).is_err());
    }
}
