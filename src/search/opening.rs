use crate::board::Board;
use crate::board::Position;
use crate::board::Symbol;
use rand::Rng;

/// Book coverage: the first eight moves of a quiet game.
pub fn covers(number: u32) -> bool {
    (1..=crate::BOOK_MOVES).contains(&number)
}

/// Opening book. `number` is the move about to be played, 1-based.
/// Returns None for positions the book declines, letting the caller
/// fall through to the evaluator. The only randomness in the whole
/// searcher lives in the second-move diagonal pick.
pub fn book(board: &Board, symbol: Symbol, number: u32) -> Option<Position> {
    if !covers(number) {
        return None;
    }
    let center = Position::center();
    match number {
        1 => Some(center).filter(|p| board.is_empty(*p)),
        2 => {
            if board.get(center) == Some(symbol.opponent()) {
                let diagonals = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
                let (dr, dc) = diagonals[rand::rng().random_range(0..diagonals.len())];
                center.step(dr, dc).filter(|p| board.is_empty(*p))
            } else {
                Some(center).filter(|p| board.is_empty(*p))
            }
        }
        3 => mirror(board, symbol, center).or_else(|| scored(board, number)),
        _ => scored(board, number),
    }
}

/// Third move: the diagonal opposite the opponent's reply, i.e. its
/// reflection through the center.
fn mirror(board: &Board, symbol: Symbol, center: Position) -> Option<Position> {
    let reply = Board::positions()
        .find(|p| board.get(*p) == Some(symbol.opponent()))?;
    let dr = center.row as isize - reply.row as isize;
    let dc = center.col as isize - reply.col as isize;
    center
        .step(dr, dc)
        .filter(|p| board.is_empty(*p))
        .filter(|p| *p != center)
}

/// Moves 4 through 8: centrality plus local support, scanned over the
/// radius-4 square around the center. Ties break toward the lower row
/// then lower column by scan order.
fn scored(board: &Board, number: u32) -> Option<Position> {
    let center = Position::center();
    let mut best: Option<(i64, Position)> = None;
    for row in crate::CENTER - 4..=crate::CENTER + 4 {
        for col in crate::CENTER - 4..=crate::CENTER + 4 {
            let p = Position::new(row, col);
            if !board.is_empty(p) || rejected(p, number) {
                continue;
            }
            let score = (10 - p.manhattan(&center) as i64) + 2 * neighborhood(board, p) as i64;
            if best.is_none_or(|(top, _)| score > top) {
                best = Some((score, p));
            }
        }
    }
    best.map(|(_, p)| p)
}

/// Early-game placement hygiene: no edge-hugging before move 9, no
/// corners before move 11.
fn rejected(p: Position, number: u32) -> bool {
    let n = crate::SIZE - 1;
    let edge = p.row < 2 || p.col < 2 || p.row > n - 2 || p.col > n - 2;
    let corner = (p.row == 0 || p.row == n) && (p.col == 0 || p.col == n);
    (number <= 8 && edge) || (number <= 10 && corner)
}

/// Stones of either side inside the 5x5 square centered on `p`.
fn neighborhood(board: &Board, p: Position) -> usize {
    let mut count = 0;
    for dr in -2..=2isize {
        for dc in -2..=2isize {
            if (dr, dc) == (0, 0) {
                continue;
            }
            if p.step(dr, dc).is_some_and(|q| !board.is_empty(q)) {
                count += 1;
            }
        }
    }
    count
}
