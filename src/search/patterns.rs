use crate::board::AXES;
use crate::board::Board;
use crate::board::Position;
use crate::board::Symbol;

/// Run weights. An open three sits high enough that a double three
/// (two open threes through one stone set) outweighs a closed four.
pub const FIVE: i64 = 1_000_000;
pub const OPEN_FOUR: i64 = 50_000;
pub const FOUR: i64 = 10_000;
pub const OPEN_THREE: i64 = 6_000;
pub const THREE: i64 = 1_200;
pub const OPEN_TWO: i64 = 300;
pub const TWO: i64 = 80;
pub const ONE: i64 = 6;

fn weigh(length: usize, open_ends: usize) -> i64 {
    match (length, open_ends) {
        (n, _) if n >= crate::WIN => FIVE,
        (4, 2) => OPEN_FOUR,
        (4, 1) => FOUR,
        (3, 2) => OPEN_THREE,
        (3, 1) => THREE,
        (2, 2) => OPEN_TWO,
        (2, 1) => TWO,
        (1, 2) => ONE,
        // no empty end on either side: the run can never become five
        _ => 0,
    }
}

/// Sum of run weights for one side. Every contiguous run is counted
/// once, anchored at its head along each axis.
pub fn side(board: &Board, symbol: Symbol) -> i64 {
    let mut total = 0;
    for p in Board::positions().filter(|p| board.get(*p) == Some(symbol)) {
        for (dr, dc) in AXES {
            // not a head: the previous cell along the axis continues the run
            if p.step(-dr, -dc).is_some_and(|q| board.get(q) == Some(symbol)) {
                continue;
            }
            let mut length = 1;
            let mut tail = p;
            while let Some(q) = tail.step(dr, dc).filter(|q| board.get(*q) == Some(symbol)) {
                length += 1;
                tail = q;
            }
            let before = p.step(-dr, -dc).is_some_and(|q| board.is_empty(q)) as usize;
            let after = tail.step(dr, dc).is_some_and(|q| board.is_empty(q)) as usize;
            total += weigh(length, before + after);
        }
    }
    total
}

/// Position value from one side's perspective: own patterns minus the
/// opponent's.
pub fn evaluate(board: &Board, symbol: Symbol) -> i64 {
    side(board, symbol) - side(board, symbol.opponent())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stones(symbol: Symbol, cells: &[(usize, usize)]) -> Board {
        cells.iter().fold(Board::default(), |b, (r, c)| {
            b.place(Position::new(*r, *c), symbol)
        })
    }

    #[test]
    fn empty_board_is_neutral() {
        assert_eq!(evaluate(&Board::default(), Symbol::X), 0);
    }

    #[test]
    fn open_runs_outscore_blocked_runs() {
        let open = stones(Symbol::X, &[(7, 6), (7, 7), (7, 8)]);
        let blocked = open.place(Position::new(7, 5), Symbol::O);
        assert!(side(&open, Symbol::X) > side(&blocked, Symbol::X));
        // fully enclosed, the run is dead weight
        let dead = blocked.place(Position::new(7, 9), Symbol::O);
        assert!(side(&dead, Symbol::X) < side(&blocked, Symbol::X));
    }

    #[test]
    fn double_three_outweighs_closed_four() {
        // two open threes crossing at (7,7)
        let fork = stones(
            Symbol::X,
            &[(7, 6), (7, 7), (7, 8), (6, 7), (8, 7)],
        );
        let closed_four = stones(Symbol::X, &[(7, 4), (7, 5), (7, 6), (7, 7)])
            .place(Position::new(7, 3), Symbol::O);
        assert!(side(&fork, Symbol::X) > side(&closed_four, Symbol::X));
    }

    #[test]
    fn evaluate_is_antisymmetric() {
        let board = stones(Symbol::X, &[(7, 7), (7, 8)]).place(Position::new(5, 5), Symbol::O);
        assert_eq!(evaluate(&board, Symbol::X), -evaluate(&board, Symbol::O));
    }

    #[test]
    fn each_run_is_counted_once() {
        let pair = stones(Symbol::X, &[(3, 3), (3, 4)]);
        // one open two on the row, plus four open singles on the other axes
        // through each stone
        let expected = OPEN_TWO + 6 * ONE;
        assert_eq!(side(&pair, Symbol::X), expected);
    }
}
