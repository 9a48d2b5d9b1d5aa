use crate::board::Board;
use crate::board::Symbol;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::sync::LazyLock;

/// Zobrist keys for every (cell, symbol) pair plus the side to move.
/// Seeded deterministically: fingerprints only need to be consistent
/// within one process, and a fixed seed keeps them testable.
struct Keys {
    cells: [[u64; 4]; crate::SIZE * crate::SIZE],
    turns: [u64; 4],
}

static KEYS: LazyLock<Keys> = LazyLock::new(|| {
    let mut rng = SmallRng::seed_from_u64(0x676f_6d6f_6b75);
    let mut cells = [[0u64; 4]; crate::SIZE * crate::SIZE];
    for cell in cells.iter_mut() {
        for key in cell.iter_mut() {
            *key = rng.random();
        }
    }
    let mut turns = [0u64; 4];
    for key in turns.iter_mut() {
        *key = rng.random();
    }
    Keys { cells, turns }
});

/// Transposition key of a board with a given side to move.
pub fn fingerprint(board: &Board, turn: Symbol) -> u64 {
    let keys = &*KEYS;
    let mut hash = keys.turns[turn.index()];
    for p in Board::positions() {
        if let Some(symbol) = board.get(p) {
            hash ^= keys.cells[p.row * crate::SIZE + p.col][symbol.index()];
        }
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Position;

    #[test]
    fn equal_boards_share_a_fingerprint() {
        let a = Board::default().place(Position::new(7, 7), Symbol::X);
        let b = Board::default().place(Position::new(7, 7), Symbol::X);
        assert_eq!(fingerprint(&a, Symbol::O), fingerprint(&b, Symbol::O));
    }

    #[test]
    fn side_to_move_and_placement_change_the_fingerprint() {
        let board = Board::default().place(Position::new(7, 7), Symbol::X);
        assert_ne!(fingerprint(&board, Symbol::X), fingerprint(&board, Symbol::O));
        let other = board.place(Position::new(0, 0), Symbol::O);
        assert_ne!(fingerprint(&board, Symbol::O), fingerprint(&other, Symbol::O));
        let swapped = Board::default().place(Position::new(7, 7), Symbol::O);
        assert_ne!(fingerprint(&board, Symbol::X), fingerprint(&swapped, Symbol::X));
    }
}
