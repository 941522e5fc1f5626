//! Board-to-key encoding for the value table.
//!
//! A board (or a rectangular window of it) is flattened into a row-major
//! digit string and digested to a fixed-width `u64` key. Encoding is
//! deterministic and order-sensitive: structurally identical regions always
//! produce the same key, and any transposition changes it. Key collisions are
//! accepted as a rare, unmodeled approximation.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::game::{Board, Cell};

/// State key used to index the value table.
pub type StateKey = u64;

/// All windows whose first row is completely occupied share this key, so
/// filled-at-the-top regions collapse into a single bucket instead of
/// spawning one unreachable table entry per piece arrangement below.
pub const OVERFULL_KEY: StateKey = 0;

/// A filter window anchored at (offset_x, offset_y), already encoded.
/// `offset_x` is the value added to a window-relative column to obtain the
/// real board column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowKey {
    pub key: StateKey,
    pub offset_x: usize,
    pub offset_y: usize,
}

fn digit(cell: Cell) -> char {
    match cell {
        Cell::Empty => '0',
        Cell::Red => '1',
        Cell::Yellow => '2',
    }
}

fn digest(s: &str) -> StateKey {
    let mut hasher = DefaultHasher::new();
    s.hash(&mut hasher);
    hasher.finish()
}

/// Encode the whole board as a single key.
pub fn encode_whole(board: &Board) -> StateKey {
    let mut s = String::with_capacity(board.rows() * board.cols());
    for row in 0..board.rows() {
        for col in 0..board.cols() {
            s.push(digit(board.get(row, col)));
        }
    }
    digest(&s)
}

/// Encode a `filter`-sized window anchored at (offset_x, offset_y).
///
/// Iteration is clipped at the board edges; cells outside the board are
/// never read. A window whose first row holds no empty cell encodes to
/// [`OVERFULL_KEY`] regardless of its remaining contents.
pub fn encode_window(board: &Board, offset_x: usize, offset_y: usize, filter: usize) -> StateKey {
    let row_end = (offset_y + filter).min(board.rows());
    let col_end = (offset_x + filter).min(board.cols());

    let top_row_full =
        (offset_x..col_end).all(|col| board.get(offset_y, col) != Cell::Empty);
    if top_row_full {
        return OVERFULL_KEY;
    }

    let mut s = String::with_capacity(filter * filter);
    for row in offset_y..row_end {
        for col in offset_x..col_end {
            s.push(digit(board.get(row, col)));
        }
    }
    digest(&s)
}

/// Enumerate every filter window of the board, left-to-right then
/// top-to-bottom, over offsets `0..rows-filter` x `0..cols-filter`.
///
/// Yields exactly `(rows - filter) * (cols - filter)` windows. A filter at
/// least as large as either dimension yields none; callers fall back to
/// whole-board encoding for those shapes.
pub fn enumerate_windows(board: &Board, filter: usize) -> Vec<WindowKey> {
    let mut windows = Vec::new();
    if filter == 0 || filter >= board.rows() || filter >= board.cols() {
        return windows;
    }
    for offset_y in 0..board.rows() - filter {
        for offset_x in 0..board.cols() - filter {
            windows.push(WindowKey {
                key: encode_window(board, offset_x, offset_y, filter),
                offset_x,
                offset_y,
            });
        }
    }
    windows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Cell;

    fn board_after(cols: &[usize], rows: usize, width: usize) -> Board {
        let mut board = Board::new(rows, width);
        let mut cell = Cell::Red;
        for &col in cols {
            board.drop_piece(col, cell).unwrap();
            cell = if cell == Cell::Red { Cell::Yellow } else { Cell::Red };
        }
        board
    }

    #[test]
    fn test_encode_whole_is_deterministic() {
        let board = board_after(&[0, 1, 3, 3], 6, 7);
        assert_eq!(encode_whole(&board), encode_whole(&board));

        let same = board_after(&[0, 1, 3, 3], 6, 7);
        assert_eq!(encode_whole(&board), encode_whole(&same));
    }

    #[test]
    fn test_encode_whole_distinguishes_positions() {
        let a = board_after(&[0], 3, 3);
        let b = board_after(&[1], 3, 3);
        assert_ne!(encode_whole(&a), encode_whole(&b));
    }

    #[test]
    fn test_encode_whole_distinguishes_players() {
        let mut a = Board::new(3, 3);
        a.drop_piece(0, Cell::Red).unwrap();
        let mut b = Board::new(3, 3);
        b.drop_piece(0, Cell::Yellow).unwrap();
        assert_ne!(encode_whole(&a), encode_whole(&b));
    }

    #[test]
    fn test_window_count() {
        let board = Board::new(6, 7);
        let windows = enumerate_windows(&board, 3);
        assert_eq!(windows.len(), (6 - 3) * (7 - 3));
        for w in &windows {
            assert!(w.offset_y < 6 - 3);
            assert!(w.offset_x < 7 - 3);
        }
    }

    #[test]
    fn test_window_enumeration_order() {
        let board = Board::new(6, 7);
        let windows = enumerate_windows(&board, 3);
        assert_eq!((windows[0].offset_x, windows[0].offset_y), (0, 0));
        assert_eq!((windows[1].offset_x, windows[1].offset_y), (1, 0));
        assert_eq!((windows[4].offset_x, windows[4].offset_y), (0, 1));
    }

    #[test]
    fn test_oversized_filter_yields_no_windows() {
        let board = Board::new(3, 3);
        assert!(enumerate_windows(&board, 3).is_empty());
        assert!(enumerate_windows(&board, 0).is_empty());
    }

    #[test]
    fn test_empty_windows_share_a_key() {
        let board = Board::new(6, 7);
        let windows = enumerate_windows(&board, 3);
        let first = windows[0].key;
        assert!(windows.iter().all(|w| w.key == first));
    }

    #[test]
    fn test_window_sees_only_its_region() {
        // A piece in column 6 is outside the 3x3 window at (0, 0)
        let empty = Board::new(6, 7);
        let far = board_after(&[6], 6, 7);
        assert_eq!(
            encode_window(&empty, 0, 0, 3),
            encode_window(&far, 0, 0, 3)
        );

        // A piece in column 1 lands inside it (bottom row of the board is
        // outside a window anchored at the top, so stack to reach row 2)
        let mut near = Board::new(6, 7);
        for _ in 0..4 {
            near.drop_piece(1, Cell::Red).unwrap();
        }
        assert_ne!(
            encode_window(&empty, 0, 0, 3),
            encode_window(&near, 0, 0, 3)
        );
    }

    #[test]
    fn test_overfull_window_sentinel() {
        // Fill columns 0..3 to the top so the first row of the (0,0) window
        // is fully occupied.
        let mut a = Board::new(6, 7);
        let mut b = Board::new(6, 7);
        for col in 0..3 {
            for i in 0..6 {
                a.drop_piece(col, Cell::Red).unwrap();
                // Different contents below the top row
                let cell = if i % 2 == 0 { Cell::Yellow } else { Cell::Red };
                b.drop_piece(col, cell).unwrap();
            }
        }
        assert_eq!(encode_window(&a, 0, 0, 3), OVERFULL_KEY);
        assert_eq!(encode_window(&b, 0, 0, 3), OVERFULL_KEY);
    }

    #[test]
    fn test_partially_filled_top_row_is_not_sentinel() {
        let mut board = Board::new(6, 7);
        for _ in 0..6 {
            board.drop_piece(0, Cell::Red).unwrap();
        }
        // Column 0 reaches the window's first row, columns 1 and 2 do not
        assert_ne!(encode_window(&board, 0, 0, 3), OVERFULL_KEY);
    }
}
