use std::fmt;

/// Maximum board extent along either axis. Each bitboard row is one `u64`.
pub const MAX_SIZE: usize = 64;

/// A square on the board.
///
/// Field order matters: the derived ordering is row-major (`y` first, then
/// `x`), which is the order used for canonical player positions and for
/// sorting box sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub y: u8,
    pub x: u8,
}

impl Position {
    pub fn new(x: u8, y: u8) -> Self {
        Position { y, x }
    }

    /// Manhattan distance between two squares.
    pub fn distance(self, other: Position) -> usize {
        (self.x.abs_diff(other.x) + self.y.abs_diff(other.y)) as usize
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A set of board squares stored as one 64-bit word per row.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitboard {
    rows: [u64; MAX_SIZE],
}

impl Bitboard {
    pub fn new() -> Self {
        Bitboard {
            rows: [0; MAX_SIZE],
        }
    }

    pub fn get(&self, pos: Position) -> bool {
        (self.rows[pos.y as usize] & (1u64 << pos.x)) != 0
    }

    pub fn set(&mut self, pos: Position) {
        self.rows[pos.y as usize] |= 1u64 << pos.x;
    }

    pub fn clear(&mut self, pos: Position) {
        self.rows[pos.y as usize] &= !(1u64 << pos.x);
    }

    pub fn len(&self) -> usize {
        self.rows.iter().map(|row| row.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|&row| row == 0)
    }

    /// Squares in `self` that are not in `other`.
    pub fn difference(&self, other: &Bitboard) -> Bitboard {
        let mut result = self.clone();
        for (row, other_row) in result.rows.iter_mut().zip(other.rows.iter()) {
            *row &= !other_row;
        }
        result
    }

    /// Iterate over the set squares in row-major order.
    pub fn iter(&self) -> BitboardIter<'_> {
        BitboardIter {
            board: self,
            y: 0,
            bits: self.rows[0],
        }
    }
}

impl Default for Bitboard {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Position> for Bitboard {
    fn from_iter<I: IntoIterator<Item = Position>>(iter: I) -> Self {
        let mut board = Bitboard::new();
        for pos in iter {
            board.set(pos);
        }
        board
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

pub struct BitboardIter<'a> {
    board: &'a Bitboard,
    y: usize,
    bits: u64,
}

impl Iterator for BitboardIter<'_> {
    type Item = Position;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.bits != 0 {
                let x = self.bits.trailing_zeros() as u8;
                self.bits &= self.bits - 1; // Clear lowest set bit
                return Some(Position::new(x, self.y as u8));
            }

            self.y += 1;
            if self.y >= MAX_SIZE {
                return None;
            }
            self.bits = self.board.rows[self.y];
        }
    }
}
