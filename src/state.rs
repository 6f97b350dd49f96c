use std::hash::{Hash, Hasher};

use arrayvec::ArrayVec;

use crate::bits::Position;
use crate::level::{Level, MAX_BOXES};
use crate::zobrist::Zobrist;

/// Box positions kept sorted row-major, so two configurations are equal iff
/// their sequences are equal.
pub type Boxes = ArrayVec<Position, MAX_BOXES>;

/// A search node key: the canonical player square plus the box set.
///
/// Equality compares the player square and the sorted box sequence. Hashing
/// writes the precomputed Zobrist hash, which is maintained incrementally
/// across pushes.
#[derive(Debug, Clone)]
pub struct State {
    player: Position,
    boxes: Boxes,
    hash: u64,
}

impl State {
    /// `player` must already be normalized for `boxes`.
    pub fn new(zobrist: &Zobrist, player: Position, boxes: &[Position]) -> Self {
        let mut boxes: Boxes = boxes.iter().copied().collect();
        boxes.sort_unstable();
        let hash = zobrist.hash(player, &boxes);
        State {
            player,
            boxes,
            hash,
        }
    }

    pub fn player(&self) -> Position {
        self.player
    }

    pub fn boxes(&self) -> &[Position] {
        &self.boxes
    }

    /// True when every box rests on a goal.
    pub fn is_solved(&self, level: &Level) -> bool {
        self.boxes.iter().all(|&pos| level.is_goal(pos))
    }

    /// Box set after moving the box at index `box_index` to `to`, still
    /// sorted.
    pub fn moved_boxes(&self, box_index: usize, to: Position) -> Boxes {
        let mut boxes = self.boxes.clone();
        boxes[box_index] = to;
        boxes.sort_unstable();
        boxes
    }

    /// Successor state after the box at `box_index` is pushed to `to`.
    /// `boxes` is the result of [`State::moved_boxes`] and `player` the
    /// normalized player square for it.
    pub fn pushed(
        &self,
        zobrist: &Zobrist,
        box_index: usize,
        to: Position,
        boxes: Boxes,
        player: Position,
    ) -> State {
        let from = self.boxes[box_index];
        let hash = self.hash
            ^ zobrist.box_key(from)
            ^ zobrist.box_key(to)
            ^ zobrist.player_key(self.player)
            ^ zobrist.player_key(player);
        State {
            player,
            boxes,
            hash,
        }
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.player == other.player && self.boxes == other.boxes
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}
