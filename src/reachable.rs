use std::collections::VecDeque;

use crate::bits::{Bitboard, MAX_SIZE, Position};
use crate::level::{ALL_DIRECTIONS, Direction, Level};

/// Squares the player can walk to without pushing anything.
pub struct ReachableSet {
    start: Position,
    squares: Bitboard,
    /// The lexicographically smallest reachable square.
    canonical: Position,
    /// Direction of the step that first entered each square.
    parents: Box<[[Option<Direction>; MAX_SIZE]; MAX_SIZE]>,
}

impl ReachableSet {
    /// Breadth-first search from `player`, treating walls and boxes as
    /// impassable.
    pub fn compute(level: &Level, player: Position, boxes: &[Position]) -> Self {
        let blocked: Bitboard = boxes.iter().copied().collect();
        let mut squares = Bitboard::new();
        let mut parents = Box::new([[None; MAX_SIZE]; MAX_SIZE]);
        let mut canonical = player;

        let mut queue = VecDeque::new();
        queue.push_back(player);
        squares.set(player);

        while let Some(pos) = queue.pop_front() {
            if pos < canonical {
                canonical = pos;
            }
            for dir in ALL_DIRECTIONS {
                let Some(next) = level.move_position(pos, dir) else {
                    continue;
                };
                if level.is_floor(next) && !blocked.get(next) && !squares.get(next) {
                    squares.set(next);
                    parents[next.y as usize][next.x as usize] = Some(dir);
                    queue.push_back(next);
                }
            }
        }

        ReachableSet {
            start: player,
            squares,
            canonical,
            parents,
        }
    }

    pub fn canonical(&self) -> Position {
        self.canonical
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.squares.get(pos)
    }

    /// Shortest walking path from the start square to `target`, including
    /// both endpoints. Returns `None` if `target` is not reachable.
    pub fn path_to(&self, target: Position) -> Option<Vec<Position>> {
        if !self.contains(target) {
            return None;
        }

        let mut path = vec![target];
        let mut pos = target;
        while pos != self.start {
            let dir = self.parents[pos.y as usize][pos.x as usize]?;
            let (dx, dy) = dir.delta();
            pos = Position::new(
                (pos.x as i8 - dx) as u8,
                (pos.y as i8 - dy) as u8,
            );
            path.push(pos);
        }
        path.reverse();
        Some(path)
    }
}

/// Canonical player position: the lexicographically smallest square the
/// player can reach from `player` given the box configuration.
pub fn normalize(level: &Level, player: Position, boxes: &[Position]) -> Position {
    ReachableSet::compute(level, player, boxes).canonical()
}
