use std::fmt;

use thiserror::Error;

use crate::bits::{Bitboard, Position};
use crate::level::{Direction, Level};
use crate::reachable::ReachableSet;

/// A push as recorded by the search: which square the box left and which
/// way it went. The player's walk is filled in when the solution is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Push {
    pub from: Position,
    pub direction: Direction,
}

/// One push of a solution, together with the walk that precedes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushAction {
    pub box_from: Position,
    pub box_to: Position,
    pub direction: Direction,
    /// Squares the player walks through to reach the pushing square,
    /// starting at the player's current square. A single entry means no
    /// walking is needed.
    pub player_path: Vec<Position>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Walk,
    Push,
}

/// A single player step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub kind: MoveKind,
    pub direction: Direction,
}

impl Move {
    /// LURD letter: lowercase for walks, uppercase for pushes.
    pub fn to_char(self) -> char {
        let ch = self.direction.to_char();
        match self.kind {
            MoveKind::Walk => ch,
            MoveKind::Push => ch.to_ascii_uppercase(),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("move {index}: player cannot walk onto {pos}")]
    WalkBlocked { index: usize, pos: Position },
    #[error("move {index}: no box to push at {pos}")]
    NoBox { index: usize, pos: Position },
    #[error("move {index}: box cannot be pushed onto {pos}")]
    PushBlocked { index: usize, pos: Position },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub pushes: Vec<PushAction>,
    pub states_explored: usize,
}

impl Solution {
    /// Expand the chronological push list into full actions by replaying it
    /// from the level's initial configuration and routing the player to
    /// each pushing square.
    ///
    /// Panics if a push cannot be reached or executed, which means the
    /// search recorded an inconsistent backpointer chain.
    pub(crate) fn build(level: &Level, pushes: &[Push], states_explored: usize) -> Self {
        let mut player = level.player();
        let mut boxes: Vec<Position> = level.boxes().to_vec();
        let mut actions = Vec::with_capacity(pushes.len());

        for (i, push) in pushes.iter().enumerate() {
            let behind = level
                .move_position(push.from, push.direction.reverse())
                .unwrap_or_else(|| panic!("push {}: no square behind box at {}", i, push.from));
            let box_to = level
                .move_position(push.from, push.direction)
                .unwrap_or_else(|| panic!("push {}: box at {} pushed off the board", i, push.from));

            let reachable = ReachableSet::compute(level, player, &boxes);
            let player_path = reachable.path_to(behind).unwrap_or_else(|| {
                panic!("push {}: player at {} cannot reach {}", i, player, behind)
            });

            let slot = boxes
                .iter()
                .position(|&pos| pos == push.from)
                .unwrap_or_else(|| panic!("push {}: no box at {}", i, push.from));
            boxes[slot] = box_to;
            player = push.from;

            actions.push(PushAction {
                box_from: push.from,
                box_to,
                direction: push.direction,
                player_path,
            });
        }

        Solution {
            pushes: actions,
            states_explored,
        }
    }

    pub fn push_count(&self) -> usize {
        self.pushes.len()
    }

    /// Flatten into single steps: the walk to each push, then the push.
    pub fn moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        for action in &self.pushes {
            for pair in action.player_path.windows(2) {
                let direction = Direction::between(pair[0], pair[1])
                    .expect("player path steps are adjacent");
                moves.push(Move {
                    kind: MoveKind::Walk,
                    direction,
                });
            }
            moves.push(Move {
                kind: MoveKind::Push,
                direction: action.direction,
            });
        }
        moves
    }

    /// The move list in LURD notation.
    pub fn lurd(&self) -> String {
        self.moves().iter().map(|m| m.to_char()).collect()
    }

    /// Re-apply the move list to the level's initial configuration,
    /// checking every step. Returns the final box positions, sorted.
    pub fn replay(&self, level: &Level) -> Result<Vec<Position>, ReplayError> {
        let mut player = level.player();
        let mut boxes: Bitboard = level.boxes().iter().copied().collect();

        for (index, m) in self.moves().into_iter().enumerate() {
            let next = level
                .move_position(player, m.direction)
                .filter(|&pos| level.is_floor(pos));
            match m.kind {
                MoveKind::Walk => {
                    let pos = next.ok_or(ReplayError::WalkBlocked { index, pos: player })?;
                    if boxes.get(pos) {
                        return Err(ReplayError::WalkBlocked { index, pos });
                    }
                    player = pos;
                }
                MoveKind::Push => {
                    let pos = next.ok_or(ReplayError::NoBox { index, pos: player })?;
                    if !boxes.get(pos) {
                        return Err(ReplayError::NoBox { index, pos });
                    }
                    let dest = level
                        .move_position(pos, m.direction)
                        .filter(|&dest| level.is_floor(dest) && !boxes.get(dest))
                        .ok_or(ReplayError::PushBlocked { index, pos })?;
                    boxes.clear(pos);
                    boxes.set(dest);
                    player = pos;
                }
            }
        }

        Ok(boxes.iter().collect())
    }
}
