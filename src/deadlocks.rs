use std::collections::VecDeque;

use crate::bits::{Bitboard, Position};
use crate::level::{ALL_DIRECTIONS, Direction, Level};

/// Compute the simple-deadlock squares of a level: floor squares from which
/// a lone box can never be pushed onto any goal.
///
/// Works backwards from every goal. A box resting on square `B` could have
/// been pushed there from `B + d` if the player had room to stand at
/// `B + 2d`. Any floor square never reached this way is dead.
pub fn compute_dead_squares(level: &Level) -> Bitboard {
    let mut reachable = Bitboard::new();

    for goal in level.goals().iter() {
        mark_reachable_from_goal(level, goal, &mut reachable);
    }

    level.floors().difference(&reachable).difference(level.goals())
}

fn mark_reachable_from_goal(level: &Level, goal: Position, reachable: &mut Bitboard) {
    // Already covered by an earlier goal's search
    if reachable.get(goal) {
        return;
    }

    let mut queue = VecDeque::new();
    queue.push_back(goal);
    reachable.set(goal);

    while let Some(box_pos) = queue.pop_front() {
        for dir in ALL_DIRECTIONS {
            let Some(prev_box) = level.move_position(box_pos, dir) else {
                continue;
            };
            let Some(player_pos) = level.move_position(prev_box, dir) else {
                continue;
            };
            if level.is_floor(prev_box) && level.is_floor(player_pos) && !reachable.get(prev_box)
            {
                reachable.set(prev_box);
                queue.push_back(prev_box);
            }
        }
    }
}

/// Returns true if the box configuration contains a frozen box that is not
/// on a goal.
///
/// A box is frozen when all four neighbours are walls or other frozen
/// boxes, so it can never be pushed along either axis. The frozen set is
/// computed as a greatest fixed point: every box starts as a candidate and
/// candidates with a neighbour that is neither a wall nor a candidate are
/// evicted until nothing changes. This catches clusters of boxes that brace
/// each other.
pub fn is_freeze_deadlock(level: &Level, boxes: &[Position]) -> bool {
    let mut frozen: Bitboard = boxes.iter().copied().collect();

    let blocked = |frozen: &Bitboard, pos: Position, dir: Direction| {
        level
            .move_position(pos, dir)
            .is_none_or(|next| level.is_wall(next) || frozen.get(next))
    };

    loop {
        let mut changed = false;
        for &pos in boxes {
            if !frozen.get(pos) {
                continue;
            }
            let horizontal =
                blocked(&frozen, pos, Direction::Left) && blocked(&frozen, pos, Direction::Right);
            let vertical =
                blocked(&frozen, pos, Direction::Up) && blocked(&frozen, pos, Direction::Down);
            if !(horizontal && vertical) {
                frozen.clear(pos);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    frozen.iter().any(|pos| !level.is_goal(pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corner_dead_squares() {
        let input = "#####\n\
                     #  .#\n\
                     # $ #\n\
                     #@  #\n\
                     #####";
        let level = Level::parse(input).unwrap();
        let dead = level.dead_squares();

        // Corners without goals
        assert!(dead.get(Position::new(1, 1)));
        assert!(dead.get(Position::new(1, 3)));
        assert!(dead.get(Position::new(3, 3)));
        // Goal is never dead
        assert!(!dead.get(Position::new(3, 1)));
        // Centre can be pushed onto the goal
        assert!(!dead.get(Position::new(2, 2)));
    }

    #[test]
    fn test_wall_edge_without_goal_is_dead() {
        let input = "######\n\
                     #    #\n\
                     # $. #\n\
                     #  @ #\n\
                     ######";
        let level = Level::parse(input).unwrap();
        let dead = level.dead_squares();

        // Every square along the walls is dead: no goal lies on an edge
        for x in 1..=4 {
            assert!(dead.get(Position::new(x, 1)), "top edge x={}", x);
            assert!(dead.get(Position::new(x, 3)), "bottom edge x={}", x);
        }
        assert!(dead.get(Position::new(1, 2)));
        assert!(dead.get(Position::new(4, 2)));
        assert!(!dead.get(Position::new(2, 2)));
        assert!(!dead.get(Position::new(3, 2)));
    }

    #[test]
    fn test_pocket_without_goal_is_dead() {
        // A box at (1, 2) can only move vertically, into the goal-less
        // corners at (1, 1) and (1, 3).
        let input = "#######\n\
                     #   . #\n\
                     # ### #\n\
                     #  $@ #\n\
                     #######";
        let level = Level::parse(input).unwrap();
        let dead = level.dead_squares();

        assert!(dead.get(Position::new(1, 2)));
        for goal in level.goals().iter() {
            assert!(!dead.get(goal));
        }
    }

    #[test]
    fn test_goals_never_dead() {
        let input = "#####\n\
                     #. .#\n\
                     # $ #\n\
                     #.$ #\n\
                     #$@ #\n\
                     #####";
        let level = Level::parse(input).unwrap();
        for goal in level.goals().iter() {
            assert!(!level.is_dead_square(goal), "goal {} marked dead", goal);
        }
    }

    #[test]
    fn test_dead_squares_subset_of_floors() {
        let input = "  ####\n\
                     ###  ####\n\
                     #     $ #\n\
                     # #  #$ #\n\
                     # . .#@ #\n\
                     #########";
        let level = Level::parse(input).unwrap();
        for pos in level.dead_squares().iter() {
            assert!(level.is_floor(pos));
            assert!(!level.is_goal(pos));
        }
    }

    const POCKET_OFF_GOAL: &str = "########\n\
                                   #@$ $..#\n\
                                   ########\n\
                                   ##  ####\n\
                                   ########";

    const POCKET_ON_GOAL: &str = "########\n\
                                  #@     #\n\
                                  ########\n\
                                  ##**####\n\
                                  ########";

    #[test]
    fn test_freeze_two_boxes_wedged_off_goal() {
        let level = Level::parse(POCKET_OFF_GOAL).unwrap();
        let boxes = [Position::new(2, 3), Position::new(3, 3)];
        assert!(is_freeze_deadlock(&level, &boxes));
    }

    #[test]
    fn test_freeze_two_boxes_wedged_on_goals() {
        let level = Level::parse(POCKET_ON_GOAL).unwrap();
        let boxes = [Position::new(2, 3), Position::new(3, 3)];
        assert!(!is_freeze_deadlock(&level, &boxes));
    }

    #[test]
    fn test_freeze_single_box_with_free_neighbour() {
        let level = Level::parse(POCKET_OFF_GOAL).unwrap();
        // A lone box in the pocket has a free neighbour
        let boxes = [Position::new(2, 3), Position::new(4, 1)];
        assert!(!is_freeze_deadlock(&level, &boxes));
    }

    #[test]
    fn test_no_freeze_in_open_room() {
        let input = "######\n\
                     #. . #\n\
                     # $$ #\n\
                     #  @ #\n\
                     ######";
        let level = Level::parse(input).unwrap();
        assert!(!is_freeze_deadlock(&level, level.boxes()));
        // Boxes side by side against the top wall can still slide
        let boxes = [Position::new(3, 1), Position::new(4, 1)];
        assert!(!is_freeze_deadlock(&level, &boxes));
    }

    #[test]
    fn test_freeze_on_goal_box_braces_off_goal_box() {
        let input = "########\n\
                     #@ $  .#\n\
                     ########\n\
                     ##* ####\n\
                     ########";
        let level = Level::parse(input).unwrap();

        // The box on the goal is frozen too, which pins its neighbour
        let boxes = [Position::new(2, 3), Position::new(3, 3)];
        assert!(is_freeze_deadlock(&level, &boxes));

        let boxes = [Position::new(2, 3), Position::new(6, 1)];
        assert!(!is_freeze_deadlock(&level, &boxes));
    }
}
