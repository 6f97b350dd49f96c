use crate::bits::Position;
use crate::hungarian::{CostMatrix, min_cost_assignment};
use crate::level::Level;

/// Trait for computing heuristics that estimate the number of pushes needed
/// to solve a level from a given box configuration.
pub trait Heuristic {
    /// Lower bound on the pushes still needed. Must never overestimate.
    fn estimate(&self, boxes: &[Position]) -> usize;
}

/// Always zero. Turns the search into uniform-cost (breadth-first by pushes).
pub struct NullHeuristic;

impl NullHeuristic {
    pub fn new() -> Self {
        NullHeuristic
    }
}

impl Default for NullHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl Heuristic for NullHeuristic {
    fn estimate(&self, _boxes: &[Position]) -> usize {
        0
    }
}

/// Minimum total Manhattan distance over every assignment of boxes to
/// goals.
pub struct MatchingHeuristic {
    goals: Vec<Position>,
}

impl MatchingHeuristic {
    pub fn new(level: &Level) -> Self {
        MatchingHeuristic {
            goals: level.goals().iter().collect(),
        }
    }
}

impl Heuristic for MatchingHeuristic {
    fn estimate(&self, boxes: &[Position]) -> usize {
        matching_cost(boxes, &self.goals)
    }
}

/// Minimum total Manhattan distance over all bijections between `boxes` and
/// `goals`, solved as an assignment problem.
///
/// Each box needs at least its Manhattan distance in pushes, so the result
/// is an admissible bound.
pub fn matching_cost(boxes: &[Position], goals: &[Position]) -> usize {
    assert_eq!(boxes.len(), goals.len(), "box and goal counts differ");

    let costs = CostMatrix::from_fn(boxes.len(), |row, col| {
        boxes[row].distance(goals[col]) as u16
    });
    min_cost_assignment(&costs)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::level::MAX_BOXES;

    /// Try every permutation without pruning.
    fn brute_force(boxes: &[Position], goals: &[Position]) -> usize {
        fn permute(
            boxes: &[Position],
            goals: &[Position],
            row: usize,
            used: &mut Vec<bool>,
            partial: usize,
            best: &mut usize,
        ) {
            if row == boxes.len() {
                *best = (*best).min(partial);
                return;
            }
            for col in 0..goals.len() {
                if !used[col] {
                    used[col] = true;
                    let cost = boxes[row].distance(goals[col]);
                    permute(boxes, goals, row + 1, used, partial + cost, best);
                    used[col] = false;
                }
            }
        }

        let mut best = usize::MAX;
        let mut used = vec![false; goals.len()];
        permute(boxes, goals, 0, &mut used, 0, &mut best);
        best
    }

    #[test]
    fn test_matching_solved() {
        let input = "####\n\
                     #@*#\n\
                     ####";
        let level = Level::parse(input).unwrap();
        let heuristic = MatchingHeuristic::new(&level);
        assert_eq!(heuristic.estimate(level.boxes()), 0);
    }

    #[test]
    fn test_matching_one_box() {
        let input = "######\n\
                     #.   #\n\
                     # $  #\n\
                     #  @ #\n\
                     ######";
        let level = Level::parse(input).unwrap();
        let heuristic = MatchingHeuristic::new(&level);
        assert_eq!(heuristic.estimate(level.boxes()), 2);
    }

    #[test]
    fn test_matching_prefers_optimal_assignment() {
        // In-order pairing costs 2 + 2, crossing over costs 0 + 0
        let boxes = [Position::new(1, 1), Position::new(3, 1)];
        let goals = [Position::new(3, 1), Position::new(1, 1)];
        assert_eq!(matching_cost(&boxes, &goals), 0);
    }

    #[test]
    fn test_matching_not_greedy() {
        // Greedy nearest-goal would send both boxes toward goal (2, 1)
        let boxes = [Position::new(1, 1), Position::new(3, 1)];
        let goals = [Position::new(2, 1), Position::new(9, 1)];
        assert_eq!(matching_cost(&boxes, &goals), 1 + 6);
    }

    #[test]
    fn test_matching_agrees_with_brute_force() {
        let boxes = [
            Position::new(2, 2),
            Position::new(3, 2),
            Position::new(4, 2),
            Position::new(5, 2),
            Position::new(6, 3),
            Position::new(1, 5),
        ];
        let goals = [
            Position::new(6, 1),
            Position::new(1, 1),
            Position::new(2, 4),
            Position::new(4, 4),
            Position::new(3, 6),
            Position::new(5, 5),
        ];
        assert_eq!(matching_cost(&boxes, &goals), brute_force(&boxes, &goals));
        assert_eq!(
            matching_cost(&boxes[..4], &goals[..4]),
            brute_force(&boxes[..4], &goals[..4])
        );
    }

    #[test]
    fn test_matching_many_boxes() {
        // A column of boxes, each ten squares left of a goal on its row
        let rows = 0..MAX_BOXES as u8;
        let boxes: Vec<Position> = rows.clone().map(|y| Position::new(1, y)).collect();
        let goals: Vec<Position> = rows.rev().map(|y| Position::new(11, y)).collect();
        assert_eq!(matching_cost(&boxes, &goals), 10 * MAX_BOXES);
    }

    #[test]
    fn test_null_heuristic() {
        let boxes = [Position::new(1, 1)];
        assert_eq!(NullHeuristic::new().estimate(&boxes), 0);
    }
}
