use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use fnv::FnvHashMap;
use log::{info, trace};

use crate::deadlocks::is_freeze_deadlock;
use crate::heuristic::{Heuristic, MatchingHeuristic};
use crate::level::{ALL_DIRECTIONS, Level};
use crate::pqueue::PriorityQueue;
use crate::reachable::{ReachableSet, normalize};
use crate::solution::{Push, Solution};
use crate::state::State;
use crate::zobrist::Zobrist;

pub const DEFAULT_MAX_STATES: usize = 1_000_000;
pub const DEFAULT_PROGRESS_INTERVAL: usize = 5000;

/// Receives the cumulative number of explored states at a fixed cadence.
/// Observers cannot influence the search.
pub trait Observer {
    fn progress(&mut self, states_explored: usize);
}

/// Observer that ignores every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObserver;

impl Observer for NoObserver {
    fn progress(&mut self, _states_explored: usize) {}
}

impl<F: FnMut(usize)> Observer for F {
    fn progress(&mut self, states_explored: usize) {
        self(states_explored)
    }
}

/// Resource bounds and switches for one solve.
#[derive(Debug, Clone)]
pub struct SolveOpts {
    /// Abort once this many states have been expanded.
    pub max_states: usize,
    /// Abort once this instant has passed.
    pub deadline: Option<Instant>,
    /// Abort as soon as the flag is set.
    pub cancel: Option<Arc<AtomicBool>>,
    /// Observer cadence in expanded states. Zero disables progress reports.
    pub progress_interval: usize,
    /// Prune successors holding a frozen box off a goal.
    pub freeze_deadlocks: bool,
}

impl Default for SolveOpts {
    fn default() -> Self {
        SolveOpts {
            max_states: DEFAULT_MAX_STATES,
            deadline: None,
            cancel: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            freeze_deadlocks: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    StateLimit,
    Deadline,
    Cancelled,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::StateLimit => write!(f, "state limit reached"),
            AbortReason::Deadline => write!(f, "deadline passed"),
            AbortReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveResult {
    Solved(Solution),
    /// The reachable state space was exhausted: no solution exists.
    Unsolvable { states_explored: usize },
    /// Gave up before reaching a verdict.
    Aborted {
        reason: AbortReason,
        states_explored: usize,
    },
}

impl SolveResult {
    pub fn states_explored(&self) -> usize {
        match self {
            SolveResult::Solved(solution) => solution.states_explored,
            SolveResult::Unsolvable { states_explored }
            | SolveResult::Aborted {
                states_explored, ..
            } => *states_explored,
        }
    }
}

/// Solve with the matching heuristic and no progress observer.
pub fn solve(level: &Level, opts: SolveOpts) -> SolveResult {
    Solver::new(level, MatchingHeuristic::new(level), opts, NoObserver).solve()
}

/// Solve with the matching heuristic, reporting progress to `observer`.
pub fn solve_with_observer<O: Observer>(
    level: &Level,
    opts: SolveOpts,
    observer: O,
) -> SolveResult {
    Solver::new(level, MatchingHeuristic::new(level), opts, observer).solve()
}

struct Node {
    state: State,
    /// Best known push count from the initial state.
    g: usize,
    closed: bool,
    parent: Option<(usize, Push)>,
}

/// How a newly generated path relates to what the search already knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    /// First time this state is seen.
    Vacant,
    /// Open node that the new path reaches in fewer pushes.
    Improves(usize),
    /// Closed, or already reached in as few pushes.
    Stale,
}

/// Node arena plus the state index into it. Node 0 is the initial state.
#[derive(Default)]
struct NodeTable {
    nodes: Vec<Node>,
    index: FnvHashMap<State, usize>,
}

impl NodeTable {
    fn entry(&self, state: &State, g: usize) -> Entry {
        match self.index.get(state) {
            None => Entry::Vacant,
            Some(&idx) if self.nodes[idx].closed || self.nodes[idx].g <= g => Entry::Stale,
            Some(&idx) => Entry::Improves(idx),
        }
    }

    /// Store `state` at `g` pushes behind `parent` and return its node index.
    fn record(
        &mut self,
        entry: Entry,
        state: State,
        g: usize,
        parent: Option<(usize, Push)>,
    ) -> usize {
        match entry {
            Entry::Improves(idx) => {
                let node = &mut self.nodes[idx];
                node.g = g;
                node.parent = parent;
                idx
            }
            Entry::Vacant => {
                let idx = self.nodes.len();
                self.index.insert(state.clone(), idx);
                self.nodes.push(Node {
                    state,
                    g,
                    closed: false,
                    parent,
                });
                idx
            }
            Entry::Stale => panic!("recording a stale path to a known state"),
        }
    }
}

/// Push-optimal A* search over normalized states.
///
/// All search tables live inside a single [`Solver::solve`] call, so
/// independent solvers can run concurrently without sharing anything.
pub struct Solver<'a, H: Heuristic, O: Observer> {
    level: &'a Level,
    heuristic: H,
    opts: SolveOpts,
    observer: O,
    zobrist: Zobrist,
    states_explored: usize,
}

impl<'a, H: Heuristic, O: Observer> Solver<'a, H, O> {
    pub fn new(level: &'a Level, heuristic: H, opts: SolveOpts, observer: O) -> Self {
        Solver {
            level,
            heuristic,
            opts,
            observer,
            zobrist: Zobrist::new(),
            states_explored: 0,
        }
    }

    /// States expanded by the most recent [`Solver::solve`] call.
    pub fn states_explored(&self) -> usize {
        self.states_explored
    }

    pub fn solve(&mut self) -> SolveResult {
        self.states_explored = 0;
        let result = self.search();
        match &result {
            SolveResult::Solved(solution) => info!(
                "solved: {} pushes, {} states explored",
                solution.push_count(),
                solution.states_explored
            ),
            SolveResult::Unsolvable { states_explored } => {
                info!("no solution: {} states explored", states_explored)
            }
            SolveResult::Aborted {
                reason,
                states_explored,
            } => info!("aborted ({}): {} states explored", reason, states_explored),
        }
        result
    }

    fn check_abort(&self) -> Option<AbortReason> {
        if self.states_explored >= self.opts.max_states {
            return Some(AbortReason::StateLimit);
        }
        if let Some(cancel) = &self.opts.cancel {
            if cancel.load(Ordering::Relaxed) {
                return Some(AbortReason::Cancelled);
            }
        }
        if let Some(deadline) = self.opts.deadline {
            if Instant::now() >= deadline {
                return Some(AbortReason::Deadline);
            }
        }
        None
    }

    fn search(&mut self) -> SolveResult {
        let level = self.level;

        // A box starting on a dead square can never reach a goal
        if level.boxes().iter().any(|&pos| level.is_dead_square(pos)) {
            return SolveResult::Unsolvable { states_explored: 0 };
        }

        let player = normalize(level, level.player(), level.boxes());
        let initial = State::new(&self.zobrist, player, level.boxes());

        if initial.is_solved(level) {
            return SolveResult::Solved(Solution::build(level, &[], 0));
        }

        let mut table = NodeTable::default();
        let mut open: PriorityQueue<(usize, usize)> = PriorityQueue::new();

        let h = self.heuristic.estimate(initial.boxes());
        let root = table.record(Entry::Vacant, initial, 0, None);
        open.push(h, (root, 0));

        while !open.is_empty() {
            if let Some(reason) = self.check_abort() {
                return SolveResult::Aborted {
                    reason,
                    states_explored: self.states_explored,
                };
            }

            let Some((node_idx, g)) = open.pop_min() else {
                break;
            };
            if table.nodes[node_idx].closed {
                continue;
            }
            table.nodes[node_idx].closed = true;
            self.states_explored += 1;

            let interval = self.opts.progress_interval;
            if interval > 0 && self.states_explored % interval == 0 {
                trace!("{} states explored, open: {}", self.states_explored, open.len());
                self.observer.progress(self.states_explored);
            }

            let state = table.nodes[node_idx].state.clone();
            if state.is_solved(level) {
                let pushes = backtrack(&table.nodes, node_idx);
                return SolveResult::Solved(Solution::build(level, &pushes, self.states_explored));
            }

            let reachable = ReachableSet::compute(level, state.player(), state.boxes());

            for (box_index, &box_pos) in state.boxes().iter().enumerate() {
                for dir in ALL_DIRECTIONS {
                    let Some(behind) = level.move_position(box_pos, dir.reverse()) else {
                        continue;
                    };
                    let Some(target) = level.move_position(box_pos, dir) else {
                        continue;
                    };
                    if !reachable.contains(behind) {
                        continue;
                    }
                    if !level.is_floor(target) || state.boxes().contains(&target) {
                        continue;
                    }
                    if level.is_dead_square(target) {
                        continue;
                    }

                    let boxes = state.moved_boxes(box_index, target);
                    let player = normalize(level, box_pos, &boxes);
                    let next = state.pushed(&self.zobrist, box_index, target, boxes, player);

                    let new_g = g + 1;
                    let entry = table.entry(&next, new_g);
                    if entry == Entry::Stale {
                        continue;
                    }

                    if self.opts.freeze_deadlocks && is_freeze_deadlock(level, next.boxes()) {
                        continue;
                    }

                    let push = Push {
                        from: box_pos,
                        direction: dir,
                    };
                    let h = self.heuristic.estimate(next.boxes());
                    let next_idx = table.record(entry, next, new_g, Some((node_idx, push)));
                    open.push(new_g + h, (next_idx, new_g));
                }
            }
        }

        SolveResult::Unsolvable {
            states_explored: self.states_explored,
        }
    }
}

/// Follow backpointers from `goal` to the initial node and return the pushes
/// in chronological order.
fn backtrack(nodes: &[Node], goal: usize) -> Vec<Push> {
    let mut pushes = Vec::new();
    let mut idx = goal;
    while let Some((parent, push)) = nodes[idx].parent {
        pushes.push(push);
        idx = parent;
        assert!(
            pushes.len() < nodes.len(),
            "backpointer chain from node {} does not terminate",
            goal
        );
    }
    assert_eq!(idx, 0, "backpointer chain ended at node {}, not the initial state", idx);
    pushes.reverse();
    pushes
}
