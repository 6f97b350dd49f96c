use std::time::{Duration, Instant};

use clap::{ArgAction, Parser, ValueEnum};
use log::info;
use serde::Serialize;

use sokobot::heuristic::{Heuristic, MatchingHeuristic, NullHeuristic};
use sokobot::levels::Levels;
use sokobot::{Level, Observer, Solution, SolveOpts, SolveResult, Solver};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HeuristicType {
    Matching,
    Null,
}

fn print_solution(level: &Level, solution: &Solution) {
    println!("\nStarting position:\n{}", level);
    let mut boxes = level.boxes().to_vec();
    let total = solution.push_count();
    for (count, push) in solution.pushes.iter().enumerate() {
        if let Some(slot) = boxes.iter().position(|&pos| pos == push.box_from) {
            boxes[slot] = push.box_to;
        }
        println!(
            "Push box {} {} ({}/{}):\n{}",
            push.box_from,
            push.direction,
            count + 1,
            total,
            level.render(push.box_from, &boxes)
        );
    }
    println!("Moves: {}", solution.lurd());
}

/// Logs search progress for one level.
struct ProgressLogger {
    level_num: usize,
}

impl Observer for ProgressLogger {
    fn progress(&mut self, states_explored: usize) {
        info!("level {}: {} states explored", self.level_num, states_explored);
    }
}

#[derive(Serialize)]
struct Report {
    level: usize,
    status: &'static str,
    pushes: Option<usize>,
    states_explored: usize,
    elapsed_ms: u128,
    moves: Option<String>,
}

struct LevelStats {
    solved: bool,
    pushes: usize,
    states_explored: usize,
    elapsed_ms: u128,
}

struct RunOpts {
    level_num: usize,
    solve: SolveOpts,
    print_solution: bool,
    json: bool,
}

fn solve_level_helper<H: Heuristic>(level: &Level, opts: RunOpts, heuristic: H) -> LevelStats {
    let observer = ProgressLogger {
        level_num: opts.level_num,
    };
    let mut solver = Solver::new(level, heuristic, opts.solve, observer);

    let start = Instant::now();
    let result = solver.solve();
    let elapsed_ms = start.elapsed().as_millis();
    let states_explored = result.states_explored();

    if let SolveResult::Solved(solution) = &result {
        if let Err(e) = solution.replay(level) {
            eprintln!("Error: level {} solution failed replay: {}", opts.level_num, e);
            std::process::exit(1);
        }
    }

    let (status_char, status, pushes) = match &result {
        SolveResult::Solved(solution) => ('Y', "solved", Some(solution.push_count())),
        SolveResult::Unsolvable { .. } => ('X', "unsolvable", None),
        SolveResult::Aborted { .. } => ('N', "aborted", None),
    };

    if opts.json {
        let report = Report {
            level: opts.level_num,
            status,
            pushes,
            states_explored,
            elapsed_ms,
            moves: match &result {
                SolveResult::Solved(solution) => Some(solution.lurd()),
                _ => None,
            },
        };
        match serde_json::to_string(&report) {
            Ok(line) => println!("{}", line),
            Err(e) => eprintln!("Error: failed to encode report: {}", e),
        }
    } else {
        println!(
            "level: {:<3}  solved: {}  pushes: {:<5}  states: {:<12}  elapsed: {} ms",
            opts.level_num,
            status_char,
            pushes.unwrap_or(0),
            states_explored,
            elapsed_ms
        );
        if let SolveResult::Aborted { reason, .. } = &result {
            info!("level {}: {}", opts.level_num, reason);
        }
    }

    if opts.print_solution {
        if let SolveResult::Solved(solution) = &result {
            print_solution(level, solution);
        }
    }

    LevelStats {
        solved: pushes.is_some(),
        pushes: pushes.unwrap_or(0),
        states_explored,
        elapsed_ms,
    }
}

fn solve_level(level: &Level, opts: RunOpts, heuristic_type: HeuristicType) -> LevelStats {
    match heuristic_type {
        HeuristicType::Matching => solve_level_helper(level, opts, MatchingHeuristic::new(level)),
        HeuristicType::Null => solve_level_helper(level, opts, NullHeuristic::new()),
    }
}

#[derive(Parser)]
#[command(name = "sokobot")]
#[command(about = "A push-optimal Sokoban solver", long_about = None)]
struct Args {
    /// Path to the levels file (XSB format)
    #[arg(value_name = "FILE")]
    levels_file: String,

    /// Level number to solve (1-indexed), or start of range
    #[arg(value_name = "LEVEL")]
    level_start: usize,

    /// Optional end of level range (inclusive, 1-indexed)
    #[arg(value_name = "LEVEL_END")]
    level_end: Option<usize>,

    /// Print the solution step-by-step
    #[arg(short, long)]
    print_solution: bool,

    /// Print one JSON object per level instead of the table
    #[arg(long)]
    json: bool,

    /// Maximum number of states to explore before giving up
    #[arg(short = 'n', long, default_value_t = sokobot::solver::DEFAULT_MAX_STATES)]
    max_states: usize,

    /// Give up on a level after this many milliseconds
    #[arg(short = 't', long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Heuristic to use for solving
    #[arg(short = 'H', long, value_enum, default_value = "matching")]
    heuristic: HeuristicType,

    /// Disable freeze deadlock detection
    #[arg(long, default_value = "false")]
    no_freeze_deadlocks: bool,

    /// Log progress every N explored states (0 disables)
    #[arg(long, value_name = "N", default_value_t = sokobot::solver::DEFAULT_PROGRESS_INTERVAL)]
    progress_every: usize,

    /// Increase log verbosity (-v info, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();

    let default_filter = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    // Load levels from file
    let levels = match Levels::from_file(&args.levels_file) {
        Ok(levels) => levels,
        Err(e) => {
            eprintln!("Error loading levels: {}", e);
            std::process::exit(1);
        }
    };

    // Determine the range of levels to solve
    let level_end = args.level_end.unwrap_or(args.level_start);

    // Validate range
    if args.level_start == 0 {
        eprintln!("Error: level numbers must be at least 1");
        std::process::exit(1);
    }

    if level_end < args.level_start {
        eprintln!("Error: level end must be >= level start");
        std::process::exit(1);
    }

    if level_end > levels.len() {
        eprintln!(
            "Error: level {} not found (file contains {} levels)",
            level_end,
            levels.len()
        );
        std::process::exit(1);
    }

    let num_levels = level_end - args.level_start + 1;

    if args.print_solution && num_levels > 1 {
        eprintln!("Error: solution printing only supported when solving a single level");
        std::process::exit(1);
    }

    let mut total_solved = 0;
    let mut total_pushes = 0;
    let mut total_states = 0;
    let mut total_time_ms = 0;

    for level_num in args.level_start..=level_end {
        let Some(level) = levels.get(level_num - 1) else {
            break;
        };
        let opts = RunOpts {
            level_num,
            solve: SolveOpts {
                max_states: args.max_states,
                deadline: args
                    .timeout_ms
                    .map(|ms| Instant::now() + Duration::from_millis(ms)),
                cancel: None,
                progress_interval: args.progress_every,
                freeze_deadlocks: !args.no_freeze_deadlocks,
            },
            print_solution: args.print_solution,
            json: args.json,
        };
        let stats = solve_level(level, opts, args.heuristic);

        if stats.solved {
            total_solved += 1;
        }
        total_pushes += stats.pushes;
        total_states += stats.states_explored;
        total_time_ms += stats.elapsed_ms;
    }

    // Print summary statistics if multiple levels were solved
    if num_levels > 1 && !args.json {
        println!("---");
        println!(
            "solved: {:>3}/{:<3}        pushes: {:<5}  states: {:<12}  elapsed: {} ms",
            total_solved, num_levels, total_pushes, total_states, total_time_ms
        );
    }
}
