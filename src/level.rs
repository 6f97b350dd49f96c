use std::fmt;

use log::debug;
use thiserror::Error;

use crate::bits::{Bitboard, MAX_SIZE, Position};
use crate::deadlocks;

/// Maximum number of boxes on a board.
pub const MAX_BOXES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Floor,
    Goal,
    /// Padding outside the walls. Never walkable.
    Outside,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

pub const ALL_DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

impl Direction {
    pub fn delta(self) -> (i8, i8) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn reverse(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// The direction of a single step from `from` to `to`, if they are
    /// orthogonally adjacent.
    pub fn between(from: Position, to: Position) -> Option<Direction> {
        let dx = to.x as i16 - from.x as i16;
        let dy = to.y as i16 - from.y as i16;
        ALL_DIRECTIONS.into_iter().find(|dir| {
            let (ddx, ddy) = dir.delta();
            ddx as i16 == dx && ddy as i16 == dy
        })
    }

    /// Lowercase LURD letter.
    pub fn to_char(self) -> char {
        match self {
            Direction::Up => 'u',
            Direction::Down => 'd',
            Direction::Left => 'l',
            Direction::Right => 'r',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "Up"),
            Direction::Down => write!(f, "Down"),
            Direction::Left => write!(f, "Left"),
            Direction::Right => write!(f, "Right"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelError {
    #[error("empty level")]
    Empty,
    #[error("level is {width}x{height}, maximum size is {max}x{max}", max = MAX_SIZE)]
    TooLarge { width: usize, height: usize },
    #[error("invalid character '{ch}' at position ({x}, {y})")]
    InvalidCharacter { ch: char, x: usize, y: usize },
    #[error("multiple players found (second at ({x}, {y}))")]
    MultiplePlayers { x: usize, y: usize },
    #[error("level has no player")]
    MissingPlayer,
    #[error("level has no boxes")]
    NoBoxes,
    #[error("level has {count} boxes, maximum is {max}", max = MAX_BOXES)]
    TooManyBoxes { count: usize },
    #[error("box count ({boxes}) does not match goal count ({goals})")]
    BoxGoalCountMismatch { boxes: usize, goals: usize },
}

/// Static description of a level: walls, goals, floors and the
/// precomputed simple-deadlock squares, plus the initial configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    walls: Bitboard,
    goals: Bitboard,
    floors: Bitboard,
    dead_squares: Bitboard,
    width: u8,
    height: u8,
    player: Position,
    /// Sorted row-major.
    boxes: Vec<Position>,
}

/// Parse a level from text. See [`Level::parse`].
pub fn parse(text: &str) -> Result<Level, LevelError> {
    Level::parse(text)
}

impl Level {
    /// Parse a Sokoban level from text format.
    ///
    /// Characters:
    /// - `#` = Wall
    /// - ` ` = Floor inside the walls, padding outside them
    /// - `-`, `_` = Floor
    /// - `.` = Goal
    /// - `$` = Box
    /// - `@` = Player
    /// - `*` = Box on goal
    /// - `+` = Player on goal
    ///
    /// A blank square is interior floor only if a wall appears somewhere
    /// in each of the four directions along its row and column.
    pub fn parse(text: &str) -> Result<Self, LevelError> {
        let lines: Vec<Vec<char>> = text
            .trim_end_matches(['\n', '\r'])
            .lines()
            .map(|line| line.chars().collect())
            .collect();

        let height = lines.len();
        let width = lines.iter().map(|line| line.len()).max().unwrap_or(0);

        if width == 0 {
            return Err(LevelError::Empty);
        }
        if width > MAX_SIZE || height > MAX_SIZE {
            return Err(LevelError::TooLarge { width, height });
        }

        let mut walls = Bitboard::new();
        let mut goals = Bitboard::new();
        let mut floors = Bitboard::new();
        let mut boxes = Vec::new();
        let mut player = None;

        for (y, line) in lines.iter().enumerate() {
            for (x, &ch) in line.iter().enumerate() {
                let pos = Position::new(x as u8, y as u8);
                match ch {
                    '#' => {
                        walls.set(pos);
                        continue;
                    }
                    ' ' => {
                        if is_interior(&lines, x, y) {
                            floors.set(pos);
                        }
                        continue;
                    }
                    '-' | '_' => {}
                    '.' => goals.set(pos),
                    '$' => boxes.push(pos),
                    '*' => {
                        goals.set(pos);
                        boxes.push(pos);
                    }
                    '@' | '+' => {
                        if player.is_some() {
                            return Err(LevelError::MultiplePlayers { x, y });
                        }
                        if ch == '+' {
                            goals.set(pos);
                        }
                        player = Some(pos);
                    }
                    _ => return Err(LevelError::InvalidCharacter { ch, x, y }),
                }
                floors.set(pos);
            }
        }

        let player = player.ok_or(LevelError::MissingPlayer)?;

        if boxes.is_empty() {
            return Err(LevelError::NoBoxes);
        }
        if boxes.len() > MAX_BOXES {
            return Err(LevelError::TooManyBoxes { count: boxes.len() });
        }
        if boxes.len() != goals.len() {
            return Err(LevelError::BoxGoalCountMismatch {
                boxes: boxes.len(),
                goals: goals.len(),
            });
        }

        boxes.sort();

        let mut level = Level {
            walls,
            goals,
            floors,
            dead_squares: Bitboard::new(),
            width: width as u8,
            height: height as u8,
            player,
            boxes,
        };
        level.dead_squares = deadlocks::compute_dead_squares(&level);

        debug!(
            "parsed {}x{} level: {} boxes, {} floor squares, {} dead squares",
            width,
            height,
            level.boxes.len(),
            level.floors.len(),
            level.dead_squares.len()
        );

        Ok(level)
    }

    pub fn width(&self) -> usize {
        self.width as usize
    }

    pub fn height(&self) -> usize {
        self.height as usize
    }

    /// Initial player position.
    pub fn player(&self) -> Position {
        self.player
    }

    /// Initial box positions, sorted row-major.
    pub fn boxes(&self) -> &[Position] {
        &self.boxes
    }

    pub fn walls(&self) -> &Bitboard {
        &self.walls
    }

    pub fn goals(&self) -> &Bitboard {
        &self.goals
    }

    pub fn floors(&self) -> &Bitboard {
        &self.floors
    }

    pub fn dead_squares(&self) -> &Bitboard {
        &self.dead_squares
    }

    pub fn get_tile(&self, pos: Position) -> Tile {
        if self.walls.get(pos) {
            Tile::Wall
        } else if self.goals.get(pos) {
            Tile::Goal
        } else if self.floors.get(pos) {
            Tile::Floor
        } else {
            Tile::Outside
        }
    }

    pub fn is_wall(&self, pos: Position) -> bool {
        self.walls.get(pos)
    }

    pub fn is_goal(&self, pos: Position) -> bool {
        self.goals.get(pos)
    }

    pub fn is_floor(&self, pos: Position) -> bool {
        self.floors.get(pos)
    }

    pub fn is_dead_square(&self, pos: Position) -> bool {
        self.dead_squares.get(pos)
    }

    /// Move from `pos` one step in `dir`.
    /// Returns `None` if the new position would leave the board.
    pub fn move_position(&self, pos: Position, dir: Direction) -> Option<Position> {
        let (dx, dy) = dir.delta();
        let new_x = pos.x as i32 + dx as i32;
        let new_y = pos.y as i32 + dy as i32;

        if new_x >= 0 && new_y >= 0 && new_x < self.width as i32 && new_y < self.height as i32 {
            Some(Position::new(new_x as u8, new_y as u8))
        } else {
            None
        }
    }

    /// Render a configuration of this level using the standard symbols.
    /// Trailing padding is trimmed from each row.
    pub fn render(&self, player: Position, boxes: &[Position]) -> String {
        let box_board: Bitboard = boxes.iter().copied().collect();
        let mut out = String::new();
        for y in 0..self.height {
            let mut line = String::new();
            for x in 0..self.width {
                let pos = Position::new(x, y);
                let is_goal = self.goals.get(pos);
                let ch = if self.walls.get(pos) {
                    '#'
                } else if box_board.get(pos) {
                    if is_goal { '*' } else { '$' }
                } else if pos == player {
                    if is_goal { '+' } else { '@' }
                } else if is_goal {
                    '.'
                } else {
                    ' '
                };
                line.push(ch);
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(self.player, &self.boxes))
    }
}

fn is_interior(lines: &[Vec<char>], x: usize, y: usize) -> bool {
    let is_wall = |row: usize, col: usize| lines[row].get(col) == Some(&'#');
    let line = &lines[y];

    let wall_left = (0..x).any(|col| is_wall(y, col));
    let wall_right = (x + 1..line.len()).any(|col| is_wall(y, col));
    let wall_up = (0..y).any(|row| is_wall(row, x));
    let wall_down = (y + 1..lines.len()).any(|row| is_wall(row, x));

    wall_left && wall_right && wall_up && wall_down
}
