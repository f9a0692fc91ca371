//! Merge puzzle board.
//!
//! # Responsibility
//! - Own the cell matrix, score, spawn distribution and score multiplier.
//! - Resolve directional moves and spawn at most one tile per move.
//! - Detect the terminal state and apply shop effects.
//!
//! # Invariants
//! - `rows`, `cols` never change after construction and
//!   `2 <= rows * cols <= MAX_CELLS`.
//! - A move that changes no cell neither spawns nor scores.
//! - `score` only decreases through `reset()` or `restore()`.
//! - `spawn_distribution` is never empty and never contains zero.

use super::line::resolve_line;
use crate::model::effect::{validate_multiplier, validate_spawn_values, GameplayEffect};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const DEFAULT_SIZE: usize = 4;
const DEFAULT_SPAWN_VALUES: [u32; 3] = [2, 2, 4];
/// Upper bound on `rows * cols`.
pub const MAX_CELLS: usize = 1 << 16;

/// Move direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Input-boundary error for unknown direction strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDirectionError(pub String);

impl Display for ParseDirectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported direction `{}`; expected up|down|left|right",
            self.0
        )
    }
}

impl Error for ParseDirectionError {}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(ParseDirectionError(other.to_string())),
        }
    }
}

/// Board dimensions and default spawn distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub rows: usize,
    pub cols: usize,
    pub spawn_values: Vec<u32>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_SIZE,
            cols: DEFAULT_SIZE,
            spawn_values: DEFAULT_SPAWN_VALUES.to_vec(),
        }
    }
}

impl BoardConfig {
    /// Square board with the default spawn distribution.
    pub fn square(size: usize) -> Self {
        Self {
            rows: size,
            cols: size,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), BoardConfigError> {
        match self.rows.checked_mul(self.cols) {
            Some(cells) if cells < 2 => {
                return Err(BoardConfigError::TooFewCells {
                    rows: self.rows,
                    cols: self.cols,
                });
            }
            Some(cells) if cells <= MAX_CELLS => {}
            _ => {
                return Err(BoardConfigError::TooManyCells {
                    rows: self.rows,
                    cols: self.cols,
                });
            }
        }
        if validate_spawn_values(&self.spawn_values).is_err() {
            return Err(BoardConfigError::InvalidSpawnValues(
                self.spawn_values.clone(),
            ));
        }
        Ok(())
    }
}

/// Board construction errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardConfigError {
    TooFewCells { rows: usize, cols: usize },
    TooManyCells { rows: usize, cols: usize },
    InvalidSpawnValues(Vec<u32>),
}

impl Display for BoardConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewCells { rows, cols } => {
                write!(f, "board {rows}x{cols} must have at least two cells")
            }
            Self::TooManyCells { rows, cols } => {
                write!(f, "board {rows}x{cols} exceeds {MAX_CELLS} cells")
            }
            Self::InvalidSpawnValues(values) => {
                write!(f, "spawn values must be non-empty and positive, got {values:?}")
            }
        }
    }
}

impl Error for BoardConfigError {}

/// Outcome of a single `move_tiles` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveOutcome {
    pub moved: bool,
    pub score_delta: u64,
}

/// Serializable board state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    #[serde(default)]
    pub cells: Vec<Vec<u32>>,
    #[serde(default)]
    pub score: u64,
    #[serde(default)]
    pub spawn_values: Vec<u32>,
    #[serde(default = "unit_multiplier")]
    pub score_multiplier: f64,
}

fn unit_multiplier() -> f64 {
    1.0
}

/// The merge puzzle board.
///
/// Not internally synchronized: one caller drives one board.
#[derive(Debug, Clone)]
pub struct GridEngine {
    rows: usize,
    cols: usize,
    cells: Vec<u32>,
    score: u64,
    default_spawn_values: Vec<u32>,
    spawn_values: Vec<u32>,
    score_multiplier: f64,
    rng: StdRng,
}

impl GridEngine {
    /// Creates a board seeded from OS entropy and performs the initial reset.
    pub fn new(config: &BoardConfig) -> Result<Self, BoardConfigError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Creates a board with a deterministic spawn sequence.
    pub fn with_seed(config: &BoardConfig, seed: u64) -> Result<Self, BoardConfigError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &BoardConfig, rng: StdRng) -> Result<Self, BoardConfigError> {
        config.validate()?;
        let mut engine = Self {
            rows: config.rows,
            cols: config.cols,
            cells: vec![0; config.rows * config.cols],
            score: 0,
            default_spawn_values: config.spawn_values.clone(),
            spawn_values: config.spawn_values.clone(),
            score_multiplier: 1.0,
            rng,
        };
        engine.reset();
        Ok(engine)
    }

    /// Starts a new game: empty grid, zero score, default spawn distribution,
    /// multiplier 1, then two spawned tiles.
    pub fn reset(&mut self) {
        self.cells.fill(0);
        self.score = 0;
        self.spawn_values.clone_from(&self.default_spawn_values);
        self.score_multiplier = 1.0;
        self.spawn_tile();
        self.spawn_tile();
        debug!(
            "event=board_reset module=engine status=ok rows={} cols={}",
            self.rows, self.cols
        );
    }

    /// Writes one value from the spawn distribution into a uniformly chosen
    /// empty cell. Returns `false` without mutation when the grid is full.
    pub fn spawn_tile(&mut self) -> bool {
        let empty: Vec<usize> = self
            .cells
            .iter()
            .enumerate()
            .filter_map(|(index, value)| (*value == 0).then_some(index))
            .collect();
        if empty.is_empty() {
            return false;
        }
        let target = empty[self.rng.gen_range(0..empty.len())];
        let value = self.spawn_values[self.rng.gen_range(0..self.spawn_values.len())];
        self.cells[target] = value;
        true
    }

    /// Returns `false` only when no move can change the board.
    pub fn can_continue(&self) -> bool {
        if self.cells.contains(&0) {
            return true;
        }
        for row in 0..self.rows {
            for col in 0..self.cols {
                let value = self.cells[self.index(row, col)];
                if col + 1 < self.cols && self.cells[self.index(row, col + 1)] == value {
                    return true;
                }
                if row + 1 < self.rows && self.cells[self.index(row + 1, col)] == value {
                    return true;
                }
            }
        }
        false
    }

    /// Resolves one directional move and spawns a tile iff anything changed.
    pub fn move_tiles(&mut self, direction: Direction) -> MoveOutcome {
        let reverse = matches!(direction, Direction::Right | Direction::Down);
        let horizontal = matches!(direction, Direction::Left | Direction::Right);
        let (line_count, line_len) = if horizontal {
            (self.rows, self.cols)
        } else {
            (self.cols, self.rows)
        };

        let mut outcome = MoveOutcome::default();
        for line in 0..line_count {
            let positions: Vec<usize> = (0..line_len)
                .map(|offset| {
                    if horizontal {
                        self.index(line, offset)
                    } else {
                        self.index(offset, line)
                    }
                })
                .collect();
            let original: Vec<u32> = positions.iter().map(|&pos| self.cells[pos]).collect();
            let resolved = resolve_line(&original, reverse, self.score_multiplier);
            if !resolved.changed {
                continue;
            }
            for (&pos, &value) in positions.iter().zip(&resolved.cells) {
                self.cells[pos] = value;
            }
            outcome.moved = true;
            outcome.score_delta = outcome.score_delta.saturating_add(resolved.score_delta);
        }

        if outcome.moved {
            self.score = self.score.saturating_add(outcome.score_delta);
            self.spawn_tile();
        }
        outcome
    }

    /// Applies a shop effect. `None` and invalid payloads are ignored.
    pub fn apply_effect(&mut self, effect: Option<&GameplayEffect>) {
        let Some(effect) = effect else {
            return;
        };
        if let Err(err) = effect.validate() {
            warn!(
                "event=effect_apply module=engine status=ignored kind={} error={}",
                effect.kind(),
                err
            );
            return;
        }
        match effect {
            GameplayEffect::SpawnDistributionOverride { values } => {
                self.spawn_values.clone_from(values);
            }
            GameplayEffect::ScoreMultiplier { multiplier } => {
                self.score_multiplier = *multiplier;
            }
        }
        debug!(
            "event=effect_apply module=engine status=ok kind={}",
            effect.kind()
        );
    }

    /// Captures cells, score, spawn distribution and multiplier.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            cells: self.cells(),
            score: self.score,
            spawn_values: self.spawn_values.clone(),
            score_multiplier: self.score_multiplier,
        }
    }

    /// Loads a snapshot, substituting structural defaults for unusable parts.
    ///
    /// A cell matrix whose shape differs from this board becomes an empty
    /// grid; an invalid spawn distribution keeps the current one; an invalid
    /// multiplier becomes 1.
    pub fn restore(&mut self, snapshot: &BoardSnapshot) {
        let shape_matches = snapshot.cells.len() == self.rows
            && snapshot.cells.iter().all(|row| row.len() == self.cols);
        if shape_matches {
            self.cells = snapshot.cells.concat();
        } else {
            warn!(
                "event=board_restore module=engine status=defaulted field=cells expected_rows={} expected_cols={}",
                self.rows, self.cols
            );
            self.cells.fill(0);
        }
        self.score = snapshot.score;
        if validate_spawn_values(&snapshot.spawn_values).is_ok() {
            self.spawn_values.clone_from(&snapshot.spawn_values);
        }
        self.score_multiplier = if validate_multiplier(snapshot.score_multiplier).is_ok() {
            snapshot.score_multiplier
        } else {
            1.0
        };
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Cells as a row-major matrix.
    pub fn cells(&self) -> Vec<Vec<u32>> {
        self.cells
            .chunks(self.cols)
            .map(<[u32]>::to_vec)
            .collect()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<u32> {
        (row < self.rows && col < self.cols).then(|| self.cells[self.index(row, col)])
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn spawn_distribution(&self) -> &[u32] {
        &self.spawn_values
    }

    pub fn score_multiplier(&self) -> f64 {
        self.score_multiplier
    }

    pub fn empty_cell_count(&self) -> usize {
        self.cells.iter().filter(|value| **value == 0).count()
    }

    pub fn max_tile(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }
}
