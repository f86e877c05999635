use serde::Serialize;

use crate::{
    env::{Action, Environment, State, Transition},
    error::{Error, Result},
};

/// Reward for bumping into a wall or the grid boundary
pub const WALL_REWARD: f64 = -5.0;
/// Reward for stepping onto the goal
pub const GOAL_REWARD: f64 = 100.0;
/// Base reward for any other move
pub const STEP_REWARD: f64 = -1.0;
/// Reward per unit of Manhattan distance gained toward the goal when shaping is enabled
pub const SHAPING_WEIGHT: f64 = 0.1;

pub const DEFAULT_ROWS: usize = 16;
pub const DEFAULT_COLS: usize = 17;

#[rustfmt::skip]
const DEFAULT_GRID: [[u8; DEFAULT_COLS]; DEFAULT_ROWS] = [
    [0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 1, 1, 1, 1, 0, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 0],
    [0, 0, 0, 1, 0, 0, 0, 1, 0, 1, 0, 1, 0, 0, 0, 1, 0],
    [0, 1, 0, 1, 1, 1, 1, 1, 0, 1, 0, 1, 0, 1, 0, 0, 0],
    [0, 1, 1, 1, 0, 1, 0, 0, 0, 1, 1, 1, 0, 1, 1, 1, 0],
    [0, 1, 0, 0, 0, 1, 1, 1, 0, 0, 0, 0, 0, 1, 0, 1, 0],
    [0, 1, 0, 1, 0, 1, 0, 0, 0, 1, 1, 1, 1, 1, 0, 1, 0],
    [0, 1, 0, 1, 0, 1, 0, 1, 1, 1, 0, 0, 0, 0, 0, 1, 0],
    [0, 1, 1, 1, 0, 1, 0, 0, 0, 1, 0, 1, 1, 1, 1, 1, 0],
    [0, 0, 0, 0, 0, 1, 1, 1, 0, 1, 0, 1, 0, 0, 0, 1, 0],
    [0, 1, 0, 1, 0, 0, 0, 1, 0, 1, 0, 1, 1, 1, 0, 1, 0],
    [0, 1, 0, 1, 1, 1, 0, 1, 0, 1, 0, 0, 0, 1, 0, 0, 0],
    [0, 1, 0, 1, 0, 1, 1, 1, 0, 1, 0, 1, 1, 1, 1, 1, 0],
    [0, 1, 0, 1, 0, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 0],
    [0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0],
];

/// The kind of a single grid cell, with its external integer code as discriminant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Cell {
    Wall = 0,
    Path = 1,
    Start = 2,
    Goal = 3,
}

impl Cell {
    pub fn code(self) -> i64 {
        self as i64
    }
}

impl From<i64> for Cell {
    /// Codes other than wall, start and goal are open path
    fn from(code: i64) -> Self {
        match code {
            0 => Cell::Wall,
            2 => Cell::Start,
            3 => Cell::Goal,
            _ => Cell::Path,
        }
    }
}

/// A grid maze with a deterministic transition and reward model
///
/// The grid is stored flat in row-major order and never changes after construction.
/// State `s` sits at row `s / cols`, column `s % cols`.
#[derive(Debug, Clone, PartialEq)]
pub struct Maze {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    start: State,
    goal: State,
    shaping: bool,
}

impl Maze {
    /// Build a maze from an optional explicit grid of cell codes
    ///
    /// Without a grid the built-in 16×17 maze is used and `rows`/`cols` are ignored.
    ///
    /// **Errors** if the grid length is not `rows * cols` or no start and goal can be
    /// established.
    pub fn build(grid: Option<&[i64]>, rows: usize, cols: usize, shaping: bool) -> Result<Self> {
        match grid {
            Some(codes) => Self::from_codes(codes, rows, cols, shaping),
            None => Self::default_maze(shaping),
        }
    }

    /// The built-in 16×17 maze
    pub fn default_maze(shaping: bool) -> Result<Self> {
        let codes: Vec<i64> = DEFAULT_GRID
            .iter()
            .flatten()
            .map(|&code| i64::from(code))
            .collect();
        Self::from_codes(&codes, DEFAULT_ROWS, DEFAULT_COLS, shaping)
    }

    /// Decode a flat row-major grid of cell codes
    ///
    /// Only the first start and the first goal are meaningful, later ones become paths.
    /// A missing start is placed at row 0, column 1 and a missing goal at the last row,
    /// second-to-last column.
    pub fn from_codes(codes: &[i64], rows: usize, cols: usize, shaping: bool) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::config(format!(
                "maze dimensions must be positive, got {rows}x{cols}"
            )));
        }
        if codes.len() != rows * cols {
            return Err(Error::config(format!(
                "maze has {} cells but {rows}x{cols} requires {}",
                codes.len(),
                rows * cols
            )));
        }

        let mut cells = codes.iter().map(|&code| Cell::from(code)).collect::<Vec<_>>();

        let mut start = first_of(&cells, Cell::Start);
        let mut goal = first_of(&cells, Cell::Goal);
        for (ix, cell) in cells.iter_mut().enumerate() {
            let duplicate = match *cell {
                Cell::Start => start != Some(ix),
                Cell::Goal => goal != Some(ix),
                _ => false,
            };
            if duplicate {
                *cell = Cell::Path;
            }
        }

        if start.is_none() {
            let ix = default_index(rows, cols, 0, 1, "start")?;
            cells[ix] = Cell::Start;
            if goal == Some(ix) {
                goal = None;
            }
            start = Some(ix);
        }
        if goal.is_none() {
            let ix = default_index(rows, cols, rows - 1, cols.wrapping_sub(2), "goal")?;
            cells[ix] = Cell::Goal;
            if start == Some(ix) {
                start = None;
            }
            goal = Some(ix);
        }

        let (Some(start), Some(goal)) = (start, goal) else {
            return Err(Error::config("maze must have a start and a goal"));
        };

        Ok(Self {
            rows,
            cols,
            cells,
            start,
            goal,
            shaping,
        })
    }

    /// Re-encode the resolved grid as flat cell codes
    pub fn to_codes(&self) -> Vec<i64> {
        self.cells.iter().map(|c| c.code()).collect()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn start(&self) -> State {
        self.start
    }

    pub fn goal(&self) -> State {
        self.goal
    }

    pub fn shaping(&self) -> bool {
        self.shaping
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, state: State) -> Cell {
        self.cells[state]
    }

    /// `(row, col)` of a state
    pub fn position(&self, state: State) -> (usize, usize) {
        (state / self.cols, state % self.cols)
    }

    fn manhattan(&self, a: (usize, usize), b: (usize, usize)) -> usize {
        a.0.abs_diff(b.0) + a.1.abs_diff(b.1)
    }
}

fn first_of(cells: &[Cell], kind: Cell) -> Option<usize> {
    cells.iter().position(|&c| c == kind)
}

fn default_index(rows: usize, cols: usize, row: usize, col: usize, what: &str) -> Result<usize> {
    if row < rows && col < cols {
        Ok(row * cols + col)
    } else {
        Err(Error::config(format!(
            "cannot place default {what} in a {rows}x{cols} maze"
        )))
    }
}

impl Environment for Maze {
    fn num_states(&self) -> usize {
        self.cells.len()
    }

    fn reset(&self) -> State {
        self.start
    }

    fn step(&self, state: State, action: Action) -> Transition {
        let (row, col) = self.position(state);
        let (dr, dc) = action.delta();
        let bump = Transition {
            next_state: state,
            reward: WALL_REWARD,
            done: false,
        };

        let (Some(nr), Some(nc)) = (row.checked_add_signed(dr), col.checked_add_signed(dc)) else {
            return bump;
        };
        if nr >= self.rows || nc >= self.cols {
            return bump;
        }

        let next_state = nr * self.cols + nc;
        match self.cells[next_state] {
            Cell::Wall => bump,
            Cell::Goal => Transition {
                next_state,
                reward: GOAL_REWARD,
                done: true,
            },
            Cell::Path | Cell::Start => {
                let mut reward = STEP_REWARD;
                if self.shaping {
                    let goal = self.position(self.goal);
                    let old = self.manhattan((row, col), goal) as f64;
                    let new = self.manhattan((nr, nc), goal) as f64;
                    reward += SHAPING_WEIGHT * (old - new);
                }
                Transition {
                    next_state,
                    reward,
                    done: false,
                }
            }
        }
    }

    fn is_decision_state(&self, state: State) -> bool {
        !matches!(self.cells[state], Cell::Wall | Cell::Goal)
    }

    fn open_states(&self) -> Vec<State> {
        (0..self.cells.len())
            .filter(|&s| self.cells[s] != Cell::Wall)
            .collect()
    }

    fn distance_to_goal(&self, state: State) -> usize {
        self.manhattan(self.position(state), self.position(self.goal))
    }
}
