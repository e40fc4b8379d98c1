// Copyright (c) Addison Crump, 2025, licensed under the EUPL-1.2-or-later.

//! parking-solver: breadth-first and A* solvers for Thinkfun's "Rush Hour".
//!
//! A puzzle is a rectangular board holding vehicles with fixed orientations (up/down or
//! left/right) and, optionally, immovable wall cells. Vehicles may only slide forwards and
//! backwards along their orientation, may not intersect anything and must stay within the board.
//! The puzzle is solved once the goal vehicle (by default the one with id [`GOAL_VEHICLE`]) has
//! its front cell in the rightmost column.
//!
//! Every configuration is an immutable [`State`]; moving a vehicle yields a new state, and the
//! search drivers in [`search`] explore the graph of states reachable from a root:
//!
//! ```
//! use parking_solver::search::{SearchConfig, SolveResult, bfs_solve};
//! use parking_solver::{Orientation, PuzzleDefinition, VehicleDefinition};
//!
//! let definition = PuzzleDefinition::<u8> {
//!     rows: 6,
//!     columns: 6,
//!     vehicles: vec![VehicleDefinition::new('X', 0, 2, Orientation::LeftRight, 2)],
//!     walls: vec![],
//!     goal: None,
//! };
//! let root = definition.build().unwrap();
//! match bfs_solve(&root, &SearchConfig::default()) {
//!     SolveResult::Solved(solution) => assert_eq!(4, solution.len()),
//!     other => panic!("expected a solution, got {other:?}"),
//! }
//! ```
//!
//! Loading puzzle files and presenting solutions are left to the user: loaders hand the core a
//! [`PuzzleDefinition`] and renderers consume [`search::Solution::path`] and
//! [`search::Solution::actions`].

use core::error::Error;
use core::fmt::{Debug, Display, Formatter};
use core::num::IntErrorKind;
use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use num_traits::{CheckedAdd, CheckedMul, CheckedSub, One, Unsigned, Zero};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub mod board;
pub mod heuristic;
pub mod moves;
pub mod search;
pub mod state;

pub use board::{Board, Cell};
pub use moves::{Action, InvalidMoveError, InvalidMoveType, MovePolicy};
pub use state::{
    Car, ConfigurationError, ConfigurationErrorType, GOAL_VEHICLE, PuzzleDefinition, State,
    Vehicle, VehicleDefinition,
};

/// An orientation for a vehicle.
#[derive(Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum Orientation {
    /// The vehicle may only move up and down.
    UpDown,
    /// The vehicle may only move left and right.
    LeftRight,
}

impl Orientation {
    /// The two directions a vehicle of this orientation may move in, towards the origin first.
    pub fn directions(self) -> [Direction; 2] {
        match self {
            Orientation::UpDown => [Direction::Up, Direction::Down],
            Orientation::LeftRight => [Direction::Left, Direction::Right],
        }
    }

    /// Whether a vehicle of this orientation may move in the provided direction.
    pub fn allows(self, dir: Direction) -> bool {
        self.directions().contains(&dir)
    }
}

/// A direction for a move. A direction may be flipped with [`Neg`] (i.e. `-`).
#[derive(Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum Direction {
    /// Upward movement.
    Up,
    /// Downward movement.
    Down,
    /// Leftward movement.
    Left,
    /// Rightward movement.
    Right,
}

impl Direction {
    /// Whether this direction moves away from the origin (down or right).
    pub fn is_positive(self) -> bool {
        matches!(self, Direction::Down | Direction::Right)
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        })
    }
}

impl Neg for Direction {
    type Output = Self;

    fn neg(self) -> Self::Output {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Marker trait: specifies that a value may be used for board definitions.
pub trait BoardValue:
    One
    + Ord
    + Add<Output = Self>
    + CheckedAdd
    + Sub<Output = Self>
    + CheckedSub
    + AddAssign
    + SubAssign
    + Copy
    + Into<usize>
    + TryFrom<usize>
    + Zero
    + CheckedMul
    + Debug
    + Display
    + core::hash::Hash
    + Unsigned
    + DeserializeOwned
    + Serialize
    + Send
    + Sync
    + 'static
{
}

impl<V> BoardValue for V where
    V: One
        + Ord
        + Add<Output = Self>
        + CheckedAdd
        + Sub<Output = Self>
        + CheckedSub
        + AddAssign
        + SubAssign
        + Copy
        + Into<usize>
        + TryFrom<usize>
        + Zero
        + CheckedMul
        + Debug
        + Display
        + core::hash::Hash
        + Unsigned
        + DeserializeOwned
        + Serialize
        + Send
        + Sync
        + 'static
{
}

/// A position in the board (eff., a coordinate pair).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct Position<V> {
    row: V,
    column: V,
}

impl<V> Position<V> {
    /// The row of the position.
    pub fn row(&self) -> &V {
        &self.row
    }

    /// The column of the position.
    pub fn column(&self) -> &V {
        &self.column
    }
}

impl<V> Add for Position<V>
where
    V: BoardValue,
{
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            row: self.row + rhs.row,
            column: self.column + rhs.column,
        }
    }
}

impl<V> CheckedAdd for Position<V>
where
    V: BoardValue,
{
    fn checked_add(&self, rhs: &Self) -> Option<Self> {
        Some(Self {
            row: self.row.checked_add(&rhs.row)?,
            column: self.column.checked_add(&rhs.column)?,
        })
    }
}

impl<V> Sub for Position<V>
where
    V: BoardValue,
{
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            row: self.row - rhs.row,
            column: self.column - rhs.column,
        }
    }
}

impl<V> CheckedSub for Position<V>
where
    V: BoardValue,
{
    fn checked_sub(&self, rhs: &Self) -> Option<Self> {
        Some(Self {
            row: self.row.checked_sub(&rhs.row)?,
            column: self.column.checked_sub(&rhs.column)?,
        })
    }
}

impl<V> Position<V>
where
    V: BoardValue,
{
    /// The position encoded as an index into a board with the provided dimensions.
    pub fn as_index(&self, dim: &Dimensions<V>) -> Option<usize> {
        if self.row >= dim.rows || self.column >= dim.columns {
            return None;
        }
        let row = self.row.into();
        let column = self.column.into();
        Some(row * dim.columns.into() + column)
    }

    /// Get the position `by` units away from this position in the provided direction `dir`, or
    /// `None` if the position would underflow or overflow `V`. Board bounds are not checked.
    pub fn shift(&self, dir: Direction, by: V) -> Option<Self> {
        match dir {
            Direction::Up => self.checked_sub(&Self::from((by, V::zero()))),
            Direction::Down => self.checked_add(&Self::from((by, V::zero()))),
            Direction::Left => self.checked_sub(&Self::from((V::zero(), by))),
            Direction::Right => self.checked_add(&Self::from((V::zero(), by))),
        }
    }
}

impl<V> From<(V, V)> for Position<V> {
    fn from((row, column): (V, V)) -> Self {
        Self { row, column }
    }
}

impl<V> Display for Position<V>
where
    V: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// The dimensions of a parking game board in terms of rows and columns.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct Dimensions<V> {
    rows: V,
    columns: V,
}

impl<V> Dimensions<V> {
    /// The number of rows.
    pub fn rows(&self) -> &V {
        &self.rows
    }

    /// The number of columns.
    pub fn columns(&self) -> &V {
        &self.columns
    }
}

impl<V> Dimensions<V>
where
    V: BoardValue,
{
    /// The number of cells on a board with these dimensions.
    pub fn area(&self) -> usize {
        self.rows.into() * self.columns.into()
    }
}

/// An error associated with the creation of the dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionError(IntErrorKind);

impl Display for DimensionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let reason = match self.0 {
            IntErrorKind::PosOverflow => "the dimensions were too large",
            IntErrorKind::Zero => "the dimensions have zero area",
            _ => "the dimensions were malformed",
        };
        f.write_fmt(format_args!("dimensions could not be used: {reason}"))
    }
}

impl Error for DimensionError {}

impl<V> TryFrom<(V, V)> for Dimensions<V>
where
    V: BoardValue,
{
    type Error = DimensionError;

    fn try_from((rows, columns): (V, V)) -> Result<Self, Self::Error> {
        if let Some(size) = rows.checked_mul(&columns) {
            if size.is_zero() {
                Err(DimensionError(IntErrorKind::Zero))
            } else {
                Ok(Self { rows, columns })
            }
        } else {
            Err(DimensionError(IntErrorKind::PosOverflow))
        }
    }
}
