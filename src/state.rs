//! Puzzle configurations: vehicles, walls and the immutable [`State`] the solvers search over.

use core::error::Error;
use core::fmt::{Display, Formatter};
use core::hash::{Hash, Hasher};
use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{BoardValue, DimensionError, Dimensions, Orientation, Position};

/// The id reserved for the goal vehicle unless a puzzle names another one.
pub const GOAL_VEHICLE: char = 'X';

/// The shape of a vehicle, generic over the numeric type which backs it. The numeric type must be
/// unsigned and integral.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct Car<V> {
    length: V,
    orientation: Orientation,
}

impl<V> Car<V> {
    /// The length of the car.
    pub fn length(&self) -> &V {
        &self.length
    }

    /// The orientation of the car.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }
}

impl<V> Car<V>
where
    V: BoardValue,
{
    /// Create a new car of the provided length and orientation. Cars span at least two cells.
    pub fn new(length: V, orientation: Orientation) -> Option<Self> {
        if length <= V::one() {
            None
        } else {
            Some(Self {
                length,
                orientation,
            })
        }
    }
}

/// A car placed on the board under an id.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct Vehicle<V> {
    id: char,
    position: Position<V>,
    car: Car<V>,
}

impl<V> Vehicle<V> {
    /// Place `car` with its top-left cell at `position`.
    pub fn new<P: Into<Position<V>>>(id: char, position: P, car: Car<V>) -> Self {
        Self {
            id,
            position: position.into(),
            car,
        }
    }

    /// The id of this vehicle.
    pub fn id(&self) -> char {
        self.id
    }

    /// The anchor (top-left) cell of this vehicle.
    pub fn position(&self) -> &Position<V> {
        &self.position
    }

    /// The shape of this vehicle.
    pub fn car(&self) -> &Car<V> {
        &self.car
    }

    /// The orientation of this vehicle.
    pub fn orientation(&self) -> Orientation {
        self.car.orientation
    }
}

impl<V> Vehicle<V>
where
    V: BoardValue,
{
    pub(crate) fn moved_to(&self, position: Position<V>) -> Self {
        Self { position, ..*self }
    }

    fn unit(&self) -> Position<V> {
        match self.car.orientation {
            Orientation::UpDown => Position::from((V::one(), V::zero())),
            Orientation::LeftRight => Position::from((V::zero(), V::one())),
        }
    }

    /// The cells covered by this vehicle, from the anchor onwards.
    pub fn cells(&self) -> impl Iterator<Item = Position<V>> + use<V> {
        let unit = self.unit();
        core::iter::successors(Some(self.position), move |p| {
            num_traits::CheckedAdd::checked_add(p, &unit)
        })
        .take(self.car.length.into())
    }

    /// The cell furthest from the anchor (the bottom or right end).
    pub fn front(&self) -> Option<Position<V>> {
        let unit = self.unit();
        let mut front = self.position;
        for _ in 1..self.car.length.into() {
            front = num_traits::CheckedAdd::checked_add(&front, &unit)?;
        }
        Some(front)
    }
}

/// A type of malformed puzzle, associated with a [`ConfigurationError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationErrorType {
    /// The board dimensions are unusable.
    Dimensions(DimensionError),
    /// The vehicle with the provided id is shorter than two cells.
    InvalidLength(char),
    /// More than one vehicle uses the provided id.
    DuplicateVehicle(char),
    /// No vehicle carries the id of the goal vehicle.
    MissingGoalVehicle(char),
    /// The vehicle with the provided id leaves the board.
    InvalidPosition(char),
    /// The vehicles with the provided ids overlap.
    Overlap(char, char),
    /// A wall lies outside of the board.
    InvalidWall,
    /// A wall covers the vehicle with the provided id, or another wall if `None`.
    WallOverlap(Option<char>),
}

/// An error which denotes that a puzzle could not be constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationError<V> {
    pub(crate) position: Option<Position<V>>,
    pub(crate) variant: ConfigurationErrorType,
}

impl<V> ConfigurationError<V> {
    pub(crate) fn new(variant: ConfigurationErrorType) -> Self {
        Self {
            position: None,
            variant,
        }
    }

    pub(crate) fn at(position: Position<V>, variant: ConfigurationErrorType) -> Self {
        Self {
            position: Some(position),
            variant,
        }
    }

    /// The offending cell, if the error concerns one.
    pub fn position(&self) -> Option<&Position<V>> {
        self.position.as_ref()
    }

    /// What was wrong with the puzzle.
    pub fn variant(&self) -> &ConfigurationErrorType {
        &self.variant
    }
}

impl<V> From<DimensionError> for ConfigurationError<V> {
    fn from(value: DimensionError) -> Self {
        Self::new(ConfigurationErrorType::Dimensions(value))
    }
}

impl<V> Display for ConfigurationError<V>
where
    V: BoardValue,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let at = self
            .position
            .map(|p| format!(" at {p}"))
            .unwrap_or_default();
        match &self.variant {
            ConfigurationErrorType::Dimensions(e) => Display::fmt(e, f),
            ConfigurationErrorType::InvalidLength(id) => {
                write!(f, "vehicle {id} must be at least two cells long")
            }
            ConfigurationErrorType::DuplicateVehicle(id) => {
                write!(f, "vehicle {id} was defined more than once")
            }
            ConfigurationErrorType::MissingGoalVehicle(id) => {
                write!(f, "goal vehicle {id} is not on the board")
            }
            ConfigurationErrorType::InvalidPosition(id) => {
                write!(f, "vehicle {id} was located at an invalid position{at}")
            }
            ConfigurationErrorType::Overlap(a, b) => {
                write!(f, "vehicle {a} and vehicle {b} overlapped{at}")
            }
            ConfigurationErrorType::InvalidWall => {
                write!(f, "wall was located at an invalid position{at}")
            }
            ConfigurationErrorType::WallOverlap(Some(id)) => {
                write!(f, "wall overlapped vehicle {id}{at}")
            }
            ConfigurationErrorType::WallOverlap(None) => {
                write!(f, "wall was placed twice{at}")
            }
        }
    }
}

impl<V> Error for ConfigurationError<V> where V: BoardValue {}

/// Everything about a puzzle that no move can change. Shared by all states of one puzzle.
#[derive(Debug)]
pub(crate) struct Layout<V> {
    pub(crate) dim: Dimensions<V>,
    pub(crate) walls: Vec<Position<V>>,
    pub(crate) goal: usize,
    /// Vehicle indices ordered by vehicle id.
    by_id: Vec<usize>,
}

/// A configuration of the puzzle. States are immutable: moves produce new states which share the
/// dimensions and walls of the state they were derived from.
///
/// Two states are equal when they place the same vehicles (compared in id order) at the same
/// positions; walls do not take part in the comparison, since every state of a puzzle shares them.
#[derive(Clone, Debug)]
pub struct State<V> {
    pub(crate) layout: Arc<Layout<V>>,
    pub(crate) vehicles: Vec<Vehicle<V>>,
}

impl<V> State<V> {
    /// The dimensions of this state.
    pub fn dimensions(&self) -> &Dimensions<V> {
        &self.layout.dim
    }

    /// The vehicles of this state, in the order they were defined.
    pub fn vehicles(&self) -> &[Vehicle<V>] {
        &self.vehicles
    }

    /// The walls of this state.
    pub fn walls(&self) -> &[Position<V>] {
        &self.layout.walls
    }

    /// The vehicle which must reach the exit.
    pub fn goal_vehicle(&self) -> &Vehicle<V> {
        &self.vehicles[self.layout.goal]
    }

    /// The vehicle with the provided id, along with its index.
    pub fn vehicle(&self, id: char) -> Option<(usize, &Vehicle<V>)> {
        self.vehicles.iter().enumerate().find(|(_, v)| v.id == id)
    }

    fn sorted(&self) -> impl Iterator<Item = &Vehicle<V>> {
        self.layout.by_id.iter().map(|&idx| &self.vehicles[idx])
    }
}

impl<V> State<V>
where
    V: BoardValue,
{
    /// Build a puzzle whose goal vehicle carries the id [`GOAL_VEHICLE`].
    pub fn new(
        dim: Dimensions<V>,
        vehicles: Vec<Vehicle<V>>,
        walls: Vec<Position<V>>,
    ) -> Result<Self, ConfigurationError<V>> {
        Self::with_goal(GOAL_VEHICLE, dim, vehicles, walls)
    }

    /// Build a puzzle whose goal vehicle carries the id `goal`.
    pub fn with_goal(
        goal: char,
        dim: Dimensions<V>,
        vehicles: Vec<Vehicle<V>>,
        walls: Vec<Position<V>>,
    ) -> Result<Self, ConfigurationError<V>> {
        let mut seen = HashSet::new();
        for vehicle in &vehicles {
            if !seen.insert(vehicle.id) {
                return Err(ConfigurationError::new(
                    ConfigurationErrorType::DuplicateVehicle(vehicle.id),
                ));
            }
        }
        let goal = vehicles
            .iter()
            .position(|v| v.id == goal)
            .ok_or(ConfigurationError::new(
                ConfigurationErrorType::MissingGoalVehicle(goal),
            ))?;
        let mut by_id = (0..vehicles.len()).collect::<Vec<_>>();
        by_id.sort_by_key(|&idx| vehicles[idx].id);

        let state = Self {
            layout: Arc::new(Layout {
                dim,
                walls,
                goal,
                by_id,
            }),
            vehicles,
        };
        state.board()?;
        Ok(state)
    }

    /// Whether the goal vehicle lies horizontally with its front cell in the last column.
    pub fn is_goal(&self) -> bool {
        let goal = self.goal_vehicle();
        let column: usize = goal.position.column.into();
        let length: usize = goal.car.length.into();
        let columns: usize = self.layout.dim.columns.into();
        goal.orientation() == Orientation::LeftRight && column + length == columns
    }

    /// A copy of this state with the vehicle at `idx` moved to `position`. The caller is
    /// responsible for the move being legal.
    pub(crate) fn with_vehicle_at(&self, idx: usize, position: Position<V>) -> Self {
        let mut vehicles = self.vehicles.clone();
        vehicles[idx] = vehicles[idx].moved_to(position);
        Self {
            layout: self.layout.clone(),
            vehicles,
        }
    }

    /// The definition this state could be rebuilt from.
    pub fn definition(&self) -> PuzzleDefinition<V> {
        PuzzleDefinition {
            rows: self.layout.dim.rows,
            columns: self.layout.dim.columns,
            vehicles: self
                .vehicles
                .iter()
                .map(|v| VehicleDefinition {
                    id: v.id,
                    column: v.position.column,
                    row: v.position.row,
                    orientation: v.car.orientation,
                    length: v.car.length,
                })
                .collect(),
            walls: self.layout.walls.clone(),
            goal: Some(self.goal_vehicle().id),
        }
    }
}

impl<V> PartialEq for State<V>
where
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.vehicles.len() == other.vehicles.len()
            && self.sorted().zip(other.sorted()).all(|(a, b)| a == b)
    }
}

impl<V> Eq for State<V> where V: Eq {}

impl<V> Hash for State<V>
where
    V: Hash,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.vehicles.len());
        for vehicle in self.sorted() {
            vehicle.hash(state);
        }
    }
}

/// A vehicle as supplied by a puzzle loader.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct VehicleDefinition<V> {
    /// The id of the vehicle.
    pub id: char,
    /// The column of the top-left cell.
    pub column: V,
    /// The row of the top-left cell.
    pub row: V,
    /// The orientation of the vehicle.
    pub orientation: Orientation,
    /// The number of cells the vehicle covers.
    pub length: V,
}

impl<V> VehicleDefinition<V> {
    /// Describe a vehicle, in the column-first order puzzle files use.
    pub fn new(id: char, column: V, row: V, orientation: Orientation, length: V) -> Self {
        Self {
            id,
            column,
            row,
            orientation,
            length,
        }
    }
}

/// A puzzle as supplied by a loader: the boundary between puzzle files and the solvers.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct PuzzleDefinition<V> {
    /// The height of the board.
    pub rows: V,
    /// The width of the board.
    pub columns: V,
    /// The vehicles, in the order they should be considered by move generation.
    #[serde(default = "Vec::new")]
    pub vehicles: Vec<VehicleDefinition<V>>,
    /// Cells which nothing may enter.
    #[serde(default = "Vec::new")]
    pub walls: Vec<Position<V>>,
    /// The id of the goal vehicle; [`GOAL_VEHICLE`] if absent.
    #[serde(default)]
    pub goal: Option<char>,
}

impl<V> PuzzleDefinition<V>
where
    V: BoardValue,
{
    /// Validate the definition and produce the root state of the puzzle.
    pub fn build(&self) -> Result<State<V>, ConfigurationError<V>> {
        let dim = Dimensions::try_from((self.rows, self.columns))?;
        let vehicles = self
            .vehicles
            .iter()
            .map(|v| {
                Car::new(v.length, v.orientation)
                    .map(|car| Vehicle::new(v.id, (v.row, v.column), car))
                    .ok_or(ConfigurationError::new(
                        ConfigurationErrorType::InvalidLength(v.id),
                    ))
            })
            .collect::<Result<Vec<_>, _>>()?;
        State::with_goal(
            self.goal.unwrap_or(GOAL_VEHICLE),
            dim,
            vehicles,
            self.walls.clone(),
        )
    }
}
