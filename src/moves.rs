//! Move generation: the legal translations of a single vehicle and the states they lead to.

use core::error::Error;
use core::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::board::Cell;
use crate::{BoardValue, Direction, Position, State, Vehicle};

/// How far a vehicle may travel in a single action. A search run uses exactly one policy.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MovePolicy {
    /// Every action moves a vehicle by exactly one cell.
    #[default]
    UnitStep,
    /// An action may move a vehicle by any number of cells, as long as every cell it passes
    /// through is free.
    MaximalSlide,
}

/// A single move: the vehicle with id `vehicle` travels `distance` cells towards `direction`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct Action<V> {
    vehicle: char,
    direction: Direction,
    distance: V,
}

impl<V> Action<V> {
    /// Describe a move of `distance` cells.
    pub fn new(vehicle: char, direction: Direction, distance: V) -> Self {
        Self {
            vehicle,
            direction,
            distance,
        }
    }

    /// The id of the moved vehicle.
    pub fn vehicle(&self) -> char {
        self.vehicle
    }

    /// The direction of travel.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The number of cells travelled.
    pub fn distance(&self) -> &V {
        &self.distance
    }
}

impl<V> Action<V>
where
    V: BoardValue,
{
    /// Describe a move of a single cell.
    pub fn step(vehicle: char, direction: Direction) -> Self {
        Self::new(vehicle, direction, V::one())
    }

    /// The path cost of this action: the number of cells travelled.
    pub fn cost(&self) -> usize {
        self.distance.into()
    }
}

impl<V> Display for Action<V>
where
    V: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {} {}", self.vehicle, self.direction, self.distance)
    }
}

/// The type of invalid move that was observed in an [`InvalidMoveError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidMoveType<V> {
    /// The vehicle that was designated to be moved didn't exist.
    InvalidVehicle,
    /// The direction that was used isn't valid for the provided vehicle.
    InvalidDirection,
    /// The move would not displace the vehicle at all.
    ZeroDistance,
    /// The vehicle would leave the board.
    InvalidFinalPosition,
    /// The vehicle would run into the vehicle with the provided id at the provided position.
    Intersects(Position<V>, char),
    /// The vehicle would run into a wall at the provided position.
    Wall(Position<V>),
}

/// An error which describes an attempted invalid move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidMoveError<V> {
    action: Action<V>,
    variant: InvalidMoveType<V>,
}

impl<V> InvalidMoveError<V> {
    /// The rejected action.
    pub fn action(&self) -> &Action<V> {
        &self.action
    }

    /// Why the action was rejected.
    pub fn variant(&self) -> &InvalidMoveType<V> {
        &self.variant
    }
}

impl<V> Display for InvalidMoveError<V>
where
    V: BoardValue,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let Action {
            vehicle,
            direction,
            distance,
        } = &self.action;
        match &self.variant {
            InvalidMoveType::InvalidVehicle => write!(f, "cannot move vehicle {vehicle} {direction} because it doesn't exist"),
            InvalidMoveType::InvalidDirection => write!(f, "cannot move vehicle {vehicle} {direction} because its orientation does not allow for movement in that direction"),
            InvalidMoveType::ZeroDistance => write!(f, "cannot move vehicle {vehicle} {direction} by zero cells"),
            InvalidMoveType::InvalidFinalPosition => write!(f, "cannot move vehicle {vehicle} {direction} {distance} because it leaves the board"),
            InvalidMoveType::Intersects(pos, other) => write!(f, "cannot move vehicle {vehicle} {direction} {distance} because it would intersect with vehicle {other} at {pos}"),
            InvalidMoveType::Wall(pos) => write!(f, "cannot move vehicle {vehicle} {direction} {distance} because it would hit a wall at {pos}"),
        }
    }
}

impl<V> Error for InvalidMoveError<V> where V: BoardValue {}

/// The cell a vehicle enters when it travels `by` cells towards `dir`.
fn entering<V>(vehicle: &Vehicle<V>, dir: Direction, by: V) -> Option<Position<V>>
where
    V: BoardValue,
{
    if dir.is_positive() {
        vehicle.front()?.shift(dir, by)
    } else {
        vehicle.position().shift(dir, by)
    }
}

impl<V> State<V>
where
    V: BoardValue,
{
    /// Every state reachable from this one with a single action under `policy`, paired with that
    /// action. Vehicles are considered in definition order, up/left before down/right, shorter
    /// distances first.
    pub fn successors(&self, policy: MovePolicy) -> Vec<(Action<V>, Self)> {
        let board = self.grid();
        let mut successors = Vec::new();
        for (idx, vehicle) in self.vehicles.iter().enumerate() {
            for dir in vehicle.orientation().directions() {
                let mut distance = V::zero();
                while let Some(next) = distance.checked_add(&V::one()) {
                    if !entering(vehicle, dir, next).is_some_and(|cell| board.is_free(cell)) {
                        break;
                    }
                    let Some(anchor) = vehicle.position().shift(dir, next) else {
                        break;
                    };
                    distance = next;
                    successors.push((
                        Action::new(vehicle.id(), dir, distance),
                        self.with_vehicle_at(idx, anchor),
                    ));
                    if policy == MovePolicy::UnitStep {
                        break;
                    }
                }
            }
        }
        successors
    }

    /// Apply `action` to this state, checking every cell the vehicle passes through.
    pub fn apply(&self, action: &Action<V>) -> Result<Self, InvalidMoveError<V>> {
        let err = |variant: InvalidMoveType<V>| InvalidMoveError {
            action: *action,
            variant,
        };
        let (idx, vehicle) = self
            .vehicle(action.vehicle)
            .ok_or_else(|| err(InvalidMoveType::InvalidVehicle))?;
        if !vehicle.orientation().allows(action.direction) {
            return Err(err(InvalidMoveType::InvalidDirection));
        }
        if action.distance.is_zero() {
            return Err(err(InvalidMoveType::ZeroDistance));
        }

        let board = self.grid();
        let mut by = V::zero();
        while by < action.distance {
            by += V::one();
            let cell = entering(vehicle, action.direction, by)
                .ok_or_else(|| err(InvalidMoveType::InvalidFinalPosition))?;
            match board.get(cell) {
                None => return Err(err(InvalidMoveType::InvalidFinalPosition)),
                Some(Cell::Wall) => return Err(err(InvalidMoveType::Wall(cell))),
                Some(Cell::Vehicle(other)) => {
                    let other = self.vehicles[other.get() - 1].id();
                    return Err(err(InvalidMoveType::Intersects(cell, other)));
                }
                Some(Cell::Empty) => {}
            }
        }
        let anchor = vehicle
            .position()
            .shift(action.direction, action.distance)
            .ok_or_else(|| err(InvalidMoveType::InvalidFinalPosition))?;
        Ok(self.with_vehicle_at(idx, anchor))
    }
}
