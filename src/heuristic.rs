//! Estimates of the remaining cost to free the goal vehicle, consumed by A*.
//!
//! Only [`DistanceToExit`] is admissible. [`BlockingVehicles`] and [`BlockerClearance`] usually
//! guide the search towards a solution faster, but may overestimate, so A* driven by them finds a
//! good solution rather than a guaranteed shortest one.

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::{BoardValue, Direction, Orientation, Position, State};

/// Returned when the goal vehicle can never reach the exit (e.g. it is vertical). A* ranks such
/// states behind every other state.
pub const UNREACHABLE: usize = usize::MAX;

/// Moves assumed for a blocking vehicle with no free cell on either side.
const BOXED_IN_COST: usize = 3;

/// Moves assumed for a horizontal vehicle blocking the goal row.
const HORIZONTAL_BLOCKER_COST: usize = 2;

/// An estimate of the remaining cost from a state to the goal.
pub trait Heuristic<V> {
    /// The estimated cost, or [`UNREACHABLE`].
    fn estimate(&self, state: &State<V>) -> usize;
}

impl<V, F> Heuristic<V> for F
where
    F: Fn(&State<V>) -> usize,
{
    fn estimate(&self, state: &State<V>) -> usize {
        self(state)
    }
}

/// The number of columns between the front of the goal vehicle and the exit.
#[derive(Copy, Clone, Debug, Default)]
pub struct DistanceToExit;

/// [`DistanceToExit`] plus the number of occupied cells between the goal vehicle and the exit.
#[derive(Copy, Clone, Debug, Default)]
pub struct BlockingVehicles;

/// [`DistanceToExit`] plus, for every vehicle between the goal vehicle and the exit, an estimate
/// of the moves needed to clear it out of the goal row.
#[derive(Copy, Clone, Debug, Default)]
pub struct BlockerClearance;

/// The built-in heuristics, selectable by name.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardHeuristic {
    /// See [`DistanceToExit`].
    #[default]
    Distance,
    /// See [`BlockingVehicles`].
    Blockers,
    /// See [`BlockerClearance`].
    BlockerClearance,
}

impl StandardHeuristic {
    /// Every built-in heuristic.
    pub const ALL: [StandardHeuristic; 3] = [
        StandardHeuristic::Distance,
        StandardHeuristic::Blockers,
        StandardHeuristic::BlockerClearance,
    ];
}

fn distance<V>(state: &State<V>) -> Option<usize>
where
    V: BoardValue,
{
    let goal = state.goal_vehicle();
    if goal.orientation() != Orientation::LeftRight {
        return None;
    }
    let column: usize = (*goal.position().column()).into();
    let length: usize = (*goal.car().length()).into();
    let columns: usize = (*state.dimensions().columns()).into();
    Some(columns.saturating_sub(column + length))
}

/// The cells between the front of the goal vehicle and the exit, nearest first.
fn ahead<V>(state: &State<V>) -> impl Iterator<Item = Position<V>> + use<V>
where
    V: BoardValue,
{
    let dim = *state.dimensions();
    let start = state
        .goal_vehicle()
        .front()
        .and_then(|front| front.shift(Direction::Right, V::one()));
    core::iter::successors(start, |p| p.shift(Direction::Right, V::one()))
        .take_while(move |p| p.as_index(&dim).is_some())
}

/// The number of free cells next to `from` in direction `dir`, up to the first obstacle.
fn free_run<V>(board: &Board<'_, V>, from: Position<V>, dir: Direction) -> usize
where
    V: BoardValue,
{
    core::iter::successors(from.shift(dir, V::one()), |p| p.shift(dir, V::one()))
        .take_while(|p| board.is_free(*p))
        .count()
}

impl<V> Heuristic<V> for DistanceToExit
where
    V: BoardValue,
{
    fn estimate(&self, state: &State<V>) -> usize {
        distance(state).unwrap_or(UNREACHABLE)
    }
}

impl<V> Heuristic<V> for BlockingVehicles
where
    V: BoardValue,
{
    fn estimate(&self, state: &State<V>) -> usize {
        let Some(distance) = distance(state) else {
            return UNREACHABLE;
        };
        let board = state.grid();
        let blocked = ahead(state).filter(|p| !board.is_free(*p)).count();
        distance + blocked
    }
}

impl<V> Heuristic<V> for BlockerClearance
where
    V: BoardValue,
{
    fn estimate(&self, state: &State<V>) -> usize {
        let Some(distance) = distance(state) else {
            return UNREACHABLE;
        };
        let board = state.grid();
        let mut blockers = Vec::new();
        for idx in ahead(state).filter_map(|p| board.get(p)?.vehicle()) {
            if !blockers.contains(&idx) {
                blockers.push(idx);
            }
        }

        let goal_row: usize = (*state.goal_vehicle().position().row()).into();
        let clearance: usize = blockers
            .into_iter()
            .map(|idx| &state.vehicles()[idx])
            .map(|blocker| {
                if blocker.orientation() == Orientation::LeftRight {
                    return HORIZONTAL_BLOCKER_COST;
                }
                let Some(bottom) = blocker.front() else {
                    return BOXED_IN_COST;
                };
                let top = *blocker.position();
                let above = free_run(&board, top, Direction::Up);
                let below = free_run(&board, bottom, Direction::Down);
                // cells the blocker has to travel to leave the goal row either way
                let top_row: usize = (*top.row()).into();
                let bottom_row: usize = (*bottom.row()).into();
                let up = bottom_row + 1 - goal_row;
                let down = goal_row + 1 - top_row;
                if above >= up || below >= down {
                    1
                } else if above == 0 && below == 0 {
                    BOXED_IN_COST
                } else {
                    2
                }
            })
            .sum();
        distance + clearance
    }
}

impl<V> Heuristic<V> for StandardHeuristic
where
    V: BoardValue,
{
    fn estimate(&self, state: &State<V>) -> usize {
        match self {
            StandardHeuristic::Distance => DistanceToExit.estimate(state),
            StandardHeuristic::Blockers => BlockingVehicles.estimate(state),
            StandardHeuristic::BlockerClearance => BlockerClearance.estimate(state),
        }
    }
}
