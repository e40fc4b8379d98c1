//! The concretised occupancy grid of a [`State`].

use core::fmt::{Display, Formatter};
use core::num::NonZeroUsize;

use crate::state::{ConfigurationError, ConfigurationErrorType};
use crate::{BoardValue, Dimensions, Position, State, Vehicle};

/// The content of a single cell of a [`Board`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Cell {
    /// Nothing occupies the cell.
    Empty,
    /// The cell holds a wall.
    Wall,
    /// The cell is covered by the vehicle with the provided index, offset by one.
    Vehicle(NonZeroUsize),
}

impl Cell {
    /// Whether the cell is empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// The index into [`State::vehicles`] of the vehicle covering this cell, if any.
    pub fn vehicle(&self) -> Option<usize> {
        match self {
            Cell::Vehicle(idx) => Some(idx.get() - 1),
            _ => None,
        }
    }
}

fn place_vehicle<V>(
    board: &mut [Cell],
    idx: NonZeroUsize,
    dim: &Dimensions<V>,
    vehicle: &Vehicle<V>,
    vehicles: &[Vehicle<V>],
) -> Result<(), ConfigurationError<V>>
where
    V: BoardValue,
{
    let mut placed = 0usize;
    for position in vehicle.cells() {
        match position.as_index(dim).and_then(|p| board.get_mut(p)) {
            None => {
                return Err(ConfigurationError::at(
                    position,
                    ConfigurationErrorType::InvalidPosition(vehicle.id()),
                ));
            }
            Some(Cell::Vehicle(existing)) => {
                return Err(ConfigurationError::at(
                    position,
                    ConfigurationErrorType::Overlap(
                        vehicles[existing.get() - 1].id(),
                        vehicle.id(),
                    ),
                ));
            }
            Some(entry) => *entry = Cell::Vehicle(idx),
        }
        placed += 1;
    }
    // cells() stops early if the next cell is not representable in `V`
    let length: usize = (*vehicle.car().length()).into();
    if placed != length {
        return Err(ConfigurationError::at(
            *vehicle.position(),
            ConfigurationErrorType::InvalidPosition(vehicle.id()),
        ));
    }
    Ok(())
}

fn place_wall<V>(
    board: &mut [Cell],
    dim: &Dimensions<V>,
    position: &Position<V>,
    vehicles: &[Vehicle<V>],
) -> Result<(), ConfigurationError<V>>
where
    V: BoardValue,
{
    match position.as_index(dim).and_then(|p| board.get_mut(p)) {
        None => Err(ConfigurationError::at(
            *position,
            ConfigurationErrorType::InvalidWall,
        )),
        Some(Cell::Vehicle(existing)) => Err(ConfigurationError::at(
            *position,
            ConfigurationErrorType::WallOverlap(Some(vehicles[existing.get() - 1].id())),
        )),
        Some(Cell::Wall) => Err(ConfigurationError::at(
            *position,
            ConfigurationErrorType::WallOverlap(None),
        )),
        Some(entry) => {
            *entry = Cell::Wall;
            Ok(())
        }
    }
}

impl<V> State<V>
where
    V: BoardValue,
{
    fn concrete(&self) -> Result<Vec<Cell>, ConfigurationError<V>> {
        let dim = self.dimensions();
        let mut board = vec![Cell::Empty; dim.area()];
        for (idx, vehicle) in self.vehicles.iter().enumerate() {
            place_vehicle(
                &mut board,
                NonZeroUsize::MIN.saturating_add(idx),
                dim,
                vehicle,
                &self.vehicles,
            )?;
        }
        for wall in self.walls() {
            place_wall(&mut board, dim, wall, &self.vehicles)?;
        }
        Ok(board)
    }

    /// The occupancy grid of this state, or an error if this state is invalid. Vehicles are placed
    /// in definition order, then walls.
    pub fn board(&self) -> Result<Board<'_, V>, ConfigurationError<V>> {
        Ok(Board {
            concrete: self.concrete()?,
            state: self,
        })
    }

    /// The occupancy grid of a state known to be valid.
    pub(crate) fn grid(&self) -> Board<'_, V> {
        match self.board() {
            Ok(board) => board,
            Err(e) => unreachable!("states are validated on construction, but: {e}"),
        }
    }
}

/// A concretised representation of the board.
#[derive(Debug)]
pub struct Board<'s, V> {
    state: &'s State<V>,
    concrete: Vec<Cell>,
}

impl<V> Board<'_, V> {
    /// The [`Vec`] which represents the board literally, row by row.
    pub fn concrete(&self) -> &Vec<Cell> {
        &self.concrete
    }

    /// The state this board was derived from.
    pub fn state(&self) -> &State<V> {
        self.state
    }
}

impl<V> Board<'_, V>
where
    V: BoardValue,
{
    /// Fetches the content of the requested position, or [`None`] if the position doesn't exist in
    /// the board.
    pub fn get<P: Into<Position<V>>>(&self, position: P) -> Option<Cell> {
        position
            .into()
            .as_index(self.state.dimensions())
            .and_then(|p| self.concrete.get(p).copied())
    }

    /// Whether the requested position exists and is empty.
    pub fn is_free<P: Into<Position<V>>>(&self, position: P) -> bool {
        self.get(position).is_some_and(|cell| cell.is_empty())
    }

    /// The vehicle covering the requested position, if any.
    pub fn vehicle_at<P: Into<Position<V>>>(&self, position: P) -> Option<&Vehicle<V>> {
        self.get(position)?
            .vehicle()
            .map(|idx| &self.state.vehicles()[idx])
    }
}

impl<V> Display for Board<'_, V>
where
    V: BoardValue,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let columns: usize = (*self.state.dimensions().columns()).into();
        for row in self.concrete.chunks(columns) {
            for (column, cell) in row.iter().enumerate() {
                if column > 0 {
                    write!(f, " ")?;
                }
                match cell {
                    Cell::Empty => write!(f, ".")?,
                    Cell::Wall => write!(f, "#")?,
                    Cell::Vehicle(idx) => write!(f, "{}", self.state.vehicles()[idx.get() - 1].id())?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{Car, Cell, Dimensions, Orientation, Position, State, Vehicle};
    use core::error::Error;

    fn puzzle() -> Result<State<u8>, Box<dyn Error>> {
        Ok(State::new(
            Dimensions::try_from((3u8, 4))?,
            vec![
                Vehicle::new('X', (1, 0), Car::new(2, Orientation::LeftRight).unwrap()),
                Vehicle::new('A', (0, 2), Car::new(3, Orientation::UpDown).unwrap()),
            ],
            vec![Position::from((2, 0))],
        )?)
    }

    #[test]
    fn occupancy() -> Result<(), Box<dyn Error>> {
        let state = puzzle()?;
        let board = state.board()?;
        println!("{board}");

        assert_eq!(Some(Cell::Wall), board.get((2, 0)));
        assert_eq!(Some(Cell::Empty), board.get((0, 0)));
        assert_eq!(Some(0), board.get((1, 1)).unwrap().vehicle());
        assert_eq!(Some(1), board.get((2, 2)).unwrap().vehicle());
        assert_eq!(None, board.get((3, 0)));
        assert_eq!(None, board.get((0, 4)));
        assert!(board.is_free((0, 3)));
        assert!(!board.is_free((2, 0)));
        assert!(!board.is_free((5, 5)));
        assert_eq!('A', board.vehicle_at((1, 2)).unwrap().id());
        assert!(board.vehicle_at((2, 0)).is_none());

        assert_eq!(". . A .\nX X A .\n# . A .\n", board.to_string());
        Ok(())
    }

    #[test]
    fn rebuilt_grids_agree() -> Result<(), Box<dyn Error>> {
        let state = puzzle()?;
        let first = state.board()?.concrete().clone();
        let second = state.board()?;
        assert_eq!(&first, second.concrete());
        assert_eq!(&first, puzzle()?.board()?.concrete());
        Ok(())
    }
}
