//! Core value types: positions, directions, colors, and the cell alphabet.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A point on the grid, `(x, y)`, with `(0, 0)` at the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    #[allow(missing_docs)]
    pub x: i32,
    #[allow(missing_docs)]
    pub y: i32,
}

impl Position {
    /// builds a new position
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// adds a direction's unit vector to this position
    pub fn add(&self, dir: Direction) -> Position {
        let (dx, dy) = dir.to_vector();
        Position {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// subtracts another position, returning a `(dx, dy)` vector
    pub fn sub(&self, other: Position) -> (i32, i32) {
        (self.x - other.x, self.y - other.y)
    }

    /// four-connected neighbors of this position, in Up, Right, Down, Left order
    pub fn neighbors(&self) -> [Position; 4] {
        [
            self.add(Direction::Up),
            self.add(Direction::Right),
            self.add(Direction::Down),
            self.add(Direction::Left),
        ]
    }
}

/// there are 4 cardinal directions
pub const N_DIRECTIONS: usize = 4;

/// A cardinal movement direction, or the signal to keep going the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    #[allow(missing_docs)]
    Up,
    #[allow(missing_docs)]
    Right,
    #[allow(missing_docs)]
    Down,
    #[allow(missing_docs)]
    Left,
    /// emit this when no direction change is warranted, e.g. the catastrophic
    /// fallback of last resort
    NoChange,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Right => write!(f, "right"),
            Direction::Down => write!(f, "down"),
            Direction::Left => write!(f, "left"),
            Direction::NoChange => write!(f, "no_change"),
        }
    }
}

impl Direction {
    /// the four cardinal directions, in a fixed order used throughout search and BFS
    pub const fn all() -> [Direction; N_DIRECTIONS] {
        [
            Direction::Up,
            Direction::Right,
            Direction::Down,
            Direction::Left,
        ]
    }

    /// converts this direction to a unit `(dx, dy)` vector. Up decreases y.
    pub fn to_vector(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::NoChange => (0, 0),
        }
    }

    /// builds a direction from a unit vector produced by `Position::sub`
    pub fn from_vector(v: (i32, i32)) -> Option<Self> {
        match v {
            (0, -1) => Some(Direction::Up),
            (1, 0) => Some(Direction::Right),
            (0, 1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            _ => None,
        }
    }

    /// the direction exactly opposite this one. `NoChange` has no opposite.
    pub fn opposite(self) -> Option<Direction> {
        match self {
            Direction::Up => Some(Direction::Down),
            Direction::Down => Some(Direction::Up),
            Direction::Left => Some(Direction::Right),
            Direction::Right => Some(Direction::Left),
            Direction::NoChange => None,
        }
    }

    /// true unless `other` would reverse straight into this direction
    pub fn is_not_reverse_of(self, other: Direction) -> bool {
        self.opposite() != Some(other)
    }
}

/// the kind tag of a grid cell, matching the wire alphabet 1:1
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CellKind {
    /// empty, unoccupied
    Void = 0,
    /// edible food of the given value, 1..=9, represented by the discriminant
    Food1 = 1,
    #[allow(missing_docs)]
    Food2 = 2,
    #[allow(missing_docs)]
    Food3 = 3,
    #[allow(missing_docs)]
    Food4 = 4,
    #[allow(missing_docs)]
    Food5 = 5,
    #[allow(missing_docs)]
    Food6 = 6,
    #[allow(missing_docs)]
    Food7 = 7,
    #[allow(missing_docs)]
    Food8 = 8,
    #[allow(missing_docs)]
    Food9 = 9,
    /// live snake tail segment
    Tail = 10,
    /// live snake body segment
    Body = 11,
    /// live snake head segment
    Head = 12,
    /// inert, colorless dead tail
    DeadTail = 13,
    /// inert, colorless dead body
    DeadBody = 14,
    /// inert, colorless dead head
    DeadHead = 15,
    /// impassable wall, also returned for out-of-bounds reads
    Stone = 16,
}

impl CellKind {
    /// builds a `CellKind` from its raw low-5-bits discriminant, as stored in
    /// an encoded [`crate::grid::Grid`] byte.
    pub fn from_u8(v: u8) -> Option<Self> {
        use CellKind::*;
        Some(match v {
            0 => Void,
            1 => Food1,
            2 => Food2,
            3 => Food3,
            4 => Food4,
            5 => Food5,
            6 => Food6,
            7 => Food7,
            8 => Food8,
            9 => Food9,
            10 => Tail,
            11 => Body,
            12 => Head,
            13 => DeadTail,
            14 => DeadBody,
            15 => DeadHead,
            16 => Stone,
            _ => return None,
        })
    }

    /// the edible value of this cell, if it is a food cell
    pub fn food_value(&self) -> Option<i32> {
        let v = *self as u8;
        (1..=9).contains(&v).then_some(v as i32)
    }

    /// is this a live (colored) segment of some snake's body?
    pub fn is_live_segment(&self) -> bool {
        matches!(self, CellKind::Tail | CellKind::Body | CellKind::Head)
    }

    /// is this an inert, colorless dead segment?
    pub fn is_dead_segment(&self) -> bool {
        matches!(
            self,
            CellKind::DeadTail | CellKind::DeadBody | CellKind::DeadHead
        )
    }

    /// can a snake's head move onto this cell: true for `Void` and `Food*`,
    /// the BFS analyzer's notion of an "open" cell.
    pub fn is_passable(&self) -> bool {
        (*self as u8) < CellKind::Tail as u8
    }
}

/// A single grid cell: a kind tag plus the color of the snake it belongs to
/// (0 for non-snake cells). See `grid::Grid` for the packed byte encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Cell {
    #[allow(missing_docs)]
    pub kind: CellKind,
    #[allow(missing_docs)]
    pub color: u8,
}

impl Cell {
    /// builds a new cell
    pub fn new(kind: CellKind, color: u8) -> Self {
        Cell { kind, color }
    }

    /// the void cell, color 0
    pub fn void() -> Self {
        Cell::new(CellKind::Void, 0)
    }

    /// the stone cell, color 0. Returned for out-of-bounds reads.
    pub fn stone() -> Self {
        Cell::new(CellKind::Stone, 0)
    }
}

/// A game surface that can be queried for its dimensions and cell contents,
/// without committing to whether the backing storage is a live snapshot or a
/// cloned, search-internal [`crate::state::GameState`]. This is the "small
/// accessor interface" used so the Observer and the BFS analyzer can share
/// code between the two.
pub trait GridSource {
    /// width of the board, in cells
    fn width(&self) -> i32;
    /// height of the board, in cells
    fn height(&self) -> i32;
    /// reads a cell. Out of bounds reads return `Cell::stone()`.
    fn get(&self, pos: Position) -> Cell;
}
