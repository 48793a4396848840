//! Direction type for faces, placement normals and rotations.

use serde::{Deserialize, Serialize};

/// The six face directions, in the asset format's spelling.
///
/// Coordinates are right-handed and Y-up, with North towards -Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
    Up,
    Down,
}

impl Direction {
    /// All six directions in order.
    pub const ALL: [Direction; 6] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::Up,
        Direction::Down,
    ];

    /// Get the offset for this direction.
    pub fn offset(&self) -> (i32, i32, i32) {
        match self {
            Direction::North => (0, 0, -1),
            Direction::East => (1, 0, 0),
            Direction::South => (0, 0, 1),
            Direction::West => (-1, 0, 0),
            Direction::Up => (0, 1, 0),
            Direction::Down => (0, -1, 0),
        }
    }

    /// Get the opposite direction.
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Direction whose unit offset equals `(dx, dy, dz)`, if any.
    pub fn from_offset(dx: i32, dy: i32, dz: i32) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|dir| dir.offset() == (dx, dy, dz))
    }

    /// Parse the asset spelling (exact, case-sensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "North" => Some(Direction::North),
            "East" => Some(Direction::East),
            "South" => Some(Direction::South),
            "West" => Some(Direction::West),
            "Up" => Some(Direction::Up),
            "Down" => Some(Direction::Down),
            _ => None,
        }
    }

    /// Whether this direction lies in the horizontal plane.
    pub fn is_horizontal(&self) -> bool {
        !matches!(self, Direction::Up | Direction::Down)
    }

    /// Rotate around the Y axis in 90-degree steps.
    /// Looking from +Y (above), positive steps go North -> East -> South -> West.
    pub fn rotate_y(self, quarter_turns: i32) -> Direction {
        let steps = quarter_turns.rem_euclid(4);
        let mut dir = self;
        for _ in 0..steps {
            dir = match dir {
                Direction::North => Direction::East,
                Direction::East => Direction::South,
                Direction::South => Direction::West,
                Direction::West => Direction::North,
                // Y rotation doesn't affect Up/Down
                Direction::Up => Direction::Up,
                Direction::Down => Direction::Down,
            };
        }
        dir
    }

    /// Reflect across the YZ plane (negate X): swaps East and West.
    pub fn mirror_x(self) -> Direction {
        match self {
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            other => other,
        }
    }

    /// Reflect across the XY plane (negate Z): swaps North and South.
    pub fn mirror_z(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            other => other,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::North => write!(f, "North"),
            Direction::East => write!(f, "East"),
            Direction::South => write!(f, "South"),
            Direction::West => write!(f, "West"),
            Direction::Up => write!(f, "Up"),
            Direction::Down => write!(f, "Down"),
        }
    }
}
