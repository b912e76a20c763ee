use std::fmt;

use serde::{Deserialize, Serialize};

/// Player (side) id as written on the map, `1`-`9`. `0` is reserved for "no winner".
pub type PlayerId = u8;

/// Stable index of a tank in the world arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TankId(pub usize);

/// Stable index of a shell in the world arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShellId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WallId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MineId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// One cell along `dir`, wrapping around a `width` x `height` torus.
    pub fn step(self, dir: Direction, width: usize, height: usize) -> Position {
        self.step_by(dir, 1, width, height)
    }

    pub fn step_by(self, dir: Direction, steps: usize, width: usize, height: usize) -> Position {
        let (dx, dy) = dir.delta();
        let steps = steps as isize;
        Position {
            x: (self.x as isize + dx * steps).rem_euclid(width as isize) as usize,
            y: (self.y as isize + dy * steps).rem_euclid(height as isize) as usize,
        }
    }

    pub fn step_back(self, dir: Direction, steps: usize, width: usize, height: usize) -> Position {
        self.step_by(dir.opposite(), steps, width, height)
    }

    /// Cells walked from `self` along `dir` until `target` is reached, or `None`
    /// if the ray wraps back to its start first.
    pub fn distance_along(self, target: Position, dir: Direction, width: usize, height: usize) -> Option<usize> {
        let mut current = self;
        for distance in 0..=width * height {
            if current == target {
                return Some(distance);
            }
            current = current.step(dir, width, height);
            if current == self {
                return None;
            }
        }
        None
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Compass heading, ordinal 0..7 clockwise starting at Up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    U = 0,
    UR = 1,
    R = 2,
    DR = 3,
    D = 4,
    DL = 5,
    L = 6,
    UL = 7,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::U,
        Direction::UR,
        Direction::R,
        Direction::DR,
        Direction::D,
        Direction::DL,
        Direction::L,
        Direction::UL,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Direction {
        Self::ALL[index % 8]
    }

    /// Rotate by `offset` eighths of a turn (negative = left).
    pub fn rotated(self, offset: i8) -> Direction {
        Self::from_index((self.index() as i32 + offset as i32).rem_euclid(8) as usize)
    }

    pub fn opposite(self) -> Direction {
        self.rotated(4)
    }

    /// Same line of travel, either way.
    pub fn is_colinear(self, other: Direction) -> bool {
        self == other || self == other.opposite()
    }

    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::U => (0, -1),
            Direction::UR => (1, -1),
            Direction::R => (1, 0),
            Direction::DR => (1, 1),
            Direction::D => (0, 1),
            Direction::DL => (-1, 1),
            Direction::L => (-1, 0),
            Direction::UL => (-1, -1),
        }
    }

    /// Heading every tank of `player` starts with: odd players face left, even ones right.
    pub fn seed_for(player: PlayerId) -> Direction {
        if player % 2 == 1 { Direction::L } else { Direction::R }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Everything a tank may ask for in one half-step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    MoveForward,
    MoveBackward,
    RotateLeft90,
    RotateRight90,
    RotateLeft45,
    RotateRight45,
    Shoot,
    GetBattleInfo,
    DoNothing,
}

impl Action {
    pub const ROTATIONS: [Action; 4] = [
        Action::RotateLeft90,
        Action::RotateLeft45,
        Action::RotateRight45,
        Action::RotateRight90,
    ];

    /// Heading offset in eighths of a turn, for rotation actions only.
    pub fn rotation_offset(self) -> Option<i8> {
        match self {
            Action::RotateLeft45 => Some(-1),
            Action::RotateLeft90 => Some(-2),
            Action::RotateRight45 => Some(1),
            Action::RotateRight90 => Some(2),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Action::MoveForward => "MoveForward",
            Action::MoveBackward => "MoveBackward",
            Action::RotateLeft90 => "RotateLeft90",
            Action::RotateRight90 => "RotateRight90",
            Action::RotateLeft45 => "RotateLeft45",
            Action::RotateRight45 => "RotateRight45",
            Action::Shoot => "Shoot",
            Action::GetBattleInfo => "GetBattleInfo",
            Action::DoNothing => "DoNothing",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_then_right_ninety_is_identity() {
        for dir in Direction::ALL {
            let left = dir.rotated(Action::RotateLeft90.rotation_offset().unwrap());
            assert_eq!(left.rotated(Action::RotateRight90.rotation_offset().unwrap()), dir);
        }
    }

    #[test]
    fn test_rotations_compose_additively() {
        for dir in Direction::ALL {
            assert_eq!(dir.rotated(1).rotated(1), dir.rotated(2));
            assert_eq!(dir.rotated(-2).rotated(-1), dir.rotated(5));
            assert_eq!(dir.rotated(2).rotated(2).rotated(2).rotated(2), dir);
        }
        assert_eq!(Direction::U.rotated(-1), Direction::UL);
        assert_eq!(Direction::UL.rotated(2), Direction::UR);
    }

    #[test]
    fn test_step_wraps_around() {
        let pos = Position::new(0, 0);
        assert_eq!(pos.step(Direction::UL, 5, 4), Position::new(4, 3));
        assert_eq!(pos.step_by(Direction::R, 7, 5, 4), Position::new(2, 0));
        assert_eq!(Position::new(2, 0).step_back(Direction::R, 7, 5, 4), pos);
    }

    #[test]
    fn test_distance_along_ray() {
        let from = Position::new(1, 1);
        assert_eq!(from.distance_along(Position::new(4, 1), Direction::R, 6, 6), Some(3));
        assert_eq!(from.distance_along(Position::new(0, 1), Direction::R, 6, 6), Some(5));
        assert_eq!(from.distance_along(Position::new(4, 2), Direction::R, 6, 6), None);
    }

    #[test]
    fn test_seed_heading_parity() {
        assert_eq!(Direction::seed_for(1), Direction::L);
        assert_eq!(Direction::seed_for(2), Direction::R);
        assert_eq!(Direction::seed_for(7), Direction::L);
    }
}
