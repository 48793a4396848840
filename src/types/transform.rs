//! Yaw and pattern variant transforms.

use super::{Direction, Position};
use serde::{Deserialize, Serialize};

/// A cardinal yaw, spelled the way templates spell it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Yaw {
    #[default]
    Zero,
    Ninety,
    OneEighty,
    TwoSeventy,
}

impl Yaw {
    /// All four yaws in ascending order.
    pub const ALL: [Yaw; 4] = [Yaw::Zero, Yaw::Ninety, Yaw::OneEighty, Yaw::TwoSeventy];

    /// Number of clockwise (seen from above) quarter turns, 0..=3.
    pub fn quarter_turns(&self) -> i32 {
        match self {
            Yaw::Zero => 0,
            Yaw::Ninety => 1,
            Yaw::OneEighty => 2,
            Yaw::TwoSeventy => 3,
        }
    }

    /// Yaw for any number of quarter turns (wraps modulo four).
    pub fn from_quarter_turns(turns: i32) -> Yaw {
        Yaw::ALL[turns.rem_euclid(4) as usize]
    }

    /// Yaw in degrees (0, 90, 180, 270).
    pub fn degrees(&self) -> i32 {
        self.quarter_turns() * 90
    }

    /// Parse from degrees; only exact multiples of 90 are accepted.
    pub fn from_degrees(degrees: i32) -> Option<Yaw> {
        if degrees % 90 != 0 {
            return None;
        }
        Some(Yaw::from_quarter_turns(degrees / 90))
    }

    /// Apply `other` after `self`, modulo 360 degrees.
    pub fn compose(self, other: Yaw) -> Yaw {
        Yaw::from_quarter_turns(self.quarter_turns() + other.quarter_turns())
    }

    /// The yaw that undoes this one.
    pub fn inverse(self) -> Yaw {
        Yaw::from_quarter_turns(-self.quarter_turns())
    }
}

impl std::fmt::Display for Yaw {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Yaw::Zero => write!(f, "Zero"),
            Yaw::Ninety => write!(f, "Ninety"),
            Yaw::OneEighty => write!(f, "OneEighty"),
            Yaw::TwoSeventy => write!(f, "TwoSeventy"),
        }
    }
}

/// The symmetry operation that produced one pattern variant.
///
/// Applied as: rotate around Y, then mirror X, then mirror Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VariantTransform {
    pub rotation: Yaw,
    pub mirror_x: bool,
    pub mirror_z: bool,
}

impl VariantTransform {
    pub fn new(rotation: Yaw, mirror_x: bool, mirror_z: bool) -> Self {
        Self {
            rotation,
            mirror_x,
            mirror_z,
        }
    }

    /// Pure rotation with no mirroring.
    pub fn rotation(rotation: Yaw) -> Self {
        Self::new(rotation, false, false)
    }

    /// Check if this is an identity transform.
    pub fn is_identity(&self) -> bool {
        self.rotation == Yaw::Zero && !self.mirror_x && !self.mirror_z
    }

    /// Transformed offset, or `None` if it does not fit in `i32`.
    pub fn apply_position(&self, position: Position) -> Option<Position> {
        let mut p = position.checked_rotate_y(self.rotation.quarter_turns())?;
        if self.mirror_x {
            p = p.checked_mirror_x()?;
        }
        if self.mirror_z {
            p = p.checked_mirror_z()?;
        }
        Some(p)
    }

    pub fn apply_direction(&self, direction: Direction) -> Direction {
        let mut d = direction.rotate_y(self.rotation.quarter_turns());
        if self.mirror_x {
            d = d.mirror_x();
        }
        if self.mirror_z {
            d = d.mirror_z();
        }
        d
    }
}

impl std::fmt::Display for VariantTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rot {}", self.rotation.degrees())?;
        if self.mirror_x {
            write!(f, " +mirrorX")?;
        }
        if self.mirror_z {
            write!(f, " +mirrorZ")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaw_compose_wraps() {
        assert_eq!(Yaw::Ninety.compose(Yaw::TwoSeventy), Yaw::Zero);
        assert_eq!(Yaw::OneEighty.compose(Yaw::OneEighty), Yaw::Zero);
        assert_eq!(Yaw::TwoSeventy.compose(Yaw::OneEighty), Yaw::Ninety);
        assert_eq!(Yaw::Ninety.inverse(), Yaw::TwoSeventy);
    }

    #[test]
    fn test_yaw_degrees() {
        assert_eq!(Yaw::from_degrees(450), Some(Yaw::Ninety));
        assert_eq!(Yaw::from_degrees(-90), Some(Yaw::TwoSeventy));
        assert_eq!(Yaw::from_degrees(45), None);
        assert_eq!(Yaw::OneEighty.degrees(), 180);
    }

    #[test]
    fn test_yaw_serde_spelling() {
        let yaw: Yaw = serde_json::from_str("\"OneEighty\"").unwrap();
        assert_eq!(yaw, Yaw::OneEighty);
        assert!(serde_json::from_str::<Yaw>("\"Ninety Degrees\"").is_err());
    }

    #[test]
    fn test_transform_keeps_positions_and_directions_consistent() {
        let transforms = [
            VariantTransform::rotation(Yaw::Ninety),
            VariantTransform::new(Yaw::OneEighty, true, false),
            VariantTransform::new(Yaw::TwoSeventy, true, true),
        ];
        for transform in transforms {
            for dir in Direction::ALL {
                let (x, y, z) = dir.offset();
                let moved = transform.apply_position(Position::new(x, y, z)).unwrap();
                let turned = transform.apply_direction(dir);
                assert_eq!(moved.as_direction(), Some(turned), "{} {}", transform, dir);
            }
        }
    }

    #[test]
    fn test_apply_position_overflow_is_none() {
        let edge = Position::new(0, 3, i32::MIN);
        assert_eq!(VariantTransform::default().apply_position(edge), Some(edge));
        assert_eq!(VariantTransform::rotation(Yaw::Ninety).apply_position(edge), None);
        assert_eq!(VariantTransform::new(Yaw::Zero, true, false).apply_position(edge), Some(edge));
        assert_eq!(VariantTransform::new(Yaw::Zero, false, true).apply_position(edge), None);
    }
}
