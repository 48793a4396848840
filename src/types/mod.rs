//! Shared types used throughout the library.

mod direction;
mod transform;

pub use direction::Direction;
pub use transform::{VariantTransform, Yaw};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An integer offset or block position in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0, z: 0 };

    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Get the neighboring position in the given direction.
    pub fn neighbor(&self, direction: Direction) -> Self {
        let (dx, dy, dz) = direction.offset();
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    /// Rotate around the Y axis in 90-degree steps, same handedness as
    /// [`Direction::rotate_y`]: one step maps `(x, y, z)` to `(-z, y, x)`.
    ///
    /// Returns `None` when a component cannot be negated (`i32::MIN`).
    pub fn checked_rotate_y(self, quarter_turns: i32) -> Option<Self> {
        Some(match quarter_turns.rem_euclid(4) {
            0 => self,
            1 => Self::new(self.z.checked_neg()?, self.y, self.x),
            2 => Self::new(self.x.checked_neg()?, self.y, self.z.checked_neg()?),
            _ => Self::new(self.z, self.y, self.x.checked_neg()?),
        })
    }

    pub fn checked_mirror_x(self) -> Option<Self> {
        Some(Self::new(self.x.checked_neg()?, self.y, self.z))
    }

    pub fn checked_mirror_z(self) -> Option<Self> {
        Some(Self::new(self.x, self.y, self.z.checked_neg()?))
    }

    /// The direction this offset points in, if it is a unit face offset.
    pub fn as_direction(&self) -> Option<Direction> {
        Direction::from_offset(self.x, self.y, self.z)
    }
}

impl From<Direction> for Position {
    fn from(direction: Direction) -> Self {
        let (x, y, z) = direction.offset();
        Self { x, y, z }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// What a neighborhood lookup reports about one neighboring block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NeighborInfo {
    /// Registered block type, e.g. "Rock_Stone".
    pub block_type: String,
    /// Block type lists this type is a member of.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub block_type_lists: Vec<String>,
    /// The neighbor's currently resolved connected-block shape, if it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    /// Material of the neighbor, used when the template does not connect
    /// to other materials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    /// Tags on each of the neighbor's faces, in world directions.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub face_tags: HashMap<Direction, Vec<String>>,
    /// Normal of the face the neighbor was placed against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement_normal: Option<Direction>,
}

impl NeighborInfo {
    pub fn new(block_type: impl Into<String>) -> Self {
        Self {
            block_type: block_type.into(),
            ..Default::default()
        }
    }

    pub fn with_type_list(mut self, list: impl Into<String>) -> Self {
        self.block_type_lists.push(list.into());
        self
    }

    pub fn with_shape(mut self, shape: impl Into<String>) -> Self {
        self.shape = Some(shape.into());
        self
    }

    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    pub fn with_face_tag(mut self, face: Direction, tag: impl Into<String>) -> Self {
        self.face_tags.entry(face).or_default().push(tag.into());
        self
    }

    pub fn with_placement_normal(mut self, normal: Direction) -> Self {
        self.placement_normal = Some(normal);
        self
    }

    /// Tags on the given face.
    pub fn tags_on(&self, face: Direction) -> &[String] {
        self.face_tags.get(&face).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Trait for neighborhood data sources (world or chunk storage).
///
/// Offsets are relative to the block being evaluated.
pub trait NeighborQuery {
    /// Get the neighbor at a relative offset, or `None` for void/unloaded.
    fn get_neighbor(&self, offset: Position) -> Option<&NeighborInfo>;
}

impl<T: NeighborQuery + ?Sized> NeighborQuery for &T {
    fn get_neighbor(&self, offset: Position) -> Option<&NeighborInfo> {
        (**self).get_neighbor(offset)
    }
}

/// A neighborhood snapshot held in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Neighborhood {
    neighbors: HashMap<Position, NeighborInfo>,
}

impl Neighborhood {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, offset: Position, info: NeighborInfo) -> Self {
        self.insert(offset, info);
        self
    }

    pub fn insert(&mut self, offset: Position, info: NeighborInfo) {
        self.neighbors.insert(offset, info);
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Position, &NeighborInfo)> {
        self.neighbors.iter()
    }

    /// Parse `{"Neighbors": [{"Position": {...}, "BlockType": ..., ...}]}`.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        let doc: NeighborhoodDocument = serde_json::from_str(json)?;
        Ok(doc.into())
    }
}

impl NeighborQuery for Neighborhood {
    fn get_neighbor(&self, offset: Position) -> Option<&NeighborInfo> {
        self.neighbors.get(&offset)
    }
}

impl FromIterator<(Position, NeighborInfo)> for Neighborhood {
    fn from_iter<I: IntoIterator<Item = (Position, NeighborInfo)>>(iter: I) -> Self {
        Self {
            neighbors: iter.into_iter().collect(),
        }
    }
}

// JSON input format
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NeighborhoodDocument {
    #[serde(default)]
    neighbors: Vec<NeighborEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NeighborEntry {
    position: Position,
    #[serde(flatten)]
    info: NeighborInfo,
}

impl From<NeighborhoodDocument> for Neighborhood {
    fn from(doc: NeighborhoodDocument) -> Self {
        doc.neighbors
            .into_iter()
            .map(|entry| (entry.position, entry.info))
            .collect()
    }
}

/// What caused an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Trigger {
    /// The block is being placed.
    #[default]
    Placement,
    /// A neighboring block changed.
    Update,
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trigger::Placement => write!(f, "placement"),
            Trigger::Update => write!(f, "update"),
        }
    }
}

/// Everything one shape selection needs besides the template.
pub struct EvaluationContext<'a, Q: NeighborQuery + ?Sized> {
    pub trigger: Trigger,
    /// Stored yaw of the block being evaluated.
    pub orientation: Yaw,
    /// Material of the block being evaluated, if known.
    pub material: Option<&'a str>,
    pub neighbors: &'a Q,
}

impl<Q: NeighborQuery + ?Sized> Clone for EvaluationContext<'_, Q> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Q: NeighborQuery + ?Sized> Copy for EvaluationContext<'_, Q> {}

impl<'a, Q: NeighborQuery + ?Sized> EvaluationContext<'a, Q> {
    pub fn new(trigger: Trigger, neighbors: &'a Q) -> Self {
        Self {
            trigger,
            orientation: Yaw::Zero,
            material: None,
            neighbors,
        }
    }

    pub fn placement(neighbors: &'a Q) -> Self {
        Self::new(Trigger::Placement, neighbors)
    }

    pub fn update(neighbors: &'a Q) -> Self {
        Self::new(Trigger::Update, neighbors)
    }

    pub fn with_orientation(mut self, orientation: Yaw) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_material(mut self, material: &'a str) -> Self {
        self.material = Some(material);
        self
    }
}
