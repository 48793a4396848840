//! Connected block template definitions.
//!
//! A template maps shape names to ordered lists of patterns; each pattern is
//! a set of positional rules over the neighboring blocks.

use crate::error::{MatcherError, Result};
use crate::types::{Direction, Position, VariantTransform, Yaw};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A value that is either one of the known enumerators or the raw string
/// that failed to parse as one. Unknown values never match anything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Lenient<T> {
    Known(T),
    Unknown(String),
}

impl<T: Copy> Lenient<T> {
    pub fn known(&self) -> Option<T> {
        match self {
            Lenient::Known(v) => Some(*v),
            Lenient::Unknown(_) => None,
        }
    }
}

impl Lenient<Direction> {
    fn map_direction(&self, f: impl Fn(Direction) -> Direction) -> Self {
        match self {
            Lenient::Known(dir) => Lenient::Known(f(*dir)),
            Lenient::Unknown(raw) => Lenient::Unknown(raw.clone()),
        }
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Lenient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lenient::Known(v) => write!(f, "{}", v),
            Lenient::Unknown(raw) => write!(f, "{:?}", raw),
        }
    }
}

/// Tags per face direction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceTags(pub BTreeMap<Lenient<Direction>, Vec<String>>);

impl FaceTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, face: Direction, tags: &[&str]) -> Self {
        self.0
            .entry(Lenient::Known(face))
            .or_default()
            .extend(tags.iter().map(|t| t.to_string()));
        self
    }

    /// Tags on a face; empty when the face has none.
    pub fn get(&self, face: Direction) -> &[String] {
        self.0
            .get(&Lenient::Known(face))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Lenient<Direction>, &Vec<String>)> {
        self.0.iter()
    }

    /// Remap every known face through `f`. Unknown keys are kept as-is.
    pub fn remap(&self, f: impl Fn(Direction) -> Direction) -> FaceTags {
        let mut out = BTreeMap::new();
        for (face, tags) in &self.0 {
            out.entry(face.map_direction(&f))
                .or_insert_with(Vec::new)
                .extend(tags.iter().cloned());
        }
        FaceTags(out)
    }
}

/// A root connected block template asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    /// Template to inherit unset fields from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(rename = "$Comment", default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connects_to_other_materials: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dont_update_after_initial_placement: Option<bool>,
    /// Shape used when no pattern matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_shape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shapes: Option<BTreeMap<String, Shape>>,
    /// Keys this crate does not interpret, kept for round-tripping.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Template {
    /// Parse a template document.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(MatcherError::from_template_json)
    }

    /// Parse a template from an already decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(MatcherError::from_template_json)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn shape(&self, name: &str) -> Option<&Shape> {
        self.shapes.as_ref().and_then(|shapes| shapes.get(name))
    }

    pub fn has_shape(&self, name: &str) -> bool {
        self.shape(name).is_some()
    }

    /// Shape names in map order.
    pub fn shape_names(&self) -> Vec<&str> {
        self.shapes
            .iter()
            .flat_map(|shapes| shapes.keys())
            .map(String::as_str)
            .collect()
    }

    pub fn shapes(&self) -> impl Iterator<Item = (&str, &Shape)> {
        self.shapes
            .iter()
            .flat_map(|shapes| shapes.iter())
            .map(|(name, shape)| (name.as_str(), shape))
    }

    pub fn connects_to_other_materials(&self) -> bool {
        self.connects_to_other_materials.unwrap_or(false)
    }

    pub fn dont_update_after_initial_placement(&self) -> bool {
        self.dont_update_after_initial_placement.unwrap_or(false)
    }
}

/// One named block appearance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Shape {
    /// Candidate patterns; the first one that matches wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patterns_to_match_any_of: Option<Vec<Pattern>>,
    /// Tags on this shape's faces while it is active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_tags: Option<FaceTags>,
}

impl Shape {
    pub fn patterns(&self) -> &[Pattern] {
        self.patterns_to_match_any_of.as_deref().unwrap_or(&[])
    }
}

/// Which symmetry variants of a pattern also count as matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AllowedPatternTransformations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_cardinally_rotatable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror_x: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror_z: Option<bool>,
}

impl AllowedPatternTransformations {
    pub fn rotatable(&self) -> bool {
        self.is_cardinally_rotatable.unwrap_or(false)
    }

    pub fn mirror_x(&self) -> bool {
        self.mirror_x.unwrap_or(false)
    }

    pub fn mirror_z(&self) -> bool {
        self.mirror_z.unwrap_or(false)
    }
}

/// A candidate rule set for selecting a shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Pattern {
    /// Opaque classification carried through to the caller.
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub pattern_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform_rules_to_orientation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaw_to_apply_add_replaced_block_type: Option<Yaw>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_face_tags_matching_roll: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_pattern_transformations: Option<AllowedPatternTransformations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules_to_match: Option<Vec<RuleToMatch>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_on_placement: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_on_update: Option<bool>,
}

impl Pattern {
    pub fn rules(&self) -> &[RuleToMatch] {
        self.rules_to_match.as_deref().unwrap_or(&[])
    }

    pub fn transformations(&self) -> AllowedPatternTransformations {
        self.allowed_pattern_transformations.unwrap_or_default()
    }

    pub fn transform_rules_to_orientation(&self) -> bool {
        self.transform_rules_to_orientation.unwrap_or(false)
    }

    pub fn require_face_tags_matching_roll(&self) -> bool {
        self.require_face_tags_matching_roll.unwrap_or(false)
    }

    pub fn only_on_placement(&self) -> bool {
        self.only_on_placement.unwrap_or(false)
    }

    pub fn only_on_update(&self) -> bool {
        self.only_on_update.unwrap_or(false)
    }

    pub fn yaw(&self) -> Yaw {
        self.yaw_to_apply_add_replaced_block_type.unwrap_or_default()
    }
}

/// Include or exclude semantics of a rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncludeOrExclude {
    #[default]
    Include,
    Exclude,
}

/// Rule offset as written; any component may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct RulePosition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<i32>,
}

impl RulePosition {
    /// The offset, if all three components are present.
    pub fn resolve(&self) -> Option<Position> {
        Some(Position::new(self.x?, self.y?, self.z?))
    }
}

impl From<Position> for RulePosition {
    fn from(p: Position) -> Self {
        Self {
            x: Some(p.x),
            y: Some(p.y),
            z: Some(p.z),
        }
    }
}

/// One positional constraint on a neighbor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RuleToMatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<RulePosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_or_exclude: Option<IncludeOrExclude>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement_normals: Option<Vec<Lenient<Direction>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_type_lists: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shapes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_tags: Option<FaceTags>,
}

impl RuleToMatch {
    /// An include rule at the given offset with no predicates.
    pub fn at(position: Position) -> Self {
        Self {
            position: Some(position.into()),
            ..Default::default()
        }
    }

    pub fn excluding(mut self) -> Self {
        self.include_or_exclude = Some(IncludeOrExclude::Exclude);
        self
    }

    pub fn with_block_types(mut self, types: &[&str]) -> Self {
        self.block_types = Some(types.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn with_shapes(mut self, shapes: &[&str]) -> Self {
        self.shapes = Some(shapes.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_face_tags(mut self, face_tags: FaceTags) -> Self {
        self.face_tags = Some(face_tags);
        self
    }

    /// Offset of the rule, or `None` when the position is missing or partial.
    pub fn offset(&self) -> Option<Position> {
        self.position.as_ref().and_then(RulePosition::resolve)
    }

    pub fn is_exclude(&self) -> bool {
        self.include_or_exclude == Some(IncludeOrExclude::Exclude)
    }

    /// Copy of this rule with the transform applied.
    ///
    /// The position always moves; face tag keys and placement normals only
    /// follow when `directional` is set. Malformed positions are carried
    /// over untouched, and an offset whose image does not fit in `i32`
    /// becomes malformed.
    pub fn transformed(&self, transform: &VariantTransform, directional: bool) -> RuleToMatch {
        let mut rule = self.clone();
        if let Some(offset) = self.offset() {
            rule.position = transform.apply_position(offset).map(RulePosition::from);
        }
        if directional {
            rule.placement_normals = self.placement_normals.as_ref().map(|normals| {
                normals
                    .iter()
                    .map(|n| n.map_direction(|d| transform.apply_direction(d)))
                    .collect()
            });
            rule.face_tags = self
                .face_tags
                .as_ref()
                .map(|tags| tags.remap(|d| transform.apply_direction(d)));
        }
        rule
    }
}
