//! Ordered pattern selection for one shape.

use super::evaluator::RuleEvaluator;
use super::variants::{dedup_variants, variants_of, PatternVariant};
use crate::template::{FaceTags, Pattern, RuleToMatch, Shape, Template};
use crate::types::{EvaluationContext, NeighborQuery, Trigger, VariantTransform, Yaw};
use serde::Serialize;

/// A pattern that matched, with the variant that made it match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PatternMatch {
    pub pattern_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_type: Option<String>,
    pub variant: VariantTransform,
    /// Variant rotation composed with the pattern's yaw. The orientation
    /// pre-rotation is not included; the block already carries it.
    pub applied_yaw: Yaw,
}

/// Outcome of shape selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "State")]
pub enum Selection {
    /// A pattern matched.
    #[serde(rename_all = "PascalCase")]
    Resolved {
        shape_name: String,
        pattern_index: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        pattern_type: Option<String>,
        variant: VariantTransform,
        applied_yaw: Yaw,
    },
    /// Nothing matched; render the default shape, unrotated.
    #[serde(rename_all = "PascalCase")]
    Unresolved { shape_name: Option<String> },
    /// The template does not re-evaluate on updates; keep the current shape.
    Suppressed,
}

impl Selection {
    pub(crate) fn resolved(shape_name: &str, hit: PatternMatch) -> Self {
        Selection::Resolved {
            shape_name: shape_name.to_string(),
            pattern_index: hit.pattern_index,
            pattern_type: hit.pattern_type,
            variant: hit.variant,
            applied_yaw: hit.applied_yaw,
        }
    }

    /// Name of the shape to render, if there is one.
    pub fn shape_name(&self) -> Option<&str> {
        match self {
            Selection::Resolved { shape_name, .. } => Some(shape_name),
            Selection::Unresolved { shape_name } => shape_name.as_deref(),
            Selection::Suppressed => None,
        }
    }

    pub fn pattern_index(&self) -> Option<usize> {
        match self {
            Selection::Resolved { pattern_index, .. } => Some(*pattern_index),
            _ => None,
        }
    }

    pub fn variant(&self) -> Option<VariantTransform> {
        match self {
            Selection::Resolved { variant, .. } => Some(*variant),
            _ => None,
        }
    }

    /// Yaw to give the placed block; the default shape is never rotated.
    pub fn applied_yaw(&self) -> Yaw {
        match self {
            Selection::Resolved { applied_yaw, .. } => *applied_yaw,
            _ => Yaw::Zero,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Selection::Resolved { .. })
    }

    /// The selected shape's face tags in world directions: rotated by the
    /// applied yaw, then mirrored like the matching variant.
    pub fn face_tags(&self, template: &Template) -> Option<FaceTags> {
        let shape = template.shape(self.shape_name()?)?;
        let tags = shape.face_tags.as_ref()?;
        let world = VariantTransform {
            rotation: self.applied_yaw(),
            ..self.variant().unwrap_or_default()
        };
        Some(tags.remap(|dir| world.apply_direction(dir)))
    }
}

/// Whether a pattern may run for this trigger.
pub fn is_eligible(pattern: &Pattern, trigger: Trigger) -> bool {
    match trigger {
        Trigger::Placement => !pattern.only_on_update(),
        Trigger::Update => !pattern.only_on_placement(),
    }
}

/// The pattern's variants for this context, in evaluation order.
pub fn pattern_variants<Q: NeighborQuery + ?Sized>(
    pattern: &Pattern,
    ctx: &EvaluationContext<'_, Q>,
    dedup: bool,
) -> Vec<PatternVariant> {
    let base: Vec<RuleToMatch> = if pattern.transform_rules_to_orientation() {
        let orient = VariantTransform::rotation(ctx.orientation);
        pattern
            .rules()
            .iter()
            .map(|rule| rule.transformed(&orient, true))
            .collect()
    } else {
        pattern.rules().to_vec()
    };

    let variants = variants_of(
        &base,
        pattern.transformations(),
        pattern.require_face_tags_matching_roll(),
    );
    if dedup {
        dedup_variants(variants)
    } else {
        variants
    }
}

/// Test one pattern; returns the first matching variant.
pub fn match_pattern<'a, Q: NeighborQuery + ?Sized>(
    template: &'a Template,
    pattern: &Pattern,
    pattern_index: usize,
    ctx: &EvaluationContext<'a, Q>,
    dedup: bool,
) -> Option<PatternMatch> {
    if !is_eligible(pattern, ctx.trigger) {
        tracing::trace!("pattern {} skipped for {}", pattern_index, ctx.trigger);
        return None;
    }

    let evaluator = RuleEvaluator::new(template, ctx);
    for variant in pattern_variants(pattern, ctx, dedup) {
        if evaluator.matches_rules(&variant.rules) {
            tracing::trace!("pattern {} matched with {}", pattern_index, variant.transform);
            return Some(PatternMatch {
                pattern_index,
                pattern_type: pattern.pattern_type.clone(),
                variant: variant.transform,
                applied_yaw: variant.transform.rotation.compose(pattern.yaw()),
            });
        }
    }

    None
}

/// First pattern of the shape that matches, in array order.
pub fn first_match<'a, Q: NeighborQuery + ?Sized>(
    template: &'a Template,
    shape: &Shape,
    ctx: &EvaluationContext<'a, Q>,
    dedup: bool,
) -> Option<PatternMatch> {
    shape
        .patterns()
        .iter()
        .enumerate()
        .find_map(|(i, pattern)| match_pattern(template, pattern, i, ctx, dedup))
}

/// Every pattern of the shape that matches, in array order.
pub fn all_matches<'a, Q: NeighborQuery + ?Sized>(
    template: &'a Template,
    shape: &Shape,
    ctx: &EvaluationContext<'a, Q>,
    dedup: bool,
) -> Vec<PatternMatch> {
    shape
        .patterns()
        .iter()
        .enumerate()
        .filter_map(|(i, pattern)| match_pattern(template, pattern, i, ctx, dedup))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, NeighborInfo, Neighborhood, Position};

    fn shape(json: &str) -> Shape {
        serde_json::from_str(json).unwrap()
    }

    fn template() -> Template {
        Template::from_json(r#"{ "DefaultShape": "a", "Shapes": { "a": {} } }"#).unwrap()
    }

    #[test]
    fn test_first_match_wins() {
        let s = shape(
            r#"{ "PatternsToMatchAnyOf": [
                { "Type": "weak" },
                { "Type": "strong", "RulesToMatch": [ { "Position": {"X": 0, "Y": 5, "Z": 0}, "BlockTypes": ["never"] } ] }
            ] }"#,
        );
        let template = template();
        let hood = Neighborhood::new();
        let ctx = EvaluationContext::placement(&hood);

        let hit = first_match(&template, &s, &ctx, true).unwrap();
        assert_eq!(hit.pattern_index, 0);
        assert_eq!(hit.pattern_type.as_deref(), Some("weak"));
    }

    #[test]
    fn test_later_pattern_when_earlier_fails() {
        let s = shape(
            r#"{ "PatternsToMatchAnyOf": [
                { "RulesToMatch": [ { "Position": {"X": 1, "Y": 0, "Z": 0}, "BlockTypes": ["stone"] } ] },
                { "RulesToMatch": [ { "Position": {"X": 1, "Y": 0, "Z": 0}, "BlockTypes": ["dirt"] } ] }
            ] }"#,
        );
        let template = template();
        let hood = Neighborhood::new().with(Position::new(1, 0, 0), NeighborInfo::new("dirt"));
        let ctx = EvaluationContext::placement(&hood);

        assert_eq!(first_match(&template, &s, &ctx, true).unwrap().pattern_index, 1);
        assert_eq!(all_matches(&template, &s, &ctx, true).len(), 1);
    }

    #[test]
    fn test_trigger_filters() {
        let s = shape(
            r#"{ "PatternsToMatchAnyOf": [
                { "Type": "placement", "OnlyOnPlacement": true },
                { "Type": "update", "OnlyOnUpdate": true }
            ] }"#,
        );
        let template = template();
        let hood = Neighborhood::new();

        let placed = all_matches(&template, &s, &EvaluationContext::placement(&hood), true);
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].pattern_type.as_deref(), Some("placement"));

        let updated = all_matches(&template, &s, &EvaluationContext::update(&hood), true);
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].pattern_type.as_deref(), Some("update"));
    }

    #[test]
    fn test_rotation_variant_and_yaw() {
        // Canonical: neighbor to the north. Actual neighbor is to the south.
        let s = shape(
            r#"{ "PatternsToMatchAnyOf": [ {
                "YawToApplyAddReplacedBlockType": "Ninety",
                "AllowedPatternTransformations": { "IsCardinallyRotatable": true },
                "RulesToMatch": [ { "Position": {"X": 0, "Y": 0, "Z": -1}, "BlockTypes": ["rail"] } ]
            } ] }"#,
        );
        let template = template();
        let hood = Neighborhood::new().with(Position::from(Direction::South), NeighborInfo::new("rail"));
        let ctx = EvaluationContext::placement(&hood);

        let hit = first_match(&template, &s, &ctx, true).unwrap();
        assert_eq!(hit.variant, VariantTransform::rotation(Yaw::OneEighty));
        assert_eq!(hit.applied_yaw, Yaw::TwoSeventy);
    }

    #[test]
    fn test_orientation_pre_rotation() {
        let s = shape(
            r#"{ "PatternsToMatchAnyOf": [ {
                "TransformRulesToOrientation": true,
                "RulesToMatch": [ { "Position": {"X": 0, "Y": 0, "Z": -1}, "BlockTypes": ["rail"] } ]
            } ] }"#,
        );
        let template = template();
        let hood = Neighborhood::new().with(Position::from(Direction::East), NeighborInfo::new("rail"));

        let unrotated = EvaluationContext::placement(&hood);
        assert!(first_match(&template, &s, &unrotated, true).is_none());

        let facing_east = EvaluationContext::placement(&hood).with_orientation(Yaw::Ninety);
        let hit = first_match(&template, &s, &facing_east, true).unwrap();
        assert!(hit.variant.is_identity());
        assert_eq!(hit.applied_yaw, Yaw::Zero);
    }

    #[test]
    fn test_face_tags_follow_roll_only_when_required() {
        let json = |roll: bool| {
            format!(
                r#"{{ "PatternsToMatchAnyOf": [ {{
                    "RequireFaceTagsMatchingRoll": {},
                    "AllowedPatternTransformations": {{ "IsCardinallyRotatable": true }},
                    "RulesToMatch": [ {{ "Position": {{"X": 0, "Y": 0, "Z": -1}}, "FaceTags": {{ "South": ["open"] }} }} ]
                }} ] }}"#,
                roll
            )
        };
        let template = template();
        // Neighbor to the east, open on its West face (facing us).
        let hood = Neighborhood::new().with(
            Position::from(Direction::East),
            NeighborInfo::new("pipe").with_face_tag(Direction::West, "open"),
        );
        let ctx = EvaluationContext::placement(&hood);

        let rolled = first_match(&template, &shape(&json(true)), &ctx, true).unwrap();
        assert_eq!(rolled.variant.rotation, Yaw::Ninety);

        assert!(first_match(&template, &shape(&json(false)), &ctx, true).is_none());
    }

    #[test]
    fn test_selection_face_tags_rotate_with_yaw() {
        let template = Template::from_json(
            r#"{ "Shapes": { "end": { "FaceTags": { "North": ["cap"], "Up": ["top"] } } } }"#,
        )
        .unwrap();
        let selection = Selection::Resolved {
            shape_name: "end".to_string(),
            pattern_index: 0,
            pattern_type: None,
            variant: VariantTransform::default(),
            applied_yaw: Yaw::Ninety,
        };

        let tags = selection.face_tags(&template).unwrap();
        assert_eq!(tags.get(Direction::East), &["cap".to_string()]);
        assert_eq!(tags.get(Direction::Up), &["top".to_string()]);
        assert!(tags.get(Direction::North).is_empty());
    }

    #[test]
    fn test_selection_face_tags_follow_mirror() {
        let template = Template::from_json(
            r#"{ "Shapes": { "end": { "FaceTags": { "East": ["open"], "North": ["cap"] } } } }"#,
        )
        .unwrap();
        let selection = Selection::Resolved {
            shape_name: "end".to_string(),
            pattern_index: 0,
            pattern_type: None,
            variant: VariantTransform::new(Yaw::Ninety, true, false),
            applied_yaw: Yaw::Ninety,
        };

        // East turns to South (mirror X keeps it); North turns to East, then mirrors to West.
        let tags = selection.face_tags(&template).unwrap();
        assert_eq!(tags.get(Direction::South), &["open".to_string()]);
        assert_eq!(tags.get(Direction::West), &["cap".to_string()]);
        assert!(tags.get(Direction::East).is_empty());
    }

    #[test]
    fn test_extreme_offset_never_panics() {
        let s = shape(
            r#"{ "PatternsToMatchAnyOf": [ {
                "AllowedPatternTransformations": { "IsCardinallyRotatable": true, "MirrorX": true },
                "RulesToMatch": [ { "Position": {"X": -2147483648, "Y": 0, "Z": 0}, "IncludeOrExclude": "Exclude" } ]
            } ] }"#,
        );
        let template = template();
        let hood = Neighborhood::new();
        let ctx = EvaluationContext::placement(&hood);

        // Identity and the quarter turn keep the offset in range, so the exclusion holds there.
        let hit = first_match(&template, &s, &ctx, false).unwrap();
        assert!(hit.variant.is_identity());

        let variants = pattern_variants(&s.patterns()[0], &ctx, false);
        assert_eq!(variants.len(), 8);
        assert_eq!(variants[2].rules[0].offset(), None);
    }

    #[test]
    fn test_selection_serializes_with_state_tag() {
        let selection = Selection::Unresolved {
            shape_name: Some("flat".to_string()),
        };
        let value = serde_json::to_value(&selection).unwrap();
        assert_eq!(value["State"], "Unresolved");
        assert_eq!(value["ShapeName"], "flat");
    }
}
