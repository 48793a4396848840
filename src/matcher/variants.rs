//! Rotation and mirror variants of a pattern's rule set.

use crate::template::{AllowedPatternTransformations, Pattern, RuleToMatch};
use crate::types::{VariantTransform, Yaw};
use serde::Serialize;

/// One concrete instantiation of a pattern's rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PatternVariant {
    pub transform: VariantTransform,
    pub rules: Vec<RuleToMatch>,
}

/// Enumerate every variant the pattern's `AllowedPatternTransformations`
/// permit, in evaluation order: identity first, then rotations ascending,
/// then the mirror X images of those, then the mirror Z images of all
/// previous variants.
///
/// Duplicates are kept; see [`dedup_variants`].
pub fn enumerate_transform_variants(pattern: &Pattern) -> Vec<PatternVariant> {
    variants_of(
        pattern.rules(),
        pattern.transformations(),
        pattern.require_face_tags_matching_roll(),
    )
}

/// Enumerate variants of an arbitrary rule list.
///
/// `directional` controls whether face tag keys and placement normals
/// follow the transform along with positions.
pub fn variants_of(
    rules: &[RuleToMatch],
    allowed: AllowedPatternTransformations,
    directional: bool,
) -> Vec<PatternVariant> {
    transforms_for(allowed)
        .into_iter()
        .map(|transform| PatternVariant {
            transform,
            rules: rules
                .iter()
                .map(|rule| rule.transformed(&transform, directional))
                .collect(),
        })
        .collect()
}

/// The transforms permitted by a set of flags, in evaluation order.
pub fn transforms_for(allowed: AllowedPatternTransformations) -> Vec<VariantTransform> {
    let mut transforms: Vec<VariantTransform> = if allowed.rotatable() {
        Yaw::ALL.into_iter().map(VariantTransform::rotation).collect()
    } else {
        vec![VariantTransform::default()]
    };

    if allowed.mirror_x() {
        let mirrored: Vec<_> = transforms
            .iter()
            .map(|t| VariantTransform { mirror_x: true, ..*t })
            .collect();
        transforms.extend(mirrored);
    }

    if allowed.mirror_z() {
        let mirrored: Vec<_> = transforms
            .iter()
            .map(|t| VariantTransform { mirror_z: true, ..*t })
            .collect();
        transforms.extend(mirrored);
    }

    transforms
}

/// Drop variants whose rule set (as a multiset) equals an earlier variant's.
/// The first occurrence wins, so evaluation order is preserved.
pub fn dedup_variants(variants: Vec<PatternVariant>) -> Vec<PatternVariant> {
    let mut kept: Vec<PatternVariant> = Vec::with_capacity(variants.len());
    for variant in variants {
        if !kept.iter().any(|k| same_rule_set(&k.rules, &variant.rules)) {
            kept.push(variant);
        }
    }
    kept
}

fn same_rule_set(a: &[RuleToMatch], b: &[RuleToMatch]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().all(|rule| {
        let in_a = a.iter().filter(|r| *r == rule).count();
        let in_b = b.iter().filter(|r| *r == rule).count();
        in_a == in_b
    })
}
