//! Static checks for references and values the matcher will treat as
//! never-matching.

use super::{FaceTags, Lenient, Pattern, RuleToMatch, Template};
use serde::Serialize;

/// A non-fatal problem with a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "Kind", rename_all = "PascalCase")]
pub enum TemplateWarning {
    /// No `DefaultShape` is set.
    MissingDefaultShape,
    /// `DefaultShape` names a shape that does not exist.
    UnresolvedDefaultShape { name: String },
    /// A rule's `Shapes` predicate names a shape that does not exist.
    UnresolvedShapeReference {
        shape: String,
        pattern: usize,
        rule: usize,
        name: String,
    },
    /// A direction string that is not one of the six enumerators.
    UnknownDirection { location: String, value: String },
    /// A rule with no `Position`, a partial one, or one that overflows
    /// under the pattern's transforms.
    MalformedPosition {
        shape: String,
        pattern: usize,
        rule: usize,
    },
    /// A pattern flagged both `OnlyOnPlacement` and `OnlyOnUpdate`.
    ConflictingTriggers { shape: String, pattern: usize },
    /// More than one pattern of a shape matched the same neighborhood.
    AmbiguousMatch { shape: String, patterns: Vec<usize> },
}

impl std::fmt::Display for TemplateWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateWarning::MissingDefaultShape => write!(f, "no DefaultShape set"),
            TemplateWarning::UnresolvedDefaultShape { name } => {
                write!(f, "DefaultShape '{}' is not a defined shape", name)
            }
            TemplateWarning::UnresolvedShapeReference {
                shape,
                pattern,
                rule,
                name,
            } => write!(
                f,
                "{}[{}] rule {}: shape '{}' is not defined and will never match",
                shape, pattern, rule, name
            ),
            TemplateWarning::UnknownDirection { location, value } => {
                write!(f, "{}: unknown direction '{}'", location, value)
            }
            TemplateWarning::MalformedPosition {
                shape,
                pattern,
                rule,
            } => write!(
                f,
                "{}[{}] rule {}: Position is missing, incomplete or out of range; rule never matches",
                shape, pattern, rule
            ),
            TemplateWarning::ConflictingTriggers { shape, pattern } => write!(
                f,
                "{}[{}]: both OnlyOnPlacement and OnlyOnUpdate are set; pattern is never evaluated",
                shape, pattern
            ),
            TemplateWarning::AmbiguousMatch { shape, patterns } => write!(
                f,
                "{}: patterns {:?} all match the same neighborhood",
                shape, patterns
            ),
        }
    }
}

/// Check a flattened template for problems that would silently fail closed
/// during matching.
pub fn validate(template: &Template) -> Vec<TemplateWarning> {
    let mut warnings = Vec::new();

    match &template.default_shape {
        None => warnings.push(TemplateWarning::MissingDefaultShape),
        Some(name) if !template.has_shape(name) => {
            warnings.push(TemplateWarning::UnresolvedDefaultShape { name: name.clone() })
        }
        Some(_) => {}
    }

    for (shape_name, shape) in template.shapes() {
        if let Some(tags) = &shape.face_tags {
            check_face_tags(tags, &format!("{}.FaceTags", shape_name), &mut warnings);
        }

        for (p, pattern) in shape.patterns().iter().enumerate() {
            if pattern.only_on_placement() && pattern.only_on_update() {
                warnings.push(TemplateWarning::ConflictingTriggers {
                    shape: shape_name.to_string(),
                    pattern: p,
                });
            }

            for (r, rule) in pattern.rules().iter().enumerate() {
                let location = format!("{}[{}] rule {}", shape_name, p, r);

                if rule.offset().is_none() || !survives_transforms(pattern, rule) {
                    warnings.push(TemplateWarning::MalformedPosition {
                        shape: shape_name.to_string(),
                        pattern: p,
                        rule: r,
                    });
                }

                for name in rule.shapes.iter().flatten() {
                    if !template.has_shape(name) {
                        warnings.push(TemplateWarning::UnresolvedShapeReference {
                            shape: shape_name.to_string(),
                            pattern: p,
                            rule: r,
                            name: name.clone(),
                        });
                    }
                }

                for normal in rule.placement_normals.iter().flatten() {
                    if let Lenient::Unknown(value) = normal {
                        warnings.push(TemplateWarning::UnknownDirection {
                            location: format!("{} PlacementNormals", location),
                            value: value.clone(),
                        });
                    }
                }

                if let Some(tags) = &rule.face_tags {
                    check_face_tags(tags, &format!("{} FaceTags", location), &mut warnings);
                }
            }
        }
    }

    warnings
}

/// Whether every transform the pattern may apply keeps the rule's offset
/// inside `i32`. Negating `i32::MIN` overflows.
fn survives_transforms(pattern: &Pattern, rule: &RuleToMatch) -> bool {
    let Some(offset) = rule.offset() else {
        return true;
    };
    let allowed = pattern.transformations();
    let x_edge = offset.x == i32::MIN;
    let z_edge = offset.z == i32::MIN;

    let rotates = allowed.rotatable() || pattern.transform_rules_to_orientation();
    !((rotates && (x_edge || z_edge))
        || (allowed.mirror_x() && x_edge)
        || (allowed.mirror_z() && z_edge))
}

fn check_face_tags(tags: &FaceTags, location: &str, warnings: &mut Vec<TemplateWarning>) {
    for (face, _) in tags.iter() {
        if let Lenient::Unknown(value) = face {
            warnings.push(TemplateWarning::UnknownDirection {
                location: location.to_string(),
                value: value.clone(),
            });
        }
    }
}
