//! Per-rule evaluation against a neighborhood.

use crate::template::{FaceTags, Lenient, RuleToMatch, Template};
use crate::types::{EvaluationContext, NeighborInfo, NeighborQuery};

/// Decides whether concrete rule sets hold for one neighborhood.
pub struct RuleEvaluator<'a, Q: NeighborQuery + ?Sized> {
    template: &'a Template,
    neighbors: &'a Q,
    material: Option<&'a str>,
}

impl<'a, Q: NeighborQuery + ?Sized> RuleEvaluator<'a, Q> {
    pub fn new(template: &'a Template, ctx: &EvaluationContext<'a, Q>) -> Self {
        Self {
            template,
            neighbors: ctx.neighbors,
            material: ctx.material,
        }
    }

    /// All rules hold (an empty list always does).
    pub fn matches_rules(&self, rules: &[RuleToMatch]) -> bool {
        rules.iter().all(|rule| self.matches_rule(rule))
    }

    /// Whether one rule holds.
    pub fn matches_rule(&self, rule: &RuleToMatch) -> bool {
        let Some(offset) = rule.offset() else {
            return false;
        };

        let neighbor = self.neighbor(offset);
        let raw = match neighbor {
            Some(info) => self.predicates_hold(rule, info),
            None => false,
        };

        if rule.is_exclude() {
            !raw
        } else {
            raw
        }
    }

    /// Neighbor lookup with material filtering applied.
    fn neighbor(&self, offset: crate::types::Position) -> Option<&'a NeighborInfo> {
        let info = self.neighbors.get_neighbor(offset)?;
        if self.template.connects_to_other_materials() {
            return Some(info);
        }
        match (self.material, info.material.as_deref()) {
            (Some(ours), Some(theirs)) if ours != theirs => None,
            _ => Some(info),
        }
    }

    /// AND over every populated predicate field of the rule.
    fn predicates_hold(&self, rule: &RuleToMatch, info: &NeighborInfo) -> bool {
        if let Some(normals) = populated(&rule.placement_normals) {
            let hit = info.placement_normal.is_some_and(|normal| {
                normals.iter().any(|n| n.known() == Some(normal))
            });
            if !hit {
                return false;
            }
        }

        let types = populated(&rule.block_types);
        let lists = populated(&rule.block_type_lists);
        if types.is_some() || lists.is_some() {
            let type_hit = types.is_some_and(|types| types.iter().any(|t| *t == info.block_type));
            let list_hit = lists.is_some_and(|lists| {
                lists.iter().any(|l| info.block_type_lists.contains(l))
            });
            if !type_hit && !list_hit {
                return false;
            }
        }

        if let Some(shapes) = populated(&rule.shapes) {
            let hit = shapes.iter().any(|name| {
                self.template.has_shape(name) && info.shape.as_deref() == Some(name.as_str())
            });
            if !hit {
                return false;
            }
        }

        if let Some(face_tags) = rule.face_tags.as_ref().filter(|tags| !tags.is_empty()) {
            if !face_tags_hit(face_tags, info) {
                return false;
            }
        }

        true
    }
}

/// The field, if present and non-empty.
fn populated<T>(field: &Option<Vec<T>>) -> Option<&[T]> {
    field.as_deref().filter(|entries| !entries.is_empty())
}

fn face_tags_hit(required: &FaceTags, info: &NeighborInfo) -> bool {
    required.iter().any(|(face, tags)| match face {
        Lenient::Known(dir) => {
            let present = info.tags_on(*dir);
            tags.iter().any(|tag| present.contains(tag))
        }
        Lenient::Unknown(_) => false,
    })
}
