//! Shape selection for connected blocks.
//!
//! Given a flattened template and a neighborhood, decide which shape a block
//! adopts and with which yaw. Selection never fails: malformed or dangling
//! data simply does not match.

pub mod evaluator;
pub mod selector;
pub mod variants;

pub use evaluator::RuleEvaluator;
pub use selector::{PatternMatch, Selection};
pub use variants::{dedup_variants, enumerate_transform_variants, PatternVariant};

use crate::template::{Pattern, Template, TemplateWarning};
use crate::types::{EvaluationContext, NeighborQuery, Trigger};

/// Configuration for the matcher.
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Skip variants whose rule set repeats an earlier one.
    pub dedup_variants: bool,
    /// After a pattern wins, keep checking and log when later patterns
    /// would also match. Never changes the result.
    pub report_ambiguous: bool,
    /// Apply `DontUpdateAfterInitialPlacement` to update triggers.
    pub honor_dont_update: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            dedup_variants: true,
            report_ambiguous: false,
            honor_dont_update: true,
        }
    }
}

impl MatcherConfig {
    pub fn with_dedup_variants(mut self, enabled: bool) -> Self {
        self.dedup_variants = enabled;
        self
    }

    pub fn with_report_ambiguous(mut self, enabled: bool) -> Self {
        self.report_ambiguous = enabled;
        self
    }

    pub fn with_honor_dont_update(mut self, enabled: bool) -> Self {
        self.honor_dont_update = enabled;
        self
    }
}

/// Shape selector bound to one immutable template.
pub struct Matcher<'t> {
    template: &'t Template,
    config: MatcherConfig,
}

impl<'t> Matcher<'t> {
    pub fn new(template: &'t Template) -> Self {
        Self::with_config(template, MatcherConfig::default())
    }

    pub fn with_config(template: &'t Template, config: MatcherConfig) -> Self {
        Self { template, config }
    }

    pub fn template(&self) -> &'t Template {
        self.template
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Run pattern selection for one named shape.
    pub fn select_shape<Q: NeighborQuery + ?Sized>(
        &self,
        shape_name: &str,
        ctx: &EvaluationContext<'_, Q>,
    ) -> Selection {
        if self.suppressed(ctx) {
            return Selection::Suppressed;
        }

        let Some(shape) = self.template.shape(shape_name) else {
            tracing::warn!("Shape '{}' is not defined; using default shape", shape_name);
            return self.fallback();
        };

        match selector::first_match(self.template, shape, ctx, self.config.dedup_variants) {
            Some(hit) => {
                tracing::debug!(
                    "{} resolved by pattern {} ({})",
                    shape_name,
                    hit.pattern_index,
                    hit.variant
                );
                if self.config.report_ambiguous {
                    self.report_ambiguity(shape_name, ctx);
                }
                Selection::resolved(shape_name, hit)
            }
            None => {
                tracing::debug!("{}: no pattern matched", shape_name);
                self.fallback()
            }
        }
    }

    /// Test every shape in map order; the first shape with a matching
    /// pattern wins, otherwise the default shape.
    pub fn resolve_shape<Q: NeighborQuery + ?Sized>(
        &self,
        ctx: &EvaluationContext<'_, Q>,
    ) -> Selection {
        if self.suppressed(ctx) {
            return Selection::Suppressed;
        }

        for (name, shape) in self.template.shapes() {
            if let Some(hit) =
                selector::first_match(self.template, shape, ctx, self.config.dedup_variants)
            {
                tracing::debug!("{} resolved by pattern {}", name, hit.pattern_index);
                if self.config.report_ambiguous {
                    self.report_ambiguity(name, ctx);
                }
                return Selection::resolved(name, hit);
            }
        }

        self.fallback()
    }

    /// Every eligible pattern of the shape that matches, in order.
    pub fn matching_patterns<Q: NeighborQuery + ?Sized>(
        &self,
        shape_name: &str,
        ctx: &EvaluationContext<'_, Q>,
    ) -> Vec<PatternMatch> {
        match self.template.shape(shape_name) {
            Some(shape) => {
                selector::all_matches(self.template, shape, ctx, self.config.dedup_variants)
            }
            None => Vec::new(),
        }
    }

    /// Variants of a pattern as this matcher would try them, before any
    /// orientation pre-rotation.
    pub fn variants(&self, pattern: &Pattern) -> Vec<PatternVariant> {
        let all = enumerate_transform_variants(pattern);
        if self.config.dedup_variants {
            dedup_variants(all)
        } else {
            all
        }
    }

    fn suppressed<Q: NeighborQuery + ?Sized>(&self, ctx: &EvaluationContext<'_, Q>) -> bool {
        self.config.honor_dont_update
            && ctx.trigger == Trigger::Update
            && self.template.dont_update_after_initial_placement()
    }

    fn fallback(&self) -> Selection {
        let shape_name = match &self.template.default_shape {
            Some(name) if self.template.has_shape(name) => Some(name.clone()),
            Some(name) => {
                tracing::warn!("DefaultShape '{}' is not defined", name);
                None
            }
            None => None,
        };
        Selection::Unresolved { shape_name }
    }

    fn report_ambiguity<Q: NeighborQuery + ?Sized>(
        &self,
        shape_name: &str,
        ctx: &EvaluationContext<'_, Q>,
    ) {
        let hits = self.matching_patterns(shape_name, ctx);
        if hits.len() > 1 {
            let warning = TemplateWarning::AmbiguousMatch {
                shape: shape_name.to_string(),
                patterns: hits.iter().map(|h| h.pattern_index).collect(),
            };
            tracing::warn!("{}", warning);
        }
    }
}
