//! Template loading, inheritance and validation.
//!
//! This module handles loading connected block templates (single JSON files,
//! ZIP archives or directories), flattening their `Parent` chains, and
//! checking them for references the matcher cannot satisfy.

pub mod loader;
pub mod model;
pub mod inheritance;
pub mod validate;

pub use inheritance::InheritanceResolver;
pub use model::{
    AllowedPatternTransformations, FaceTags, IncludeOrExclude, Lenient, Pattern, RulePosition,
    RuleToMatch, Shape, Template,
};
pub use validate::{validate, TemplateWarning};

use crate::error::Result;
use std::collections::BTreeMap;

/// A set of named, possibly unflattened templates.
#[derive(Debug, Default, Clone)]
pub struct TemplateLibrary {
    /// Templates by name (relative path without `.json`).
    pub templates: BTreeMap<String, Template>,
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_template(&mut self, name: &str, template: Template) {
        self.templates.insert(name.to_string(), template);
    }

    /// Get a template as written, without inheritance applied.
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    pub fn names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    /// Get a template with its `Parent` chain merged in.
    pub fn resolve(&self, name: &str) -> Result<Template> {
        InheritanceResolver::new(self).resolve(name)
    }

    /// Flatten every template in the library.
    pub fn resolve_all(&self) -> Result<BTreeMap<String, Template>> {
        let resolver = InheritanceResolver::new(self);
        self.templates
            .keys()
            .map(|name| Ok((name.clone(), resolver.resolve(name)?)))
            .collect()
    }
}
