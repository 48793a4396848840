//! Template `Parent` chain flattening.

use super::{Template, TemplateLibrary};
use crate::error::{MatcherError, Result};
use std::cell::RefCell;
use std::collections::HashMap;

/// Maximum length of a `Parent` chain.
pub const MAX_INHERITANCE_DEPTH: usize = 32;

/// Resolves template inheritance chains.
pub struct InheritanceResolver<'a> {
    library: &'a TemplateLibrary,
    cache: RefCell<HashMap<String, Template>>,
}

impl<'a> InheritanceResolver<'a> {
    pub fn new(library: &'a TemplateLibrary) -> Self {
        Self {
            library,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Resolve a template with all inherited fields merged in.
    pub fn resolve(&self, name: &str) -> Result<Template> {
        if let Some(cached) = self.cache.borrow().get(name) {
            return Ok(cached.clone());
        }

        let mut visited = Vec::new();
        let resolved = self.resolve_internal(name, &mut visited)?;

        self.cache
            .borrow_mut()
            .insert(name.to_string(), resolved.clone());

        Ok(resolved)
    }

    fn resolve_internal(&self, name: &str, visited: &mut Vec<String>) -> Result<Template> {
        if visited.iter().any(|seen| seen == name) {
            visited.push(name.to_string());
            return Err(MatcherError::InheritanceCycle(visited.join(" -> ")));
        }
        if visited.len() >= MAX_INHERITANCE_DEPTH {
            return Err(MatcherError::InheritanceTooDeep(name.to_string()));
        }
        visited.push(name.to_string());

        let template = self
            .library
            .get(name)
            .ok_or_else(|| MatcherError::TemplateNotFound(name.to_string()))?;

        let parent_name = match &template.parent {
            Some(parent) => parent.clone(),
            None => return Ok(template.clone()),
        };

        let parent = self.resolve_internal(&parent_name, visited)?;
        Ok(merge_templates(&parent, template))
    }
}

/// Merge a flattened parent into a child. Child values win; keyed maps
/// are merged entry by entry.
pub fn merge_templates(parent: &Template, child: &Template) -> Template {
    let mut merged = parent.clone();

    if child.comment.is_some() {
        merged.comment = child.comment.clone();
    }
    if child.connects_to_other_materials.is_some() {
        merged.connects_to_other_materials = child.connects_to_other_materials;
    }
    if child.dont_update_after_initial_placement.is_some() {
        merged.dont_update_after_initial_placement = child.dont_update_after_initial_placement;
    }
    if child.default_shape.is_some() {
        merged.default_shape = child.default_shape.clone();
    }

    if let Some(child_tags) = &child.tags {
        let tags = merged.tags.get_or_insert_with(Default::default);
        for (key, value) in child_tags {
            tags.insert(key.clone(), value.clone());
        }
    }

    if let Some(child_shapes) = &child.shapes {
        let shapes = merged.shapes.get_or_insert_with(Default::default);
        for (name, shape) in child_shapes {
            shapes.insert(name.clone(), shape.clone());
        }
    }

    for (key, value) in &child.extra {
        merged.extra.insert(key.clone(), value.clone());
    }

    merged.parent = None;

    merged
}
