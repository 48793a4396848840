//! # Connected Blocks
//!
//! A Rust library for evaluating connected block shape templates.
//!
//! ## Overview
//!
//! A connected block template names a set of shapes. Each shape lists
//! patterns of neighbor rules; the first pattern whose rules all hold for
//! the block's neighborhood (possibly rotated or mirrored) selects that
//! shape and the yaw to place it with.
//!
//! ## Quick Start
//!
//! ```ignore
//! use connected_blocks::{load_template, select_shape, EvaluationContext, Neighborhood};
//!
//! // Load a flattened template
//! let template = load_template("path/to/Fence.json")?;
//!
//! // Describe the neighborhood (or implement NeighborQuery on your world)
//! let neighbors = Neighborhood::from_json(&neighbors_json)?;
//!
//! // Pick the shape
//! let ctx = EvaluationContext::placement(&neighbors);
//! let selection = select_shape(&template, "Straight", &ctx);
//! println!("{:?} at {}", selection.shape_name(), selection.applied_yaw());
//! ```
//!
//! ## Templates with parents
//!
//! Templates that inherit through `Parent` must be flattened first. Load
//! the whole pack and resolve by name:
//!
//! ```ignore
//! use connected_blocks::{load_template_library, Matcher};
//!
//! let library = load_template_library("path/to/templates")?;
//! let template = library.resolve("Fences/Oak")?;
//! let matcher = Matcher::new(&template);
//! ```

pub mod error;
pub mod types;
pub mod template;
pub mod matcher;

// Re-export main types for convenience
pub use error::{MatcherError, Result};
pub use types::{
    Direction, EvaluationContext, NeighborInfo, NeighborQuery, Neighborhood, Position, Trigger,
    VariantTransform, Yaw,
};
pub use template::{
    validate, AllowedPatternTransformations, FaceTags, IncludeOrExclude, Pattern, RuleToMatch,
    Shape, Template, TemplateLibrary, TemplateWarning,
};
pub use matcher::{
    enumerate_transform_variants, Matcher, MatcherConfig, PatternMatch, PatternVariant, Selection,
};

/// Load a single, already flattened template from a JSON file.
pub fn load_template<P: AsRef<std::path::Path>>(path: P) -> Result<Template> {
    template::loader::load_template_file(path)
}

/// Parse a single template from JSON text.
pub fn load_template_from_str(json: &str) -> Result<Template> {
    Template::from_json(json)
}

/// Load a template pack from a file path (ZIP or directory).
pub fn load_template_library<P: AsRef<std::path::Path>>(path: P) -> Result<TemplateLibrary> {
    template::loader::load_from_path(path)
}

/// Load a template pack from ZIP bytes (for WASM compatibility).
pub fn load_template_library_from_bytes(data: &[u8]) -> Result<TemplateLibrary> {
    template::loader::load_from_bytes(data)
}

/// Select a shape using the default matcher configuration.
pub fn select_shape<Q: NeighborQuery + ?Sized>(
    template: &Template,
    shape_name: &str,
    ctx: &EvaluationContext<'_, Q>,
) -> Selection {
    Matcher::new(template).select_shape(shape_name, ctx)
}

#[cfg(feature = "wasm")]
pub mod wasm;
