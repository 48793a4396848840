//! WASM bindings for connected-blocks.
//!
//! This module provides JavaScript-friendly APIs for use in the browser.

use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the browser console
    console_error_panic_hook::set_once();
}

/// A parsed template held on the Rust side.
#[wasm_bindgen]
pub struct TemplateHandle {
    inner: crate::Template,
}

#[wasm_bindgen]
impl TemplateHandle {
    /// Parse a flattened template from JSON text.
    #[wasm_bindgen(constructor)]
    pub fn new(json: &str) -> Result<TemplateHandle, JsError> {
        let template =
            crate::load_template_from_str(json).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(TemplateHandle { inner: template })
    }

    /// Names of all shapes, in map order.
    pub fn shape_names(&self) -> js_sys::Array {
        self.inner
            .shape_names()
            .into_iter()
            .map(JsValue::from_str)
            .collect()
    }

    /// Number of patterns in a shape (0 for unknown shapes).
    pub fn pattern_count(&self, shape: &str) -> usize {
        self.inner
            .shape(shape)
            .map(|s| s.patterns().len())
            .unwrap_or(0)
    }

    /// Number of distinct transform variants of one pattern.
    pub fn variant_count(&self, shape: &str, pattern_index: usize) -> usize {
        let matcher = crate::Matcher::new(&self.inner);
        self.inner
            .shape(shape)
            .and_then(|s| s.patterns().get(pattern_index))
            .map(|p| matcher.variants(p).len())
            .unwrap_or(0)
    }

    /// Run shape selection; `trigger` is "placement" or "update".
    /// Returns the selection as a JSON string.
    pub fn select_shape(
        &self,
        shape: &str,
        neighbors_json: &str,
        trigger: &str,
    ) -> Result<String, JsError> {
        let trigger = match trigger {
            "placement" => crate::Trigger::Placement,
            "update" => crate::Trigger::Update,
            other => return Err(JsError::new(&format!("Unknown trigger '{}'", other))),
        };
        run_selection(&self.inner, shape, neighbors_json, trigger)
    }

    /// Validation warnings as display strings.
    pub fn warnings(&self) -> js_sys::Array {
        crate::validate(&self.inner)
            .iter()
            .map(|w| JsValue::from_str(&w.to_string()))
            .collect()
    }
}

/// Run shape selection and return the selection as a JSON string.
///
/// Neighbors JSON format:
/// ```json
/// {
///   "Neighbors": [
///     { "Position": { "X": 1, "Y": 0, "Z": 0 }, "BlockType": "Fence_Wood" }
///   ]
/// }
/// ```
#[wasm_bindgen]
pub fn select_shape_json(
    template: &TemplateHandle,
    shape: &str,
    neighbors_json: &str,
    on_update: bool,
) -> Result<String, JsError> {
    let trigger = if on_update {
        crate::Trigger::Update
    } else {
        crate::Trigger::Placement
    };
    run_selection(&template.inner, shape, neighbors_json, trigger)
}

fn run_selection(
    template: &crate::Template,
    shape: &str,
    neighbors_json: &str,
    trigger: crate::Trigger,
) -> Result<String, JsError> {
    let neighbors = crate::Neighborhood::from_json(neighbors_json)
        .map_err(|e| JsError::new(&format!("Invalid JSON: {}", e)))?;
    let ctx = crate::EvaluationContext::new(trigger, &neighbors);

    let selection = crate::select_shape(template, shape, &ctx);
    serde_json::to_string(&selection).map_err(|e| JsError::new(&e.to_string()))
}
