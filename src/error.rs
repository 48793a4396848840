//! Error types for template loading and flattening.

use thiserror::Error;

/// Result type alias using MatcherError.
pub type Result<T> = std::result::Result<T, MatcherError>;

/// Main error type for connected block template operations.
///
/// Matching itself is infallible; only loading and inheritance flattening
/// produce errors.
#[derive(Error, Debug)]
pub enum MatcherError {
    /// Failed to read or parse a ZIP archive.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Failed to parse JSON data.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Structurally invalid template document.
    #[error("Schema error: {0}")]
    Schema(String),

    /// A template lookup or `Parent` reference named no template.
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// A `Parent` chain revisits a template it already passed through.
    #[error("Template inheritance cycle: {0}")]
    InheritanceCycle(String),

    /// A `Parent` chain is longer than the resolver allows.
    #[error("Template inheritance too deep: {0}")]
    InheritanceTooDeep(String),

    /// A template pack (ZIP or directory) that holds no usable templates.
    #[error("Invalid template pack: {0}")]
    InvalidTemplatePack(String),
}

impl MatcherError {
    /// Classify a serde_json failure as either a schema problem or a syntax problem.
    ///
    /// Syntax and EOF errors stay `Json`; type mismatches and unknown enum
    /// strings become `Schema`.
    pub(crate) fn from_template_json(err: serde_json::Error) -> Self {
        match err.classify() {
            serde_json::error::Category::Data => MatcherError::Schema(err.to_string()),
            _ => MatcherError::Json(err),
        }
    }
}
