use std::path::PathBuf;

use thiserror::Error;

/// Errors of the filter form control and its host adapters
#[derive(Debug, Error)]
pub enum FilterFormError {
    #[error("Template file is not set")]
    TemplateNotSet,

    #[error("Failed to read template {}: {source}", path.display())]
    Template {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Form validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// A filter/reset listener failed, later listeners were not notified
    #[error("Listener failed: {0:#}")]
    Listener(anyhow::Error),

    #[error("Redirect failed: {0}")]
    Redirect(String),
}
