//! Errors surfaced by product resolution.

use thiserror::Error;

/// Errors that can occur while resolving the products of a top-level project.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Resolving products was canceled")]
    Canceled,
    #[error("Product dependency '{dependency}' not found in product '{product}'")]
    DependencyNotFound { product: String, dependency: String },
    #[error("Cyclic dependencies detected: product '{product}' cannot be resolved before '{dependency}'")]
    DependencyCycle { product: String, dependency: String },
    #[error("Duplicate product name: {0}")]
    DuplicateProductName(String),
    #[error("Exported dependency '{dependency}' of product '{product}' not found")]
    ExportNotFound { product: String, dependency: String },
    #[error("Shadow product of '{0}' has not been resolved")]
    ShadowProductNotResolved(String),
}

impl ResolveError {
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }
}
