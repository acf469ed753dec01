//! Data model of a resolution pass.
//!
//! Products are stored in an arena owned by the [`TopLevelProject`] and referred to by
//! [`ProductId`](crate::interner::ProductId); projects and shadow links hold IDs only.

mod product;
mod project;
mod top_level;

pub use product::{ExportedInterface, Product, SHADOW_PRODUCT_PREFIX};
pub use project::{Project, ProjectId};
pub use top_level::{CancellationFlag, TopLevelProject};

use crate::search_paths::SearchPaths;

/// Everything a resolver needs while handling one product.
#[derive(Debug, Default)]
pub struct LoaderState {
    pub top_level_project: TopLevelProject,
    /// Currently active search paths, installed per product by the scheduler.
    pub search_paths: SearchPaths,
}

impl LoaderState {
    pub fn new(top_level_project: TopLevelProject) -> Self {
        Self {
            top_level_project,
            search_paths: SearchPaths::new(),
        }
    }
}
