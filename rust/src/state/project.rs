//! Sub-project state.

use crate::interner::ProductId;
use crate::search_paths::SearchPathsStack;

/// Index of a project within its top-level project.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProjectId(pub u32);

/// A sub-project: its products in declaration order and its search-path stack.
#[derive(Debug, Clone)]
pub struct Project {
    id: ProjectId,
    name: String,
    /// Owned products, excluding shadow products (those hang off their owner).
    products: Vec<ProductId>,
    pub search_paths_stack: SearchPathsStack,
}

impl Project {
    pub(crate) fn new(id: ProjectId, name: String, search_paths_stack: SearchPathsStack) -> Self {
        Self {
            id,
            name,
            products: Vec::new(),
            search_paths_stack,
        }
    }

    pub fn id(&self) -> ProjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn products(&self) -> &[ProductId] {
        &self.products
    }

    pub(crate) fn push_product(&mut self, product: ProductId) {
        self.products.push(product);
    }
}
