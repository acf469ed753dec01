//! Per-product resolution state.

use rustc_hash::FxHashSet;
use std::cell::OnceCell;

use crate::interner::ProductId;
use crate::item::Item;
use crate::timing::TimingData;

use super::project::ProjectId;

/// Name prefix of synthetic shadow products.
pub const SHADOW_PRODUCT_PREFIX: &str = "__shadow__";

/// A product's public interface, available once exports have been wired.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportedInterface {
    /// Products that dependents of this product implicitly depend on as well.
    pub dependencies: Vec<ProductId>,
}

/// One buildable unit and its mutable resolution status.
#[derive(Debug)]
pub struct Product {
    id: ProductId,
    name: String,
    project: ProjectId,
    item: Item,
    /// Cached count of direct `Depends` children; the item tree never changes.
    depends_item_count: OnceCell<usize>,
    shadow_product: Option<ProductId>,
    /// Back-reference from a shadow product to its owner.
    shadow_of: Option<ProductId>,
    /// Dependency edges discovered so far, in discovery order.
    known_dependencies: Vec<ProductId>,
    pending: bool,
    exports: Option<ExportedInterface>,
    pub timing_data: TimingData,
}

impl Product {
    pub(crate) fn new(id: ProductId, name: String, project: ProjectId, item: Item) -> Self {
        Self {
            id,
            name,
            project,
            item,
            depends_item_count: OnceCell::new(),
            shadow_product: None,
            shadow_of: None,
            known_dependencies: Vec::new(),
            pending: false,
            exports: None,
            timing_data: TimingData::default(),
        }
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn project(&self) -> ProjectId {
        self.project
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    /// Number of direct dependency declarations, computed on first use.
    pub fn depends_item_count(&self) -> usize {
        *self
            .depends_item_count
            .get_or_init(|| self.item.count_direct_dependency_declarations())
    }

    pub fn is_shadow(&self) -> bool {
        self.name.starts_with(SHADOW_PRODUCT_PREFIX)
    }

    pub fn shadow_product(&self) -> Option<ProductId> {
        self.shadow_product
    }

    pub fn shadow_of(&self) -> Option<ProductId> {
        self.shadow_of
    }

    pub(crate) fn set_shadow_product(&mut self, shadow: ProductId) {
        self.shadow_product = Some(shadow);
    }

    pub(crate) fn set_shadow_of(&mut self, owner: ProductId) {
        self.shadow_of = Some(owner);
    }

    pub fn known_dependencies(&self) -> &[ProductId] {
        &self.known_dependencies
    }

    /// Record a dependency edge. Edges are kept unique.
    pub fn add_known_dependency(&mut self, dependency: ProductId) {
        if !self.known_dependencies.contains(&dependency) {
            self.known_dependencies.push(dependency);
        }
    }

    /// True if one of the already known edges targets a product that still needs work.
    pub fn has_dependency_to_unresolved_product(&self, outstanding: &FxHashSet<ProductId>) -> bool {
        self.known_dependencies
            .iter()
            .any(|dep| outstanding.contains(dep))
    }

    /// True if the last resolution attempt ended without a final result.
    pub fn dependencies_resolving_pending(&self) -> bool {
        self.pending
    }

    pub fn set_dependencies_resolving_pending(&mut self, pending: bool) {
        self.pending = pending;
    }

    pub fn exports(&self) -> Option<&ExportedInterface> {
        self.exports.as_ref()
    }

    pub fn set_exports(&mut self, exports: ExportedInterface) {
        self.exports = Some(exports);
    }
}
