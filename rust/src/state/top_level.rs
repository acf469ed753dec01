//! Top-level project: owns every project and product of one resolution pass.

use rustc_hash::FxHashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::ResolveError;
use crate::interner::{ProductId, ProductNameInterner};
use crate::item::{Item, ItemType};
use crate::search_paths::SearchPathsStack;
use crate::timing::TimingData;

use super::product::{Product, SHADOW_PRODUCT_PREFIX};
use super::project::{Project, ProjectId};

/// Cooperative cancellation request, shareable with whoever may want to cancel.
#[derive(Clone, Debug, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Root aggregate of a resolution pass.
///
/// Products live in an arena indexed by [`ProductId`]. The set of products still to
/// handle is global: a product enters it when the scheduler seeds the queue and leaves
/// it only once fully resolved.
#[derive(Debug, Default)]
pub struct TopLevelProject {
    projects: Vec<Project>,
    products: Vec<Product>,
    names: ProductNameInterner,
    products_to_handle: FxHashSet<ProductId>,
    canceled: CancellationFlag,
    deferral_count: u64,
    timing_data: TimingData,
}

impl TopLevelProject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_project(&mut self, name: &str, search_paths_stack: SearchPathsStack) -> ProjectId {
        let id = ProjectId(self.projects.len() as u32);
        self.projects
            .push(Project::new(id, name.to_string(), search_paths_stack));
        id
    }

    /// Add a product to `project`. Names must be unique across the top-level project.
    pub fn add_product(
        &mut self,
        project: ProjectId,
        name: &str,
        item: Item,
    ) -> Result<ProductId, ResolveError> {
        let id = self.insert_product(project, name, item)?;
        self.project_mut(project).push_product(id);
        Ok(id)
    }

    /// Create the shadow product of `owner`. It depends on its owner and is not listed
    /// among the project's products.
    pub fn add_shadow_product(&mut self, owner: ProductId) -> Result<ProductId, ResolveError> {
        let owner_product = self.product(owner);
        let project = owner_product.project();
        let name = format!("{}{}", SHADOW_PRODUCT_PREFIX, owner_product.name());
        let item = Item::new(ItemType::Product).with_child(Item::depends_on(owner_product.name()));
        let shadow = self.insert_product(project, &name, item)?;
        self.product_mut(shadow).set_shadow_of(owner);
        self.product_mut(owner).set_shadow_product(shadow);
        Ok(shadow)
    }

    fn insert_product(
        &mut self,
        project: ProjectId,
        name: &str,
        item: Item,
    ) -> Result<ProductId, ResolveError> {
        let id = ProductId(self.products.len() as u32);
        if !self.names.insert(name, id) {
            return Err(ResolveError::DuplicateProductName(name.to_string()));
        }
        self.products
            .push(Product::new(id, name.to_string(), project, item));
        Ok(id)
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, id: ProjectId) -> &Project {
        &self.projects[id.0 as usize]
    }

    fn project_mut(&mut self, id: ProjectId) -> &mut Project {
        &mut self.projects[id.0 as usize]
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    pub fn product(&self, id: ProductId) -> &Product {
        &self.products[id.index()]
    }

    pub fn product_mut(&mut self, id: ProductId) -> &mut Product {
        &mut self.products[id.index()]
    }

    pub fn product_id(&self, name: &str) -> Option<ProductId> {
        self.names.get(name)
    }

    pub fn product_by_name(&self, name: &str) -> Option<&Product> {
        self.names.get(name).map(|id| self.product(id))
    }

    pub fn add_product_to_handle(&mut self, product: ProductId) {
        self.products_to_handle.insert(product);
    }

    pub fn remove_product_to_handle(&mut self, product: ProductId) {
        self.products_to_handle.remove(&product);
    }

    pub fn is_product_to_handle(&self, product: ProductId) -> bool {
        self.products_to_handle.contains(&product)
    }

    pub fn products_to_handle(&self) -> &FxHashSet<ProductId> {
        &self.products_to_handle
    }

    /// Whether the product's known edges point at a product still to handle.
    pub fn has_dependency_to_unresolved_product(&self, product: ProductId) -> bool {
        self.product(product)
            .has_dependency_to_unresolved_product(&self.products_to_handle)
    }

    pub fn cancel(&self) {
        self.canceled.cancel();
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.is_canceled()
    }

    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.canceled.clone()
    }

    pub fn inc_product_deferrals(&mut self) {
        self.deferral_count += 1;
    }

    pub fn product_deferrals(&self) -> u64 {
        self.deferral_count
    }

    pub fn timing_data(&self) -> &TimingData {
        &self.timing_data
    }

    pub fn add_timing_data(&mut self, timing: TimingData) {
        self.timing_data += timing;
    }
}
