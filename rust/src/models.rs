//! Declarative inputs and results exchanged with Python.

use chrono::Duration;
use pyo3::prelude::*;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::ResolveError;
use crate::interner::ProductId;
use crate::item::{Item, ItemType, Value};
use crate::scheduler::ResolveSummary;
use crate::search_paths::SearchPathsStack;
use crate::state::{LoaderState, TopLevelProject};

// Note: We use std HashMap here for PyO3 interface compatibility

/// A `Depends` declaration: by product name, or in bulk by product type.
#[pyclass]
#[derive(Clone, Debug)]
pub struct DependsSpec {
    #[pyo3(get, set)]
    pub name: Option<String>,
    #[pyo3(get, set)]
    pub product_types: Vec<String>,
    #[pyo3(get, set)]
    pub required: bool,
    #[pyo3(get, set)]
    pub condition: bool,
}

#[pymethods]
impl DependsSpec {
    #[new]
    #[pyo3(signature = (name=None, product_types=None, required=true, condition=true))]
    fn new(
        name: Option<String>,
        product_types: Option<Vec<String>>,
        required: bool,
        condition: bool,
    ) -> Self {
        Self {
            name,
            product_types: product_types.unwrap_or_default(),
            required,
            condition,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "DependsSpec(name={:?}, product_types={:?}, required={}, condition={})",
            self.name, self.product_types, self.required, self.condition
        )
    }
}

impl DependsSpec {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            product_types: Vec::new(),
            required: true,
            condition: true,
        }
    }

    fn to_item(&self) -> Item {
        let mut item = Item::new(ItemType::Depends)
            .with_property("required", Value::Bool(self.required))
            .with_property("condition", Value::Bool(self.condition));
        if let Some(name) = &self.name {
            item = item.with_property("name", Value::String(name.clone()));
        }
        if !self.product_types.is_empty() {
            item = item.with_property("productTypes", Value::List(self.product_types.clone()));
        }
        item
    }
}

/// A product to resolve.
#[pyclass]
#[derive(Clone, Debug)]
pub struct ProductSpec {
    #[pyo3(get, set)]
    pub name: String,
    #[pyo3(get, set)]
    pub product_type: Vec<String>,
    #[pyo3(get, set)]
    pub depends: Vec<DependsSpec>,
    /// Product names re-exported to dependents
    #[pyo3(get, set)]
    pub exports: Vec<String>,
    #[pyo3(get, set)]
    pub module_search_paths: Vec<String>,
    /// Whether a shadow product is created for this product
    #[pyo3(get, set)]
    pub has_shadow: bool,
}

#[pymethods]
impl ProductSpec {
    #[new]
    #[pyo3(signature = (
        name,
        depends=None,
        product_type=None,
        exports=None,
        module_search_paths=None,
        has_shadow=false
    ))]
    fn new(
        name: String,
        depends: Option<Vec<DependsSpec>>,
        product_type: Option<Vec<String>>,
        exports: Option<Vec<String>>,
        module_search_paths: Option<Vec<String>>,
        has_shadow: bool,
    ) -> Self {
        Self {
            name,
            product_type: product_type.unwrap_or_default(),
            depends: depends.unwrap_or_default(),
            exports: exports.unwrap_or_default(),
            module_search_paths: module_search_paths.unwrap_or_default(),
            has_shadow,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "ProductSpec(name={:?}, type={:?}, deps={}, shadow={})",
            self.name,
            self.product_type,
            self.depends.len(),
            self.has_shadow
        )
    }
}

impl ProductSpec {
    /// Build the product's item tree.
    pub fn to_item(&self) -> Item {
        let mut item = Item::new(ItemType::Product);
        if !self.product_type.is_empty() {
            item = item.with_property("type", Value::List(self.product_type.clone()));
        }
        if !self.module_search_paths.is_empty() {
            item = item.with_property(
                "moduleSearchPaths",
                Value::List(self.module_search_paths.clone()),
            );
        }
        for depends in &self.depends {
            item = item.with_child(depends.to_item());
        }
        if !self.exports.is_empty() {
            let export = self
                .exports
                .iter()
                .fold(Item::new(ItemType::Export), |export, name| {
                    export.with_child(Item::depends_on(name))
                });
            item = item.with_child(export);
        }
        item
    }
}

/// A sub-project and its products.
#[pyclass]
#[derive(Clone, Debug)]
pub struct ProjectSpec {
    #[pyo3(get, set)]
    pub name: String,
    #[pyo3(get, set)]
    pub products: Vec<ProductSpec>,
    #[pyo3(get, set)]
    pub search_paths: Vec<String>,
}

#[pymethods]
impl ProjectSpec {
    #[new]
    #[pyo3(signature = (name, products, search_paths=None))]
    fn new(name: String, products: Vec<ProductSpec>, search_paths: Option<Vec<String>>) -> Self {
        Self {
            name,
            products,
            search_paths: search_paths.unwrap_or_default(),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "ProjectSpec(name={:?}, products={})",
            self.name,
            self.products.len()
        )
    }
}

/// Build the loader state for a set of projects.
pub fn build_loader_state(projects: &[ProjectSpec]) -> Result<LoaderState, ResolveError> {
    let mut top_level = TopLevelProject::new();
    for spec in projects {
        let stack: SearchPathsStack = if spec.search_paths.is_empty() {
            Vec::new()
        } else {
            vec![spec.search_paths.iter().map(PathBuf::from).collect()]
        };
        let project = top_level.add_project(&spec.name, stack);
        for product in &spec.products {
            let id = top_level.add_product(project, &product.name, product.to_item())?;
            if product.has_shadow {
                top_level.add_shadow_product(id)?;
            }
        }
    }
    Ok(LoaderState::new(top_level))
}

/// Result of resolving all products.
#[pyclass]
#[derive(Clone, Debug)]
pub struct ResolveResult {
    /// Finished products (shadow products excluded), in completion order
    #[pyo3(get)]
    pub finished_products: Vec<String>,
    #[pyo3(get)]
    pub deferrals: u64,
    #[pyo3(get)]
    pub attempts: usize,
    /// Product name -> exported dependency names
    #[pyo3(get)]
    pub exported_dependencies: HashMap<String, Vec<String>>,
    #[pyo3(get)]
    pub dependencies_resolving_time: Duration,
    /// Sum of all accumulated timing components
    #[pyo3(get)]
    pub total_time: Duration,
}

#[pymethods]
impl ResolveResult {
    fn __repr__(&self) -> String {
        format!(
            "ResolveResult(finished_products={}, deferrals={}, attempts={})",
            self.finished_products.len(),
            self.deferrals,
            self.attempts
        )
    }
}

impl ResolveResult {
    pub fn from_summary(summary: &ResolveSummary, state: &LoaderState) -> Self {
        let top_level = &state.top_level_project;
        let name = |id: ProductId| top_level.product(id).name().to_string();

        let exported_dependencies: HashMap<String, Vec<String>> = summary
            .finished_products
            .iter()
            .filter_map(|&id| {
                let exports = top_level.product(id).exports()?;
                Some((
                    name(id),
                    exports
                        .dependencies
                        .iter()
                        .map(|&dep| name(dep))
                        .collect::<Vec<_>>(),
                ))
            })
            .collect();

        Self {
            finished_products: summary.finished_products.iter().map(|&id| name(id)).collect(),
            deferrals: summary.deferrals,
            attempts: summary.attempts,
            exported_dependencies,
            dependencies_resolving_time: summary.timing.dependencies_resolving,
            total_time: summary.timing.total(),
        }
    }
}
