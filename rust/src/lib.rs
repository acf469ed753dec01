//! Product dependency resolution scheduler.
//!
//! Resolves every product of a build description exactly once, even though the
//! dependency graph between products is only discovered while resolving them.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::prelude::*;

mod config;
pub mod error;
pub mod interner;
pub mod item;
pub mod logging;
mod models;
pub mod ordering;
pub mod resolver;
pub mod scheduler;
pub mod search_paths;
pub mod state;
pub mod timing;

pub use config::ResolverConfig;
pub use error::ResolveError;
pub use interner::ProductId;
pub use item::{Item, ItemType, Value};
pub use models::{build_loader_state, DependsSpec, ProductSpec, ProjectSpec, ResolveResult};
pub use resolver::{DeclaredDependencyResolver, Deferral, ProductResolver};
pub use scheduler::{resolve_products, ProductsScheduler, ResolveSummary};
pub use state::{LoaderState, Product, Project, TopLevelProject, SHADOW_PRODUCT_PREFIX};

fn to_py_err(err: ResolveError) -> PyErr {
    if err.is_canceled() {
        pyo3::exceptions::PyInterruptedError::new_err(err.to_string())
    } else {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}

/// Resolve all products of the given projects.
///
/// Dependencies are resolved from the declarations in each `ProductSpec`. Products
/// whose dependencies are not resolved yet are retried later, as long as the
/// scheduler keeps making progress.
///
/// # Arguments
/// * `projects` - Sub-projects of the build, in declaration order
/// * `config` - Scheduler configuration (defaults if omitted)
///
/// # Returns
/// * ResolveResult with the finished products in completion order
///
/// # Raises
/// * ValueError on unknown or cyclic dependencies and duplicate product names
#[pyfunction]
#[pyo3(name = "resolve_products", signature = (projects, config=None))]
fn py_resolve_products(
    projects: Vec<ProjectSpec>,
    config: Option<ResolverConfig>,
) -> PyResult<ResolveResult> {
    let config = config.unwrap_or_default();
    let mut state = build_loader_state(&projects).map_err(to_py_err)?;
    let mut resolver = DeclaredDependencyResolver::new(config.verbosity);

    let summary = resolve_products(&mut state, &mut resolver, config).map_err(to_py_err)?;
    Ok(ResolveResult::from_summary(&summary, &state))
}

/// Order in which products are first attempted: ascending by number of dependency
/// declarations (declaration order among equals) unless `config` disables sorting,
/// with each shadow product right after its owner.
///
/// # Raises
/// * ValueError on duplicate product names
#[pyfunction]
#[pyo3(name = "seed_order", signature = (projects, config=None))]
fn py_seed_order(
    projects: Vec<ProjectSpec>,
    config: Option<ResolverConfig>,
) -> PyResult<Vec<String>> {
    let config = config.unwrap_or_default();
    let state = build_loader_state(&projects).map_err(to_py_err)?;
    let top_level = &state.top_level_project;
    Ok(ordering::seed_order(top_level, config.order_by_dependency_count)
        .into_iter()
        .map(|id| top_level.product(id).name().to_string())
        .collect())
}

/// The products_resolver Python module.
#[pymodule]
fn products_resolver(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Declarative inputs and results
    m.add_class::<DependsSpec>()?;
    m.add_class::<ProductSpec>()?;
    m.add_class::<ProjectSpec>()?;
    m.add_class::<ResolveResult>()?;

    // Config types
    m.add_class::<ResolverConfig>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(py_resolve_products, m)?)?;
    m.add_function(wrap_pyfunction!(py_seed_order, m)?)?;

    Ok(())
}
