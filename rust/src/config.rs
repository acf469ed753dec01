//! Configuration for a products resolution pass.

use pyo3::prelude::*;

/// Scheduler configuration.
#[pyclass]
#[derive(Clone, Debug)]
pub struct ResolverConfig {
    /// Log verbosity: 0 silent, 1 progress, 2 decisions, 3 trace
    #[pyo3(get, set)]
    pub verbosity: u8,
    /// Seed the work queue ascending by dependency count (stable); otherwise declaration order
    #[pyo3(get, set)]
    pub order_by_dependency_count: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            verbosity: crate::logging::VERBOSITY_SILENT,
            order_by_dependency_count: true,
        }
    }
}

#[pymethods]
impl ResolverConfig {
    #[new]
    #[pyo3(signature = (verbosity=None, order_by_dependency_count=None))]
    fn new(verbosity: Option<u8>, order_by_dependency_count: Option<bool>) -> Self {
        let defaults = Self::default();
        Self {
            verbosity: verbosity.unwrap_or(defaults.verbosity),
            order_by_dependency_count: order_by_dependency_count
                .unwrap_or(defaults.order_by_dependency_count),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "ResolverConfig(verbosity={}, order_by_dependency_count={})",
            self.verbosity, self.order_by_dependency_count
        )
    }
}
