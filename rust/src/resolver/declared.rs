//! Resolver for dependencies declared directly in the item tree.

use std::path::PathBuf;
use std::time::Instant;

use crate::error::ResolveError;
use crate::interner::ProductId;
use crate::item::ItemType;
use crate::state::{ExportedInterface, LoaderState, TopLevelProject};
use crate::timing::from_elapsed;
use crate::{log_decisions, log_trace};

use super::{Deferral, ProductResolver};

/// Resolves `Depends` items against the products of the top-level project.
///
/// Supported declarations:
/// - `Depends { name: "lib" }`: a product by name (`required: false` tolerates absence)
/// - `Depends { productTypes: ["application"] }`: every other product of a matching type
/// - `condition: false` disables a declaration
///
/// A product's `moduleSearchPaths` are pushed onto the search-path stack while its
/// dependencies are resolved.
#[derive(Debug, Default)]
pub struct DeclaredDependencyResolver {
    verbosity: u8,
}

/// Outcome of looking at a product's declarations once.
struct CollectedDependencies {
    named: Vec<ProductId>,
    bulk_matches: Vec<ProductId>,
    bulk_pending: bool,
}

impl DeclaredDependencyResolver {
    pub fn new(verbosity: u8) -> Self {
        Self { verbosity }
    }

    fn collect_dependencies(
        top_level: &TopLevelProject,
        product: ProductId,
        deferral: Deferral,
    ) -> Result<CollectedDependencies, ResolveError> {
        let p = top_level.product(product);
        let mut collected = CollectedDependencies {
            named: Vec::new(),
            bulk_matches: Vec::new(),
            bulk_pending: false,
        };

        for depends in p.item().children_of_type(ItemType::Depends) {
            if !depends.bool_property("condition", true) {
                continue;
            }

            if let Some(name) = depends.string_property("name") {
                match top_level.product_id(name) {
                    Some(id) if id == product => {
                        return Err(ResolveError::DependencyCycle {
                            product: p.name().to_string(),
                            dependency: name.to_string(),
                        });
                    }
                    Some(id) => collected.named.push(id),
                    None if !depends.bool_property("required", true) => {}
                    None => {
                        return Err(ResolveError::DependencyNotFound {
                            product: p.name().to_string(),
                            dependency: name.to_string(),
                        });
                    }
                }
            }

            let product_types = depends.list_property("productTypes");
            if product_types.is_empty() {
                continue;
            }
            for other in top_level.products() {
                if other.id() == product || other.is_shadow() {
                    continue;
                }
                let matches = other
                    .item()
                    .list_property("type")
                    .iter()
                    .any(|t| product_types.contains(t));
                if !matches {
                    continue;
                }
                if !top_level.is_product_to_handle(other.id()) {
                    collected.bulk_matches.push(other.id());
                } else if deferral == Deferral::Allowed {
                    collected.bulk_pending = true;
                }
                // Without deferral, a bulk dependency binds to what is finished by now.
            }
        }

        Ok(collected)
    }

    fn resolve_dependencies(
        &self,
        top_level: &mut TopLevelProject,
        product: ProductId,
        deferral: Deferral,
    ) -> Result<(), ResolveError> {
        let collected = Self::collect_dependencies(top_level, product, deferral)?;

        let blocking = collected
            .named
            .iter()
            .copied()
            .find(|&dep| top_level.is_product_to_handle(dep));

        let p = top_level.product_mut(product);
        for &dep in collected.named.iter().chain(&collected.bulk_matches) {
            p.add_known_dependency(dep);
        }

        let pending = match (blocking, deferral) {
            (Some(dep), Deferral::NotAllowed) => {
                let product_name = top_level.product(product).name().to_string();
                return Err(ResolveError::DependencyCycle {
                    product: product_name,
                    dependency: top_level.product(dep).name().to_string(),
                });
            }
            (Some(dep), Deferral::Allowed) => {
                log_decisions!(
                    self.verbosity,
                    "    {} waits for {}",
                    top_level.product(product).name(),
                    top_level.product(dep).name()
                );
                true
            }
            (None, _) => collected.bulk_pending,
        };

        top_level
            .product_mut(product)
            .set_dependencies_resolving_pending(pending);
        Ok(())
    }
}

impl ProductResolver for DeclaredDependencyResolver {
    fn resolve_product(
        &mut self,
        product: ProductId,
        deferral: Deferral,
        state: &mut LoaderState,
    ) -> Result<(), ResolveError> {
        let started = Instant::now();

        let module_paths: Vec<PathBuf> = state
            .top_level_project
            .product(product)
            .item()
            .list_property("moduleSearchPaths")
            .into_iter()
            .map(PathBuf::from)
            .collect();
        let pushed = !module_paths.is_empty();
        if pushed {
            log_trace!(self.verbosity, "    pushing search paths {:?}", module_paths);
            state.search_paths.push(module_paths);
        }

        let result = self.resolve_dependencies(&mut state.top_level_project, product, deferral);

        if pushed {
            state.search_paths.pop();
        }

        state
            .top_level_project
            .product_mut(product)
            .timing_data
            .dependencies_resolving += from_elapsed(started.elapsed());
        result
    }

    fn setup_exports(
        &mut self,
        product: ProductId,
        state: &mut LoaderState,
    ) -> Result<(), ResolveError> {
        let started = Instant::now();
        let top_level = &mut state.top_level_project;
        let p = top_level.product(product);

        // Exports may only be wired once the shadow product has settled as well.
        if let Some(shadow) = p.shadow_product() {
            if top_level.is_product_to_handle(shadow) {
                return Err(ResolveError::ShadowProductNotResolved(p.name().to_string()));
            }
        }

        let mut interface = ExportedInterface::default();
        for export in p.item().children_of_type(ItemType::Export) {
            for depends in export.children_of_type(ItemType::Depends) {
                let Some(name) = depends.string_property("name") else {
                    continue;
                };
                let dep = top_level
                    .product_id(name)
                    .ok_or_else(|| ResolveError::ExportNotFound {
                        product: p.name().to_string(),
                        dependency: name.to_string(),
                    })?;
                if !interface.dependencies.contains(&dep) {
                    interface.dependencies.push(dep);
                }
            }
        }

        let p = top_level.product_mut(product);
        p.set_exports(interface);
        p.timing_data.export_setup += from_elapsed(started.elapsed());
        Ok(())
    }
}
