//! Core products scheduler implementation.

use crate::config::ResolverConfig;
use crate::error::ResolveError;
use crate::interner::ProductId;
use crate::ordering::seed_order;
use crate::resolver::{Deferral, ProductResolver};
use crate::state::{LoaderState, TopLevelProject};
use crate::timing::TimingData;
use crate::{log_decisions, log_progress, log_trace};

use super::queue::WorkQueue;

/// Outcome of a successful resolution pass.
#[derive(Clone, Debug, Default)]
pub struct ResolveSummary {
    /// Finished non-shadow products, in completion order.
    pub finished_products: Vec<ProductId>,
    /// Number of times the resolver was invoked.
    pub attempts: usize,
    /// Number of queue entries processed, including short-circuited ones.
    pub queue_pops: usize,
    /// Number of times a product was deferred after an attempt.
    pub deferrals: u64,
    /// Timing summed over all finished products, shadow products included.
    pub timing: TimingData,
}

/// Resolves all products of a top-level project whose dependency graph is only
/// discovered while resolving.
///
/// Products are attempted in queue order. A product that is not ready is re-queued,
/// but only as long as the queue keeps shrinking between two attempts at the same
/// product. Once it stops shrinking the resolver must come to a final decision, which
/// guarantees termination.
pub struct ProductsScheduler {
    config: ResolverConfig,
    queue: WorkQueue,
    finished_products: Vec<ProductId>,
    attempts: usize,
    queue_pops: usize,
}

impl ProductsScheduler {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            queue: WorkQueue::new(),
            finished_products: Vec::new(),
            attempts: 0,
            queue_pops: 0,
        }
    }

    /// Products finished so far. Still meaningful after a failed or canceled pass.
    pub fn finished_products(&self) -> &[ProductId] {
        &self.finished_products
    }

    /// Run a full pass: seed the queue, run it to completion, then wire exports.
    pub fn resolve<R: ProductResolver + ?Sized>(
        &mut self,
        state: &mut LoaderState,
        resolver: &mut R,
    ) -> Result<ResolveSummary, ResolveError> {
        self.initialize(&mut state.top_level_project);
        self.run_scheduler(state, resolver)?;
        self.post_process(state, resolver)?;

        let top_level = &state.top_level_project;
        Ok(ResolveSummary {
            finished_products: self.finished_products.clone(),
            attempts: self.attempts,
            queue_pops: self.queue_pops,
            deferrals: top_level.product_deferrals(),
            timing: *top_level.timing_data(),
        })
    }

    /// Seed the queue: every product marked as still to handle, ascending by dependency
    /// count, each shadow product right after its owner.
    fn initialize(&mut self, top_level: &mut TopLevelProject) {
        for product in seed_order(top_level, self.config.order_by_dependency_count) {
            top_level.add_product_to_handle(product);
            self.queue.push_first_attempt(product);
        }

        log_trace!(
            self.config.verbosity,
            "Initial queue: {:?}",
            self.queue
                .iter()
                .map(|e| top_level.product(e.product).name())
                .collect::<Vec<_>>()
        );
    }

    fn run_scheduler<R: ProductResolver + ?Sized>(
        &mut self,
        state: &mut LoaderState,
        resolver: &mut R,
    ) -> Result<(), ResolveError> {
        let verbosity = self.config.verbosity;

        while let Some(entry) = self.queue.pop() {
            self.queue_pops += 1;
            let product = entry.product;
            let deferral = entry.deferral(self.queue.len());

            log_decisions!(
                verbosity,
                "  Considering {} (queued at {:?}, now {}, deferral {:?})",
                state.top_level_project.product(product).name(),
                entry.queue_size_on_insert,
                self.queue.len(),
                deferral
            );

            // Known to be waiting on an unresolved product: don't bother the resolver.
            if deferral == Deferral::Allowed
                && state
                    .top_level_project
                    .has_dependency_to_unresolved_product(product)
            {
                log_decisions!(
                    verbosity,
                    "    Skipping {}: dependency still unresolved",
                    state.top_level_project.product(product).name()
                );
                self.queue.requeue(product);
                continue;
            }

            let project = state.top_level_project.product(product).project();
            let stack = state.top_level_project.project(project).search_paths_stack.clone();
            state.search_paths.set_stack(stack);

            self.attempts += 1;
            resolver.resolve_product(product, deferral, state)?;
            if state.top_level_project.is_canceled() {
                return Err(ResolveError::Canceled);
            }

            // Module providers may have pushed search paths; all must be gone again.
            let top_level = &state.top_level_project;
            assert_eq!(
                state.search_paths.stack(),
                &top_level.project(project).search_paths_stack,
                "search paths stack not restored after resolving product '{}'",
                top_level.product(product).name()
            );
            log_trace!(verbosity, "    Search paths stack restored");

            let top_level = &mut state.top_level_project;
            if top_level.product(product).dependencies_resolving_pending() {
                self.queue.requeue(product);
                top_level.inc_product_deferrals();
                log_progress!(
                    verbosity,
                    "  Deferred {} ({} in queue)",
                    top_level.product(product).name(),
                    self.queue.len()
                );
            } else {
                top_level.remove_product_to_handle(product);
                let p = top_level.product(product);
                if !p.is_shadow() {
                    self.finished_products.push(product);
                }
                let timing = p.timing_data;
                log_progress!(verbosity, "  Finished {}", p.name());
                top_level.add_timing_data(timing);
            }
        }

        Ok(())
    }

    /// Wire exports. Deferred to the end because a product and its shadow product
    /// resolve in no particular relative order.
    fn post_process<R: ProductResolver + ?Sized>(
        &mut self,
        state: &mut LoaderState,
        resolver: &mut R,
    ) -> Result<(), ResolveError> {
        for &product in &self.finished_products {
            resolver.setup_exports(product, state)?;
        }
        Ok(())
    }
}

/// Resolve every product of `state`'s top-level project.
pub fn resolve_products<R: ProductResolver + ?Sized>(
    state: &mut LoaderState,
    resolver: &mut R,
    config: ResolverConfig,
) -> Result<ResolveSummary, ResolveError> {
    ProductsScheduler::new(config).resolve(state, resolver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Item, ItemType, Value};
    use crate::resolver::DeclaredDependencyResolver;
    use crate::search_paths::SearchPathsStack;
    use crate::state::ProjectId;
    use std::path::PathBuf;

    fn product(deps: &[&str]) -> Item {
        deps.iter().fold(Item::new(ItemType::Product), |item, dep| {
            item.with_child(Item::depends_on(dep))
        })
    }

    fn single_project(products: &[(&str, Item)]) -> (LoaderState, Vec<ProductId>) {
        let mut top = TopLevelProject::new();
        let project = top.add_project("root", vec![vec![PathBuf::from("/root/modules")]]);
        let ids = products
            .iter()
            .map(|(name, item)| top.add_product(project, name, item.clone()).unwrap())
            .collect();
        (LoaderState::new(top), ids)
    }

    fn names(state: &LoaderState, ids: &[ProductId]) -> Vec<String> {
        ids.iter()
            .map(|&id| state.top_level_project.product(id).name().to_string())
            .collect()
    }

    /// Wraps the declared resolver and records every call.
    #[derive(Default)]
    struct RecordingResolver {
        inner: DeclaredDependencyResolver,
        attempts: Vec<(String, Deferral, bool)>,
        exports: Vec<String>,
    }

    impl ProductResolver for RecordingResolver {
        fn resolve_product(
            &mut self,
            product: ProductId,
            deferral: Deferral,
            state: &mut LoaderState,
        ) -> Result<(), ResolveError> {
            self.inner.resolve_product(product, deferral, state)?;
            let p = state.top_level_project.product(product);
            self.attempts.push((
                p.name().to_string(),
                deferral,
                p.dependencies_resolving_pending(),
            ));
            Ok(())
        }

        fn setup_exports(
            &mut self,
            product: ProductId,
            state: &mut LoaderState,
        ) -> Result<(), ResolveError> {
            self.exports
                .push(state.top_level_project.product(product).name().to_string());
            self.inner.setup_exports(product, state)
        }
    }

    /// Test double with scripted misbehaviour.
    #[derive(Default)]
    struct ScriptedResolver {
        cancel_on: Option<String>,
        leave_stack_dirty_on: Option<String>,
        resolved: Vec<String>,
        exports_wired: usize,
    }

    impl ProductResolver for ScriptedResolver {
        fn resolve_product(
            &mut self,
            product: ProductId,
            _deferral: Deferral,
            state: &mut LoaderState,
        ) -> Result<(), ResolveError> {
            let name = state.top_level_project.product(product).name().to_string();

            state
                .search_paths
                .push(vec![PathBuf::from("/provider/generated")]);
            if self.leave_stack_dirty_on.as_deref() != Some(name.as_str()) {
                state.search_paths.pop();
            }
            if self.cancel_on.as_deref() == Some(name.as_str()) {
                state.top_level_project.cancel();
            }

            self.resolved.push(name);
            Ok(())
        }

        fn setup_exports(
            &mut self,
            _product: ProductId,
            _state: &mut LoaderState,
        ) -> Result<(), ResolveError> {
            self.exports_wired += 1;
            Ok(())
        }
    }

    #[test]
    fn test_initial_queue_order_with_shadow() {
        let (mut state, ids) = single_project(&[
            ("c", product(&["a", "b"])),
            ("b", product(&["a"])),
            ("a", product(&[])),
        ]);
        let c_shadow = state.top_level_project.add_shadow_product(ids[0]).unwrap();

        let mut scheduler = ProductsScheduler::new(ResolverConfig::default());
        scheduler.initialize(&mut state.top_level_project);

        let queued: Vec<ProductId> = scheduler.queue.iter().map(|e| e.product).collect();
        assert_eq!(
            names(&state, &queued),
            vec!["a", "b", "c", "__shadow__c"]
        );
        assert!(scheduler
            .queue
            .iter()
            .all(|e| e.queue_size_on_insert.is_none()));
        assert!(state.top_level_project.is_product_to_handle(c_shadow));
        assert_eq!(state.top_level_project.products_to_handle().len(), 4);
    }

    #[test]
    fn test_declaration_order_when_not_sorting() {
        let (mut state, _) = single_project(&[
            ("c", product(&["a", "b"])),
            ("b", product(&["a"])),
            ("a", product(&[])),
        ]);
        let config = ResolverConfig {
            order_by_dependency_count: false,
            ..Default::default()
        };
        let mut scheduler = ProductsScheduler::new(config);
        scheduler.initialize(&mut state.top_level_project);

        let queued: Vec<ProductId> = scheduler.queue.iter().map(|e| e.product).collect();
        assert_eq!(names(&state, &queued), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_simple_chain() {
        let (mut state, ids) = single_project(&[
            ("A", product(&[])),
            ("B", product(&["A"])),
            ("C", product(&["B"])),
        ]);
        let mut resolver = RecordingResolver::default();

        let summary = resolve_products(&mut state, &mut resolver, ResolverConfig::default())
            .unwrap();

        assert_eq!(summary.finished_products, ids);
        assert_eq!(summary.attempts, 3);
        assert_eq!(summary.deferrals, 0);
        assert_eq!(resolver.exports, vec!["A", "B", "C"]);
        assert!(state.top_level_project.products_to_handle().is_empty());
    }

    #[test]
    fn test_chain_declared_in_reverse_defers() {
        let (mut state, ids) = single_project(&[
            ("C", product(&["B"])),
            ("B", product(&["A"])),
            ("A", product(&[])),
        ]);
        let mut resolver = RecordingResolver::default();

        let summary = resolve_products(&mut state, &mut resolver, ResolverConfig::default())
            .unwrap();

        // A first (no deps), then C waits for B, B finishes, C finishes.
        assert_eq!(names(&state, &summary.finished_products), vec!["A", "B", "C"]);
        assert_eq!(
            resolver.attempts,
            vec![
                ("A".to_string(), Deferral::Allowed, false),
                ("C".to_string(), Deferral::Allowed, true),
                ("B".to_string(), Deferral::Allowed, false),
                ("C".to_string(), Deferral::Allowed, false),
            ]
        );
        assert_eq!(summary.deferrals, 1);
        let c = state.top_level_project.product(ids[0]);
        assert_eq!(c.known_dependencies(), &[ids[1]]);
    }

    #[test]
    fn test_long_reverse_chain_attempts_are_bounded() {
        let (mut state, _) = single_project(&[
            ("p1", product(&["p2"])),
            ("p2", product(&["p3"])),
            ("p3", product(&["p4"])),
            ("p4", product(&["p5"])),
            ("p5", product(&["p6"])),
            ("p6", product(&[])),
        ]);
        let mut resolver = DeclaredDependencyResolver::default();

        let summary = resolve_products(&mut state, &mut resolver, ResolverConfig::default())
            .unwrap();

        assert_eq!(
            names(&state, &summary.finished_products),
            vec!["p6", "p5", "p4", "p3", "p2", "p1"]
        );
        assert!(summary.attempts <= 2 * 6);
        // Short-circuited entries account for the remaining pops.
        assert!(summary.queue_pops > summary.attempts);
    }

    #[test]
    fn test_dependency_cycle_is_an_error() {
        let (mut state, _) = single_project(&[("X", product(&["Y"])), ("Y", product(&["X"]))]);
        let mut resolver = RecordingResolver::default();

        let err = resolve_products(&mut state, &mut resolver, ResolverConfig::default())
            .unwrap_err();

        assert_eq!(
            err,
            ResolveError::DependencyCycle {
                product: "X".to_string(),
                dependency: "Y".to_string(),
            }
        );
        assert_eq!(
            resolver.attempts,
            vec![
                ("X".to_string(), Deferral::Allowed, true),
                ("Y".to_string(), Deferral::Allowed, true),
            ]
        );
        assert_eq!(state.top_level_project.product_deferrals(), 2);
        assert!(resolver.exports.is_empty());
    }

    #[test]
    fn test_missing_dependency_propagates() {
        let (mut state, _) = single_project(&[("lib", product(&[])), ("app", product(&["nope"]))]);
        let mut resolver = RecordingResolver::default();

        let mut scheduler = ProductsScheduler::new(ResolverConfig::default());
        let err = scheduler.resolve(&mut state, &mut resolver).unwrap_err();

        assert!(matches!(err, ResolveError::DependencyNotFound { .. }));
        assert_eq!(names(&state, scheduler.finished_products()), vec!["lib"]);
        assert!(resolver.exports.is_empty());
    }

    #[test]
    fn test_shadow_products_resolve_but_are_not_finished() {
        let (mut state, ids) = single_project(&[
            ("lib", product(&[])),
            (
                "app",
                product(&["lib"])
                    .with_child(Item::new(ItemType::Export).with_child(Item::depends_on("lib"))),
            ),
        ]);
        let app_shadow = state.top_level_project.add_shadow_product(ids[1]).unwrap();
        let lib_shadow = state.top_level_project.add_shadow_product(ids[0]).unwrap();
        let mut resolver = RecordingResolver::default();

        let summary = resolve_products(&mut state, &mut resolver, ResolverConfig::default())
            .unwrap();

        assert_eq!(summary.finished_products, ids);
        assert_eq!(resolver.exports, vec!["lib", "app"]);
        let top = &state.top_level_project;
        assert!(!top.is_product_to_handle(app_shadow));
        assert!(!top.is_product_to_handle(lib_shadow));
        assert_eq!(
            top.product(ids[1]).exports().unwrap().dependencies,
            vec![ids[0]]
        );
        let attempted: Vec<&str> = resolver.attempts.iter().map(|a| a.0.as_str()).collect();
        assert_eq!(attempted, vec!["lib", "__shadow__lib", "app", "__shadow__app"]);
    }

    #[test]
    fn test_mutual_bulk_dependencies_terminate() {
        let typed = |own: &str, wanted: &str| {
            Item::new(ItemType::Product)
                .with_property("type", Value::List(vec![own.to_string()]))
                .with_child(Item::depends_on_types(&[wanted.to_string()]))
        };
        let (mut state, ids) = single_project(&[("a", typed("x", "y")), ("b", typed("y", "x"))]);
        let mut resolver = RecordingResolver::default();

        let summary = resolve_products(&mut state, &mut resolver, ResolverConfig::default())
            .unwrap();

        // Neither can wait for the other forever: "a" is forced to settle first.
        assert_eq!(summary.finished_products, ids);
        assert_eq!(resolver.attempts[2], ("a".to_string(), Deferral::NotAllowed, false));
        let top = &state.top_level_project;
        assert!(top.product(ids[0]).known_dependencies().is_empty());
        assert_eq!(top.product(ids[1]).known_dependencies(), &[ids[0]]);
    }

    #[test]
    fn test_products_across_projects_use_their_search_paths() {
        let mut top = TopLevelProject::new();
        let first: SearchPathsStack = vec![vec![PathBuf::from("/first")]];
        let second: SearchPathsStack = vec![vec![PathBuf::from("/second")], vec![]];
        let p1 = top.add_project("first", first);
        let p2 = top.add_project("second", second);
        top.add_product(p1, "lib", product(&[])).unwrap();
        top.add_product(p2, "app", product(&["lib"])).unwrap();
        let mut state = LoaderState::new(top);
        let mut resolver = ScriptedResolver::default();

        let summary = resolve_products(&mut state, &mut resolver, ResolverConfig::default())
            .unwrap();

        assert_eq!(summary.finished_products.len(), 2);
        assert_eq!(resolver.exports_wired, 2);
        assert_eq!(
            state.search_paths.stack(),
            &state.top_level_project.project(ProjectId(1)).search_paths_stack
        );
    }

    #[test]
    #[should_panic(expected = "search paths stack not restored")]
    fn test_dirty_search_paths_stack_is_fatal() {
        let (mut state, _) = single_project(&[("lib", product(&[])), ("app", product(&[]))]);
        let mut resolver = ScriptedResolver {
            leave_stack_dirty_on: Some("app".to_string()),
            ..Default::default()
        };

        let _ = resolve_products(&mut state, &mut resolver, ResolverConfig::default());
    }

    #[test]
    fn test_cancellation_unwinds_without_exports() {
        let (mut state, _) = single_project(&[
            ("a", product(&[])),
            ("b", product(&[])),
            ("c", product(&[])),
        ]);
        let mut resolver = ScriptedResolver {
            cancel_on: Some("b".to_string()),
            ..Default::default()
        };

        let mut scheduler = ProductsScheduler::new(ResolverConfig::default());
        let err = scheduler.resolve(&mut state, &mut resolver).unwrap_err();

        assert!(err.is_canceled());
        assert_eq!(resolver.resolved, vec!["a", "b"]);
        assert_eq!(names(&state, scheduler.finished_products()), vec!["a"]);
        assert_eq!(resolver.exports_wired, 0);
        // "b" was attempted but never finalized.
        let b = state.top_level_project.product_id("b").unwrap();
        assert!(state.top_level_project.is_product_to_handle(b));
    }

    #[test]
    fn test_timing_is_accumulated() {
        let (mut state, _) = single_project(&[("lib", product(&[])), ("app", product(&["lib"]))]);
        let mut resolver = DeclaredDependencyResolver::default();

        let summary = resolve_products(&mut state, &mut resolver, ResolverConfig::default())
            .unwrap();

        let per_product = state
            .top_level_project
            .products()
            .map(|p| p.timing_data.dependencies_resolving)
            .fold(chrono::Duration::zero(), |acc, d| acc + d);
        assert_eq!(summary.timing.dependencies_resolving, per_product);
    }
}
