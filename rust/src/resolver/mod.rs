//! Per-product resolution, the collaborator the scheduler drives.

mod declared;

pub use declared::DeclaredDependencyResolver;

use crate::error::ResolveError;
use crate::interner::ProductId;
use crate::state::LoaderState;

/// Whether a resolution attempt may give up and ask to be retried later.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deferral {
    Allowed,
    NotAllowed,
}

/// Resolves the dependencies of single products and wires their exports.
///
/// `resolve_product` may push to and pop from `state.search_paths`, but must leave it
/// exactly as it found it. It reports "not ready yet" by setting the product's
/// pending flag; hard failures are returned as errors and abort the whole pass.
pub trait ProductResolver {
    fn resolve_product(
        &mut self,
        product: ProductId,
        deferral: Deferral,
        state: &mut LoaderState,
    ) -> Result<(), ResolveError>;

    /// Called once per finished non-shadow product, after all products are resolved.
    fn setup_exports(
        &mut self,
        product: ProductId,
        state: &mut LoaderState,
    ) -> Result<(), ResolveError>;
}
