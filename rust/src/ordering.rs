//! Seed ordering of products for the scheduler's work queue.
//!
//! Products with few dependency declarations go first, so that products with many
//! dependencies are more likely to find them already resolved when their turn comes.
//! The ordering is stable: products with equal counts keep project/declaration order.

use crate::interner::ProductId;
use crate::state::TopLevelProject;

/// All non-shadow products in project/declaration order.
pub fn declaration_order(top_level: &TopLevelProject) -> Vec<ProductId> {
    top_level
        .projects()
        .iter()
        .flat_map(|project| project.products().iter().copied())
        .collect()
}

/// Insert `product` after every entry whose count is less than or equal to its own.
pub fn insert_by_dependency_count(
    sorted: &mut Vec<ProductId>,
    product: ProductId,
    top_level: &TopLevelProject,
) {
    let count = top_level.product(product).depends_item_count();
    let pos = sorted.partition_point(|&p| top_level.product(p).depends_item_count() <= count);
    sorted.insert(pos, product);
}

/// All non-shadow products, ascending by dependency count.
pub fn order_by_dependency_count(top_level: &TopLevelProject) -> Vec<ProductId> {
    let mut sorted = Vec::with_capacity(top_level.product_count());
    for product in declaration_order(top_level) {
        insert_by_dependency_count(&mut sorted, product, top_level);
    }
    sorted
}

/// Initial queue contents: non-shadow products, optionally ascending by dependency count,
/// each shadow product right after its owner.
pub fn seed_order(top_level: &TopLevelProject, by_dependency_count: bool) -> Vec<ProductId> {
    let sorted = if by_dependency_count {
        order_by_dependency_count(top_level)
    } else {
        declaration_order(top_level)
    };

    let mut seeded = Vec::with_capacity(top_level.product_count());
    for product in sorted {
        seeded.push(product);
        seeded.extend(top_level.product(product).shadow_product());
    }
    seeded
}
