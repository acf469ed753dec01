//! Products scheduler: a work queue driven fixed-point over an incrementally
//! discovered dependency graph.

mod core;
mod queue;

pub use core::{resolve_products, ProductsScheduler, ResolveSummary};
pub use queue::{QueueEntry, WorkQueue};
