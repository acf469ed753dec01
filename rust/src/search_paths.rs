//! Extra module search paths shared by all products of a resolution pass.
//!
//! Each project carries its own stack. Before a product is resolved the scheduler
//! installs the project's stack; module providers may push further entries while the
//! product's dependencies are resolved, and must pop them again before returning.

use std::path::PathBuf;

/// Stack of search-path groups, innermost last.
pub type SearchPathsStack = Vec<Vec<PathBuf>>;

/// The currently active search-path stack.
#[derive(Clone, Debug, Default)]
pub struct SearchPaths {
    stack: SearchPathsStack,
}

impl SearchPaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active stack (done once per resolution attempt).
    pub fn set_stack(&mut self, stack: SearchPathsStack) {
        self.stack = stack;
    }

    pub fn stack(&self) -> &SearchPathsStack {
        &self.stack
    }

    pub fn push(&mut self, paths: Vec<PathBuf>) {
        self.stack.push(paths);
    }

    pub fn pop(&mut self) -> Option<Vec<PathBuf>> {
        self.stack.pop()
    }
}
