//! Product name lookup.
//!
//! Maps product names to their arena IDs so dependency declarations, which refer to
//! products by name, can be turned into edges.

use rustc_hash::FxHashMap;

/// Interned product ID (u32 for compact storage and fast hashing).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductId(pub u32);

impl ProductId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Name to ID table. Names are unique across a top-level project.
#[derive(Debug, Clone, Default)]
pub struct ProductNameInterner {
    to_id: FxHashMap<String, ProductId>,
}

impl ProductNameInterner {
    /// Register `name` for `id`. Returns false if the name is already taken.
    pub fn insert(&mut self, name: &str, id: ProductId) -> bool {
        if self.to_id.contains_key(name) {
            return false;
        }
        self.to_id.insert(name.to_string(), id);
        true
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<ProductId> {
        self.to_id.get(name).copied()
    }
}
