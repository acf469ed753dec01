//! Declarative item tree produced by the build-description parser.
//!
//! The scheduler only ever looks at the direct children of a product item to count
//! its `Depends` declarations. The reference resolver additionally reads a handful of
//! well-known properties (`name`, `productTypes`, `condition`, `required`, ...).

use rustc_hash::FxHashMap;

/// Kind of a declarative item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemType {
    Product,
    Depends,
    Export,
    Group,
}

/// A property value as far as dependency resolution is concerned.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    String(String),
    List(Vec<String>),
}

/// One node of the declarative tree. Immutable once the tree is built.
#[derive(Clone, Debug)]
pub struct Item {
    item_type: ItemType,
    properties: FxHashMap<String, Value>,
    children: Vec<Item>,
}

impl Item {
    pub fn new(item_type: ItemType) -> Self {
        Self {
            item_type,
            properties: FxHashMap::default(),
            children: Vec::new(),
        }
    }

    /// A `Depends { name: <name> }` item.
    pub fn depends_on(name: &str) -> Self {
        Self::new(ItemType::Depends).with_property("name", Value::String(name.to_string()))
    }

    /// A bulk `Depends { productTypes: [...] }` item.
    pub fn depends_on_types(product_types: &[String]) -> Self {
        Self::new(ItemType::Depends)
            .with_property("productTypes", Value::List(product_types.to_vec()))
    }

    pub fn with_property(mut self, name: &str, value: Value) -> Self {
        self.properties.insert(name.to_string(), value);
        self
    }

    pub fn with_child(mut self, child: Item) -> Self {
        self.children.push(child);
        self
    }

    pub fn item_type(&self) -> ItemType {
        self.item_type
    }

    pub fn children(&self) -> &[Item] {
        &self.children
    }

    pub fn string_property(&self, name: &str) -> Option<&str> {
        match self.properties.get(name) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// List-valued property. A plain string is treated as a one-element list.
    pub fn list_property(&self, name: &str) -> Vec<String> {
        match self.properties.get(name) {
            Some(Value::List(l)) => l.clone(),
            Some(Value::String(s)) => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    pub fn bool_property(&self, name: &str, default: bool) -> bool {
        match self.properties.get(name) {
            Some(Value::Bool(b)) => *b,
            _ => default,
        }
    }

    /// Number of direct children that are dependency declarations.
    ///
    /// Nested items (e.g. a `Depends` inside a `Group` or `Export`) are not counted.
    pub fn count_direct_dependency_declarations(&self) -> usize {
        self.children
            .iter()
            .filter(|c| c.item_type == ItemType::Depends)
            .count()
    }

    /// Direct children of the given type.
    pub fn children_of_type(&self, item_type: ItemType) -> impl Iterator<Item = &Item> {
        self.children
            .iter()
            .filter(move |c| c.item_type == item_type)
    }
}
