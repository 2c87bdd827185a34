//! # Catalog
//!
//! The last-fetched categories and products plus the derived
//! category → products grouping.
//!
//! ## Derivation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Category Grouping                                    │
//! │                                                                         │
//! │  replace_categories(..) ──┐                                             │
//! │                           ├──► group_by_category(categories, products)  │
//! │  replace_products(..)  ───┘        │                                    │
//! │                                    ▼                                    │
//! │   for category in categories:      (category-list order)                │
//! │       group[category.id] = products.filter(p.category == category.id)   │
//! │                                                                         │
//! │  Either list empty ──► grouping is empty                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The grouping is always rebuilt from scratch; catalogs are small and
//! refreshes are rare.

use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::types::{Category, CategoryGroup, Product};

// =============================================================================
// Category Grouping
// =============================================================================

/// Ordered mapping `Category::id → CategoryGroup`.
///
/// Iterates in category-list order. Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryGrouping {
    groups: Vec<CategoryGroup>,
}

impl CategoryGrouping {
    /// Returns the group keyed by `category_id`.
    pub fn get(&self, category_id: &str) -> Option<&CategoryGroup> {
        self.groups.iter().find(|g| g.category_id == category_id)
    }

    pub fn contains_key(&self, category_id: &str) -> bool {
        self.get(category_id).is_some()
    }

    /// Iterates `(key, group)` pairs in category-list order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategoryGroup)> {
        self.groups.iter().map(|g| (g.category_id.as_str(), g))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.category_id.as_str())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Map-set: a repeated key overwrites the value but keeps its position.
    fn insert(&mut self, group: CategoryGroup) {
        match self
            .groups
            .iter_mut()
            .find(|g| g.category_id == group.category_id)
        {
            Some(existing) => *existing = group,
            None => self.groups.push(group),
        }
    }
}

impl Serialize for CategoryGrouping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in &self.groups {
            map.serialize_entry(&group.category_id, group)?;
        }
        map.end()
    }
}

/// Builds the grouping from the two source lists.
///
/// Returns an empty grouping when either list is empty. Products whose
/// `category` matches no category are left out.
pub fn group_by_category(categories: &[Category], products: &[Arc<Product>]) -> CategoryGrouping {
    let mut grouping = CategoryGrouping::default();

    if categories.is_empty() || products.is_empty() {
        return grouping;
    }

    for category in categories {
        grouping.insert(CategoryGroup {
            category_id: category.id.clone(),
            category_name: category.name.clone(),
            category_image: category.image_urls.clone(),
            category_products: products
                .iter()
                .filter(|p| p.is_in_category(&category.id))
                .cloned()
                .collect(),
        });
    }

    grouping
}

// =============================================================================
// Catalog
// =============================================================================

/// Cached catalog lists with their derived grouping.
///
/// ## Invariants
/// - `grouping == group_by_category(categories, products)` at all times
/// - Products are shared (`Arc`) with bag line items and groups
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    categories: Vec<Category>,
    products: Vec<Arc<Product>>,
    grouping: CategoryGrouping,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog from both lists and derives the grouping.
    pub fn from_parts(categories: Vec<Category>, products: Vec<Arc<Product>>) -> Self {
        let grouping = group_by_category(&categories, &products);
        Catalog {
            categories,
            products,
            grouping,
        }
    }

    /// Replaces the category list and recomputes the grouping.
    pub fn replace_categories(&mut self, categories: Vec<Category>) {
        self.categories = categories;
        self.regroup();
    }

    /// Replaces the product list and recomputes the grouping.
    pub fn replace_products(&mut self, products: Vec<Product>) {
        self.products = products.into_iter().map(Arc::new).collect();
        self.regroup();
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn products(&self) -> &[Arc<Product>] {
        &self.products
    }

    /// Returns the derived `Category::id → CategoryGroup` mapping.
    pub fn grouped_by_category(&self) -> &CategoryGrouping {
        &self.grouping
    }

    /// Linear lookup in the cached product list.
    pub fn find_product(&self, product_id: &str) -> Option<&Arc<Product>> {
        self.products.iter().find(|p| p.id == product_id)
    }

    /// Linear lookup in the cached category list.
    pub fn category(&self, category_id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == category_id)
    }

    fn regroup(&mut self) {
        self.grouping = group_by_category(&self.categories, &self.products);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
