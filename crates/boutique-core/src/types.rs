//! # Domain Types
//!
//! Catalog records fetched from the remote document store.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Catalog Types                                   │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌──────────────────────┐  │
//! │  │    Category     │   │     Product     │   │   CategoryGroup      │  │
//! │  │  ─────────────  │   │  ─────────────  │   │  ──────────────────  │  │
//! │  │  id             │◄──│  category       │   │  categoryName        │  │
//! │  │  name           │   │  id             │   │  categoryImage       │  │
//! │  │  imageUrls      │   │  name, price    │   │  categoryProducts    │  │
//! │  └─────────────────┘   │  colors, sizes  │   │  (derived, read-only)│  │
//! │                        └─────────────────┘   └──────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Records are immutable once fetched; identity is the document `id`.

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::money::{self, Money};

// =============================================================================
// Category
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Document identifier.
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Image URLs; documents store either one URL or a list.
    #[serde(default, deserialize_with = "string_or_seq")]
    pub image_urls: Vec<String>,
}

impl Category {
    /// Creates a category with no image.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Category {
            id: id.into(),
            name: name.into(),
            image_urls: Vec::new(),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product listed in the catalog.
///
/// Only `id` and `category` carry meaning for the bag and the grouping.
/// The rest are display fields; anything the document holds beyond the
/// known ones is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Document identifier.
    pub id: String,

    /// Owning `Category::id`.
    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Unit price, parsed from the document's decimal price.
    #[serde(default, with = "money::decimal", skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,

    #[serde(default, deserialize_with = "string_or_seq")]
    pub image_urls: Vec<String>,

    /// Colors offered for this product.
    #[serde(default, deserialize_with = "string_or_seq")]
    pub colors: Vec<String>,

    /// Sizes offered for this product.
    #[serde(default, deserialize_with = "string_or_seq")]
    pub sizes: Vec<String>,

    /// Remaining document fields, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Creates a bare product with only identity fields set.
    pub fn new(id: impl Into<String>, category: impl Into<String>) -> Self {
        Product {
            id: id.into(),
            category: category.into(),
            name: String::new(),
            description: None,
            price: None,
            image_urls: Vec::new(),
            colors: Vec::new(),
            sizes: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the unit price.
    pub fn with_price(mut self, price: Money) -> Self {
        self.price = Some(price);
        self
    }

    /// Returns true if this product belongs to the given category.
    #[inline]
    pub fn is_in_category(&self, category_id: &str) -> bool {
        self.category == category_id
    }
}

// =============================================================================
// Category Group (derived)
// =============================================================================

/// Products of one category, derived from the catalog lists.
///
/// Never mutated by hand: the whole grouping is rebuilt whenever either
/// source list is replaced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryGroup {
    /// Key of this group (`Category::id`).
    #[serde(skip)]
    pub category_id: String,
    pub category_name: String,
    pub category_image: Vec<String>,
    pub category_products: Vec<Arc<Product>>,
}

impl CategoryGroup {
    /// Returns the ids of the grouped products, in catalog order.
    pub fn product_ids(&self) -> Vec<&str> {
        self.category_products.iter().map(|p| p.id.as_str()).collect()
    }
}

// =============================================================================
// Serde helpers
// =============================================================================

/// Accepts `"url"`, `["a", "b"]` or `null` for list-valued display fields.
fn string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(single)) if single.is_empty() => Vec::new(),
        Some(OneOrMany::One(single)) => vec![single],
        Some(OneOrMany::Many(list)) => list,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_image_urls_accepts_string_or_list() {
        let single: Category =
            serde_json::from_value(json!({"id": "c1", "name": "Shoes", "imageUrls": "a.png"}))
                .unwrap();
        assert_eq!(single.image_urls, vec!["a.png".to_string()]);

        let many: Category =
            serde_json::from_value(json!({"id": "c2", "imageUrls": ["a.png", "b.png"]})).unwrap();
        assert_eq!(many.image_urls.len(), 2);
        assert_eq!(many.name, "");

        let none: Category = serde_json::from_value(json!({"id": "c3"})).unwrap();
        assert!(none.image_urls.is_empty());
    }

    #[test]
    fn test_product_keeps_unknown_fields() {
        let product: Product = serde_json::from_value(json!({
            "id": "p1",
            "category": "c1",
            "name": "Linen shirt",
            "price": 49.99,
            "sizes": ["S", "M"],
            "material": "linen",
            "featured": true
        }))
        .unwrap();

        assert_eq!(product.price, Some(Money::from_cents(4999)));
        assert_eq!(product.sizes, vec!["S".to_string(), "M".to_string()]);
        assert_eq!(product.extra.get("material"), Some(&json!("linen")));
        assert_eq!(product.extra.get("featured"), Some(&json!(true)));
        assert!(product.is_in_category("c1"));
    }

    #[test]
    fn test_product_round_trips_through_json() {
        let mut product = Product::new("p1", "c1")
            .with_name("Tote")
            .with_price(Money::from_cents(2500));
        product.extra.insert("badge".to_string(), json!("new"));

        let text = serde_json::to_string(&product).unwrap();
        let back: Product = serde_json::from_str(&text).unwrap();
        assert_eq!(back, product);
    }
}
