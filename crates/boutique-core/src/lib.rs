//! # boutique-core: Pure Domain Logic for the Boutique storefront
//!
//! This crate holds the shopping-bag and catalog-derivation logic as pure,
//! synchronous code with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Boutique Storefront Architecture                    │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 View / routing layer (external)                 │   │
//! │  │    Home ──► Category ──► Product details ──► Bag ──► Checkout   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           StorefrontState façade (apps/storefront)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ boutique-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  catalog  │  │    bag    │  │   order   │  │   │
//! │  │   │  Product  │  │  Catalog  │  │    Bag    │  │ Delivery  │  │   │
//! │  │   │ Category  │  │ Grouping  │  │ LineItem  │  │  Status   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Catalog records (Category, Product, CategoryGroup)
//! - [`catalog`] - Cached catalog and the category → product derivation
//! - [`bag`] - Shopping-bag line items and quantity bookkeeping
//! - [`order`] - Delivery details and order status flags
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Input checks shared by the bag and checkout
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use boutique_core::{Bag, Product};
//!
//! let product = Arc::new(Product::new("p1", "c1"));
//! let mut bag = Bag::new();
//!
//! bag.add_item(&product, "red", "M", 2).unwrap();
//! bag.add_item(&product, "red", "M", 1).unwrap();
//! assert_eq!(bag.quantity_of("p1", "red", "M"), 3);
//! assert_eq!(bag.line_count(), 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bag;
pub mod catalog;
pub mod error;
pub mod money;
pub mod order;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use bag::{Bag, BagChange, BagLineItem};
pub use catalog::{group_by_category, Catalog, CategoryGrouping};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order::{DeliveryDetails, DeliveryDetailsPatch, OrderStatus};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Fixed key under which the whole state container is persisted.
///
/// Kept identical to the key used by the web client so existing saved
/// state stays addressable.
pub const STATE_KEY: &str = "categoryProductStore";

/// Document collection holding categories in the remote store.
pub const CATEGORIES_COLLECTION: &str = "categories";

/// Document collection holding products in the remote store.
pub const PRODUCTS_COLLECTION: &str = "products";
