//! # Catalog Commands
//!
//! Refreshing the cache and browsing it.
//!
//! ## Browse Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  catalog refresh ──► categories + products from the remote store        │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  catalog categories ──► catalog category c1 ──► catalog product c1 p1  │
//! │   (home page)            (category page)         (product page)        │
//! │                                                                         │
//! │  product lookup: cache first, remote store only on a cache miss        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use boutique_catalog::CatalogSource;
use boutique_core::Product;

use crate::error::{AppError, AppResult, ErrorCode};
use crate::state::StorefrontState;

/// Outcome of a full refresh.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReport {
    pub categories_refreshed: bool,
    pub products_refreshed: bool,
    pub category_count: usize,
    pub product_count: usize,
    pub group_count: usize,
}

/// One row of the category listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub id: String,
    pub name: String,
    pub image_urls: Vec<String>,
    pub product_count: usize,
}

/// A category page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub id: String,
    pub name: String,
    pub image_urls: Vec<String>,
    pub products: Vec<Arc<Product>>,
}

/// Refreshes categories and then products.
///
/// A failed half keeps its cached list. Only when both fail is the
/// refresh reported as an error.
pub async fn refresh_catalog<S: CatalogSource>(
    state: &mut StorefrontState,
    source: &S,
) -> AppResult<RefreshReport> {
    let categories_refreshed = state.refresh_categories(source).await;
    let products_refreshed = state.refresh_products(source).await;

    if !categories_refreshed && !products_refreshed {
        return Err(AppError::new(
            ErrorCode::CatalogError,
            "Catalog refresh failed; cached catalog kept",
        ));
    }

    if !(categories_refreshed && products_refreshed) {
        warn!(categories_refreshed, products_refreshed, "Partial catalog refresh");
    }

    Ok(RefreshReport {
        categories_refreshed,
        products_refreshed,
        category_count: state.categories().len(),
        product_count: state.products().len(),
        group_count: state.grouped_by_category().len(),
    })
}

/// Lists cached categories with their product counts.
pub fn list_categories(state: &StorefrontState) -> Vec<CategorySummary> {
    let grouping = state.grouped_by_category();

    state
        .categories()
        .iter()
        .map(|category| CategorySummary {
            id: category.id.clone(),
            name: category.name.clone(),
            image_urls: category.image_urls.clone(),
            product_count: grouping
                .get(&category.id)
                .map_or(0, |group| group.category_products.len()),
        })
        .collect()
}

/// Returns one category page.
pub fn get_category(state: &StorefrontState, category_id: &str) -> AppResult<CategoryView> {
    debug!(category_id, "get_category command");

    let group = state
        .category_group(category_id)
        .ok_or_else(|| AppError::not_found("Category", category_id))?;

    Ok(CategoryView {
        id: category_id.to_string(),
        name: group.category_name.clone(),
        image_urls: group.category_image.clone(),
        products: group.category_products.clone(),
    })
}

/// Returns the product at `/category/:category_id/:product_id`.
pub async fn get_product<S: CatalogSource>(
    state: &StorefrontState,
    source: &S,
    category_id: &str,
    product_id: &str,
) -> AppResult<Arc<Product>> {
    state
        .resolve_product(source, category_id, product_id)
        .await
        .ok_or_else(|| AppError::not_found("Product", product_id))
}
