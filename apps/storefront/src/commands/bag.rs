//! # Bag Commands
//!
//! Commands for bag manipulation.
//!
//! ## Bag Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Bag Lifecycle                                        │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│  In Bag  │────►│ Delivery │────►│  Placed  │       │
//! │  │   Bag    │     │          │     │ Details  │     │  Order   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                                                │
//! │                   add_to_bag                                            │
//! │                   remove_from_bag                                       │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear_bag ───────────────────────►                   │
//! │                                                      (back to empty)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use boutique_core::validation::validate_quantity;
use boutique_core::{Bag, BagChange, BagLineItem, Product};

use crate::error::{AppError, AppResult};
use crate::state::StorefrontState;

/// Bag response including items and totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BagResponse {
    pub items: Vec<BagLineItem>,
    pub totals: BagTotals,
}

/// Bag totals as shown in the bag drawer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BagTotals {
    pub line_count: usize,
    pub total_quantity: u64,
    pub subtotal_cents: i64,
}

impl TryFrom<&Bag> for BagTotals {
    type Error = AppError;

    fn try_from(bag: &Bag) -> AppResult<Self> {
        Ok(BagTotals {
            line_count: bag.line_count(),
            total_quantity: bag.total_quantity(),
            subtotal_cents: bag.subtotal()?.cents(),
        })
    }
}

impl TryFrom<&Bag> for BagResponse {
    type Error = AppError;

    fn try_from(bag: &Bag) -> AppResult<Self> {
        Ok(BagResponse {
            items: bag.items().to_vec(),
            totals: BagTotals::try_from(bag)?,
        })
    }
}

/// Quantity of one variation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityResponse {
    pub product_id: String,
    pub color: String,
    pub size: String,
    pub quantity: u32,
}

/// Gets the current bag contents.
///
/// ## Errors
/// - `BAG_ERROR` if the subtotal doesn't fit (only a hand-edited snapshot
///   can hold such a bag)
pub fn get_bag(state: &StorefrontState) -> AppResult<BagResponse> {
    BagResponse::try_from(state.bag())
}

/// Adds a cached product variation to the bag.
///
/// ## Flow
/// 1. Validate the quantity (must be ≥ 1)
/// 2. Look the product up in the catalog cache
/// 3. Merge into an existing line or append a new one
///
/// ## Errors
/// - `VALIDATION_ERROR` for a zero quantity
/// - `NOT_FOUND` if the product isn't cached (run `catalog refresh`)
/// - `BAG_ERROR` if the line quantity or the bag total would overflow
pub fn add_to_bag(
    state: &mut StorefrontState,
    product_id: &str,
    color: &str,
    size: &str,
    quantity: u32,
) -> AppResult<BagResponse> {
    debug!(product_id, color, size, quantity, "add_to_bag command");

    validate_quantity(quantity)?;

    let product = state
        .find_product(product_id)
        .ok_or_else(|| AppError::not_found("Product", product_id))?;

    match state.add_item(Some(&product), color, size, quantity) {
        BagChange::Unchanged => Err(AppError::bag(format!(
            "Cannot add {} more of {} ({}, {})",
            quantity, product_id, color, size
        ))),
        _ => get_bag(state),
    }
}

/// Removes `quantity` of a variation from the bag.
///
/// Works for products that have since left the catalog: the bag line's
/// own product copy is used when there is one.
pub fn remove_from_bag(
    state: &mut StorefrontState,
    product_id: &str,
    color: &str,
    size: &str,
    quantity: u32,
) -> AppResult<BagResponse> {
    debug!(product_id, color, size, quantity, "remove_from_bag command");

    validate_quantity(quantity)?;

    let product = bagged_product(state.bag(), product_id)
        .or_else(|| state.find_product(product_id))
        .ok_or_else(|| AppError::not_found("Product", product_id))?;

    // A variation that isn't in the bag leaves it unchanged; that's fine
    state.remove_item(Some(&*product), color, size, quantity);
    get_bag(state)
}

/// Empties the bag.
pub fn clear_bag(state: &mut StorefrontState) -> AppResult<BagResponse> {
    state.clear_bag();
    get_bag(state)
}

/// Returns the quantity of one variation (0 if absent).
pub fn quantity_of(
    state: &StorefrontState,
    product_id: &str,
    color: &str,
    size: &str,
) -> QuantityResponse {
    QuantityResponse {
        product_id: product_id.to_string(),
        color: color.to_string(),
        size: size.to_string(),
        quantity: state.quantity_of(product_id, color, size),
    }
}

fn bagged_product(bag: &Bag, product_id: &str) -> Option<Arc<Product>> {
    bag.items()
        .iter()
        .find(|line| line.product.id == product_id)
        .map(|line| Arc::clone(&line.product))
}

#[cfg(test)]
mod tests {
    use boutique_catalog::InMemoryCatalog;
    use boutique_core::{Category, Money};

    use super::*;
    use crate::error::ErrorCode;
    use crate::state::{MemorySnapshotSink, RecordingSink, StoreEvent};

    async fn stocked_state() -> (StorefrontState, Arc<RecordingSink>) {
        let events = Arc::new(RecordingSink::new());
        let source = InMemoryCatalog::new(
            vec![Category::new("c1", "Shirts")],
            vec![
                Product::new("p1", "c1").with_price(Money::from_cents(2000)),
                Product::new("p2", "c1").with_price(Money::from_cents(550)),
            ],
        );
        let mut state = StorefrontState::new(events.clone());
        state.refresh_categories(&source).await;
        state.refresh_products(&source).await;
        (state, events)
    }

    #[tokio::test]
    async fn test_add_merges_variations() {
        let (mut state, _) = stocked_state().await;

        add_to_bag(&mut state, "p1", "red", "M", 1).unwrap();
        add_to_bag(&mut state, "p1", "red", "M", 2).unwrap();
        let response = add_to_bag(&mut state, "p2", "blue", "L", 1).unwrap();

        assert_eq!(
            response.totals,
            BagTotals {
                line_count: 2,
                total_quantity: 4,
                subtotal_cents: 6550,
            }
        );
        assert_eq!(quantity_of(&state, "p1", "red", "M").quantity, 3);
    }

    #[tokio::test]
    async fn test_add_rejects_bad_input() {
        let (mut state, events) = stocked_state().await;

        let err = add_to_bag(&mut state, "p1", "red", "M", 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = add_to_bag(&mut state, "nope", "red", "M", 1).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(events
            .take()
            .contains(&StoreEvent::ProductNotFound { product_id: "nope".into() }));

        add_to_bag(&mut state, "p1", "red", "M", u32::MAX).unwrap();
        let err = add_to_bag(&mut state, "p1", "red", "M", 1).unwrap_err();
        assert_eq!(err.code, ErrorCode::BagError);
        assert_eq!(state.quantity_of("p1", "red", "M"), u32::MAX);
    }

    #[tokio::test]
    async fn test_add_rejects_total_overflow() {
        let events = Arc::new(RecordingSink::new());
        let source = InMemoryCatalog::new(
            vec![Category::new("c1", "Shirts")],
            vec![Product::new("p1", "c1")
                .with_price(Money::parse_decimal("100000000000000").unwrap())],
        );
        let mut state = StorefrontState::new(events.clone());
        state.refresh_products(&source).await;

        let err = add_to_bag(&mut state, "p1", "red", "M", 1000).unwrap_err();
        assert_eq!(err.code, ErrorCode::BagError);
        assert!(state.bag().is_empty());
        assert!(matches!(
            events.take().as_slice(),
            [StoreEvent::BagInputRejected { .. }]
        ));

        let response = add_to_bag(&mut state, "p1", "red", "M", 3).unwrap();
        assert_eq!(response.totals.subtotal_cents, 30_000_000_000_000_000);
    }

    #[tokio::test]
    async fn test_remove_decrements_then_drops_line() {
        let (mut state, _) = stocked_state().await;
        add_to_bag(&mut state, "p1", "red", "M", 3).unwrap();

        let response = remove_from_bag(&mut state, "p1", "red", "M", 2).unwrap();
        assert_eq!(response.totals.total_quantity, 1);

        let response = remove_from_bag(&mut state, "p1", "red", "M", 5).unwrap();
        assert!(response.items.is_empty());

        // Absent variation: no error, no change
        let response = remove_from_bag(&mut state, "p2", "red", "M", 1).unwrap();
        assert!(response.items.is_empty());
    }

    #[tokio::test]
    async fn test_remove_uses_bag_copy_of_delisted_product() {
        let (state, _) = stocked_state().await;
        let sink = Arc::new(MemorySnapshotSink::new());
        let mut state = state.with_persistence(sink.clone());
        add_to_bag(&mut state, "p1", "red", "M", 1).unwrap();

        let source = InMemoryCatalog::new(vec![Category::new("c1", "Shirts")], vec![]);
        state.refresh_products(&source).await;
        assert!(state.products().is_empty());

        let response = remove_from_bag(&mut state, "p1", "red", "M", 1).unwrap();
        assert!(response.items.is_empty());
        assert_eq!(sink.len(), 3);
    }

    #[tokio::test]
    async fn test_clear_bag() {
        let (mut state, _) = stocked_state().await;
        add_to_bag(&mut state, "p1", "red", "M", 1).unwrap();
        let response = clear_bag(&mut state).unwrap();
        assert_eq!(response.totals.line_count, 0);
        assert_eq!(response.totals.subtotal_cents, 0);
    }
}
