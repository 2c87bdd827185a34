//! # Checkout Commands
//!
//! Delivery details, order placement and the post-checkout status flags.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  checkout details --email a@b.c --city Paris   (merge-patch, repeatable)│
//! │        │                                                                │
//! │        ▼                                                                │
//! │  checkout place                                                        │
//! │    subtotal = Σ line totals                                            │
//! │    fee      = details.deliveryFee if set (0 = free delivery),          │
//! │               else checkout.default_delivery_fee                       │
//! │    total    = subtotal + fee                                           │
//! │    orderNumber assigned once, kept on re-placement                     │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  checkout email-status --sent true|false   (payment confirmed either way)│
//! │        │                                                                │
//! │        ▼                                                                │
//! │  checkout reset   (order flags back to false)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use boutique_core::validation::validate_email;
use boutique_core::{DeliveryDetails, DeliveryDetailsPatch, OrderStatus};

use crate::error::{AppError, AppResult};
use crate::state::{AppConfig, StorefrontState};

/// Response of `checkout place`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub order_number: String,
    pub recipient: String,
    pub email: String,
    pub line_count: usize,
    pub total_quantity: u64,
    pub subtotal_cents: i64,
    pub delivery_fee_cents: i64,
    pub order_total_cents: i64,
    /// e.g. `"$42.50"`
    pub order_total_display: String,
}

/// Merge-patches the delivery details.
///
/// An email, when given, must look like one.
pub fn set_delivery_details(
    state: &mut StorefrontState,
    patch: DeliveryDetailsPatch,
) -> AppResult<DeliveryDetails> {
    if patch.is_empty() {
        return Err(AppError::validation("No delivery details given"));
    }

    if let Some(email) = &patch.email {
        validate_email(email)?;
    }

    if let Some(fee) = patch.delivery_fee {
        if fee.is_negative() {
            return Err(AppError::validation("Delivery fee must not be negative"));
        }
    }

    debug!(?patch, "set_delivery_details command");
    state.set_delivery_details(patch);
    Ok(state.delivery_details().clone())
}

/// Prices the bag and stamps the order onto the delivery details.
///
/// The entered delivery fee wins, zero included; the configured default
/// applies only when none was entered.
///
/// ## Errors
/// - `BAG_ERROR` if the bag is empty or the total doesn't fit
/// - `VALIDATION_ERROR` if no valid email has been entered
pub fn place_order(state: &mut StorefrontState, config: &AppConfig) -> AppResult<OrderSummary> {
    if state.bag().is_empty() {
        return Err(AppError::bag("Bag is empty"));
    }

    let details = state.delivery_details();
    validate_email(&details.email)?;

    let fee = details
        .delivery_fee
        .unwrap_or_else(|| config.default_delivery_fee());
    let subtotal = state.bag_subtotal()?;
    let total = subtotal.checked_add(fee)?;
    let order_number = details
        .order_number
        .clone()
        .unwrap_or_else(new_order_number);

    state.set_delivery_details(DeliveryDetailsPatch {
        delivery_fee: Some(fee),
        order_total: Some(total),
        order_number: Some(order_number.clone()),
        ..Default::default()
    });

    let details = state.delivery_details();
    let bag = state.bag();
    info!(order_number = %order_number, total = %total, "Order placed");

    Ok(OrderSummary {
        order_number,
        recipient: details.recipient_name(),
        email: details.email.clone(),
        line_count: bag.line_count(),
        total_quantity: bag.total_quantity(),
        subtotal_cents: subtotal.cents(),
        delivery_fee_cents: fee.cents(),
        order_total_cents: total.cents(),
        order_total_display: total.to_string(),
    })
}

/// Records the confirmation email outcome.
///
/// Payment is marked confirmed whatever `sent` is.
pub fn set_email_status(state: &mut StorefrontState, sent: bool) -> OrderStatus {
    state.set_order_email_status(sent);
    state.order_status()
}

/// Resets the order flags.
pub fn reset_order_status(state: &mut StorefrontState) -> OrderStatus {
    state.clear_order_status();
    state.order_status()
}

fn new_order_number() -> String {
    let id = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("BQ-{}", &id[..8])
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use boutique_core::{Money, Product};

    use super::*;
    use crate::error::ErrorCode;
    use crate::state::RecordingSink;

    fn state_with_bag() -> StorefrontState {
        let mut state = StorefrontState::new(Arc::new(RecordingSink::new()));
        let product = Arc::new(Product::new("p1", "c1").with_price(Money::from_cents(2000)));
        state.add_item(Some(&product), "red", "M", 2);
        state
    }

    fn contact() -> DeliveryDetailsPatch {
        DeliveryDetailsPatch {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            email: Some("ada@example.com".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_details_reject_bad_email() {
        let mut state = state_with_bag();
        let err = set_delivery_details(
            &mut state,
            DeliveryDetailsPatch {
                email: Some("not-an-email".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(state.delivery_details().email.is_empty());

        let err = set_delivery_details(&mut state, DeliveryDetailsPatch::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_details_merge() {
        let mut state = state_with_bag();
        set_delivery_details(&mut state, contact()).unwrap();
        let details = set_delivery_details(
            &mut state,
            DeliveryDetailsPatch {
                city: Some("London".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(details.email, "ada@example.com");
        assert_eq!(details.city, "London");
    }

    #[test]
    fn test_place_order_uses_default_fee_and_keeps_number() {
        let mut state = state_with_bag();
        let mut config = AppConfig::default();
        config.checkout.default_delivery_fee_cents = 495;
        set_delivery_details(&mut state, contact()).unwrap();

        let summary = place_order(&mut state, &config).unwrap();
        assert_eq!(summary.subtotal_cents, 4000);
        assert_eq!(summary.delivery_fee_cents, 495);
        assert_eq!(summary.order_total_cents, 4495);
        assert_eq!(summary.order_total_display, "$44.95");
        assert_eq!(summary.recipient, "Ada Lovelace");
        assert!(summary.order_number.starts_with("BQ-"));
        assert_eq!(summary.order_number.len(), 11);

        let again = place_order(&mut state, &config).unwrap();
        assert_eq!(again.order_number, summary.order_number);
        assert_eq!(
            state.delivery_details().order_total,
            Money::from_cents(4495)
        );
    }

    #[test]
    fn test_place_order_prefers_entered_fee() {
        let mut state = state_with_bag();
        let mut patch = contact();
        patch.delivery_fee = Some(Money::from_cents(1000));
        set_delivery_details(&mut state, patch).unwrap();

        let summary = place_order(&mut state, &AppConfig::default()).unwrap();
        assert_eq!(summary.order_total_cents, 5000);
    }

    #[test]
    fn test_place_order_honours_free_delivery() {
        let mut state = state_with_bag();
        let mut config = AppConfig::default();
        config.checkout.default_delivery_fee_cents = 495;
        let mut patch = contact();
        patch.delivery_fee = Some(Money::zero());
        set_delivery_details(&mut state, patch).unwrap();

        let summary = place_order(&mut state, &config).unwrap();
        assert_eq!(summary.delivery_fee_cents, 0);
        assert_eq!(summary.order_total_cents, 4000);
        assert_eq!(state.delivery_details().delivery_fee, Some(Money::zero()));
    }

    #[test]
    fn test_place_order_rejects_unrepresentable_total() {
        let mut state = StorefrontState::new(Arc::new(RecordingSink::new()));
        let product = Arc::new(Product::new("p1", "c1").with_price(Money::from_cents(i64::MAX - 10)));
        state.add_item(Some(&product), "red", "M", 1);
        let mut patch = contact();
        patch.delivery_fee = Some(Money::from_cents(495));
        set_delivery_details(&mut state, patch).unwrap();

        let err = place_order(&mut state, &AppConfig::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::BagError);
        assert_eq!(state.delivery_details().order_number, None);
    }

    #[test]
    fn test_place_order_requires_bag_and_email() {
        let mut state = StorefrontState::new(Arc::new(RecordingSink::new()));
        let err = place_order(&mut state, &AppConfig::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::BagError);

        let mut state = state_with_bag();
        let err = place_order(&mut state, &AppConfig::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_email_status_always_confirms_payment() {
        let mut state = state_with_bag();

        let status = set_email_status(&mut state, false);
        assert!(!status.email_sent);
        assert!(status.payment_confirmed);

        let status = reset_order_status(&mut state);
        assert_eq!(status, OrderStatus::default());
    }
}
