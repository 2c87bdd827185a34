//! # Order State
//!
//! Delivery details collected at checkout and the order status flags.
//!
//! ## Order Status Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  (emailSent, paymentConfirmed)                                          │
//! │                                                                         │
//! │   initial ──► (false, false)                                            │
//! │                                                                         │
//! │   set_email_status(sent) ──► (sent, true)     from any state            │
//! │   clear()                ──► (false, false)   from any state            │
//! │                                                                         │
//! │   Setting the email status always confirms payment as well.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Delivery Details
// =============================================================================

/// Recipient and order summary entered during checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    /// `None` until a fee is entered or an order is placed; `Some(0)` is
    /// free delivery.
    pub delivery_fee: Option<Money>,
    pub order_total: Money,
    pub order_number: Option<String>,
}

/// Partial update for [`DeliveryDetails`]; `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryDetailsPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub delivery_fee: Option<Money>,
    pub order_total: Option<Money>,
    pub order_number: Option<String>,
}

impl DeliveryDetailsPatch {
    /// Returns true if the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        *self == DeliveryDetailsPatch::default()
    }
}

impl DeliveryDetails {
    /// Merge-patches the record: fields present in `patch` replace the
    /// current value, everything else is retained.
    pub fn apply(&mut self, patch: DeliveryDetailsPatch) {
        fn merge<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        merge(&mut self.first_name, patch.first_name);
        merge(&mut self.last_name, patch.last_name);
        merge(&mut self.email, patch.email);
        merge(&mut self.phone, patch.phone);
        merge(&mut self.address_line1, patch.address_line1);
        merge(&mut self.address_line2, patch.address_line2);
        merge(&mut self.city, patch.city);
        merge(&mut self.postal_code, patch.postal_code);
        merge(&mut self.country, patch.country);
        merge(&mut self.order_total, patch.order_total);
        if patch.delivery_fee.is_some() {
            self.delivery_fee = patch.delivery_fee;
        }
        if patch.order_number.is_some() {
            self.order_number = patch.order_number;
        }
    }

    /// Recipient name as displayed on the confirmation.
    pub fn recipient_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Post-checkout flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatus {
    pub email_sent: bool,
    pub payment_confirmed: bool,
}

impl OrderStatus {
    /// Records whether the confirmation email went out.
    ///
    /// Also marks the payment as confirmed, whatever `sent` is.
    pub fn set_email_status(&mut self, sent: bool) {
        self.email_sent = sent;
        self.payment_confirmed = true;
    }

    /// Resets both flags.
    pub fn clear(&mut self) {
        *self = OrderStatus::default();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
