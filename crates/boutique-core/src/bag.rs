//! # Shopping Bag
//!
//! Line items a visitor intends to purchase.
//!
//! ## Bag Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Bag Operations                                       │
//! │                                                                         │
//! │  Key: (product.id, color, size), compared by value                      │
//! │                                                                         │
//! │  add_item(p, c, s, n)                                                   │
//! │     ├── key present ──► quantity += n                                   │
//! │     └── key absent  ──► push new line (quantity = n)                    │
//! │                                                                         │
//! │  remove_item(p, c, s, n)                                                │
//! │     ├── key present ──► quantity -= n                                   │
//! │     │                    └── result ≤ 0 ──► line removed                │
//! │     └── key absent  ──► no-op                                           │
//! │                                                                         │
//! │  quantity_of(p, c, s) ──► quantity or 0 (read only)                     │
//! │  clear()              ──► no lines                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;
use crate::validation::{validate_product_id, validate_quantity};

// =============================================================================
// Line Item
// =============================================================================

/// One bag entry: a product variation with an accumulated quantity.
///
/// ## Design Notes
/// `product` is a shared, read-only reference into catalog data. Two
/// lines are the same variation when product id, color and size are equal,
/// so a re-fetched copy of a product still matches its existing line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BagLineItem {
    pub product: Arc<Product>,
    pub color: String,
    pub size: String,
    /// Always ≥ 1 while the line exists.
    pub quantity: u32,
    /// When this variation first entered the bag.
    pub added_at: DateTime<Utc>,
}

impl BagLineItem {
    fn new(product: Arc<Product>, color: &str, size: &str, quantity: u32) -> Self {
        BagLineItem {
            product,
            color: color.to_string(),
            size: size.to_string(),
            quantity,
            added_at: Utc::now(),
        }
    }

    /// Returns true if this line holds the given variation.
    #[inline]
    pub fn matches(&self, product_id: &str, color: &str, size: &str) -> bool {
        self.product.id == product_id && self.color == color && self.size == size
    }

    /// Unit price × quantity; zero for unpriced products.
    pub fn line_total(&self) -> CoreResult<Money> {
        self.product
            .price
            .unwrap_or_default()
            .checked_mul_quantity(self.quantity)
    }
}

/// Outcome of a bag mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BagChange {
    /// A new line was appended with this quantity.
    Added { quantity: u32 },
    /// An existing line now holds this quantity.
    Updated { quantity: u32 },
    /// The line dropped to zero and was removed.
    Removed,
    /// No matching line; nothing changed.
    Unchanged,
}

impl BagChange {
    /// Returns true if the bag contents changed.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, BagChange::Unchanged)
    }
}

// =============================================================================
// Bag
// =============================================================================

/// The shopping bag.
///
/// ## Invariants
/// - At most one line per `(product.id, color, size)`
/// - Every line has quantity ≥ 1
/// - Lines keep insertion order
/// - The subtotal of a bag built through `add_item` fits in an `i64` of cents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bag {
    items: Vec<BagLineItem>,
}

impl Bag {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `quantity` of a variation, merging with an existing line.
    ///
    /// ## Errors
    /// - `Validation` if the product has no id or `quantity` is 0
    /// - `QuantityTooLarge` if the accumulated quantity overflows
    /// - `AmountOverflow` if the line total or the subtotal would overflow
    ///
    /// On error the bag is unchanged.
    pub fn add_item(
        &mut self,
        product: &Arc<Product>,
        color: &str,
        size: &str,
        quantity: u32,
    ) -> CoreResult<BagChange> {
        validate_product_id(&product.id)?;
        validate_quantity(quantity)?;

        if let Some(index) = self.position(&product.id, color, size) {
            let item = &self.items[index];
            let total = item
                .quantity
                .checked_add(quantity)
                .ok_or(CoreError::QuantityTooLarge {
                    current: item.quantity,
                    requested: quantity,
                    max: u32::MAX,
                })?;

            // The line keeps the price it was first added at
            let price = item.product.price.unwrap_or_default();
            price.checked_mul_quantity(total)?;
            self.check_subtotal_after(price, quantity)?;

            self.items[index].quantity = total;
            return Ok(BagChange::Updated { quantity: total });
        }

        let price = product.price.unwrap_or_default();
        price.checked_mul_quantity(quantity)?;
        self.check_subtotal_after(price, quantity)?;

        self.items
            .push(BagLineItem::new(Arc::clone(product), color, size, quantity));
        Ok(BagChange::Added { quantity })
    }

    /// Removes `quantity` of a variation; the line goes away at zero.
    ///
    /// A variation that is not in the bag is a no-op (`Unchanged`).
    pub fn remove_item(
        &mut self,
        product: &Product,
        color: &str,
        size: &str,
        quantity: u32,
    ) -> CoreResult<BagChange> {
        validate_product_id(&product.id)?;
        validate_quantity(quantity)?;

        let Some(index) = self.position(&product.id, color, size) else {
            return Ok(BagChange::Unchanged);
        };

        let remaining = self.items[index].quantity.saturating_sub(quantity);
        if remaining == 0 {
            self.items.remove(index);
            return Ok(BagChange::Removed);
        }

        self.items[index].quantity = remaining;
        Ok(BagChange::Updated {
            quantity: remaining,
        })
    }

    /// Current quantity of a variation, or 0 if absent.
    pub fn quantity_of(&self, product_id: &str, color: &str, size: &str) -> u32 {
        self.items
            .iter()
            .find(|i| i.matches(product_id, color, size))
            .map_or(0, |i| i.quantity)
    }

    /// Empties the bag.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[BagLineItem] {
        &self.items
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of quantities across all lines.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sum of line totals (before delivery).
    ///
    /// ## Errors
    /// `AmountOverflow` for a bag whose total does not fit, which only a
    /// hand-edited snapshot can produce.
    pub fn subtotal(&self) -> CoreResult<Money> {
        self.items
            .iter()
            .try_fold(Money::zero(), |sum, item| sum.checked_add(item.line_total()?))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, product_id: &str, color: &str, size: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|i| i.matches(product_id, color, size))
    }

    fn check_subtotal_after(&self, price: Money, quantity: u32) -> CoreResult<()> {
        self.subtotal()?
            .checked_add(price.checked_mul_quantity(quantity)?)
            .map(|_| ())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn product(id: &str) -> Arc<Product> {
        Arc::new(Product::new(id, "c1"))
    }

    fn priced(id: &str, cents: i64) -> Arc<Product> {
        Arc::new(Product::new(id, "c1").with_price(Money::from_cents(cents)))
    }

    #[test]
    fn test_add_then_remove_scenario() {
        let mut bag = Bag::new();
        let p1 = product("p1");

        assert_eq!(
            bag.add_item(&p1, "red", "M", 2).unwrap(),
            BagChange::Added { quantity: 2 }
        );
        assert_eq!(
            bag.add_item(&p1, "red", "M", 1).unwrap(),
            BagChange::Updated { quantity: 3 }
        );
        assert_eq!(bag.line_count(), 1);
        assert_eq!(bag.quantity_of("p1", "red", "M"), 3);

        assert_eq!(bag.remove_item(&p1, "red", "M", 3).unwrap(), BagChange::Removed);
        assert!(bag.is_empty());
    }

    #[test]
    fn test_repeated_adds_accumulate_into_one_line() {
        let mut bag = Bag::new();
        let p1 = product("p1");
        let adds = [1, 4, 2, 7, 1];

        for qty in adds {
            bag.add_item(&p1, "blue", "L", qty).unwrap();
        }

        assert_eq!(bag.line_count(), 1);
        assert_eq!(bag.quantity_of("p1", "blue", "L"), adds.iter().sum::<u32>());
    }

    #[test]
    fn test_variations_are_distinct_lines() {
        let mut bag = Bag::new();
        let p1 = product("p1");

        bag.add_item(&p1, "red", "M", 1).unwrap();
        bag.add_item(&p1, "red", "L", 1).unwrap();
        bag.add_item(&p1, "blue", "M", 1).unwrap();
        bag.add_item(&product("p2"), "red", "M", 1).unwrap();

        assert_eq!(bag.line_count(), 4);
        assert_eq!(bag.total_quantity(), 4);
    }

    #[test]
    fn test_matching_is_by_value_not_identity() {
        let mut bag = Bag::new();
        let original = product("p1");
        let refetched = product("p1");
        assert!(!Arc::ptr_eq(&original, &refetched));

        bag.add_item(&original, "red", "M", 1).unwrap();
        bag.add_item(&refetched, "red", "M", 2).unwrap();

        assert_eq!(bag.line_count(), 1);
        assert_eq!(bag.quantity_of("p1", "red", "M"), 3);
    }

    #[test]
    fn test_over_removal_drops_line() {
        let mut bag = Bag::new();
        let p1 = product("p1");

        bag.add_item(&p1, "red", "M", 2).unwrap();
        assert_eq!(bag.remove_item(&p1, "red", "M", 5).unwrap(), BagChange::Removed);
        assert_eq!(bag.quantity_of("p1", "red", "M"), 0);
        assert!(bag.items().iter().all(|i| i.quantity >= 1));
    }

    #[test]
    fn test_partial_removal_keeps_line() {
        let mut bag = Bag::new();
        let p1 = product("p1");

        bag.add_item(&p1, "red", "M", 5).unwrap();
        assert_eq!(
            bag.remove_item(&p1, "red", "M", 2).unwrap(),
            BagChange::Updated { quantity: 3 }
        );
        assert_eq!(bag.quantity_of("p1", "red", "M"), 3);
    }

    #[test]
    fn test_remove_missing_variation_is_noop() {
        let mut bag = Bag::new();
        let p1 = product("p1");
        bag.add_item(&p1, "red", "M", 1).unwrap();

        let change = bag.remove_item(&p1, "green", "M", 1).unwrap();
        assert_eq!(change, BagChange::Unchanged);
        assert!(!change.is_mutation());
        assert_eq!(bag.quantity_of("p1", "red", "M"), 1);
    }

    #[test]
    fn test_missing_product_id_rejected() {
        let mut bag = Bag::new();
        let nameless = product("");

        let err = bag.add_item(&nameless, "red", "M", 1).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Required { .. })
        ));
        assert!(bag.remove_item(&nameless, "red", "M", 1).is_err());
        assert!(bag.is_empty());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut bag = Bag::new();
        let p1 = product("p1");

        assert!(bag.add_item(&p1, "red", "M", 0).is_err());
        assert!(bag.is_empty());

        bag.add_item(&p1, "red", "M", 2).unwrap();
        assert!(bag.remove_item(&p1, "red", "M", 0).is_err());
        assert_eq!(bag.quantity_of("p1", "red", "M"), 2);
    }

    #[test]
    fn test_overflow_leaves_quantity_untouched() {
        let mut bag = Bag::new();
        let p1 = product("p1");

        bag.add_item(&p1, "red", "M", u32::MAX - 1).unwrap();
        let err = bag.add_item(&p1, "red", "M", 2).unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { .. }));
        assert_eq!(bag.quantity_of("p1", "red", "M"), u32::MAX - 1);
    }

    /// Replaying any add/remove sequence against a plain counter gives the
    /// same quantity as the bag.
    #[test]
    fn test_quantity_matches_replayed_counter() {
        let mut bag = Bag::new();
        let p1 = product("p1");
        let ops: [(bool, u32); 9] = [
            (true, 3),
            (false, 1),
            (true, 2),
            (false, 10),
            (false, 1),
            (true, 1),
            (true, 6),
            (false, 4),
            (true, 2),
        ];

        let mut expected: i64 = 0;
        for (is_add, qty) in ops {
            if is_add {
                bag.add_item(&p1, "red", "M", qty).unwrap();
                expected += i64::from(qty);
            } else {
                bag.remove_item(&p1, "red", "M", qty).unwrap();
                if expected > 0 {
                    expected = (expected - i64::from(qty)).max(0);
                }
            }
            assert_eq!(i64::from(bag.quantity_of("p1", "red", "M")), expected);
        }
    }

    #[test]
    fn test_totals() {
        let mut bag = Bag::new();
        bag.add_item(&priced("p1", 1999), "red", "M", 2).unwrap();
        bag.add_item(&priced("p2", 500), "blue", "S", 1).unwrap();
        bag.add_item(&product("p3"), "black", "L", 4).unwrap();

        assert_eq!(bag.line_count(), 3);
        assert_eq!(bag.total_quantity(), 7);
        assert_eq!(bag.subtotal().unwrap(), Money::from_cents(4498));
    }

    #[test]
    fn test_add_rejects_unrepresentable_line_total() {
        let mut bag = Bag::new();
        let pricey = Arc::new(
            Product::new("p1", "c1").with_price(Money::parse_decimal("100000000000000").unwrap()),
        );

        let err = bag.add_item(&pricey, "red", "M", 1000).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow));
        assert!(bag.is_empty());

        bag.add_item(&pricey, "red", "M", 10).unwrap();
        let err = bag.add_item(&pricey, "red", "M", 990).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow));
        assert_eq!(bag.quantity_of("p1", "red", "M"), 10);
        assert_eq!(bag.subtotal().unwrap().cents(), 100_000_000_000_000_000);
    }

    #[test]
    fn test_add_rejects_unrepresentable_subtotal() {
        let mut bag = Bag::new();
        let half = i64::MAX / 2 + 1;

        bag.add_item(&priced("p1", half), "red", "M", 1).unwrap();
        let err = bag.add_item(&priced("p2", half), "blue", "S", 1).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow));
        assert_eq!(bag.line_count(), 1);
        assert_eq!(bag.subtotal().unwrap().cents(), half);
    }

    #[test]
    fn test_subtotal_of_oversized_restored_bag_is_an_error() {
        let bag = Bag {
            items: vec![
                BagLineItem::new(priced("p1", i64::MAX), "red", "M", 1),
                BagLineItem::new(priced("p2", 1), "blue", "S", 1),
            ],
        };

        assert!(bag.items()[0].line_total().is_ok());
        assert!(matches!(bag.subtotal(), Err(CoreError::AmountOverflow)));
    }

    #[test]
    fn test_clear() {
        let mut bag = Bag::new();
        bag.add_item(&product("p1"), "red", "M", 2).unwrap();
        bag.clear();
        assert!(bag.is_empty());
        assert_eq!(bag.subtotal().unwrap(), Money::zero());
    }
}
