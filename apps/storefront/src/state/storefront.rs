//! # Storefront State
//!
//! The single state container behind the storefront: Catalog Cache plus
//! Bag & Order State, with the persistence side effect made explicit.
//!
//! ## Operation Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     StorefrontState operations                          │
//! │                                                                         │
//! │  Catalog Cache                        Bag & Order State                 │
//! │  ─────────────                        ─────────────────                 │
//! │  refresh_categories(&src)  async      add_item(product?, color, size, n)│
//! │  refresh_products(&src)    async      remove_item(product?, ..)         │
//! │  grouped_by_category()                quantity_of(id, color, size)      │
//! │  find_product(id)                     clear_bag()                       │
//! │  resolve_product(&src, cat, id) async set_delivery_details(patch)       │
//! │                                       set_order_email_status(sent)      │
//! │                                       clear_order_status()              │
//! │                                                                         │
//! │  None of these return errors. Failures go to the EventSink and leave   │
//! │  state untouched. Every call that changes state ends with persist().   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! The container is built once at startup and passed by `&mut` to whoever
//! dispatches actions. Refreshes take `&mut self`, so two refreshes can't
//! overlap on the same container.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use boutique_catalog::CatalogSource;
use boutique_core::{
    Bag, BagChange, Catalog, Category, CategoryGroup, CategoryGrouping, CoreResult,
    DeliveryDetails, DeliveryDetailsPatch, Money, OrderStatus, Product,
};

use super::events::{BagOperation, CatalogResource, EventSink, StoreEvent};
use super::persist::{Snapshot, SnapshotRef, SnapshotSink, SNAPSHOT_VERSION};

/// Catalog cache, bag, delivery details and order status in one container.
pub struct StorefrontState {
    catalog: Catalog,
    bag: Bag,
    delivery_details: DeliveryDetails,
    order_status: OrderStatus,
    events: Arc<dyn EventSink>,
    persistence: Option<Arc<dyn SnapshotSink>>,
}

impl std::fmt::Debug for StorefrontState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontState")
            .field("categories", &self.catalog.categories().len())
            .field("products", &self.catalog.products().len())
            .field("bag_lines", &self.bag.line_count())
            .field("order_status", &self.order_status)
            .field("persistent", &self.persistence.is_some())
            .finish()
    }
}

impl StorefrontState {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Creates an empty container reporting to `events`.
    pub fn new(events: Arc<dyn EventSink>) -> Self {
        StorefrontState {
            catalog: Catalog::new(),
            bag: Bag::new(),
            delivery_details: DeliveryDetails::default(),
            order_status: OrderStatus::default(),
            events,
            persistence: None,
        }
    }

    /// Rebuilds a container from a persisted blob.
    ///
    /// `None` means nothing was saved yet. A blob that doesn't decode is
    /// reported as `SnapshotRejected` and the container starts empty.
    pub fn restore(blob: Option<&[u8]>, events: Arc<dyn EventSink>) -> Self {
        let mut state = Self::new(events);

        let Some(blob) = blob else {
            debug!("No persisted state, starting empty");
            return state;
        };

        match Snapshot::decode(blob) {
            Ok(snapshot) => {
                state.catalog = Catalog::from_parts(
                    snapshot.categories,
                    snapshot.products.into_iter().map(Arc::new).collect(),
                );
                state.bag = snapshot.bag;
                state.delivery_details = snapshot.delivery_details;
                state.order_status = snapshot.order_status;

                info!(
                    categories = state.catalog.categories().len(),
                    products = state.catalog.products().len(),
                    bag_lines = state.bag.line_count(),
                    saved_at = ?snapshot.saved_at,
                    "Restored persisted state"
                );
            }
            Err(e) => state.events.record(StoreEvent::SnapshotRejected {
                reason: e.to_string(),
            }),
        }

        state
    }

    /// Attaches the sink that receives a snapshot after every mutation.
    pub fn with_persistence(mut self, sink: Arc<dyn SnapshotSink>) -> Self {
        self.persistence = Some(sink);
        self
    }

    /// Serializes the whole container.
    pub fn snapshot(&self) -> Result<Vec<u8>, super::persist::SnapshotError> {
        SnapshotRef {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            categories: self.catalog.categories(),
            products: self.catalog.products(),
            products_by_category: self.catalog.grouped_by_category(),
            bag: &self.bag,
            delivery_details: &self.delivery_details,
            order_status: &self.order_status,
        }
        .encode()
    }

    /// Hands the current snapshot to the sink. Fire-and-forget.
    fn persist(&self) {
        let Some(sink) = &self.persistence else {
            return;
        };

        let submitted = self.snapshot().and_then(|blob| sink.submit(blob));
        if let Err(e) = submitted {
            self.events.record(StoreEvent::PersistFailed {
                reason: e.to_string(),
            });
        }
    }

    // =========================================================================
    // Catalog Cache
    // =========================================================================

    /// Replaces the cached categories with a fresh fetch.
    ///
    /// Returns false (and keeps the previous list) if the fetch failed.
    pub async fn refresh_categories<S: CatalogSource>(&mut self, source: &S) -> bool {
        match source.list_categories().await {
            Ok(categories) => {
                info!(count = categories.len(), "Categories refreshed");
                self.catalog.replace_categories(categories);
                self.persist();
                true
            }
            Err(e) => {
                self.events.record(StoreEvent::catalog_fetch_failed(
                    CatalogResource::Categories,
                    &e,
                ));
                false
            }
        }
    }

    /// Replaces the cached products with a fresh fetch.
    ///
    /// Returns false (and keeps the previous list) if the fetch failed.
    pub async fn refresh_products<S: CatalogSource>(&mut self, source: &S) -> bool {
        match source.list_products().await {
            Ok(products) => {
                info!(count = products.len(), "Products refreshed");
                self.catalog.replace_products(products);
                self.persist();
                true
            }
            Err(e) => {
                self.events.record(StoreEvent::catalog_fetch_failed(
                    CatalogResource::Products,
                    &e,
                ));
                false
            }
        }
    }

    pub fn categories(&self) -> &[Category] {
        self.catalog.categories()
    }

    pub fn products(&self) -> &[Arc<Product>] {
        self.catalog.products()
    }

    /// `Category::id → CategoryGroup`; empty until both lists are non-empty.
    pub fn grouped_by_category(&self) -> &CategoryGrouping {
        self.catalog.grouped_by_category()
    }

    /// The group for one category, if it exists.
    pub fn category_group(&self, category_id: &str) -> Option<&CategoryGroup> {
        self.catalog.grouped_by_category().get(category_id)
    }

    /// Looks a product up in the cached list.
    ///
    /// A miss is reported as `ProductNotFound`.
    pub fn find_product(&self, product_id: &str) -> Option<Arc<Product>> {
        let found = self.catalog.find_product(product_id).cloned();
        if found.is_none() {
            self.events.record(StoreEvent::ProductNotFound {
                product_id: product_id.to_string(),
            });
        }
        found
    }

    /// Resolves `/category/:category/:id`: cache first, then the remote store.
    ///
    /// A remote hit is returned but not added to the cache. A product that
    /// exists under another category is a miss.
    pub async fn resolve_product<S: CatalogSource>(
        &self,
        source: &S,
        category_id: &str,
        product_id: &str,
    ) -> Option<Arc<Product>> {
        if let Some(product) = self.catalog.find_product(product_id) {
            if product.is_in_category(category_id) {
                return Some(Arc::clone(product));
            }
        } else {
            debug!(product_id, "Product not cached, asking the remote store");

            match source.get_product(product_id).await {
                Ok(Some(product)) if product.is_in_category(category_id) => {
                    return Some(Arc::new(product));
                }
                Ok(_) => {}
                Err(e) => {
                    self.events.record(StoreEvent::catalog_fetch_failed(
                        CatalogResource::Product,
                        &e,
                    ));
                    return None;
                }
            }
        }

        self.events.record(StoreEvent::ProductNotFound {
            product_id: product_id.to_string(),
        });
        None
    }

    // =========================================================================
    // Bag
    // =========================================================================

    pub fn bag(&self) -> &Bag {
        &self.bag
    }

    /// Adds `quantity` of a variation to the bag.
    ///
    /// A missing product, an empty product id, a zero quantity or an
    /// overflowing total is rejected: reported, no change, `Unchanged`.
    pub fn add_item(
        &mut self,
        product: Option<&Arc<Product>>,
        color: &str,
        size: &str,
        quantity: u32,
    ) -> BagChange {
        let Some(product) = product else {
            self.reject(BagOperation::Add, "product is missing");
            return BagChange::Unchanged;
        };

        match self.bag.add_item(product, color, size, quantity) {
            Ok(change) => {
                debug!(product_id = %product.id, color, size, ?change, "Bag add");
                self.persist();
                change
            }
            Err(e) => {
                self.reject(BagOperation::Add, e.to_string());
                BagChange::Unchanged
            }
        }
    }

    /// Removes `quantity` of a variation; the line disappears at zero.
    ///
    /// A variation that isn't in the bag is a silent no-op.
    pub fn remove_item(
        &mut self,
        product: Option<&Product>,
        color: &str,
        size: &str,
        quantity: u32,
    ) -> BagChange {
        let Some(product) = product else {
            self.reject(BagOperation::Remove, "product is missing");
            return BagChange::Unchanged;
        };

        match self.bag.remove_item(product, color, size, quantity) {
            Ok(change) => {
                debug!(product_id = %product.id, color, size, ?change, "Bag remove");
                if change.is_mutation() {
                    self.persist();
                }
                change
            }
            Err(e) => {
                self.reject(BagOperation::Remove, e.to_string());
                BagChange::Unchanged
            }
        }
    }

    /// Current quantity of a variation, 0 if absent.
    pub fn quantity_of(&self, product_id: &str, color: &str, size: &str) -> u32 {
        self.bag.quantity_of(product_id, color, size)
    }

    /// Empties the bag.
    pub fn clear_bag(&mut self) {
        self.bag.clear();
        debug!("Bag cleared");
        self.persist();
    }

    /// Bag subtotal (sum of line totals).
    pub fn bag_subtotal(&self) -> CoreResult<Money> {
        self.bag.subtotal()
    }

    fn reject(&self, operation: BagOperation, reason: impl Into<String>) {
        self.events.record(StoreEvent::BagInputRejected {
            operation,
            reason: reason.into(),
        });
    }

    // =========================================================================
    // Order
    // =========================================================================

    pub fn delivery_details(&self) -> &DeliveryDetails {
        &self.delivery_details
    }

    pub fn order_status(&self) -> OrderStatus {
        self.order_status
    }

    /// Merge-patches the delivery details.
    pub fn set_delivery_details(&mut self, patch: DeliveryDetailsPatch) {
        self.delivery_details.apply(patch);
        self.persist();
    }

    /// Records the confirmation email outcome; always confirms payment too.
    pub fn set_order_email_status(&mut self, sent: bool) {
        self.order_status.set_email_status(sent);
        info!(email_sent = sent, "Order status updated");
        self.persist();
    }

    /// Resets both order flags.
    pub fn clear_order_status(&mut self) {
        self.order_status.clear();
        self.persist();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use boutique_catalog::InMemoryCatalog;

    use super::*;
    use crate::state::events::RecordingSink;
    use crate::state::persist::MemorySnapshotSink;

    fn product(id: &str, category: &str) -> Arc<Product> {
        Arc::new(Product::new(id, category).with_price(Money::from_cents(1000)))
    }

    fn setup() -> (StorefrontState, Arc<RecordingSink>, Arc<MemorySnapshotSink>) {
        let events = Arc::new(RecordingSink::new());
        let sink = Arc::new(MemorySnapshotSink::new());
        let state = StorefrontState::new(events.clone()).with_persistence(sink.clone());
        (state, events, sink)
    }

    fn fixture() -> InMemoryCatalog {
        InMemoryCatalog::new(
            vec![Category::new("c1", "Shirts")],
            vec![
                Product::new("p1", "c1").with_name("Linen"),
                Product::new("p2", "c2").with_name("Mug"),
            ],
        )
    }

    #[test]
    fn test_add_accumulates_then_remove_empties() {
        let (mut state, events, _) = setup();
        let p1 = product("p1", "c1");

        assert_eq!(
            state.add_item(Some(&p1), "red", "M", 2),
            BagChange::Added { quantity: 2 }
        );
        assert_eq!(
            state.add_item(Some(&p1), "red", "M", 1),
            BagChange::Updated { quantity: 3 }
        );
        assert_eq!(state.bag().line_count(), 1);
        assert_eq!(state.quantity_of("p1", "red", "M"), 3);

        assert_eq!(
            state.remove_item(Some(&*p1), "red", "M", 3),
            BagChange::Removed
        );
        assert!(state.bag().is_empty());
        assert!(events.is_empty());
    }

    #[test]
    fn test_rejected_input_is_reported_and_not_persisted() {
        let (mut state, events, sink) = setup();

        assert_eq!(state.add_item(None, "red", "M", 1), BagChange::Unchanged);
        assert_eq!(
            state.add_item(Some(&product("", "c1")), "red", "M", 1),
            BagChange::Unchanged
        );
        assert_eq!(
            state.add_item(Some(&product("p1", "c1")), "red", "M", 0),
            BagChange::Unchanged
        );
        assert_eq!(state.remove_item(None, "red", "M", 1), BagChange::Unchanged);

        let recorded = events.events();
        assert_eq!(recorded.len(), 4);
        assert!(recorded
            .iter()
            .all(|e| matches!(e, StoreEvent::BagInputRejected { .. })));
        assert!(state.bag().is_empty());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_overflow_is_rejected() {
        let (mut state, events, _) = setup();
        let p1 = product("p1", "c1");

        state.add_item(Some(&p1), "red", "M", u32::MAX);
        assert_eq!(state.add_item(Some(&p1), "red", "M", 1), BagChange::Unchanged);
        assert_eq!(state.quantity_of("p1", "red", "M"), u32::MAX);
        assert_eq!(events.events().len(), 1);
    }

    #[test]
    fn test_every_mutation_persists_once() {
        let (mut state, _, sink) = setup();
        let p1 = product("p1", "c1");

        state.add_item(Some(&p1), "red", "M", 1);
        // Removing an absent variation changes nothing
        state.remove_item(Some(&*p1), "blue", "M", 1);
        state.set_delivery_details(DeliveryDetailsPatch {
            city: Some("Paris".into()),
            ..Default::default()
        });
        state.set_order_email_status(true);
        state.clear_order_status();
        state.clear_bag();

        assert_eq!(sink.len(), 5);
    }

    #[test]
    fn test_order_status_quirk() {
        let (mut state, _, _) = setup();

        state.clear_order_status();
        state.set_order_email_status(true);
        assert_eq!(
            state.order_status(),
            OrderStatus { email_sent: true, payment_confirmed: true }
        );

        state.set_order_email_status(false);
        assert_eq!(
            state.order_status(),
            OrderStatus { email_sent: false, payment_confirmed: true }
        );

        state.clear_order_status();
        assert_eq!(state.order_status(), OrderStatus::default());
    }

    #[test]
    fn test_delivery_details_merge() {
        let (mut state, _, _) = setup();

        state.set_delivery_details(DeliveryDetailsPatch {
            first_name: Some("Ada".into()),
            email: Some("ada@example.com".into()),
            ..Default::default()
        });
        state.set_delivery_details(DeliveryDetailsPatch {
            city: Some("London".into()),
            ..Default::default()
        });

        let details = state.delivery_details();
        assert_eq!(details.first_name, "Ada");
        assert_eq!(details.email, "ada@example.com");
        assert_eq!(details.city, "London");
    }

    #[tokio::test]
    async fn test_refresh_builds_grouping() {
        let (mut state, events, _) = setup();
        let source = fixture();

        assert!(state.refresh_categories(&source).await);
        // Products not loaded yet
        assert!(state.grouped_by_category().is_empty());

        assert!(state.refresh_products(&source).await);
        let group = state.category_group("c1").unwrap();
        assert_eq!(group.product_ids(), vec!["p1"]);
        assert!(!state.grouped_by_category().contains_key("c2"));
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_lists() {
        let (mut state, events, sink) = setup();
        let source = fixture();

        state.refresh_categories(&source).await;
        state.refresh_products(&source).await;
        let persisted = sink.len();

        source.set_available(false);
        assert!(!state.refresh_products(&source).await);
        assert!(!state.refresh_categories(&source).await);

        assert_eq!(state.products().len(), 2);
        assert_eq!(state.categories().len(), 1);
        assert!(state.grouped_by_category().contains_key("c1"));
        assert_eq!(sink.len(), persisted);

        let recorded = events.events();
        assert_eq!(recorded.len(), 2);
        assert!(matches!(
            recorded[0],
            StoreEvent::CatalogFetchFailed {
                resource: CatalogResource::Products,
                transient: true,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_find_product_reports_miss() {
        let (mut state, events, _) = setup();
        state.refresh_products(&fixture()).await;

        assert_eq!(state.find_product("p2").unwrap().name, "Mug");
        assert!(state.find_product("p9").is_none());
        assert_eq!(
            events.events(),
            vec![StoreEvent::ProductNotFound {
                product_id: "p9".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_resolve_product_falls_back_to_remote() {
        let (state, events, _) = setup();
        let source = fixture();

        // Cache is empty, the remote store has it
        let p1 = state.resolve_product(&source, "c1", "p1").await.unwrap();
        assert_eq!(p1.name, "Linen");
        assert!(state.products().is_empty());

        // Wrong category is a miss
        assert!(state.resolve_product(&source, "c1", "p2").await.is_none());

        // Remote outage is a fetch failure
        source.set_available(false);
        assert!(state.resolve_product(&source, "c1", "p1").await.is_none());

        let recorded = events.events();
        assert!(matches!(recorded[0], StoreEvent::ProductNotFound { .. }));
        assert!(matches!(
            recorded[1],
            StoreEvent::CatalogFetchFailed {
                resource: CatalogResource::Product,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_resolve_product_prefers_cache() {
        let (mut state, _, _) = setup();
        let source = fixture();
        state.refresh_products(&source).await;
        let before = source.request_count();

        let p1 = state.resolve_product(&source, "c1", "p1").await.unwrap();
        assert!(Arc::ptr_eq(&p1, &state.products()[0]));
        assert_eq!(source.request_count(), before);
    }

    #[tokio::test]
    async fn test_snapshot_restore_round_trip() {
        let (mut state, _, sink) = setup();
        let source = fixture();
        state.refresh_categories(&source).await;
        state.refresh_products(&source).await;

        let p1 = state.find_product("p1").unwrap();
        state.add_item(Some(&p1), "red", "M", 2);
        state.set_order_email_status(false);

        let blob = sink.latest().unwrap();
        let events = Arc::new(RecordingSink::new());
        let restored = StorefrontState::restore(Some(blob.as_slice()), events.clone());

        assert_eq!(restored.categories().len(), 1);
        assert_eq!(restored.products().len(), 2);
        assert_eq!(restored.category_group("c1").unwrap().product_ids(), vec!["p1"]);
        assert_eq!(restored.quantity_of("p1", "red", "M"), 2);
        assert_eq!(
            restored.order_status(),
            OrderStatus { email_sent: false, payment_confirmed: true }
        );
        assert!(events.is_empty());
    }

    #[test]
    fn test_restore_rejects_garbage() {
        let events = Arc::new(RecordingSink::new());
        let state = StorefrontState::restore(Some(&b"{not json"[..]), events.clone());

        assert!(state.bag().is_empty());
        assert!(state.categories().is_empty());
        assert!(matches!(
            events.events().as_slice(),
            [StoreEvent::SnapshotRejected { .. }]
        ));

        let quiet = Arc::new(RecordingSink::new());
        StorefrontState::restore(None, quiet.clone());
        assert!(quiet.is_empty());
    }
}
