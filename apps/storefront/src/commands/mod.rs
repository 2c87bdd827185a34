//! # Commands Module
//!
//! Everything the `boutique` CLI can ask of the state container.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── catalog.rs   ◄─── Refresh, category listing, product lookup
//! ├── bag.rs       ◄─── Bag manipulation
//! └── checkout.rs  ◄─── Delivery details, order placement, order status
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  $ boutique bag add p1 --color red --size M --quantity 2               │
//! │         │                                                               │
//! │         │ clap parses args (main.rs)                                   │
//! │         ▼                                                               │
//! │  commands::bag::add_to_bag(                                            │
//! │      state: &mut StorefrontState,  ◄── restored at startup             │
//! │      product_id, color, size, quantity                                 │
//! │  ) -> AppResult<BagResponse>                                           │
//! │         │                                                               │
//! │         │ serde_json                                                    │
//! │         ▼                                                               │
//! │  stdout: { "items": [...], "totals": {...} }                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands validate input up front and turn the container's silent
//! no-ops into [`AppError`](crate::error::AppError)s; the container itself
//! never fails.

pub mod bag;
pub mod catalog;
pub mod checkout;
