//! # Backend contracts
//!
//! The order flow is provider-agnostic. Anything that wants to act as its backend implements these traits.
//!
//! * [`OrderManagement`] persists orders and their line items, and owns the conditional status transition that makes
//!   callback handling idempotent.
//! * [`CustomerManagement`] resolves buyers to customer records.
//! * [`CatalogManagement`] is a read-only view of the ticket catalog, used to price new orders.
//! * [`TicketOrderDatabase`] bundles the three for a single database backend.
//! * [`FulfillmentProvider`] registers a paid order with the downstream ticketing system.
//! * [`TicketMailer`] delivers the tickets to the buyer.
mod catalog_management;
mod customer_management;
mod data_objects;
mod fulfillment;
mod mailer;
mod order_management;
mod ticket_order_database;

pub use catalog_management::{CatalogError, CatalogManagement};
pub use customer_management::{CustomerError, CustomerManagement};
pub use data_objects::{FulfillmentResult, ItemSummary, TicketArtifact, TicketEmail};
pub use fulfillment::{FulfillmentError, FulfillmentProvider};
pub use mailer::{MailerError, TicketMailer};
pub use order_management::{OrderManagement, OrderQueryFilter, OrderStoreError, MAX_ORDER_NO_ATTEMPTS};
pub use ticket_order_database::TicketOrderDatabase;
