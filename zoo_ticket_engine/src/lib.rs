//! Zoo Ticket Engine
//!
//! The provider-agnostic core of the zoo ticketing backend: everything between "a customer wants tickets" and "the
//! tickets are in their inbox".
//!
//! 1. Backend contracts ([`traits`]) and a SQLite implementation ([`SqliteDatabase`]). The order store guarantees
//!    unique order numbers and a compare-and-swap status transition out of `pending`.
//! 2. The order service ([`OrderFlowApi`]): order creation, payment callback handling, and the fulfillment and email
//!    chain that follows a successful payment. [`OrderQueryApi`] provides read-only access for the HTTP layer.
//! 3. Helpers ([`mod@helpers`]): the payment envelope codec that decrypts the gateway's callback payload, the status
//!    code map and the order-number generator.
pub mod db_types;
pub mod helpers;
pub mod traits;

mod ticket_api;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::{db as sqlite_db, SqliteDatabase};
pub use ticket_api::{
    errors::OrderFlowError,
    order_flow_api::{OrderFlowApi, OrderFlowConfig},
    order_objects,
    order_query_api::OrderQueryApi,
};
