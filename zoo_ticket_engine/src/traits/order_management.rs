use thiserror::Error;

use crate::db_types::{NewOrder, OrderItem, OrderNo, OrderTicketGroup, StatusUpdate, StatusUpdateResult};

/// How many fresh order numbers are tried before giving up on an insert.
pub const MAX_ORDER_NO_ATTEMPTS: usize = 5;

#[derive(Debug, Clone, Error)]
pub enum OrderStoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Could not allocate a unique order number after {0} attempts")]
    OrderNoExhausted(usize),
    #[error("The order {0} does not exist")]
    OrderNotFound(OrderNo),
    #[error("The order with id {0} does not exist")]
    OrderIdNotFound(i64),
    #[error("An order must contain at least one item")]
    EmptyOrder,
    #[error("The order total cannot be represented")]
    AmountOutOfRange,
}

impl From<sqlx::Error> for OrderStoreError {
    fn from(e: sqlx::Error) -> Self {
        OrderStoreError::DatabaseError(e.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderQueryFilter {
    pub cust_id: Option<i64>,
}

impl OrderQueryFilter {
    pub fn for_customer(cust_id: i64) -> Self {
        Self { cust_id: Some(cust_id) }
    }
}

/// The order store.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Stores the order and its line items in a single transaction, assigning a fresh order number. If the number
    /// collides with an existing one, a new number is drawn, up to [`MAX_ORDER_NO_ATTEMPTS`] times.
    async fn create_order(&self, order: NewOrder) -> Result<OrderTicketGroup, OrderStoreError>;

    async fn fetch_order_by_order_no(&self, order_no: &OrderNo) -> Result<Option<OrderTicketGroup>, OrderStoreError>;

    async fn fetch_order_by_id(&self, id: i64) -> Result<Option<OrderTicketGroup>, OrderStoreError>;

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, OrderStoreError>;

    /// Orders matching the filter, newest first.
    async fn fetch_orders(&self, filter: OrderQueryFilter) -> Result<Vec<OrderTicketGroup>, OrderStoreError>;

    /// Applies the update only if the order is still `pending`. Final statuses are never overwritten, so concurrent
    /// callbacks for the same order see exactly one [`StatusUpdateResult::Transitioned`] between them.
    async fn update_order_status(
        &self,
        order_no: &OrderNo,
        update: StatusUpdate,
    ) -> Result<StatusUpdateResult, OrderStoreError>;

    /// Sets the email-sent flag. Only succeeds for orders in `success`; returns whether a row was changed.
    async fn mark_email_sent(&self, id: i64) -> Result<bool, OrderStoreError>;
}
