use std::fmt::Debug;

use crate::{
    db_types::{OrderDetail, OrderNo, OrderTicketGroup},
    traits::{OrderManagement, OrderQueryFilter, OrderStoreError},
};

/// Read-only access to orders.
pub struct OrderQueryApi<B> {
    db: B,
}

impl<B> Debug for OrderQueryApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderQueryApi")
    }
}

impl<B> OrderQueryApi<B>
where B: OrderManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn fetch_orders(&self, filter: OrderQueryFilter) -> Result<Vec<OrderTicketGroup>, OrderStoreError> {
        self.db.fetch_orders(filter).await
    }

    pub async fn fetch_order(&self, id: i64) -> Result<Option<OrderTicketGroup>, OrderStoreError> {
        self.db.fetch_order_by_id(id).await
    }

    pub async fn fetch_order_by_order_no(&self, order_no: &OrderNo) -> Result<Option<OrderTicketGroup>, OrderStoreError> {
        self.db.fetch_order_by_order_no(order_no).await
    }

    /// The order together with its line items.
    pub async fn fetch_order_detail(&self, id: i64) -> Result<Option<OrderDetail>, OrderStoreError> {
        let order = match self.db.fetch_order_by_id(id).await? {
            Some(o) => o,
            None => return Ok(None),
        };
        let items = self.db.fetch_order_items(order.id).await?;
        Ok(Some(OrderDetail { order, items }))
    }
}
