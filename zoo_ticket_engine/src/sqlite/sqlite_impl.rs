//! `SqliteDatabase` is the SQLite implementation of the order-flow backend. It implements all the traits defined in the
//! [`crate::traits`] module.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate, migrate::MigrateError, SqlitePool};

use super::db::{catalog, customers, db_url, new_pool, orders};
use crate::{
    db_types::{Customer, NewCustomer, NewOrder, OrderItem, OrderNo, OrderTicketGroup, StatusUpdate, StatusUpdateResult, TicketGroup},
    helpers::new_order_no,
    traits::{
        CatalogError,
        CatalogManagement,
        CustomerError,
        CustomerManagement,
        OrderManagement,
        OrderQueryFilter,
        OrderStoreError,
        TicketOrderDatabase,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl TicketOrderDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn close(&mut self) -> Result<(), OrderStoreError> {
        self.pool.close().await;
        Ok(())
    }
}

impl OrderManagement for SqliteDatabase {
    async fn create_order(&self, order: NewOrder) -> Result<OrderTicketGroup, OrderStoreError> {
        orders::create_order(&order, &self.pool, new_order_no).await
    }

    async fn fetch_order_by_order_no(&self, order_no: &OrderNo) -> Result<Option<OrderTicketGroup>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_order_no(order_no, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_id(&self, id: i64) -> Result<Option<OrderTicketGroup>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let items = orders::fetch_order_items(order_id, &mut conn).await?;
        Ok(items)
    }

    async fn fetch_orders(&self, filter: OrderQueryFilter) -> Result<Vec<OrderTicketGroup>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::search_orders(filter, &mut conn).await?;
        Ok(orders)
    }

    async fn update_order_status(
        &self,
        order_no: &OrderNo,
        update: StatusUpdate,
    ) -> Result<StatusUpdateResult, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::update_order_status(order_no, update, &mut conn).await
    }

    async fn mark_email_sent(&self, id: i64) -> Result<bool, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let updated = orders::mark_email_sent(id, &mut conn).await?;
        if !updated {
            warn!("🗃️ Order {id} was not marked as emailed. It is either missing or not in success status");
        }
        Ok(updated)
    }
}

impl CustomerManagement for SqliteDatabase {
    async fn fetch_customer(&self, cust_id: i64) -> Result<Option<Customer>, CustomerError> {
        let mut conn = self.pool.acquire().await?;
        let customer = customers::fetch_customer_by_id(cust_id, &mut conn).await?;
        Ok(customer)
    }

    async fn fetch_customer_by_email(&self, email: &str) -> Result<Option<Customer>, CustomerError> {
        let mut conn = self.pool.acquire().await?;
        let customer = customers::fetch_customer_by_email(email, &mut conn).await?;
        Ok(customer)
    }

    async fn fetch_or_create_customer(&self, customer: NewCustomer) -> Result<Customer, CustomerError> {
        if customer.email.trim().is_empty() {
            return Err(CustomerError::MissingEmail);
        }
        let mut conn = self.pool.acquire().await?;
        let customer = customers::fetch_or_create_customer(customer, &mut conn).await?;
        Ok(customer)
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_ticket_group(&self, id: i64) -> Result<Option<TicketGroup>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let group = catalog::fetch_ticket_group(id, &mut conn).await?;
        Ok(group)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the `DATABASE_URL` environment variable (or the default).
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Applies any outstanding schema migrations.
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations are up to date");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
