use log::{debug, trace, warn};
use sqlx::{QueryBuilder, SqliteConnection, SqlitePool};

use super::is_unique_violation;
use crate::{
    db_types::{
        Cents,
        NewOrder,
        NewOrderItem,
        OrderItem,
        OrderNo,
        OrderStatus,
        OrderTicketGroup,
        StatusUpdate,
        StatusUpdateResult,
    },
    traits::{OrderQueryFilter, OrderStoreError, MAX_ORDER_NO_ATTEMPTS},
};

/// Inserts the order and its items in one transaction per attempt, drawing order numbers from `next_order_no`. A
/// collision on `order_no` rolls the attempt back and tries again with the next number.
pub async fn create_order<G>(
    order: &NewOrder,
    pool: &SqlitePool,
    mut next_order_no: G,
) -> Result<OrderTicketGroup, OrderStoreError>
where
    G: FnMut() -> OrderNo,
{
    if order.items.is_empty() {
        return Err(OrderStoreError::EmptyOrder);
    }
    let total = order.total_amount().ok_or(OrderStoreError::AmountOutOfRange)?;
    for attempt in 1..=MAX_ORDER_NO_ATTEMPTS {
        let order_no = next_order_no();
        let mut tx = pool.begin().await?;
        match insert_order(&order_no, order, total, &mut tx).await {
            Ok(saved) => {
                insert_items(saved.id, &order.items, &mut tx).await?;
                tx.commit().await?;
                debug!("🗃️ Order [{order_no}] saved with id {} after {attempt} attempt(s)", saved.id);
                return Ok(saved);
            },
            Err(e) if is_unique_violation(&e) => {
                warn!("🗃️ Order number {order_no} is already taken (attempt {attempt}/{MAX_ORDER_NO_ATTEMPTS})");
                tx.rollback().await?;
            },
            Err(e) => return Err(e.into()),
        }
    }
    Err(OrderStoreError::OrderNoExhausted(MAX_ORDER_NO_ATTEMPTS))
}

/// Inserts a new order row. This is not atomic with the line items; call it inside a transaction.
pub async fn insert_order(
    order_no: &OrderNo,
    order: &NewOrder,
    total: Cents,
    conn: &mut SqliteConnection,
) -> Result<OrderTicketGroup, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            INSERT INTO order_ticket_groups (
                order_no,
                cust_id,
                ticket_group_id,
                ticket_group_name,
                buyer_name,
                email,
                identification_no,
                contact_no,
                total_amount,
                payment_method,
                payment_type,
                status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'pending')
            RETURNING *;
        "#,
    )
    .bind(order_no.as_str())
    .bind(order.cust_id)
    .bind(order.ticket_group_id)
    .bind(&order.ticket_group_name)
    .bind(&order.buyer_name)
    .bind(&order.email)
    .bind(&order.identification_no)
    .bind(&order.contact_no)
    .bind(total.value())
    .bind(&order.payment_method)
    .bind(&order.payment_type)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

pub async fn insert_items(
    order_id: i64,
    items: &[NewOrderItem],
    conn: &mut SqliteConnection,
) -> Result<(), OrderStoreError> {
    for item in items {
        let total = item.total().ok_or(OrderStoreError::AmountOutOfRange)?;
        sqlx::query(
            r#"
            INSERT INTO order_items (order_id, ticket_variant_id, variant_name, quantity, entry_date, unit_price, total)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(order_id)
        .bind(item.ticket_variant_id)
        .bind(&item.variant_name)
        .bind(item.quantity)
        .bind(item.entry_date)
        .bind(item.unit_price.value())
        .bind(total.value())
        .execute(&mut *conn)
        .await?;
    }
    trace!("🗃️ {} items saved for order {order_id}", items.len());
    Ok(())
}

pub async fn fetch_order_by_order_no(
    order_no: &OrderNo,
    conn: &mut SqliteConnection,
) -> Result<Option<OrderTicketGroup>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM order_ticket_groups WHERE order_no = $1")
        .bind(order_no.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<OrderTicketGroup>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM order_ticket_groups WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_items(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

/// Fetches orders according to the filter, newest first.
pub async fn search_orders(
    query: OrderQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderTicketGroup>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM order_ticket_groups");
    if let Some(cust_id) = query.cust_id {
        builder.push(" WHERE cust_id = ");
        builder.push_bind(cust_id);
    }
    builder.push(" ORDER BY id DESC");
    trace!("🗃️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<OrderTicketGroup>().fetch_all(conn).await?;
    trace!("🗃️ Result of search_orders: {}", orders.len());
    Ok(orders)
}

/// Writes the callback result to the order, but only while it is `pending`. The check and the write are a single
/// statement, so two racing callbacks cannot both move the order out of `pending`.
pub async fn update_order_status(
    order_no: &OrderNo,
    update: StatusUpdate,
    conn: &mut SqliteConnection,
) -> Result<StatusUpdateResult, OrderStoreError> {
    let new_status = update.status();
    let updated: Option<OrderTicketGroup> = sqlx::query_as(
        r#"
            UPDATE order_ticket_groups SET
                status = $1,
                transaction_id = COALESCE($2, transaction_id),
                transaction_date = COALESCE($3, transaction_date),
                bank_code = COALESCE($4, bank_code),
                bank_name = COALESCE($5, bank_name),
                status_message = COALESCE($6, status_message),
                updated_at = CURRENT_TIMESTAMP
            WHERE order_no = $7 AND status = 'pending'
            RETURNING *;
        "#,
    )
    .bind(new_status.to_string())
    .bind(update.transaction_id)
    .bind(update.transaction_date)
    .bind(update.bank_code)
    .bind(update.bank_name)
    .bind(update.status_message)
    .bind(order_no.as_str())
    .fetch_optional(&mut *conn)
    .await?;
    match updated {
        Some(order) if order.status == OrderStatus::Pending => Ok(StatusUpdateResult::StillPending(order)),
        Some(order) => {
            debug!("🗃️ Order [{order_no}] moved from pending to {}", order.status);
            Ok(StatusUpdateResult::Transitioned(order))
        },
        None => {
            let order = fetch_order_by_order_no(order_no, conn)
                .await?
                .ok_or_else(|| OrderStoreError::OrderNotFound(order_no.clone()))?;
            debug!("🗃️ Order [{order_no}] is already {}. Status update to {new_status} ignored", order.status);
            Ok(StatusUpdateResult::AlreadyFinal(order))
        },
    }
}

pub async fn mark_email_sent(id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE order_ticket_groups SET is_email_sent = 1, updated_at = CURRENT_TIMESTAMP WHERE id = $1 AND status = \
         'success'",
    )
    .bind(id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}
