use sqlx::SqliteConnection;

use crate::db_types::{Cents, TicketGroup, TicketVariant};

pub async fn fetch_ticket_group(id: i64, conn: &mut SqliteConnection) -> Result<Option<TicketGroup>, sqlx::Error> {
    let group: Option<TicketGroup> =
        sqlx::query_as("SELECT * FROM ticket_groups WHERE id = $1").bind(id).fetch_optional(&mut *conn).await?;
    match group {
        Some(mut group) => {
            group.variants = fetch_variants_for_group(id, conn).await?;
            Ok(Some(group))
        },
        None => Ok(None),
    }
}

pub async fn fetch_variants_for_group(
    ticket_group_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<TicketVariant>, sqlx::Error> {
    let variants = sqlx::query_as("SELECT * FROM ticket_variants WHERE ticket_group_id = $1 ORDER BY id")
        .bind(ticket_group_id)
        .fetch_all(conn)
        .await?;
    Ok(variants)
}

pub async fn insert_ticket_group(
    name: &str,
    description: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<i64, sqlx::Error> {
    let id: (i64,) = sqlx::query_as("INSERT INTO ticket_groups (name, description) VALUES ($1, $2) RETURNING id")
        .bind(name)
        .bind(description)
        .fetch_one(conn)
        .await?;
    Ok(id.0)
}

pub async fn insert_ticket_variant(
    ticket_group_id: i64,
    name: &str,
    unit_price: Cents,
    conn: &mut SqliteConnection,
) -> Result<i64, sqlx::Error> {
    let id: (i64,) = sqlx::query_as(
        "INSERT INTO ticket_variants (ticket_group_id, name, unit_price) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(ticket_group_id)
    .bind(name)
    .bind(unit_price.value())
    .fetch_one(conn)
    .await?;
    Ok(id.0)
}
