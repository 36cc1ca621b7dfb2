use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{Customer, NewCustomer};

/// Email addresses are compared trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn fetch_customer_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Customer>, sqlx::Error> {
    let customer = sqlx::query_as("SELECT * FROM customers WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(customer)
}

pub async fn fetch_customer_by_email(email: &str, conn: &mut SqliteConnection) -> Result<Option<Customer>, sqlx::Error> {
    let customer = sqlx::query_as("SELECT * FROM customers WHERE email = $1")
        .bind(normalize_email(email))
        .fetch_optional(conn)
        .await?;
    Ok(customer)
}

/// Registers the customer with a blank password unless the email is already known, then returns the stored record.
/// Existing records are left untouched.
pub async fn fetch_or_create_customer(
    customer: NewCustomer,
    conn: &mut SqliteConnection,
) -> Result<Customer, sqlx::Error> {
    let email = normalize_email(&customer.email);
    let result = sqlx::query(
        r#"
            INSERT INTO customers (email, full_name, identification_no, contact_no, password)
            VALUES ($1, $2, $3, $4, '')
            ON CONFLICT (email) DO NOTHING
        "#,
    )
    .bind(&email)
    .bind(customer.full_name.trim())
    .bind(customer.identification_no.trim())
    .bind(customer.contact_no.trim())
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() > 0 {
        debug!("🗃️ Registered new customer {email}");
    }
    let customer = sqlx::query_as("SELECT * FROM customers WHERE email = $1").bind(&email).fetch_one(conn).await?;
    Ok(customer)
}
