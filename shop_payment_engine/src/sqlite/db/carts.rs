use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};
use spg_common::Vnd;

use crate::db_types::{Cart, CartLine};

/// Returns the user's cart, or `None` if one has never been created.
pub async fn fetch_cart(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<Cart>, sqlx::Error> {
    let cart =
        sqlx::query_as("SELECT * FROM carts WHERE user_id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(cart)
}

/// Returns the user's cart, creating an empty one if it does not exist yet.
pub async fn fetch_or_create_cart(user_id: i64, conn: &mut SqliteConnection) -> Result<Cart, sqlx::Error> {
    if let Some(cart) = fetch_cart(user_id, &mut *conn).await? {
        return Ok(cart);
    }
    let cart: Cart = sqlx::query_as("INSERT INTO carts (user_id) VALUES ($1) RETURNING *")
        .bind(user_id)
        .fetch_one(conn)
        .await?;
    debug!("🛒️ Created cart #{} for user {user_id}", cart.id);
    Ok(cart)
}

/// The user's cart lines with product names resolved. An absent cart simply yields no rows.
pub async fn fetch_cart_lines(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<CartLine>, sqlx::Error> {
    let lines = sqlx::query_as(
        r#"
        SELECT
            cart_items.id as id,
            cart_items.product_id as product_id,
            products.name as product_name,
            quantity,
            unit_price
        FROM cart_items
            JOIN carts ON cart_items.cart_id = carts.id
            JOIN products ON cart_items.product_id = products.id
        WHERE carts.user_id = $1
        ORDER BY cart_items.id
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    Ok(lines)
}

pub async fn fetch_cart_line(
    user_id: i64,
    product_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<CartLine>, sqlx::Error> {
    let line = sqlx::query_as(
        r#"
        SELECT
            cart_items.id as id,
            cart_items.product_id as product_id,
            products.name as product_name,
            quantity,
            unit_price
        FROM cart_items
            JOIN carts ON cart_items.cart_id = carts.id
            JOIN products ON cart_items.product_id = products.id
        WHERE carts.user_id = $1 AND cart_items.product_id = $2
        "#,
    )
    .bind(user_id)
    .bind(product_id)
    .fetch_optional(conn)
    .await?;
    Ok(line)
}

/// Adds to the cart, merging into an existing line for the same product so that at most one line per (cart, product)
/// ever exists. The unit-price snapshot of a merged line is left as it was taken at first add.
pub async fn upsert_cart_item(
    cart_id: i64,
    product_id: i64,
    quantity: i64,
    unit_price: Vnd,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO cart_items (cart_id, product_id, quantity, unit_price) VALUES ($1, $2, $3, $4)
        ON CONFLICT (cart_id, product_id) DO UPDATE SET quantity = quantity + excluded.quantity
        "#,
    )
    .bind(cart_id)
    .bind(product_id)
    .bind(quantity)
    .bind(unit_price.value())
    .execute(conn)
    .await?;
    Ok(())
}

/// Overwrites the quantity on an existing line and refreshes its unit-price snapshot. The stored price is always a
/// unit price; line subtotals are computed at read time. Returns the number of rows affected (0 when the line does
/// not exist).
pub async fn set_quantity(
    cart_id: i64,
    product_id: i64,
    quantity: i64,
    unit_price: Vnd,
    conn: &mut SqliteConnection,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE cart_items SET quantity = $1, unit_price = $2 WHERE cart_id = $3 AND product_id = $4",
    )
    .bind(quantity)
    .bind(unit_price.value())
    .bind(cart_id)
    .bind(product_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// Deletes the line for the given product. Returns the number of rows affected (0 when the line does not exist).
pub async fn delete_cart_item(
    cart_id: i64,
    product_id: i64,
    conn: &mut SqliteConnection,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
        .bind(cart_id)
        .bind(product_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Deletes exactly the given cart lines. Used at checkout with the line ids loaded at the start of placement, so
/// that lines added concurrently during checkout are not swept up.
pub async fn delete_cart_lines(line_ids: &[i64], conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    if line_ids.is_empty() {
        return Ok(0);
    }
    let mut builder = QueryBuilder::new("DELETE FROM cart_items WHERE id IN (");
    let mut separated = builder.separated(", ");
    for id in line_ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(")");
    trace!("🛒️ Executing query: {}", builder.sql());
    let result = builder.build().execute(conn).await?;
    Ok(result.rows_affected())
}
