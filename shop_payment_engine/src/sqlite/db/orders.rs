use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{NewOrder, Order, OrderCode, OrderItem, OrderStatus};

/// Inserts a new order together with its items using the given connection. This is not atomic on its own. You can
/// embed this call inside a transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection
/// argument.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let mut inserted: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                user_id,
                total_amount,
                status
            ) VALUES ($1, $2, $3)
            RETURNING *;
        "#,
    )
    .bind(order.user_id)
    .bind(order.total_amount.value())
    .bind(OrderStatus::Pending)
    .fetch_one(&mut *conn)
    .await?;
    for item in order.items {
        let item: OrderItem = sqlx::query_as(
            "INSERT INTO order_items (order_id, product_id, quantity, unit_price) VALUES ($1, $2, $3, $4) \
             RETURNING *",
        )
        .bind(inserted.id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.unit_price.value())
        .fetch_one(&mut *conn)
        .await?;
        inserted.items.push(item);
    }
    debug!("📝️ Order inserted with id {} ({} items)", inserted.id, inserted.items.len());
    Ok(inserted)
}

pub async fn fetch_order_items(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id").bind(order_id).fetch_all(conn).await
}

async fn with_items(order: Option<Order>, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    match order {
        Some(mut order) => {
            order.items = fetch_order_items(order.id, conn).await?;
            Ok(Some(order))
        },
        None => Ok(None),
    }
}

pub async fn fetch_order_by_id(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(order_id).fetch_optional(&mut *conn).await?;
    with_items(order, conn).await
}

pub async fn fetch_order_by_code(
    order_code: &OrderCode,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE order_code = $1")
        .bind(order_code.as_str())
        .fetch_optional(&mut *conn)
        .await?;
    with_items(order, conn).await
}

/// All orders for the user, items resolved, most recent first.
pub async fn fetch_orders_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders: Vec<Order> = sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC")
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;
    let mut result = Vec::with_capacity(orders.len());
    for mut order in orders {
        order.items = fetch_order_items(order.id, &mut *conn).await?;
        result.push(order);
    }
    Ok(result)
}

/// Unconditionally overwrites the order status. Returns `None` when no such order exists.
pub async fn update_order_status(
    order_id: i64,
    status: OrderStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *")
            .bind(status)
            .bind(order_id)
            .fetch_optional(&mut *conn)
            .await?;
    with_items(order, conn).await
}

/// Attaches the payment-gateway correlation data to the order. Returns `None` when no such order exists.
pub async fn attach_payment_info(
    order_id: i64,
    order_code: &OrderCode,
    transaction_id: &str,
    payment_link: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        "UPDATE orders SET order_code = $1, transaction_id = $2, payment_link = $3, updated_at = CURRENT_TIMESTAMP \
         WHERE id = $4 RETURNING *",
    )
    .bind(order_code.as_str())
    .bind(transaction_id)
    .bind(payment_link)
    .bind(order_id)
    .fetch_optional(&mut *conn)
    .await?;
    with_items(order, conn).await
}

/// Records the payment timestamp for the order with the given code. COALESCE keeps the first timestamp in place, so
/// a replayed payment notification never moves it. Returns `None` when no such order exists.
pub async fn mark_paid(order_code: &OrderCode, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        "UPDATE orders SET paid_at = COALESCE(paid_at, CURRENT_TIMESTAMP), updated_at = CURRENT_TIMESTAMP \
         WHERE order_code = $1 RETURNING *",
    )
    .bind(order_code.as_str())
    .fetch_optional(&mut *conn)
    .await?;
    with_items(order, conn).await
}
