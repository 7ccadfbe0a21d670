use sqlx::SqliteConnection;
use spg_common::Vnd;

use crate::db_types::Product;

pub async fn fetch_product(product_id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product =
        sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(product_id).fetch_optional(conn).await?;
    Ok(product)
}

/// Inserts a product row. Catalog management is not part of this service; this exists for seeding and tooling.
pub async fn insert_product(name: &str, price: Vnd, conn: &mut SqliteConnection) -> Result<Product, sqlx::Error> {
    let product = sqlx::query_as("INSERT INTO products (name, price) VALUES ($1, $2) RETURNING *")
        .bind(name)
        .bind(price.value())
        .fetch_one(conn)
        .await?;
    Ok(product)
}
