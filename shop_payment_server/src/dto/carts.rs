use serde::{Deserialize, Serialize};
use shop_payment_engine::db_types::CartLine;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineResponse {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    /// Unit price in whole đồng.
    pub price: i64,
}

impl From<CartLine> for CartLineResponse {
    fn from(line: CartLine) -> Self {
        Self {
            id: line.id,
            product_id: line.product_id,
            product_name: line.product_name,
            quantity: line.quantity,
            price: line.unit_price.value(),
        }
    }
}
