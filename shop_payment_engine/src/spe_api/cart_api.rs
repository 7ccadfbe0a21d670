use std::fmt::Debug;

use crate::{
    db_types::CartLine,
    traits::{CartManagement, StorefrontError},
};

/// `CartApi` handles the per-user shopping cart: adding products, listing the cart, changing quantities and removing
/// lines. Checkout itself lives on [`crate::OrderFlowApi`].
pub struct CartApi<B> {
    db: B,
}

impl<B> Debug for CartApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CartApi")
    }
}

impl<B> CartApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> CartApi<B>
where B: CartManagement
{
    pub async fn add_item(&self, user_id: i64, product_id: i64, quantity: i64) -> Result<CartLine, StorefrontError> {
        self.db.add_cart_item(user_id, product_id, quantity).await
    }

    pub async fn items(&self, user_id: i64) -> Result<Vec<CartLine>, StorefrontError> {
        self.db.cart_lines(user_id).await
    }

    pub async fn set_quantity(
        &self,
        user_id: i64,
        product_id: i64,
        quantity: i64,
    ) -> Result<Option<CartLine>, StorefrontError> {
        self.db.update_cart_quantity(user_id, product_id, quantity).await
    }

    pub async fn remove_item(&self, user_id: i64, product_id: i64) -> Result<(), StorefrontError> {
        self.db.remove_cart_item(user_id, product_id).await
    }
}
