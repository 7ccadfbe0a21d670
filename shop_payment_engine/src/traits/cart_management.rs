use crate::{db_types::CartLine, traits::StorefrontError};

/// Per-user shopping cart behaviour.
///
/// A user has at most one cart, created lazily on the first add. A cart holds at most one line per product; adding a
/// product that is already present merges into the existing line.
#[allow(async_fn_in_trait)]
pub trait CartManagement {
    /// Adds `quantity` of the product to the user's cart.
    ///
    /// Fails with [`StorefrontError::ProductNotFound`] if the product is unknown. If a line for the product already
    /// exists, its quantity is incremented; otherwise a new line is inserted with a unit-price snapshot copied from
    /// the product. Returns the resulting line.
    async fn add_cart_item(&self, user_id: i64, product_id: i64, quantity: i64)
        -> Result<CartLine, StorefrontError>;

    /// Returns the user's cart lines with product names resolved. An absent cart yields an empty list, not an error.
    async fn cart_lines(&self, user_id: i64) -> Result<Vec<CartLine>, StorefrontError>;

    /// Overwrites the quantity on an existing line, refreshing the unit-price snapshot from the product.
    ///
    /// A missing cart or line is a silent no-op (`Ok(None)`); an unknown product is an error.
    async fn update_cart_quantity(
        &self,
        user_id: i64,
        product_id: i64,
        quantity: i64,
    ) -> Result<Option<CartLine>, StorefrontError>;

    /// Deletes the line for the given product. Fails with [`StorefrontError::CartNotFound`] or
    /// [`StorefrontError::CartItemNotFound`] when absent. The deletion is durably visible to an immediately
    /// following read.
    async fn remove_cart_item(&self, user_id: i64, product_id: i64) -> Result<(), StorefrontError>;
}
