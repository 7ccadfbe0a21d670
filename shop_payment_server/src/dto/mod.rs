pub mod carts;
pub mod orders;

pub use carts::CartLineResponse;
pub use orders::{OrderItemResponse, OrderResponse};
