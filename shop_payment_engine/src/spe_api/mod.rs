pub mod cart_api;
pub mod order_flow_api;
pub mod order_query_api;
