pub mod errors;
pub mod order_flow_api;
pub mod order_objects;
pub mod order_query_api;
