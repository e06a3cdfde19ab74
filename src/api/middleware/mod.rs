//! API middleware

mod call_log;
mod cors;

pub use call_log::{log_api_call, DecodedBody};
pub use cors::cors_layer;
