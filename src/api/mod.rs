//! HTTP API surface
//!
//! Router assembly, request handlers, and the API call capture middleware.

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;

pub use server::ApiServer;
