//! Friendo - Task & Energy Tracking Backend
//!
//! Backend service for the Friendo application.
//!
//! ## Features
//!
//! - REST API server with health endpoint
//! - API request/response capture middleware (debug mode) that records
//!   every in-scope call to an append-only log file
//! - CORS configuration for the frontend
//! - Environment-variable based configuration

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod sink;

pub use config::Config;
pub use error::{FriendoError, Result};
