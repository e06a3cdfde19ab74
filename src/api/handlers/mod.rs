//! API request handlers

pub mod health;
