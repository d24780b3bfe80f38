//! HTTP handlers for the ask-proxy service.

pub mod ask;
pub mod health;
pub mod metrics;
