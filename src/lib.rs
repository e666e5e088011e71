//! Coffee Service - health checks and drink recommendations over HTTP
//!
//! Exposes liveness and dependency health endpoints plus a recommendation
//! endpoint backed by an upstream beverage API.

pub mod coffee;
pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::*;
