//! HTTP server module.
//!
//! Serves the router on plain HTTP (TLS is expected to terminate at a reverse
//! proxy) and drains connections on SIGTERM/SIGINT.

mod server;
mod shutdown;

pub use server::{listen_addr, start_server, ServerError};
