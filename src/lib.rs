//! # gateway-sdk - payment gateway session client
//!
//! Updates a payment gateway session with card details over HTTPS. Trust is
//! pinned to the gateway's root certificate plus any certificates the
//! application registers; the platform's default roots are never used.
//!
//! Each request is a lazy [`GatewayCall`]: await it for a single result, or
//! [`deliver`](GatewayCall::deliver) it to a [`CallbackQueue`] to have the
//! outcome handed to a callback on the context that owns the queue.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod redact;
pub mod tls;
pub mod trust;
pub mod types;

// Re-exports for convenience
pub use client::Gateway;
pub use config::GatewayConfig;
pub use dispatch::{CallbackQueue, GatewayCall, GatewayCallback};
pub use error::{Result, GatewayError};
pub use trust::{TrustStore, TrustedCertificate};
pub use types::*;

/// Current version of the SDK
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `User-Agent` sent with every request
pub const USER_AGENT: &str = concat!("Gateway-Rust-SDK/", env!("CARGO_PKG_VERSION"));
