// ifwatch-api: Async Rust client for the device interface management API

pub mod client;
pub mod error;
pub mod interfaces;
pub mod models;
pub mod transport;

pub use client::ApiClient;
pub use error::Error;
pub use models::{RawInterface, ToggleRequest, ToggleResponse};
pub use transport::{TlsMode, TransportConfig};
