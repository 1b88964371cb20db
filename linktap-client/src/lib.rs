//! LinkTap Client - HTTP client for the LinkTap cloud API
//!
//! Every call is a JSON `POST` to `<base>/api/<method>` carrying the account
//! credentials. Responses are unwrapped from the `{"result": ...}` envelope
//! into typed records or a [`ClientError`].

pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use config::{ClientConfig, Credentials};
pub use error::{ClientError, ClientResult};
pub use http::{HttpClient, LinkTapApi};
pub use types::{WateringMode, WateringStatus};

// Re-export shared types for convenience
pub use shared::{Gateway, Inventory, Taplinker};
