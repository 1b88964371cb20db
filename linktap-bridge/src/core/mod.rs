//! Configuration, errors and the bridge state

pub mod config;
pub mod error;
pub mod state;

pub use config::Config;
pub use error::{BridgeError, BridgeResult};
pub use state::BridgeState;
