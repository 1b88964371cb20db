//! LinkTap Bridge - adapter between a home-automation host and LinkTap
//!
//! # Overview
//!
//! - **Reconciler** (`reconcile`): maps remote taplinkers onto host unit slots
//! - **Poller** (`poller`): heartbeat cadence, flow status refresh
//! - **Command dispatcher** (`command`): selector levels to watering modes
//! - **Host interface** (`host`): what the bridge needs from the host
//!
//! # Module layout
//!
//! ```text
//! linktap-bridge/src/
//! ├── core/          # config, errors, bridge state
//! ├── host/          # host traits, in-memory host
//! ├── reconcile/     # slot table, discovery
//! ├── poller/        # cadence, flow conversion, status refresh
//! ├── command.rs     # mode commands
//! ├── bridge.rs      # host callbacks
//! ├── runtime.rs     # heartbeat / command loop
//! └── utils/         # logging
//! ```

pub mod bridge;
pub mod command;
pub mod core;
pub mod host;
pub mod poller;
pub mod reconcile;
pub mod runtime;
pub mod utils;

// Re-export public types
pub use bridge::LinkTapBridge;
pub use crate::core::{BridgeError, BridgeResult, BridgeState, Config};
pub use host::{DeviceHost, HostPlugin, MemoryHost};
pub use poller::Cadence;
pub use runtime::UserCommand;

// Re-export logger functions
pub use utils::logger::init_logger;
