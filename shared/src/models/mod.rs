//! Data models
//!
//! `gateway` holds the remote inventory as the LinkTap API reports it,
//! `device` holds the host-side view of the same valves.

pub mod device;
pub mod gateway;

// Re-exports
pub use device::*;
pub use gateway::*;
