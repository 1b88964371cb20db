//! Error types for the shared crate

use thiserror::Error;

/// A device kind name that maps to no [`DeviceKind`](crate::DeviceKind)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Device type '{0}' not implemented")]
pub struct UnknownKind(pub String);
