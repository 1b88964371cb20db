use linktap_client::ClientError;
use shared::UnknownKind;
use thiserror::Error;

/// Highest unit slot a host accepts per hardware instance
pub const MAX_SLOT: u8 = 255;

#[derive(Error, Debug)]
pub enum BridgeError {
    /// Transport, parse or service-reported failure of a remote call
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Maximum of {max} devices per hardware has been reached, can't create any more devices")]
    CapacityExceeded { max: u8 },

    #[error(transparent)]
    UnknownKind(#[from] UnknownKind),

    #[error("Unknown level received ({0})")]
    UnknownLevel(i32),

    #[error("No device with unit {0}")]
    UnknownUnit(u8),

    /// Discovery has not seen this taplinker yet
    #[error("Gateway of taplinker {0} is unknown")]
    GatewayUnknown(String),

    #[error("Host error: {0}")]
    Host(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BridgeError {
    pub fn host(message: impl Into<String>) -> Self {
        BridgeError::Host(message.into())
    }
}

/// Result type for bridge operations
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;
