use thiserror::Error;

use crate::address::GpibAddress;
use crate::transport::TransportError;

#[derive(Error, Debug)]
pub enum Error {
    /// Bus level failure; opening, closing or using a link
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    /// A transaction was attempted on a closed session
    #[error("Not connected to {0}")]
    NotConnected(GpibAddress),
    /// The instrument replied with something that is not what the
    /// command promises
    #[error("Cannot parse reply to `{command}`: {reply:?}")]
    Parse { command: String, reply: String },
    /// Malformed or out of range GPIB address
    #[error("Invalid GPIB address: {0}")]
    InvalidAddress(String),
    /// Frequency mode token not understood by the 83623B
    #[error("Unknown frequency mode: {0}")]
    InvalidFrequencyMode(String),
    /// NaN or infinite value passed to a setter
    #[error("Value {0} cannot be sent to the instrument")]
    NonFiniteValue(f64),
}
