//! Bus transport abstraction
//!
//! A [`Transport`] opens links to instruments by VISA resource string and a
//! [`Link`] carries text commands and replies over one such connection. The
//! session layer only ever talks to the bus through these two traits, which
//! allows a real GPIB/VISA stack (see `VisaTransport` with the `visa`
//! feature) to be swapped for an in-memory [`Loopback`](crate::Loopback)
//! when no instrument is attached.

use thiserror::Error;

/// Errors raised by the bus transport
#[derive(Error, Debug)]
pub enum TransportError {
    /// The resource could not be opened; unreachable address, missing
    /// bus interface or VISA library
    #[error("Could not open {resource}: {reason}")]
    Open { resource: String, reason: String },
    /// Low level I/O failure on an open link
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A read completed without any data from the instrument
    #[error("No reply from instrument")]
    NoReply,
    /// Any other backend specific failure
    #[error("Transport error: {0}")]
    Backend(String),
}

/// An open connection to a single instrument.
///
/// All methods are blocking. Implementations are not expected to pace
/// commands; that is handled by [`Session`](crate::Session).
pub trait Link {
    /// Send a command. Implementations append whatever message terminator
    /// the bus requires.
    fn write(&mut self, command: &str) -> Result<(), TransportError>;

    /// Read one reply, with the message terminator stripped.
    fn read(&mut self) -> Result<String, TransportError>;

    /// Send a command and read its reply.
    fn query(&mut self, command: &str) -> Result<String, TransportError> {
        self.write(command)?;
        self.read()
    }

    /// Release the connection.
    fn close(self) -> Result<(), TransportError> where Self: Sized;
}

/// Opens [`Link`]s by VISA resource string (`GPIB0::19::INSTR`).
pub trait Transport {
    type Link: Link;

    fn open(&mut self, resource: &str) -> Result<Self::Link, TransportError>;
}
