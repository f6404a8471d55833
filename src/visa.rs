//! GPIB/VISA transport built on [`visa_rs`]

use std::ffi::CString;
use std::io::{BufRead, BufReader, Write};
use std::time::Duration;

use visa_rs::{DefaultRM, Instrument};

use crate::transport::{Link, Transport, TransportError};

/// How long to wait for exclusive access when opening a resource
const OPEN_TIMEOUT: Duration = Duration::from_secs(1);
const TERMINATOR: &str = "\n";

/// Transport backed by the system VISA library
///
/// Owns the VISA default resource manager. Links opened through it stay
/// valid only as long as the transport itself, which
/// [`Session`](crate::Session) guarantees by dropping its link first.
pub struct VisaTransport {
    rm: DefaultRM,
}

impl VisaTransport {

    /// Open the default VISA resource manager
    pub fn new() -> Result<VisaTransport, TransportError> {
        let rm = DefaultRM::new().map_err(|err| TransportError::Open {
            resource: "VISA resource manager".to_string(),
            reason: err.to_string()
        })?;

        Ok(VisaTransport { rm })
    }
}

impl Transport for VisaTransport {
    type Link = VisaLink;

    fn open(&mut self, resource: &str) -> Result<VisaLink, TransportError> {
        // resource manager trait and access flags
        use visa_rs::prelude::*;

        let name = CString::new(resource).map_err(|err| TransportError::Open {
            resource: resource.to_string(),
            reason: err.to_string()
        })?;

        let instr = self.rm.open(&name.into(), AccessMode::NO_LOCK, OPEN_TIMEOUT)
            .map_err(|err| TransportError::Open {
                resource: resource.to_string(),
                reason: err.to_string()
            })?;

        Ok(VisaLink { instr })
    }
}

/// Open VISA instrument session
pub struct VisaLink {
    instr: Instrument,
}

impl Link for VisaLink {

    fn write(&mut self, command: &str) -> Result<(), TransportError> {
        let mut msg = String::with_capacity(command.len() + TERMINATOR.len());
        msg.push_str(command);
        msg.push_str(TERMINATOR);
        self.instr.write_all(msg.as_bytes())?;
        Ok(())
    }

    fn read(&mut self) -> Result<String, TransportError> {
        let mut reply = String::new();

        // scoped so the reader is gone before the instrument is used again
        {
            let mut reader = BufReader::new(&self.instr);
            reader.read_line(&mut reply)?;
        }

        if reply.is_empty() {
            return Err(TransportError::NoReply);
        }

        Ok(reply.trim_end_matches(|c| c == '\r' || c == '\n').to_string())
    }

    fn close(self) -> Result<(), TransportError> {
        // the VISA session is closed when the instrument handle drops
        drop(self.instr);
        Ok(())
    }
}
