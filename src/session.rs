use std::time::Duration;

use log::{debug, trace, warn, error};

use crate::address::GpibAddress;
use crate::pacing::{Delay, Pacing, SpinDelay};
use crate::transport::{Link, Transport, TransportError};
use crate::Error;


/// Paced connection to a single bus-addressed instrument
///
/// `Session` owns at most one [`Link`] at any time, opened through the
/// [`Transport`] it was created with. Every transaction is wrapped as
/// *pause → bus operation → pause*, the pause being the configured
/// command interval, so any operation blocks for at least twice that
/// interval. Nothing is cached; every read goes to the instrument.
///
/// Sessions connect on construction. Release the link with
/// [`Session::close()`]; dropping a connected session closes it as well,
/// but any error during that close can only be logged.
///
/// A session is not meant to be shared; issue commands from one thread
/// at a time.
pub struct Session<T: Transport, D: Delay = SpinDelay> {
    // declared before `transport` so it is dropped first
    link: Option<T::Link>,
    transport: T,
    delay: D,
    address: GpibAddress,
    pacing: Pacing,
}

impl<T: Transport> Session<T, SpinDelay> {

    /// Connect to `address` with default pacing (0.5 s interval, 1 s
    /// timeout).
    pub fn open(transport: T, address: GpibAddress) -> Result<Session<T, SpinDelay>, Error> {
        Session::open_with(transport, SpinDelay, Pacing::default(), address)
    }
}

impl<T: Transport, D: Delay> Session<T, D> {

    /// Connect to `address` with explicit pacing and delay provider.
    pub fn open_with(transport: T, delay: D, pacing: Pacing, address: GpibAddress)
        -> Result<Session<T, D>, Error> {

        let mut session = Session {
            link: None,
            transport,
            delay,
            address,
            pacing,
        };

        session.connect(address)?;

        Ok(session)
    }

    /// Address this session is, or was last, connected to
    pub fn address(&self) -> GpibAddress {
        self.address
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    /// Connect to `address`. If it differs from the current address any
    /// open link is closed first and the new address adopted. If no link is
    /// open one is opened, followed by a settling pause of one command
    /// interval. Connecting to the current address while connected does
    /// nothing.
    pub fn connect(&mut self, address: GpibAddress) -> Result<(), Error> {

        if address != self.address {
            self.close()?;
            self.address = address;
        }

        if self.link.is_none() {
            let resource = self.address.resource_string();
            debug!("OPEN {}", resource);
            let link = self.transport.open(&resource)?;
            self.link = Some(link);
            self.pause();
        }

        Ok(())
    }

    /// Release the link. Closing a closed session is a no-op. The session
    /// is disconnected afterwards even if the transport reports an error.
    pub fn close(&mut self) -> Result<(), Error> {
        match self.link.take() {
            Some(link) => {
                debug!("CLOSE {}", self.address);
                link.close().map_err(Error::from)
            },
            None => Ok(())
        }
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    pub fn command_interval(&self) -> Duration {
        self.pacing.command_interval
    }

    /// Takes effect from the next transaction
    pub fn set_command_interval(&mut self, interval: Duration) {
        self.pacing.command_interval = interval;
    }

    pub fn timeout(&self) -> Duration {
        self.pacing.timeout
    }

    /// Recorded only; transactions are not aborted on timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.pacing.timeout = timeout;
    }

    /// Paced write
    pub fn write(&mut self, command: &str) -> Result<(), Error> {
        debug!("WRITE {}", command);
        self.transact(|link| link.write(command))
    }

    /// Paced read
    pub fn read(&mut self) -> Result<String, Error> {
        let reply = self.transact(|link| link.read())?;
        debug!("READ {:?}", reply);
        Ok(reply)
    }

    /// Paced query
    pub fn query(&mut self, command: &str) -> Result<String, Error> {
        debug!("QUERY {}", command);
        let reply = self.transact(|link| link.query(command))?;
        debug!("REPLY {:?}", reply);
        Ok(reply)
    }

    fn pause(&mut self) {
        let interval = self.pacing.command_interval;
        trace!("PAUSE {:?}", interval);
        self.delay.pause(interval);
    }

    fn transact<R, F>(&mut self, op: F) -> Result<R, Error>
        where F: FnOnce(&mut T::Link) -> Result<R, TransportError> {

        let interval = self.pacing.command_interval;

        let link = match self.link.as_mut() {
            Some(link) => link,
            None => return Err(Error::NotConnected(self.address))
        };

        trace!("PAUSE {:?}", interval);
        self.delay.pause(interval);

        // no trailing pause when the bus operation fails
        let result = op(link)?;

        self.pause();

        Ok(result)
    }
}

impl<T: Transport, D: Delay> Drop for Session<T, D> {
    fn drop(&mut self) {
        if self.link.is_some() {
            warn!("Session to {} dropped while connected; closing", self.address);
            if let Err(err) = self.close() {
                error!("Could not close {}: {}", self.address, err);
            }
        }
    }
}
