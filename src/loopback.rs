//! In-memory transport for exercising drivers without an instrument
//!
//! [`Loopback`] opens links that never touch a bus. Every open, close,
//! write, read and query is appended to an ordered event log, together
//! with every pause requested through a [`LoopbackDelay`] from the same
//! loopback, so tests can assert exactly what went out and how it was
//! paced. Replies are served first-in first-out from a queue filled with
//! [`Loopback::push_reply()`].
//!
//! `Loopback` is a cheap handle over shared state; hand one clone to the
//! session and keep another to inspect the log.
//!
//! ```
//! use agilent83623b::{Agilent83623B, GpibAddress, Loopback, Pacing};
//!
//! let bus = Loopback::new();
//! let mut gen = Agilent83623B::open_with(bus.clone(), bus.delay(),
//!     Pacing::default(), GpibAddress::new(19).unwrap()).unwrap();
//!
//! gen.on().unwrap();
//! assert_eq!(bus.writes(), vec!["OUTPut:STATe ON".to_string()]);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::pacing::Delay;
use crate::transport::{Link, Transport, TransportError};

/// One entry of the loopback log
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Open(String),
    Close(String),
    Write(String),
    Read,
    Query(String),
    Delay(Duration),
}

#[derive(Debug, Default)]
struct State {
    events: Vec<Event>,
    replies: VecDeque<String>,
    refusal: Option<String>,
    write_failure: Option<String>,
    close_failure: Option<String>,
    opened: usize,
}

/// Recording transport; see the [module documentation](self).
#[derive(Clone, Debug, Default)]
pub struct Loopback {
    state: Arc<Mutex<State>>,
}

fn lock(state: &Arc<Mutex<State>>) -> MutexGuard<'_, State> {
    // a panicking test thread must not hide the log from the others
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Loopback {

    pub fn new() -> Loopback {
        Loopback::default()
    }

    /// A delay provider that records into this loopback's log instead of
    /// sleeping.
    pub fn delay(&self) -> LoopbackDelay {
        LoopbackDelay { state: self.state.clone() }
    }

    /// Queue a reply for the next read or query
    pub fn push_reply<S: Into<String>>(&self, reply: S) {
        lock(&self.state).replies.push_back(reply.into());
    }

    /// Make the next open fail with `reason`
    pub fn refuse_open<S: Into<String>>(&self, reason: S) {
        lock(&self.state).refusal = Some(reason.into());
    }

    /// Make the next write fail with `reason`; nothing reaches the log
    pub fn fail_next_write<S: Into<String>>(&self, reason: S) {
        lock(&self.state).write_failure = Some(reason.into());
    }

    /// Make the next close fail with `reason`. The link is gone either way.
    pub fn fail_next_close<S: Into<String>>(&self, reason: S) {
        lock(&self.state).close_failure = Some(reason.into());
    }

    /// Everything recorded so far, pauses included
    pub fn events(&self) -> Vec<Event> {
        lock(&self.state).events.clone()
    }

    /// Recorded bus traffic without the pauses
    pub fn bus_events(&self) -> Vec<Event> {
        lock(&self.state).events.iter()
            .filter(|e| !matches!(e, Event::Delay(_)))
            .cloned()
            .collect()
    }

    /// Commands sent with plain writes, in order
    pub fn writes(&self) -> Vec<String> {
        lock(&self.state).events.iter()
            .filter_map(|e| match e {
                Event::Write(cmd) => Some(cmd.clone()),
                _ => None
            })
            .collect()
    }

    /// All pauses requested, in order
    pub fn delays(&self) -> Vec<Duration> {
        lock(&self.state).events.iter()
            .filter_map(|e| match e {
                Event::Delay(d) => Some(*d),
                _ => None
            })
            .collect()
    }

    /// Sum of all pauses requested
    pub fn total_delay(&self) -> Duration {
        self.delays().iter().sum()
    }

    /// Number of links opened since creation
    pub fn open_count(&self) -> usize {
        lock(&self.state).opened
    }

    /// Forget the log. Queued replies are kept.
    pub fn clear(&self) {
        lock(&self.state).events.clear();
    }
}

impl Transport for Loopback {
    type Link = LoopbackLink;

    fn open(&mut self, resource: &str) -> Result<LoopbackLink, TransportError> {
        let mut state = lock(&self.state);

        if let Some(reason) = state.refusal.take() {
            return Err(TransportError::Open {
                resource: resource.to_string(),
                reason
            });
        }

        state.opened += 1;
        state.events.push(Event::Open(resource.to_string()));

        Ok(LoopbackLink {
            resource: resource.to_string(),
            state: self.state.clone()
        })
    }
}

/// Link handed out by [`Loopback`]
#[derive(Debug)]
pub struct LoopbackLink {
    resource: String,
    state: Arc<Mutex<State>>,
}

impl LoopbackLink {
    fn next_reply(state: &mut State) -> Result<String, TransportError> {
        state.replies.pop_front().ok_or(TransportError::NoReply)
    }
}

impl Link for LoopbackLink {

    fn write(&mut self, command: &str) -> Result<(), TransportError> {
        let mut state = lock(&self.state);

        if let Some(reason) = state.write_failure.take() {
            return Err(TransportError::Backend(reason));
        }

        state.events.push(Event::Write(command.to_string()));
        Ok(())
    }

    fn read(&mut self) -> Result<String, TransportError> {
        let mut state = lock(&self.state);
        state.events.push(Event::Read);
        LoopbackLink::next_reply(&mut state)
    }

    fn query(&mut self, command: &str) -> Result<String, TransportError> {
        let mut state = lock(&self.state);
        state.events.push(Event::Query(command.to_string()));
        LoopbackLink::next_reply(&mut state)
    }

    fn close(self) -> Result<(), TransportError> {
        let mut state = lock(&self.state);

        if let Some(reason) = state.close_failure.take() {
            return Err(TransportError::Backend(reason));
        }

        state.events.push(Event::Close(self.resource.clone()));
        Ok(())
    }
}

/// Delay provider that logs pauses into a [`Loopback`] without sleeping
#[derive(Clone, Debug)]
pub struct LoopbackDelay {
    state: Arc<Mutex<State>>,
}

impl Delay for LoopbackDelay {
    fn pause(&mut self, duration: Duration) {
        lock(&self.state).events.push(Event::Delay(duration));
    }
}
