//! Driver for the Agilent 83623B swept signal generator
//!
//! The generator is reached over a GPIB/VISA bus and controlled with SCPI
//! text commands. This crate is organised in three layers:
//!
//! * a bus [`Transport`] that opens [`Link`]s by VISA resource string; a
//!   real one ([`VisaTransport`], feature `visa`) and an in-memory
//!   [`Loopback`] that records traffic for tests;
//! * a [`Session`] that owns one link and paces every transaction with a
//!   fixed wait before and after it, since the instrument cannot process
//!   commands arbitrarily fast;
//! * the typed [`Agilent83623B`] facade: output on/off, frequency mode,
//!   CW frequency and power level.
//!
//! Nothing is retried or recovered from; every transport, parse or usage
//! error is returned to the caller as an [`Error`]. The crate logs through
//! the [`log`] facade and never installs a logger itself.
//!
//! ```no_run
//! # #[cfg(feature = "visa")] {
//! use agilent83623b::{Agilent83623B, FrequencyMode, GpibAddress, VisaTransport};
//!
//! let mut gen = Agilent83623B::open(VisaTransport::new().unwrap(),
//!     GpibAddress::new(19).unwrap()).unwrap();
//! gen.set_frequency_mode(FrequencyMode::Cw).unwrap();
//! gen.set_frequency(9.6e9).unwrap();
//! gen.set_power_level(-30.0).unwrap();
//! gen.on().unwrap();
//! gen.off().unwrap();
//! gen.close().unwrap();
//! # }
//! ```

mod address;
mod error;
mod instrument;
mod pacing;
mod session;
mod transport;
pub mod commands;
pub mod loopback;

#[cfg(feature = "visa")]
mod visa;

pub use address::{GpibAddress, MAX_ADDRESS};
pub use commands::FrequencyMode;
pub use error::Error;
pub use instrument::Agilent83623B;
pub use loopback::{Loopback, LoopbackDelay};
pub use pacing::{Delay, Pacing, SpinDelay, DEFAULT_COMMAND_INTERVAL, DEFAULT_TIMEOUT};
pub use session::Session;
pub use transport::{Link, Transport, TransportError};

#[cfg(feature = "visa")]
pub use visa::{VisaLink, VisaTransport};
