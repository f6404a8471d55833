//! SCPI command construction and reply parsing for the 83623B
//!
//! Everything here is pure string manipulation; nothing touches the bus.
//! [`Agilent83623B`](crate::Agilent83623B) combines these with a paced
//! [`Session`](crate::Session).

use std::fmt;
use std::str::FromStr;

use crate::Error;

pub const OUTPUT_ON: &str = "OUTPut:STATe ON";
pub const OUTPUT_OFF: &str = "OUTPut:STATe OFF";
pub const FREQUENCY_MODE_QUERY: &str = "FREQuency:MODE?";
pub const FREQUENCY_QUERY: &str = "FREQuency:CW?";
pub const POWER_LEVEL_QUERY: &str = "POWer:LEVel?";

/// Frequency mode of the synthesizer
///
/// These are the tokens the 8360 series accepts for `FREQuency:MODE`.
/// `Cw` and `Fixed` select the same single-frequency operation and the
/// instrument may report either of them back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrequencyMode {
    /// Continuous wave, single frequency
    Cw,
    /// Fixed frequency; synonym of `Cw`
    Fixed,
    /// Swept between start and stop frequencies
    Sweep,
    /// Stepped CW sweep
    SweptCw,
    /// Frequency list
    List,
}

impl FrequencyMode {

    /// Token sent with `FREQuency:MODE`
    pub fn token(&self) -> &'static str {
        match self {
            FrequencyMode::Cw => "CW",
            FrequencyMode::Fixed => "FIXed",
            FrequencyMode::Sweep => "SWEep",
            FrequencyMode::SweptCw => "SWCW",
            FrequencyMode::List => "LIST",
        }
    }
}

impl fmt::Display for FrequencyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl FromStr for FrequencyMode {
    type Err = Error;

    /// Case-insensitive; accepts both the short (`SWE`) and the long
    /// (`SWEEP`) SCPI forms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CW" => Ok(FrequencyMode::Cw),
            "FIX" | "FIXED" => Ok(FrequencyMode::Fixed),
            "SWE" | "SWEEP" => Ok(FrequencyMode::Sweep),
            "SWCW" => Ok(FrequencyMode::SweptCw),
            "LIST" => Ok(FrequencyMode::List),
            _ => Err(Error::InvalidFrequencyMode(s.to_string()))
        }
    }
}

pub fn set_frequency_mode(mode: FrequencyMode) -> String {
    format!("FREQuency:MODE {}", mode.token())
}

/// The CW frequency command only takes whole hertz so `hz` is rounded to
/// the nearest integer (halves away from zero).
pub fn set_frequency(hz: f64) -> Result<String, Error> {
    if !hz.is_finite() {
        return Err(Error::NonFiniteValue(hz));
    }

    // adding zero turns a rounded -0 into 0
    Ok(format!("FREQuency:CW {:.0} Hz", hz.round() + 0.0))
}

pub fn set_power_level(dbm: f64) -> Result<String, Error> {
    if !dbm.is_finite() {
        return Err(Error::NonFiniteValue(dbm));
    }

    Ok(format!("POWer:LEVel {} dBm", format_number(dbm)))
}

/// Plain decimal rendering that keeps a fractional part on integral
/// values, so that `-30.0` goes on the wire as `-30.0` and not `-30`.
fn format_number(val: f64) -> String {
    let s = val.to_string();
    if s.contains('.') {
        s
    } else {
        format!("{}.0", s)
    }
}

/// Parse a numeric reply to `command`. Surrounding whitespace and line
/// terminators are ignored.
pub fn parse_number(command: &str, reply: &str) -> Result<f64, Error> {
    reply.trim().parse::<f64>().map_err(|_| Error::Parse {
        command: command.to_string(),
        reply: reply.to_string()
    })
}
