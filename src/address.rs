use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Highest primary (and secondary) address allowed on a GPIB bus
pub const MAX_ADDRESS: u8 = 30;

/// Location of an instrument on a GPIB bus
///
/// A `GpibAddress` identifies the interface board the instrument hangs off,
/// its primary address and, for instruments that use extended addressing, a
/// secondary address. It renders as the VISA resource string used to open
/// the instrument, for instance `GPIB0::19::INSTR`.
///
/// ## Examples
///
/// ```
/// use agilent83623b::GpibAddress;
///
/// let addr: GpibAddress = "19".parse().unwrap();
/// assert_eq!(addr.resource_string(), "GPIB0::19::INSTR");
///
/// let addr: GpibAddress = "GPIB1::5::2::INSTR".parse().unwrap();
/// assert_eq!(addr.board(), 1);
/// assert_eq!(addr.secondary(), Some(2));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GpibAddress {
    board: u8,
    primary: u8,
    secondary: Option<u8>,
}

impl GpibAddress {

    /// Primary address `primary` on board 0.
    pub fn new(primary: u8) -> Result<GpibAddress, Error> {
        GpibAddress::with_board(0, primary, None)
    }

    /// Fully specified address. Both `primary` and `secondary` must be
    /// within `0..=30`.
    pub fn with_board(board: u8, primary: u8, secondary: Option<u8>) -> Result<GpibAddress, Error> {

        if primary > MAX_ADDRESS {
            return Err(Error::InvalidAddress(
                format!("primary address {} out of range 0..={}", primary, MAX_ADDRESS)));
        }

        if let Some(s) = secondary {
            if s > MAX_ADDRESS {
                return Err(Error::InvalidAddress(
                    format!("secondary address {} out of range 0..={}", s, MAX_ADDRESS)));
            }
        }

        Ok(GpibAddress { board, primary, secondary })
    }

    pub fn board(&self) -> u8 {
        self.board
    }

    pub fn primary(&self) -> u8 {
        self.primary
    }

    pub fn secondary(&self) -> Option<u8> {
        self.secondary
    }

    /// VISA resource string for this address
    pub fn resource_string(&self) -> String {
        match self.secondary {
            Some(s) => format!("GPIB{}::{}::{}::INSTR", self.board, self.primary, s),
            None => format!("GPIB{}::{}::INSTR", self.board, self.primary)
        }
    }
}

impl fmt::Display for GpibAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resource_string())
    }
}

impl TryFrom<u8> for GpibAddress {
    type Error = Error;

    fn try_from(primary: u8) -> Result<Self, Self::Error> {
        GpibAddress::new(primary)
    }
}

fn parse_field(field: &str, whole: &str) -> Result<u8, Error> {
    field.trim().parse::<u8>()
        .map_err(|_| Error::InvalidAddress(whole.to_string()))
}

impl FromStr for GpibAddress {
    type Err = Error;

    /// Accepts either a bare primary address (`"19"`) or a VISA resource
    /// string (`"GPIB0::19::INSTR"`, `"GPIB0::19"`, `"GPIB0::19::2::INSTR"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.is_empty() {
            return Err(Error::InvalidAddress(s.to_string()));
        }

        // plain primary address
        if s.bytes().all(|b| b.is_ascii_digit()) {
            return GpibAddress::new(parse_field(s, s)?);
        }

        let upper = s.to_ascii_uppercase();
        let mut parts: Vec<&str> = upper.split("::").collect();

        if parts.last() == Some(&"INSTR") {
            parts.pop();
        }

        let board = match parts.first() {
            Some(p) if p.starts_with("GPIB") => {
                let digits = &p[4..];
                if digits.is_empty() { 0 } else { parse_field(digits, s)? }
            },
            _ => return Err(Error::InvalidAddress(s.to_string()))
        };

        match parts.len() {
            2 => GpibAddress::with_board(board, parse_field(parts[1], s)?, None),
            3 => GpibAddress::with_board(board, parse_field(parts[1], s)?,
                Some(parse_field(parts[2], s)?)),
            _ => Err(Error::InvalidAddress(s.to_string()))
        }
    }
}
