use std::time::Duration;

use crate::address::GpibAddress;
use crate::commands::{self, FrequencyMode};
use crate::pacing::{Delay, Pacing, SpinDelay};
use crate::session::Session;
use crate::transport::Transport;
use crate::Error;


/// Agilent 83623B entry level object
///
/// `Agilent83623B` maps the generator's operations onto SCPI commands and
/// sends them through a paced [`Session`]. Getters always query the
/// instrument; nothing is cached.
///
/// The generator is connected as soon as it is created. Prefer
/// [`Agilent83623B::with()`], which guarantees the link is closed when the
/// work is done, or call [`Agilent83623B::close()`] explicitly. Dropping a
/// connected generator also closes it, but only as a fallback.
///
/// ## Examples
///
/// ```no_run
/// # #[cfg(feature = "visa")] {
/// use agilent83623b::{Agilent83623B, FrequencyMode, GpibAddress, VisaTransport};
///
/// let transport = VisaTransport::new().unwrap();
/// let address: GpibAddress = "19".parse().unwrap();
///
/// let (freq, level) = Agilent83623B::with(transport, address, |gen| {
///     gen.set_frequency_mode(FrequencyMode::Cw)?;
///     gen.set_frequency(9.6e9)?;
///     gen.set_power_level(-30.0)?;
///     gen.on()?;
///     std::thread::sleep(std::time::Duration::from_secs(5));
///     gen.off()?;
///     Ok((gen.frequency()?, gen.power_level()?))
/// }).unwrap();
///
/// println!("{} Hz at {} dBm", freq, level);
/// # }
/// ```
pub struct Agilent83623B<T: Transport, D: Delay = SpinDelay> {
    session: Session<T, D>,
}

impl<T: Transport> Agilent83623B<T, SpinDelay> {

    /// Connect to the generator at `address` with default pacing.
    pub fn open(transport: T, address: GpibAddress) -> Result<Agilent83623B<T, SpinDelay>, Error> {
        Ok(Agilent83623B { session: Session::open(transport, address)? })
    }

    /// Connect to the generator at `address`, run `f` and close the link.
    /// An error from `f` takes precedence over an error from closing.
    pub fn with<R, F>(transport: T, address: GpibAddress, f: F) -> Result<R, Error>
        where F: FnOnce(&mut Agilent83623B<T, SpinDelay>) -> Result<R, Error> {

        let mut gen = Agilent83623B::open(transport, address)?;
        gen.run_and_close(f)
    }
}

impl<T: Transport, D: Delay> Agilent83623B<T, D> {

    /// Connect with explicit pacing and delay provider.
    pub fn open_with(transport: T, delay: D, pacing: Pacing, address: GpibAddress)
        -> Result<Agilent83623B<T, D>, Error> {
        Ok(Agilent83623B { session: Session::open_with(transport, delay, pacing, address)? })
    }

    /// Wrap an existing session.
    pub fn from_session(session: Session<T, D>) -> Agilent83623B<T, D> {
        Agilent83623B { session }
    }

    /// Run `f` and close the link regardless of its outcome.
    pub fn run_and_close<R, F>(&mut self, f: F) -> Result<R, Error>
        where F: FnOnce(&mut Self) -> Result<R, Error> {

        let result = f(self);
        let closed = self.close();
        let value = result?;
        closed?;
        Ok(value)
    }

    /// Underlying session, for commands not covered here
    pub fn session(&self) -> &Session<T, D> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<T, D> {
        &mut self.session
    }

    pub fn address(&self) -> GpibAddress {
        self.session.address()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// See [`Session::connect()`]
    pub fn connect(&mut self, address: GpibAddress) -> Result<(), Error> {
        self.session.connect(address)
    }

    pub fn close(&mut self) -> Result<(), Error> {
        self.session.close()
    }

    pub fn command_interval(&self) -> Duration {
        self.session.command_interval()
    }

    pub fn set_command_interval(&mut self, interval: Duration) {
        self.session.set_command_interval(interval)
    }

    pub fn timeout(&self) -> Duration {
        self.session.timeout()
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.session.set_timeout(timeout)
    }

    /// Turn the RF output on
    pub fn on(&mut self) -> Result<(), Error> {
        self.session.write(commands::OUTPUT_ON)
    }

    /// Turn the RF output off
    pub fn off(&mut self) -> Result<(), Error> {
        self.session.write(commands::OUTPUT_OFF)
    }

    pub fn set_frequency_mode(&mut self, mode: FrequencyMode) -> Result<(), Error> {
        self.session.write(&commands::set_frequency_mode(mode))
    }

    /// Current frequency mode as reported by the instrument
    pub fn frequency_mode(&mut self) -> Result<FrequencyMode, Error> {
        self.frequency_mode_raw()?.parse()
    }

    /// Reply to `FREQuency:MODE?`, verbatim
    pub fn frequency_mode_raw(&mut self) -> Result<String, Error> {
        self.session.query(commands::FREQUENCY_MODE_QUERY)
    }

    /// Set the CW frequency in Hz. The value is rounded to whole hertz.
    pub fn set_frequency(&mut self, hz: f64) -> Result<(), Error> {
        let cmd = commands::set_frequency(hz)?;
        self.session.write(&cmd)
    }

    /// CW frequency in Hz
    pub fn frequency(&mut self) -> Result<f64, Error> {
        let reply = self.session.query(commands::FREQUENCY_QUERY)?;
        commands::parse_number(commands::FREQUENCY_QUERY, &reply)
    }

    /// Set the output power level in dBm
    pub fn set_power_level(&mut self, dbm: f64) -> Result<(), Error> {
        let cmd = commands::set_power_level(dbm)?;
        self.session.write(&cmd)
    }

    /// Output power level in dBm
    pub fn power_level(&mut self) -> Result<f64, Error> {
        let reply = self.session.query(commands::POWER_LEVEL_QUERY)?;
        commands::parse_number(commands::POWER_LEVEL_QUERY, &reply)
    }
}


#[cfg(test)]
mod tests {

    use std::time::Duration;
    use assert_matches::assert_matches;

    use super::Agilent83623B;
    use crate::address::GpibAddress;
    use crate::commands::FrequencyMode;
    use crate::loopback::{Event, Loopback, LoopbackDelay};
    use crate::pacing::Pacing;
    use crate::Error;

    const HALF: Duration = Duration::from_millis(500);

    fn generator(bus: &Loopback) -> Agilent83623B<Loopback, LoopbackDelay> {
        let gen = Agilent83623B::open_with(bus.clone(), bus.delay(), Pacing::default(),
            GpibAddress::new(19).unwrap()).unwrap();
        bus.clear();
        gen
    }

    #[test]
    fn on_off() {
        let bus = Loopback::new();
        let mut gen = generator(&bus);

        gen.on().unwrap();
        gen.off().unwrap();

        assert_eq!(bus.events(), vec![
            Event::Delay(HALF), Event::Write("OUTPut:STATe ON".to_string()), Event::Delay(HALF),
            Event::Delay(HALF), Event::Write("OUTPut:STATe OFF".to_string()), Event::Delay(HALF),
        ]);
    }

    #[test]
    fn set_frequency_rounds() {
        let bus = Loopback::new();
        let mut gen = generator(&bus);

        gen.set_frequency(9600000000.4).unwrap();
        assert_eq!(bus.writes(), vec!["FREQuency:CW 9600000000 Hz".to_string()]);
    }

    #[test]
    fn set_power_level() {
        let bus = Loopback::new();
        let mut gen = generator(&bus);

        gen.set_power_level(-30.0).unwrap();
        assert_eq!(bus.writes(), vec!["POWer:LEVel -30.0 dBm".to_string()]);
    }

    #[test]
    fn get_frequency() {
        let bus = Loopback::new();
        let mut gen = generator(&bus);
        bus.push_reply("9600000000");

        assert_eq!(gen.frequency().unwrap(), 9600000000.0);
        assert_eq!(bus.bus_events(), vec![Event::Query("FREQuency:CW?".to_string())]);
        assert_eq!(bus.total_delay(), 2*HALF);
    }

    #[test]
    fn get_power_level() {
        let bus = Loopback::new();
        let mut gen = generator(&bus);
        bus.push_reply("-30.0");

        assert_eq!(gen.power_level().unwrap(), -30.0);
        assert_eq!(bus.bus_events(), vec![Event::Query("POWer:LEVel?".to_string())]);
    }

    #[test]
    fn frequency_mode() {
        let bus = Loopback::new();
        let mut gen = generator(&bus);

        gen.set_frequency_mode(FrequencyMode::Cw).unwrap();
        assert_eq!(bus.writes(), vec!["FREQuency:MODE CW".to_string()]);

        bus.push_reply("SWE");
        bus.push_reply("CW");
        assert_eq!(gen.frequency_mode().unwrap(), FrequencyMode::Sweep);
        assert_eq!(gen.frequency_mode_raw().unwrap(), "CW");
    }

    #[test]
    fn non_numeric_reply() {
        let bus = Loopback::new();
        let mut gen = generator(&bus);
        bus.push_reply("-221,\"Settings conflict\"x");

        assert_matches!(gen.power_level(), Err(Error::Parse { .. }));
    }

    #[test]
    fn invalid_value_stays_off_bus() {
        let bus = Loopback::new();
        let mut gen = generator(&bus);

        assert_matches!(gen.set_frequency(f64::NAN), Err(Error::NonFiniteValue(_)));
        assert!(bus.events().is_empty());
    }

    #[test]
    fn missing_reply_propagates() {
        let bus = Loopback::new();
        let mut gen = generator(&bus);

        assert_matches!(gen.frequency(), Err(Error::Transport(_)));
    }

    #[test]
    fn run_and_close_releases_link() {
        let bus = Loopback::new();
        let mut gen = generator(&bus);

        let result: Result<(), Error> = gen.run_and_close(|g| {
            g.on()?;
            g.frequency().map(|_| ())
        });

        assert_matches!(result, Err(Error::Transport(_)));
        assert!(!gen.is_connected());
        assert_eq!(bus.bus_events().last(),
            Some(&Event::Close("GPIB0::19::INSTR".to_string())));
    }
}
