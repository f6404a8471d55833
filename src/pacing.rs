use std::time::Duration;

/// Default wait before and after every bus transaction
pub const DEFAULT_COMMAND_INTERVAL: Duration = Duration::from_millis(500);
/// Default transaction timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Timing configuration of a [`Session`](crate::Session)
///
/// `command_interval` is slept before and after every write, read and
/// query, and once more after a link has been opened. The 83623B drops
/// commands that arrive faster than it can process them, so this is a
/// fixed rate limit rather than an adaptive one.
///
/// `timeout` is recorded and reported back but is not applied to
/// individual transactions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pacing {
    pub command_interval: Duration,
    pub timeout: Duration,
}

impl Pacing {
    pub fn new(command_interval: Duration, timeout: Duration) -> Pacing {
        Pacing { command_interval, timeout }
    }
}

impl Default for Pacing {
    fn default() -> Pacing {
        Pacing::new(DEFAULT_COMMAND_INTERVAL, DEFAULT_TIMEOUT)
    }
}

/// Something that can block for a given duration.
///
/// Sessions route every pacing wait through a `Delay` so that tests can
/// account for waits instead of actually sleeping.
pub trait Delay {
    fn pause(&mut self, duration: Duration);
}

/// Accurate blocking sleep backed by [`spin_sleep`]
#[derive(Clone, Copy, Debug, Default)]
pub struct SpinDelay;

impl Delay for SpinDelay {
    fn pause(&mut self, duration: Duration) {
        if duration > Duration::from_nanos(0) {
            spin_sleep::sleep(duration);
        }
    }
}


#[cfg(test)]
mod tests {

    use std::time::{Duration, Instant};
    use super::{Pacing, Delay, SpinDelay};

    #[test]
    fn default_pacing() {
        let pacing = Pacing::default();
        assert_eq!(pacing.command_interval, Duration::from_secs_f64(0.5));
        assert_eq!(pacing.timeout, Duration::from_secs_f64(1.0));
    }

    #[test]
    fn spin_delay_blocks() {
        let mut delay = SpinDelay;
        let start = Instant::now();
        delay.pause(Duration::from_millis(5));
        assert!(start.elapsed() >= Duration::from_millis(5));
    }
}
