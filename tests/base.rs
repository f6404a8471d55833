use std::time::Duration;

use agilent83623b::loopback::Event;
use agilent83623b::{Agilent83623B, Error, FrequencyMode, GpibAddress, Loopback, Pacing, Session};
use assert_matches::assert_matches;


fn address() -> GpibAddress {
    "19".parse().unwrap()
}

#[test]
fn full_sequence() {
    let _ = env_logger::builder().is_test(true).try_init();

    let bus = Loopback::new();
    bus.push_reply("9600000000");
    bus.push_reply("-30.0");

    let mut gen = Agilent83623B::open_with(bus.clone(), bus.delay(), Pacing::default(),
        address()).unwrap();

    let (freq, level) = gen.run_and_close(|gen| {
        gen.set_frequency_mode(FrequencyMode::Cw)?;
        gen.set_frequency(9.6e9)?;
        gen.set_power_level(-30.0)?;
        gen.on()?;
        gen.off()?;
        Ok((gen.frequency()?, gen.power_level()?))
    }).unwrap();

    assert_eq!(freq, 9.6e9);
    assert_eq!(level, -30.0);

    assert_eq!(bus.bus_events(), vec![
        Event::Open("GPIB0::19::INSTR".to_string()),
        Event::Write("FREQuency:MODE CW".to_string()),
        Event::Write("FREQuency:CW 9600000000 Hz".to_string()),
        Event::Write("POWer:LEVel -30.0 dBm".to_string()),
        Event::Write("OUTPut:STATe ON".to_string()),
        Event::Write("OUTPut:STATe OFF".to_string()),
        Event::Query("FREQuency:CW?".to_string()),
        Event::Query("POWer:LEVel?".to_string()),
        Event::Close("GPIB0::19::INSTR".to_string()),
    ]);

    // one settling pause after open, two per transaction
    assert_eq!(bus.delays().len(), 1 + 2*7);
    assert_eq!(bus.total_delay(), Duration::from_millis(500) * 15);
}

#[test]
fn every_transaction_bracketed() {
    let bus = Loopback::new();
    let interval = Duration::from_millis(50);
    let mut gen = Agilent83623B::open_with(bus.clone(), bus.delay(),
        Pacing::new(interval, Duration::from_secs(1)), address()).unwrap();
    bus.clear();

    bus.push_reply("CW");
    gen.on().unwrap();
    gen.frequency_mode_raw().unwrap();
    gen.session_mut().write("*CLS").unwrap();

    let events = bus.events();
    assert_eq!(events.len(), 9);
    for triple in events.chunks(3) {
        assert_eq!(triple[0], Event::Delay(interval));
        assert_matches!(triple[1], Event::Write(_) | Event::Query(_));
        assert_eq!(triple[2], Event::Delay(interval));
    }
}

#[test]
fn reconnect_to_other_generator() {
    let bus = Loopback::new();
    let mut gen = Agilent83623B::open_with(bus.clone(), bus.delay(), Pacing::default(),
        address()).unwrap();

    gen.connect("GPIB0::20::INSTR".parse().unwrap()).unwrap();
    gen.on().unwrap();
    gen.close().unwrap();

    assert_eq!(bus.bus_events(), vec![
        Event::Open("GPIB0::19::INSTR".to_string()),
        Event::Close("GPIB0::19::INSTR".to_string()),
        Event::Open("GPIB0::20::INSTR".to_string()),
        Event::Write("OUTPut:STATe ON".to_string()),
        Event::Close("GPIB0::20::INSTR".to_string()),
    ]);
    assert_eq!(gen.address().primary(), 20);
}

#[test]
fn unreachable_generator() {
    let bus = Loopback::new();
    bus.refuse_open("no listeners on GPIB0");

    let result = Agilent83623B::open_with(bus.clone(), bus.delay(), Pacing::default(),
        address());
    assert_matches!(result.err(), Some(Error::Transport(_)));
}

#[test]
fn use_after_close() {
    let bus = Loopback::new();
    let mut gen = Agilent83623B::open_with(bus.clone(), bus.delay(), Pacing::default(),
        address()).unwrap();
    gen.close().unwrap();
    gen.close().unwrap();

    assert_matches!(gen.on(), Err(Error::NotConnected(a)) if a == address());
}

#[test]
fn raw_session_access() {
    let bus = Loopback::new();
    bus.push_reply("HEWLETT-PACKARD,83623B,0,0");

    let session = Session::open_with(bus.clone(), bus.delay(), Pacing::default(),
        address()).unwrap();
    let mut gen = Agilent83623B::from_session(session);

    let idn = gen.session_mut().query("*IDN?").unwrap();
    assert!(idn.contains("83623B"));
    assert!(gen.session().is_connected());
}

#[test]
fn accessors() {
    let bus = Loopback::new();
    let mut gen = Agilent83623B::open_with(bus.clone(), bus.delay(), Pacing::default(),
        address()).unwrap();

    assert_eq!(gen.command_interval(), Duration::from_millis(500));
    assert_eq!(gen.timeout(), Duration::from_secs(1));

    gen.set_command_interval(Duration::from_millis(100));
    gen.set_timeout(Duration::from_secs(2));
    assert_eq!(gen.command_interval(), Duration::from_millis(100));
    assert_eq!(gen.timeout(), Duration::from_secs(2));
}
