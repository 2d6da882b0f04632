//! End-to-end live pipeline tests over a real loopback socket.

use std::cell::RefCell;
use std::net::UdpSocket;
use std::rc::Rc;

use telemetry_decoder::live;
use telemetry_decoder::{DatagramListener, SignalRouter, SignalSink};

struct RecordingSink {
    seen: Vec<(String, f64)>,
}

impl RecordingSink {
    fn shared() -> Rc<RefCell<RecordingSink>> {
        Rc::new(RefCell::new(RecordingSink { seen: Vec::new() }))
    }
}

impl SignalSink for RecordingSink {
    fn update(&mut self, value: f64, name: &str) {
        self.seen.push((name.to_string(), value));
    }
}

/// Run the live loop for exactly `packets` received datagrams
fn run_for(listener: &mut DatagramListener, router: &SignalRouter, packets: usize) {
    let mut remaining = packets + 1;
    live::run(listener, router, move || {
        remaining -= 1;
        remaining > 0
    })
    .unwrap();
}

#[test]
fn one_packet_fans_out_to_matching_subscribers_only() {
    let mut listener = DatagramListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let router = SignalRouter::new();
    let rpm = RecordingSink::shared();
    let oil = RecordingSink::shared();
    let battery = RecordingSink::shared();
    router.register("RPM", rpm.clone());
    router.register("OilPress", oil.clone());
    router.register("BatteryVoltage", battery.clone());

    let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
    sender
        .send_to(br#"{"RPM": 1500, "OilPress": 40}"#, addr)
        .unwrap();

    run_for(&mut listener, &router, 1);

    // Scenario D: exactly one update each for the two matching names,
    // nothing for the third subscriber.
    assert_eq!(rpm.borrow().seen, vec![("RPM".to_string(), 1500.0)]);
    assert_eq!(oil.borrow().seen, vec![("OilPress".to_string(), 40.0)]);
    assert!(battery.borrow().seen.is_empty());
}

#[test]
fn malformed_packet_is_dropped_and_listening_continues() {
    let mut listener = DatagramListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let router = SignalRouter::new();
    let rpm = RecordingSink::shared();
    router.register("RPM", rpm.clone());

    let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
    // Scenario E: not valid JSON, then a well-formed packet
    sender.send_to(b"this is not json", addr).unwrap();
    sender.send_to(br#"{"RPM": 900}"#, addr).unwrap();

    run_for(&mut listener, &router, 2);

    // No subscriber was notified for the malformed payload; the next
    // datagram was processed normally.
    assert_eq!(rpm.borrow().seen, vec![("RPM".to_string(), 900.0)]);
}

#[test]
fn packets_dispatch_in_arrival_order() {
    let mut listener = DatagramListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let router = SignalRouter::new();
    let rpm = RecordingSink::shared();
    router.register("RPM", rpm.clone());

    let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
    sender.send_to(br#"{"RPM": 600}"#, addr).unwrap();
    sender.send_to(br#"{"RPM": 700}"#, addr).unwrap();
    sender.send_to(br#"{"RPM": 800}"#, addr).unwrap();

    run_for(&mut listener, &router, 3);

    let values: Vec<f64> = rpm.borrow().seen.iter().map(|(_, v)| *v).collect();
    assert_eq!(values, vec![600.0, 700.0, 800.0]);
}
