//! Live telemetry pipeline: UDP listener, packet parsing, signal routing

mod listener;
mod packet;
mod router;

pub use listener::DatagramListener;
pub use packet::PacketParser;
pub use router::{SignalRouter, SignalSink, SubscriberId};

use crate::types::Result;

/// Receive-parse-dispatch loop
///
/// Runs until `keep_running` returns false (checked between packets) or
/// the socket fails. Malformed packets are logged and dropped; they never
/// reach the router or disturb subscriber state.
pub fn run(
    listener: &mut DatagramListener,
    router: &SignalRouter,
    mut keep_running: impl FnMut() -> bool,
) -> Result<()> {
    while keep_running() {
        let payload = listener.recv()?;

        match PacketParser::parse(payload) {
            Ok(packet) => {
                log::debug!("Dispatching {} signal updates", packet.entries.len());
                router.dispatch(&packet);
            }
            Err(e) => {
                log::warn!("Dropping packet: {}", e);
            }
        }
    }

    Ok(())
}
