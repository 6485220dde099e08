//! Sub-protocol demultiplexing.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use g3usi_frame::{protocol_name, Frame, ADP, COORD, MAC, MNGP, SNIFFER};
use g3usi_proto::adp::AdpEvent;
use g3usi_proto::coord::CoordEvent;
use g3usi_proto::mac::MacEvent;
use g3usi_proto::mngp::MngpMessage;
use g3usi_proto::CodecConfig;
use tracing::{debug, trace};

use crate::callbacks::CallbackTable;
use crate::correlation::Correlator;
use crate::event::Event;

/// Consumes the payloads of one sub-protocol.
pub trait ProtocolHandler: Send + Sync {
    /// Returns whether the payload was understood and delivered.
    fn handle(&self, payload: &[u8]) -> bool;
}

impl<F> ProtocolHandler for F
where
    F: Fn(&[u8]) -> bool + Send + Sync,
{
    fn handle(&self, payload: &[u8]) -> bool {
        self(payload)
    }
}

/// Routes each frame to the handler registered for its discriminator.
#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<u8, Box<dyn ProtocolHandler>>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut protocols: Vec<u8> = self.handlers.keys().copied().collect();
        protocols.sort_unstable();
        f.debug_struct("Dispatcher")
            .field("protocols", &protocols)
            .finish()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler; a later handler for the same discriminator replaces the earlier one.
    pub fn with_handler(mut self, protocol: u8, handler: impl ProtocolHandler + 'static) -> Self {
        self.handlers.insert(protocol, Box::new(handler));
        self
    }

    /// Handlers for every control sub-protocol plus the sniffer feed.
    pub fn standard(
        codec: CodecConfig,
        correlator: Arc<Correlator>,
        callbacks: Arc<CallbackTable>,
    ) -> Self {
        let router = Arc::new(EventRouter {
            codec,
            correlator,
            callbacks: Arc::clone(&callbacks),
        });
        let decoder = |decode: Decode| EventHandler {
            decode,
            router: Arc::clone(&router),
        };
        Self::new()
            .with_handler(MNGP, decoder(decode_mngp))
            .with_handler(MAC, decoder(decode_mac))
            .with_handler(ADP, decoder(decode_adp))
            .with_handler(COORD, decoder(decode_coord))
            .with_handler(SNIFFER, move |payload: &[u8]| {
                callbacks.deliver_sniffer(payload)
            })
    }

    /// Hand `frame` to its handler. Unknown discriminators are dropped.
    pub fn dispatch(&self, frame: &Frame) -> bool {
        match self.handlers.get(&frame.protocol) {
            Some(handler) => {
                trace!(
                    protocol = protocol_name(frame.protocol),
                    len = frame.payload.len(),
                    "dispatch"
                );
                handler.handle(&frame.payload)
            }
            None => {
                debug!(protocol = frame.protocol, "no handler for protocol, frame dropped");
                false
            }
        }
    }

    pub fn handles(&self, protocol: u8) -> bool {
        self.handlers.contains_key(&protocol)
    }
}

type Decode = fn(&[u8], &CodecConfig) -> g3usi_proto::Result<Event>;

fn decode_adp(payload: &[u8], cfg: &CodecConfig) -> g3usi_proto::Result<Event> {
    AdpEvent::decode(payload, cfg).map(Event::Adp)
}

fn decode_mac(payload: &[u8], cfg: &CodecConfig) -> g3usi_proto::Result<Event> {
    MacEvent::decode(payload, cfg).map(Event::Mac)
}

fn decode_coord(payload: &[u8], cfg: &CodecConfig) -> g3usi_proto::Result<Event> {
    CoordEvent::decode(payload, cfg).map(Event::Coord)
}

fn decode_mngp(payload: &[u8], cfg: &CodecConfig) -> g3usi_proto::Result<Event> {
    MngpMessage::decode(payload, cfg).map(Event::Mngp)
}

/// Offers confirms to the correlator, then falls back to callbacks.
struct EventRouter {
    codec: CodecConfig,
    correlator: Arc<Correlator>,
    callbacks: Arc<CallbackTable>,
}

impl EventRouter {
    fn route(&self, event: Event) -> bool {
        match self.correlator.offer(event, &self.codec) {
            None => true,
            Some(event) => self.callbacks.deliver(&event),
        }
    }
}

struct EventHandler {
    decode: Decode,
    router: Arc<EventRouter>,
}

impl ProtocolHandler for EventHandler {
    fn handle(&self, payload: &[u8]) -> bool {
        match (self.decode)(payload, &self.router.codec) {
            Ok(event) => self.router.route(event),
            Err(err) => {
                debug!(error = %err, len = payload.len(), "undecodable message dropped");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use g3usi_frame::protocol::PRIME_API;
    use g3usi_proto::adp::{AdpEventKind, NetworkLeaveIndication};

    use super::*;

    fn counting(counter: &Arc<AtomicUsize>) -> impl Fn(&[u8]) -> bool + Send + Sync + 'static {
        let counter = Arc::clone(counter);
        move |_payload: &[u8]| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    #[test]
    fn routes_by_discriminator() {
        let mac = Arc::new(AtomicUsize::new(0));
        let adp = Arc::new(AtomicUsize::new(0));
        let dispatcher = Dispatcher::new()
            .with_handler(MAC, counting(&mac))
            .with_handler(ADP, counting(&adp));

        assert!(dispatcher.dispatch(&Frame::new(MAC, vec![80])));
        assert!(dispatcher.dispatch(&Frame::new(ADP, vec![31])));
        assert!(dispatcher.dispatch(&Frame::new(ADP, vec![32])));
        assert_eq!(mac.load(Ordering::SeqCst), 1);
        assert_eq!(adp.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unknown_protocol_is_dropped() {
        let dispatcher = Dispatcher::new().with_handler(MAC, |_: &[u8]| true);
        assert!(!dispatcher.dispatch(&Frame::new(PRIME_API, vec![1, 2, 3])));
        assert!(!dispatcher.handles(PRIME_API));
    }

    #[test]
    fn standard_handlers_decode_and_deliver() {
        let leaves = Arc::new(AtomicUsize::new(0));
        let sniffed = Arc::new(AtomicUsize::new(0));
        let (l, s) = (Arc::clone(&leaves), Arc::clone(&sniffed));
        let callbacks = CallbackTable::builder()
            .on_adp(AdpEventKind::NetworkLeaveIndication, move |_| {
                l.fetch_add(1, Ordering::SeqCst);
            })
            .and_then(|b| {
                b.on_sniffer(move |raw| {
                    assert_eq!(raw, &[0xDE, 0xAD][..]);
                    s.fetch_add(1, Ordering::SeqCst);
                })
            })
            .expect("callbacks should register")
            .build();
        let dispatcher = Dispatcher::standard(
            CodecConfig::default(),
            Arc::new(Correlator::new()),
            Arc::new(callbacks),
        );

        let payload = AdpEvent::NetworkLeaveIndication(NetworkLeaveIndication {})
            .encode(&CodecConfig::default())
            .expect("indication should encode");
        assert!(dispatcher.dispatch(&Frame::new(ADP, payload)));
        assert!(dispatcher.dispatch(&Frame::new(SNIFFER, vec![0xDE, 0xAD])));
        assert_eq!(leaves.load(Ordering::SeqCst), 1);
        assert_eq!(sniffed.load(Ordering::SeqCst), 1);

        // Unknown kinds and registered-but-unhandled kinds are not delivered.
        assert!(!dispatcher.dispatch(&Frame::new(ADP, vec![0xFF])));
        assert!(!dispatcher.dispatch(&Frame::new(MAC, vec![86, 0x78])));
    }
}
