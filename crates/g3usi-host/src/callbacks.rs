//! Asynchronous delivery targets, one per message kind.
//!
//! The table is assembled once with [`CallbackTableBuilder`] and is immutable
//! afterwards. Callbacks run on the thread that pumps the link and must not
//! make synchronous calls on the same host.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use g3usi_proto::adp::{AdpEvent, AdpEventKind};
use g3usi_proto::coord::{CoordEvent, CoordEventKind};
use g3usi_proto::mac::{MacEvent, MacEventKind};
use g3usi_proto::mngp::MngpMessage;
use tracing::debug;

use crate::error::{HostError, Result};
use crate::event::Event;

pub type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Receives raw sniffer frames verbatim.
pub type SnifferSink = Arc<dyn Fn(&[u8]) + Send + Sync>;

/// Immutable per-kind callback table.
#[derive(Default)]
pub struct CallbackTable {
    adp: HashMap<AdpEventKind, Callback<AdpEvent>>,
    mac: HashMap<MacEventKind, Callback<MacEvent>>,
    coord: HashMap<CoordEventKind, Callback<CoordEvent>>,
    mngp: Option<Callback<MngpMessage>>,
    sniffer: Option<SnifferSink>,
}

impl fmt::Debug for CallbackTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackTable")
            .field("adp", &self.adp.len())
            .field("mac", &self.mac.len())
            .field("coord", &self.coord.len())
            .field("mngp", &self.mngp.is_some())
            .field("sniffer", &self.sniffer.is_some())
            .finish()
    }
}

impl CallbackTable {
    pub fn builder() -> CallbackTableBuilder {
        CallbackTableBuilder::default()
    }

    /// Call the callback registered for the event's kind.
    ///
    /// Returns `false` when none is registered.
    pub fn deliver(&self, event: &Event) -> bool {
        let delivered = match event {
            Event::Adp(ev) => call(self.adp.get(&ev.kind()), ev),
            Event::Mac(ev) => call(self.mac.get(&ev.kind()), ev),
            Event::Coord(ev) => call(self.coord.get(&ev.kind()), ev),
            Event::Mngp(msg) => call(self.mngp.as_ref(), msg),
        };
        if !delivered {
            debug!(
                protocol = event.protocol(),
                kind = event.kind_name(),
                "no callback registered, event dropped"
            );
        }
        delivered
    }

    /// Hand a sniffer frame to the sink.
    pub fn deliver_sniffer(&self, payload: &[u8]) -> bool {
        match &self.sniffer {
            Some(sink) => {
                sink(payload);
                true
            }
            None => false,
        }
    }

    /// Number of registered callbacks, sniffer sink included.
    pub fn len(&self) -> usize {
        self.adp.len()
            + self.mac.len()
            + self.coord.len()
            + usize::from(self.mngp.is_some())
            + usize::from(self.sniffer.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn call<E>(callback: Option<&Callback<E>>, event: &E) -> bool {
    match callback {
        Some(cb) => {
            cb(event);
            true
        }
        None => false,
    }
}

/// Builder for [`CallbackTable`]. Registering a kind twice is an error.
#[derive(Default)]
pub struct CallbackTableBuilder {
    table: CallbackTable,
}

impl CallbackTableBuilder {
    pub fn on_adp<F>(mut self, kind: AdpEventKind, f: F) -> Result<Self>
    where
        F: Fn(&AdpEvent) + Send + Sync + 'static,
    {
        insert(&mut self.table.adp, "adp", kind, kind.code(), Arc::new(f))?;
        Ok(self)
    }

    pub fn on_mac<F>(mut self, kind: MacEventKind, f: F) -> Result<Self>
    where
        F: Fn(&MacEvent) + Send + Sync + 'static,
    {
        insert(&mut self.table.mac, "mac", kind, kind.code(), Arc::new(f))?;
        Ok(self)
    }

    pub fn on_coord<F>(mut self, kind: CoordEventKind, f: F) -> Result<Self>
    where
        F: Fn(&CoordEvent) + Send + Sync + 'static,
    {
        insert(&mut self.table.coord, "coord", kind, kind.code(), Arc::new(f))?;
        Ok(self)
    }

    /// Register one callback for every event of every control sub-protocol.
    pub fn on_every_event<F>(mut self, f: F) -> Result<Self>
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let f: Arc<dyn Fn(&Event) + Send + Sync> = Arc::new(f);
        for &kind in AdpEventKind::ALL {
            let f = Arc::clone(&f);
            let cb: Callback<AdpEvent> =
                Arc::new(move |ev: &AdpEvent| f(&Event::Adp(ev.clone())));
            insert(&mut self.table.adp, "adp", kind, kind.code(), cb)?;
        }
        for &kind in MacEventKind::ALL {
            let f = Arc::clone(&f);
            let cb: Callback<MacEvent> =
                Arc::new(move |ev: &MacEvent| f(&Event::Mac(ev.clone())));
            insert(&mut self.table.mac, "mac", kind, kind.code(), cb)?;
        }
        for &kind in CoordEventKind::ALL {
            let f = Arc::clone(&f);
            let cb: Callback<CoordEvent> =
                Arc::new(move |ev: &CoordEvent| f(&Event::Coord(ev.clone())));
            insert(&mut self.table.coord, "coord", kind, kind.code(), cb)?;
        }
        if self.table.mngp.is_some() {
            return Err(HostError::DuplicateCallback {
                protocol: "mngp",
                kind: 0,
            });
        }
        self.table.mngp = Some(Arc::new(move |msg: &MngpMessage| {
            f(&Event::Mngp(msg.clone()))
        }));
        Ok(self)
    }

    /// Unsolicited device-management messages.
    pub fn on_mngp<F>(mut self, f: F) -> Result<Self>
    where
        F: Fn(&MngpMessage) + Send + Sync + 'static,
    {
        if self.table.mngp.is_some() {
            return Err(HostError::DuplicateCallback {
                protocol: "mngp",
                kind: 0,
            });
        }
        self.table.mngp = Some(Arc::new(f));
        Ok(self)
    }

    pub fn on_sniffer<F>(mut self, f: F) -> Result<Self>
    where
        F: Fn(&[u8]) + Send + Sync + 'static,
    {
        if self.table.sniffer.is_some() {
            return Err(HostError::DuplicateCallback {
                protocol: "sniffer",
                kind: 0,
            });
        }
        self.table.sniffer = Some(Arc::new(f));
        Ok(self)
    }

    pub fn build(self) -> CallbackTable {
        self.table
    }
}

fn insert<K: std::hash::Hash + Eq, E>(
    map: &mut HashMap<K, Callback<E>>,
    protocol: &'static str,
    kind: K,
    code: u8,
    cb: Callback<E>,
) -> Result<()> {
    if map.contains_key(&kind) {
        return Err(HostError::DuplicateCallback {
            protocol,
            kind: code,
        });
    }
    map.insert(kind, cb);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use g3usi_proto::coord::LeaveIndication;
    use g3usi_proto::mngp::GetResponse;

    use super::*;

    #[test]
    fn delivers_by_kind() {
        let leaves = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&leaves);
        let table = CallbackTable::builder()
            .on_coord(CoordEventKind::LeaveIndication, move |ev| {
                if let CoordEvent::LeaveIndication(ind) = ev {
                    assert_eq!(ind.short_address, 7);
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            })
            .expect("first registration should succeed")
            .build();

        let leave = Event::Coord(CoordEvent::LeaveIndication(LeaveIndication {
            short_address: 7,
        }));
        assert!(table.deliver(&leave));
        assert_eq!(leaves.load(Ordering::SeqCst), 1);

        let unregistered = Event::Mngp(MngpMessage::GetResponse(GetResponse::default()));
        assert!(!table.deliver(&unregistered));
        assert!(!table.deliver_sniffer(&[0x01]));
    }

    #[test]
    fn duplicate_registration_fails() {
        let result = CallbackTable::builder()
            .on_adp(AdpEventKind::DataIndication, |_| {})
            .and_then(|b| b.on_adp(AdpEventKind::DataIndication, |_| {}));
        assert!(matches!(
            result,
            Err(HostError::DuplicateCallback {
                protocol: "adp",
                kind: 31
            })
        ));
    }

    #[test]
    fn every_event_covers_all_kinds() {
        let table = CallbackTable::builder()
            .on_every_event(|_| {})
            .expect("empty builder accepts every kind")
            .on_sniffer(|_| {})
            .expect("sniffer sink should register")
            .build();
        assert_eq!(
            table.len(),
            AdpEventKind::ALL.len() + MacEventKind::ALL.len() + CoordEventKind::ALL.len() + 2
        );
        assert!(CallbackTable::builder()
            .on_mac(MacEventKind::BeaconNotify, |_| {})
            .and_then(|b| b.on_every_event(|_| {}))
            .is_err());
    }
}
