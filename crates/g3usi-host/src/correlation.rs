//! Request/confirm correlation without transaction identifiers.
//!
//! Each logical channel has a single slot. A synchronous caller claims the
//! slot with the (sub-protocol, kind) of the confirm it expects, transmits,
//! and waits. The receive path offers every routable confirm to
//! [`Correlator::offer`]; a matching pending slot takes it, anything else is
//! handed back for callback delivery.

use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use g3usi_proto::adp::AdpEvent;
use g3usi_proto::coord::CoordEvent;
use g3usi_proto::mac::MacEvent;
use g3usi_proto::mngp::MngpMessage;
use g3usi_proto::{CodecConfig, ADP_TABLE, MAC_TABLE};
use tracing::{debug, warn};

use crate::error::{HostError, Result};
use crate::event::{ConfirmKey, Event};

/// Logical channel that can hold one synchronous call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncChannel {
    AdpPlc,
    AdpRf,
    MacPlc,
    MacRf,
    Coord,
    Mngp,
}

impl SyncChannel {
    pub const ALL: [SyncChannel; 6] = [
        SyncChannel::AdpPlc,
        SyncChannel::AdpRf,
        SyncChannel::MacPlc,
        SyncChannel::MacRf,
        SyncChannel::Coord,
        SyncChannel::Mngp,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Channel of an ADP attribute.
    pub fn adp(id: u32, cfg: &CodecConfig) -> Self {
        if cfg.hybrid && ADP_TABLE.is_rf(id) {
            SyncChannel::AdpRf
        } else {
            SyncChannel::AdpPlc
        }
    }

    /// Channel of a MAC attribute, whether reached through ADP or directly.
    pub fn mac(id: u32, cfg: &CodecConfig) -> Self {
        if cfg.hybrid && MAC_TABLE.is_rf(id) {
            SyncChannel::MacRf
        } else {
            SyncChannel::MacPlc
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SyncChannel::AdpPlc => "adp",
            SyncChannel::AdpRf => "adp-rf",
            SyncChannel::MacPlc => "mac",
            SyncChannel::MacRf => "mac-rf",
            SyncChannel::Coord => "coord",
            SyncChannel::Mngp => "mngp",
        }
    }
}

impl fmt::Display for SyncChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Channel a confirm belongs to, if any synchronous call could wait for it.
pub fn route(event: &Event, cfg: &CodecConfig) -> Option<SyncChannel> {
    let channel = match event {
        Event::Adp(AdpEvent::GetConfirm(c)) => SyncChannel::adp(c.attr.id, cfg),
        Event::Adp(AdpEvent::SetConfirm(c)) => SyncChannel::adp(c.attr.id, cfg),
        Event::Adp(AdpEvent::MacGetConfirm(c)) | Event::Mac(MacEvent::GetConfirm(c)) => {
            SyncChannel::mac(c.attr.id, cfg)
        }
        Event::Adp(AdpEvent::MacSetConfirm(c)) | Event::Mac(MacEvent::SetConfirm(c)) => {
            SyncChannel::mac(c.attr.id, cfg)
        }
        Event::Coord(CoordEvent::GetConfirm(_) | CoordEvent::SetConfirm(_)) => SyncChannel::Coord,
        Event::Mngp(MngpMessage::GetResponse(_) | MngpMessage::EnumResponse(_)) => {
            SyncChannel::Mngp
        }
        _ => return None,
    };
    Some(channel)
}

#[derive(Debug)]
enum SlotState {
    Idle,
    Pending(ConfirmKey),
    Done(Event),
    /// The waiter gave up; a matching confirm is late.
    Expired(ConfirmKey),
    Closed(String),
}

#[derive(Debug)]
struct Slot {
    state: Mutex<SlotState>,
    ready: Condvar,
}

impl Slot {
    fn new() -> Self {
        Self {
            state: Mutex::new(SlotState::Idle),
            ready: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Per-channel completion slots shared by callers and the receive path.
#[derive(Debug)]
pub struct Correlator {
    slots: [Slot; 6],
}

impl Default for Correlator {
    fn default() -> Self {
        Self::new()
    }
}

impl Correlator {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| Slot::new()),
        }
    }

    fn slot(&self, channel: SyncChannel) -> &Slot {
        &self.slots[channel.index()]
    }

    /// Claim `channel` for a call expecting the confirm `key`.
    ///
    /// Fails with [`HostError::Busy`] while another call holds the channel.
    pub fn begin(&self, channel: SyncChannel, key: ConfirmKey) -> Result<PendingCall<'_>> {
        let slot = self.slot(channel);
        let mut state = slot.lock();
        match &*state {
            SlotState::Idle | SlotState::Expired(_) => {
                *state = SlotState::Pending(key);
                Ok(PendingCall { slot, channel })
            }
            SlotState::Pending(_) | SlotState::Done(_) => Err(HostError::Busy(channel)),
            SlotState::Closed(reason) => Err(HostError::Disconnected(reason.clone())),
        }
    }

    /// Hand a decoded confirm to the waiting caller.
    ///
    /// Returns the event back when no caller is waiting for it; it then goes
    /// to the callback table.
    pub fn offer(&self, event: Event, cfg: &CodecConfig) -> Option<Event> {
        let Some(channel) = route(&event, cfg) else {
            return Some(event);
        };
        let key = event.key();
        let slot = self.slot(channel);
        let mut state = slot.lock();
        match &*state {
            SlotState::Pending(expected) if *expected == key => {
                debug!(%channel, kind = event.kind_name(), "confirm completes pending call");
                *state = SlotState::Done(event);
                slot.ready.notify_all();
                None
            }
            SlotState::Expired(expected) if *expected == key => {
                warn!(%channel, kind = event.kind_name(), "late confirm after timeout");
                *state = SlotState::Idle;
                Some(event)
            }
            _ => Some(event),
        }
    }

    /// Fail every waiter with [`HostError::Disconnected`] and refuse new calls.
    pub fn release_all(&self, reason: &str) {
        for slot in &self.slots {
            let mut state = slot.lock();
            if !matches!(&*state, SlotState::Closed(_)) {
                *state = SlotState::Closed(reason.to_string());
            }
            slot.ready.notify_all();
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(&*self.slots[0].lock(), SlotState::Closed(_))
    }

    /// Whether a call is waiting on `channel`.
    pub fn is_pending(&self, channel: SyncChannel) -> bool {
        matches!(&*self.slot(channel).lock(), SlotState::Pending(_))
    }
}

/// A claimed channel slot. Dropping it releases the channel.
#[derive(Debug)]
pub struct PendingCall<'a> {
    slot: &'a Slot,
    channel: SyncChannel,
}

impl PendingCall<'_> {
    pub fn channel(&self) -> SyncChannel {
        self.channel
    }

    /// The outcome, if the call has completed.
    pub fn poll(&self) -> Option<Result<Event>> {
        settle(&mut self.slot.lock())
    }

    /// Block up to `timeout` for the call to complete.
    pub fn wait(&self, timeout: Duration) -> Option<Result<Event>> {
        let state = self.slot.lock();
        let (mut state, _) = self
            .slot
            .ready
            .wait_timeout_while(state, timeout, |s| matches!(s, SlotState::Pending(_)))
            .unwrap_or_else(PoisonError::into_inner);
        settle(&mut state)
    }
}

impl Drop for PendingCall<'_> {
    fn drop(&mut self) {
        let mut state = self.slot.lock();
        match &*state {
            SlotState::Pending(key) => {
                debug!(channel = %self.channel, "releasing slot without a confirm");
                *state = SlotState::Expired(*key);
            }
            SlotState::Done(_) => *state = SlotState::Idle,
            _ => {}
        }
    }
}

fn settle(state: &mut SlotState) -> Option<Result<Event>> {
    match state {
        SlotState::Pending(_) => None,
        SlotState::Closed(reason) => Some(Err(HostError::Disconnected(reason.clone()))),
        SlotState::Done(_) => match std::mem::replace(state, SlotState::Idle) {
            SlotState::Done(event) => Some(Ok(event)),
            _ => None,
        },
        SlotState::Idle | SlotState::Expired(_) => {
            Some(Err(HostError::UnexpectedConfirm("slot released while waiting")))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use g3usi_frame::{ADP, COORD};
    use g3usi_proto::adp::AdpEventKind;
    use g3usi_proto::coord::CoordEventKind;
    use g3usi_proto::tables::adp as adp_pib;
    use g3usi_proto::{AttributeRef, AttributeValue, GetConfirm, SetConfirm, Status};

    use super::*;

    fn adp_get_key() -> ConfirmKey {
        ConfirmKey::new(ADP, AdpEventKind::GetConfirm.code())
    }

    fn adp_get_confirm(id: u32) -> Event {
        Event::Adp(AdpEvent::GetConfirm(GetConfirm::success(
            AttributeRef::new(id, 0),
            AttributeValue::new(vec![0x0A]).expect("value fits"),
        )))
    }

    #[test]
    fn matching_confirm_completes_call() {
        let correlator = Correlator::new();
        let cfg = CodecConfig::default();
        let pending = correlator
            .begin(SyncChannel::AdpPlc, adp_get_key())
            .expect("slot should be free");
        assert!(correlator.is_pending(SyncChannel::AdpPlc));
        assert!(pending.poll().is_none());

        assert!(correlator
            .offer(adp_get_confirm(adp_pib::MAX_HOPS), &cfg)
            .is_none());
        let event = pending
            .poll()
            .expect("call should be complete")
            .expect("call should succeed");
        assert_eq!(event, adp_get_confirm(adp_pib::MAX_HOPS));
    }

    #[test]
    fn second_claim_is_busy() {
        let correlator = Correlator::new();
        let _first = correlator
            .begin(SyncChannel::AdpPlc, adp_get_key())
            .expect("slot should be free");
        let second = correlator.begin(SyncChannel::AdpPlc, adp_get_key());
        assert!(matches!(second, Err(HostError::Busy(SyncChannel::AdpPlc))));

        // Other channels are independent.
        let coord_key = ConfirmKey::new(COORD, CoordEventKind::GetConfirm.code());
        assert!(correlator.begin(SyncChannel::Coord, coord_key).is_ok());
    }

    #[test]
    fn other_kind_falls_through() {
        let correlator = Correlator::new();
        let cfg = CodecConfig::default();
        let _pending = correlator
            .begin(SyncChannel::AdpPlc, adp_get_key())
            .expect("slot should be free");

        let set = Event::Adp(AdpEvent::SetConfirm(SetConfirm {
            status: Status::Success,
            attr: AttributeRef::new(adp_pib::MAX_HOPS, 0),
        }));
        assert_eq!(correlator.offer(set.clone(), &cfg), Some(set));
        assert!(correlator.is_pending(SyncChannel::AdpPlc));
    }

    #[test]
    fn released_slot_passes_late_confirm_on() {
        let correlator = Correlator::new();
        let cfg = CodecConfig::default();
        {
            let pending = correlator
                .begin(SyncChannel::AdpPlc, adp_get_key())
                .expect("slot should be free");
            assert!(pending.wait(Duration::from_millis(10)).is_none());
        }
        assert!(!correlator.is_pending(SyncChannel::AdpPlc));

        let late = adp_get_confirm(adp_pib::MAX_HOPS);
        assert_eq!(correlator.offer(late.clone(), &cfg), Some(late));
        assert!(correlator
            .begin(SyncChannel::AdpPlc, adp_get_key())
            .is_ok());
    }

    #[test]
    fn rf_attributes_use_rf_channel_only_when_hybrid() {
        let plc = CodecConfig::default();
        let hybrid = CodecConfig::default().with_hybrid(true);
        assert_eq!(SyncChannel::adp(0xD0, &plc), SyncChannel::AdpPlc);
        assert_eq!(SyncChannel::adp(0xD0, &hybrid), SyncChannel::AdpRf);
        assert_eq!(SyncChannel::adp(0x0F, &hybrid), SyncChannel::AdpPlc);
        assert_eq!(SyncChannel::mac(0x0000_0200, &hybrid), SyncChannel::MacRf);
        assert_eq!(SyncChannel::mac(0x0000_0053, &hybrid), SyncChannel::MacPlc);

        let correlator = Correlator::new();
        let _pending = correlator
            .begin(SyncChannel::AdpPlc, adp_get_key())
            .expect("slot should be free");
        // An RF confirm does not complete the PLC call.
        let rf = adp_get_confirm(0xD0);
        assert_eq!(correlator.offer(rf.clone(), &hybrid), Some(rf));
    }

    #[test]
    fn release_all_wakes_waiter() {
        let correlator = Arc::new(Correlator::new());
        let waiter = {
            let correlator = Arc::clone(&correlator);
            thread::spawn(move || {
                let pending = correlator
                    .begin(SyncChannel::Coord, ConfirmKey::new(COORD, 61))
                    .expect("slot should be free");
                pending.wait(Duration::from_secs(5))
            })
        };
        while !correlator.is_pending(SyncChannel::Coord) {
            thread::yield_now();
        }
        correlator.release_all("link closed");

        let outcome = waiter.join().expect("waiter should not panic");
        assert!(matches!(outcome, Some(Err(HostError::Disconnected(_)))));
        assert!(correlator.is_closed());
        assert!(matches!(
            correlator.begin(SyncChannel::AdpPlc, adp_get_key()),
            Err(HostError::Disconnected(_))
        ));
    }
}
