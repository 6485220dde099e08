//! Decoded device-to-host messages.

use g3usi_frame::{ADP, COORD, MAC, MNGP};
use g3usi_proto::adp::AdpEvent;
use g3usi_proto::coord::CoordEvent;
use g3usi_proto::mac::MacEvent;
use g3usi_proto::mngp::MngpMessage;
use g3usi_proto::{GetConfirm, SetConfirm};

/// A confirm or indication from one of the control sub-protocols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Adp(AdpEvent),
    Mac(MacEvent),
    Coord(CoordEvent),
    Mngp(MngpMessage),
}

/// Correlation key: sub-protocol plus message kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfirmKey {
    pub protocol: u8,
    pub kind: u8,
}

impl ConfirmKey {
    pub const fn new(protocol: u8, kind: u8) -> Self {
        Self { protocol, kind }
    }
}

impl Event {
    /// Discriminator of the sub-protocol this event arrived on.
    pub fn protocol(&self) -> u8 {
        match self {
            Event::Adp(_) => ADP,
            Event::Mac(_) => MAC,
            Event::Coord(_) => COORD,
            Event::Mngp(_) => MNGP,
        }
    }

    /// Command byte of the event.
    pub fn kind_code(&self) -> u8 {
        match self {
            Event::Adp(ev) => ev.kind().code(),
            Event::Mac(ev) => ev.kind().code(),
            Event::Coord(ev) => ev.kind().code(),
            Event::Mngp(msg) => msg.kind().code(),
        }
    }

    /// Message kind name, for logs and the CLI.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Event::Adp(ev) => ev.kind().name(),
            Event::Mac(ev) => ev.kind().name(),
            Event::Coord(ev) => ev.kind().name(),
            Event::Mngp(msg) => msg.kind().name(),
        }
    }

    pub fn key(&self) -> ConfirmKey {
        ConfirmKey::new(self.protocol(), self.kind_code())
    }

    /// The get confirm carried by this event, whichever layer it came from.
    pub fn into_get_confirm(self) -> Option<GetConfirm> {
        match self {
            Event::Adp(AdpEvent::GetConfirm(c))
            | Event::Adp(AdpEvent::MacGetConfirm(c))
            | Event::Mac(MacEvent::GetConfirm(c))
            | Event::Coord(CoordEvent::GetConfirm(c)) => Some(c),
            _ => None,
        }
    }

    /// The set confirm carried by this event, whichever layer it came from.
    pub fn into_set_confirm(self) -> Option<SetConfirm> {
        match self {
            Event::Adp(AdpEvent::SetConfirm(c))
            | Event::Adp(AdpEvent::MacSetConfirm(c))
            | Event::Mac(MacEvent::SetConfirm(c))
            | Event::Coord(CoordEvent::SetConfirm(c)) => Some(c),
            _ => None,
        }
    }
}
