//! Attribute-bearing layers reachable through get/set messages.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use g3usi_frame::{ADP, COORD, MAC};
use g3usi_proto::adp::{AdpEventKind, AdpRequest};
use g3usi_proto::coord::{CoordEventKind, CoordRequest};
use g3usi_proto::mac::{MacEventKind, MacRequest};
use g3usi_proto::{
    AttributeTable, CodecConfig, GetRequest, SetRequest, ADP_TABLE, COORD_TABLE, MAC_TABLE,
};

use crate::correlation::SyncChannel;
use crate::event::ConfirmKey;

/// Which attribute space a get/set addresses, and through which sub-protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// ADP information base, via ADP.
    Adp,
    /// MAC information base, tunnelled through ADP.
    AdpMac,
    /// MAC information base, via the MAC sub-protocol.
    Mac,
    /// Coordinator parameters.
    Coord,
}

impl Layer {
    pub const ALL: [Layer; 4] = [Layer::Adp, Layer::AdpMac, Layer::Mac, Layer::Coord];

    pub fn name(self) -> &'static str {
        match self {
            Layer::Adp => "adp",
            Layer::AdpMac => "adp-mac",
            Layer::Mac => "mac",
            Layer::Coord => "coord",
        }
    }

    /// Discriminator the requests travel on.
    pub fn protocol(self) -> u8 {
        match self {
            Layer::Adp | Layer::AdpMac => ADP,
            Layer::Mac => MAC,
            Layer::Coord => COORD,
        }
    }

    pub fn table(self) -> &'static AttributeTable {
        match self {
            Layer::Adp => &ADP_TABLE,
            Layer::AdpMac | Layer::Mac => &MAC_TABLE,
            Layer::Coord => &COORD_TABLE,
        }
    }

    pub fn channel(self, id: u32, cfg: &CodecConfig) -> SyncChannel {
        match self {
            Layer::Adp => SyncChannel::adp(id, cfg),
            Layer::AdpMac | Layer::Mac => SyncChannel::mac(id, cfg),
            Layer::Coord => SyncChannel::Coord,
        }
    }

    /// Key of the get confirm answering this layer's get request.
    pub fn get_confirm_key(self) -> ConfirmKey {
        let kind = match self {
            Layer::Adp => AdpEventKind::GetConfirm.code(),
            Layer::AdpMac => AdpEventKind::MacGetConfirm.code(),
            Layer::Mac => MacEventKind::GetConfirm.code(),
            Layer::Coord => CoordEventKind::GetConfirm.code(),
        };
        ConfirmKey::new(self.protocol(), kind)
    }

    pub fn set_confirm_key(self) -> ConfirmKey {
        let kind = match self {
            Layer::Adp => AdpEventKind::SetConfirm.code(),
            Layer::AdpMac => AdpEventKind::MacSetConfirm.code(),
            Layer::Mac => MacEventKind::SetConfirm.code(),
            Layer::Coord => CoordEventKind::SetConfirm.code(),
        };
        ConfirmKey::new(self.protocol(), kind)
    }

    /// Payload (command byte included) of a get request.
    pub fn encode_get(self, req: GetRequest, cfg: &CodecConfig) -> g3usi_proto::Result<Bytes> {
        match self {
            Layer::Adp => AdpRequest::GetRequest(req).encode(cfg),
            Layer::AdpMac => AdpRequest::MacGetRequest(req).encode(cfg),
            Layer::Mac => MacRequest::GetRequest(req).encode(cfg),
            Layer::Coord => CoordRequest::GetRequest(req).encode(cfg),
        }
    }

    pub fn encode_set(self, req: SetRequest, cfg: &CodecConfig) -> g3usi_proto::Result<Bytes> {
        match self {
            Layer::Adp => AdpRequest::SetRequest(req).encode(cfg),
            Layer::AdpMac => AdpRequest::MacSetRequest(req).encode(cfg),
            Layer::Mac => MacRequest::SetRequest(req).encode(cfg),
            Layer::Coord => CoordRequest::SetRequest(req).encode(cfg),
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Layer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "adp" => Ok(Layer::Adp),
            "adp-mac" | "adpmac" => Ok(Layer::AdpMac),
            "mac" => Ok(Layer::Mac),
            "coord" | "coordinator" => Ok(Layer::Coord),
            other => Err(format!(
                "unknown layer '{other}' (expected adp, adp-mac, mac or coord)"
            )),
        }
    }
}
