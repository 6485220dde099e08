//! Fixed-size composite attribute values.
//!
//! Multi-byte fields follow [`CodecConfig::order`]. Rows marked with a media
//! trailer carry one extra byte when [`CodecConfig::hybrid`] is set.

use bytes::{BufMut, BytesMut};

use crate::attribute::CodecConfig;
use crate::error::{CodecError, Result};
use crate::wire::{put_u16, put_u32, Reader};

/// Composite value kinds referenced by the attribute tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    RoutingEntry,
    BlacklistEntry,
    PrefixEntry,
    ContextEntry,
    BroadcastLogEntry,
    NeighbourEntry,
    PosEntry,
    DeviceTableEntry,
    BandInfo,
    SoftVersion,
}

impl RecordKind {
    pub fn name(self) -> &'static str {
        match self {
            RecordKind::RoutingEntry => "routing entry",
            RecordKind::BlacklistEntry => "blacklist entry",
            RecordKind::PrefixEntry => "prefix entry",
            RecordKind::ContextEntry => "context entry",
            RecordKind::BroadcastLogEntry => "broadcast log entry",
            RecordKind::NeighbourEntry => "neighbour entry",
            RecordKind::PosEntry => "POS entry",
            RecordKind::DeviceTableEntry => "device table entry",
            RecordKind::BandInfo => "band information",
            RecordKind::SoftVersion => "software version",
        }
    }

    /// Encoded size under `cfg`.
    pub fn wire_len(self, cfg: &CodecConfig) -> usize {
        match self {
            RecordKind::RoutingEntry => RoutingEntry::wire_len(cfg),
            RecordKind::BlacklistEntry => BlacklistEntry::wire_len(cfg),
            RecordKind::PrefixEntry => PrefixEntry::wire_len(cfg),
            RecordKind::ContextEntry => ContextEntry::wire_len(cfg),
            RecordKind::BroadcastLogEntry => BroadcastLogEntry::wire_len(cfg),
            RecordKind::NeighbourEntry => NeighbourEntry::wire_len(cfg),
            RecordKind::PosEntry => PosEntry::wire_len(cfg),
            RecordKind::DeviceTableEntry => DeviceTableEntry::wire_len(cfg),
            RecordKind::BandInfo => BandInfo::wire_len(cfg),
            RecordKind::SoftVersion => SoftVersion::wire_len(cfg),
        }
    }

    /// Decode a value of this kind; the reader must hold exactly one record.
    pub fn decode(self, r: &mut Reader<'_>, cfg: &CodecConfig) -> Result<Record> {
        Ok(match self {
            RecordKind::RoutingEntry => Record::Routing(RoutingEntry::decode(r, cfg)?),
            RecordKind::BlacklistEntry => Record::Blacklist(BlacklistEntry::decode(r, cfg)?),
            RecordKind::PrefixEntry => Record::Prefix(PrefixEntry::decode(r, cfg)?),
            RecordKind::ContextEntry => Record::Context(ContextEntry::decode(r, cfg)?),
            RecordKind::BroadcastLogEntry => {
                Record::BroadcastLog(BroadcastLogEntry::decode(r, cfg)?)
            }
            RecordKind::NeighbourEntry => Record::Neighbour(NeighbourEntry::decode(r, cfg)?),
            RecordKind::PosEntry => Record::Pos(PosEntry::decode(r, cfg)?),
            RecordKind::DeviceTableEntry => Record::Device(DeviceTableEntry::decode(r, cfg)?),
            RecordKind::BandInfo => Record::Band(BandInfo::decode(r, cfg)?),
            RecordKind::SoftVersion => Record::Version(SoftVersion::decode(r, cfg)?),
        })
    }
}

/// A decoded composite value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Routing(RoutingEntry),
    Blacklist(BlacklistEntry),
    Prefix(PrefixEntry),
    Context(ContextEntry),
    BroadcastLog(BroadcastLogEntry),
    Neighbour(NeighbourEntry),
    Pos(PosEntry),
    Device(DeviceTableEntry),
    Band(BandInfo),
    Version(SoftVersion),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Routing(_) => RecordKind::RoutingEntry,
            Record::Blacklist(_) => RecordKind::BlacklistEntry,
            Record::Prefix(_) => RecordKind::PrefixEntry,
            Record::Context(_) => RecordKind::ContextEntry,
            Record::BroadcastLog(_) => RecordKind::BroadcastLogEntry,
            Record::Neighbour(_) => RecordKind::NeighbourEntry,
            Record::Pos(_) => RecordKind::PosEntry,
            Record::Device(_) => RecordKind::DeviceTableEntry,
            Record::Band(_) => RecordKind::BandInfo,
            Record::Version(_) => RecordKind::SoftVersion,
        }
    }

    pub fn encode(&self, dst: &mut BytesMut, cfg: &CodecConfig) {
        match self {
            Record::Routing(r) => r.encode(dst, cfg),
            Record::Blacklist(r) => r.encode(dst, cfg),
            Record::Prefix(r) => r.encode(dst, cfg),
            Record::Context(r) => r.encode(dst, cfg),
            Record::BroadcastLog(r) => r.encode(dst, cfg),
            Record::Neighbour(r) => r.encode(dst, cfg),
            Record::Pos(r) => r.encode(dst, cfg),
            Record::Device(r) => r.encode(dst, cfg),
            Record::Band(r) => r.encode(dst, cfg),
            Record::Version(r) => r.encode(dst, cfg),
        }
    }
}

/// A fixed-size composite value.
pub trait WireRecord: Sized {
    fn wire_len(cfg: &CodecConfig) -> usize;
    fn encode(&self, dst: &mut BytesMut, cfg: &CodecConfig);
    fn decode(r: &mut Reader<'_>, cfg: &CodecConfig) -> Result<Self>;
}

fn media_len(cfg: &CodecConfig) -> usize {
    usize::from(cfg.hybrid)
}

fn put_media(dst: &mut BytesMut, media_type: Option<u8>, cfg: &CodecConfig) {
    if cfg.hybrid {
        dst.put_u8(media_type.unwrap_or(0));
    }
}

fn get_media(r: &mut Reader<'_>, cfg: &CodecConfig) -> Result<Option<u8>> {
    if cfg.hybrid {
        Ok(Some(r.u8()?))
    } else {
        Ok(None)
    }
}

/// Adaptation layer routing table entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingEntry {
    pub destination: u16,
    pub next_hop: u16,
    pub route_cost: u16,
    /// 4 bits.
    pub hop_count: u8,
    /// 4 bits.
    pub weak_link_count: u8,
    /// Minutes.
    pub valid_time: u16,
    /// Present in hybrid builds.
    pub media_type: Option<u8>,
}

/// Pack hop count (low nibble) and weak link count (high nibble).
pub fn pack_hops(hop_count: u8, weak_link_count: u8) -> u8 {
    (hop_count & 0x0F) | ((weak_link_count & 0x0F) << 4)
}

/// Inverse of [`pack_hops`]: (hop count, weak link count).
pub fn unpack_hops(b: u8) -> (u8, u8) {
    (b & 0x0F, b >> 4)
}

impl WireRecord for RoutingEntry {
    fn wire_len(cfg: &CodecConfig) -> usize {
        9 + media_len(cfg)
    }

    fn encode(&self, dst: &mut BytesMut, cfg: &CodecConfig) {
        put_u16(dst, self.destination, cfg.order);
        put_u16(dst, self.next_hop, cfg.order);
        put_u16(dst, self.route_cost, cfg.order);
        dst.put_u8(pack_hops(self.hop_count, self.weak_link_count));
        put_u16(dst, self.valid_time, cfg.order);
        put_media(dst, self.media_type, cfg);
    }

    fn decode(r: &mut Reader<'_>, cfg: &CodecConfig) -> Result<Self> {
        let destination = r.u16(cfg.order)?;
        let next_hop = r.u16(cfg.order)?;
        let route_cost = r.u16(cfg.order)?;
        let (hop_count, weak_link_count) = unpack_hops(r.u8()?);
        Ok(Self {
            destination,
            next_hop,
            route_cost,
            hop_count,
            weak_link_count,
            valid_time: r.u16(cfg.order)?,
            media_type: get_media(r, cfg)?,
        })
    }
}

/// Adaptation layer blacklisted neighbour.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlacklistEntry {
    pub address: u16,
    /// Minutes.
    pub valid_time: u16,
    /// Present in hybrid builds.
    pub media_type: Option<u8>,
}

impl WireRecord for BlacklistEntry {
    fn wire_len(cfg: &CodecConfig) -> usize {
        4 + media_len(cfg)
    }

    fn encode(&self, dst: &mut BytesMut, cfg: &CodecConfig) {
        put_u16(dst, self.address, cfg.order);
        put_u16(dst, self.valid_time, cfg.order);
        put_media(dst, self.media_type, cfg);
    }

    fn decode(r: &mut Reader<'_>, cfg: &CodecConfig) -> Result<Self> {
        Ok(Self {
            address: r.u16(cfg.order)?,
            valid_time: r.u16(cfg.order)?,
            media_type: get_media(r, cfg)?,
        })
    }
}

/// IPv6 prefix table entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixEntry {
    /// Prefix length in bits, at most 128.
    pub prefix_len: u8,
    pub on_link: bool,
    pub autonomous: bool,
    pub valid_lifetime: u32,
    pub preferred_lifetime: u32,
    pub prefix: [u8; 16],
}

impl WireRecord for PrefixEntry {
    fn wire_len(_cfg: &CodecConfig) -> usize {
        27
    }

    fn encode(&self, dst: &mut BytesMut, cfg: &CodecConfig) {
        dst.put_u8(self.prefix_len);
        dst.put_u8(self.on_link.into());
        dst.put_u8(self.autonomous.into());
        put_u32(dst, self.valid_lifetime, cfg.order);
        put_u32(dst, self.preferred_lifetime, cfg.order);
        dst.put_slice(&self.prefix);
    }

    fn decode(r: &mut Reader<'_>, cfg: &CodecConfig) -> Result<Self> {
        let prefix_len = r.u8()?;
        if prefix_len > 128 {
            return Err(CodecError::InvalidField {
                field: "prefix length",
                value: prefix_len.into(),
            });
        }
        Ok(Self {
            prefix_len,
            on_link: r.bool()?,
            autonomous: r.bool()?,
            valid_lifetime: r.u32(cfg.order)?,
            preferred_lifetime: r.u32(cfg.order)?,
            prefix: r.array()?,
        })
    }
}

/// 6LoWPAN header compression context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextEntry {
    /// Minutes.
    pub valid_time: u16,
    /// Context may be used for compression (flags bit 0).
    pub compress: bool,
    /// Context length in bits, at most 128.
    pub context_len: u8,
    pub context: [u8; 16],
}

impl WireRecord for ContextEntry {
    fn wire_len(_cfg: &CodecConfig) -> usize {
        20
    }

    fn encode(&self, dst: &mut BytesMut, cfg: &CodecConfig) {
        put_u16(dst, self.valid_time, cfg.order);
        dst.put_u8(u8::from(self.compress));
        dst.put_u8(self.context_len);
        dst.put_slice(&self.context);
    }

    fn decode(r: &mut Reader<'_>, cfg: &CodecConfig) -> Result<Self> {
        let valid_time = r.u16(cfg.order)?;
        let flags = r.u8()?;
        if flags & !0x01 != 0 {
            return Err(CodecError::InvalidField {
                field: "context flags",
                value: flags.into(),
            });
        }
        let context_len = r.u8()?;
        if context_len > 128 {
            return Err(CodecError::InvalidField {
                field: "context length",
                value: context_len.into(),
            });
        }
        Ok(Self {
            valid_time,
            compress: flags & 0x01 != 0,
            context_len,
            context: r.array()?,
        })
    }
}

/// Broadcast log (duplicate suppression) entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastLogEntry {
    pub source: u16,
    pub sequence_number: u8,
    /// Minutes.
    pub valid_time: u16,
}

impl WireRecord for BroadcastLogEntry {
    fn wire_len(_cfg: &CodecConfig) -> usize {
        5
    }

    fn encode(&self, dst: &mut BytesMut, cfg: &CodecConfig) {
        put_u16(dst, self.source, cfg.order);
        dst.put_u8(self.sequence_number);
        put_u16(dst, self.valid_time, cfg.order);
    }

    fn decode(r: &mut Reader<'_>, cfg: &CodecConfig) -> Result<Self> {
        Ok(Self {
            source: r.u16(cfg.order)?,
            sequence_number: r.u8()?,
            valid_time: r.u16(cfg.order)?,
        })
    }
}

/// MAC neighbour table entry.
///
/// Byte layout (16 bytes):
/// ```text
///  0..2   short address
///  2..5   tone map (24 bits, one per sub-band)
///  5      bits 0-2 modulation type | bit 3 modulation scheme | bits 4-6 phase differential
///  6      bits 0-3 tx gain | bit 4 tx resolution
///  7..10  tx coefficients (24 bits)
///  10     LQI
///  11..13 tone map response valid time
///  13..15 neighbour valid time
///  15     reverse LQI
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeighbourEntry {
    pub short_address: u16,
    pub tone_map: [u8; 3],
    /// 3 bits.
    pub modulation_type: u8,
    /// 1 bit: 0 differential, 1 coherent.
    pub modulation_scheme: u8,
    /// 3 bits.
    pub phase_differential: u8,
    /// 4 bits.
    pub tx_gain: u8,
    /// 1 bit.
    pub tx_res: u8,
    pub tx_coef: [u8; 3],
    pub lqi: u8,
    pub tmr_valid_time: u16,
    pub neighbour_valid_time: u16,
    pub reverse_lqi: u8,
}

/// Pack modulation type, scheme and phase differential into byte 5.
pub fn pack_modulation(modulation_type: u8, scheme: u8, phase_differential: u8) -> u8 {
    (modulation_type & 0x07) | ((scheme & 0x01) << 3) | ((phase_differential & 0x07) << 4)
}

/// Inverse of [`pack_modulation`].
pub fn unpack_modulation(b: u8) -> (u8, u8, u8) {
    (b & 0x07, (b >> 3) & 0x01, (b >> 4) & 0x07)
}

/// Pack tx gain and tx resolution into byte 6.
pub fn pack_tx(tx_gain: u8, tx_res: u8) -> u8 {
    (tx_gain & 0x0F) | ((tx_res & 0x01) << 4)
}

/// Inverse of [`pack_tx`].
pub fn unpack_tx(b: u8) -> (u8, u8) {
    (b & 0x0F, (b >> 4) & 0x01)
}

impl WireRecord for NeighbourEntry {
    fn wire_len(_cfg: &CodecConfig) -> usize {
        16
    }

    fn encode(&self, dst: &mut BytesMut, cfg: &CodecConfig) {
        put_u16(dst, self.short_address, cfg.order);
        dst.put_slice(&self.tone_map);
        dst.put_u8(pack_modulation(
            self.modulation_type,
            self.modulation_scheme,
            self.phase_differential,
        ));
        dst.put_u8(pack_tx(self.tx_gain, self.tx_res));
        dst.put_slice(&self.tx_coef);
        dst.put_u8(self.lqi);
        put_u16(dst, self.tmr_valid_time, cfg.order);
        put_u16(dst, self.neighbour_valid_time, cfg.order);
        dst.put_u8(self.reverse_lqi);
    }

    fn decode(r: &mut Reader<'_>, cfg: &CodecConfig) -> Result<Self> {
        let short_address = r.u16(cfg.order)?;
        let tone_map = r.array()?;
        let modulation = r.u8()?;
        if modulation & 0x80 != 0 {
            return Err(CodecError::InvalidField {
                field: "neighbour modulation byte",
                value: modulation.into(),
            });
        }
        let (modulation_type, modulation_scheme, phase_differential) =
            unpack_modulation(modulation);
        let tx = r.u8()?;
        if tx & 0xE0 != 0 {
            return Err(CodecError::InvalidField {
                field: "neighbour tx byte",
                value: tx.into(),
            });
        }
        let (tx_gain, tx_res) = unpack_tx(tx);
        Ok(Self {
            short_address,
            tone_map,
            modulation_type,
            modulation_scheme,
            phase_differential,
            tx_gain,
            tx_res,
            tx_coef: r.array()?,
            lqi: r.u8()?,
            tmr_valid_time: r.u16(cfg.order)?,
            neighbour_valid_time: r.u16(cfg.order)?,
            reverse_lqi: r.u8()?,
        })
    }
}

/// MAC personal operating space entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PosEntry {
    pub short_address: u16,
    pub lqi: u8,
    /// Minutes.
    pub valid_time: u16,
}

impl WireRecord for PosEntry {
    fn wire_len(_cfg: &CodecConfig) -> usize {
        5
    }

    fn encode(&self, dst: &mut BytesMut, cfg: &CodecConfig) {
        put_u16(dst, self.short_address, cfg.order);
        dst.put_u8(self.lqi);
        put_u16(dst, self.valid_time, cfg.order);
    }

    fn decode(r: &mut Reader<'_>, cfg: &CodecConfig) -> Result<Self> {
        Ok(Self {
            short_address: r.u16(cfg.order)?,
            lqi: r.u8()?,
            valid_time: r.u16(cfg.order)?,
        })
    }
}

/// MAC security device table entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceTableEntry {
    pub pan_id: u16,
    pub short_address: u16,
    pub frame_counter: u32,
}

impl WireRecord for DeviceTableEntry {
    fn wire_len(_cfg: &CodecConfig) -> usize {
        8
    }

    fn encode(&self, dst: &mut BytesMut, cfg: &CodecConfig) {
        put_u16(dst, self.pan_id, cfg.order);
        put_u16(dst, self.short_address, cfg.order);
        put_u32(dst, self.frame_counter, cfg.order);
    }

    fn decode(r: &mut Reader<'_>, cfg: &CodecConfig) -> Result<Self> {
        Ok(Self {
            pan_id: r.u16(cfg.order)?,
            short_address: r.u16(cfg.order)?,
            frame_counter: r.u32(cfg.order)?,
        })
    }
}

/// PHY band parameters reported by the modem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BandInfo {
    /// Maximum frame length in symbols.
    pub fl_max: u16,
    pub band: u8,
    pub tones: u8,
    pub carriers: u8,
    pub tones_in_carrier: u8,
    pub fl_band: u8,
    pub max_rs_blocks: u8,
    pub tx_coef_bits: u8,
    pub pilots_freq_spa: u8,
}

impl WireRecord for BandInfo {
    fn wire_len(_cfg: &CodecConfig) -> usize {
        10
    }

    fn encode(&self, dst: &mut BytesMut, cfg: &CodecConfig) {
        put_u16(dst, self.fl_max, cfg.order);
        dst.put_slice(&[
            self.band,
            self.tones,
            self.carriers,
            self.tones_in_carrier,
            self.fl_band,
            self.max_rs_blocks,
            self.tx_coef_bits,
            self.pilots_freq_spa,
        ]);
    }

    fn decode(r: &mut Reader<'_>, cfg: &CodecConfig) -> Result<Self> {
        let fl_max = r.u16(cfg.order)?;
        let [band, tones, carriers, tones_in_carrier, fl_band, max_rs_blocks, tx_coef_bits, pilots_freq_spa] =
            r.array::<8>()?;
        Ok(Self {
            fl_max,
            band,
            tones,
            carriers,
            tones_in_carrier,
            fl_band,
            max_rs_blocks,
            tx_coef_bits,
            pilots_freq_spa,
        })
    }
}

/// Firmware version: major.minor.revision plus build date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoftVersion {
    pub major: u8,
    pub minor: u8,
    pub revision: u8,
    /// Years since 2000.
    pub year: u8,
    pub month: u8,
    pub day: u8,
}

impl WireRecord for SoftVersion {
    fn wire_len(_cfg: &CodecConfig) -> usize {
        6
    }

    fn encode(&self, dst: &mut BytesMut, _cfg: &CodecConfig) {
        dst.put_slice(&[
            self.major,
            self.minor,
            self.revision,
            self.year,
            self.month,
            self.day,
        ]);
    }

    fn decode(r: &mut Reader<'_>, _cfg: &CodecConfig) -> Result<Self> {
        let [major, minor, revision, year, month, day] = r.array::<6>()?;
        Ok(Self {
            major,
            minor,
            revision,
            year,
            month,
            day,
        })
    }
}

impl std::fmt::Display for SoftVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}.{} (20{:02}-{:02}-{:02})",
            self.major, self.minor, self.revision, self.year, self.month, self.day
        )
    }
}
