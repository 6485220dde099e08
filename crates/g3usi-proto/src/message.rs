//! Shared plumbing for the sub-protocol message catalogs.
//!
//! Every message payload starts with a one-byte command that selects the
//! message kind; the body follows. Header fields (addresses, PAN ids, lengths)
//! are big-endian regardless of [`CodecConfig::order`].

use bytes::{BufMut, Bytes, BytesMut};

use crate::attribute::CodecConfig;
use crate::error::{CodecError, Result};
use crate::status::Status;
use crate::wire::{put_u16_prefixed, Reader};

/// Body of one message kind (everything after the command byte).
pub trait MessageBody: Sized {
    fn encode_body(&self, dst: &mut BytesMut, cfg: &CodecConfig) -> Result<()>;
    fn decode_body(r: &mut Reader<'_>, cfg: &CodecConfig) -> Result<Self>;
}

/// A single field of a message body.
pub trait WireField: Sized {
    fn put(&self, dst: &mut BytesMut, cfg: &CodecConfig) -> Result<()>;
    fn get(r: &mut Reader<'_>, cfg: &CodecConfig) -> Result<Self>;
}

impl WireField for u8 {
    fn put(&self, dst: &mut BytesMut, _cfg: &CodecConfig) -> Result<()> {
        dst.put_u8(*self);
        Ok(())
    }

    fn get(r: &mut Reader<'_>, _cfg: &CodecConfig) -> Result<Self> {
        r.u8()
    }
}

impl WireField for bool {
    fn put(&self, dst: &mut BytesMut, _cfg: &CodecConfig) -> Result<()> {
        dst.put_u8((*self).into());
        Ok(())
    }

    fn get(r: &mut Reader<'_>, _cfg: &CodecConfig) -> Result<Self> {
        r.bool()
    }
}

impl WireField for u16 {
    fn put(&self, dst: &mut BytesMut, _cfg: &CodecConfig) -> Result<()> {
        dst.put_u16(*self);
        Ok(())
    }

    fn get(r: &mut Reader<'_>, _cfg: &CodecConfig) -> Result<Self> {
        r.u16_be()
    }
}

impl WireField for u32 {
    fn put(&self, dst: &mut BytesMut, _cfg: &CodecConfig) -> Result<()> {
        dst.put_u32(*self);
        Ok(())
    }

    fn get(r: &mut Reader<'_>, _cfg: &CodecConfig) -> Result<Self> {
        r.u32_be()
    }
}

impl<const N: usize> WireField for [u8; N] {
    fn put(&self, dst: &mut BytesMut, _cfg: &CodecConfig) -> Result<()> {
        dst.put_slice(self);
        Ok(())
    }

    fn get(r: &mut Reader<'_>, _cfg: &CodecConfig) -> Result<Self> {
        r.array::<N>()
    }
}

impl WireField for Status {
    fn put(&self, dst: &mut BytesMut, _cfg: &CodecConfig) -> Result<()> {
        dst.put_u8(self.code());
        Ok(())
    }

    fn get(r: &mut Reader<'_>, _cfg: &CodecConfig) -> Result<Self> {
        Ok(Status::from(r.u8()?))
    }
}

/// Data units (NSDU, MSDU) carry a big-endian u16 length prefix.
impl WireField for Bytes {
    fn put(&self, dst: &mut BytesMut, _cfg: &CodecConfig) -> Result<()> {
        put_u16_prefixed(dst, "data unit", self)
    }

    fn get(r: &mut Reader<'_>, _cfg: &CodecConfig) -> Result<Self> {
        r.bytes_u16_prefixed()
    }
}

/// Media-type trailer: one byte in hybrid builds, absent otherwise.
impl WireField for Option<u8> {
    fn put(&self, dst: &mut BytesMut, cfg: &CodecConfig) -> Result<()> {
        if cfg.hybrid {
            dst.put_u8(self.unwrap_or(0));
        }
        Ok(())
    }

    fn get(r: &mut Reader<'_>, cfg: &CodecConfig) -> Result<Self> {
        if cfg.hybrid {
            Ok(Some(r.u8()?))
        } else {
            Ok(None)
        }
    }
}

/// Lists carry a one-byte element count.
impl<T: WireField> WireField for Vec<T> {
    fn put(&self, dst: &mut BytesMut, cfg: &CodecConfig) -> Result<()> {
        let count = u8::try_from(self.len()).map_err(|_| CodecError::FieldTooLong {
            field: "list",
            len: self.len(),
            max: u8::MAX as usize,
        })?;
        dst.put_u8(count);
        for item in self {
            item.put(dst, cfg)?;
        }
        Ok(())
    }

    fn get(r: &mut Reader<'_>, cfg: &CodecConfig) -> Result<Self> {
        let count = r.u8()?;
        (0..count).map(|_| T::get(r, cfg)).collect()
    }
}

/// IEEE 802.15.4 device address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
    Short(u16),
    Extended([u8; 8]),
}

impl Address {
    pub const MODE_SHORT: u8 = 2;
    pub const MODE_EXTENDED: u8 = 3;

    pub fn mode(&self) -> u8 {
        match self {
            Address::Short(_) => Self::MODE_SHORT,
            Address::Extended(_) => Self::MODE_EXTENDED,
        }
    }
}

impl Default for Address {
    fn default() -> Self {
        Address::Short(0xFFFF)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Address::Short(a) => write!(f, "{a:#06x}"),
            Address::Extended(e) => {
                for (i, b) in e.iter().enumerate() {
                    if i > 0 {
                        f.write_str(":")?;
                    }
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
        }
    }
}

/// Encoded as an addressing-mode byte followed by 2 or 8 address bytes.
impl WireField for Address {
    fn put(&self, dst: &mut BytesMut, _cfg: &CodecConfig) -> Result<()> {
        dst.put_u8(self.mode());
        match self {
            Address::Short(a) => dst.put_u16(*a),
            Address::Extended(e) => dst.put_slice(e),
        }
        Ok(())
    }

    fn get(r: &mut Reader<'_>, _cfg: &CodecConfig) -> Result<Self> {
        match r.u8()? {
            Address::MODE_SHORT => Ok(Address::Short(r.u16_be()?)),
            Address::MODE_EXTENDED => Ok(Address::Extended(r.array::<8>()?)),
            mode => Err(CodecError::InvalidField {
                field: "address mode",
                value: mode.into(),
            }),
        }
    }
}

/// Split a payload into its command byte and body.
pub fn split_command(payload: &[u8]) -> Result<(u8, &[u8])> {
    payload
        .split_first()
        .map(|(cmd, body)| (*cmd, body))
        .ok_or(CodecError::Empty)
}

/// Declare a flat message-kind space.
///
/// Generates a `u8`-backed enum with `code`, `name`, `ALL`, `Display` and a
/// `TryFrom<u8>` that reports unknown commands as [`CodecError::UnknownKind`].
macro_rules! message_kinds {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($proto:literal) {
            $($variant:ident = $code:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        $vis enum $name {
            $($variant = $code),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn code(self) -> u8 {
                self as u8
            }

            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl TryFrom<u8> for $name {
            type Error = $crate::error::CodecError;

            fn try_from(kind: u8) -> ::std::result::Result<Self, Self::Error> {
                match kind {
                    $($code => Ok($name::$variant),)+
                    _ => Err($crate::error::CodecError::UnknownKind {
                        protocol: $proto,
                        kind,
                    }),
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

/// Declare a message enum over a kind enum whose variants share its names.
///
/// Each variant wraps a [`MessageBody`]; `encode` prepends the command byte
/// and `decode` rejects trailing bytes.
macro_rules! message_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $kind:ident {
            $($variant:ident($ty:ty)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        $vis enum $name {
            $($variant($ty)),+
        }

        impl $name {
            pub fn kind(&self) -> $kind {
                match self {
                    $($name::$variant(_) => $kind::$variant),+
                }
            }

            /// Command byte plus body.
            pub fn encode(
                &self,
                cfg: &$crate::attribute::CodecConfig,
            ) -> $crate::error::Result<::bytes::Bytes> {
                use ::bytes::BufMut as _;
                use $crate::message::MessageBody as _;

                let mut dst = ::bytes::BytesMut::new();
                dst.put_u8(self.kind().code());
                match self {
                    $($name::$variant(m) => m.encode_body(&mut dst, cfg)?),+
                }
                Ok(dst.freeze())
            }

            pub fn decode(
                payload: &[u8],
                cfg: &$crate::attribute::CodecConfig,
            ) -> $crate::error::Result<Self> {
                use $crate::message::MessageBody as _;

                let (cmd, body) = $crate::message::split_command(payload)?;
                let kind = $kind::try_from(cmd)?;
                let mut r = $crate::wire::Reader::new(body);
                let msg = match kind {
                    $($kind::$variant => $name::$variant(<$ty>::decode_body(&mut r, cfg)?)),+
                };
                r.finish()?;
                Ok(msg)
            }
        }

    };
}

/// Declare a message struct whose body is its fields in order.
macro_rules! message_struct {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $($(#[$fmeta:meta])* pub $field:ident : $ty:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name {
            $($(#[$fmeta])* pub $field: $ty),*
        }

        impl $crate::message::MessageBody for $name {
            #[allow(unused_variables)]
            fn encode_body(
                &self,
                dst: &mut ::bytes::BytesMut,
                cfg: &$crate::attribute::CodecConfig,
            ) -> $crate::error::Result<()> {
                $($crate::message::WireField::put(&self.$field, dst, cfg)?;)*
                Ok(())
            }

            #[allow(unused_variables)]
            fn decode_body(
                r: &mut $crate::wire::Reader<'_>,
                cfg: &$crate::attribute::CodecConfig,
            ) -> $crate::error::Result<Self> {
                Ok(Self {
                    $($field: <$ty as $crate::message::WireField>::get(r, cfg)?),*
                })
            }
        }
    };
}
