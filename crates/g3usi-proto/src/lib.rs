//! Message catalogs and the table-driven attribute codec for the G3-PLC USI
//! control sub-protocols.
//!
//! The same tables serve both ends of the link: the host encodes requests and
//! decodes confirms with them, and test fixtures playing the modem do the
//! reverse.

#[macro_use]
mod message;

pub mod adp;
pub mod attribute;
pub mod coord;
pub mod error;
pub mod getset;
pub mod mac;
pub mod mngp;
pub mod records;
pub mod status;
pub mod tables;
pub mod wire;

pub use attribute::{
    Access, AttributeData, AttributeRef, AttributeSpec, AttributeTable, AttributeValue,
    CodecConfig, Layout,
};
pub use error::{CodecError, Result, ValidationError};
pub use getset::{GetConfirm, GetRequest, SetConfirm, SetRequest};
pub use message::{split_command, Address, MessageBody, WireField};
pub use records::{Record, RecordKind};
pub use status::Status;
pub use tables::{ADP_TABLE, COORD_TABLE, MAC_TABLE};
pub use wire::WireOrder;
