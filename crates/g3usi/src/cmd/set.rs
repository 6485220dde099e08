use bytes::Bytes;
use g3usi_host::{open_with_config, CallbackTable, HostError, Layer};
use g3usi_proto::{AttributeData, AttributeRef, CodecConfig, Layout, SetRequest};

use crate::cmd::{parse_hex, parse_u32, resolve_attribute, SetArgs};
use crate::exit::{host_error, CliError, CliResult, FAILURE, SUCCESS};
use crate::output::{print_attribute, to_hex, AttributeOutput, OutputFormat};

pub fn run(args: SetArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.link.host_config()?;
    let codec = config.codec;
    let id = resolve_attribute(args.layer, &args.attribute, &codec)?;
    let attr = AttributeRef::new(id, args.index);
    let req = build_request(args.layer, attr, &args.value, args.len, args.raw, &codec)?;
    let timeout = config.sync_timeout();

    let host = open_with_config(config, CallbackTable::default())
        .map_err(|err| host_error("connect failed", err))?;
    let raw = to_hex(req.value().as_bytes());
    let length = req.value().as_bytes().len();
    let confirm = host
        .set_sync(args.layer, req, timeout)
        .map_err(|err| host_error("set failed", err))?;
    host.close();

    let table = args.layer.table();
    print_attribute(
        &AttributeOutput {
            layer: args.layer.name(),
            id: format!("{id:#010x}"),
            name: table.lookup(id, &codec).map(|row| row.name),
            index: args.index,
            status: confirm.status.name(),
            length,
            raw,
            value: None,
        },
        format,
    );
    if confirm.status.is_success() {
        Ok(SUCCESS)
    } else {
        Ok(FAILURE)
    }
}

/// Turn the command-line value into a validated set request.
///
/// Records, unknown ids and `--raw` take hex bytes as-is; everything else is
/// encoded through the table row.
fn build_request(
    layer: Layer,
    attr: AttributeRef,
    input: &str,
    declared_len: Option<u8>,
    raw: bool,
    codec: &CodecConfig,
) -> CliResult<SetRequest> {
    let table = layer.table();
    let layout = table.lookup(attr.id, codec).map(|row| row.layout);

    let layout = match layout {
        Some(layout) if !raw && !matches!(layout, Layout::Record(_)) => layout,
        _ => {
            let bytes = parse_hex(input)?;
            check_declared(declared_len, bytes.len())?;
            return SetRequest::from_raw(table, attr, bytes, codec)
                .map_err(|err| host_error("invalid value", HostError::from(err)));
        }
    };

    let data = parse_value(layout, input)?;
    let declared = match declared_len {
        Some(len) => len,
        None => u8::try_from(encoded_len(&data))
            .map_err(|_| CliError::usage("value longer than 255 bytes"))?,
    };
    SetRequest::build(table, attr, &data, declared, codec)
        .map_err(|err| host_error("invalid value", HostError::from(err)))
}

fn check_declared(declared: Option<u8>, actual: usize) -> CliResult<()> {
    match declared {
        Some(len) if usize::from(len) != actual => Err(CliError::new(
            crate::exit::DATA_INVALID,
            format!("declared length {len} but value has {actual} bytes"),
        )),
        _ => Ok(()),
    }
}

fn encoded_len(data: &AttributeData) -> usize {
    match data {
        AttributeData::U8(_) | AttributeData::Bool(_) => 1,
        AttributeData::U16(_) => 2,
        AttributeData::U32(_) => 4,
        AttributeData::Bytes(b) => b.len(),
        AttributeData::Record(_) => 0,
    }
}

fn parse_value(layout: Layout, input: &str) -> CliResult<AttributeData> {
    let int = |max: u32| {
        parse_u32(input)
            .filter(|v| *v <= max)
            .ok_or_else(|| CliError::usage(format!("expected an integer up to {max}, got '{input}'")))
    };
    let data = match layout {
        Layout::U8 => AttributeData::U8(int(u8::MAX.into())? as u8),
        Layout::U16 => AttributeData::U16(int(u16::MAX.into())? as u16),
        Layout::U32 => AttributeData::U32(int(u32::MAX)?),
        Layout::Bool => match input.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "on" | "yes" => AttributeData::Bool(true),
            "0" | "false" | "off" | "no" => AttributeData::Bool(false),
            _ => return Err(CliError::usage(format!("expected a boolean, got '{input}'"))),
        },
        Layout::Bytes(_) | Layout::Blob { .. } => AttributeData::Bytes(Bytes::from(parse_hex(input)?)),
        Layout::Record(kind) => {
            return Err(CliError::usage(format!(
                "{} values are given as hex",
                kind.name()
            )))
        }
    };
    Ok(data)
}

#[cfg(test)]
mod tests {
    use g3usi_proto::tables::{adp as adp_pib, mac as mac_pib};

    use super::*;
    use crate::exit::{DATA_INVALID, USAGE};

    #[test]
    fn scalar_values_are_encoded_through_the_table() {
        let codec = CodecConfig::default();
        let req = build_request(
            Layer::Adp,
            AttributeRef::new(adp_pib::MAX_HOPS, 0),
            "10",
            None,
            false,
            &codec,
        )
        .expect("request should build");
        assert_eq!(req.value().as_bytes(), &[0x0A]);

        let req = build_request(
            Layer::Mac,
            AttributeRef::new(mac_pib::PAN_ID, 0),
            "0x781D",
            None,
            false,
            &codec,
        )
        .expect("request should build");
        assert_eq!(req.value().as_bytes(), &[0x1D, 0x78]);
    }

    #[test]
    fn declared_length_must_match() {
        let codec = CodecConfig::default();
        let err = build_request(
            Layer::Adp,
            AttributeRef::new(adp_pib::MAX_HOPS, 0),
            "10",
            Some(2),
            false,
            &codec,
        )
        .expect_err("length mismatch should fail");
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn out_of_range_integers_are_usage_errors() {
        let codec = CodecConfig::default();
        let err = build_request(
            Layer::Adp,
            AttributeRef::new(adp_pib::MAX_HOPS, 0),
            "300",
            None,
            false,
            &codec,
        )
        .expect_err("300 does not fit a byte");
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn unknown_ids_take_raw_bytes() {
        let codec = CodecConfig::default();
        let req = build_request(
            Layer::Adp,
            AttributeRef::new(0x00FF_FF00, 0),
            "01 02 03",
            None,
            false,
            &codec,
        )
        .expect("opaque value should pass");
        assert_eq!(req.value().as_bytes(), &[1, 2, 3]);
    }
}
