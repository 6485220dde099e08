use g3usi_frame::{decode_frame, ADP, COORD, MAC, MNGP};
use g3usi_proto::adp::{AdpEvent, AdpRequest};
use g3usi_proto::coord::{CoordEvent, CoordRequest};
use g3usi_proto::mac::{MacEvent, MacRequest};
use g3usi_proto::mngp::MngpMessage;
use g3usi_proto::CodecConfig;

use crate::cmd::{parse_hex, DecodeArgs};
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_message, MessageOutput, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let wire = parse_hex(&args.frame)?;
    let frame = decode_frame(&wire).map_err(|err| frame_error("decode failed", err))?;
    let codec = args.codec.apply(CodecConfig::default());

    let mut out = MessageOutput::new(frame.protocol, &frame.payload);
    let (kind, detail) = describe(frame.protocol, &frame.payload, &codec);
    out.kind = kind;
    out.detail = detail;
    print_message(&out, format);
    Ok(SUCCESS)
}

/// Name the message in `payload`, trying the device-to-host catalog first.
fn describe(
    protocol: u8,
    payload: &[u8],
    codec: &CodecConfig,
) -> (Option<&'static str>, Option<String>) {
    let decoded = match protocol {
        ADP => either(
            AdpEvent::decode(payload, codec).map(|m| (m.kind().name(), format!("{m:?}"))),
            || AdpRequest::decode(payload, codec).map(|m| (m.kind().name(), format!("{m:?}"))),
        ),
        MAC => either(
            MacEvent::decode(payload, codec).map(|m| (m.kind().name(), format!("{m:?}"))),
            || MacRequest::decode(payload, codec).map(|m| (m.kind().name(), format!("{m:?}"))),
        ),
        COORD => either(
            CoordEvent::decode(payload, codec).map(|m| (m.kind().name(), format!("{m:?}"))),
            || CoordRequest::decode(payload, codec).map(|m| (m.kind().name(), format!("{m:?}"))),
        ),
        MNGP => MngpMessage::decode(payload, codec).map(|m| (m.kind().name(), format!("{m:?}"))),
        _ => return (None, None),
    };
    match decoded {
        Ok((kind, detail)) => (Some(kind), Some(detail)),
        Err(err) => (None, Some(format!("undecodable: {err}"))),
    }
}

fn either<T>(
    first: g3usi_proto::Result<T>,
    second: impl FnOnce() -> g3usi_proto::Result<T>,
) -> g3usi_proto::Result<T> {
    first.or_else(|_| second())
}

#[cfg(test)]
mod tests {
    use g3usi_frame::SNIFFER;
    use g3usi_proto::tables::adp as adp_pib;
    use g3usi_proto::GetRequest;

    use super::*;

    #[test]
    fn requests_are_named_when_no_event_matches() {
        let codec = CodecConfig::default();
        let payload = AdpRequest::GetRequest(GetRequest::new(adp_pib::MAX_HOPS, 0))
            .encode(&codec)
            .expect("request should encode");
        let (kind, detail) = describe(ADP, &payload, &codec);
        assert_eq!(kind, Some("GetRequest"));
        assert!(detail.is_some());
    }

    #[test]
    fn sniffer_frames_are_not_described() {
        let codec = CodecConfig::default();
        assert_eq!(describe(SNIFFER, &[0xDE, 0xAD], &codec), (None, None));
    }

    #[test]
    fn unknown_commands_are_reported() {
        let codec = CodecConfig::default();
        let (kind, detail) = describe(ADP, &[0xFF], &codec);
        assert_eq!(kind, None);
        assert!(detail.expect("detail").starts_with("undecodable"));
    }
}
