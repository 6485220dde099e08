use bytes::BytesMut;
use g3usi_frame::encode_frame;
use g3usi_frame::protocol::parse_protocol;

use crate::cmd::{parse_hex, EncodeArgs};
use crate::exit::{frame_error, CliError, CliResult, SUCCESS};
use crate::output::{print_encoded, to_hex, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let protocol = parse_protocol(&args.protocol)
        .ok_or_else(|| CliError::usage(format!("unknown protocol '{}'", args.protocol)))?;
    let payload = parse_hex(&args.payload)?;
    let wire = encode(protocol, &payload)?;
    print_encoded(protocol, payload.len(), &to_hex(&wire), format);
    Ok(SUCCESS)
}

fn encode(protocol: u8, payload: &[u8]) -> CliResult<Vec<u8>> {
    let mut dst = BytesMut::new();
    encode_frame(protocol, payload, &mut dst).map_err(|err| frame_error("encode failed", err))?;
    Ok(dst.to_vec())
}

#[cfg(test)]
mod tests {
    use g3usi_frame::{decode_frame, MAC};

    use super::*;

    #[test]
    fn payload_markers_are_escaped() {
        let wire = encode(MAC, &[0x01, 0x7E, 0x02]).expect("frame should encode");
        assert_eq!(wire.first(), Some(&0x7E));
        assert_eq!(wire.last(), Some(&0x7E));
        assert!(wire.windows(4).any(|w| w == [0x01, 0x7D, 0x5E, 0x02]));

        let frame = decode_frame(&wire).expect("frame should decode");
        assert_eq!(frame.protocol, MAC);
        assert_eq!(frame.payload.as_ref(), &[0x01, 0x7E, 0x02]);
    }
}
