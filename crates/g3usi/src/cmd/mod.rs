use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use clap_num::maybe_hex;
use g3usi_host::{HostConfig, Layer};
use g3usi_proto::{CodecConfig, WireOrder};

use crate::exit::{host_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod attributes;
pub mod decode;
pub mod encode;
pub mod get;
pub mod monitor;
pub mod ports;
pub mod set;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Frame a payload for the wire.
    Encode(EncodeArgs),
    /// Unframe wire bytes and name the message they carry.
    Decode(DecodeArgs),
    /// Read one attribute from a modem.
    Get(GetArgs),
    /// Write one attribute on a modem.
    Set(SetArgs),
    /// Print confirms, indications and sniffer frames as they arrive.
    Monitor(MonitorArgs),
    /// List the attribute tables.
    Attributes(AttributesArgs),
    /// List serial devices.
    Ports(PortsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Get(args) => get::run(args, format),
        Command::Set(args) => set::run(args, format),
        Command::Monitor(args) => monitor::run(args, format),
        Command::Attributes(args) => attributes::run(args, format),
        Command::Ports(args) => ports::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum ByteOrder {
    Big,
    Little,
}

impl From<ByteOrder> for WireOrder {
    fn from(order: ByteOrder) -> Self {
        match order {
            ByteOrder::Big => WireOrder::Big,
            ByteOrder::Little => WireOrder::Little,
        }
    }
}

/// Codec options shared by every command that interprets message bodies.
#[derive(Args, Debug, Default)]
pub struct CodecArgs {
    /// Dual-media (PLC + RF) firmware.
    #[arg(long)]
    pub hybrid: bool,
    /// Byte order of multi-byte attribute values.
    #[arg(long, value_name = "ORDER")]
    pub byte_order: Option<ByteOrder>,
}

impl CodecArgs {
    pub fn apply(&self, mut codec: CodecConfig) -> CodecConfig {
        if self.hybrid {
            codec.hybrid = true;
        }
        if let Some(order) = self.byte_order {
            codec.order = order.into();
        }
        codec
    }
}

/// Where the modem is and how to talk to it.
#[derive(Args, Debug)]
pub struct LinkArgs {
    /// TTY path or IPv4 address (optionally addr:port).
    #[arg(long, short = 'e', env = "G3USI_ENDPOINT")]
    pub endpoint: Option<String>,
    /// JSON connection settings; flags override its fields.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Serial baud rate.
    #[arg(long, value_parser = maybe_hex::<u32>)]
    pub baud: Option<u32>,
    /// TCP port used when the endpoint has none.
    #[arg(long, value_parser = maybe_hex::<u16>)]
    pub tcp_port: Option<u16>,
    /// Confirm deadline (e.g. 2s, 500ms).
    #[arg(long)]
    pub timeout: Option<String>,
    #[command(flatten)]
    pub codec: CodecArgs,
}

impl LinkArgs {
    pub fn host_config(&self) -> CliResult<HostConfig> {
        let mut config = match &self.config {
            Some(path) => HostConfig::from_json_file(path)
                .map_err(|err| host_error(&format!("failed loading {}", path.display()), err))?,
            None => HostConfig::default(),
        };
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(baud) = self.baud {
            config = config.with_baud_rate(baud);
        }
        if let Some(port) = self.tcp_port {
            config = config.with_tcp_port(port);
        }
        if let Some(timeout) = &self.timeout {
            config = config.with_sync_timeout(parse_duration(timeout)?);
        }
        config.codec = self.codec.apply(config.codec);

        if config.endpoint.trim().is_empty() {
            return Err(CliError::usage(
                "no endpoint given (use --endpoint, G3USI_ENDPOINT or a config file)",
            ));
        }
        Ok(config)
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Sub-protocol name (adp, mac, coord, mngp, ...) or numeric id.
    #[arg(long, short = 'p')]
    pub protocol: String,
    /// Payload bytes in hex, command byte first.
    #[arg(default_value = "")]
    pub payload: String,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Wire bytes in hex, including both 0x7E markers.
    pub frame: String,
    #[command(flatten)]
    pub codec: CodecArgs,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Attribute space: adp, adp-mac, mac or coord.
    pub layer: Layer,
    /// Attribute name or numeric id.
    pub attribute: String,
    /// Table index.
    #[arg(long, short = 'i', default_value_t = 0, value_parser = maybe_hex::<u16>)]
    pub index: u16,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Attribute space: adp, adp-mac, mac or coord.
    pub layer: Layer,
    /// Attribute name or numeric id.
    pub attribute: String,
    /// Integer or boolean for scalar attributes, hex otherwise.
    pub value: String,
    /// Table index.
    #[arg(long, short = 'i', default_value_t = 0, value_parser = maybe_hex::<u16>)]
    pub index: u16,
    /// Expected encoded length; defaults to the encoded size.
    #[arg(long, value_parser = maybe_hex::<u8>)]
    pub len: Option<u8>,
    /// Send the value bytes as given, without typed encoding.
    #[arg(long)]
    pub raw: bool,
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Exit after printing N messages.
    #[arg(long, value_parser = maybe_hex::<usize>)]
    pub count: Option<usize>,
    /// Skip sniffer frames.
    #[arg(long)]
    pub no_sniffer: bool,
}

#[derive(Args, Debug)]
pub struct AttributesArgs {
    /// Only this attribute space.
    pub layer: Option<Layer>,
    #[command(flatten)]
    pub codec: CodecArgs,
}

#[derive(Args, Debug, Default)]
pub struct PortsArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse hex bytes. Whitespace, `:` separators and a leading `0x` are accepted.
pub fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let digits: Vec<u8> = trimmed
        .bytes()
        .filter(|b| !b.is_ascii_whitespace() && *b != b':')
        .collect();
    if digits.len() % 2 != 0 {
        return Err(CliError::usage(format!(
            "hex input has an odd number of digits: {input}"
        )));
    }
    digits
        .chunks(2)
        .map(|pair| {
            let hi = hex_digit(pair[0]);
            let lo = hex_digit(pair[1]);
            match (hi, lo) {
                (Some(hi), Some(lo)) => Ok((hi << 4) | lo),
                _ => Err(CliError::usage(format!("invalid hex input: {input}"))),
            }
        })
        .collect()
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Decimal or `0x`-prefixed integer, for arguments that may also be names.
pub fn parse_u32(input: &str) -> Option<u32> {
    maybe_hex::<u32>(input.trim()).ok()
}

/// Resolve an attribute given by table name or numeric id.
pub fn resolve_attribute(layer: Layer, input: &str, codec: &CodecConfig) -> CliResult<u32> {
    if let Some(id) = parse_u32(input) {
        return Ok(id);
    }
    layer
        .table()
        .lookup_name(input, codec)
        .map(|row| row.id)
        .ok_or_else(|| {
            CliError::new(
                USAGE,
                format!("unknown {layer} attribute '{input}' (see `g3usi attributes {layer}`)"),
            )
        })
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::usage("duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::usage(format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::usage("duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

#[cfg(test)]
mod tests {
    use g3usi_proto::tables::adp as adp_pib;

    use super::*;

    #[test]
    fn parse_hex_accepts_separators() {
        assert_eq!(parse_hex("01 7e 02").expect("hex"), vec![0x01, 0x7E, 0x02]);
        assert_eq!(parse_hex("0x017E02").expect("hex"), vec![0x01, 0x7E, 0x02]);
        assert_eq!(parse_hex("de:ad").expect("hex"), vec![0xDE, 0xAD]);
        assert!(parse_hex("").expect("empty hex").is_empty());
    }

    #[test]
    fn parse_hex_rejects_bad_input() {
        assert!(parse_hex("abc").is_err());
        assert!(parse_hex("zz").is_err());
    }

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").expect("2s"), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").expect("150ms"), Duration::from_millis(150));
        assert_eq!(parse_duration("3").expect("3"), Duration::from_secs(3));
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
    }

    #[test]
    fn attributes_resolve_by_id_or_name() {
        let codec = CodecConfig::default();
        assert_eq!(
            resolve_attribute(Layer::Adp, "0x0f", &codec).expect("id"),
            adp_pib::MAX_HOPS
        );
        assert_eq!(
            resolve_attribute(Layer::Adp, "15", &codec).expect("id"),
            adp_pib::MAX_HOPS
        );
        let name = Layer::Adp
            .table()
            .lookup(adp_pib::MAX_HOPS, &codec)
            .expect("max hops row")
            .name;
        assert_eq!(
            resolve_attribute(Layer::Adp, name, &codec).expect("name"),
            adp_pib::MAX_HOPS
        );
        let err = resolve_attribute(Layer::Adp, "no-such-attribute", &codec)
            .expect_err("unknown name should fail");
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn link_args_require_an_endpoint() {
        let link = LinkArgs {
            endpoint: None,
            config: None,
            baud: None,
            tcp_port: None,
            timeout: None,
            codec: CodecArgs::default(),
        };
        assert_eq!(link.host_config().expect_err("no endpoint").code, USAGE);

        let link = LinkArgs {
            endpoint: Some("10.0.0.7".to_string()),
            baud: Some(115_200),
            timeout: Some("500ms".to_string()),
            codec: CodecArgs {
                hybrid: true,
                byte_order: Some(ByteOrder::Big),
            },
            ..link
        };
        let config = link.host_config().expect("config should build");
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.sync_timeout(), Duration::from_millis(500));
        assert!(config.codec.hybrid);
        assert_eq!(config.codec.order, WireOrder::Big);
    }
}
