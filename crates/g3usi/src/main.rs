mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "g3usi", version, about = "G3-PLC modem USI host tool")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use g3usi_host::Layer;

    use super::*;

    #[test]
    fn parses_get_subcommand() {
        let cli = Cli::try_parse_from([
            "g3usi",
            "get",
            "--endpoint",
            "/dev/ttyUSB0",
            "adp",
            "MAX_HOPS",
            "--timeout",
            "3s",
        ])
        .expect("get args should parse");

        match cli.command {
            Command::Get(args) => {
                assert_eq!(args.layer, Layer::Adp);
                assert_eq!(args.attribute, "MAX_HOPS");
                assert_eq!(args.index, 0);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_layer() {
        let err = Cli::try_parse_from(["g3usi", "get", "phy", "MAX_HOPS"])
            .expect_err("unknown layer should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn parses_set_with_declared_length() {
        let cli = Cli::try_parse_from([
            "g3usi", "set", "-e", "10.0.0.7", "mac", "PAN_ID", "0x781D", "--len", "2",
        ])
        .expect("set args should parse");
        assert!(matches!(cli.command, Command::Set(ref args) if args.len == Some(2)));
    }

    #[test]
    fn numeric_flags_take_hex() {
        let cli = Cli::try_parse_from([
            "g3usi", "get", "-e", "10.0.0.7", "--tcp-port", "0x1F90", "-i", "0x10", "adp", "MAX_HOPS",
        ])
        .expect("hex flags should parse");
        let Command::Get(args) = cli.command else {
            panic!("expected get");
        };
        assert_eq!(args.index, 16);
        assert_eq!(args.link.tcp_port, Some(8080));

        assert!(Cli::try_parse_from(["g3usi", "get", "-i", "0x10000", "adp", "MAX_HOPS"]).is_err());
    }

    #[test]
    fn parses_encode_subcommand() {
        let cli = Cli::try_parse_from(["g3usi", "--format", "json", "encode", "-p", "mac", "017e02"])
            .expect("encode args should parse");
        assert!(matches!(cli.command, Command::Encode(_)));
    }
}
