use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use g3usi_frame::protocol_name;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One decoded USI message, from `decode` or `monitor`.
#[derive(Debug, Serialize)]
pub struct MessageOutput {
    pub protocol: u8,
    pub protocol_name: &'static str,
    pub command: Option<u8>,
    pub kind: Option<&'static str>,
    pub payload: String,
    pub detail: Option<String>,
    pub timestamp: String,
}

impl MessageOutput {
    pub fn new(protocol: u8, payload: &[u8]) -> Self {
        Self {
            protocol,
            protocol_name: protocol_name(protocol),
            command: payload.first().copied(),
            kind: None,
            payload: to_hex(payload),
            detail: None,
            timestamp: now_unix_seconds(),
        }
    }
}

/// Result of a get or set against one attribute.
#[derive(Debug, Serialize)]
pub struct AttributeOutput {
    pub layer: &'static str,
    pub id: String,
    pub name: Option<&'static str>,
    pub index: u16,
    pub status: &'static str,
    pub length: usize,
    pub raw: String,
    pub value: Option<String>,
}

/// One attribute table row, from `attributes`.
#[derive(Debug, Serialize)]
pub struct RowOutput {
    pub layer: &'static str,
    pub id: String,
    pub name: &'static str,
    pub layout: &'static str,
    pub length: Option<usize>,
    pub access: &'static str,
    pub rf: bool,
}

#[derive(Debug, Serialize)]
struct EncodedOutput<'a> {
    protocol: u8,
    protocol_name: &'static str,
    payload_size: usize,
    frame: &'a str,
}

pub fn print_message(out: &MessageOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut table = new_table(vec!["PROTOCOL", "COMMAND", "KIND", "PAYLOAD"]);
            table.add_row(vec![
                out.protocol_name.to_string(),
                out.command.map(|c| c.to_string()).unwrap_or_default(),
                out.kind.unwrap_or("-").to_string(),
                out.payload.clone(),
            ]);
            println!("{table}");
            if let Some(detail) = &out.detail {
                println!("{detail}");
            }
        }
        OutputFormat::Pretty => {
            println!(
                "protocol={:#04x} ({}) command={} kind={} payload={}",
                out.protocol,
                out.protocol_name,
                out.command.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string()),
                out.kind.unwrap_or("-"),
                out.payload
            );
            if let Some(detail) = &out.detail {
                println!("  {detail}");
            }
        }
    }
}

pub fn print_attribute(out: &AttributeOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut table = new_table(vec!["LAYER", "ID", "NAME", "INDEX", "STATUS", "VALUE"]);
            table.add_row(vec![
                out.layer.to_string(),
                out.id.clone(),
                out.name.unwrap_or("-").to_string(),
                out.index.to_string(),
                out.status.to_string(),
                out.value.clone().unwrap_or_else(|| out.raw.clone()),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{}[{}] {} = {} (status {}, {} bytes)",
                out.name.unwrap_or(&out.id),
                out.index,
                out.layer,
                out.value.as_deref().unwrap_or(&out.raw),
                out.status,
                out.length
            );
        }
    }
}

pub fn print_rows(rows: &[RowOutput], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Table => {
            let mut table = new_table(vec!["LAYER", "ID", "NAME", "LAYOUT", "LEN", "ACCESS"]);
            for row in rows {
                table.add_row(vec![
                    row.layer.to_string(),
                    row.id.clone(),
                    row.name.to_string(),
                    row.layout.to_string(),
                    row.length.map(|n| n.to_string()).unwrap_or_else(|| "var".to_string()),
                    row.access.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for row in rows {
                println!(
                    "{:<8} {} {:<32} {:<14} {}{}",
                    row.layer,
                    row.id,
                    row.name,
                    row.layout,
                    row.access,
                    if row.rf { " rf" } else { "" }
                );
            }
        }
    }
}

pub fn print_encoded(protocol: u8, payload_size: usize, frame: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&EncodedOutput {
            protocol,
            protocol_name: protocol_name(protocol),
            payload_size,
            frame,
        }),
        OutputFormat::Table | OutputFormat::Pretty => println!("{frame}"),
    }
}

pub fn print_ports(ports: &[String], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&ports),
        OutputFormat::Table => {
            let mut table = new_table(vec!["PORT"]);
            for port in ports {
                table.add_row(vec![port.clone()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for port in ports {
                println!("{port}");
            }
        }
    }
}

pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
