use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};

use g3usi_frame::SNIFFER;
use g3usi_host::{open_with_config, CallbackTable, Event, HostError};
use g3usi_proto::CodecConfig;
use tracing::info;

use crate::cmd::MonitorArgs;
use crate::exit::{host_error, CliError, CliResult, SUCCESS};
use crate::output::{print_message, MessageOutput, OutputFormat};

pub fn run(args: MonitorArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.link.host_config()?;
    let (tx, rx) = mpsc::channel();
    let callbacks = callbacks(tx, config.codec, !args.no_sniffer)?;

    let host = open_with_config(config, callbacks)
        .map_err(|err| host_error("connect failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;
    while running.load(Ordering::SeqCst) {
        match host.pump() {
            Ok(_) => {}
            Err(HostError::Disconnected(reason)) => {
                info!(%reason, "monitor stopped");
                break;
            }
            Err(err) => return Err(host_error("receive failed", err)),
        }
        if drain(&rx, format, &mut printed, args.count) {
            break;
        }
    }
    drain(&rx, format, &mut printed, args.count);
    host.close();
    Ok(SUCCESS)
}

/// Print queued messages. Returns true once `limit` messages were printed.
fn drain(
    rx: &Receiver<MessageOutput>,
    format: OutputFormat,
    printed: &mut usize,
    limit: Option<usize>,
) -> bool {
    while let Ok(out) = rx.try_recv() {
        if limit.is_some_and(|n| *printed >= n) {
            return true;
        }
        print_message(&out, format);
        *printed = printed.saturating_add(1);
    }
    limit.is_some_and(|n| *printed >= n)
}

fn callbacks(
    tx: Sender<MessageOutput>,
    codec: CodecConfig,
    sniffer: bool,
) -> CliResult<CallbackTable> {
    let tx = Arc::new(Mutex::new(tx));
    let events = Arc::clone(&tx);
    let mut builder = CallbackTable::builder()
        .on_every_event(move |ev: &Event| {
            let out = event_output(ev, &codec);
            let _ = events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .send(out);
        })
        .map_err(|err| host_error("callback setup failed", err))?;
    if sniffer {
        builder = builder
            .on_sniffer(move |raw: &[u8]| {
                let _ = tx
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .send(MessageOutput::new(SNIFFER, raw));
            })
            .map_err(|err| host_error("callback setup failed", err))?;
    }
    Ok(builder.build())
}

fn event_output(ev: &Event, codec: &CodecConfig) -> MessageOutput {
    let payload = match ev {
        Event::Adp(m) => m.encode(codec),
        Event::Mac(m) => m.encode(codec),
        Event::Coord(m) => m.encode(codec),
        Event::Mngp(m) => m.encode(codec),
    }
    .map(|b| b.to_vec())
    .unwrap_or_default();
    let mut out = MessageOutput::new(ev.protocol(), &payload);
    out.kind = Some(ev.kind_name());
    out.detail = Some(format!("{ev:?}"));
    out
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use g3usi_frame::ADP;
    use g3usi_proto::adp::{AdpEvent, NetworkLeaveIndication};

    use super::*;

    #[test]
    fn events_carry_kind_and_payload() {
        let codec = CodecConfig::default();
        let ev = Event::Adp(AdpEvent::NetworkLeaveIndication(NetworkLeaveIndication {}));
        let out = event_output(&ev, &codec);
        assert_eq!(out.protocol, ADP);
        assert_eq!(out.kind, Some("NetworkLeaveIndication"));
        assert_eq!(out.command, Some(37));
        assert_eq!(out.payload, "25");
    }

    #[test]
    fn callbacks_forward_to_the_printer() {
        let (tx, rx) = mpsc::channel();
        let table = callbacks(tx, CodecConfig::default(), true).expect("callbacks should build");
        assert!(table.deliver_sniffer(&[0xDE, 0xAD]));
        let out = rx.try_recv().expect("sniffer frame should be queued");
        assert_eq!(out.protocol, SNIFFER);
        assert_eq!(out.payload, "dead");
    }

    #[test]
    fn drain_stops_at_the_limit() {
        let (tx, rx) = mpsc::channel();
        for _ in 0..3 {
            tx.send(MessageOutput::new(SNIFFER, &[1]))
                .expect("receiver is alive");
        }
        let mut printed = 0;
        assert!(drain(&rx, OutputFormat::Json, &mut printed, Some(2)));
        assert_eq!(printed, 2);
    }
}
