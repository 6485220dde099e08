#![cfg(unix)]

use std::os::unix::net::UnixStream;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use g3usi_frame::{FrameReader, FrameWriter, ADP, MNGP};
use g3usi_host::{CallbackTable, HostConfig, HostError, Layer, SyncChannel, UsiHost};
use g3usi_proto::adp::{AdpEvent, AdpEventKind, AdpRequest, NetworkStatusIndication};
use g3usi_proto::mngp::{
    ConnectedNode, EnumQuery, EnumResponse, MngpMessage, TAG_CONNECTED_NODES,
};
use g3usi_proto::tables::adp as adp_pib;
use g3usi_proto::{
    AttributeData, AttributeRef, AttributeValue, CodecConfig, CodecError, GetConfirm, GetRequest,
    SetRequest, Status, ValidationError, MAC_TABLE,
};

type TestHost = UsiHost<UnixStream, UnixStream>;

/// The modem end of the link, driven by the test.
struct Device {
    reader: FrameReader<UnixStream>,
    writer: FrameWriter<UnixStream>,
    cfg: CodecConfig,
}

impl Device {
    fn adp_request(&mut self) -> AdpRequest {
        let frame = self.reader.read_frame().expect("device should receive a frame");
        assert_eq!(frame.protocol, ADP);
        AdpRequest::decode(&frame.payload, &self.cfg).expect("request should decode")
    }

    fn mngp_request(&mut self) -> MngpMessage {
        let frame = self.reader.read_frame().expect("device should receive a frame");
        assert_eq!(frame.protocol, MNGP);
        MngpMessage::decode(&frame.payload, &self.cfg).expect("query should decode")
    }

    fn send_adp(&mut self, event: AdpEvent) {
        let payload = event.encode(&self.cfg).expect("event should encode");
        self.writer.send(ADP, &payload).expect("device should send");
    }

    fn send_mngp(&mut self, msg: MngpMessage) {
        let payload = msg.encode(&self.cfg).expect("message should encode");
        self.writer.send(MNGP, &payload).expect("device should send");
    }

    fn expect_silence(&mut self) {
        self.reader
            .get_mut()
            .set_read_timeout(Some(Duration::from_millis(50)))
            .expect("timeout should apply");
        assert!(self.reader.read_frame().is_err(), "nothing should be sent");
    }
}

fn link(callbacks: CallbackTable) -> (Arc<TestHost>, Device) {
    let (host_end, device_end) = UnixStream::pair().expect("socket pair");

    let host_reader = host_end.try_clone().expect("clone host end");
    host_reader
        .set_read_timeout(Some(Duration::from_millis(10)))
        .expect("host read timeout");
    let config = HostConfig::default().with_poll_interval(Duration::from_millis(10));
    let host = UsiHost::from_parts(
        FrameReader::new(host_reader),
        FrameWriter::new(host_end),
        config,
        callbacks,
    );

    let device_reader = device_end.try_clone().expect("clone device end");
    device_reader
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("device read timeout");
    let device = Device {
        reader: FrameReader::new(device_reader),
        writer: FrameWriter::new(device_end),
        cfg: CodecConfig::default(),
    };
    (Arc::new(host), device)
}

fn max_hops() -> AttributeRef {
    AttributeRef::new(adp_pib::MAX_HOPS, 0)
}

fn wait_until(mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn max_hops_get_end_to_end() {
    let (host, mut device) = link(CallbackTable::default());

    let modem = thread::spawn(move || {
        let req = device.adp_request();
        assert_eq!(
            req,
            AdpRequest::GetRequest(GetRequest::new(0x0000_000F, 0))
        );
        assert_eq!(
            req.encode(&CodecConfig::default()).expect("encode").as_ref(),
            &[18, 0x00, 0x00, 0x00, 0x0F, 0x00, 0x00]
        );
        device.send_adp(AdpEvent::GetConfirm(GetConfirm::success(
            max_hops(),
            AttributeValue::new(vec![0x0A]).expect("value fits"),
        )));
        device
    });

    let value = host
        .read_attribute(Layer::Adp, max_hops(), Duration::from_secs(5))
        .expect("get should complete");
    assert_eq!(value, AttributeData::U8(0x0A));
    assert!(!host.is_pending(SyncChannel::AdpPlc));

    modem.join().expect("device thread should complete");
}

#[test]
fn failure_status_is_rejected() {
    let (host, mut device) = link(CallbackTable::default());

    let modem = thread::spawn(move || {
        device.adp_request();
        device.send_adp(AdpEvent::GetConfirm(GetConfirm::failure(
            Status::UnsupportedAttribute,
            max_hops(),
        )));
        device
    });

    let result = host.read_attribute(Layer::Adp, max_hops(), Duration::from_secs(5));
    assert!(matches!(
        result,
        Err(HostError::Rejected(Status::UnsupportedAttribute))
    ));
    modem.join().expect("device thread should complete");
}

#[test]
fn second_call_on_busy_channel_is_rejected() {
    let (host, mut device) = link(CallbackTable::default());

    let first = {
        let host = Arc::clone(&host);
        thread::spawn(move || host.get_sync(Layer::Adp, max_hops(), Duration::from_secs(5)))
    };
    device.adp_request();
    wait_until(|| host.is_pending(SyncChannel::AdpPlc));

    let second = host.get_sync(Layer::Adp, max_hops(), Duration::from_secs(5));
    assert!(matches!(second, Err(HostError::Busy(SyncChannel::AdpPlc))));
    // The rejected call transmitted nothing.
    device.expect_silence();

    host.close();
    let first = first.join().expect("first caller should not panic");
    assert!(matches!(first, Err(HostError::Disconnected(_))));
    assert!(matches!(
        host.get_sync(Layer::Adp, max_hops(), Duration::from_secs(1)),
        Err(HostError::Disconnected(_))
    ));
}

#[test]
fn late_confirm_goes_to_callback() {
    let late = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&late);
    let callbacks = CallbackTable::builder()
        .on_adp(AdpEventKind::GetConfirm, move |ev| {
            assert!(matches!(ev, AdpEvent::GetConfirm(_)));
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .expect("callback should register")
        .build();
    let (host, mut device) = link(callbacks);

    let (release_tx, release_rx) = mpsc::channel::<()>();
    let modem = thread::spawn(move || {
        device.adp_request();
        release_rx.recv().expect("test should release the confirm");
        device.send_adp(AdpEvent::GetConfirm(GetConfirm::success(
            max_hops(),
            AttributeValue::new(vec![0x0A]).expect("value fits"),
        )));
        device
    });

    let timeout = Duration::from_millis(50);
    let result = host.get_sync(Layer::Adp, max_hops(), timeout);
    assert!(matches!(result, Err(HostError::Timeout(t)) if t == timeout));
    assert!(!host.is_pending(SyncChannel::AdpPlc));

    release_tx.send(()).expect("device should be waiting");
    wait_until(|| {
        host.pump().expect("pump should succeed");
        late.load(Ordering::SeqCst) == 1
    });
    modem.join().expect("device thread should complete");
}

#[test]
fn indications_reach_callbacks_during_a_call() {
    let statuses = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&statuses);
    let callbacks = CallbackTable::builder()
        .on_adp(AdpEventKind::NetworkStatusIndication, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .expect("callback should register")
        .build();
    let (host, mut device) = link(callbacks);

    let modem = thread::spawn(move || {
        device.adp_request();
        device.send_adp(AdpEvent::NetworkStatusIndication(
            NetworkStatusIndication::default(),
        ));
        device.send_adp(AdpEvent::GetConfirm(GetConfirm::success(
            max_hops(),
            AttributeValue::new(vec![0x05]).expect("value fits"),
        )));
        device
    });

    let confirm = host
        .get_sync(Layer::Adp, max_hops(), Duration::from_secs(5))
        .expect("get should complete");
    assert_eq!(confirm.value.as_bytes(), &[0x05]);
    assert_eq!(statuses.load(Ordering::SeqCst), 1);
    modem.join().expect("device thread should complete");
}

#[test]
fn end_of_stream_releases_waiter() {
    let (host, mut device) = link(CallbackTable::default());

    let modem = thread::spawn(move || {
        device.adp_request();
        drop(device);
    });

    let result = host.get_sync(Layer::Adp, max_hops(), Duration::from_secs(5));
    assert!(matches!(result, Err(HostError::Disconnected(_))));
    assert!(host.is_closed());
    modem.join().expect("device thread should complete");
}

#[test]
fn set_length_mismatch_sends_nothing() {
    let (host, mut device) = link(CallbackTable::default());

    let result = host.write_attribute(
        Layer::Adp,
        max_hops(),
        &AttributeData::U8(0x0A),
        2,
        Duration::from_secs(1),
    );
    assert!(matches!(
        result,
        Err(HostError::Validation(ValidationError::LengthMismatch {
            declared: 2,
            actual: 1,
            ..
        }))
    ));
    assert!(!host.is_pending(SyncChannel::AdpPlc));
    device.expect_silence();
}

/// A set request as a peer would decode it, with no table check applied.
fn unchecked_set(attr: AttributeRef, value: &[u8]) -> SetRequest {
    let mut payload = vec![17];
    payload.extend_from_slice(&attr.id.to_be_bytes());
    payload.extend_from_slice(&attr.index.to_be_bytes());
    payload.push(u8::try_from(value.len()).expect("value fits a length byte"));
    payload.extend_from_slice(value);
    match AdpRequest::decode(&payload, &CodecConfig::default()).expect("request should decode") {
        AdpRequest::SetRequest(req) => req,
        other => panic!("unexpected request {other:?}"),
    }
}

#[test]
fn unchecked_set_requests_are_not_sent() {
    let (host, mut device) = link(CallbackTable::default());

    let oversized = unchecked_set(max_hops(), &[0xAA; 200]);
    assert!(matches!(
        host.set(Layer::Adp, oversized),
        Err(HostError::Validation(ValidationError::ValueTooLong { len: 200, max: 64, .. }))
    ));

    let read_only = unchecked_set(AttributeRef::new(adp_pib::SOFT_VERSION, 0), &[0; 6]);
    assert!(matches!(
        host.set_sync(Layer::Adp, read_only, Duration::from_secs(1)),
        Err(HostError::Validation(ValidationError::ReadOnly { .. }))
    ));

    // Valid for the MAC table, too long for ADP.
    let opaque = AttributeRef::new(0x0800_00FF, 0);
    let mac_sized = SetRequest::from_raw(&MAC_TABLE, opaque, vec![0u8; 100], &CodecConfig::default())
        .expect("value fits the MAC table");
    assert!(matches!(
        host.set(Layer::Adp, mac_sized),
        Err(HostError::Validation(ValidationError::ValueTooLong { max: 64, .. }))
    ));

    assert!(!host.is_pending(SyncChannel::AdpPlc));
    device.expect_silence();
}

#[test]
fn overlong_get_confirm_is_refused() {
    let (host, mut device) = link(CallbackTable::default());
    let opaque = AttributeRef::new(0x0800_00FF, 0);

    let modem = thread::spawn(move || {
        device.adp_request();
        device.send_adp(AdpEvent::GetConfirm(GetConfirm::success(
            opaque,
            AttributeValue::new(vec![0xAA; 200]).expect("value fits a length byte"),
        )));
        device
    });

    let result = host.get_sync(Layer::Adp, opaque, Duration::from_secs(5));
    assert!(matches!(
        result,
        Err(HostError::Codec(CodecError::FieldTooLong { len: 200, max: 64, .. }))
    ));
    assert!(!host.is_pending(SyncChannel::AdpPlc));
    modem.join().expect("device thread should complete");
}

#[test]
fn close_releases_a_blocked_caller() {
    let (host, mut device) = link(CallbackTable::default());

    let caller = {
        let host = Arc::clone(&host);
        thread::spawn(move || {
            let started = Instant::now();
            let result = host.get_sync(Layer::Adp, max_hops(), Duration::from_secs(30));
            (result, started.elapsed())
        })
    };
    device.adp_request();
    wait_until(|| host.is_pending(SyncChannel::AdpPlc));

    host.close();
    let (result, elapsed) = caller.join().expect("caller should not panic");
    assert!(matches!(result, Err(HostError::Disconnected(_))));
    assert!(elapsed < Duration::from_secs(5), "close should not wait for the deadline");
    assert!(!host.is_pending(SyncChannel::AdpPlc));
    assert!(host.is_closed());
}

#[test]
fn reader_thread_serves_waiting_callers() {
    let (host, mut device) = link(CallbackTable::default());
    let reader = host.spawn_reader().expect("reader thread should start");

    let modem = thread::spawn(move || {
        device.adp_request();
        device.send_adp(AdpEvent::GetConfirm(GetConfirm::success(
            max_hops(),
            AttributeValue::new(vec![0x0A]).expect("value fits"),
        )));
        device
    });

    let confirm = host
        .get_sync(Layer::Adp, max_hops(), Duration::from_secs(5))
        .expect("get should complete");
    assert_eq!(confirm.status, Status::Success);
    let _device = modem.join().expect("device thread should complete");

    host.close();
    let outcome = reader.join().expect("reader thread should not panic");
    assert!(outcome.is_ok());
}

#[test]
fn connected_nodes_are_paged() {
    let (host, mut device) = link(CallbackTable::default());

    let node = |short: u16| {
        ConnectedNode {
            extended_address: [0, 0x80, 0xE1, 0, 0, 0, 0, short as u8],
            short_address: short,
        }
        .to_record()
    };
    let modem = thread::spawn(move || {
        let pages = [(0u16, vec![node(1), node(2)], true), (2, vec![node(3)], false)];
        for (start, records, more) in pages {
            let query = device.mngp_request();
            assert_eq!(
                query,
                MngpMessage::EnumQuery(EnumQuery {
                    tag: TAG_CONNECTED_NODES,
                    start_index: start,
                    max_count: 16,
                })
            );
            device.send_mngp(MngpMessage::EnumResponse(EnumResponse {
                tag: TAG_CONNECTED_NODES,
                more,
                start_index: start,
                records,
            }));
        }
        device
    });

    let nodes = host
        .connected_nodes(Duration::from_secs(5))
        .expect("enumeration should complete");
    let shorts: Vec<u16> = nodes.iter().map(|n| n.short_address).collect();
    assert_eq!(shorts, vec![1, 2, 3]);
    modem.join().expect("device thread should complete");
}
