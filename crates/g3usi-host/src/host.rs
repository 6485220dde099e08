use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, TryLockError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use bytes::Bytes;
use g3usi_frame::{FrameError, FrameReader, FrameWriter, MNGP};
use g3usi_proto::adp::AdpRequest;
use g3usi_proto::coord::CoordRequest;
use g3usi_proto::mac::MacRequest;
use g3usi_proto::mngp::{
    ConnectedNode, EnumCursor, EnumQuery, EnumResponse, GetQuery, GetResponse, MngpKind,
    MngpMessage, TAG_CONNECTED_NODES,
};
use g3usi_proto::{
    AttributeData, AttributeRef, CodecConfig, GetConfirm, GetRequest, SetConfirm, SetRequest,
    Status,
};
use g3usi_transport::UsiStream;
use tracing::{debug, info, trace};

use crate::callbacks::CallbackTable;
use crate::config::HostConfig;
use crate::correlation::{Correlator, SyncChannel};
use crate::dispatch::Dispatcher;
use crate::error::{HostError, Result};
use crate::event::{ConfirmKey, Event};
use crate::layer::Layer;

/// One modem connection.
///
/// The receive side and the transmit side sit behind separate locks, so one
/// thread can pump the link while others transmit. A synchronous call pumps
/// the link itself when no other thread is doing so.
pub struct UsiHost<R = UsiStream, W = UsiStream> {
    reader: Mutex<FrameReader<R>>,
    writer: Mutex<FrameWriter<W>>,
    dispatcher: Dispatcher,
    correlator: Arc<Correlator>,
    config: HostConfig,
    closed_by_host: AtomicBool,
}

impl<R, W> std::fmt::Debug for UsiHost<R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsiHost")
            .field("endpoint", &self.config.endpoint)
            .field("dispatcher", &self.dispatcher)
            .field("closed", &self.correlator.is_closed())
            .finish()
    }
}

impl<R: Read, W: Write> UsiHost<R, W> {
    /// Assemble a host from an already-open frame reader and writer.
    pub fn from_parts(
        reader: FrameReader<R>,
        writer: FrameWriter<W>,
        config: HostConfig,
        callbacks: CallbackTable,
    ) -> Self {
        let correlator = Arc::new(Correlator::new());
        let dispatcher =
            Dispatcher::standard(config.codec, Arc::clone(&correlator), Arc::new(callbacks));
        Self {
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
            dispatcher,
            correlator,
            config,
            closed_by_host: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn codec(&self) -> &CodecConfig {
        &self.config.codec
    }

    /// Read once from the link and dispatch every completed frame.
    ///
    /// Returns the number of frames dispatched; `0` after a read timeout.
    pub fn pump(&self) -> Result<usize> {
        let mut reader = self.reader.lock().unwrap_or_else(PoisonError::into_inner);
        self.pump_locked(&mut reader)
    }

    fn pump_locked(&self, reader: &mut FrameReader<R>) -> Result<usize> {
        if self.correlator.is_closed() {
            return Err(HostError::Disconnected("host closed".to_string()));
        }
        match reader.pump(|frame| {
            self.dispatcher.dispatch(&frame);
        }) {
            Ok(n) => Ok(n),
            Err(FrameError::ConnectionClosed) => {
                info!(endpoint = %self.config.endpoint, "modem link reached end of stream");
                self.correlator.release_all("end of stream");
                Err(HostError::Disconnected("end of stream".to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Frame and transmit a raw payload (command byte first).
    pub fn send_raw(&self, protocol: u8, payload: &[u8]) -> Result<()> {
        if self.correlator.is_closed() {
            return Err(HostError::Disconnected("host closed".to_string()));
        }
        trace!(protocol, len = payload.len(), "transmit");
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.send(protocol, payload)?;
        Ok(())
    }

    pub fn send_adp(&self, req: &AdpRequest) -> Result<()> {
        let payload = req.encode(self.codec())?;
        self.send_raw(g3usi_frame::ADP, &payload)
    }

    pub fn send_mac(&self, req: &MacRequest) -> Result<()> {
        let payload = req.encode(self.codec())?;
        self.send_raw(g3usi_frame::MAC, &payload)
    }

    pub fn send_coord(&self, req: &CoordRequest) -> Result<()> {
        let payload = req.encode(self.codec())?;
        self.send_raw(g3usi_frame::COORD, &payload)
    }

    pub fn send_mngp(&self, msg: &MngpMessage) -> Result<()> {
        let payload = msg.encode(self.codec())?;
        self.send_raw(MNGP, &payload)
    }

    /// Send a get request; the confirm goes to the registered callback.
    pub fn get(&self, layer: Layer, attr: AttributeRef) -> Result<()> {
        let payload = layer.encode_get(GetRequest { attr }, self.codec())?;
        self.send_raw(layer.protocol(), &payload)
    }

    /// Send a set request; the confirm goes to the registered callback.
    ///
    /// The value is checked against `layer`'s table first; a request that
    /// fails the check is not sent.
    pub fn set(&self, layer: Layer, req: SetRequest) -> Result<()> {
        self.check_set(layer, &req)?;
        let payload = layer.encode_set(req, self.codec())?;
        self.send_raw(layer.protocol(), &payload)
    }

    /// Get an attribute and wait for its confirm.
    ///
    /// A failure status is returned inside the confirm, not as an error.
    pub fn get_sync(
        &self,
        layer: Layer,
        attr: AttributeRef,
        timeout: Duration,
    ) -> Result<GetConfirm> {
        let payload = layer.encode_get(GetRequest { attr }, self.codec())?;
        let channel = layer.channel(attr.id, self.codec());
        let event = self.call(
            channel,
            layer.get_confirm_key(),
            layer.protocol(),
            &payload,
            timeout,
        )?;
        let confirm = event
            .into_get_confirm()
            .ok_or(HostError::UnexpectedConfirm("expected a get confirm"))?;
        layer.table().check_len(confirm.value.as_bytes().len())?;
        Ok(confirm)
    }

    /// Set an attribute and wait for its confirm.
    pub fn set_sync(
        &self,
        layer: Layer,
        req: SetRequest,
        timeout: Duration,
    ) -> Result<SetConfirm> {
        self.check_set(layer, &req)?;
        let channel = layer.channel(req.attr().id, self.codec());
        let payload = layer.encode_set(req, self.codec())?;
        let event = self.call(
            channel,
            layer.set_confirm_key(),
            layer.protocol(),
            &payload,
            timeout,
        )?;
        event
            .into_set_confirm()
            .ok_or(HostError::UnexpectedConfirm("expected a set confirm"))
    }

    fn check_set(&self, layer: Layer, req: &SetRequest) -> Result<()> {
        let attr = req.attr();
        layer
            .table()
            .validate_raw(attr.id, req.value().as_bytes(), self.codec())
            .map_err(|err| {
                debug!(%layer, id = attr.id, error = %err, "set request refused");
                HostError::from(err)
            })
    }

    /// Typed value of an attribute. A failure status becomes [`HostError::Rejected`].
    pub fn read_attribute(
        &self,
        layer: Layer,
        attr: AttributeRef,
        timeout: Duration,
    ) -> Result<AttributeData> {
        let confirm = self.get_sync(layer, attr, timeout)?;
        match confirm.data(layer.table(), self.codec())? {
            Some(data) => Ok(data),
            None => Err(HostError::Rejected(confirm.status)),
        }
    }

    /// Encode, validate and set a typed value.
    ///
    /// The produced length must equal `declared_len`; otherwise nothing is sent.
    pub fn write_attribute(
        &self,
        layer: Layer,
        attr: AttributeRef,
        data: &AttributeData,
        declared_len: u8,
        timeout: Duration,
    ) -> Result<()> {
        let req = SetRequest::build(layer.table(), attr, data, declared_len, self.codec())?;
        let confirm = self.set_sync(layer, req, timeout)?;
        if confirm.status != Status::Success {
            return Err(HostError::Rejected(confirm.status));
        }
        Ok(())
    }

    /// Query device-management parameters.
    pub fn mngp_get_sync(&self, tags: &[u16], timeout: Duration) -> Result<GetResponse> {
        let query = MngpMessage::GetQuery(GetQuery {
            tags: tags.to_vec(),
        });
        let payload = query.encode(self.codec())?;
        let key = ConfirmKey::new(MNGP, MngpKind::GetResponse.code());
        match self.call(SyncChannel::Mngp, key, MNGP, &payload, timeout)? {
            Event::Mngp(MngpMessage::GetResponse(resp)) => Ok(resp),
            _ => Err(HostError::UnexpectedConfirm("expected a get response")),
        }
    }

    /// Fetch every record of an enumerable parameter, page by page.
    ///
    /// `timeout` bounds each page.
    pub fn mngp_enumerate_sync(
        &self,
        tag: u16,
        max_count: u8,
        timeout: Duration,
    ) -> Result<Vec<Bytes>> {
        let mut cursor = EnumCursor::new(tag, max_count);
        let mut records = Vec::new();
        while let Some(query) = cursor.query() {
            let page = self.enum_page(query.clone(), timeout)?;
            cursor.advance(&page)?;
            debug!(tag, start = page.start_index, count = page.records.len(), "enum page");
            records.extend(page.records);
        }
        Ok(records)
    }

    fn enum_page(&self, query: EnumQuery, timeout: Duration) -> Result<EnumResponse> {
        let payload = MngpMessage::EnumQuery(query).encode(self.codec())?;
        let key = ConfirmKey::new(MNGP, MngpKind::EnumResponse.code());
        match self.call(SyncChannel::Mngp, key, MNGP, &payload, timeout)? {
            Event::Mngp(MngpMessage::EnumResponse(resp)) => Ok(resp),
            _ => Err(HostError::UnexpectedConfirm("expected an enum response")),
        }
    }

    /// The coordinator's connected-node list.
    pub fn connected_nodes(&self, timeout: Duration) -> Result<Vec<ConnectedNode>> {
        let records = self.mngp_enumerate_sync(TAG_CONNECTED_NODES, 16, timeout)?;
        records
            .iter()
            .map(|rec| ConnectedNode::from_record(rec).map_err(HostError::from))
            .collect()
    }

    /// Claim `channel`, transmit, and wait for the confirm `key` until `timeout`.
    fn call(
        &self,
        channel: SyncChannel,
        key: ConfirmKey,
        protocol: u8,
        payload: &[u8],
        timeout: Duration,
    ) -> Result<Event> {
        let pending = self.correlator.begin(channel, key)?;
        self.send_raw(protocol, payload)?;

        let deadline = Instant::now() + timeout;
        loop {
            if let Some(outcome) = pending.poll() {
                return outcome;
            }
            let now = Instant::now();
            if now >= deadline {
                debug!(%channel, kind = key.kind, "synchronous call timed out");
                return Err(HostError::Timeout(timeout));
            }
            match self.reader.try_lock() {
                Ok(mut reader) => {
                    self.pump_locked(&mut reader)?;
                }
                Err(TryLockError::Poisoned(poisoned)) => {
                    self.pump_locked(&mut poisoned.into_inner())?;
                }
                Err(TryLockError::WouldBlock) => {
                    let wait = (deadline - now).min(self.config.poll_interval());
                    if let Some(outcome) = pending.wait(wait) {
                        return outcome;
                    }
                }
            }
        }
    }

    /// Release every waiter with [`HostError::Disconnected`] and refuse further traffic.
    pub fn close(&self) {
        if !self.closed_by_host.swap(true, Ordering::SeqCst) {
            info!(endpoint = %self.config.endpoint, "closing modem link");
            self.correlator.release_all("closed by host");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.correlator.is_closed()
    }

    /// Whether a synchronous call is in flight on `channel`.
    pub fn is_pending(&self, channel: SyncChannel) -> bool {
        self.correlator.is_pending(channel)
    }
}

impl<R, W> UsiHost<R, W>
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
{
    /// Pump the link on a dedicated thread until [`close`](Self::close) or EOF.
    ///
    /// The thread returns `Ok(())` after `close` and the error otherwise.
    pub fn spawn_reader(self: &Arc<Self>) -> std::io::Result<JoinHandle<Result<()>>> {
        let host = Arc::clone(self);
        thread::Builder::new()
            .name("g3usi-reader".to_string())
            .spawn(move || loop {
                match host.pump() {
                    Ok(_) => {}
                    Err(_) if host.closed_by_host.load(Ordering::SeqCst) => return Ok(()),
                    Err(err) => {
                        debug!(error = %err, "reader thread stopping");
                        return Err(err);
                    }
                }
            })
    }
}
