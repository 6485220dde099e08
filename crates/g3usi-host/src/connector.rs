use g3usi_frame::{FrameReader, FrameWriter};
use tracing::info;

use crate::callbacks::CallbackTable;
use crate::config::HostConfig;
use crate::error::Result;
use crate::host::UsiHost;

/// Open a modem link with default settings and no callbacks.
pub fn open(endpoint: &str) -> Result<UsiHost> {
    open_with_config(HostConfig::new(endpoint), CallbackTable::default())
}

/// Open a modem link with explicit configuration.
pub fn open_with_config(config: HostConfig, callbacks: CallbackTable) -> Result<UsiHost> {
    let transport = config.transport();
    let stream = g3usi_transport::open(&transport)?;
    let reader_stream = stream.try_clone()?;

    let frame_config = config.frame_config();
    let reader = FrameReader::with_config_usi(reader_stream, frame_config.clone())?;
    let writer = FrameWriter::with_config_usi(stream, frame_config)?;

    info!(
        endpoint = %config.endpoint,
        transport = writer.get_ref().transport_name(),
        hybrid = config.codec.hybrid,
        "modem link open"
    );
    Ok(UsiHost::from_parts(reader, writer, config, callbacks))
}
