use g3usi_host::{open_with_config, CallbackTable, Layer};
use g3usi_proto::{AttributeRef, CodecConfig, GetConfirm};
use tracing::debug;

use crate::cmd::{resolve_attribute, GetArgs};
use crate::exit::{host_error, CliResult, FAILURE, SUCCESS};
use crate::output::{print_attribute, to_hex, AttributeOutput, OutputFormat};

pub fn run(args: GetArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.link.host_config()?;
    let codec = config.codec;
    let id = resolve_attribute(args.layer, &args.attribute, &codec)?;
    let timeout = config.sync_timeout();

    let host = open_with_config(config, CallbackTable::default())
        .map_err(|err| host_error("connect failed", err))?;
    let confirm = host
        .get_sync(args.layer, AttributeRef::new(id, args.index), timeout)
        .map_err(|err| host_error("get failed", err))?;
    host.close();

    let out = attribute_output(args.layer, &confirm, &codec);
    print_attribute(&out, format);
    if confirm.status.is_success() {
        Ok(SUCCESS)
    } else {
        Ok(FAILURE)
    }
}

pub(crate) fn attribute_output(
    layer: Layer,
    confirm: &GetConfirm,
    codec: &CodecConfig,
) -> AttributeOutput {
    let table = layer.table();
    let value = match confirm.data(table, codec) {
        Ok(data) => data.map(|d| d.to_string()),
        Err(err) => {
            debug!(error = %err, "value does not match its table row");
            None
        }
    };
    AttributeOutput {
        layer: layer.name(),
        id: format!("{:#010x}", confirm.attr.id),
        name: table.lookup(confirm.attr.id, codec).map(|row| row.name),
        index: confirm.attr.index,
        status: confirm.status.name(),
        length: confirm.value.as_bytes().len(),
        raw: to_hex(confirm.value.as_bytes()),
        value,
    }
}
