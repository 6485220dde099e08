use g3usi_transport::SerialLink;

use crate::cmd::PortsArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_ports, OutputFormat};

pub fn run(_args: PortsArgs, format: OutputFormat) -> CliResult<i32> {
    print_ports(&SerialLink::available(), format);
    Ok(SUCCESS)
}
