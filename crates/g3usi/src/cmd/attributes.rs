use g3usi_host::Layer;
use g3usi_proto::{Access, CodecConfig};

use crate::cmd::AttributesArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_rows, OutputFormat, RowOutput};

pub fn run(args: AttributesArgs, format: OutputFormat) -> CliResult<i32> {
    let codec = args.codec.apply(CodecConfig::default());
    let layers: Vec<Layer> = match args.layer {
        Some(layer) => vec![layer],
        // adp-mac shares the MAC table.
        None => vec![Layer::Adp, Layer::Mac, Layer::Coord],
    };
    print_rows(&rows(&layers, &codec), format);
    Ok(SUCCESS)
}

fn rows(layers: &[Layer], codec: &CodecConfig) -> Vec<RowOutput> {
    layers
        .iter()
        .flat_map(|&layer| {
            layer.table().rows(codec).map(move |row| RowOutput {
                layer: layer.name(),
                id: format!("{:#010x}", row.id),
                name: row.name,
                layout: row.layout.name(),
                length: row.layout.fixed_len(codec),
                access: match row.access {
                    Access::ReadOnly => "ro",
                    Access::ReadWrite => "rw",
                },
                rf: row.hybrid_only,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rf_rows_need_hybrid() {
        let plc = rows(&[Layer::Adp], &CodecConfig::default());
        let hybrid = rows(&[Layer::Adp], &CodecConfig::default().with_hybrid(true));
        assert!(plc.iter().all(|r| !r.rf));
        assert!(hybrid.iter().any(|r| r.rf));
        assert!(hybrid.len() > plc.len());
        assert!(plc.iter().any(|r| r.name == "MAX_HOPS" && r.access == "rw"));
    }
}
