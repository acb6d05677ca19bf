use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use schemix_netlist::{to_vhdl_with, ExportOptions, Netlist, PortRef, DEFAULT_TOP_ENTITY};

use crate::document;
use crate::ui::StyledText;

#[derive(Args, Debug, Clone)]
#[command(about = "Export a schematic as a structural VHDL design")]
pub struct ExportArgs {
    #[arg(value_name = "SCHEMATIC")]
    pub schematic: PathBuf,

    /// Name of the generated top-level entity
    #[arg(long, default_value = DEFAULT_TOP_ENTITY)]
    pub top: String,

    /// Output file. Defaults to stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub fn execute(args: ExportArgs) -> Result<()> {
    let schematic = document::load(&args.schematic, false)?;
    let options = ExportOptions::default().with_top_entity(args.top.as_str());
    let vhdl = to_vhdl_with(&schematic, &options);

    let netlist = Netlist::build(&schematic);
    let open = schematic
        .instances
        .iter()
        .filter(|inst| !inst.is_external_pin())
        .flat_map(|inst| (0..inst.symbol.ports.len()).map(|i| PortRef::new(inst.id.clone(), i)))
        .filter(|port| netlist.net_of(port).is_none())
        .count();
    if open > 0 {
        log::warn!("{open} ports are unconnected and will be left open");
    }

    match args.output {
        Some(path) => {
            fs::write(&path, vhdl).with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{}",
                format!("Wrote {} to {}", args.top, path.display()).success()
            );
        }
        None => print!("{vhdl}"),
    }
    Ok(())
}
