use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use schemix_eda::bsf::to_bsf_string;

use crate::document;
use crate::ui::StyledText;

#[derive(Args, Debug, Default, Clone)]
#[command(about = "Write a block symbol file for a VHDL entity or library symbol")]
pub struct SymbolArgs {
    /// Library symbol name, or a .bsf/.vhd file
    #[arg(value_name = "SYMBOL")]
    pub symbol: String,

    /// Output file. Defaults to stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub fn execute(args: SymbolArgs) -> Result<()> {
    let library = document::library(&[])?;
    let symbol = document::resolve_symbol(&library, &args.symbol)?;
    let bsf = to_bsf_string(&symbol);

    match args.output {
        Some(path) => {
            fs::write(&path, bsf).with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{}",
                format!("Wrote symbol '{}' to {}", symbol.name, path.display()).success()
            );
        }
        None => print!("{bsf}"),
    }
    Ok(())
}
