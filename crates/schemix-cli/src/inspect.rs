use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::document;

#[derive(Args, Debug, Default, Clone)]
#[command(about = "Show the ports and bounds of a symbol")]
pub struct InspectArgs {
    /// Library symbol name, or a .bsf/.vhd file
    #[arg(value_name = "SYMBOL")]
    pub symbol: String,

    /// Extra symbol files to load into the library
    #[arg(long = "lib", value_name = "FILE")]
    pub libs: Vec<PathBuf>,

    /// Print the symbol as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let library = document::library(&args.libs)?;
    let symbol = document::resolve_symbol(&library, &args.symbol)?;

    if args.json {
        let json = serde_json::to_string_pretty(&symbol).context("Failed to serialize symbol")?;
        println!("{json}");
        return Ok(());
    }

    let b = symbol.bounds;
    println!(
        "{} ({}x{} at {},{})",
        symbol.name.bold(),
        symbol.width(),
        symbol.height(),
        b.x1,
        b.y1
    );
    for (index, port) in symbol.ports.iter().enumerate() {
        println!(
            "  {:>2}  {:<16} {:<6} {:>3} bit{}  @ {},{}",
            index,
            port.label(),
            port.direction.keyword(),
            port.width,
            if port.width == 1 { " " } else { "s" },
            port.location.x,
            port.location.y
        );
    }
    if symbol.ports.is_empty() {
        println!("  {}", "no ports".dimmed());
    }
    Ok(())
}
