use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use schemix_eda::{PortMode, PortSpec};
use schemix_netlist::{Position, UuidIds};

use crate::document;
use crate::ui::StyledText;

#[derive(Args, Debug, Default, Clone)]
#[command(about = "Place a symbol instance in a schematic")]
pub struct PlaceArgs {
    /// Schematic document, created when missing
    #[arg(value_name = "SCHEMATIC")]
    pub schematic: PathBuf,

    /// Library symbol name, or a .bsf/.vhd file
    #[arg(value_name = "SYMBOL")]
    pub symbol: String,

    /// Canvas position as X,Y
    #[arg(long, value_parser = document::parse_position, default_value = "0,0")]
    pub at: Position,

    /// Extra symbol files to load into the library
    #[arg(long = "lib", value_name = "FILE")]
    pub libs: Vec<PathBuf>,
}

pub fn execute(args: PlaceArgs) -> Result<()> {
    let library = document::library(&args.libs)?;
    let symbol = document::resolve_symbol(&library, &args.symbol)?;
    let schematic = document::load(&args.schematic, true)?;

    let (next, id) = schematic.add_instance(&symbol, args.at, &mut UuidIds);
    document::save(&args.schematic, &next)?;

    let name = next.instance(&id).map(|i| i.instance_name.as_str()).unwrap_or(&id);
    println!("{}", format!("Placed {}", name.bold()).success());
    Ok(())
}

#[derive(Args, Debug, Default, Clone)]
#[command(about = "Place a block of inline VHDL glue logic")]
pub struct GlueArgs {
    #[arg(value_name = "SCHEMATIC")]
    pub schematic: PathBuf,

    /// Name shown on the glue block
    #[arg(value_name = "NAME")]
    pub name: String,

    /// File holding the concurrent VHDL statements
    #[arg(long, value_name = "FILE")]
    pub code: PathBuf,

    /// Port as NAME:MODE[:WIDTH], e.g. `x:in:8`
    #[arg(long = "port", value_name = "PORT", value_parser = parse_port_spec, required = true)]
    pub ports: Vec<PortSpec>,

    #[arg(long, value_parser = document::parse_position, default_value = "0,0")]
    pub at: Position,
}

pub fn execute_glue(args: GlueArgs) -> Result<()> {
    let code = fs::read_to_string(&args.code)
        .with_context(|| format!("Failed to read glue code {}", args.code.display()))?;
    let schematic = document::load(&args.schematic, true)?;

    let (next, id) = schematic.add_glue(&args.name, code, &args.ports, args.at, &mut UuidIds);
    document::save(&args.schematic, &next)?;

    let name = next.instance(&id).map(|i| i.instance_name.as_str()).unwrap_or(&id);
    println!(
        "{}",
        format!("Placed glue {} with {} ports", name.bold(), args.ports.len()).success()
    );
    Ok(())
}

fn parse_port_spec(s: &str) -> Result<PortSpec, String> {
    let mut parts = s.split(':');
    let name = parts
        .next()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| format!("missing port name in '{s}'"))?;
    let mode = parts
        .next()
        .and_then(PortMode::from_keyword)
        .ok_or_else(|| format!("expected in, out, inout or buffer in '{s}'"))?;
    let width = match parts.next() {
        Some(w) => w.parse().map_err(|_| format!("bad width '{w}'"))?,
        None => 1,
    };
    Ok(PortSpec::new(name, mode, width))
}

#[derive(Args, Debug, Default, Clone)]
#[command(about = "Move an instance; attached wires follow")]
pub struct MoveArgs {
    #[arg(value_name = "SCHEMATIC")]
    pub schematic: PathBuf,

    /// Instance name or id
    #[arg(value_name = "INSTANCE")]
    pub instance: String,

    #[arg(value_name = "X,Y", value_parser = document::parse_position)]
    pub to: Position,
}

pub fn execute_move(args: MoveArgs) -> Result<()> {
    let schematic = document::load(&args.schematic, false)?;
    let id = document::resolve_instance(&schematic, &args.instance)?;
    let next = schematic.move_instance(&id, args.to)?;
    document::save(&args.schematic, &next)?;
    println!(
        "{}",
        format!("Moved {} to {},{}", args.instance.bold(), args.to.x, args.to.y).success()
    );
    Ok(())
}

#[derive(Args, Debug, Default, Clone)]
#[command(about = "Remove an instance or a wire")]
pub struct RemoveArgs {
    #[arg(value_name = "SCHEMATIC")]
    pub schematic: PathBuf,

    /// Instance name, instance id or wire id
    #[arg(value_name = "ITEM")]
    pub item: String,
}

pub fn execute_remove(args: RemoveArgs) -> Result<()> {
    let schematic = document::load(&args.schematic, false)?;

    let next = if schematic.wire(&args.item).is_some() {
        schematic.remove_wire(&args.item)?
    } else {
        let id = document::resolve_instance(&schematic, &args.item)
            .map_err(|_| anyhow!("No instance or wire named '{}'", args.item))?;
        let next = schematic.remove_instance(&id)?;
        let dropped = schematic.wires.len() - next.wires.len();
        if dropped > 0 {
            log::info!("Removed {dropped} attached wires");
        }
        next
    };

    document::save(&args.schematic, &next)?;
    println!("{}", format!("Removed {}", args.item.bold()).success());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_port_spec() {
        assert_eq!(
            parse_port_spec("x:in:8"),
            Ok(PortSpec::new("x", PortMode::In, 8))
        );
        assert_eq!(parse_port_spec("y:out"), Ok(PortSpec::new("y", PortMode::Out, 1)));
        assert!(parse_port_spec("y:sideways").is_err());
        assert!(parse_port_spec(":in").is_err());
        assert!(parse_port_spec("y:in:wide").is_err());
    }
}
