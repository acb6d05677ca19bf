use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use schemix_eda::{SymbolLibrary, PIN_INPUT, PIN_OUTPUT};
use schemix_netlist::{auto_connect, compatible_ports, PortDirection, UuidIds};

use crate::document;
use crate::ui::StyledText;

#[derive(Args, Debug, Default, Clone)]
#[command(about = "Wire two ports together")]
pub struct ConnectArgs {
    #[arg(value_name = "SCHEMATIC")]
    pub schematic: PathBuf,

    /// Source port as <instance>:<port>
    #[arg(value_name = "FROM")]
    pub from: String,

    /// Target port as <instance>:<port>
    #[arg(value_name = "TO")]
    pub to: String,

    /// Drop wires already attached to the source port first
    #[arg(long)]
    pub replace: bool,
}

pub fn execute(args: ConnectArgs) -> Result<()> {
    let schematic = document::load(&args.schematic, false)?;
    let source = document::resolve_port(&schematic, &args.from)?;
    let target = document::resolve_port(&schematic, &args.to)?;

    let result = if args.replace {
        schematic.reconnect(&source, &target, &mut UuidIds)
    } else {
        schematic.connect(&source, &target, &mut UuidIds)
    };
    let (next, wire) = match result {
        Ok(ok) => ok,
        Err(e) => {
            eprintln!(
                "{}",
                format!("Cannot connect {} to {}", args.from, args.to).error()
            );
            return Err(e.into());
        }
    };

    document::save(&args.schematic, &next)?;
    let width = next.wire(&wire).map(|w| w.width).unwrap_or(1);
    println!(
        "{}",
        format!(
            "Connected {} -> {} ({} bit{})",
            document::port_label(&next, &source).bold(),
            document::port_label(&next, &target).bold(),
            width,
            if width == 1 { "" } else { "s" }
        )
        .success()
    );
    Ok(())
}

#[derive(Args, Debug, Default, Clone)]
#[command(about = "List the ports a port may legally connect to")]
pub struct CandidatesArgs {
    #[arg(value_name = "SCHEMATIC")]
    pub schematic: PathBuf,

    /// Port as <instance>:<port>
    #[arg(value_name = "PORT")]
    pub port: String,
}

pub fn execute_candidates(args: CandidatesArgs) -> Result<()> {
    let schematic = document::load(&args.schematic, false)?;
    let source = document::resolve_port(&schematic, &args.port)?;

    let candidates = compatible_ports(&schematic, &source);
    if candidates.is_empty() {
        println!("{}", format!("No compatible ports for {}", args.port).warning());
        return Ok(());
    }
    for candidate in candidates {
        println!(
            "{}  @ {},{}",
            candidate.label, candidate.location.x, candidate.location.y
        );
    }
    Ok(())
}

#[derive(Args, Debug, Default, Clone)]
#[command(about = "Create a top-level pin for a port and wire it up")]
pub struct PinArgs {
    #[arg(value_name = "SCHEMATIC")]
    pub schematic: PathBuf,

    /// Port as <instance>:<port>
    #[arg(value_name = "PORT")]
    pub port: String,

    /// Force an input pin
    #[arg(long, conflicts_with = "output")]
    pub input: bool,

    /// Force an output pin
    #[arg(long)]
    pub output: bool,
}

pub fn execute_pin(args: PinArgs) -> Result<()> {
    let schematic = document::load(&args.schematic, false)?;
    let source = document::resolve_port(&schematic, &args.port)?;
    let (_, port) = schematic
        .resolve(&source)
        .ok_or_else(|| anyhow!("No port {}", args.port))?;

    // Outputs leave the schematic, everything else is driven from outside.
    let template = if args.output || (!args.input && port.direction == PortDirection::Output) {
        PIN_OUTPUT
    } else {
        PIN_INPUT
    };
    let library = SymbolLibrary::with_builtins();
    let pin = library
        .get(template)
        .ok_or_else(|| anyhow!("Missing built-in symbol {template}"))?;

    let (next, pin_id) = schematic.export_to_pin(&source, pin, &mut UuidIds)?;
    document::save(&args.schematic, &next)?;

    let name = next
        .instance(&pin_id)
        .map(|i| i.instance_name.as_str())
        .unwrap_or(&pin_id);
    println!(
        "{}",
        format!("Exported {} as {}", args.port, name.bold()).success()
    );
    Ok(())
}

#[derive(Args, Debug, Default, Clone)]
#[command(about = "Wire every pair of ports with matching names and widths")]
pub struct AutoConnectArgs {
    #[arg(value_name = "SCHEMATIC")]
    pub schematic: PathBuf,
}

pub fn execute_auto(args: AutoConnectArgs) -> Result<()> {
    let schematic = document::load(&args.schematic, false)?;
    let (next, added) = auto_connect(&schematic, &mut UuidIds);

    if added == 0 {
        println!("{}", "No new connections".warning());
        return Ok(());
    }
    document::save(&args.schematic, &next)?;
    println!(
        "{}",
        format!("Added {added} wire{}", if added == 1 { "" } else { "s" }).success()
    );
    Ok(())
}
