//! Loading and saving schematic documents, and resolving the names users
//! type on the command line into ports and symbols.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use schemix_eda::{base_name, Symbol, SymbolLibrary};
use schemix_netlist::{PortRef, Position, Schematic};

/// Read a schematic document. A missing file is an empty schematic when
/// `create` is set.
pub fn load(path: &Path, create: bool) -> Result<Schematic> {
    if create && !path.exists() {
        log::info!("Starting new schematic at {}", path.display());
        return Ok(Schematic::new());
    }
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read schematic {}", path.display()))?;
    Schematic::from_json(&json)
        .with_context(|| format!("Failed to parse schematic {}", path.display()))
}

pub fn save(path: &Path, schematic: &Schematic) -> Result<()> {
    let json = schematic.to_json().context("Failed to serialize schematic")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Built-in symbols plus every file given with `--lib`.
pub fn library(paths: &[PathBuf]) -> Result<SymbolLibrary> {
    let mut library = SymbolLibrary::with_builtins();
    for path in paths {
        let symbol = library.load_file(path)?;
        log::debug!("Loaded symbol '{}' from {}", symbol.name, path.display());
    }
    Ok(library)
}

/// A symbol named in `library`, or a `.bsf`/`.vhd` file on disk.
pub fn resolve_symbol(library: &SymbolLibrary, name: &str) -> Result<Symbol> {
    if let Some(symbol) = library.get(name) {
        return Ok(symbol.clone());
    }
    let path = Path::new(name);
    if path.is_file() {
        return Symbol::from_file(path);
    }
    bail!(
        "Unknown symbol '{}'. Available: {}",
        name,
        library.names().join(", ")
    )
}

/// Resolve `<instance name>:<port>` where the port is either an index or a
/// port name. Names match exactly first, then by base name.
pub fn resolve_port(schematic: &Schematic, endpoint: &str) -> Result<PortRef> {
    let (instance_name, port) = endpoint
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("Expected <instance>:<port>, got '{endpoint}'"))?;
    let instance = schematic
        .instance_by_name(instance_name)
        .or_else(|| schematic.instance(instance_name))
        .ok_or_else(|| anyhow!("No instance named '{instance_name}'"))?;

    let ports = &instance.symbol.ports;
    let index = match port.parse::<usize>() {
        Ok(index) if index < ports.len() => index,
        Ok(index) => bail!(
            "{} has {} ports, no port {}",
            instance.instance_name,
            ports.len(),
            index
        ),
        Err(_) => ports
            .iter()
            .position(|p| p.name == port)
            .or_else(|| ports.iter().position(|p| base_name(&p.name) == base_name(port)))
            .ok_or_else(|| anyhow!("{} has no port '{}'", instance.instance_name, port))?,
    };
    Ok(PortRef::new(instance.id.clone(), index))
}

/// Resolve an instance by display name or id, returning its id.
pub fn resolve_instance(schematic: &Schematic, name: &str) -> Result<String> {
    schematic
        .instance_by_name(name)
        .or_else(|| schematic.instance(name))
        .map(|inst| inst.id.clone())
        .ok_or_else(|| anyhow!("No instance named '{name}'"))
}

/// Human label for a port, `<instance name>:<port name>`.
pub fn port_label(schematic: &Schematic, port: &PortRef) -> String {
    match schematic.resolve(port) {
        Some((inst, p)) => format!("{}:{}", inst.instance_name, p.name),
        None => port.to_string(),
    }
}

/// Parse `X,Y`.
pub fn parse_position(s: &str) -> Result<Position, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{s}'"))?;
    let x = x.trim().parse().map_err(|_| format!("bad x coordinate '{x}'"))?;
    let y = y.trim().parse().map_err(|_| format!("bad y coordinate '{y}'"))?;
    Ok(Position::new(x, y))
}
