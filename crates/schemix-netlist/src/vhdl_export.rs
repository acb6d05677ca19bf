//! Structural VHDL export.
//!
//! Wires are merged into nets by union-find over port references. A net is
//! named `net_<k>`, `k` being the index of its first wire, unless it reaches
//! an external pin, in which case it takes the pin's name and is not
//! declared as a signal. Unconnected ports map to `open`.

use std::collections::HashMap;
use std::fmt::{self, Write};

use crate::glue::substitute_identifiers;
use crate::ident::sanitize_identifier;
use crate::{Instance, InstanceRole, PortDirection, PortRef, Schematic};

pub const UNCONNECTED: &str = "open";
pub const DEFAULT_TOP_ENTITY: &str = "TopLevelSchematic";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Name of the generated top-level entity.
    pub top_entity: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            top_entity: DEFAULT_TOP_ENTITY.to_string(),
        }
    }
}

impl ExportOptions {
    pub fn with_top_entity(mut self, name: impl Into<String>) -> Self {
        self.top_entity = name.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Net {
    pub name: String,
    pub width: u32,
    /// Every port reached through the net's wires.
    pub members: Vec<PortRef>,
    /// Id of the external pin the net is bound to.
    pub pin: Option<String>,
}

impl Net {
    /// Whether the net needs its own signal declaration.
    pub fn is_signal(&self) -> bool {
        self.pin.is_none()
    }
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn add(&mut self) -> usize {
        self.parent.push(self.parent.len());
        self.parent.len() - 1
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[rb] = ra;
        }
    }
}

/// Connectivity of a schematic, grouped into named nets.
#[derive(Debug, Clone, Default)]
pub struct Netlist {
    nets: Vec<Net>,
    index: HashMap<PortRef, usize>,
}

impl Netlist {
    pub fn build(schematic: &Schematic) -> Self {
        let mut uf = UnionFind { parent: Vec::new() };
        let mut keys: Vec<PortRef> = Vec::new();
        let mut slots: HashMap<PortRef, usize> = HashMap::new();
        let mut intern = |port: PortRef, uf: &mut UnionFind| {
            *slots.entry(port.clone()).or_insert_with(|| {
                keys.push(port);
                uf.add()
            })
        };

        let mut wire_slots = Vec::with_capacity(schematic.wires.len());
        for wire in &schematic.wires {
            let a = intern(wire.start.port_ref(), &mut uf);
            let b = intern(wire.end.port_ref(), &mut uf);
            uf.union(a, b);
            wire_slots.push(a);
        }

        let mut nets: Vec<Net> = Vec::new();
        let mut net_of_root: HashMap<usize, usize> = HashMap::new();
        for (k, (wire, slot)) in schematic.wires.iter().zip(wire_slots).enumerate() {
            let root = uf.find(slot);
            net_of_root.entry(root).or_insert_with(|| {
                nets.push(Net {
                    name: format!("net_{k}"),
                    width: wire.width,
                    members: Vec::new(),
                    pin: None,
                });
                nets.len() - 1
            });
        }

        let mut index = HashMap::new();
        for (slot, key) in keys.into_iter().enumerate() {
            if let Some(&net) = net_of_root.get(&uf.find(slot)) {
                nets[net].members.push(key.clone());
                index.insert(key, net);
            }
        }

        for pin in schematic.instances.iter().filter(|inst| inst.is_external_pin()) {
            let Some(&n) = index.get(&PortRef::new(pin.id.clone(), 0)) else {
                continue;
            };
            let net = &mut nets[n];
            match &net.pin {
                None => {
                    net.name = sanitize_identifier(&pin.instance_name);
                    net.pin = Some(pin.id.clone());
                }
                Some(first) => log::warn!(
                    "Pin '{}' shares a net with pin '{first}', keeping '{}'",
                    pin.instance_name,
                    net.name
                ),
            }
        }

        log::debug!(
            "Built {} nets from {} wires",
            nets.len(),
            schematic.wires.len()
        );
        Self { nets, index }
    }

    pub fn nets(&self) -> &[Net] {
        &self.nets
    }

    pub fn net_of(&self, port: &PortRef) -> Option<&Net> {
        self.index.get(port).map(|&n| &self.nets[n])
    }

    /// Signal name a port maps to, or [`UNCONNECTED`].
    pub fn signal_for(&self, port: &PortRef) -> &str {
        self.net_of(port)
            .map(|net| net.name.as_str())
            .unwrap_or(UNCONNECTED)
    }
}

/// Export with the default top-level entity name.
pub fn to_vhdl(schematic: &Schematic) -> String {
    to_vhdl_with(schematic, &ExportOptions::default())
}

pub fn to_vhdl_with(schematic: &Schematic, options: &ExportOptions) -> String {
    let netlist = Netlist::build(schematic);
    let document = VhdlDocument {
        schematic,
        netlist: &netlist,
        top: sanitize_identifier(&options.top_entity),
    };
    document.to_string()
}

struct VhdlDocument<'a> {
    schematic: &'a Schematic,
    netlist: &'a Netlist,
    top: String,
}

impl VhdlDocument<'_> {
    fn instances(&self, role: InstanceRole) -> impl Iterator<Item = &Instance> + '_ {
        self.schematic
            .instances
            .iter()
            .filter(move |inst| inst.role == role)
    }

    fn pins(&self) -> impl Iterator<Item = &Instance> + '_ {
        self.schematic
            .instances
            .iter()
            .filter(|inst| inst.is_external_pin())
    }

    fn write_entity(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ports: Vec<String> = self
            .pins()
            .map(|pin| {
                let mode = if pin.role == InstanceRole::InputPin {
                    "in"
                } else {
                    "out"
                };
                let width = pin.port(0).map(|p| p.width).unwrap_or(1);
                format!(
                    "{} : {mode} {}",
                    sanitize_identifier(&pin.instance_name),
                    vhdl_type(width)
                )
            })
            .collect();

        writeln!(f, "entity {} is", self.top)?;
        write_port_clause(f, "    ", &ports)?;
        writeln!(f, "end {};", self.top)
    }

    fn write_components(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "    -- Component declarations")?;
        let mut declared: Vec<&str> = Vec::new();
        for inst in self.instances(InstanceRole::Component) {
            if declared.contains(&inst.template_name.as_str()) {
                continue;
            }
            declared.push(&inst.template_name);

            let ports: Vec<String> = inst
                .symbol
                .ports
                .iter()
                .map(|p| {
                    format!(
                        "{} : {} {}",
                        sanitize_identifier(&p.name),
                        vhdl_mode(p.direction),
                        vhdl_type(p.width)
                    )
                })
                .collect();

            writeln!(f, "    component {}", sanitize_identifier(&inst.template_name))?;
            write_port_clause(f, "        ", &ports)?;
            writeln!(f, "    end component;")?;
            writeln!(f)?;
        }
        Ok(())
    }

    fn write_signals(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "    -- Signal declarations")?;
        for net in self.netlist.nets().iter().filter(|net| net.is_signal()) {
            writeln!(f, "    signal {} : {};", net.name, vhdl_type(net.width))?;
        }
        Ok(())
    }

    fn write_instantiations(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for inst in self.instances(InstanceRole::Component) {
            let label = sanitize_identifier(&inst.instance_name);
            let component = sanitize_identifier(&inst.template_name);
            if inst.symbol.ports.is_empty() {
                writeln!(f, "    {label} : {component};")?;
                writeln!(f)?;
                continue;
            }

            writeln!(f, "    {label} : {component}")?;
            writeln!(f, "        port map (")?;
            let count = inst.symbol.ports.len();
            for (index, port) in inst.symbol.ports.iter().enumerate() {
                let signal = self
                    .netlist
                    .signal_for(&PortRef::new(inst.id.clone(), index));
                let sep = if index + 1 < count { "," } else { "" };
                writeln!(
                    f,
                    "            {} => {signal}{sep}",
                    sanitize_identifier(&port.name)
                )?;
            }
            writeln!(f, "        );")?;
            writeln!(f)?;
        }
        Ok(())
    }

    fn write_glue(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for inst in self.instances(InstanceRole::Glue) {
            writeln!(f, "    -- Glue logic: {}", inst.instance_name)?;
            let Some(glue) = &inst.glue else {
                writeln!(f)?;
                continue;
            };

            let replacements: HashMap<String, String> = glue
                .ports
                .iter()
                .enumerate()
                .map(|(index, spec)| {
                    let signal = self
                        .netlist
                        .signal_for(&PortRef::new(inst.id.clone(), index));
                    (spec.name.clone(), signal.to_string())
                })
                .collect();

            for line in substitute_identifiers(glue.code.trim_end(), &replacements).lines() {
                if line.trim().is_empty() {
                    writeln!(f)?;
                } else {
                    writeln!(f, "    {line}")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for VhdlDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "-".repeat(60))?;
        writeln!(f, "-- Generated by schemix")?;
        writeln!(f, "{}", "-".repeat(60))?;
        writeln!(f)?;
        writeln!(f, "library IEEE;")?;
        writeln!(f, "use IEEE.STD_LOGIC_1164.ALL;")?;
        writeln!(f, "use IEEE.NUMERIC_STD.ALL;")?;
        writeln!(f)?;

        self.write_entity(f)?;
        writeln!(f)?;

        writeln!(f, "architecture Structural of {} is", self.top)?;
        writeln!(f)?;
        self.write_components(f)?;
        self.write_signals(f)?;
        writeln!(f)?;
        writeln!(f, "begin")?;
        writeln!(f)?;
        self.write_instantiations(f)?;
        self.write_glue(f)?;
        writeln!(f, "end Structural;")
    }
}

/// `port ( ... );` with one entry per line, or nothing for an empty list.
fn write_port_clause(f: &mut impl Write, indent: &str, ports: &[String]) -> fmt::Result {
    if ports.is_empty() {
        return Ok(());
    }
    writeln!(f, "{indent}port (")?;
    for (i, port) in ports.iter().enumerate() {
        let sep = if i + 1 < ports.len() { ";" } else { "" };
        writeln!(f, "{indent}    {port}{sep}")?;
    }
    writeln!(f, "{indent});")
}

fn vhdl_mode(direction: PortDirection) -> &'static str {
    match direction {
        PortDirection::Input => "in",
        PortDirection::Output => "out",
        PortDirection::Bidirectional => "inout",
    }
}

fn vhdl_type(width: u32) -> String {
    if width > 1 {
        format!("std_logic_vector({} downto 0)", width - 1)
    } else {
        "std_logic".to_string()
    }
}
