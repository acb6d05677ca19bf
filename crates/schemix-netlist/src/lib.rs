//! Schematic model for block-symbol designs.
//!
//! A [`Schematic`] is a value: every edit in [`edit`] returns a new snapshot
//! and leaves the receiver untouched, so callers can keep earlier snapshots
//! around for undo (see [`editor::Editor`]).
//!
//! Ports are addressed by `(instance id, port index)`. Wire endpoint
//! locations are a cache derived from instance positions and are refreshed
//! whenever geometry changes.

pub mod connectivity;
pub mod edit;
pub mod editor;
mod glue;
pub mod ident;
pub mod ids;
pub mod layout;
pub mod vhdl_export;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use schemix_eda::{Port, PortDirection, PortSpec, Symbol, PIN_INPUT, PIN_OUTPUT};

pub use connectivity::{auto_connect, check, compatible_ports, is_valid, Candidate, Rejection};
pub use edit::SchematicError;
pub use editor::{Editor, PendingLayout};
pub use ident::sanitize_identifier;
pub use ids::{IdSource, SequentialIds, UuidIds};
pub use layout::{
    LayoutEdge, LayoutEngine, LayoutError, LayoutNode, LayoutPort, LayoutRequest, LayoutResponse,
    PortSide,
};
pub use vhdl_export::{
    to_vhdl, to_vhdl_with, ExportOptions, Net, Netlist, DEFAULT_TOP_ENTITY, UNCONNECTED,
};

/// Absolute canvas position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset by a symbol-relative point.
    pub fn offset(self, point: schemix_eda::Point) -> Self {
        Self::new(self.x + f64::from(point.x), self.y + f64::from(point.y))
    }
}

/// What an instance means to the exporter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceRole {
    #[default]
    Component,
    /// Top-level input: its single port drives the schematic.
    InputPin,
    /// Top-level output: its single port is driven by the schematic.
    OutputPin,
    /// Inline code fragment with abstract ports.
    Glue,
}

impl InstanceRole {
    /// Role implied by a template name. Glue is never implied.
    pub fn for_template(template_name: &str) -> Self {
        match template_name {
            PIN_INPUT => InstanceRole::InputPin,
            PIN_OUTPUT => InstanceRole::OutputPin,
            _ => InstanceRole::Component,
        }
    }

    pub fn is_external_pin(self) -> bool {
        matches!(self, InstanceRole::InputPin | InstanceRole::OutputPin)
    }
}

/// Payload of a glue instance. `ports` is index-aligned with the
/// instance's symbol ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlueLogic {
    pub code: String,
    pub ports: Vec<PortSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    /// Name of the symbol this was cloned from. Never re-resolved.
    pub template_name: String,
    /// Display name, `<template>_<n>`.
    pub instance_name: String,
    pub position: Position,
    #[serde(default)]
    pub role: InstanceRole,
    /// Private copy of the template symbol.
    pub symbol: Symbol,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glue: Option<GlueLogic>,
}

impl Instance {
    pub fn port(&self, index: usize) -> Option<&Port> {
        self.symbol.port(index)
    }

    /// Absolute location of a port endpoint.
    pub fn port_location(&self, index: usize) -> Option<Position> {
        self.port(index).map(|p| self.position.offset(p.location))
    }

    pub fn is_external_pin(&self) -> bool {
        self.role.is_external_pin()
    }
}

/// Authoritative address of a port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortRef {
    pub instance_id: String,
    pub port_index: usize,
}

impl PortRef {
    pub fn new(instance_id: impl Into<String>, port_index: usize) -> Self {
        Self {
            instance_id: instance_id.into(),
            port_index,
        }
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.instance_id, self.port_index)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireConnection {
    pub instance_id: String,
    pub port_index: usize,
    /// Cached absolute location of the port.
    pub location: Position,
}

impl WireConnection {
    pub fn port_ref(&self) -> PortRef {
        PortRef::new(self.instance_id.clone(), self.port_index)
    }

    pub fn is(&self, port: &PortRef) -> bool {
        self.instance_id == port.instance_id && self.port_index == port.port_index
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wire {
    pub id: String,
    pub start: WireConnection,
    pub end: WireConnection,
    /// Routed polyline from the layout engine. Drawing only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<Vec<Position>>,
    /// Bit width, copied from the source port.
    pub width: u32,
}

impl Wire {
    pub fn touches_instance(&self, instance_id: &str) -> bool {
        self.start.instance_id == instance_id || self.end.instance_id == instance_id
    }

    pub fn touches(&self, port: &PortRef) -> bool {
        self.start.is(port) || self.end.is(port)
    }

    /// Whether this wire joins `a` and `b`, in either direction.
    pub fn joins(&self, a: &PortRef, b: &PortRef) -> bool {
        (self.start.is(a) && self.end.is(b)) || (self.start.is(b) && self.end.is(a))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schematic {
    pub instances: Vec<Instance>,
    pub wires: Vec<Wire>,
    /// Per-template instance counters, used for `<template>_<n>` names.
    #[serde(default)]
    pub counters: BTreeMap<String, u32>,
}

impl Schematic {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize the schematic to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn instance(&self, id: &str) -> Option<&Instance> {
        self.instances.iter().find(|inst| inst.id == id)
    }

    pub fn instance_by_name(&self, name: &str) -> Option<&Instance> {
        self.instances.iter().find(|inst| inst.instance_name == name)
    }

    pub fn wire(&self, id: &str) -> Option<&Wire> {
        self.wires.iter().find(|w| w.id == id)
    }

    /// Resolve a port reference to its instance and port.
    pub fn resolve(&self, port: &PortRef) -> Option<(&Instance, &Port)> {
        let instance = self.instance(&port.instance_id)?;
        Some((instance, instance.port(port.port_index)?))
    }

    /// Wires with an endpoint on `port`.
    pub fn wires_at<'a>(&'a self, port: &'a PortRef) -> impl Iterator<Item = &'a Wire> + 'a {
        self.wires.iter().filter(move |w| w.touches(port))
    }

    pub fn wire_between(&self, a: &PortRef, b: &PortRef) -> Option<&Wire> {
        self.wires.iter().find(|w| w.joins(a, b))
    }

    /// Cached endpoint for a port, or `None` when the port does not exist.
    pub fn connection(&self, port: &PortRef) -> Option<WireConnection> {
        let location = self.instance(&port.instance_id)?.port_location(port.port_index)?;
        Some(WireConnection {
            instance_id: port.instance_id.clone(),
            port_index: port.port_index,
            location,
        })
    }

    fn contains_id(&self, id: &str) -> bool {
        self.instances.iter().any(|inst| inst.id == id) || self.wires.iter().any(|w| w.id == id)
    }

    /// Draw ids until one is unused in this schematic.
    pub(crate) fn fresh_id(&self, ids: &mut dyn IdSource, prefix: &str) -> String {
        loop {
            let id = ids.next_id(prefix);
            if !self.contains_id(&id) {
                return id;
            }
            log::debug!("Id '{id}' already in use, drawing another");
        }
    }

    /// Recompute every wire endpoint location from instance positions.
    pub(crate) fn refresh_locations(&mut self) {
        let Schematic {
            instances, wires, ..
        } = self;
        for wire in wires.iter_mut() {
            for end in [&mut wire.start, &mut wire.end] {
                if let Some(location) = instances
                    .iter()
                    .find(|inst| inst.id == end.instance_id)
                    .and_then(|inst| inst.port_location(end.port_index))
                {
                    end.location = location;
                }
            }
        }
    }
}
