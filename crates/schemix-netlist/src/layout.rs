//! Interface to a graph layout engine.
//!
//! A [`LayoutRequest`] describes every instance as a node with fixed-position
//! ports and every wire as an edge between two port ids. The engine answers
//! with new instance positions and optional wire routes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{PortRef, Position, Schematic};

/// Which side of its node a port sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PortSide {
    West,
    East,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPort {
    pub id: String,
    /// Offset from the node origin.
    pub x: f64,
    pub y: f64,
    pub side: PortSide,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub id: String,
    pub width: f64,
    pub height: f64,
    pub ports: Vec<LayoutPort>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub id: String,
    /// Port id of the wire start.
    pub source: String,
    /// Port id of the wire end.
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutRequest {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutResponse {
    /// New origin per instance id.
    pub positions: BTreeMap<String, Position>,
    /// Polyline per wire id.
    pub routes: BTreeMap<String, Vec<Position>>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("layout engine unavailable: {0}")]
    Unavailable(String),
    #[error("layout failed: {0}")]
    Failed(String),
}

/// A collaborator that positions nodes and routes edges.
pub trait LayoutEngine {
    fn layout(&self, request: &LayoutRequest) -> Result<LayoutResponse, LayoutError>;
}

/// Port id used in layout requests: `<instance id>-p<index>`.
pub fn port_id(port: &PortRef) -> String {
    format!("{}-p{}", port.instance_id, port.port_index)
}

pub fn parse_port_id(id: &str) -> Option<PortRef> {
    let (instance_id, index) = id.rsplit_once("-p")?;
    Some(PortRef::new(instance_id, index.parse().ok()?))
}

impl LayoutRequest {
    pub fn from_schematic(schematic: &Schematic) -> Self {
        let nodes = schematic
            .instances
            .iter()
            .map(|inst| {
                let width = f64::from(inst.symbol.width());
                let ports = inst
                    .symbol
                    .ports
                    .iter()
                    .enumerate()
                    .map(|(index, port)| {
                        let x = f64::from(port.location.x);
                        LayoutPort {
                            id: port_id(&PortRef::new(inst.id.clone(), index)),
                            x,
                            y: f64::from(port.location.y),
                            side: if x * 2.0 <= width {
                                PortSide::West
                            } else {
                                PortSide::East
                            },
                        }
                    })
                    .collect();
                LayoutNode {
                    id: inst.id.clone(),
                    width,
                    height: f64::from(inst.symbol.height()),
                    ports,
                }
            })
            .collect();

        let edges = schematic
            .wires
            .iter()
            .map(|wire| LayoutEdge {
                id: wire.id.clone(),
                source: port_id(&wire.start.port_ref()),
                target: port_id(&wire.end.port_ref()),
            })
            .collect();

        Self { nodes, edges }
    }
}

impl Schematic {
    /// Apply engine output: instances and wires named in the response move
    /// or get routes, everything else stays as it was.
    pub fn with_layout(&self, response: &LayoutResponse) -> Schematic {
        let mut next = self.clone();
        for inst in &mut next.instances {
            if let Some(position) = response.positions.get(&inst.id) {
                inst.position = *position;
            }
        }
        for wire in &mut next.wires {
            if let Some(route) = response.routes.get(&wire.id) {
                wire.route = Some(route.clone());
            }
        }
        next.refresh_locations();
        next
    }
}
