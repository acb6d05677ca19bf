//! Longest-path layering and stacked placement.

use std::collections::HashMap;

use schemix_netlist::{LayoutError, LayoutNode, LayoutRequest, PortSide, Position};

/// Configuration for the layered layout
#[derive(Debug, Clone, PartialEq)]
pub struct LayeredLayoutConfig {
    /// Vertical gap between nodes in the same layer
    pub node_spacing: f64,
    /// Horizontal gap between the widest node of a layer and the next layer
    pub layer_spacing: f64,
}

impl Default for LayeredLayoutConfig {
    fn default() -> Self {
        Self {
            node_spacing: 100.0,
            layer_spacing: 100.0,
        }
    }
}

/// A port resolved to its node.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Endpoint {
    pub node: usize,
    pub x: f64,
    pub y: f64,
    pub side: PortSide,
}

#[derive(Debug, Clone)]
pub(crate) struct Edge {
    pub id: String,
    pub source: Endpoint,
    pub target: Endpoint,
}

impl Edge {
    /// Node pair in signal-flow order. A wire drawn from a west port to an
    /// east port runs against the flow.
    fn flow(&self) -> (usize, usize) {
        match (self.source.side, self.target.side) {
            (PortSide::West, PortSide::East) => (self.target.node, self.source.node),
            _ => (self.source.node, self.target.node),
        }
    }
}

pub(crate) struct Graph<'a> {
    pub nodes: &'a [LayoutNode],
    pub edges: Vec<Edge>,
    layers: Vec<usize>,
}

impl<'a> Graph<'a> {
    pub fn from_request(request: &'a LayoutRequest) -> Result<Self, LayoutError> {
        let mut ports: HashMap<&str, Endpoint> = HashMap::new();
        for (node, layout_node) in request.nodes.iter().enumerate() {
            for port in &layout_node.ports {
                ports.insert(
                    &port.id,
                    Endpoint {
                        node,
                        x: port.x,
                        y: port.y,
                        side: port.side,
                    },
                );
            }
        }

        let resolve = |edge_id: &str, port_id: &str| {
            ports.get(port_id).copied().ok_or_else(|| {
                LayoutError::Failed(format!("edge '{edge_id}' references unknown port '{port_id}'"))
            })
        };

        let edges = request
            .edges
            .iter()
            .map(|edge| {
                Ok(Edge {
                    id: edge.id.clone(),
                    source: resolve(&edge.id, &edge.source)?,
                    target: resolve(&edge.id, &edge.target)?,
                })
            })
            .collect::<Result<Vec<_>, LayoutError>>()?;

        let flows: Vec<(usize, usize)> = edges.iter().map(Edge::flow).collect();
        let layers = assign_layers(request.nodes.len(), &flows);

        Ok(Self {
            nodes: &request.nodes,
            edges,
            layers,
        })
    }

    pub fn layer_count(&self) -> usize {
        self.layers.iter().max().map_or(0, |&max| max + 1)
    }

    fn predecessors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.edges.iter().filter_map(move |edge| {
            let (from, to) = edge.flow();
            (to == node && self.layers[from] < self.layers[node]).then_some(from)
        })
    }
}

/// Longest-path layer per node for edges given as `(from, to)` pairs.
///
/// Sources sit in layer 0. Cycles are cut off at `node_count - 1` layers.
pub fn assign_layers(node_count: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let mut layers = vec![0; node_count];
    for _ in 0..node_count {
        let mut changed = false;
        for &(from, to) in edges {
            if from == to || from >= node_count || to >= node_count {
                continue;
            }
            let candidate = layers[from] + 1;
            if candidate > layers[to] && candidate < node_count {
                layers[to] = candidate;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    layers
}

/// Node origins: layers left to right, nodes of a layer stacked top to
/// bottom and ordered by the mean rank of their predecessors.
pub(crate) fn place(graph: &Graph<'_>, config: &LayeredLayoutConfig) -> Vec<Position> {
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); graph.layer_count()];
    for (node, &layer) in graph.layers.iter().enumerate() {
        members[layer].push(node);
    }

    let mut rank = vec![0.0_f64; graph.nodes.len()];
    for layer in members.iter_mut() {
        let mut keyed: Vec<(f64, usize)> = layer
            .iter()
            .enumerate()
            .map(|(index, &node)| {
                let preds: Vec<f64> = graph.predecessors(node).map(|p| rank[p]).collect();
                let key = if preds.is_empty() {
                    index as f64
                } else {
                    preds.iter().sum::<f64>() / preds.len() as f64
                };
                (key, node)
            })
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

        *layer = keyed.into_iter().map(|(_, node)| node).collect();
        for (index, &node) in layer.iter().enumerate() {
            rank[node] = index as f64;
        }
    }

    let mut positions = vec![Position::default(); graph.nodes.len()];
    let mut x = 0.0;
    for layer in &members {
        let mut y = 0.0;
        let mut widest = 0.0_f64;
        for &node in layer {
            positions[node] = Position::new(x, y);
            y += graph.nodes[node].height + config.node_spacing;
            widest = widest.max(graph.nodes[node].width);
        }
        x += widest + config.layer_spacing;
    }
    positions
}
