//! # schemix-engine
//!
//! A deterministic [`LayoutEngine`] for schematics. Instances are assigned
//! to layers from left to right by longest path along their wires, stacked
//! top to bottom inside each layer, and every wire gets an orthogonal route
//! with a single vertical run.
//!
//! It needs no external process, so it is what the command line uses when
//! positions are requested.

use schemix_netlist::{LayoutEngine, LayoutError, LayoutRequest, LayoutResponse};

pub mod layered;
pub mod router;

pub use layered::{assign_layers, LayeredLayoutConfig};

/// Layered layout: longest-path layering plus orthogonal routing.
#[derive(Debug, Clone, Default)]
pub struct LayeredLayout {
    config: LayeredLayoutConfig,
}

impl LayeredLayout {
    pub fn new(config: LayeredLayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayeredLayoutConfig {
        &self.config
    }
}

impl LayoutEngine for LayeredLayout {
    fn layout(&self, request: &LayoutRequest) -> Result<LayoutResponse, LayoutError> {
        let graph = layered::Graph::from_request(request)?;
        let positions = layered::place(&graph, &self.config);
        let routes = router::route_all(&graph, &positions, &self.config);

        log::debug!(
            "Laid out {} nodes in {} layers, routed {} edges",
            graph.nodes.len(),
            graph.layer_count(),
            routes.len()
        );

        Ok(LayoutResponse {
            positions: graph
                .nodes
                .iter()
                .zip(positions)
                .map(|(node, position)| (node.id.clone(), position))
                .collect(),
            routes,
        })
    }
}
