//! Orthogonal wire routes.
//!
//! Every route leaves its start port horizontally, makes at most one
//! vertical run and enters its end port horizontally.

use std::collections::BTreeMap;

use schemix_netlist::{PortSide, Position};

use crate::layered::{Endpoint, Graph};
use crate::LayeredLayoutConfig;

/// Route from `start` to `end` with one vertical run.
///
/// The run sits halfway between the ports when the end lies on the side
/// the start port faces, and `jog` beyond the start port otherwise.
pub fn route_edge(start: Position, end: Position, start_side: PortSide, jog: f64) -> Vec<Position> {
    if start.y == end.y {
        return vec![start, end];
    }

    let bend_x = match start_side {
        PortSide::East if end.x > start.x => (start.x + end.x) / 2.0,
        PortSide::West if end.x < start.x => (start.x + end.x) / 2.0,
        PortSide::East => start.x + jog,
        PortSide::West => start.x - jog,
    };

    vec![
        start,
        Position::new(bend_x, start.y),
        Position::new(bend_x, end.y),
        end,
    ]
}

fn absolute(endpoint: &Endpoint, positions: &[Position]) -> Position {
    let origin = positions[endpoint.node];
    Position::new(origin.x + endpoint.x, origin.y + endpoint.y)
}

pub(crate) fn route_all(
    graph: &Graph<'_>,
    positions: &[Position],
    config: &LayeredLayoutConfig,
) -> BTreeMap<String, Vec<Position>> {
    graph
        .edges
        .iter()
        .map(|edge| {
            let route = route_edge(
                absolute(&edge.source, positions),
                absolute(&edge.target, positions),
                edge.source.side,
                config.layer_spacing / 2.0,
            );
            (edge.id.clone(), route)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straight_route() {
        let route = route_edge(
            Position::new(0.0, 10.0),
            Position::new(50.0, 10.0),
            PortSide::East,
            20.0,
        );
        assert_eq!(route.len(), 2);
    }

    #[test]
    fn test_forward_route_bends_halfway() {
        let route = route_edge(
            Position::new(160.0, 24.0),
            Position::new(260.0, 40.0),
            PortSide::East,
            50.0,
        );
        assert_eq!(
            route,
            vec![
                Position::new(160.0, 24.0),
                Position::new(210.0, 24.0),
                Position::new(210.0, 40.0),
                Position::new(260.0, 40.0),
            ]
        );
    }

    #[test]
    fn test_backward_route_jogs_out() {
        let route = route_edge(
            Position::new(100.0, 0.0),
            Position::new(0.0, 50.0),
            PortSide::East,
            25.0,
        );
        assert_eq!(route[1], Position::new(125.0, 0.0));
        assert_eq!(route[2], Position::new(125.0, 50.0));
    }
}
