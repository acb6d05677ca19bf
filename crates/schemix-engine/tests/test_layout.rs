use schemix_eda::SymbolLibrary;
use schemix_engine::{LayeredLayout, LayeredLayoutConfig};
use schemix_netlist::{
    LayoutEdge, LayoutEngine, LayoutError, LayoutRequest, PortRef, Position, Schematic,
    SequentialIds,
};

fn two_muxes(drive_from_input: bool) -> (Schematic, String, String) {
    let library = SymbolLibrary::with_builtins();
    let mux = library.get("2x8mux").unwrap();
    let mut ids = SequentialIds::new();

    let (sch, a) = Schematic::new().add_instance(mux, Position::new(500.0, 500.0), &mut ids);
    let (sch, b) = sch.add_instance(mux, Position::new(500.0, 500.0), &mut ids);
    let (y, input) = (PortRef::new(&a, 3), PortRef::new(&b, 1));
    let (sch, _) = if drive_from_input {
        sch.connect(&input, &y, &mut ids).unwrap()
    } else {
        sch.connect(&y, &input, &mut ids).unwrap()
    };
    (sch, a, b)
}

#[test]
fn test_driver_left_of_receiver() {
    let (sch, a, b) = two_muxes(false);
    let engine = LayeredLayout::default();
    let response = engine.layout(&LayoutRequest::from_schematic(&sch)).unwrap();

    assert_eq!(response.positions[&a], Position::new(0.0, 0.0));
    assert_eq!(response.positions[&b], Position::new(260.0, 0.0));

    let route = &response.routes[&sch.wires[0].id];
    assert_eq!(
        route,
        &vec![
            Position::new(160.0, 24.0),
            Position::new(210.0, 24.0),
            Position::new(210.0, 40.0),
            Position::new(260.0, 40.0),
        ]
    );

    let laid_out = sch.with_layout(&response);
    assert_eq!(laid_out.wires[0].start.location, Position::new(160.0, 24.0));
    assert_eq!(laid_out.wires[0].end.location, Position::new(260.0, 40.0));
}

#[test]
fn test_wire_drawn_backwards_keeps_flow() {
    let (sch, a, b) = two_muxes(true);
    let response = LayeredLayout::default()
        .layout(&LayoutRequest::from_schematic(&sch))
        .unwrap();
    assert!(response.positions[&a].x < response.positions[&b].x);
}

#[test]
fn test_unconnected_instances_stack() {
    let library = SymbolLibrary::with_builtins();
    let mut ids = SequentialIds::new();
    let (sch, a) = Schematic::new().add_instance(library.get("2x8mux").unwrap(), Position::default(), &mut ids);
    let (sch, b) = sch.add_instance(library.get("PIN_INPUT").unwrap(), Position::default(), &mut ids);

    let engine = LayeredLayout::new(LayeredLayoutConfig {
        node_spacing: 10.0,
        layer_spacing: 10.0,
    });
    let response = engine.layout(&LayoutRequest::from_schematic(&sch)).unwrap();
    assert_eq!(response.positions[&a], Position::new(0.0, 0.0));
    assert_eq!(response.positions[&b], Position::new(0.0, 90.0));
    assert!(response.routes.is_empty());
}

#[test]
fn test_unknown_port_fails() {
    let (sch, _, _) = two_muxes(false);
    let mut request = LayoutRequest::from_schematic(&sch);
    request.edges.push(LayoutEdge {
        id: "w_x".to_string(),
        source: "ghost-p0".to_string(),
        target: request.edges[0].target.clone(),
    });

    let err = LayeredLayout::default().layout(&request).unwrap_err();
    assert!(matches!(err, LayoutError::Failed(msg) if msg.contains("ghost-p0")));
}

#[test]
fn test_empty_request() {
    let response = LayeredLayout::default()
        .layout(&LayoutRequest::default())
        .unwrap();
    assert!(response.positions.is_empty());
    assert!(response.routes.is_empty());
}
