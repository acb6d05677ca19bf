use schemix_eda::vhdl::parse_entity;
use schemix_eda::{PortMode, PortSpec, Symbol, SymbolLibrary, PIN_INPUT, PIN_OUTPUT};
use schemix_netlist::{
    auto_connect, to_vhdl, to_vhdl_with, ExportOptions, Netlist, PortRef, Position, Schematic,
    SequentialIds,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn and2() -> Symbol {
    let entity = parse_entity(
        "entity AND2 is port ( A, B : in std_logic; Y : out std_logic ); end AND2;",
    )
    .unwrap();
    schemix_eda::vhdl::synthesize_symbol(&entity.name, &entity.ports)
}

/// A 2x8 mux whose B input is fed by a nibble-swapping glue block.
fn mux_with_glue() -> Schematic {
    let library = SymbolLibrary::with_builtins();
    let pin_in = library.get(PIN_INPUT).unwrap();
    let pin_out = library.get(PIN_OUTPUT).unwrap();
    let mut ids = SequentialIds::new();

    let (sch, mux) = Schematic::new().add_instance(
        library.get("2x8mux").unwrap(),
        Position::new(200.0, 100.0),
        &mut ids,
    );
    let (sch, swap) = sch.add_glue(
        "swap",
        "y <= x(3 downto 0) & x(7 downto 4);\n",
        &[
            PortSpec::new("x", PortMode::In, 8),
            PortSpec::new("y", PortMode::Out, 8),
        ],
        Position::new(0.0, 300.0),
        &mut ids,
    );

    let (sch, _) = sch
        .export_to_pin(&PortRef::new(&mux, 0), pin_in, &mut ids)
        .unwrap();
    let (sch, _) = sch
        .export_to_pin(&PortRef::new(&mux, 1), pin_in, &mut ids)
        .unwrap();
    let (sch, _) = sch
        .connect(&PortRef::new(&swap, 1), &PortRef::new(&mux, 2), &mut ids)
        .unwrap();
    let (sch, _) = sch
        .export_to_pin(&PortRef::new(&swap, 0), pin_in, &mut ids)
        .unwrap();
    let (sch, _) = sch
        .export_to_pin(&PortRef::new(&mux, 3), pin_out, &mut ids)
        .unwrap();
    sch
}

#[test]
fn test_mux_with_glue_snapshot() {
    init_logger();
    let vhdl = to_vhdl(&mux_with_glue());
    insta::assert_snapshot!("mux_with_glue", vhdl);
}

#[test]
fn test_single_pin_export() {
    init_logger();
    let library = SymbolLibrary::with_builtins();
    let mut ids = SequentialIds::new();
    let (sch, and) = Schematic::new().add_instance(&and2(), Position::default(), &mut ids);
    let (sch, _) = sch
        .export_to_pin(&PortRef::new(&and, 0), library.get(PIN_INPUT).unwrap(), &mut ids)
        .unwrap();

    let vhdl = to_vhdl_with(&sch, &ExportOptions::default().with_top_entity("gate"));
    assert!(vhdl.contains("entity gate is\n    port (\n        A_pin : in std_logic\n    );\nend gate;"));
    assert!(!vhdl.contains("signal "));
    assert!(vhdl.contains("            A => A_pin,\n"));
    assert!(vhdl.contains("            B => open,\n"));
    assert!(vhdl.contains("            Y => open\n"));
}

#[test]
fn test_one_declaration_per_template() {
    init_logger();
    let mut ids = SequentialIds::new();
    let gate = and2();
    let (sch, _) = Schematic::new().add_instance(&gate, Position::default(), &mut ids);
    let (sch, _) = sch.add_instance(&gate, Position::default(), &mut ids);

    let vhdl = to_vhdl(&sch);
    assert_eq!(vhdl.matches("component AND2\n").count(), 1);
    assert!(vhdl.contains("    AND2_1 : AND2\n"));
    assert!(vhdl.contains("    AND2_2 : AND2\n"));
}

#[test]
fn test_chain_resolves_to_one_signal() {
    init_logger();
    let mut ids = SequentialIds::new();
    let bidir = schemix_eda::vhdl::synthesize_symbol("tap", &[PortSpec::new("io", PortMode::InOut, 1)]);
    let mut sch = Schematic::new();
    let mut taps = Vec::new();
    for _ in 0..4 {
        let (next, id) = sch.add_instance(&bidir, Position::default(), &mut ids);
        sch = next;
        taps.push(PortRef::new(id, 0));
    }

    // A-B, C-D, then B-C joins the two halves.
    for (a, b) in [(0, 1), (2, 3), (1, 2)] {
        let (next, _) = sch.connect(&taps[a], &taps[b], &mut ids).unwrap();
        sch = next;
    }

    let netlist = Netlist::build(&sch);
    let names: Vec<&str> = taps.iter().map(|t| netlist.signal_for(t)).collect();
    assert_eq!(names, ["net_0"; 4]);
    assert_eq!(to_vhdl(&sch).matches("signal ").count(), 1);
}

#[test]
fn test_auto_connect_then_export() {
    init_logger();
    let mut ids = SequentialIds::new();
    let source = schemix_eda::vhdl::synthesize_symbol(
        "src",
        &[PortSpec::new("data", PortMode::Out, 4)],
    );
    let sink = schemix_eda::vhdl::synthesize_symbol(
        "sink",
        &[PortSpec::new("DATA", PortMode::In, 4)],
    );
    let (sch, _) = Schematic::new().add_instance(&source, Position::default(), &mut ids);
    let (sch, _) = sch.add_instance(&sink, Position::default(), &mut ids);

    let (sch, added) = auto_connect(&sch, &mut ids);
    assert_eq!(added, 1);

    let vhdl = to_vhdl(&sch);
    assert!(vhdl.contains("signal net_0 : std_logic_vector(3 downto 0);"));
    assert!(vhdl.contains("data => net_0"));
    assert!(vhdl.contains("DATA => net_0"));
}
