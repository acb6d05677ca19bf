
use test_utils::setup_test_env;

use schemix_eda::bsf::parse_bsf;
use schemix_eda::library::MUX_2X8_BSF;
use schemix_eda::vhdl::{parse_entity, synthesize_symbol};
use schemix_eda::{PortDirection, Symbol, SymbolLibrary};

#[test]
fn test_mux_sample_ports() {
    let symbol = parse_bsf(MUX_2X8_BSF);

    assert_eq!(symbol.name, "2x8mux");
    assert_eq!(symbol.version, "0.1");
    assert_eq!(symbol.ports.len(), 4);

    let summary: Vec<(&str, PortDirection, u32)> = symbol
        .ports
        .iter()
        .map(|p| (p.name.as_str(), p.direction, p.width))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("SEL", PortDirection::Input, 1),
            ("A", PortDirection::Input, 8),
            ("B", PortDirection::Input, 8),
            ("Y", PortDirection::Output, 8),
        ]
    );
}

#[test]
fn test_mux_sample_geometry() {
    let symbol = parse_bsf(MUX_2X8_BSF);

    assert_eq!(symbol.bounds.x1, 100);
    assert_eq!(symbol.bounds.y2, 180);
    assert_eq!(symbol.main_texts.len(), 2);
    assert_eq!(symbol.drawing.lines.len(), 4);
    assert_eq!(symbol.drawing.texts[0].value, "8 X 8 MULTIPLEXER");

    let a = &symbol.ports[1];
    assert_eq!(a.texts.len(), 2);
    assert_eq!(a.display_texts().len(), 1);
    assert_eq!(a.label(), "A[7..0]");
    assert_eq!(a.lines[0].p2.x, 16);
    assert_eq!(symbol.ports[3].location.x, 160);
}

#[test]
fn test_entity_file_synthesizes_symbol() {
    let env = setup_test_env();
    let symbol = Symbol::from_file(&env.path().join("and2.vhd")).unwrap();

    assert_eq!(symbol.name, "AND2");
    let left: Vec<_> = symbol.ports.iter().filter(|p| p.location.x == 0).collect();
    let right: Vec<_> = symbol
        .ports
        .iter()
        .filter(|p| p.location.x == symbol.bounds.x2)
        .collect();
    assert_eq!(left.len(), 2);
    assert_eq!(right.len(), 1);
    assert!(symbol.ports.iter().all(|p| p.width == 1));
}

#[test]
fn test_untitled_bsf_takes_file_stem() {
    let env = setup_test_env();
    let symbol = Symbol::from_file(&env.path().join("untitled.bsf")).unwrap();

    assert_eq!(symbol.name, "untitled");
    assert_eq!(symbol.version, "1.1");
    assert_eq!(symbol.ports.len(), 2);
}

#[test]
fn test_file_without_entity_is_an_error() {
    let env = setup_test_env();
    let err = Symbol::from_file(&env.path().join("broken.vhd")).unwrap_err();
    assert!(format!("{err:#}").contains("No entity declaration found"));
}

#[test]
fn test_library_loads_files() {
    let env = setup_test_env();
    let mut library = SymbolLibrary::with_builtins();

    library.load_file(&env.path().join("and2.vhd")).unwrap();
    library.load_file(&env.path().join("untitled.bsf")).unwrap();

    assert_eq!(library.symbols().len(), 5);
    assert!(library.get("AND2").is_some());
    assert!(library.get("untitled").is_some());
    assert!(library.load_file(&env.path().join("missing.bsf")).is_err());
}

#[test]
fn test_synthesis_preserves_port_attributes() {
    let source = "entity mixed is port (clk : in bit; d : in bit_vector(3 downto 0); \
                  q : out bit_vector(3 downto 0); io : inout bit); end;";
    let entity = parse_entity(source).unwrap();
    let symbol = synthesize_symbol(&entity.name, &entity.ports);

    for spec in &entity.ports {
        let port = symbol.ports.iter().find(|p| p.name == spec.name).unwrap();
        assert_eq!(port.width, spec.width);
        assert_eq!(port.direction, spec.mode.direction());
    }

    // Reading the synthesized labels back recovers the same names and widths
    let reparsed = parse_bsf(&schemix_eda::bsf::to_bsf_string(&symbol));
    for (a, b) in symbol.ports.iter().zip(&reparsed.ports) {
        assert_eq!((&a.name, a.width, a.direction), (&b.name, b.width, b.direction));
    }
}
