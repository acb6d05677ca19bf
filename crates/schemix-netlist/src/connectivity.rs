//! Which ports may be wired together.
//!
//! [`check`] is the single rule set used by manual connects, the
//! auto-connect sweep and the candidate list.

use schemix_eda::base_name;
use thiserror::Error;

use crate::{IdSource, Instance, InstanceRole, PortDirection, PortRef, Position, Schematic};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("a port cannot be wired to its own instance")]
    SelfConnection,
    #[error("no instance with id '{0}'")]
    UnknownInstance(String),
    #[error("two external pins cannot be wired together")]
    PinToPin,
    #[error("no port {0}")]
    UnknownPort(PortRef),
    #[error("width mismatch ({source_width} bits vs {target_width} bits)")]
    WidthMismatch { source_width: u32, target_width: u32 },
    #[error("an input pin cannot connect to an output port")]
    InputPinToOutput,
    #[error("an output pin cannot connect to an input port")]
    OutputPinToInput,
    #[error("{} port cannot connect to {} port", .0.keyword(), .1.keyword())]
    Directions(PortDirection, PortDirection),
}

/// Decide whether `source` may be wired to port `target_port` of
/// `target_instance`. Rules apply in order; the first failing one is
/// reported.
pub fn check(
    schematic: &Schematic,
    source: &PortRef,
    target_instance: &str,
    target_port: usize,
) -> Result<(), Rejection> {
    if source.instance_id == target_instance {
        return Err(Rejection::SelfConnection);
    }

    let inst1 = schematic
        .instance(&source.instance_id)
        .ok_or_else(|| Rejection::UnknownInstance(source.instance_id.clone()))?;
    let inst2 = schematic
        .instance(target_instance)
        .ok_or_else(|| Rejection::UnknownInstance(target_instance.to_string()))?;

    if inst1.is_external_pin() && inst2.is_external_pin() {
        return Err(Rejection::PinToPin);
    }

    let p1 = inst1
        .port(source.port_index)
        .ok_or_else(|| Rejection::UnknownPort(source.clone()))?;
    let p2 = inst2
        .port(target_port)
        .ok_or_else(|| Rejection::UnknownPort(PortRef::new(target_instance, target_port)))?;

    if p1.width != p2.width {
        return Err(Rejection::WidthMismatch {
            source_width: p1.width,
            target_width: p2.width,
        });
    }

    if let Some(rejection) =
        pin_conflict(inst1, p2.direction).or_else(|| pin_conflict(inst2, p1.direction))
    {
        return Err(rejection);
    }

    match (p1.direction, p2.direction) {
        (PortDirection::Bidirectional, _) | (_, PortDirection::Bidirectional) => Ok(()),
        (PortDirection::Input, PortDirection::Output)
        | (PortDirection::Output, PortDirection::Input) => Ok(()),
        (a, b) => Err(Rejection::Directions(a, b)),
    }
}

fn pin_conflict(pin: &Instance, other: PortDirection) -> Option<Rejection> {
    match (pin.role, other) {
        (InstanceRole::InputPin, PortDirection::Output) => Some(Rejection::InputPinToOutput),
        (InstanceRole::OutputPin, PortDirection::Input) => Some(Rejection::OutputPinToInput),
        _ => None,
    }
}

pub fn is_valid(
    schematic: &Schematic,
    source: &PortRef,
    target_instance: &str,
    target_port: usize,
) -> bool {
    check(schematic, source, target_instance, target_port).is_ok()
}

/// A port that `source` could legally be wired to.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub port: PortRef,
    /// `<instance name>: <port name>`
    pub label: String,
    pub location: Position,
}

/// Every port in the schematic that `source` may connect to, in instance
/// and port order.
pub fn compatible_ports(schematic: &Schematic, source: &PortRef) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for inst in &schematic.instances {
        for (index, port) in inst.symbol.ports.iter().enumerate() {
            if !is_valid(schematic, source, &inst.id, index) {
                continue;
            }
            candidates.push(Candidate {
                port: PortRef::new(inst.id.clone(), index),
                label: format!("{}: {}", inst.instance_name, port.name),
                location: inst.position.offset(port.location),
            });
        }
    }
    candidates
}

/// Wire every pair of ports on distinct instances whose base names and
/// widths match and that pass [`check`].
///
/// Pairs already joined by a wire (in either direction, including wires
/// added earlier in the same sweep) are skipped. Returns the new snapshot
/// and the number of wires added.
pub fn auto_connect(schematic: &Schematic, ids: &mut dyn IdSource) -> (Schematic, usize) {
    let mut next = schematic.clone();
    let mut added = 0;

    for inst1 in &schematic.instances {
        for (i1, p1) in inst1.symbol.ports.iter().enumerate() {
            let name1 = base_name(&p1.name);
            let a = PortRef::new(inst1.id.clone(), i1);

            for inst2 in schematic.instances.iter().filter(|inst| inst.id != inst1.id) {
                for (i2, p2) in inst2.symbol.ports.iter().enumerate() {
                    if p1.width != p2.width || base_name(&p2.name) != name1 {
                        continue;
                    }
                    if !is_valid(schematic, &a, &inst2.id, i2) {
                        continue;
                    }
                    let b = PortRef::new(inst2.id.clone(), i2);
                    if next.wire_between(&a, &b).is_some() {
                        continue;
                    }
                    match next.push_wire(&a, &b, ids) {
                        Ok(_) => added += 1,
                        Err(e) => log::warn!("Auto-connect skipped {a} -> {b}: {e}"),
                    }
                }
            }
        }
    }

    log::debug!("Auto-connect added {added} wires");
    (next, added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SequentialIds;
    use schemix_eda::vhdl::synthesize_symbol;
    use schemix_eda::{PortMode, PortSpec, Symbol, SymbolLibrary, PIN_INPUT, PIN_OUTPUT};

    fn place(sch: &Schematic, symbol: &Symbol, ids: &mut SequentialIds) -> (Schematic, String) {
        sch.add_instance(symbol, Position::default(), ids)
    }

    fn bidir_symbol() -> Symbol {
        synthesize_symbol(
            "tri",
            &[
                PortSpec::new("io", PortMode::InOut, 1),
                PortSpec::new("en", PortMode::In, 1),
            ],
        )
    }

    #[test]
    fn test_rules_in_order() {
        let library = SymbolLibrary::with_builtins();
        let mut ids = SequentialIds::new();
        let (sch, mux) = place(&Schematic::new(), library.get("2x8mux").unwrap(), &mut ids);
        let (sch, inp) = place(&sch, library.get(PIN_INPUT).unwrap(), &mut ids);
        let (sch, out) = place(&sch, library.get(PIN_OUTPUT).unwrap(), &mut ids);
        let (sch, mux2) = place(&sch, library.get("2x8mux").unwrap(), &mut ids);

        let sel = PortRef::new(&mux, 0);
        assert_eq!(check(&sch, &sel, &mux, 3), Err(Rejection::SelfConnection));
        assert_eq!(
            check(&sch, &sel, "ghost", 0),
            Err(Rejection::UnknownInstance("ghost".to_string()))
        );
        assert_eq!(
            check(&sch, &PortRef::new(&inp, 0), &out, 0),
            Err(Rejection::PinToPin)
        );
        assert_eq!(
            check(&sch, &sel, &mux2, 9),
            Err(Rejection::UnknownPort(PortRef::new(&mux2, 9)))
        );
        assert_eq!(
            check(&sch, &sel, &mux2, 3),
            Err(Rejection::WidthMismatch {
                source_width: 1,
                target_width: 8
            })
        );
        // SEL to SEL: both inputs
        assert_eq!(
            check(&sch, &sel, &mux2, 0),
            Err(Rejection::Directions(PortDirection::Input, PortDirection::Input))
        );

        // Input pin drives SEL, in either order.
        assert!(is_valid(&sch, &PortRef::new(&inp, 0), &mux, 0));
        assert!(is_valid(&sch, &sel, &inp, 0));
    }

    #[test]
    fn test_pin_direction_rules() {
        let mut ids = SequentialIds::new();
        let library = SymbolLibrary::with_builtins();
        let tri = bidir_symbol();
        let (sch, t) = place(&Schematic::new(), &tri, &mut ids);
        let (sch, inp) = place(&sch, library.get(PIN_INPUT).unwrap(), &mut ids);
        let (sch, out) = place(&sch, library.get(PIN_OUTPUT).unwrap(), &mut ids);

        // en is an input: an output pin may not take it.
        // Inputs are laid out first: en is port 0.
        let en = PortRef::new(&t, 0);
        assert_eq!(check(&sch, &en, &out, 0), Err(Rejection::OutputPinToInput));
        assert!(is_valid(&sch, &en, &inp, 0));

        // Bidirectional ports accept both pins.
        let io = PortRef::new(&t, 1);
        assert!(is_valid(&sch, &io, &inp, 0));
        assert!(is_valid(&sch, &io, &out, 0));
    }

    #[test]
    fn test_compatible_ports_labels() {
        let library = SymbolLibrary::with_builtins();
        let mut ids = SequentialIds::new();
        let (sch, a) = place(&Schematic::new(), library.get("2x8mux").unwrap(), &mut ids);
        let (sch, _) = place(&sch, library.get("2x8mux").unwrap(), &mut ids);

        let labels: Vec<_> = compatible_ports(&sch, &PortRef::new(&a, 3))
            .into_iter()
            .map(|c| c.label)
            .collect();
        assert_eq!(labels, ["2x8mux_2: A", "2x8mux_2: B"]);
    }

    #[test]
    fn test_auto_connect_by_name_and_width() {
        let mut ids = SequentialIds::new();
        let producer = synthesize_symbol(
            "producer",
            &[
                PortSpec::new("DATA", PortMode::Out, 8),
                PortSpec::new("valid", PortMode::Out, 1),
                PortSpec::new("clk", PortMode::Out, 1),
            ],
        );
        let consumer = synthesize_symbol(
            "consumer",
            &[
                PortSpec::new("data", PortMode::In, 8),
                PortSpec::new("Valid", PortMode::In, 1),
                PortSpec::new("clk", PortMode::In, 4),
            ],
        );
        let (sch, p) = place(&Schematic::new(), &producer, &mut ids);
        let (sch, c) = place(&sch, &consumer, &mut ids);

        let (next, added) = auto_connect(&sch, &mut ids);
        // clk widths differ; each pair is wired once, not once per direction
        assert_eq!(added, 2);
        assert!(next.wire_between(&PortRef::new(&p, 0), &PortRef::new(&c, 0)).is_some());
        assert!(next.wire_between(&PortRef::new(&p, 1), &PortRef::new(&c, 1)).is_some());
        assert_eq!(next.wires[0].width, 8);

        let (again, added) = auto_connect(&next, &mut ids);
        assert_eq!(added, 0);
        assert_eq!(again, next);
    }
}
