//! Snapshot edits. Each operation returns a new [`Schematic`] and leaves
//! `self` as it was; a rejected edit returns an error and no snapshot.

use schemix_eda::vhdl::synthesize_symbol;
use schemix_eda::{bus_label, PortMode};
use thiserror::Error;

use crate::connectivity::{self, Rejection};
use crate::{
    GlueLogic, IdSource, Instance, InstanceRole, PortRef, PortSpec, Position, Schematic, Symbol,
    Wire,
};

/// Horizontal distance from an exported port to the new pin's origin.
const INPUT_PIN_OFFSET_X: f64 = -120.0;
const OUTPUT_PIN_OFFSET_X: f64 = 40.0;
const PIN_OFFSET_Y: f64 = -20.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchematicError {
    #[error("no instance with id '{0}'")]
    UnknownInstance(String),
    #[error("no wire with id '{0}'")]
    UnknownWire(String),
    #[error("no port {0}")]
    UnknownPort(PortRef),
    #[error("cannot connect {from} to {to}: {reason}")]
    IllegalConnection {
        from: PortRef,
        to: PortRef,
        reason: Rejection,
    },
    #[error("symbol '{0}' is not a pin symbol")]
    NotAPinSymbol(String),
}

impl Schematic {
    /// Place a deep copy of `symbol`, named `<template>_<n>`.
    ///
    /// Returns the new snapshot and the new instance id.
    pub fn add_instance(
        &self,
        symbol: &Symbol,
        position: Position,
        ids: &mut dyn IdSource,
    ) -> (Schematic, String) {
        let role = InstanceRole::for_template(&symbol.name);
        self.insert_instance(symbol.clone(), role, None, position, ids)
    }

    /// Place a glue instance: a code fragment whose ports are laid out like
    /// an entity's. Inputs come first, so `ports` are reordered to stay
    /// index-aligned with the synthesized symbol.
    pub fn add_glue(
        &self,
        name: &str,
        code: impl Into<String>,
        ports: &[PortSpec],
        position: Position,
        ids: &mut dyn IdSource,
    ) -> (Schematic, String) {
        let (inputs, others): (Vec<PortSpec>, Vec<PortSpec>) =
            ports.iter().cloned().partition(|p| p.mode == PortMode::In);
        let ordered: Vec<PortSpec> = inputs.into_iter().chain(others).collect();

        let symbol = synthesize_symbol(name, &ordered);
        let glue = GlueLogic {
            code: code.into(),
            ports: ordered,
        };
        self.insert_instance(symbol, InstanceRole::Glue, Some(glue), position, ids)
    }

    fn insert_instance(
        &self,
        symbol: Symbol,
        role: InstanceRole,
        glue: Option<GlueLogic>,
        position: Position,
        ids: &mut dyn IdSource,
    ) -> (Schematic, String) {
        let mut next = self.clone();
        let id = self.fresh_id(ids, "inst");

        let count = {
            let counter = next.counters.entry(symbol.name.clone()).or_insert(0);
            *counter += 1;
            *counter
        };
        let instance_name = format!("{}_{}", symbol.name, count);
        log::debug!("Placing '{instance_name}' ({id}) at ({}, {})", position.x, position.y);

        next.instances.push(Instance {
            id: id.clone(),
            template_name: symbol.name.clone(),
            instance_name,
            position,
            role,
            symbol,
            glue,
        });
        (next, id)
    }

    /// Delete an instance together with every wire that touches it.
    pub fn remove_instance(&self, id: &str) -> Result<Schematic, SchematicError> {
        if self.instance(id).is_none() {
            return Err(SchematicError::UnknownInstance(id.to_string()));
        }

        let mut next = self.clone();
        next.instances.retain(|inst| inst.id != id);
        let before = next.wires.len();
        next.wires.retain(|w| !w.touches_instance(id));
        log::debug!(
            "Removed instance '{id}' and {} attached wires",
            before - next.wires.len()
        );
        Ok(next)
    }

    /// Move an instance. Attached wire endpoints follow and their routes are
    /// dropped.
    pub fn move_instance(&self, id: &str, position: Position) -> Result<Schematic, SchematicError> {
        let mut next = self.clone();
        let instance = next
            .instances
            .iter_mut()
            .find(|inst| inst.id == id)
            .ok_or_else(|| SchematicError::UnknownInstance(id.to_string()))?;
        instance.position = position;

        for wire in next.wires.iter_mut().filter(|w| w.touches_instance(id)) {
            wire.route = None;
        }
        next.refresh_locations();
        Ok(next)
    }

    /// Wire `source` to `target` if the connectivity rules allow it. Fan-out
    /// is allowed: existing wires on either port are kept.
    pub fn connect(
        &self,
        source: &PortRef,
        target: &PortRef,
        ids: &mut dyn IdSource,
    ) -> Result<(Schematic, String), SchematicError> {
        self.check_connection(source, target)?;
        let mut next = self.clone();
        let id = next.push_wire(source, target, ids)?;
        Ok((next, id))
    }

    /// Like [`Schematic::connect`], but first drops every wire on `source`.
    pub fn reconnect(
        &self,
        source: &PortRef,
        target: &PortRef,
        ids: &mut dyn IdSource,
    ) -> Result<(Schematic, String), SchematicError> {
        self.check_connection(source, target)?;
        let mut next = self.clone();
        next.wires.retain(|w| !w.touches(source));
        let id = next.push_wire(source, target, ids)?;
        Ok((next, id))
    }

    pub fn remove_wire(&self, id: &str) -> Result<Schematic, SchematicError> {
        if self.wire(id).is_none() {
            return Err(SchematicError::UnknownWire(id.to_string()));
        }
        let mut next = self.clone();
        next.wires.retain(|w| w.id != id);
        Ok(next)
    }

    /// Create a pin instance next to `source` and wire it up in one edit.
    ///
    /// The pin is named `<port>_pin` (suffixed when taken) and its port
    /// takes the source port's width. Returns the pin's instance id.
    pub fn export_to_pin(
        &self,
        source: &PortRef,
        pin: &Symbol,
        ids: &mut dyn IdSource,
    ) -> Result<(Schematic, String), SchematicError> {
        let role = InstanceRole::for_template(&pin.name);
        if !role.is_external_pin() {
            return Err(SchematicError::NotAPinSymbol(pin.name.clone()));
        }
        let (_, port) = self
            .resolve(source)
            .ok_or_else(|| SchematicError::UnknownPort(source.clone()))?;
        let location = self
            .connection(source)
            .map(|c| c.location)
            .unwrap_or_default();

        let mut pin_symbol = pin.clone();
        if let Some(pin_port) = pin_symbol.ports.first_mut() {
            pin_port.width = port.width;
            if let Some(label) = pin_port.texts.first_mut() {
                label.value = bus_label(&pin_port.name, port.width);
            }
        }

        let offset_x = match role {
            InstanceRole::InputPin => INPUT_PIN_OFFSET_X,
            _ => OUTPUT_PIN_OFFSET_X,
        };
        let position = Position::new(location.x + offset_x, location.y + PIN_OFFSET_Y);
        let pin_name = self.unused_instance_name(&format!("{}_pin", port.name));

        let (mut next, pin_id) = self.insert_instance(pin_symbol, role, None, position, ids);
        if let Some(instance) = next.instances.iter_mut().find(|inst| inst.id == pin_id) {
            instance.instance_name = pin_name;
        }

        let pin_port = PortRef::new(pin_id.clone(), 0);
        next.check_connection(source, &pin_port)?;
        next.push_wire(source, &pin_port, ids)?;
        Ok((next, pin_id))
    }

    fn unused_instance_name(&self, base: &str) -> String {
        if self.instance_by_name(base).is_none() {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{base}_{n}"))
            .find(|name| self.instance_by_name(name).is_none())
            .unwrap_or_else(|| base.to_string())
    }

    fn check_connection(&self, source: &PortRef, target: &PortRef) -> Result<(), SchematicError> {
        connectivity::check(self, source, &target.instance_id, target.port_index).map_err(
            |reason| SchematicError::IllegalConnection {
                from: source.clone(),
                to: target.clone(),
                reason,
            },
        )
    }

    /// Append a wire without consulting the connectivity rules.
    pub(crate) fn push_wire(
        &mut self,
        source: &PortRef,
        target: &PortRef,
        ids: &mut dyn IdSource,
    ) -> Result<String, SchematicError> {
        let start = self
            .connection(source)
            .ok_or_else(|| SchematicError::UnknownPort(source.clone()))?;
        let end = self
            .connection(target)
            .ok_or_else(|| SchematicError::UnknownPort(target.clone()))?;
        let width = self.resolve(source).map(|(_, p)| p.width).unwrap_or(1);

        let id = self.fresh_id(ids, "w");
        log::debug!("Wiring {source} -> {target} as '{id}' ({width} bits)");
        self.wires.push(Wire {
            id: id.clone(),
            start,
            end,
            route: None,
            width,
        });
        Ok(id)
    }
}
