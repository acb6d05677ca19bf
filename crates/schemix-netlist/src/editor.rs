//! Undo history and layout bookkeeping over schematic snapshots.
//!
//! Every structural edit is committed right away and hands back a
//! [`PendingLayout`]. A layout result is applied only while its generation
//! is still the newest; any later edit, move, undo or redo makes it stale.

use crate::connectivity;
use crate::{
    IdSource, LayoutEngine, LayoutError, LayoutRequest, LayoutResponse, PortRef, PortSpec,
    Position, Schematic, SchematicError, Symbol,
};

/// A layout request issued for the snapshot committed at `generation`.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingLayout {
    pub generation: u64,
    pub request: LayoutRequest,
}

pub struct Editor {
    history: Vec<Schematic>,
    cursor: usize,
    generation: u64,
    ids: Box<dyn IdSource>,
}

impl Editor {
    pub fn new(schematic: Schematic, ids: impl IdSource + 'static) -> Self {
        Self {
            history: vec![schematic],
            cursor: 0,
            generation: 0,
            ids: Box::new(ids),
        }
    }

    pub fn current(&self) -> &Schematic {
        &self.history[self.cursor]
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.history.len()
    }

    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        self.generation += 1;
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        self.generation += 1;
        true
    }

    fn push(&mut self, next: Schematic) {
        self.history.truncate(self.cursor + 1);
        self.history.push(next);
        self.cursor += 1;
        self.generation += 1;
    }

    /// Commit a structural edit and request a layout for it.
    pub fn commit(&mut self, next: Schematic) -> PendingLayout {
        self.push(next);
        PendingLayout {
            generation: self.generation,
            request: LayoutRequest::from_schematic(self.current()),
        }
    }

    pub fn add_instance(&mut self, symbol: &Symbol, position: Position) -> (String, PendingLayout) {
        let (next, id) =
            self.history[self.cursor].add_instance(symbol, position, self.ids.as_mut());
        (id, self.commit(next))
    }

    pub fn add_glue(
        &mut self,
        name: &str,
        code: &str,
        ports: &[PortSpec],
        position: Position,
    ) -> (String, PendingLayout) {
        let (next, id) = self.history[self.cursor]
            .add_glue(name, code, ports, position, self.ids.as_mut());
        (id, self.commit(next))
    }

    pub fn remove_instance(&mut self, id: &str) -> Result<PendingLayout, SchematicError> {
        let next = self.history[self.cursor].remove_instance(id)?;
        Ok(self.commit(next))
    }

    /// Drag an instance. Moves are recorded but do not ask for a layout.
    pub fn move_instance(&mut self, id: &str, position: Position) -> Result<(), SchematicError> {
        let next = self.history[self.cursor].move_instance(id, position)?;
        self.push(next);
        Ok(())
    }

    pub fn connect(
        &mut self,
        source: &PortRef,
        target: &PortRef,
    ) -> Result<(String, PendingLayout), SchematicError> {
        let (next, id) =
            self.history[self.cursor].connect(source, target, self.ids.as_mut())?;
        Ok((id, self.commit(next)))
    }

    pub fn reconnect(
        &mut self,
        source: &PortRef,
        target: &PortRef,
    ) -> Result<(String, PendingLayout), SchematicError> {
        let (next, id) =
            self.history[self.cursor].reconnect(source, target, self.ids.as_mut())?;
        Ok((id, self.commit(next)))
    }

    pub fn remove_wire(&mut self, id: &str) -> Result<PendingLayout, SchematicError> {
        let next = self.history[self.cursor].remove_wire(id)?;
        Ok(self.commit(next))
    }

    pub fn export_to_pin(
        &mut self,
        source: &PortRef,
        pin: &Symbol,
    ) -> Result<(String, PendingLayout), SchematicError> {
        let (next, id) = self.history[self.cursor]
            .export_to_pin(source, pin, self.ids.as_mut())?;
        Ok((id, self.commit(next)))
    }

    /// Run the auto-connect sweep. Nothing is committed when no wire was
    /// added.
    pub fn auto_connect(&mut self) -> (usize, Option<PendingLayout>) {
        let (next, added) =
            connectivity::auto_connect(&self.history[self.cursor], self.ids.as_mut());
        if added == 0 {
            return (0, None);
        }
        (added, Some(self.commit(next)))
    }

    /// Apply a layout result for `generation`.
    ///
    /// Returns `Ok(false)` when the result is stale and was dropped. A
    /// failed layout leaves the current snapshot as committed.
    pub fn complete_layout(
        &mut self,
        generation: u64,
        result: Result<LayoutResponse, LayoutError>,
    ) -> Result<bool, LayoutError> {
        if generation != self.generation {
            log::debug!(
                "Dropping layout for generation {generation}, current is {}",
                self.generation
            );
            return Ok(false);
        }

        match result {
            Ok(response) => {
                let laid_out = self.current().with_layout(&response);
                self.history[self.cursor] = laid_out;
                Ok(true)
            }
            Err(e) => {
                log::warn!("Layout failed, keeping positions: {e}");
                Err(e)
            }
        }
    }

    /// Run `engine` on `pending` and apply the result.
    pub fn run_layout(
        &mut self,
        engine: &dyn LayoutEngine,
        pending: &PendingLayout,
    ) -> Result<bool, LayoutError> {
        let result = engine.layout(&pending.request);
        self.complete_layout(pending.generation, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SequentialIds;
    use schemix_eda::SymbolLibrary;

    struct Shift(f64);

    impl LayoutEngine for Shift {
        fn layout(&self, request: &LayoutRequest) -> Result<LayoutResponse, LayoutError> {
            let mut response = LayoutResponse::default();
            for (i, node) in request.nodes.iter().enumerate() {
                response
                    .positions
                    .insert(node.id.clone(), Position::new(self.0 * i as f64, 0.0));
            }
            Ok(response)
        }
    }

    struct Broken;

    impl LayoutEngine for Broken {
        fn layout(&self, _: &LayoutRequest) -> Result<LayoutResponse, LayoutError> {
            Err(LayoutError::Unavailable("offline".to_string()))
        }
    }

    fn mux() -> Symbol {
        SymbolLibrary::with_builtins().get("2x8mux").unwrap().clone()
    }

    #[test]
    fn test_undo_redo() {
        let mut editor = Editor::new(Schematic::new(), SequentialIds::new());
        let (a, _) = editor.add_instance(&mux(), Position::default());
        let (b, _) = editor.add_instance(&mux(), Position::default());
        editor
            .connect(&PortRef::new(&a, 3), &PortRef::new(&b, 1))
            .unwrap();
        assert_eq!(editor.current().wires.len(), 1);

        assert!(editor.undo());
        assert!(editor.current().wires.is_empty());
        assert!(editor.undo());
        assert!(editor.undo());
        assert!(!editor.undo());
        assert!(editor.current().instances.is_empty());

        assert!(editor.redo());
        assert_eq!(editor.current().instances.len(), 1);

        // A new edit drops the redo tail.
        editor.add_instance(&mux(), Position::default());
        assert!(!editor.can_redo());
        assert_eq!(editor.current().instances.len(), 2);
    }

    #[test]
    fn test_layout_applies_only_when_current() {
        let mut editor = Editor::new(Schematic::new(), SequentialIds::new());
        let (_, first) = editor.add_instance(&mux(), Position::default());
        let (b, second) = editor.add_instance(&mux(), Position::default());

        // The first request is stale once the second edit is committed.
        assert_eq!(editor.run_layout(&Shift(200.0), &first), Ok(false));
        assert_eq!(
            editor.current().instance(&b).unwrap().position,
            Position::default()
        );

        assert_eq!(editor.run_layout(&Shift(200.0), &second), Ok(true));
        assert_eq!(
            editor.current().instance(&b).unwrap().position,
            Position::new(200.0, 0.0)
        );
    }

    #[test]
    fn test_failed_layout_keeps_snapshot() {
        let mut editor = Editor::new(Schematic::new(), SequentialIds::new());
        let (_, pending) = editor.add_instance(&mux(), Position::new(5.0, 5.0));
        let before = editor.current().clone();

        assert!(matches!(
            editor.run_layout(&Broken, &pending),
            Err(LayoutError::Unavailable(_))
        ));
        assert_eq!(editor.current(), &before);
    }

    #[test]
    fn test_undo_invalidates_pending_layout() {
        let mut editor = Editor::new(Schematic::new(), SequentialIds::new());
        let (_, pending) = editor.add_instance(&mux(), Position::default());
        editor.undo();
        assert_eq!(editor.run_layout(&Shift(1.0), &pending), Ok(false));
    }

    #[test]
    fn test_move_records_history_without_layout() {
        let mut editor = Editor::new(Schematic::new(), SequentialIds::new());
        let (a, pending) = editor.add_instance(&mux(), Position::default());
        editor.move_instance(&a, Position::new(50.0, 60.0)).unwrap();

        assert_eq!(editor.run_layout(&Shift(1.0), &pending), Ok(false));
        assert!(editor.undo());
        assert_eq!(
            editor.current().instance(&a).unwrap().position,
            Position::default()
        );
    }

    #[test]
    fn test_auto_connect_commits_only_when_wiring() {
        let mut editor = Editor::new(Schematic::new(), SequentialIds::new());
        editor.add_instance(&mux(), Position::default());
        let generation = editor.generation();
        // Two muxes share port names, but every match is input to input
        // or output to output.
        editor.add_instance(&mux(), Position::default());
        let (added, pending) = editor.auto_connect();
        assert_eq!(added, 0);
        assert!(pending.is_none());
        assert_eq!(editor.generation(), generation + 1);
    }
}
