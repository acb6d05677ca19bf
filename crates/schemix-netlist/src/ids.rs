use uuid::Uuid;

/// Source of instance and wire ids.
pub trait IdSource {
    /// A new id starting with `prefix`.
    fn next_id(&mut self, prefix: &str) -> String;
}

/// Deterministic ids: `inst_1`, `inst_2`, `w_3`, ...
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next += 1;
        format!("{prefix}_{}", self.next)
    }
}

/// Random v4 UUID ids, for documents edited across sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn next_id(&mut self, prefix: &str) -> String {
        format!("{prefix}_{}", Uuid::new_v4())
    }
}
