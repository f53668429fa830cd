//! Stack frame bookkeeping and label allocation for codegen.

use std::collections::HashMap;

/// Per-function symbol table mapping variable names to `%rbp`-relative
/// byte offsets. Every slot is 8 bytes wide; offsets grow downward from
/// the frame base, so the first declaration lands at `-8(%rbp)`.
pub struct Frame {
    slots: HashMap<String, i64>,
    next_offset: i64,
}

impl Frame {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
            next_offset: 0,
        }
    }

    /// Reserve a slot for `name` and return its offset. Redeclaring a name
    /// rebinds it to a fresh slot; the old slot is simply abandoned.
    pub fn declare(&mut self, name: &str) -> i64 {
        self.next_offset -= 8;
        self.slots.insert(name.to_string(), self.next_offset);
        self.next_offset
    }

    /// Offset of a previously declared name, if any.
    pub fn resolve(&self, name: &str) -> Option<i64> {
        self.slots.get(name).copied()
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

/// Monotonic label counter. Explicit state rather than a module-level
/// counter, so independent generation runs cannot collide.
pub struct LabelAllocator {
    next: usize,
}

impl LabelAllocator {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Mint a fresh local label, `.L0`, `.L1`, ...
    pub fn fresh(&mut self) -> String {
        let label = format!(".L{}", self.next);
        self.next += 1;
        label
    }
}

impl Default for LabelAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declarations_get_distinct_descending_offsets() {
        let mut frame = Frame::new();
        assert_eq!(frame.declare("a"), -8);
        assert_eq!(frame.declare("b"), -16);
        assert_eq!(frame.resolve("a"), Some(-8));
        assert_eq!(frame.resolve("b"), Some(-16));
    }

    #[test]
    fn unknown_names_do_not_resolve() {
        let frame = Frame::new();
        assert_eq!(frame.resolve("ghost"), None);
    }

    #[test]
    fn redeclaration_rebinds_to_a_fresh_slot() {
        let mut frame = Frame::new();
        frame.declare("x");
        assert_eq!(frame.declare("x"), -16);
        assert_eq!(frame.resolve("x"), Some(-16));
    }

    #[test]
    fn labels_never_repeat() {
        let mut labels = LabelAllocator::new();
        assert_eq!(labels.fresh(), ".L0");
        assert_eq!(labels.fresh(), ".L1");
        assert_eq!(labels.fresh(), ".L2");
    }
}
