use crate::events::{EventItem, EventKind};

/// Request-local pending items, keyed by kind, in first-capture order.
#[derive(Debug, Default)]
pub struct RequestBuffer {
    slots: Vec<(EventKind, Vec<EventItem>)>,
}

impl RequestBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, kind: EventKind, item: EventItem) {
        match self.slots.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, items)) => items.push(item),
            None => self.slots.push((kind, vec![item])),
        }
    }

    /// Returns the pending items for `kind` and clears them.
    pub fn drain(&mut self, kind: EventKind) -> Vec<EventItem> {
        match self.slots.iter().position(|(k, _)| *k == kind) {
            Some(pos) => self.slots.remove(pos).1,
            None => Vec::new(),
        }
    }

    pub fn is_empty(&self, kind: EventKind) -> bool {
        !self
            .slots
            .iter()
            .any(|(k, items)| *k == kind && !items.is_empty())
    }

    /// Kinds with pending items, in the order their first item was captured.
    pub fn pending_kinds(&self) -> Vec<EventKind> {
        self.slots.iter().map(|(k, _)| *k).collect()
    }
}
