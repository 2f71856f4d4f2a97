//! Deferred render registry.
//!
//! A component asked to render before the tree has finished per-request
//! initialization cannot produce markup yet (its children may not exist),
//! so the render call is queued with its paired writer and replayed by
//! the dispatcher once the tree is ready. Registration order is
//! preserved; identity-keyed de-duplication makes re-registration a
//! no-op.

use std::collections::HashSet;

use arbor_wire::{Boundary, PartWriter};

use crate::tree::ComponentId;

/// Queue of `(component, writer)` pairs awaiting the tree becoming
/// render-ready.
#[derive(Debug, Default)]
pub struct DeferredRenderRegistry {
    pending: Vec<(ComponentId, PartWriter)>,
    queued: HashSet<ComponentId>,
}

impl DeferredRenderRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of components still queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// True if this component is already queued.
    #[must_use]
    pub fn is_queued(&self, id: &ComponentId) -> bool {
        self.queued.contains(id)
    }

    /// Boundary already allocated for a queued component, if any.
    #[must_use]
    pub fn boundary_for(&self, id: &ComponentId) -> Option<&Boundary> {
        self.pending
            .iter()
            .find(|(queued_id, _)| queued_id == id)
            .map(|(_, writer)| writer.boundary())
    }

    /// Queue a component with its paired writer.
    ///
    /// Returns false (and drops the writer) if the component is already
    /// queued; the first registration wins so the component renders
    /// exactly once. Callers that need the surviving writer's boundary
    /// should consult [`boundary_for`](Self::boundary_for) first.
    pub fn register(&mut self, id: ComponentId, writer: PartWriter) -> bool {
        if !self.queued.insert(id.clone()) {
            return false;
        }
        self.pending.push((id, writer));
        true
    }

    /// Remove and return all queued pairs in registration order.
    ///
    /// Draining twice in the same request yields nothing the second
    /// time, which is what makes a repeated flush harmless.
    pub fn drain(&mut self) -> Vec<(ComponentId, PartWriter)> {
        std::mem::take(&mut self.pending)
    }
}
