//! Request-scoped context threaded through dispatch.
//!
//! Everything mutable about one callback request lives here and dies
//! with the request: the action queue, the deferred render registry,
//! boundary allocation, rendered parts, and the redirect/data/state
//! slots. There is no ambient or process-global state anywhere in the
//! protocol; the context is passed explicitly from the dispatcher to
//! the tracker and the assembler.

use arbor_wire::{ActionQueue, Boundary, BoundaryAllocator, ContentPart, PartWriter};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::deferred::DeferredRenderRegistry;
use crate::error::CallbackError;
use crate::tree::{ComponentId, ComponentTree};

/// Inbound callback request, created once per request and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackRequest {
    /// Opaque identifier resolved against the component tree.
    pub target_id: String,
    /// JSON-decoded event parameter.
    pub parameter: Value,
}

impl CallbackRequest {
    /// Request for `target_id` carrying `parameter`.
    pub fn new(target_id: impl Into<String>, parameter: Value) -> Self {
        Self {
            target_id: target_id.into(),
            parameter,
        }
    }
}

/// Flags the excluded HTTP layer extracts from the inbound request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestFlags {
    /// True if this is a partial-update request rather than a full
    /// page load.
    pub partial_update: bool,
    /// True while raw client input is still being loaded into
    /// components; diffing is suppressed so input is not echoed back
    /// to itself.
    pub loading_client_input: bool,
}

impl RequestFlags {
    /// The flags of an ordinary partial-update request.
    #[must_use]
    pub fn partial_update() -> Self {
        Self {
            partial_update: true,
            loading_client_input: false,
        }
    }
}

/// Lifecycle phase of one request.
///
/// `Faulted` and `Redirected` are short-circuits that bypass `Diffed`;
/// `Assembled` is reached from any of the three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPhase {
    /// Nothing has happened yet.
    Idle,
    /// The state tracker has captured its snapshot.
    Armed,
    /// The target's handler has been invoked.
    Dispatched,
    /// A fault replaced the normal payload.
    Faulted,
    /// A redirect replaced the normal payload.
    Redirected,
    /// The diff pass has run.
    Diffed,
    /// The response body has been framed.
    Assembled,
}

impl DispatchPhase {
    fn can_advance_to(self, next: DispatchPhase) -> bool {
        use DispatchPhase::{Armed, Assembled, Diffed, Dispatched, Faulted, Idle, Redirected};
        matches!(
            (self, next),
            (Idle, Armed)
                | (Armed, Dispatched)
                | (Dispatched, Faulted | Redirected | Diffed)
                | (Idle | Armed | Diffed, Faulted)
                | (Diffed | Faulted | Redirected, Assembled)
        )
    }
}

/// Request-scoped state for one callback dispatch.
#[derive(Debug)]
pub struct RequestContext {
    request_id: Uuid,
    request: CallbackRequest,
    flags: RequestFlags,
    phase: DispatchPhase,
    tree_ready: bool,
    boundaries: BoundaryAllocator,
    actions: ActionQueue,
    deferred: DeferredRenderRegistry,
    parts: Vec<ContentPart>,
    redirect: Option<String>,
    response_data: Option<Value>,
    state_token: Option<String>,
}

impl RequestContext {
    /// Fresh context for one inbound request.
    #[must_use]
    pub fn new(request: CallbackRequest, flags: RequestFlags) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            request,
            flags,
            phase: DispatchPhase::Idle,
            tree_ready: false,
            boundaries: BoundaryAllocator::new(),
            actions: ActionQueue::new(),
            deferred: DeferredRenderRegistry::new(),
            parts: Vec::new(),
            redirect: None,
            response_data: None,
            state_token: None,
        }
    }

    /// Correlation id for tracing.
    #[must_use]
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// The inbound request.
    #[must_use]
    pub fn request(&self) -> &CallbackRequest {
        &self.request
    }

    /// True for partial-update requests.
    #[must_use]
    pub fn is_partial_update(&self) -> bool {
        self.flags.partial_update
    }

    /// True while raw client input is still being loaded.
    #[must_use]
    pub fn is_loading_client_input(&self) -> bool {
        self.flags.loading_client_input
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> DispatchPhase {
        self.phase
    }

    /// Advance the lifecycle state machine.
    ///
    /// An out-of-order transition is a dispatcher bug; it is logged and
    /// asserted in debug builds but tolerated in release so a response
    /// is still produced.
    pub fn advance(&mut self, next: DispatchPhase) {
        if !self.phase.can_advance_to(next) {
            tracing::warn!(
                request_id = %self.request_id,
                from = ?self.phase,
                to = ?next,
                "out-of-order dispatch phase transition"
            );
            debug_assert!(false, "dispatch phase {:?} -> {next:?}", self.phase);
        }
        self.phase = next;
    }

    /// True once per-request tree initialization has completed.
    #[must_use]
    pub fn is_tree_ready(&self) -> bool {
        self.tree_ready
    }

    /// Mark the tree render-ready. Called by the dispatcher at its
    /// fixed lifecycle point, never by handlers.
    pub fn mark_tree_ready(&mut self) {
        self.tree_ready = true;
    }

    /// The client action queue.
    #[must_use]
    pub fn actions(&self) -> &ActionQueue {
        &self.actions
    }

    /// Mutable access for handlers and the state tracker.
    pub fn actions_mut(&mut self) -> &mut ActionQueue {
        &mut self.actions
    }

    /// The deferred render registry.
    #[must_use]
    pub fn deferred(&self) -> &DeferredRenderRegistry {
        &self.deferred
    }

    /// Render-participation hook for components.
    ///
    /// Before the tree is render-ready the render is queued (duplicate
    /// requests for the same component return the already-allocated
    /// boundary); afterwards the component renders immediately. Either
    /// way the returned boundary is the token the markup is, or will
    /// be, framed under, so it can be embedded in action arguments
    /// straight away.
    pub fn render_component(
        &mut self,
        tree: &mut dyn ComponentTree,
        id: &ComponentId,
    ) -> Result<Boundary, CallbackError> {
        if !self.tree_ready {
            if let Some(boundary) = self.deferred.boundary_for(id) {
                return Ok(boundary.clone());
            }
            let writer = PartWriter::new(self.boundaries.allocate());
            let boundary = writer.boundary().clone();
            self.deferred.register(id.clone(), writer);
            return Ok(boundary);
        }
        let mut writer = PartWriter::new(self.boundaries.allocate());
        tree.render(id, &mut writer)
            .map_err(|source| CallbackError::Render {
                target: id.clone(),
                source,
            })?;
        let boundary = writer.boundary().clone();
        self.parts.push(writer.into_part());
        Ok(boundary)
    }

    /// Flush the deferred render registry: render every queued
    /// component exactly once, in registration order. A second flush in
    /// the same request finds the registry drained and does nothing.
    pub fn flush_deferred(&mut self, tree: &mut dyn ComponentTree) -> Result<(), CallbackError> {
        for (id, mut writer) in self.deferred.drain() {
            tree.render(&id, &mut writer)
                .map_err(|source| CallbackError::Render {
                    target: id.clone(),
                    source,
                })?;
            self.parts.push(writer.into_part());
        }
        Ok(())
    }

    /// Rendered content parts collected so far.
    #[must_use]
    pub fn parts(&self) -> &[ContentPart] {
        &self.parts
    }

    /// Take the rendered parts for assembly.
    pub(crate) fn take_parts(&mut self) -> Vec<ContentPart> {
        std::mem::take(&mut self.parts)
    }

    /// Request a client-side redirect. Takes precedence over normal
    /// assembly and over faults detected after this call.
    pub fn set_redirect(&mut self, url: impl Into<String>) {
        self.redirect = Some(url.into());
    }

    /// The requested redirect target, if any.
    #[must_use]
    pub fn redirect(&self) -> Option<&str> {
        self.redirect.as_deref()
    }

    /// Set the JSON payload for the data channel.
    pub fn set_response_data(&mut self, data: Value) {
        self.response_data = Some(data);
    }

    /// The data-channel payload, if any.
    #[must_use]
    pub fn response_data(&self) -> Option<&Value> {
        self.response_data.as_ref()
    }

    /// Record the updated persistent-state token produced by the
    /// excluded persistence layer.
    pub fn set_state_token(&mut self, token: impl Into<String>) {
        self.state_token = Some(token.into());
    }

    /// The opaque state token, if one was recorded.
    #[must_use]
    pub fn state_token(&self) -> Option<&str> {
        self.state_token.as_deref()
    }
}
