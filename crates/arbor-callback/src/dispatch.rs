//! Callback dispatcher: the protocol entry point.
//!
//! Routes one inbound request to its target component, supervises the
//! handler, and coordinates the deferred render registry and the state
//! tracker around the invocation. Whatever happens, the caller receives
//! a well-formed [`ResponsePayload`]; unexpected failures surface as a
//! fault-channel body, never as a transport-level error.

use crate::context::{CallbackRequest, DispatchPhase, RequestContext, RequestFlags};
use crate::error::CallbackError;
use crate::response::{assemble_fault, assemble_redirect, assemble_success, ResponsePayload};
use crate::tracker::StateTracker;
use crate::tree::{ComponentId, ComponentTree};

/// Fault reporting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// Full diagnostic detail in the fault channel.
    Debug,
    /// Generic fault indicator; detail goes to the server log.
    #[default]
    Production,
}

/// Routes callback requests through the full request lifecycle.
///
/// The dispatcher itself is stateless and reusable; everything
/// request-scoped lives on the [`RequestContext`] it creates per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dispatcher {
    mode: DispatchMode,
}

impl Dispatcher {
    /// Dispatcher with the given fault reporting mode.
    #[must_use]
    pub fn new(mode: DispatchMode) -> Self {
        Self { mode }
    }

    /// Process one callback request end to end.
    ///
    /// Always returns a well-formed payload: success, redirect, or a
    /// fault body carrying the failure.
    pub fn dispatch(
        &self,
        tree: &mut dyn ComponentTree,
        request: CallbackRequest,
        flags: RequestFlags,
    ) -> ResponsePayload {
        let mut ctx = RequestContext::new(request, flags);
        let span = tracing::debug_span!(
            "callback_dispatch",
            request_id = %ctx.request_id(),
            target = %ctx.request().target_id,
        );
        let _guard = span.enter();

        match self.run(tree, &mut ctx) {
            Ok(payload) => payload,
            Err(error) => {
                ctx.advance(DispatchPhase::Faulted);
                let payload = assemble_fault(&error, self.mode);
                ctx.advance(DispatchPhase::Assembled);
                payload
            }
        }
    }

    fn run(
        &self,
        tree: &mut dyn ComponentTree,
        ctx: &mut RequestContext,
    ) -> Result<ResponsePayload, CallbackError> {
        let target = self.resolve_target(tree, ctx)?;

        // Snapshot observed properties before the handler can touch them.
        let tracker = StateTracker::arm(tree, &target);
        ctx.advance(DispatchPhase::Armed);

        tracing::trace!("raising callback event");
        let parameter = ctx.request().parameter.clone();
        let handler_result = tree.raise_callback(&target, &parameter, ctx);
        ctx.advance(DispatchPhase::Dispatched);

        // A redirect recorded during handling wins over normal assembly
        // and over any fault detected after the redirect call.
        if let Some(url) = ctx.redirect().map(str::to_owned) {
            tracing::debug!(url = %url, "redirect short-circuit");
            ctx.advance(DispatchPhase::Redirected);
            let payload = assemble_redirect(&url);
            ctx.advance(DispatchPhase::Assembled);
            return Ok(payload);
        }
        handler_result.map_err(CallbackError::Handler)?;

        // Render before diff: deferred renders may still change
        // observed properties, and those changes must be captured.
        ctx.mark_tree_ready();
        ctx.flush_deferred(tree)?;

        tracker.respond(tree, ctx);
        ctx.advance(DispatchPhase::Diffed);

        let state_enabled = tree.state_update_enabled(&target);
        let payload = assemble_success(ctx, state_enabled)?;
        ctx.advance(DispatchPhase::Assembled);
        tracing::debug!(
            bytes = payload.body.len(),
            actions = ctx.actions().len(),
            "callback response assembled"
        );
        Ok(payload)
    }

    /// Resolve the request's target id through the tree, failing before
    /// any handler runs when the id is unknown or the component cannot
    /// handle callback events.
    fn resolve_target(
        &self,
        tree: &dyn ComponentTree,
        ctx: &RequestContext,
    ) -> Result<ComponentId, CallbackError> {
        let target_id = &ctx.request().target_id;
        let target = ComponentId::new(target_id.clone());
        if target.is_empty() || !tree.contains(&target) {
            return Err(CallbackError::UnresolvedTarget {
                target: target_id.clone(),
            });
        }
        if !tree.supports_callback(&target) {
            return Err(CallbackError::UnsupportedTarget {
                target: target_id.clone(),
            });
        }
        Ok(target)
    }
}
