//! Response payload assembly.
//!
//! Turns the request context into the single multiplexed body: content
//! parts first, then the data, state, and action channels; or a lone
//! redirect or fault channel for the short-circuit paths.

use std::collections::HashSet;

use arbor_wire::{Channel, Envelope, WireError};

use crate::context::RequestContext;
use crate::dispatch::DispatchMode;
use crate::error::CallbackError;
use crate::fault::FaultPayload;

/// The final assembled response for one callback request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsePayload {
    /// HTTP status: 200 normally, 500 for faults.
    pub status: u16,
    /// The multiplexed body; never empty.
    pub body: Vec<u8>,
}

impl ResponsePayload {
    /// The body as UTF-8 text (the wire format is text throughout).
    #[must_use]
    pub fn body_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Frame the normal success payload: parts, data channel, state channel
/// (when the target enables state updates), and the action channel.
pub(crate) fn assemble_success(
    ctx: &mut RequestContext,
    state_enabled: bool,
) -> Result<ResponsePayload, CallbackError> {
    let mut envelope = Envelope::new();

    let parts = ctx.take_parts();
    let framed: HashSet<String> = parts
        .iter()
        .map(|part| part.boundary.as_str().to_owned())
        .collect();
    for part in parts {
        envelope.push_part(part)?;
    }

    // Every boundary embedded in an action argument must be locatable
    // in this same body by exact token match.
    for boundary in ctx.actions().referenced_boundaries() {
        if !framed.contains(boundary.as_str()) {
            return Err(CallbackError::Assembly(WireError::UnknownBoundary {
                token: boundary.as_str().to_owned(),
            }));
        }
    }

    if let Some(data) = ctx.response_data() {
        let encoded = serde_json::to_string(data).map_err(WireError::from)?;
        envelope.set_channel(Channel::Data, encoded)?;
    }
    if state_enabled {
        if let Some(token) = ctx.state_token() {
            envelope.set_channel(Channel::State, token.to_owned())?;
        }
    }
    envelope.set_channel(Channel::Action, ctx.actions().encode().to_string())?;

    Ok(ResponsePayload {
        status: 200,
        body: envelope.render(),
    })
}

/// Frame a redirect-only payload; every other channel is suppressed.
pub(crate) fn assemble_redirect(url: &str) -> ResponsePayload {
    let mut envelope = Envelope::new();
    // A fresh envelope cannot have the channel set already.
    let _ = envelope.set_channel(Channel::Redirect, url.to_owned());
    ResponsePayload {
        status: 200,
        body: envelope.render(),
    }
}

/// Frame a fault-only payload. Infallible: assembly problems here
/// degrade to the minimal encoding rather than propagating.
pub(crate) fn assemble_fault(error: &CallbackError, mode: DispatchMode) -> ResponsePayload {
    let payload = FaultPayload::from_error(error, mode);
    let mut envelope = Envelope::new();
    let _ = envelope.set_channel(Channel::Fault, payload.encode());
    ResponsePayload {
        status: 500,
        body: envelope.render(),
    }
}
