//! Callback error types.

use arbor_wire::WireError;
use thiserror::Error;

use crate::tree::ComponentId;

/// Fault raised by an event handler or a render call.
///
/// This is the unexpected-failure channel only; redirects and other
/// control-flow short-circuits are recorded on the request context, not
/// raised as faults.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct HandlerFault {
    /// Human-readable description of the fault.
    pub message: String,
    /// Originating location, when the handler can name one.
    pub location: Option<String>,
}

impl HandlerFault {
    /// Fault with a message only.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    /// Fault with a message and an originating location.
    pub fn at(message: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: Some(location.into()),
        }
    }
}

/// Errors produced while processing one callback request.
#[derive(Debug, Error)]
pub enum CallbackError {
    /// No component matches the request's target id.
    #[error("no component matches callback target `{target}`")]
    UnresolvedTarget {
        /// The unresolvable target id (possibly empty).
        target: String,
    },

    /// The resolved component cannot handle callback events.
    #[error("component `{target}` does not handle callback events")]
    UnsupportedTarget {
        /// Id of the resolved component.
        target: String,
    },

    /// The event handler raised an unhandled fault.
    #[error("callback handler fault: {0}")]
    Handler(#[from] HandlerFault),

    /// Rendering triggered during the request faulted.
    #[error("render fault in `{target}`: {source}")]
    Render {
        /// Component whose render faulted.
        target: ComponentId,
        /// The underlying fault.
        source: HandlerFault,
    },

    /// Framing the response itself failed.
    #[error("response assembly fault: {0}")]
    Assembly(#[from] WireError),
}

impl CallbackError {
    /// Stable machine-readable code for the fault channel.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            CallbackError::UnresolvedTarget { .. } => "unresolved-target",
            CallbackError::UnsupportedTarget { .. } => "unsupported-target",
            CallbackError::Handler(_) => "handler-fault",
            CallbackError::Render { .. } => "render-fault",
            CallbackError::Assembly(_) => "assembly-fault",
        }
    }

    /// Originating location, when the underlying fault carries one.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        match self {
            CallbackError::Handler(fault) | CallbackError::Render { source: fault, .. } => {
                fault.location.as_deref()
            }
            _ => None,
        }
    }
}
