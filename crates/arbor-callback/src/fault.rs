//! Fault channel payloads.
//!
//! A fault replaces the entire normal payload: the response carries a
//! single fault-channel segment and nothing the client would act on.
//! How much detail that segment carries depends on the dispatch mode.

use serde::{Deserialize, Serialize};

use crate::dispatch::DispatchMode;
use crate::error::CallbackError;

/// Structured payload framed on the fault channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultPayload {
    /// HTTP-style status code, 500 for all fault kinds.
    pub code: u16,
    /// Stable machine-readable fault kind.
    pub kind: String,
    /// Human-readable message; generic in production mode.
    pub message: String,
    /// Originating location, debug mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Error chain, outermost first, debug mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<String>>,
}

impl FaultPayload {
    /// Build the payload for `error` under the given reporting mode.
    ///
    /// Debug mode carries the full diagnostic detail to the client. In
    /// production the client only learns that the callback failed; the
    /// detail goes to the server log instead.
    #[must_use]
    pub fn from_error(error: &CallbackError, mode: DispatchMode) -> Self {
        match mode {
            DispatchMode::Debug => Self {
                code: 500,
                kind: error.code().to_owned(),
                message: error.to_string(),
                location: error.location().map(str::to_owned),
                trace: Some(error_chain(error)),
            },
            DispatchMode::Production => {
                tracing::error!(kind = error.code(), error = %error, "callback fault");
                Self {
                    code: 500,
                    kind: error.code().to_owned(),
                    message: "callback processing failed".to_owned(),
                    location: None,
                    trace: None,
                }
            }
        }
    }

    /// Serialize for the fault channel. Falls back to a hand-written
    /// minimal JSON object so a fault body can always be framed.
    #[must_use]
    pub fn encode(&self) -> String {
        match serde_json::to_string(self) {
            Ok(encoded) => encoded,
            Err(_) => format!("{{\"code\":500,\"kind\":\"{}\"}}", self.kind),
        }
    }
}

fn error_chain(error: &CallbackError) -> Vec<String> {
    let mut chain = vec![error.to_string()];
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerFault;

    #[test]
    fn debug_mode_carries_location_and_trace() {
        let error = CallbackError::Handler(HandlerFault::at("boom", "grid.on_click"));
        let payload = FaultPayload::from_error(&error, DispatchMode::Debug);
        assert_eq!(payload.code, 500);
        assert_eq!(payload.kind, "handler-fault");
        assert_eq!(payload.location.as_deref(), Some("grid.on_click"));
        let trace = payload.trace.expect("debug trace present");
        assert!(trace[0].contains("boom"));
    }

    #[test]
    fn production_mode_is_generic() {
        let error = CallbackError::UnresolvedTarget {
            target: "ghost".into(),
        };
        let payload = FaultPayload::from_error(&error, DispatchMode::Production);
        assert_eq!(payload.message, "callback processing failed");
        assert_eq!(payload.kind, "unresolved-target");
        assert!(payload.location.is_none());
        assert!(payload.trace.is_none());
        // The target id never leaks into the production payload.
        assert!(!payload.encode().contains("ghost"));
    }
}
