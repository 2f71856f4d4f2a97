//! Wire-level error type.

use thiserror::Error;

/// Errors raised while framing or parsing a multiplexed response body.
#[derive(Debug, Error)]
pub enum WireError {
    /// A segment's opening marker has no matching closing marker.
    #[error("segment `{token}` is missing its closing marker")]
    UnterminatedSegment {
        /// Token of the unterminated segment.
        token: String,
    },

    /// The same token delimits more than one segment in the body.
    #[error("token `{token}` delimits more than one segment")]
    DuplicateBoundary {
        /// The repeated token.
        token: String,
    },

    /// A channel was written twice into the same envelope.
    #[error("channel `{channel}` was already written")]
    ChannelAlreadySet {
        /// Reserved name of the channel.
        channel: &'static str,
    },

    /// The action channel does not decode to `[function, args]` pairs.
    #[error("malformed action list: {reason}")]
    MalformedActionList {
        /// What the decoder found instead.
        reason: String,
    },

    /// An action argument references a boundary absent from the body.
    #[error("action references boundary `{token}` absent from the body")]
    UnknownBoundary {
        /// The dangling boundary token.
        token: String,
    },

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
