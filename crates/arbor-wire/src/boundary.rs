//! Boundary tokens and reserved channel names.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reserved token for the JSON response-data segment.
pub const DATA_CHANNEL: &str = "data-channel";
/// Reserved token for the encoded client action list.
pub const ACTION_CHANNEL: &str = "action-channel";
/// Reserved token for the updated persistent-state token.
pub const STATE_CHANNEL: &str = "state-channel";
/// Reserved token for the fault description.
pub const FAULT_CHANNEL: &str = "fault-channel";
/// Reserved token for a client-side redirect target.
pub const REDIRECT_CHANNEL: &str = "redirect-channel";

/// Named side-channel slot within a multiplexed response body.
///
/// The client dispatches on the channel name, never on position, so the
/// five names are fixed and must stay distinct from any generated
/// [`Boundary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Arbitrary JSON payload set by the event handler.
    Data,
    /// Ordered client action list.
    Action,
    /// Opaque persistent-state token.
    State,
    /// Fault description; mutually exclusive with `Redirect`.
    Fault,
    /// Redirect target URL; mutually exclusive with `Fault`.
    Redirect,
}

impl Channel {
    /// All channels, in their conventional emission order.
    pub const ALL: [Channel; 5] = [
        Channel::Data,
        Channel::Action,
        Channel::State,
        Channel::Fault,
        Channel::Redirect,
    ];

    /// Reserved token for this channel.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Channel::Data => DATA_CHANNEL,
            Channel::Action => ACTION_CHANNEL,
            Channel::State => STATE_CHANNEL,
            Channel::Fault => FAULT_CHANNEL,
            Channel::Redirect => REDIRECT_CHANNEL,
        }
    }

    /// Look a channel up by its reserved token.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|channel| channel.name() == name)
    }

    /// True if `token` collides with any reserved channel name.
    #[must_use]
    pub fn is_reserved(token: &str) -> bool {
        Self::from_name(token).is_some()
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Token delimiting one content segment within a response body.
///
/// Uniqueness within a single response is the only invariant; tokens
/// carry no meaning across responses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Boundary(String);

impl Boundary {
    /// The token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn from_index(index: u32) -> Self {
        Boundary(format!("part-{index:04x}"))
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hands out boundary tokens unique within one response.
///
/// One allocator lives on the request context; it never crosses
/// requests, so a plain counter is enough to satisfy the uniqueness
/// invariant.
#[derive(Debug, Default)]
pub struct BoundaryAllocator {
    next: u32,
}

impl BoundaryAllocator {
    /// Fresh allocator starting at the first token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next boundary token.
    pub fn allocate(&mut self) -> Boundary {
        let boundary = Boundary::from_index(self.next);
        self.next += 1;
        boundary
    }
}
