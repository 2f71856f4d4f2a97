//! # Arbor Wire - multiplexed callback response bodies
//!
//! This crate implements the wire-facing half of the partial-page update
//! protocol: framing rendered markup fragments and named side channels
//! into a single HTTP response body, and parsing such a body back apart.
//!
//! A response body is a flat sequence of segments. Each segment is the
//! payload wrapped by an opening and a closing sentinel marker carrying
//! the same token:
//!
//! ```text
//! <!--{token}-->payload<!--//{token}-->
//! ```
//!
//! Tokens come in two flavors:
//! - **Boundaries**: generated per rendered fragment, unique within one
//!   response ([`BoundaryAllocator`]).
//! - **Channels**: five fixed, reserved names (data, action, state,
//!   fault, redirect) the client dispatches on by name ([`Channel`]).
//!
//! Client actions are an ordered list of `[function, args]` pairs
//! ([`ActionQueue`]); an argument may reference a boundary instead of
//! carrying inline data, in which case the client resolves it against
//! the parsed body by exact token match.

pub mod action;
pub mod boundary;
pub mod envelope;
pub mod error;
pub mod writer;

pub use action::{ActionArg, ActionQueue, ClientAction, Content};
pub use boundary::{Boundary, BoundaryAllocator, Channel};
pub use envelope::{DecodedAction, Envelope, ParsedEnvelope};
pub use error::WireError;
pub use writer::{ContentPart, PartWriter};
