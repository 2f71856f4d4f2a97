//! # Arbor Callback - partial-page update dispatch
//!
//! Server-side half of the partial-page update protocol. A callback
//! request names one component of an already-rendered page; this crate
//! routes the request to that component's event handler, observes which
//! component-visible properties the handler changed, and assembles the
//! minimal update (property deltas as client actions, plus any rendered
//! markup fragments) into a single multiplexed response body.
//!
//! ## Request lifecycle
//!
//! ```text
//! CallbackRequest
//!   → Dispatcher resolves the target through the ComponentTree seam
//!   → StateTracker snapshots the target's observed properties
//!   → the target's handler runs (renders queue up as deferred parts)
//!   → redirect? short-circuit to a redirect-only body
//!   → deferred renders flush, then properties are diffed (render
//!     before diff, so rendering side effects are captured)
//!   → actions, fragments, data, and state token frame into one body
//! ```
//!
//! Faults at any stage degrade to a fault-only body; the caller always
//! receives a well-formed [`ResponsePayload`]. Everything is
//! request-scoped and synchronous: no state survives the request, and
//! nothing here is shared across concurrent requests.
//!
//! The component tree itself, widget implementations, persistence, and
//! HTTP plumbing are external collaborators reached through the
//! [`ComponentTree`] trait and the flags on [`RequestFlags`].

pub mod context;
pub mod deferred;
pub mod diff;
pub mod dispatch;
pub mod error;
pub mod fault;
pub mod response;
pub mod tracker;
pub mod tree;

pub use context::{CallbackRequest, DispatchPhase, RequestContext, RequestFlags};
pub use deferred::DeferredRenderRegistry;
pub use diff::{diff, Delta, DiffKind, PropertyValue, StyleRecord};
pub use dispatch::{DispatchMode, Dispatcher};
pub use error::{CallbackError, HandlerFault};
pub use fault::FaultPayload;
pub use response::ResponsePayload;
pub use tracker::{default_observed_properties, DiffRecord, ObservedProperty, StateTracker};
pub use tree::{ComponentId, ComponentTree};
