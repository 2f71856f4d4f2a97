//! The seam to the excluded component-tree layer.
//!
//! The dispatcher never holds component objects; it drives the tree
//! through this trait by stable component id. That keeps ownership with
//! the tree layer and keeps this subsystem free of any assumption about
//! how components are stored.

use std::fmt;

use arbor_wire::PartWriter;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::RequestContext;
use crate::diff::PropertyValue;
use crate::error::HandlerFault;
use crate::tracker::ObservedProperty;

/// Stable identity of a component within the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(String);

impl ComponentId {
    /// Id from any string-ish value.
    pub fn new(id: impl Into<String>) -> Self {
        ComponentId(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty id, which can never resolve.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(id: &str) -> Self {
        ComponentId::new(id)
    }
}

/// Capabilities the component-tree layer provides to the dispatcher.
///
/// One implementation serves one page's tree for one request. All
/// methods are synchronous; the tree must not suspend.
pub trait ComponentTree {
    /// True if a component with this id exists in the tree.
    fn contains(&self, id: &ComponentId) -> bool;

    /// True if the component can handle callback events.
    fn supports_callback(&self, id: &ComponentId) -> bool;

    /// Capability flag gating the diff pass for this component.
    fn observably_updatable(&self, id: &ComponentId) -> bool;

    /// Whether the component wants the updated persistent-state token
    /// emitted on the state channel. Defaults to off.
    fn state_update_enabled(&self, id: &ComponentId) -> bool {
        let _ = id;
        false
    }

    /// Observed property declarations for the component's kind.
    fn observed_properties(&self, id: &ComponentId) -> Vec<ObservedProperty>;

    /// Current value of one observed property.
    fn capture_property(&self, id: &ComponentId, name: &str) -> PropertyValue;

    /// Run the component's callback event handler.
    ///
    /// The handler may queue client actions, request renders, set
    /// response data, or request a redirect through `ctx`.
    fn raise_callback(
        &mut self,
        id: &ComponentId,
        parameter: &Value,
        ctx: &mut RequestContext,
    ) -> Result<(), HandlerFault>;

    /// Produce the component's markup into the writer.
    fn render(&mut self, id: &ComponentId, writer: &mut PartWriter) -> Result<(), HandlerFault>;
}
