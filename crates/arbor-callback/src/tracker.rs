//! State tracker: snapshot, diff, and action translation.
//!
//! The tracker snapshots a fixed set of observable properties of the
//! callback target before its handler runs. After the handler returns
//! (and deferred renders have flushed), it re-captures each property,
//! diffs old against new with the property's strategy, and appends one
//! client action per changed property, in declaration order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::RequestContext;
use crate::diff::{diff, Delta, DiffKind, PropertyValue};
use crate::tree::{ComponentId, ComponentTree};

/// Static declaration of one observable property: its name and the
/// strategy that diffs it. Declared per component kind, not per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedProperty {
    /// Property name.
    pub name: String,
    /// Strategy used to diff captured values.
    pub kind: DiffKind,
}

impl ObservedProperty {
    /// Declaration of `name` diffed with `kind`.
    pub fn new(name: impl Into<String>, kind: DiffKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// The default observed property set for visual components.
#[must_use]
pub fn default_observed_properties() -> Vec<ObservedProperty> {
    vec![
        ObservedProperty::new("visible", DiffKind::Scalar),
        ObservedProperty::new("enabled", DiffKind::Scalar),
        ObservedProperty::new("attributes", DiffKind::KeyValueMap),
        ObservedProperty::new("style", DiffKind::StyleRecord),
        ObservedProperty::new("tab-index", DiffKind::Scalar),
        ObservedProperty::new("tooltip", DiffKind::Scalar),
        ObservedProperty::new("access-key", DiffKind::Scalar),
    ]
}

/// Outcome of diffing one observed property. A `None` delta means
/// unchanged; the corresponding client action is suppressed.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffRecord {
    /// Name of the diffed property.
    pub property: String,
    /// The minimal delta, or `None` for unchanged.
    pub delta: Option<Delta>,
}

/// Per-request change tracker for one callback target.
#[derive(Debug)]
pub struct StateTracker {
    target: ComponentId,
    properties: Vec<ObservedProperty>,
    snapshot: IndexMap<String, PropertyValue>,
}

impl StateTracker {
    /// Arm the tracker: capture the before-handler snapshot of every
    /// observed property of `target`.
    #[must_use]
    pub fn arm(tree: &dyn ComponentTree, target: &ComponentId) -> Self {
        let properties = tree.observed_properties(target);
        let snapshot = properties
            .iter()
            .map(|property| {
                (
                    property.name.clone(),
                    tree.capture_property(target, &property.name),
                )
            })
            .collect();
        tracing::trace!(target_id = %target, properties = properties.len(), "state tracker armed");
        Self {
            target: target.clone(),
            properties,
            snapshot,
        }
    }

    /// The tracked component.
    #[must_use]
    pub fn target(&self) -> &ComponentId {
        &self.target
    }

    /// Diff every observed property against the armed snapshot, in
    /// declaration order.
    #[must_use]
    pub fn diff_all(&self, tree: &dyn ComponentTree) -> Vec<DiffRecord> {
        self.properties
            .iter()
            .map(|property| {
                let old = self
                    .snapshot
                    .get(&property.name)
                    .cloned()
                    .unwrap_or(PropertyValue::Absent);
                let new = tree.capture_property(&self.target, &property.name);
                DiffRecord {
                    property: property.name.clone(),
                    delta: diff(property.kind, &old, &new),
                }
            })
            .collect()
    }

    /// Run the diff pass and append one client action per changed
    /// property.
    ///
    /// The whole pass is suppressed, not per property, unless all four
    /// conditions hold: the component is observably updatable, the
    /// request is a partial update, the tree has finished per-request
    /// initialization, and raw client input is not currently being
    /// loaded.
    pub fn respond(&self, tree: &dyn ComponentTree, ctx: &mut RequestContext) {
        if !self.can_update(tree, ctx) {
            tracing::debug!(target_id = %self.target, "diff pass suppressed");
            return;
        }
        for record in self.diff_all(tree) {
            let Some(delta) = record.delta else {
                continue;
            };
            append_update_action(ctx, &self.target, &record.property, delta);
        }
    }

    fn can_update(&self, tree: &dyn ComponentTree, ctx: &RequestContext) -> bool {
        tree.observably_updatable(&self.target)
            && ctx.is_partial_update()
            && ctx.is_tree_ready()
            && !ctx.is_loading_client_input()
    }
}

/// Fixed mapping from property name to the browser-side update
/// function. Exactly one action is appended per changed property.
fn append_update_action(
    ctx: &mut RequestContext,
    target: &ComponentId,
    property: &str,
    delta: Delta,
) {
    let target = target.as_str();
    let actions = ctx.actions_mut();
    match (property, delta) {
        ("visible", Delta::Scalar(Value::Bool(false))) => actions.hide(target),
        ("visible", Delta::Scalar(_)) => actions.show(target),
        ("enabled", Delta::Scalar(value)) => {
            actions.set_attribute(target, "disabled", value == Value::Bool(false));
        }
        ("attributes", Delta::Map(entries)) => actions.set_attributes(target, &entries),
        ("style", Delta::Style { css_class, declarations }) => {
            actions.set_style(target, css_class.as_deref(), declarations.as_ref());
        }
        ("tab-index", Delta::Scalar(value)) => actions.set_attribute(target, "tabindex", value),
        ("tooltip", Delta::Scalar(value)) => actions.set_attribute(target, "title", value),
        ("access-key", Delta::Scalar(value)) => actions.set_attribute(target, "accesskey", value),
        // Custom observed properties go through the generic setter.
        (name, delta) => {
            let value = serde_json::to_value(&delta).unwrap_or(Value::Null);
            actions.set_property(target, name, value);
        }
    }
}
