//! Client action queue: ordered browser-side function calls.
//!
//! Every entry is a `(function, args)` pair the browser runtime replays
//! in order once the response body has been parsed. Arguments are plain
//! JSON values, except that content-bearing actions may pass a
//! [`Boundary`] reference instead of inline markup; the client resolves
//! the reference against the framed segments of the same body.

use indexmap::IndexMap;
use serde_json::{json, Value};

use crate::boundary::Boundary;

/// Argument to a client-side function call.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionArg {
    /// Inline JSON value.
    Value(Value),
    /// Reference to a content part framed elsewhere in the same body,
    /// resolved by the client by exact boundary match.
    Part(Boundary),
}

impl ActionArg {
    fn encode(&self) -> Value {
        match self {
            ActionArg::Value(value) => value.clone(),
            ActionArg::Part(boundary) => Value::String(boundary.as_str().to_owned()),
        }
    }
}

impl From<Value> for ActionArg {
    fn from(value: Value) -> Self {
        ActionArg::Value(value)
    }
}

impl From<&str> for ActionArg {
    fn from(value: &str) -> Self {
        ActionArg::Value(Value::String(value.to_owned()))
    }
}

impl From<String> for ActionArg {
    fn from(value: String) -> Self {
        ActionArg::Value(Value::String(value))
    }
}

impl From<bool> for ActionArg {
    fn from(value: bool) -> Self {
        ActionArg::Value(Value::Bool(value))
    }
}

impl From<Boundary> for ActionArg {
    fn from(boundary: Boundary) -> Self {
        ActionArg::Part(boundary)
    }
}

/// Markup argument for content-bearing actions.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Inline HTML carried inside the action list itself.
    Inline(String),
    /// Reference to markup framed under a boundary in the same body.
    Part(Boundary),
}

impl Content {
    /// Split into the `(content, boundary)` argument pair the client
    /// replace functions expect: exactly one side is non-null.
    fn into_args(self) -> (ActionArg, ActionArg) {
        match self {
            Content::Inline(html) => (ActionArg::Value(Value::String(html)), Value::Null.into()),
            Content::Part(boundary) => (Value::Null.into(), ActionArg::Part(boundary)),
        }
    }
}

/// One client-side function call.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientAction {
    /// Browser-side function name, e.g. `Element.hide`.
    pub function: String,
    /// Ordered arguments.
    pub args: Vec<ActionArg>,
}

/// Ordered, append-only list of client function calls for one request.
///
/// The queue is request-scoped: it is flushed into the action channel
/// during assembly and discarded with the rest of the request context.
#[derive(Debug, Default)]
pub struct ActionQueue {
    actions: Vec<ClientAction>,
}

impl ActionQueue {
    /// Empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// True if nothing has been queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// The queued actions, in append order.
    #[must_use]
    pub fn actions(&self) -> &[ClientAction] {
        &self.actions
    }

    /// Append a call to an arbitrary client function.
    pub fn call_function(&mut self, function: impl Into<String>, args: Vec<ActionArg>) {
        self.actions.push(ClientAction {
            function: function.into(),
            args,
        });
    }

    /// Set the value of an input element.
    pub fn set_value(&mut self, target: &str, value: impl Into<Value>) {
        self.call_function(
            "Element.setValue",
            vec![target.into(), ActionArg::Value(value.into())],
        );
    }

    /// Check or uncheck a checkbox or radio button.
    pub fn check(&mut self, target: &str, checked: bool) {
        self.call_function("Element.check", vec![target.into(), checked.into()]);
    }

    /// Set one attribute on an element.
    pub fn set_attribute(&mut self, target: &str, name: &str, value: impl Into<Value>) {
        self.call_function(
            "Element.setAttribute",
            vec![target.into(), name.into(), ActionArg::Value(value.into())],
        );
    }

    /// Set several attributes on an element in one call.
    pub fn set_attributes(&mut self, target: &str, attributes: &IndexMap<String, Value>) {
        self.call_function(
            "Element.setAttributes",
            vec![target.into(), ActionArg::Value(json!(attributes))],
        );
    }

    /// Update an element's style: class token and/or declarations.
    pub fn set_style(
        &mut self,
        target: &str,
        css_class: Option<&str>,
        declarations: Option<&IndexMap<String, String>>,
    ) {
        self.call_function(
            "Element.setStyle",
            vec![
                target.into(),
                ActionArg::Value(json!({
                    "class": css_class,
                    "declarations": declarations,
                })),
            ],
        );
    }

    /// Set a named component property through the generic client setter.
    pub fn set_property(&mut self, target: &str, name: &str, value: impl Into<Value>) {
        self.call_function(
            "Element.setProperty",
            vec![target.into(), name.into(), ActionArg::Value(value.into())],
        );
    }

    /// Show an element.
    pub fn show(&mut self, target: &str) {
        self.call_function("Element.show", vec![target.into()]);
    }

    /// Hide an element.
    pub fn hide(&mut self, target: &str) {
        self.call_function("Element.hide", vec![target.into()]);
    }

    /// Give an element keyboard focus.
    pub fn focus(&mut self, target: &str) {
        self.call_function("Element.focus", vec![target.into()]);
    }

    /// Scroll an element into view.
    pub fn scroll_to(&mut self, target: &str) {
        self.call_function("Element.scrollTo", vec![target.into()]);
    }

    /// Replace an element's outer HTML.
    pub fn replace_content(&mut self, target: &str, content: Content) {
        self.replace(target, "replace", content);
    }

    /// Append markup inside an element.
    pub fn append_content(&mut self, target: &str, content: Content) {
        self.replace(target, "append", content);
    }

    /// Prepend markup inside an element.
    pub fn prepend_content(&mut self, target: &str, content: Content) {
        self.replace(target, "prepend", content);
    }

    /// Insert markup before an element.
    pub fn insert_content_before(&mut self, target: &str, content: Content) {
        self.replace(target, "before", content);
    }

    /// Insert markup after an element.
    pub fn insert_content_after(&mut self, target: &str, content: Content) {
        self.replace(target, "after", content);
    }

    fn replace(&mut self, target: &str, method: &str, content: Content) {
        let (inline, boundary) = content.into_args();
        self.call_function(
            "Element.replace",
            vec![target.into(), method.into(), inline, boundary],
        );
    }

    /// Evaluate a block of script on the client.
    pub fn evaluate_script(&mut self, content: Content) {
        let (inline, boundary) = content.into_args();
        self.call_function("Runtime.evaluateScript", vec![inline, boundary]);
    }

    /// Boundaries referenced by any queued action argument.
    ///
    /// Every one of these must be framed in the same response body.
    pub fn referenced_boundaries(&self) -> impl Iterator<Item = &Boundary> {
        self.actions.iter().flat_map(|action| {
            action.args.iter().filter_map(|arg| match arg {
                ActionArg::Part(boundary) => Some(boundary),
                ActionArg::Value(_) => None,
            })
        })
    }

    /// Encode the queue as the wire array: `[[function, [args...]], ...]`.
    #[must_use]
    pub fn encode(&self) -> Value {
        Value::Array(
            self.actions
                .iter()
                .map(|action| {
                    json!([
                        action.function,
                        action.args.iter().map(ActionArg::encode).collect::<Vec<_>>(),
                    ])
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::BoundaryAllocator;

    #[test]
    fn encodes_ordered_function_args_pairs() {
        let mut queue = ActionQueue::new();
        queue.hide("panel");
        queue.set_attribute("field", "title", "updated");
        let encoded = queue.encode();
        assert_eq!(
            encoded,
            json!([
                ["Element.hide", ["panel"]],
                ["Element.setAttribute", ["field", "title", "updated"]],
            ])
        );
    }

    #[test]
    fn part_reference_encodes_as_its_token() {
        let mut alloc = BoundaryAllocator::new();
        let boundary = alloc.allocate();
        let mut queue = ActionQueue::new();
        queue.replace_content("grid", Content::Part(boundary.clone()));
        assert_eq!(
            queue.encode(),
            json!([["Element.replace", ["grid", "replace", null, boundary.as_str()]]])
        );
        let referenced: Vec<_> = queue.referenced_boundaries().collect();
        assert_eq!(referenced, vec![&boundary]);
    }

    #[test]
    fn inline_content_carries_no_boundary() {
        let mut queue = ActionQueue::new();
        queue.append_content("list", Content::Inline("<li>new</li>".into()));
        assert_eq!(
            queue.encode(),
            json!([["Element.replace", ["list", "append", "<li>new</li>", null]]])
        );
        assert_eq!(queue.referenced_boundaries().count(), 0);
    }
}
