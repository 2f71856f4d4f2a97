//! Shared mock component tree for dispatch scenario tests.

use std::collections::HashMap;

use arbor_callback::{
    default_observed_properties, ComponentId, ComponentTree, HandlerFault, ObservedProperty,
    PropertyValue, RequestContext,
};
use arbor_wire::PartWriter;
use indexmap::IndexMap;
use serde_json::Value;

/// Route dispatch logging through the test harness; safe to call from
/// every test, only the first initialization wins.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Handler installed on the mock tree for the component under test.
pub type Handler =
    fn(&mut MockTree, &ComponentId, &Value, &mut RequestContext) -> Result<(), HandlerFault>;

/// One fake component.
pub struct MockComponent {
    pub supports_callback: bool,
    pub updatable: bool,
    pub state_update_enabled: bool,
    pub properties: HashMap<String, PropertyValue>,
    pub markup: String,
}

impl Default for MockComponent {
    fn default() -> Self {
        Self {
            supports_callback: true,
            updatable: true,
            state_update_enabled: false,
            properties: HashMap::new(),
            markup: String::new(),
        }
    }
}

/// A page tree of mock components with one installable event handler.
pub struct MockTree {
    pub components: IndexMap<ComponentId, MockComponent>,
    pub handler: Handler,
    pub render_counts: HashMap<ComponentId, usize>,
}

impl MockTree {
    pub fn new() -> Self {
        Self {
            components: IndexMap::new(),
            handler: |_, _, _, _| Ok(()),
            render_counts: HashMap::new(),
        }
    }

    pub fn with_component(mut self, id: &str, component: MockComponent) -> Self {
        self.components.insert(ComponentId::new(id), component);
        self
    }

    pub fn with_handler(mut self, handler: Handler) -> Self {
        self.handler = handler;
        self
    }

    pub fn set_property(&mut self, id: &str, name: &str, value: PropertyValue) {
        if let Some(component) = self.components.get_mut(&ComponentId::new(id)) {
            component.properties.insert(name.to_owned(), value);
        }
    }

    pub fn render_count(&self, id: &str) -> usize {
        self.render_counts
            .get(&ComponentId::new(id))
            .copied()
            .unwrap_or(0)
    }
}

impl ComponentTree for MockTree {
    fn contains(&self, id: &ComponentId) -> bool {
        self.components.contains_key(id)
    }

    fn supports_callback(&self, id: &ComponentId) -> bool {
        self.components
            .get(id)
            .is_some_and(|component| component.supports_callback)
    }

    fn observably_updatable(&self, id: &ComponentId) -> bool {
        self.components
            .get(id)
            .is_some_and(|component| component.updatable)
    }

    fn state_update_enabled(&self, id: &ComponentId) -> bool {
        self.components
            .get(id)
            .is_some_and(|component| component.state_update_enabled)
    }

    fn observed_properties(&self, _id: &ComponentId) -> Vec<ObservedProperty> {
        default_observed_properties()
    }

    fn capture_property(&self, id: &ComponentId, name: &str) -> PropertyValue {
        self.components
            .get(id)
            .and_then(|component| component.properties.get(name).cloned())
            .unwrap_or(PropertyValue::Absent)
    }

    fn raise_callback(
        &mut self,
        id: &ComponentId,
        parameter: &Value,
        ctx: &mut RequestContext,
    ) -> Result<(), HandlerFault> {
        let handler = self.handler;
        handler(self, id, parameter, ctx)
    }

    fn render(&mut self, id: &ComponentId, writer: &mut PartWriter) -> Result<(), HandlerFault> {
        let markup = self
            .components
            .get(id)
            .map(|component| component.markup.clone())
            .ok_or_else(|| HandlerFault::new(format!("render of unknown component `{id}`")))?;
        *self.render_counts.entry(id.clone()).or_insert(0) += 1;
        writer.write(&markup);
        Ok(())
    }
}
