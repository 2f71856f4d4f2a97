//! Diff strategies: pure old-vs-new comparison per value shape.
//!
//! The strategy set is a closed enum resolved by pattern match; there is
//! no lookup by type-name string. Each strategy returns `None` for
//! "unchanged" or the minimal representable delta.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The value shapes a diff strategy understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiffKind {
    /// Single JSON scalar, compared with type-aware equality.
    Scalar,
    /// Composite style record: class token plus declarations.
    StyleRecord,
    /// String-keyed map of JSON values.
    KeyValueMap,
}

/// Captured value of one observed property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// The property is unset on the component.
    Absent,
    /// A scalar value.
    Scalar(Value),
    /// A style record.
    Style(StyleRecord),
    /// A key-value map.
    Map(IndexMap<String, Value>),
}

impl PropertyValue {
    /// Scalar view: `Absent` reads as JSON null, composite shapes read
    /// as their JSON encoding so a shape change always registers.
    fn as_scalar(&self) -> Value {
        match self {
            PropertyValue::Absent => Value::Null,
            PropertyValue::Scalar(value) => value.clone(),
            PropertyValue::Style(style) => serde_json::to_value(style).unwrap_or(Value::Null),
            PropertyValue::Map(map) => serde_json::to_value(map).unwrap_or(Value::Null),
        }
    }
}

impl From<Value> for PropertyValue {
    fn from(value: Value) -> Self {
        PropertyValue::Scalar(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Scalar(Value::Bool(value))
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Scalar(Value::String(value.to_owned()))
    }
}

impl From<StyleRecord> for PropertyValue {
    fn from(style: StyleRecord) -> Self {
        PropertyValue::Style(style)
    }
}

impl From<IndexMap<String, Value>> for PropertyValue {
    fn from(map: IndexMap<String, Value>) -> Self {
        PropertyValue::Map(map)
    }
}

/// Composite style value: an optional class token, structured
/// declarations, and an optional raw `name: value; ...` string merged
/// in at comparison time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleRecord {
    /// CSS class token.
    pub css_class: Option<String>,
    /// Structured style declarations.
    pub declarations: IndexMap<String, String>,
    /// Raw declaration string, merged over `declarations`.
    pub custom: Option<String>,
}

impl StyleRecord {
    /// Record carrying only a class token.
    pub fn with_class(css_class: impl Into<String>) -> Self {
        StyleRecord {
            css_class: Some(css_class.into()),
            ..StyleRecord::default()
        }
    }

    /// Parse a raw `name: value; name: value` declaration string.
    /// Entries without a value or with an empty name are dropped.
    #[must_use]
    pub fn parse_declarations(raw: &str) -> IndexMap<String, String> {
        let mut declarations = IndexMap::new();
        for piece in raw.split(';') {
            let Some((name, value)) = piece.split_once(':') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            declarations.insert(name.to_owned(), value.trim().to_owned());
        }
        declarations
    }

    /// Structured declarations with the raw custom string merged over
    /// them; later sources win on key collision.
    #[must_use]
    pub fn combined_declarations(&self) -> IndexMap<String, String> {
        let mut combined = self.declarations.clone();
        if let Some(custom) = &self.custom {
            for (name, value) in Self::parse_declarations(custom) {
                combined.insert(name, value);
            }
        }
        combined
    }

    fn class_token(&self) -> Option<&str> {
        self.css_class.as_deref().filter(|class| !class.is_empty())
    }
}

/// Minimal delta produced by a strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Delta {
    /// The new scalar value.
    Scalar(Value),
    /// Changed style facets; at least one side is present.
    Style {
        /// New class token, when it materialized or changed.
        css_class: Option<String>,
        /// Declarations whose value is new or differs.
        declarations: Option<IndexMap<String, String>>,
    },
    /// Map entries that are new or whose value differs.
    ///
    /// Entries removed from the new map are not expressible through
    /// this strategy; see [`map_diff`].
    Map(IndexMap<String, Value>),
}

/// Compare `old` and `new` under the strategy for `kind`.
///
/// `None` means unchanged and must suppress the client action.
#[must_use]
pub fn diff(kind: DiffKind, old: &PropertyValue, new: &PropertyValue) -> Option<Delta> {
    match kind {
        DiffKind::Scalar => scalar_diff(old, new),
        DiffKind::StyleRecord => style_diff(old, new),
        DiffKind::KeyValueMap => map_diff(old, new),
    }
}

/// Scalar strategy: the delta is the new value whenever old and new are
/// not equal. JSON equality is type-aware, so `false` and `""` differ
/// even though they are loosely equal in a browser.
fn scalar_diff(old: &PropertyValue, new: &PropertyValue) -> Option<Delta> {
    let old = old.as_scalar();
    let new = new.as_scalar();
    if old == new {
        None
    } else {
        Some(Delta::Scalar(new))
    }
}

/// Style strategy: a class sub-delta (token materialized or changed)
/// plus a declaration sub-delta over the merged declarations. Unchanged
/// when both sub-deltas are empty or when there is no new style at all.
fn style_diff(old: &PropertyValue, new: &PropertyValue) -> Option<Delta> {
    let new_style = match new {
        PropertyValue::Style(style) => style,
        _ => return None,
    };
    let old_style = match old {
        PropertyValue::Style(style) => Some(style),
        _ => None,
    };

    let css_class = match old_style {
        None => new_style.class_token().map(str::to_owned),
        Some(old_style) => (old_style.css_class != new_style.css_class)
            .then(|| new_style.css_class.clone().unwrap_or_default()),
    };

    let old_declarations = old_style
        .map(StyleRecord::combined_declarations)
        .unwrap_or_default();
    let changed: IndexMap<String, String> = new_style
        .combined_declarations()
        .into_iter()
        .filter(|(name, value)| old_declarations.get(name) != Some(value))
        .collect();
    let declarations = (!changed.is_empty()).then_some(changed);

    if css_class.is_none() && declarations.is_none() {
        None
    } else {
        Some(Delta::Style {
            css_class,
            declarations,
        })
    }
}

/// Key-value-map strategy: with no prior map the delta is the whole new
/// map; otherwise only entries that are new or whose value differs.
///
/// Removed keys never appear in the delta. That asymmetry is carried
/// over from the source behavior on purpose: this channel is only ever
/// used to add or overwrite entries, so deletion semantics are
/// intentionally not invented here.
fn map_diff(old: &PropertyValue, new: &PropertyValue) -> Option<Delta> {
    let new_map = match new {
        PropertyValue::Map(map) => map,
        _ => return None,
    };
    let old_map = match old {
        PropertyValue::Map(map) => Some(map),
        _ => None,
    };

    let changed: IndexMap<String, Value> = match old_map {
        None => new_map.clone(),
        Some(old_map) => new_map
            .iter()
            .filter(|(name, value)| old_map.get(*name) != Some(*value))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect(),
    };
    (!changed.is_empty()).then_some(Delta::Map(changed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn map(entries: &[(&str, Value)]) -> IndexMap<String, Value> {
        entries
            .iter()
            .map(|(name, value)| ((*name).to_owned(), value.clone()))
            .collect()
    }

    #[test]
    fn equal_scalars_are_unchanged() {
        let old = PropertyValue::from(json!(42));
        let new = PropertyValue::from(json!(42));
        assert_eq!(diff(DiffKind::Scalar, &old, &new), None);
    }

    #[test]
    fn type_change_counts_as_changed_even_when_loosely_equal() {
        let old = PropertyValue::from(false);
        let new = PropertyValue::from("");
        assert_eq!(
            diff(DiffKind::Scalar, &old, &new),
            Some(Delta::Scalar(json!("")))
        );
    }

    #[test]
    fn absent_reads_as_null_for_scalars() {
        let old = PropertyValue::Absent;
        let new = PropertyValue::from(Value::Null);
        assert_eq!(diff(DiffKind::Scalar, &old, &new), None);
    }

    #[test]
    fn style_class_materializing_is_reported() {
        let old = PropertyValue::Absent;
        let new = PropertyValue::from(StyleRecord::with_class("highlight"));
        assert_eq!(
            diff(DiffKind::StyleRecord, &old, &new),
            Some(Delta::Style {
                css_class: Some("highlight".into()),
                declarations: None,
            })
        );
    }

    #[test]
    fn style_declaration_change_is_minimal() {
        let old = PropertyValue::from(StyleRecord {
            declarations: StyleRecord::parse_declarations("color: red; width: 10px"),
            ..StyleRecord::default()
        });
        let new = PropertyValue::from(StyleRecord {
            declarations: StyleRecord::parse_declarations("color: blue; width: 10px"),
            ..StyleRecord::default()
        });
        assert_eq!(
            diff(DiffKind::StyleRecord, &old, &new),
            Some(Delta::Style {
                css_class: None,
                declarations: Some(StyleRecord::parse_declarations("color: blue")),
            })
        );
    }

    #[test]
    fn custom_string_merges_over_structured_declarations() {
        let style = StyleRecord {
            declarations: StyleRecord::parse_declarations("color: red"),
            custom: Some("color: green; border: none".into()),
            ..StyleRecord::default()
        };
        let combined = style.combined_declarations();
        assert_eq!(combined.get("color"), Some(&"green".to_owned()));
        assert_eq!(combined.get("border"), Some(&"none".to_owned()));
    }

    #[test]
    fn identical_styles_are_unchanged() {
        let style = PropertyValue::from(StyleRecord {
            css_class: Some("card".into()),
            declarations: StyleRecord::parse_declarations("margin: 0"),
            custom: None,
        });
        assert_eq!(diff(DiffKind::StyleRecord, &style, &style.clone()), None);
    }

    #[test]
    fn no_new_style_is_unchanged() {
        let old = PropertyValue::from(StyleRecord::with_class("card"));
        assert_eq!(diff(DiffKind::StyleRecord, &old, &PropertyValue::Absent), None);
    }

    #[test]
    fn map_without_prior_value_reports_the_whole_new_map() {
        let new = PropertyValue::from(map(&[("role", json!("button")), ("rel", json!("next"))]));
        assert_eq!(
            diff(DiffKind::KeyValueMap, &PropertyValue::Absent, &new),
            Some(Delta::Map(map(&[
                ("role", json!("button")),
                ("rel", json!("next")),
            ])))
        );
    }

    #[test]
    fn map_delta_carries_only_new_and_changed_entries() {
        let old = PropertyValue::from(map(&[("role", json!("button")), ("rel", json!("next"))]));
        let new = PropertyValue::from(map(&[
            ("role", json!("link")),
            ("rel", json!("next")),
            ("target", json!("_blank")),
        ]));
        assert_eq!(
            diff(DiffKind::KeyValueMap, &old, &new),
            Some(Delta::Map(map(&[
                ("role", json!("link")),
                ("target", json!("_blank")),
            ])))
        );
    }

    #[test]
    fn removed_map_keys_never_appear_in_the_delta() {
        // Intentional asymmetry: deletion is not expressible.
        let old = PropertyValue::from(map(&[("role", json!("button")), ("rel", json!("next"))]));
        let new = PropertyValue::from(map(&[("role", json!("button"))]));
        assert_eq!(diff(DiffKind::KeyValueMap, &old, &new), None);

        let new_with_change =
            PropertyValue::from(map(&[("role", json!("link"))]));
        assert_eq!(
            diff(DiffKind::KeyValueMap, &old, &new_with_change),
            Some(Delta::Map(map(&[("role", json!("link"))])))
        );
    }

    fn scalar_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[a-z]{0,8}".prop_map(Value::from),
        ]
    }

    proptest! {
        // Property: equal captures never produce a delta, unequal ones
        // always carry the new value.
        #[test]
        fn scalar_diff_is_exact(old in scalar_value(), new in scalar_value()) {
            let result = diff(
                DiffKind::Scalar,
                &PropertyValue::Scalar(old.clone()),
                &PropertyValue::Scalar(new.clone()),
            );
            if old == new {
                prop_assert_eq!(result, None);
            } else {
                prop_assert_eq!(result, Some(Delta::Scalar(new)));
            }
        }

        // Property: a map delta never mentions a key absent from the
        // new map, and every reported entry equals the new value.
        #[test]
        fn map_delta_is_a_subset_of_the_new_map(
            old in proptest::collection::btree_map("[a-c]", 0u8..4, 0..4),
            new in proptest::collection::btree_map("[a-c]", 0u8..4, 0..4),
        ) {
            let old: IndexMap<String, Value> =
                old.into_iter().map(|(k, v)| (k, json!(v))).collect();
            let new: IndexMap<String, Value> =
                new.into_iter().map(|(k, v)| (k, json!(v))).collect();
            let result = diff(
                DiffKind::KeyValueMap,
                &PropertyValue::Map(old),
                &PropertyValue::Map(new.clone()),
            );
            if let Some(Delta::Map(delta)) = result {
                for (key, value) in &delta {
                    prop_assert_eq!(new.get(key), Some(value));
                }
            }
        }
    }
}
