//! Layer overlay mechanics and the replace-vs-combine merge policy.
//!
//! Resolution stacks four layers (defaults, project file, registration
//! snapshot, runtime overrides) in that order. [`merge_value`] overlays one
//! layer onto another; [`MergePolicy`] names the top-level keys that replace
//! wholesale instead of combining, keeping the precedence rules in one
//! auditable table rather than scattered per-key branches.

use std::collections::BTreeSet;

use crate::value::{Map, Value};

/// Top-level keys exempted from recursive combination.
///
/// By default only `template_formats` is listed: a layer that declares
/// template formats supersedes lower layers entirely rather than appending
/// to them.
///
/// # Examples
///
/// ```rust
/// use strata_config::merge::MergePolicy;
///
/// let policy = MergePolicy::default().with_replace_key("plugins");
/// assert!(policy.replaces("template_formats"));
/// assert!(policy.replaces("plugins"));
/// assert!(!policy.replaces("dir"));
/// ```
#[derive(Clone, Debug)]
pub struct MergePolicy {
    replace: BTreeSet<String>,
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self {
            replace: BTreeSet::from([String::from("template_formats")]),
        }
    }
}

impl MergePolicy {
    /// A policy with no replace keys; every mapping combines recursively.
    #[must_use]
    pub const fn combine_all() -> Self {
        Self {
            replace: BTreeSet::new(),
        }
    }

    /// Add a top-level key that replaces wholesale.
    #[must_use]
    pub fn with_replace_key(mut self, key: impl Into<String>) -> Self {
        self.replace.insert(key.into());
        self
    }

    /// Whether `key` replaces rather than combines.
    #[must_use]
    pub fn replaces(&self, key: &str) -> bool {
        self.replace.contains(key)
    }
}

/// Overlay `layer` onto `target`, updating `target` in place.
///
/// Behaviour:
/// - When merging a mapping into a non-mapping target, the target is
///   initialised to an empty mapping first.
/// - Mappings are merged recursively (keys are added or overwritten, and
///   nested mappings are overlaid).
/// - Arrays, scalars, and handlers replace `target` wholesale.
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use strata_config::Value;
/// use strata_config::merge::merge_value;
///
/// let mut acc = Value::from(json!({"a": 1, "b": {"x": 1}}));
/// merge_value(&mut acc, Value::from(json!({"b": {"y": 2}, "c": 3})));
/// assert_eq!(acc, Value::from(json!({"a": 1, "b": {"x": 1, "y": 2}, "c": 3})));
///
/// // Arrays replace existing values.
/// merge_value(&mut acc, Value::from(json!({"b": [1, 2, 3]})));
/// let inner = acc.as_map().and_then(|map| map.get("b")).cloned();
/// assert_eq!(inner, Some(Value::from(json!([1, 2, 3]))));
/// ```
pub fn merge_value(target: &mut Value, layer: Value) {
    match layer {
        Value::Map(map) => merge_map(target, map),
        _ => *target = layer,
    }
}

/// Overlay the top-level entries of `layer` onto `target`, honouring the
/// policy's replace keys.
///
/// Keys the policy lists replace the existing entry wholesale even when both
/// sides are mappings; all other keys follow [`merge_value`]. Keys present
/// only in `target` survive untouched.
pub fn merge_layer(target: &mut Map, layer: Map, policy: &MergePolicy) {
    for (key, value) in layer {
        if policy.replaces(&key) {
            target.insert(key, value);
        } else {
            match target.get_mut(&key) {
                Some(existing) => merge_value(existing, value),
                None => {
                    target.insert(key, value);
                }
            }
        }
    }
}

fn merge_map(target: &mut Value, map: Map) {
    if !target.is_map() {
        *target = Value::Map(Map::new());
    }

    let Some(target_map) = target.as_map_mut() else {
        return;
    };

    for (key, value) in map {
        match target_map.get_mut(&key) {
            Some(existing) => merge_value(existing, value),
            None => {
                target_map.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn as_map(value: Value) -> Map {
        value.as_map().cloned().unwrap_or_default()
    }

    #[test]
    fn keys_only_in_lower_layer_survive() {
        let mut target = Value::from(json!({"dir": {"output": "_site"}, "path_prefix": "/"}));
        merge_value(&mut target, Value::from(json!({"path_prefix": "/blog/"})));
        assert_eq!(
            target,
            Value::from(json!({"dir": {"output": "_site"}, "path_prefix": "/blog/"}))
        );
    }

    #[test]
    fn scalars_replace_mappings() {
        let mut target = Value::from(json!({"liquid_options": {"strict": true}}));
        merge_value(&mut target, Value::from(json!({"liquid_options": "off"})));
        assert_eq!(target, Value::from(json!({"liquid_options": "off"})));
    }

    #[test]
    fn policy_keys_replace_even_when_both_sides_are_mappings() {
        let policy = MergePolicy::default().with_replace_key("engines");
        let mut target = as_map(Value::from(json!({"engines": {"md": "liquid"}})));
        let layer = as_map(Value::from(json!({"engines": {"html": "tera"}})));
        merge_layer(&mut target, layer, &policy);
        assert_eq!(
            Value::Map(target),
            Value::from(json!({"engines": {"html": "tera"}}))
        );
    }

    #[test]
    fn unlisted_keys_combine_recursively() {
        let policy = MergePolicy::default();
        let mut target = as_map(Value::from(json!({"dir": {"input": ".", "output": "_site"}})));
        let layer = as_map(Value::from(json!({"dir": {"output": "public"}})));
        merge_layer(&mut target, layer, &policy);
        assert_eq!(
            Value::Map(target),
            Value::from(json!({"dir": {"input": ".", "output": "public"}}))
        );
    }

    #[test]
    fn combine_all_starts_with_an_empty_replace_table() {
        let policy = MergePolicy::combine_all();
        assert!(!policy.replaces("template_formats"));

        let mut target = as_map(Value::from(json!({"engines": {"md": "liquid"}})));
        let layer = as_map(Value::from(json!({"engines": {"html": "tera"}})));
        merge_layer(&mut target, layer, &policy);
        assert_eq!(
            Value::Map(target),
            Value::from(json!({"engines": {"md": "liquid", "html": "tera"}}))
        );
    }
}
