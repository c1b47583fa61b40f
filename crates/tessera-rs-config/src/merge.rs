//! Recursive merge helpers for layered configuration.

use crate::value::ConfigValue;
use serde_json::Value;

/// Merge overlay values into the base, recursively merging objects.
///
/// Objects merge key by key; any other pairing (scalar, array, or an object
/// meeting a non-object) replaces the base value with the overlay.
pub fn merge_values(base: &mut ConfigValue, overlay: &ConfigValue) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base_slot, overlay_value) => {
            *base_slot = overlay_value.clone();
        }
    }
}

/// Produce the merged view of a base layer and an override layer.
pub fn merged(base: &ConfigValue, overrides: &ConfigValue) -> ConfigValue {
    let mut merged = base.clone();
    merge_values(&mut merged, overrides);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn objects_merge_recursively() {
        let base = json!({"economics": {"tax": {"base_rate": 0.12, "bonus": 1.6}}});
        let overlay = json!({"economics": {"tax": {"base_rate": 0.2}, "trade": {"decay": 0.02}}});
        assert_eq!(
            merged(&base, &overlay),
            json!({
                "economics": {
                    "tax": {"base_rate": 0.2, "bonus": 1.6},
                    "trade": {"decay": 0.02}
                }
            })
        );
    }

    #[test]
    fn arrays_and_scalars_replace_wholesale() {
        let base = json!({"range": [0.3, 0.95], "level": 3, "nested": {"a": 1}});
        let overlay = json!({"range": [0.5], "level": {"min": 1}, "nested": 4});
        assert_eq!(
            merged(&base, &overlay),
            json!({"range": [0.5], "level": {"min": 1}, "nested": 4})
        );
    }

    #[test]
    fn merging_base_into_itself_is_idempotent() {
        let base = json!({
            "system": {"threading": {"thread_pool_size": 4}, "version": "1.0.0"},
            "list": [1, 2, 3],
            "flag": true
        });
        assert_eq!(merged(&base, &base), base);
    }

    #[test]
    fn empty_overlay_keeps_base() {
        let base = json!({"a": {"b": 1}});
        assert_eq!(merged(&base, &json!({})), base);
    }
}
