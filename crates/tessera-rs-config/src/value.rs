//! Dynamic config values and typed conversions out of them.

use crate::path::ConfigPath;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A node in a config document (object, array or scalar).
pub type ConfigValue = Value;

/// Immediate children of a config object, keyed by name.
pub type ConfigSection = HashMap<String, ConfigValue>;

/// Conversion from a config leaf into a concrete Rust type.
///
/// Conversions are lenient in the same places hand-edited balance files tend
/// to be sloppy: numbers written as strings, floats where integers are
/// expected, and `0`/`1` for booleans. Anything else yields `None` and the
/// caller falls back to its default.
pub trait FromConfigValue: Sized {
    /// Convert the value, or return `None` when the types are incompatible.
    fn from_config_value(value: &ConfigValue) -> Option<Self>;
}

impl FromConfigValue for ConfigValue {
    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromConfigValue for bool {
    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        match value {
            Value::Bool(flag) => Some(*flag),
            Value::Number(number) => number.as_i64().map(|n| n != 0),
            Value::String(text) => {
                let text = text.to_ascii_lowercase();
                Some(matches!(text.as_str(), "true" | "1" | "yes" | "on"))
            }
            _ => None,
        }
    }
}

impl FromConfigValue for i64 {
    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        match value {
            Value::Number(number) => match number.as_i64() {
                Some(n) => Some(n),
                None => number
                    .as_f64()
                    .filter(|f| f.is_finite())
                    .map(|f| f.round() as i64),
            },
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}

macro_rules! narrow_int {
    ($($ty:ty),*) => {
        $(
            impl FromConfigValue for $ty {
                fn from_config_value(value: &ConfigValue) -> Option<Self> {
                    i64::from_config_value(value).and_then(|n| <$ty>::try_from(n).ok())
                }
            }
        )*
    };
}

narrow_int!(i32, u32, u64, usize);

impl FromConfigValue for f64 {
    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromConfigValue for f32 {
    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        f64::from_config_value(value).map(|f| f as f32)
    }
}

impl FromConfigValue for String {
    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        match value {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }
}

impl FromConfigValue for Vec<f64> {
    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        value
            .as_array()?
            .iter()
            .map(|element| element.as_f64())
            .collect()
    }
}

impl FromConfigValue for Vec<i64> {
    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        value
            .as_array()?
            .iter()
            .map(|element| element.as_i64())
            .collect()
    }
}

impl FromConfigValue for Vec<String> {
    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        value
            .as_array()?
            .iter()
            .map(|element| element.as_str().map(str::to_string))
            .collect()
    }
}

/// An empty config object.
pub fn empty_object() -> ConfigValue {
    Value::Object(Map::new())
}

/// Walk `path` from `root`, returning the node if every segment exists.
pub fn lookup<'a>(root: &'a ConfigValue, path: &ConfigPath) -> Option<&'a ConfigValue> {
    path.segments()
        .iter()
        .try_fold(root, |node, key| node.as_object()?.get(key))
}

/// Resolve a dotted path and convert the leaf, falling back to `default`.
pub fn lookup_or<T: FromConfigValue>(root: &ConfigValue, path: &str, default: T) -> T {
    ConfigPath::parse(path)
        .ok()
        .and_then(|path| lookup(root, &path))
        .and_then(T::from_config_value)
        .unwrap_or(default)
}

/// Immediate children of the object at `path`; empty for missing or non-object nodes.
pub fn section_of(root: &ConfigValue, path: &str) -> ConfigSection {
    ConfigPath::parse(path)
        .ok()
        .and_then(|path| lookup(root, &path))
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn converts_lenient_scalars() {
        assert_eq!(bool::from_config_value(&json!(1)), Some(true));
        assert_eq!(bool::from_config_value(&json!("Yes")), Some(true));
        assert_eq!(bool::from_config_value(&json!("off")), Some(false));
        assert_eq!(i64::from_config_value(&json!(2.6)), Some(3));
        assert_eq!(i64::from_config_value(&json!("42")), Some(42));
        assert_eq!(f64::from_config_value(&json!("0.5")), Some(0.5));
        assert_eq!(String::from_config_value(&json!(true)), Some("true".to_string()));
        assert_eq!(u32::from_config_value(&json!(-1)), None);
        assert_eq!(f64::from_config_value(&json!({"a": 1})), None);
    }

    #[test]
    fn arrays_require_uniform_elements() {
        assert_eq!(
            Vec::<f64>::from_config_value(&json!([0.3, 1])),
            Some(vec![0.3, 1.0])
        );
        assert_eq!(Vec::<f64>::from_config_value(&json!([0.3, "x"])), None);
        assert_eq!(
            Vec::<String>::from_config_value(&json!(["ui", "input"])),
            Some(vec!["ui".to_string(), "input".to_string()])
        );
    }

    #[test]
    fn lookup_walks_objects_only() {
        let root = json!({"a": {"b": {"c": 5}}, "list": [1, 2]});
        assert_eq!(lookup_or(&root, "a.b.c", 0_i64), 5);
        assert_eq!(lookup_or(&root, "a.b.missing", 7_i64), 7);
        assert_eq!(lookup_or(&root, "list.0", 9_i64), 9);
        assert_eq!(lookup_or(&root, "a..b", 3_i64), 3);
        assert_eq!(section_of(&root, "a.b").get("c"), Some(&json!(5)));
        assert!(section_of(&root, "a.b.c").is_empty());
    }
}
