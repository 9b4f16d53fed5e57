//! Dynamic widget values and the one-level override merge.
//!
//! Widget config and wrapper attributes are free-form string-keyed maps whose
//! values are arbitrary JSON. Overrides are merged onto defaults one level
//! deep: an object override on top of an object default is merged key by key,
//! anything else replaces the default outright.

use serde_json::{Map, Value, map::Entry};
use tracing::trace;

/// String-keyed map of arbitrary JSON values.
pub type WidgetMap = Map<String, Value>;

/// Merge `overrides` onto `defaults` in place, one level deep.
///
/// For every override key:
/// - default is an object and override is an object: the override's keys are
///   inserted into the default object, replacing existing ones;
/// - otherwise the override value replaces the default (or is added).
///
/// Objects nested below the first level are never merged, they are replaced.
pub fn merge_shallow(defaults: &mut WidgetMap, overrides: WidgetMap, target: &'static str) {
    for (key, value) in overrides {
        match defaults.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(slot) => {
                if slot.get().is_object() != value.is_object() {
                    trace!(
                        target_map = target,
                        key = %slot.key(),
                        default_kind = kind_of(slot.get()),
                        override_kind = kind_of(&value),
                        "Override replaced default with mismatched shape"
                    );
                }
                match (slot.into_mut(), value) {
                    (Value::Object(existing), Value::Object(incoming)) => existing.extend(incoming),
                    (existing, value) => *existing = value,
                }
            }
        }
    }
}

/// Insert every entry of `additions` into `base`, replacing existing keys.
///
/// Used for declaring defaults; no nested merge takes place.
pub fn extend_defaults(base: &mut WidgetMap, additions: WidgetMap) {
    base.extend(additions);
}

/// Convert a JSON value into a map, treating `null` as empty.
pub(crate) fn into_map(value: Value, target: &'static str) -> Result<WidgetMap, &'static str> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(WidgetMap::new()),
        other => {
            trace!(target_map = target, found = kind_of(&other), "Rejected non-object overrides");
            Err(kind_of(&other))
        }
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
