//! Cache key derivation.
//!
//! A widget cache key is the `widgets.` prefix followed by the canonical JSON
//! encoding of the render parameters. Object keys are written in sorted
//! order at every depth, so two parameter maps with the same entries produce
//! the same key no matter how they were built.

use std::fmt;

use metrics::counter;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::domain::{error::WidgetError, value::WidgetMap};

/// Prefix shared by every widget cache key.
pub const KEY_PREFIX: &str = "widgets.";

/// Key under which a rendered widget is stored in the host's cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetCacheKey(String);

impl WidgetCacheKey {
    /// Derive a key from any serializable parameters.
    ///
    /// Fails only when `params` has no JSON form, e.g. a map with non-string keys.
    pub fn derive<P: Serialize + ?Sized>(params: &P) -> Result<Self, WidgetError> {
        let value = serde_json::to_value(params)?;
        Ok(Self::with_encoded(canonical_json(&value)))
    }

    /// Derive a key from a parameter map.
    pub fn for_map(params: &WidgetMap) -> Self {
        let mut encoded = String::new();
        write_object(&mut encoded, params);
        Self::with_encoded(encoded)
    }

    fn with_encoded(encoded: String) -> Self {
        counter!("widgetry_cache_key_derived_total").increment(1);
        Self(format!("{KEY_PREFIX}{encoded}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Canonical parameter encoding without the prefix.
    pub fn encoded_params(&self) -> &str {
        &self.0[KEY_PREFIX.len()..]
    }

    /// Fixed-length form of the key for stores that limit key size.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.encoded_params().as_bytes());
        format!("{KEY_PREFIX}{}", hex::encode(hasher.finalize()))
    }
}

impl fmt::Display for WidgetCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for WidgetCacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<WidgetCacheKey> for String {
    fn from(key: WidgetCacheKey) -> Self {
        key.0
    }
}

// ============================================================================
// Canonical encoding
// ============================================================================

/// Compact JSON with object keys sorted at every depth.
///
/// Scalars and keys go through `Value`'s `Display`, which writes JSON into a
/// `String` without a failure path.
fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Object(map) => write_object(out, map),
        Value::Array(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn write_object(out: &mut String, map: &WidgetMap) {
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|left, right| left.0.cmp(right.0));

    out.push('{');
    for (index, (key, value)) in entries.into_iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        out.push_str(&Value::from(key.as_str()).to_string());
        out.push(':');
        write_value(out, value);
    }
    out.push('}');
}
