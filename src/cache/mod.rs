//! Widget cache metadata.
//!
//! The host's cache store is keyed by [`WidgetCacheKey`] and tagged with
//! [`CacheTags`]:
//!
//! ```
//! use serde_json::json;
//! use widgetry::{CacheTags, WidgetCacheKey};
//!
//! let params = json!({"page": 2, "category": "news"});
//! let key = WidgetCacheKey::derive(&params).unwrap();
//! assert_eq!(key.as_str(), r#"widgets.{"category":"news","page":2}"#);
//!
//! let tags = CacheTags::from_user_tags(["news"]);
//! assert_eq!(tags.as_slice(), ["widgets", "news"]);
//! ```

mod keys;
mod tags;

pub use keys::{KEY_PREFIX, WidgetCacheKey};
pub use tags::{BUILTIN_TAG, CacheTags};
