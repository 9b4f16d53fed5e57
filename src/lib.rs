//! Widgetry: configuration and cache metadata for embeddable page widgets.
//!
//! A widget is a small fragment of a page that a host application renders on
//! its own, optionally caches, and optionally reloads from the browser. This
//! crate owns the data side of that contract:
//!
//! - merging caller overrides onto a widget type's declared defaults,
//! - deriving the cache key and cache tags a cache store should use,
//! - describing the placeholder and container markup for async widgets.
//!
//! Rendering, the cache store itself and the reload endpoint belong to the
//! host application.

pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;

pub use cache::{BUILTIN_TAG, CacheTags, KEY_PREFIX, WidgetCacheKey};
pub use domain::{
    error::WidgetError,
    interval::Interval,
    markup::Container,
    value::WidgetMap,
    widget::{Widget, WidgetDefaults, WidgetSettings},
};
