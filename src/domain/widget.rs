//! Widget settings, default declaration and the widget trait.
//!
//! A concrete widget type declares its defaults as a plain value through
//! [`Widget::defaults`]. Each render request then builds a fresh
//! [`WidgetSettings`] by merging the caller's config and attribute overrides
//! onto those defaults; the result is immutable for the rest of the request.

use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheTags, WidgetCacheKey};
use crate::config::ElementSettings;

use super::{
    error::WidgetError,
    interval::Interval,
    markup::Container,
    value::{WidgetMap, extend_defaults, into_map, merge_shallow},
};

const CONFIG_TARGET: &str = "config";
const ATTRIBUTES_TARGET: &str = "attributes";

/// Resolved per-request widget state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetSettings {
    reload_timeout: Interval,
    cache_time: Interval,
    cache_tags: Vec<String>,
    encrypt_params: bool,
    config: WidgetMap,
    attributes: WidgetMap,
    title: String,
    title_class: String,
    description: String,
    hide_title: bool,
    title_element: Option<String>,
    wrapper: Option<String>,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            reload_timeout: Interval::Disabled,
            cache_time: Interval::Disabled,
            cache_tags: Vec::new(),
            encrypt_params: true,
            config: WidgetMap::new(),
            attributes: WidgetMap::new(),
            title: String::new(),
            title_class: String::new(),
            description: String::new(),
            hide_title: false,
            title_element: None,
            wrapper: None,
        }
    }
}

impl WidgetSettings {
    /// Merge caller overrides onto declared defaults.
    pub fn with_overrides(
        defaults: WidgetDefaults,
        config: WidgetMap,
        attributes: WidgetMap,
    ) -> Self {
        let mut settings = defaults.settings;
        let override_config_keys = config.len();
        let override_attribute_keys = attributes.len();

        merge_shallow(&mut settings.config, config, CONFIG_TARGET);
        merge_shallow(&mut settings.attributes, attributes, ATTRIBUTES_TARGET);

        counter!("widgetry_widget_constructed_total").increment(1);
        debug!(
            override_config_keys,
            override_attribute_keys,
            config_keys = settings.config.len(),
            attribute_keys = settings.attributes.len(),
            "Widget settings resolved"
        );

        settings
    }

    /// Merge overrides that arrive as JSON values, e.g. decoded reload parameters.
    ///
    /// `null` counts as no overrides; any other non-object is rejected.
    pub fn from_json_overrides(
        defaults: WidgetDefaults,
        config: Value,
        attributes: Value,
    ) -> Result<Self, WidgetError> {
        let config = into_map(config, CONFIG_TARGET)
            .map_err(|found| WidgetError::invalid_overrides(CONFIG_TARGET, found))?;
        let attributes = into_map(attributes, ATTRIBUTES_TARGET)
            .map_err(|found| WidgetError::invalid_overrides(ATTRIBUTES_TARGET, found))?;
        Ok(Self::with_overrides(defaults, config, attributes))
    }

    pub fn reload_timeout(&self) -> Interval {
        self.reload_timeout
    }

    pub fn cache_time(&self) -> Interval {
        self.cache_time
    }

    pub fn user_cache_tags(&self) -> &[String] {
        &self.cache_tags
    }

    pub fn encrypt_params(&self) -> bool {
        self.encrypt_params
    }

    pub fn config(&self) -> &WidgetMap {
        &self.config
    }

    /// Look up a single config entry.
    pub fn config_value(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }

    pub fn attributes(&self) -> &WidgetMap {
        &self.attributes
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn title_class(&self) -> &str {
        &self.title_class
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn hide_title(&self) -> bool {
        self.hide_title
    }

    pub fn title_element(&self) -> Option<&str> {
        self.title_element.as_deref()
    }

    pub fn wrapper(&self) -> Option<&str> {
        self.wrapper.as_deref()
    }

    pub fn resolved_title_element<'a>(&'a self, elements: &'a ElementSettings) -> &'a str {
        self.title_element
            .as_deref()
            .unwrap_or(elements.title_element.as_str())
    }

    pub fn resolved_wrapper<'a>(&'a self, elements: &'a ElementSettings) -> &'a str {
        self.wrapper.as_deref().unwrap_or(elements.wrapper.as_str())
    }

    pub fn is_cacheable(&self) -> bool {
        self.cache_time.is_enabled()
    }

    pub fn is_reloadable(&self) -> bool {
        self.reload_timeout.is_enabled()
    }

    /// Async and reloadable widgets are wrapped in a container.
    pub fn needs_container(&self, is_async: bool) -> bool {
        is_async || self.is_reloadable()
    }

    pub fn cache_key<P: Serialize + ?Sized>(
        &self,
        params: &P,
    ) -> Result<WidgetCacheKey, WidgetError> {
        WidgetCacheKey::derive(params)
    }

    pub fn cache_key_for_map(&self, params: &WidgetMap) -> WidgetCacheKey {
        WidgetCacheKey::for_map(params)
    }

    pub fn cache_tags(&self) -> CacheTags {
        CacheTags::from_user_tags(&self.cache_tags)
    }
}

/// Declared defaults of a widget type.
///
/// Built once per construction by [`Widget::defaults`]; later declarations
/// overwrite earlier ones key by key, and the caller's overrides are merged
/// on top of the final result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WidgetDefaults {
    settings: WidgetSettings,
}

impl WidgetDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add config defaults, replacing any already declared under the same keys.
    pub fn add_config_defaults(&mut self, defaults: WidgetMap) {
        extend_defaults(&mut self.settings.config, defaults);
    }

    /// Add attribute defaults, replacing any already declared under the same keys.
    pub fn add_attributes_defaults(&mut self, defaults: WidgetMap) {
        extend_defaults(&mut self.settings.attributes, defaults);
    }

    pub fn with_config_defaults(mut self, defaults: WidgetMap) -> Self {
        self.add_config_defaults(defaults);
        self
    }

    pub fn with_attributes_defaults(mut self, defaults: WidgetMap) -> Self {
        self.add_attributes_defaults(defaults);
        self
    }

    pub fn reload_timeout(mut self, seconds: Interval) -> Self {
        self.settings.reload_timeout = seconds;
        self
    }

    pub fn cache_time(mut self, minutes: Interval) -> Self {
        self.settings.cache_time = minutes;
        self
    }

    pub fn cache_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings.cache_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn encrypt_params(mut self, encrypt: bool) -> Self {
        self.settings.encrypt_params = encrypt;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.settings.title = title.into();
        self
    }

    pub fn title_class(mut self, class: impl Into<String>) -> Self {
        self.settings.title_class = class.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.settings.description = description.into();
        self
    }

    pub fn hide_title(mut self, hide: bool) -> Self {
        self.settings.hide_title = hide;
        self
    }

    pub fn title_element(mut self, element: impl Into<String>) -> Self {
        self.settings.title_element = Some(element.into());
        self
    }

    pub fn wrapper(mut self, element: impl Into<String>) -> Self {
        self.settings.wrapper = Some(element.into());
        self
    }

    pub fn config(&self) -> &WidgetMap {
        &self.settings.config
    }

    pub fn attributes(&self) -> &WidgetMap {
        &self.settings.attributes
    }

    /// Settings with no caller overrides applied.
    pub fn into_settings(self) -> WidgetSettings {
        self.settings
    }
}

/// A concrete widget type.
///
/// Implementors supply their defaults and hold the resolved settings; the
/// renderer-facing queries have default implementations that may be
/// overridden.
pub trait Widget: Sized {
    /// Name used in logs and by the host's widget lookup.
    const NAME: &'static str;

    fn defaults() -> WidgetDefaults {
        WidgetDefaults::new()
    }

    fn from_settings(settings: WidgetSettings) -> Self;

    fn settings(&self) -> &WidgetSettings;

    fn new(config: WidgetMap, attributes: WidgetMap) -> Self {
        debug!(widget = Self::NAME, "Constructing widget");
        Self::from_settings(WidgetSettings::with_overrides(
            Self::defaults(),
            config,
            attributes,
        ))
    }

    fn from_json(config: Value, attributes: Value) -> Result<Self, WidgetError> {
        debug!(widget = Self::NAME, "Constructing widget from JSON overrides");
        WidgetSettings::from_json_overrides(Self::defaults(), config, attributes)
            .map(Self::from_settings)
    }

    /// Shown while an async widget's content is loading.
    fn placeholder(&self) -> String {
        String::new()
    }

    fn container(&self) -> Container {
        Container::default()
    }

    fn cache_key<P: Serialize + ?Sized>(&self, params: &P) -> Result<WidgetCacheKey, WidgetError> {
        self.settings().cache_key(params)
    }

    fn cache_tags(&self) -> CacheTags {
        self.settings().cache_tags()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn map(value: Value) -> WidgetMap {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    struct Plain {
        settings: WidgetSettings,
    }

    impl Widget for Plain {
        const NAME: &'static str = "plain";

        fn from_settings(settings: WidgetSettings) -> Self {
            Self { settings }
        }

        fn settings(&self) -> &WidgetSettings {
            &self.settings
        }
    }

    struct RecentNews {
        settings: WidgetSettings,
    }

    impl Widget for RecentNews {
        const NAME: &'static str = "recent_news";

        fn defaults() -> WidgetDefaults {
            WidgetDefaults::new()
                .with_config_defaults(map(json!({"count": 5, "opts": {"x": 1}})))
                .with_attributes_defaults(map(json!({"class": "news", "data": {"role": "feed"}})))
                .cache_time(Interval::every(10.0))
                .cache_tags(["news"])
                .title("Recent news")
        }

        fn from_settings(settings: WidgetSettings) -> Self {
            Self { settings }
        }

        fn settings(&self) -> &WidgetSettings {
            &self.settings
        }

        fn placeholder(&self) -> String {
            "Loading news...".to_string()
        }

        fn container(&self) -> Container {
            Container::new("section", r#"class="news-container""#)
        }
    }

    #[test]
    fn base_defaults() {
        let widget = Plain::new(WidgetMap::new(), WidgetMap::new());
        let settings = widget.settings();

        assert_eq!(settings.reload_timeout(), Interval::Disabled);
        assert_eq!(settings.cache_time(), Interval::Disabled);
        assert!(settings.user_cache_tags().is_empty());
        assert!(settings.encrypt_params());
        assert!(settings.config().is_empty());
        assert!(settings.attributes().is_empty());
        assert_eq!(settings.title(), "");
        assert_eq!(settings.title_class(), "");
        assert_eq!(settings.description(), "");
        assert!(!settings.hide_title());
        assert_eq!(settings.title_element(), None);
        assert_eq!(settings.wrapper(), None);
        assert_eq!(widget.placeholder(), "");
        assert_eq!(widget.container(), Container::default());
    }

    #[test]
    fn empty_overrides_keep_declared_defaults() {
        let widget = RecentNews::new(WidgetMap::new(), WidgetMap::new());
        assert_eq!(widget.settings(), &RecentNews::defaults().into_settings());
    }

    #[test]
    fn overrides_merge_into_config_and_attributes() {
        let widget = RecentNews::new(
            map(json!({"opts": {"y": 2}, "count": 3, "extra": true})),
            map(json!({"data": {"id": "n1"}, "class": "news wide"})),
        );

        assert_eq!(
            Value::Object(widget.settings().config().clone()),
            json!({"count": 3, "opts": {"x": 1, "y": 2}, "extra": true})
        );
        assert_eq!(
            Value::Object(widget.settings().attributes().clone()),
            json!({"class": "news wide", "data": {"role": "feed", "id": "n1"}})
        );
    }

    #[test]
    fn later_default_declarations_win() {
        let mut defaults = WidgetDefaults::new();
        defaults.add_config_defaults(map(json!({"count": 1, "opts": {"x": 1}})));
        defaults.add_config_defaults(map(json!({"count": 2, "opts": {"y": 2}})));
        defaults.add_attributes_defaults(map(json!({"id": "a"})));
        defaults.add_attributes_defaults(map(json!({"id": "b"})));

        assert_eq!(Value::Object(defaults.config().clone()), json!({"count": 2, "opts": {"y": 2}}));
        assert_eq!(Value::Object(defaults.attributes().clone()), json!({"id": "b"}));

        let settings = WidgetSettings::with_overrides(
            defaults,
            map(json!({"count": 3})),
            WidgetMap::new(),
        );
        assert_eq!(settings.config_value("count"), Some(&json!(3)));
    }

    #[test]
    fn json_overrides_accept_null_and_reject_scalars() {
        let widget =
            RecentNews::from_json(Value::Null, json!({"id": "x"})).expect("valid overrides");
        assert_eq!(widget.settings().config_value("count"), Some(&json!(5)));
        assert_eq!(widget.settings().attributes().get("id"), Some(&json!("x")));

        let error = RecentNews::from_json(json!([1, 2]), Value::Null)
            .err()
            .expect("array overrides rejected");
        assert!(matches!(
            error,
            WidgetError::InvalidOverrides {
                target: "config",
                found: "array"
            }
        ));

        let error = Plain::from_json(Value::Null, json!("wide"))
            .err()
            .expect("string overrides rejected");
        assert_eq!(
            error.to_string(),
            "widget attributes overrides must be a JSON object, found string"
        );
    }

    #[test]
    fn cache_queries_use_declared_tags() {
        let widget = RecentNews::new(WidgetMap::new(), WidgetMap::new());
        assert!(widget.settings().is_cacheable());
        assert!(!widget.settings().is_reloadable());
        assert_eq!(widget.cache_tags().as_slice(), ["widgets", "news"]);
        assert_eq!(
            widget
                .cache_key(&json!({"page": 1}))
                .expect("serializable")
                .as_str(),
            r#"widgets.{"page":1}"#
        );
    }

    #[test]
    fn overridden_markup_is_used() {
        let widget = RecentNews::new(WidgetMap::new(), WidgetMap::new());
        assert_eq!(widget.placeholder(), "Loading news...");
        assert_eq!(widget.container().open_tag(), r#"<section class="news-container">"#);
    }

    #[test]
    fn container_needed_for_async_or_reload() {
        let plain = WidgetDefaults::new().into_settings();
        assert!(!plain.needs_container(false));
        assert!(plain.needs_container(true));

        let reloading = WidgetDefaults::new()
            .reload_timeout(Interval::every(30.0))
            .into_settings();
        assert!(reloading.needs_container(false));
    }

    #[test]
    fn elements_fall_back_to_configured_defaults() {
        let elements = ElementSettings::default();
        let plain = WidgetDefaults::new().into_settings();
        assert_eq!(plain.resolved_title_element(&elements), "h2");
        assert_eq!(plain.resolved_wrapper(&elements), "div");

        let custom = WidgetDefaults::new()
            .title_element("h4")
            .wrapper("aside")
            .into_settings();
        assert_eq!(custom.resolved_title_element(&elements), "h4");
        assert_eq!(custom.resolved_wrapper(&elements), "aside");
    }

    #[test]
    fn settings_roundtrip_through_serde_defaults() {
        let parsed: WidgetSettings = serde_json::from_value(json!({
            "cache_time": 15,
            "reload_timeout": false,
            "config": {"count": 1}
        }))
        .expect("valid settings");

        assert_eq!(parsed.cache_time(), Interval::every(15.0));
        assert!(parsed.encrypt_params());
        assert_eq!(parsed.config_value("count"), Some(&json!(1)));
    }
}
