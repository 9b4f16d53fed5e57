//! Configuration layer: typed settings with layered precedence (file → env).
//!
//! Host applications load [`Settings`] once at startup and pass the element
//! defaults to their renderer and the logging section to
//! [`crate::infra::telemetry::init`].

use std::{path::PathBuf, str::FromStr};

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "widgetry";
const ENV_PREFIX: &str = "WIDGETRY";
const ENV_SEPARATOR: &str = "__";
pub(crate) const DEFAULT_TITLE_ELEMENT: &str = "h2";
pub(crate) const DEFAULT_WRAPPER_ELEMENT: &str = "div";

/// Where to look for configuration beyond the implicit files and environment.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Optional explicit configuration file; must exist when given.
    pub config_file: Option<PathBuf>,
}

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub elements: ElementSettings,
    pub logging: LoggingSettings,
}

/// Markup elements used when a widget does not name its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSettings {
    pub title_element: String,
    pub wrapper: String,
}

impl Default for ElementSettings {
    fn default() -> Self {
        Self {
            title_element: DEFAULT_TITLE_ELEMENT.to_string(),
            wrapper: DEFAULT_WRAPPER_ELEMENT.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (files → environment).
pub fn load(options: &LoadOptions) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = options.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR),
    );

    let raw: RawSettings = builder.build()?.try_deserialize()?;
    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    elements: RawElementSettings,
    logging: RawLoggingSettings,
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings { elements, logging } = raw;

        let elements = build_element_settings(elements)?;
        let logging = build_logging_settings(logging)?;

        Ok(Self { elements, logging })
    }
}

fn build_element_settings(elements: RawElementSettings) -> Result<ElementSettings, LoadError> {
    let title_element = elements
        .title_element
        .unwrap_or_else(|| DEFAULT_TITLE_ELEMENT.to_string());
    validate_element_name(&title_element, "elements.title_element")?;

    let wrapper = elements
        .wrapper
        .unwrap_or_else(|| DEFAULT_WRAPPER_ELEMENT.to_string());
    validate_element_name(&wrapper, "elements.wrapper")?;

    Ok(ElementSettings {
        title_element,
        wrapper,
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn validate_element_name(name: &str, key: &'static str) -> Result<(), LoadError> {
    if name.is_empty() {
        return Err(LoadError::invalid(key, "element name must not be empty"));
    }
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(LoadError::invalid(
            key,
            format!("element `{name}` must start with an ASCII letter"),
        ));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(LoadError::invalid(
            key,
            format!("element `{name}` may only contain ASCII letters, digits and `-`"),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawElementSettings {
    title_element: Option<String>,
    wrapper: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}
