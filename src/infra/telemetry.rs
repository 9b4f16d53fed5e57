use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing::{Subscriber, level_filters::LevelFilter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

/// Environment variable holding filter directives that refine the configured level.
pub const LOG_FILTER_ENV: &str = "WIDGETRY_LOG";

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
///
/// Hosts that already install their own subscriber should skip this and call
/// [`describe_metrics`] directly.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    tracing_subscriber::registry()
        .with(log_filter(logging.level))
        .with(ErrorLayer::default())
        .with(output_layer(logging.format))
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

/// Filter starting at `level`, with directives from [`LOG_FILTER_ENV`] on top.
///
/// Unparsable directives in the variable are skipped.
fn log_filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .with_env_var(LOG_FILTER_ENV)
        .from_env_lossy()
}

fn output_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    }
}

/// Register descriptions for the counters emitted by this crate.
pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "widgetry_widget_constructed_total",
            Unit::Count,
            "Total number of widget settings resolved from defaults and overrides."
        );
        describe_counter!(
            "widgetry_cache_key_derived_total",
            Unit::Count,
            "Total number of widget cache keys derived."
        );
    });
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn configured_level_applies_without_env_directives() {
        // SAFETY: serialized with every other test that reads the environment.
        unsafe {
            std::env::remove_var(LOG_FILTER_ENV);
        }

        assert_eq!(log_filter(LevelFilter::WARN).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(log_filter(LevelFilter::OFF).max_level_hint(), Some(LevelFilter::OFF));
    }

    #[test]
    #[serial]
    fn env_directives_refine_configured_level() {
        // SAFETY: serialized with every other test that reads the environment.
        unsafe {
            std::env::set_var(LOG_FILTER_ENV, "widgetry=trace");
        }

        let filter = log_filter(LevelFilter::WARN);

        unsafe {
            std::env::remove_var(LOG_FILTER_ENV);
        }
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    #[serial]
    fn second_install_reports_telemetry_error() {
        let logging = LoggingSettings {
            level: LevelFilter::WARN,
            format: LogFormat::Compact,
        };

        // The first call may lose to another test's subscriber; the second never succeeds.
        let _ = init(&logging);
        let error = init(&logging).expect_err("global subscriber already installed");
        assert!(matches!(error, InfraError::Telemetry(_)));
    }
}
