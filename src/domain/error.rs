use thiserror::Error;

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("failed to serialize widget parameters: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("widget {target} overrides must be a JSON object, found {found}")]
    InvalidOverrides {
        target: &'static str,
        found: &'static str,
    },
}

impl WidgetError {
    pub fn invalid_overrides(target: &'static str, found: &'static str) -> Self {
        Self::InvalidOverrides { target, found }
    }
}
