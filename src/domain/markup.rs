//! Markup descriptors handed to the renderer for async and reloadable widgets.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONTAINER_ELEMENT: &str = "div";
pub const DEFAULT_CONTAINER_ATTRIBUTES: &str =
    r#"style="display:inline" class="arrilot-widget-container""#;

/// Wrapper element placed around async and reloadable widget output.
///
/// `attributes` is a preformatted attribute string inserted verbatim into the
/// opening tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub element: Cow<'static, str>,
    pub attributes: Cow<'static, str>,
}

impl Container {
    pub fn new(
        element: impl Into<Cow<'static, str>>,
        attributes: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            element: element.into(),
            attributes: attributes.into(),
        }
    }

    pub fn open_tag(&self) -> String {
        if self.attributes.trim().is_empty() {
            format!("<{}>", self.element)
        } else {
            format!("<{} {}>", self.element, self.attributes)
        }
    }

    pub fn close_tag(&self) -> String {
        format!("</{}>", self.element)
    }

    /// Surround already rendered content with this container.
    pub fn wrap(&self, content: &str) -> String {
        format!("{}{}{}", self.open_tag(), content, self.close_tag())
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new(DEFAULT_CONTAINER_ELEMENT, DEFAULT_CONTAINER_ATTRIBUTES)
    }
}
