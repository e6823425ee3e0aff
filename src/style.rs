//! Emphasis and font size primitives shared by the HTML and Markdown renderers.

use serde::{Deserialize, Serialize};

/// How much attention a piece of content should draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Important,
    #[default]
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

/// CSS color used for a given `ContentType`.
pub fn content_type_css_color(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Info => "black",
        ContentType::Warning => "#ffca28",
        ContentType::Error => "#C34A2C",
        ContentType::Important => "#1967d3",
    }
}

/// CSS font size used for a given `FontSize`.
pub fn font_size_css(font_size: FontSize) -> &'static str {
    match font_size {
        FontSize::Small => "16px",
        FontSize::Medium => "18px",
        FontSize::Large => "20px",
    }
}
