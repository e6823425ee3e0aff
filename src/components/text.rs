use crate::html::{Element, HtmlNode};
use crate::style::{content_type_css_color, font_size_css, ContentType, FontSize};
use serde::{Deserialize, Serialize};

/// A component that displays formatted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    pub content: String,
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default)]
    pub font_size: FontSize,
}

impl Text {
    /// Creates an `Info`, `Medium` text component.
    pub fn new(content: impl ToString) -> Self {
        Self {
            content: content.to_string(),
            content_type: ContentType::default(),
            font_size: FontSize::default(),
        }
    }

    pub fn styled(content: impl ToString, content_type: ContentType, font_size: FontSize) -> Self {
        Self {
            content: content.to_string(),
            content_type,
            font_size,
        }
    }

    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn with_font_size(mut self, font_size: FontSize) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn html(&self) -> HtmlNode {
        let tag = match self.content_type {
            ContentType::Info => "div",
            ContentType::Warning => "p",
            ContentType::Error => "h2",
            ContentType::Important => "h1",
        };
        Element::new(tag)
            .attr(
                "style",
                format!(
                    "font-size:{};color:{};",
                    font_size_css(self.font_size),
                    content_type_css_color(self.content_type)
                ),
            )
            .text(self.content.as_str())
            .into()
    }

    pub fn classic_md(&self) -> String {
        match self.font_size {
            FontSize::Small => self.content.clone(),
            FontSize::Medium => format!("## {}", self.content),
            FontSize::Large => format!("# {}", self.content),
        }
    }

    pub fn slack_md(&self) -> String {
        match self.content_type {
            ContentType::Important | ContentType::Error => format!("*{}*", self.content),
            ContentType::Info | ContentType::Warning => self.content.clone(),
        }
    }
}
