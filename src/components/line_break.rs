use crate::html::{Element, HtmlNode};
use serde::{Deserialize, Serialize};

/// Largest count accepted from dynamic (JSON) input.
pub const MAX_LINE_BREAKS: usize = 1000;

/// One or more line breaks between components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineBreak {
    pub count: usize,
}

impl LineBreak {
    /// A zero count is raised to a single break.
    pub fn new(count: usize) -> Self {
        Self {
            count: count.max(1),
        }
    }

    pub fn html(&self) -> HtmlNode {
        Element::new("div")
            .children((0..self.count).map(|_| Element::new("br")))
            .into()
    }

    pub fn md(&self) -> String {
        "\n".repeat(self.count)
    }
}

impl Default for LineBreak {
    fn default() -> Self {
        Self::new(1)
    }
}
