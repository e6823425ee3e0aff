//! The closed set of alert components.
//!
//! Every component renders to an `HtmlNode` for email and to Markdown for
//! chat, either classic or Slack-flavored (single-asterisk bold, no
//! headings).

mod line_break;
mod map;
mod table;
mod text;

pub use line_break::{LineBreak, MAX_LINE_BREAKS};
pub use map::KeyValueMap;
pub use table::{Row, Table, SLACK_MAX_TABLE_ROWS};
pub use text::Text;

use crate::html::HtmlNode;

/// A structured component of an alert message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
    Text(Text),
    Map(KeyValueMap),
    Table(Table),
    LineBreak(LineBreak),
}

impl Component {
    pub fn html(&self) -> HtmlNode {
        match self {
            Component::Text(text) => text.html(),
            Component::Map(map) => map.html(),
            Component::Table(table) => table.html(),
            Component::LineBreak(lb) => lb.html(),
        }
    }

    /// Renders the component as Markdown, using Slack's subset when
    /// `slack_format` is set.
    pub fn md(&self, slack_format: bool) -> String {
        match (self, slack_format) {
            (Component::Text(text), false) => text.classic_md(),
            (Component::Text(text), true) => text.slack_md(),
            (Component::Map(map), false) => map.classic_md(),
            (Component::Map(map), true) => map.slack_md(),
            (Component::Table(table), false) => table.classic_md(),
            (Component::Table(table), true) => table.slack_md(),
            (Component::LineBreak(lb), _) => lb.md(),
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(self, Component::Table(_))
    }

    pub fn as_table_mut(&mut self) -> Option<&mut Table> {
        match self {
            Component::Table(table) => Some(table),
            _ => None,
        }
    }
}

impl From<Text> for Component {
    fn from(text: Text) -> Self {
        Component::Text(text)
    }
}

impl From<KeyValueMap> for Component {
    fn from(map: KeyValueMap) -> Self {
        Component::Map(map)
    }
}

impl From<Table> for Component {
    fn from(table: Table) -> Self {
        Component::Table(table)
    }
}

impl From<LineBreak> for Component {
    fn from(lb: LineBreak) -> Self {
        Component::LineBreak(lb)
    }
}

impl From<&str> for Component {
    fn from(s: &str) -> Self {
        Component::Text(Text::new(s))
    }
}

impl From<String> for Component {
    fn from(s: String) -> Self {
        Component::Text(Text::new(s))
    }
}
