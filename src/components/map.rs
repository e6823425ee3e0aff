use super::Text;
use crate::html::{Element, HtmlNode};
use crate::style::{ContentType, FontSize};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A component that displays formatted key/value pairs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyValueMap {
    /// Entries in display order. Duplicate keys are all rendered.
    pub entries: Vec<(String, String)>,
    /// Put every pair on one line instead of one pair per line.
    #[serde(default)]
    pub inline: bool,
}

impl KeyValueMap {
    pub fn new<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: ToString,
        V: ToString,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            inline: false,
        }
    }

    pub fn with_inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }

    fn separator(&self) -> &'static str {
        if self.inline {
            "\t"
        } else {
            "\n"
        }
    }

    pub fn html(&self) -> HtmlNode {
        let pairs = self.entries.iter().map(|(k, v)| {
            let pair = Element::new("span")
                .child(Element::new("b").child(
                    Text::styled(format!("{k}: "), ContentType::Important, FontSize::Large).html(),
                ))
                .child(Text::new(v).with_font_size(FontSize::Large).html());
            if self.inline {
                Element::new("span").text("\t").child(pair)
            } else {
                Element::new("div").child(pair)
            }
        });
        Element::new("div").children(pairs).into()
    }

    /// Renders a two-column pipe table. Inline maps join the rows with tabs,
    /// which yields a single-line table.
    pub fn classic_md(&self) -> String {
        let rows = ["|||".to_string(), "|---:|:---|".to_string()]
            .into_iter()
            .chain(self.entries.iter().map(|(k, v)| format!("|**{k}:**|{v}|")))
            .chain(std::iter::once("|||".to_string()));
        rows.into_iter().join(self.separator())
    }

    pub fn slack_md(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("*{k}:* {v}"))
            .join(self.separator())
    }
}
