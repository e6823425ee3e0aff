//! Compiles a sequence of components into a complete email (HTML) or chat
//! (Markdown) message body.

mod inline_css;

pub use inline_css::inline_css;

use crate::components::{Component, KeyValueMap, LineBreak, Table, Text, MAX_LINE_BREAKS};
use crate::error::{AlertError, Result};
use crate::html::{Element, HtmlNode};
use crate::style::{ContentType, FontSize};
use itertools::Itertools;
use serde_json::{Map, Value};

const BASE_CSS: &str = "body {text-align:center;}";
const TABLE_CSS: &str = include_str!("table.css");

/// Anything that can be rendered as an alert body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentInput {
    One(Component),
    Text(String),
    Many(Vec<ComponentItem>),
}

/// One element of a mixed component sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentItem {
    Component(Component),
    Text(String),
}

impl ComponentInput {
    /// Flattens the input into an ordered list of components, turning plain
    /// strings into default `Text` components.
    pub fn normalize(self) -> Vec<Component> {
        match self {
            ComponentInput::One(component) => vec![component],
            ComponentInput::Text(text) => vec![Component::Text(Text::new(text))],
            ComponentInput::Many(items) => items
                .into_iter()
                .map(|item| match item {
                    ComponentItem::Component(component) => component,
                    ComponentItem::Text(text) => Component::Text(Text::new(text)),
                })
                .collect(),
        }
    }

    /// Builds input from a JSON document.
    ///
    /// Accepts a string, a component object, or an array of strings and
    /// component objects. Component objects carry a `type` of `text`, `map`,
    /// `table` or `line_break`. Anything else is an `InvalidComponent`.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::String(text) => Ok(ComponentInput::Text(text.clone())),
            Value::Object(object) => Ok(ComponentInput::One(component_from_json(object)?)),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(text) => Ok(ComponentItem::Text(text.clone())),
                    Value::Object(object) => {
                        Ok(ComponentItem::Component(component_from_json(object)?))
                    }
                    other => Err(AlertError::InvalidComponent(format!(
                        "expected a string or component object, got {other}"
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(ComponentInput::Many),
            other => Err(AlertError::InvalidComponent(format!(
                "expected a string, component object or array, got {other}"
            ))),
        }
    }
}

fn component_from_json(object: &Map<String, Value>) -> Result<Component> {
    let kind = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| AlertError::InvalidComponent("component object has no \"type\"".into()))?;

    match kind {
        "text" => {
            let content = scalar(required(object, "content")?)?;
            let content_type: ContentType = optional_enum(object, "content_type")?;
            let font_size: FontSize = optional_enum(object, "font_size")?;
            Ok(Text::styled(content, content_type, font_size).into())
        }
        "map" => {
            let entries = match required(object, "content")? {
                Value::Object(map) => map
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), scalar(v)?)))
                    .collect::<Result<Vec<_>>>()?,
                other => {
                    return Err(AlertError::InvalidComponent(format!(
                        "map content must be an object, got {other}"
                    )))
                }
            };
            let inline = object.get("inline").and_then(Value::as_bool).unwrap_or(false);
            Ok(KeyValueMap::new(entries).with_inline(inline).into())
        }
        "table" => {
            let rows = match required(object, "rows")? {
                Value::Array(rows) => rows
                    .iter()
                    .map(|row| match row {
                        Value::Object(row) => row
                            .iter()
                            .map(|(k, v)| Ok((k.clone(), scalar(v)?)))
                            .collect::<Result<Vec<_>>>(),
                        other => Err(AlertError::InvalidComponent(format!(
                            "table row must be an object, got {other}"
                        ))),
                    })
                    .collect::<Result<Vec<_>>>()?,
                other => {
                    return Err(AlertError::InvalidComponent(format!(
                        "table rows must be an array, got {other}"
                    )))
                }
            };
            let mut table = Table::new(rows);
            if let Some(title) = object.get("title") {
                table = table.with_title(scalar(title)?);
            }
            if let Some(columns) = object.get("columns") {
                let columns = columns
                    .as_array()
                    .ok_or_else(|| {
                        AlertError::InvalidComponent("table columns must be an array".into())
                    })?
                    .iter()
                    .map(scalar)
                    .collect::<Result<Vec<_>>>()?;
                table = table.with_columns(columns);
            }
            Ok(table.into())
        }
        "line_break" => {
            let count = match object.get("count") {
                None => 1,
                Some(value) => value
                    .as_u64()
                    .filter(|n| (1..=MAX_LINE_BREAKS as u64).contains(n))
                    .ok_or_else(|| {
                        AlertError::InvalidComponent(format!(
                            "line_break count must be an integer from 1 to {MAX_LINE_BREAKS}, got {value}"
                        ))
                    })? as usize,
            };
            Ok(LineBreak::new(count).into())
        }
        other => Err(AlertError::InvalidComponent(format!(
            "unknown component type \"{other}\""
        ))),
    }
}

fn required<'a>(object: &'a Map<String, Value>, key: &str) -> Result<&'a Value> {
    object
        .get(key)
        .ok_or_else(|| AlertError::InvalidComponent(format!("missing \"{key}\"")))
}

fn optional_enum<T: serde::de::DeserializeOwned + Default>(
    object: &Map<String, Value>,
    key: &str,
) -> Result<T> {
    match object.get(key) {
        None => Ok(T::default()),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| AlertError::InvalidComponent(format!("invalid \"{key}\": {e}"))),
    }
}

/// Coerces a JSON scalar to the string shown in the alert.
fn scalar(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(AlertError::InvalidComponent(format!(
            "expected a scalar value, got {other}"
        ))),
    }
}

impl From<Component> for ComponentInput {
    fn from(component: Component) -> Self {
        ComponentInput::One(component)
    }
}

impl From<&str> for ComponentInput {
    fn from(text: &str) -> Self {
        ComponentInput::Text(text.to_string())
    }
}

impl From<String> for ComponentInput {
    fn from(text: String) -> Self {
        ComponentInput::Text(text)
    }
}

impl<T: Into<ComponentItem>> From<Vec<T>> for ComponentInput {
    fn from(items: Vec<T>) -> Self {
        ComponentInput::Many(items.into_iter().map(Into::into).collect())
    }
}

macro_rules! impl_component_conversions {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ComponentInput {
                fn from(value: $ty) -> Self {
                    ComponentInput::One(value.into())
                }
            }

            impl From<$ty> for ComponentItem {
                fn from(value: $ty) -> Self {
                    ComponentItem::Component(value.into())
                }
            }
        )*
    };
}

impl_component_conversions!(Text, KeyValueMap, Table, LineBreak);

impl From<Component> for ComponentItem {
    fn from(component: Component) -> Self {
        ComponentItem::Component(component)
    }
}

impl From<&str> for ComponentItem {
    fn from(text: &str) -> Self {
        ComponentItem::Text(text.to_string())
    }
}

impl From<String> for ComponentItem {
    fn from(text: String) -> Self {
        ComponentItem::Text(text)
    }
}

/// Normalizes any supported input into an ordered component list.
pub fn normalize_input(input: impl Into<ComponentInput>) -> Vec<Component> {
    input.into().normalize()
}

/// Compiles components into an email-safe HTML document.
pub fn render_html(input: impl Into<ComponentInput>) -> Result<String> {
    render_components_html(&normalize_input(input))
}

/// Compiles components into Markdown, using Slack's subset when
/// `slack_format` is set.
pub fn render_markdown(input: impl Into<ComponentInput>, slack_format: bool) -> String {
    render_components_md(&normalize_input(input), slack_format)
}

pub fn render_components_html(components: &[Component]) -> Result<String> {
    let mut head = Element::new("head")
        .child(Element::new("meta").attr("charset", "utf-8"))
        .child(Element::new("style").child(HtmlNode::Raw(BASE_CSS.to_string())));
    if components.iter().any(Component::is_table) {
        head = head.child(Element::new("style").child(HtmlNode::Raw(TABLE_CSS.to_string())));
    }

    let body = Element::new("body").children(components.iter().flat_map(|component| {
        [
            HtmlNode::from(Element::new("div").child(component.html())),
            HtmlNode::from(Element::new("br")),
        ]
    }));

    let document: HtmlNode = Element::new("html").child(head).child(body).into();
    inline_css(&format!("<!DOCTYPE html>\n{}", document.render()))
}

pub fn render_components_md(components: &[Component], slack_format: bool) -> String {
    components
        .iter()
        .map(|component| component.md(slack_format))
        .join("\n\n")
        .trim()
        .to_string()
}
