//! Moves `<style>` rules into `style` attributes.
//!
//! Many email clients drop `<style>` blocks, so every declaration has to live
//! on the element it applies to. Only flat rule sets are supported: at-rules
//! are skipped, as are selectors `lol_html` cannot match.

use crate::error::{AlertError, Result};
use lol_html::html_content::Element;
use lol_html::{
    element, rewrite_str, text, ElementContentHandlers, HandlerResult, RewriteStrSettings,
    Selector,
};
use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// A single `selector { declarations }` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CssRule {
    pub selector: String,
    /// Normalized declarations, each terminated by `;`.
    pub declarations: String,
}

/// Inlines every stylesheet found in `html` and removes the `<style>` blocks.
///
/// Rules apply in stylesheet order and declarations already present in a
/// `style` attribute come last, so they keep precedence.
pub fn inline_css(html: &str) -> Result<String> {
    let rules = parse_rules(&collect_stylesheets(html)?);

    let mut handlers: Vec<(Cow<'_, Selector>, ElementContentHandlers<'_>)> = Vec::new();
    // Each handler prepends its declarations, so registering in reverse
    // leaves the first rule leftmost.
    for rule in rules.into_iter().rev() {
        let selector = match rule.selector.parse::<Selector>() {
            Ok(selector) => selector,
            Err(e) => {
                debug!(selector = %rule.selector, error = %e, "Skipping CSS rule with unsupported selector");
                continue;
            }
        };
        handlers.push((
            Cow::Owned(selector),
            ElementContentHandlers::default().element(prepend_style(rule.declarations)),
        ));
    }
    handlers.push(element!("style", |el| {
        el.remove();
        Ok(())
    }));

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: handlers,
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| AlertError::HtmlRewrite(err.to_string()))
}

fn prepend_style(declarations: String) -> impl FnMut(&mut Element<'_, '_>) -> HandlerResult {
    move |el| {
        let merged = match el.get_attribute("style") {
            Some(existing) if !existing.trim().is_empty() => {
                format!("{declarations}{}", existing.trim())
            }
            _ => declarations.clone(),
        };
        el.set_attribute("style", &merged)?;
        Ok(())
    }
}

/// Concatenates the contents of all `<style>` elements.
fn collect_stylesheets(html: &str) -> Result<String> {
    let css = Rc::new(RefCell::new(String::new()));
    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![text!("style", {
                let css = Rc::clone(&css);
                move |chunk| {
                    css.borrow_mut().push_str(chunk.as_str());
                    if chunk.last_in_text_node() {
                        css.borrow_mut().push('\n');
                    }
                    Ok(())
                }
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| AlertError::HtmlRewrite(err.to_string()))?;
    Ok(css.take())
}

/// Splits a stylesheet into one rule per selector.
pub(crate) fn parse_rules(css: &str) -> Vec<CssRule> {
    let css = strip_comments(css);
    let mut rules = Vec::new();
    for block in css.split('}') {
        let Some((selectors, body)) = block.split_once('{') else {
            continue;
        };
        let selectors = selectors.trim();
        if selectors.is_empty() || selectors.starts_with('@') || body.contains('{') {
            continue;
        }
        let declarations: String = body
            .split(';')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|d| format!("{d};"))
            .collect();
        if declarations.is_empty() {
            continue;
        }
        for selector in selectors.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            rules.push(CssRule {
                selector: selector.to_string(),
                declarations: declarations.clone(),
            });
        }
    }
    rules
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        rest = match rest[start + 2..].find("*/") {
            Some(end) => &rest[start + 2 + end + 2..],
            None => "",
        };
    }
    out.push_str(rest);
    out
}
