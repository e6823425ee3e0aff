pub mod emoji;

pub use emoji::Emoji;

/// Wraps text in a Markdown code fence.
pub fn as_code_block(text: &str) -> String {
    format!("```\n{text}\n```")
}
