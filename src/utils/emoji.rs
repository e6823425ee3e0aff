//! Emoji that render the same in Slack and in email clients.

pub struct Emoji;

impl Emoji {
    // there is no green up arrow
    pub const RED_DOWN_ARROW: &'static str = "🔻";
    pub const RED_EXCLAMATION: &'static str = "❗";
    pub const RED_X: &'static str = "❌";
    pub const HOLLOW_RED_CIRCLE: &'static str = "⭕";
    pub const RED_CIRCLE: &'static str = "🔴";
    pub const YELLOW_CIRCLE: &'static str = "🟡";
    pub const BLUE_CIRCLE: &'static str = "🔵";
    pub const PURPLE_CIRCLE: &'static str = "🟣";
    pub const BROWN_CIRCLE: &'static str = "🟤";
    pub const GREEN_CIRCLE: &'static str = "🟢";
    pub const GREEN_CHECK: &'static str = "✅";
    pub const WARNING: &'static str = "⚠️";
    pub const ROCKET: &'static str = "🚀";
    pub const FIRE: &'static str = "🔥";
    pub const TURTLE: &'static str = "🐢";
}
