//! ANSI colors for console output.
use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;

const RESET: &str = "\x1b[0m"; // Reset color

static SGR_SEQUENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[\d;]*m").expect("SGR pattern is a valid regex")
});

/// Terminal colors understood by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Green,
    Blue,
    LightRed,
    LightGreen,
    LightBlue,
    White,
    Gray,
    Brown,
    Purple,
    Cyan,
    Yellow,
    LightGray,
    LightCyan,
    LightPurple,
}

impl Color {
    /// The SGR escape sequence that switches the terminal to this color.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Red => "\x1b[0;31m",
            Self::Green => "\x1b[0;32m",
            Self::Blue => "\x1b[0;34m",
            Self::LightRed => "\x1b[1;31m",
            Self::LightGreen => "\x1b[1;32m",
            Self::LightBlue => "\x1b[1;34m",
            Self::White => "\x1b[1;37m",
            Self::Gray => "\x1b[1;30m",
            Self::Brown => "\x1b[0;33m",
            Self::Purple => "\x1b[0;35m",
            Self::Cyan => "\x1b[0;36m",
            Self::Yellow => "\x1b[1;33m",
            Self::LightGray => "\x1b[0;37m",
            Self::LightCyan => "\x1b[1;36m",
            Self::LightPurple => "\x1b[1;35m",
        }
    }

    /// Lowercase name, as accepted by [`Color::from_str`].
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::LightRed => "light-red",
            Self::LightGreen => "light-green",
            Self::LightBlue => "light-blue",
            Self::White => "white",
            Self::Gray => "gray",
            Self::Brown => "brown",
            Self::Purple => "purple",
            Self::Cyan => "cyan",
            Self::Yellow => "yellow",
            Self::LightGray => "light-gray",
            Self::LightCyan => "light-cyan",
            Self::LightPurple => "light-purple",
        }
    }

    /// Wraps `text` in this color followed by a reset.
    pub fn paint(&self, text: &str) -> String {
        format!("{}{}{}", self.code(), text, RESET)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        let color = match normalized.as_str() {
            "red" => Self::Red,
            "green" => Self::Green,
            "blue" => Self::Blue,
            "light-red" => Self::LightRed,
            "light-green" => Self::LightGreen,
            "light-blue" => Self::LightBlue,
            "white" => Self::White,
            "gray" | "grey" => Self::Gray,
            "brown" => Self::Brown,
            "purple" => Self::Purple,
            "cyan" => Self::Cyan,
            "yellow" => Self::Yellow,
            "light-gray" | "light-grey" => Self::LightGray,
            "light-cyan" => Self::LightCyan,
            "light-purple" => Self::LightPurple,
            _ => return Err(format!("unknown color '{}'", s.trim())),
        };
        Ok(color)
    }
}

/// Wraps `text` in `color` when one is given, otherwise returns it unchanged.
pub fn colorize(text: &str, color: Option<Color>) -> String {
    match color {
        Some(color) => color.paint(text),
        None => text.to_string(),
    }
}

/// Removes SGR color sequences from `text`.
pub fn strip_colors(text: &str) -> String {
    SGR_SEQUENCE.replace_all(text, "").into_owned()
}

/// Number of characters a terminal shows for `text`, ignoring color sequences.
pub fn visible_width(text: &str) -> usize {
    if text.contains('\x1b') {
        strip_colors(text).chars().count()
    } else {
        text.chars().count()
    }
}
