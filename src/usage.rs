//! Usage text for registered options.
//!
//! Rendering is pure: [`UsageFormatter::render`] returns lines and leaves
//! writing them to the caller (see `Console::show_usage`).
use crate::{
    colors::{Color, colorize},
    constants::{USAGE_ALIAS_WIDTH, USAGE_PARAM_WIDTH, USAGE_TEXT_WIDTH},
    options::OptionSpec,
};

/// Column layout for usage text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageFormatter {
    /// Width of the `--name` column.
    pub param_width: usize,
    /// Width of the alias column.
    pub alias_width: usize,
    /// Width at which descriptions wrap.
    pub text_width: usize,
}

impl Default for UsageFormatter {
    fn default() -> Self {
        Self {
            param_width: USAGE_PARAM_WIDTH,
            alias_width: USAGE_ALIAS_WIDTH,
            text_width: USAGE_TEXT_WIDTH,
        }
    }
}

impl UsageFormatter {
    /// Renders plain usage lines for `program` and `specs`.
    ///
    /// With no specs only the `Usage:` line is produced.
    pub fn render(&self, program: &str, specs: &[OptionSpec]) -> Vec<String> {
        self.render_styled(program, specs, None)
    }

    /// Like [`render`](Self::render), painting each `--name` with `param_color`.
    ///
    /// Padding is computed on the plain name, so colors never shift columns.
    pub fn render_styled(
        &self,
        program: &str,
        specs: &[OptionSpec],
        param_color: Option<Color>,
    ) -> Vec<String> {
        let mut lines = vec![format!("Usage: {program} [ options ]")];
        if specs.is_empty() {
            return lines;
        }

        lines.push(String::new());
        lines.push("Options:".to_string());
        for spec in specs {
            lines.extend(self.render_spec(spec, param_color));
            lines.push(String::new());
        }
        lines
    }

    fn render_spec(&self, spec: &OptionSpec, param_color: Option<Color>) -> Vec<String> {
        let param = format!("--{}", spec.name);
        let aliases = spec
            .aliases
            .iter()
            .map(|alias| format!("-{alias}"))
            .collect::<Vec<_>>()
            .join(", ");

        let mut description = spec.description.clone();
        if let Some(default) = &spec.default {
            description.push_str(" default: ");
            description.push_str(default);
        }

        let head = format!(
            "{}{}{}",
            colorize(&param, param_color),
            padding(&param, self.param_width),
            pad_right(&aliases, self.alias_width),
        );
        let indent = " ".repeat(self.param_width + self.alias_width);

        let mut wrapped = wrap_words(&description, self.text_width).into_iter();
        let first = wrapped.next().unwrap_or_default();
        let mut lines = vec![format!("{head}{first}").trim_end().to_string()];
        lines.extend(wrapped.map(|line| format!("{indent}{line}")));
        lines
    }
}

/// Convenience wrapper around the default [`UsageFormatter`].
pub fn render_usage(program: &str, specs: &[OptionSpec]) -> Vec<String> {
    UsageFormatter::default().render(program, specs)
}

/// Spaces needed after `text` to fill `width`; at least one so columns never
/// run together.
fn padding(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width && len > 0 {
        " ".to_string()
    } else {
        " ".repeat(width - len)
    }
}

fn pad_right(text: &str, width: usize) -> String {
    format!("{text}{}", padding(text, width))
}

/// Greedy word wrap; line breaks in `text` are treated as spaces.
///
/// A single word longer than `width` gets a line of its own.
pub fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, aliases: &[&str], default: Option<&str>, description: &str) -> OptionSpec {
        OptionSpec {
            name: name.to_string(),
            aliases: aliases.iter().map(|alias| alias.to_string()).collect(),
            default: default.map(str::to_string),
            description: description.to_string(),
        }
    }

    #[test]
    fn empty_specs_render_only_usage_line() {
        let lines = render_usage("prog", &[]);
        assert_eq!(lines, ["Usage: prog [ options ]"]);
    }

    #[test]
    fn single_option_uses_fixed_columns() {
        let lines = render_usage("prog", &[spec("name", &["n"], None, "Who to greet")]);

        assert_eq!(
            lines,
            [
                "Usage: prog [ options ]",
                "",
                "Options:",
                "--name          -n        Who to greet",
                "",
            ]
        );
    }

    #[test]
    fn default_is_appended_to_description() {
        let lines = render_usage("prog", &[spec("level", &[], Some("3"), "Verbosity")]);
        assert_eq!(lines[3], "--level                   Verbosity default: 3");
    }

    #[test]
    fn multiple_aliases_are_comma_joined() {
        let lines = render_usage("prog", &[spec("help", &["?", "h"], None, "Show help")]);
        assert_eq!(lines[3], "--help          -?, -h    Show help");
    }

    #[test]
    fn long_descriptions_wrap_under_description_column() {
        let description = "word ".repeat(30);
        let lines = render_usage("prog", &[spec("long", &[], None, &description)]);

        let block: Vec<&String> = lines[3..].iter().take_while(|l| !l.is_empty()).collect();
        assert_eq!(block.len(), 3);
        for continuation in &block[1..] {
            assert!(continuation.starts_with(&" ".repeat(26)));
            assert!(!continuation[26..].starts_with(' '));
        }
        for line in &block {
            let text_len = line.chars().count() - 26;
            assert!(text_len <= 60, "line too wide: {line:?}");
        }
    }

    #[test]
    fn line_breaks_collapse_to_spaces() {
        let lines = render_usage("prog", &[spec("x", &[], None, "first\r\nsecond\nthird")]);
        assert!(lines[3].ends_with("first second third"));
    }

    #[test]
    fn blocks_are_separated_by_blank_lines() {
        let lines = render_usage(
            "prog",
            &[spec("a", &[], None, "A"), spec("b", &[], None, "B")],
        );
        assert_eq!(lines.len(), 3 + 4);
        assert!(lines[3].starts_with("--a"));
        assert_eq!(lines[4], "");
        assert!(lines[5].starts_with("--b"));
        assert_eq!(lines[6], "");
    }

    #[test]
    fn styled_name_keeps_alignment() {
        let plain = UsageFormatter::default().render("p", &[spec("name", &[], None, "x")]);
        let styled = UsageFormatter::default().render_styled(
            "p",
            &[spec("name", &[], None, "x")],
            Some(Color::White),
        );
        assert_eq!(crate::colors::strip_colors(&styled[3]), plain[3]);
    }

    #[test]
    fn wrap_words_fills_greedily() {
        assert_eq!(wrap_words("aa bb cc", 5), ["aa bb", "cc"]);
        assert_eq!(wrap_words("toolongword x", 4), ["toolongword", "x"]);
        assert!(wrap_words("   ", 10).is_empty());
    }
}
