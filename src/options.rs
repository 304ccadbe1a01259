//! Command-line option registry and tokenizer.
//!
//! Supports:
//! - `-e`
//! - `-e <value>`
//! - `--long-param`
//! - `--long-param=<value>`
//! - `--long-param <value>`
//! - `<value>` (positional)
//!
//! Values are either free-form strings or the flag marker; there are no typed
//! values, no grouping of short flags and no sub-commands.
use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    ffi::OsString,
    fmt,
};

use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::constants::{HELP_ALIAS, HELP_OPTION};

/// Value recorded for an option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// The option was given without a value.
    Flag,
    /// The option carried a value, inline or as the following token.
    Text(String),
}

impl OptionValue {
    /// Returns the text value, or `None` for a flag.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Flag => None,
            Self::Text(text) => Some(text),
        }
    }

    /// Truthiness used for flag-style checks such as `--help`.
    ///
    /// A flag is always true; text is true unless it is empty or `"0"`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Flag => true,
            Self::Text(text) => !text.is_empty() && text != "0",
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag => write!(f, "true"),
            Self::Text(text) => write!(f, "{text}"),
        }
    }
}

impl Serialize for OptionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Flag => serializer.serialize_bool(true),
            Self::Text(text) => serializer.serialize_str(text),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Everything registered about a single option.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSpec {
    /// Canonical name, without leading dashes.
    pub name: String,
    /// Short forms that resolve to `name`, in registration order.
    pub aliases: Vec<String>,
    /// Value reported when the option is absent from the input.
    pub default: Option<String>,
    /// Help text shown in usage output.
    pub description: String,
}

/// Options registered by the application before parsing.
///
/// Holds the alias table, defaults and descriptions. A fresh registry always
/// maps `-h` to `help`.
#[derive(Debug, Clone)]
pub struct OptionRegistry {
    /// (alias, canonical name) in registration order
    aliases: Vec<(String, String)>,
    defaults: HashMap<String, String>,
    /// Registration order matters for usage output.
    descriptions: Vec<(String, String)>,
}

impl Default for OptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionRegistry {
    /// Creates a registry containing only the `-h` -> `help` alias.
    pub fn new() -> Self {
        Self {
            aliases: vec![(HELP_ALIAS.to_string(), HELP_OPTION.to_string())],
            defaults: HashMap::new(),
            descriptions: Vec::new(),
        }
    }

    /// Sets the value reported for `name` when it is absent from the input.
    pub fn set_default(&mut self, name: &str, value: impl Into<String>) {
        self.defaults.insert(name.to_string(), value.into());
    }

    /// Sets (or replaces) the help text of `name`.
    ///
    /// Only described options show up in usage output.
    pub fn set_description(&mut self, name: &str, text: impl Into<String>) {
        let text = text.into();
        match self.descriptions.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = text,
            None => self.descriptions.push((name.to_string(), text)),
        }
    }

    /// Binds `alias` to `name`.
    ///
    /// Returns `false` without changing anything when the alias already
    /// belongs to a different option.
    pub fn add_alias(&mut self, name: &str, alias: &str) -> bool {
        match self.target_of(alias) {
            Some(existing) if existing == name => true,
            Some(existing) => {
                debug!("Alias '{alias}' already bound to '{existing}', refusing '{name}'");
                false
            }
            None => {
                self.aliases.push((alias.to_string(), name.to_string()));
                true
            }
        }
    }

    fn target_of(&self, alias: &str) -> Option<&str> {
        self.aliases
            .iter()
            .find(|(key, _)| key == alias)
            .map(|(_, target)| target.as_str())
    }

    /// Maps an alias to its canonical option name; other names pass through.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.target_of(name).unwrap_or(name)
    }

    /// Aliases bound to `name`, in registration order.
    pub fn aliases_of(&self, name: &str) -> Vec<&str> {
        self.aliases
            .iter()
            .filter(|(_, target)| target.as_str() == name)
            .map(|(alias, _)| alias.as_str())
            .collect()
    }

    /// Registered default for `name`, if any.
    pub fn default_for(&self, name: &str) -> Option<&str> {
        self.defaults.get(self.resolve(name)).map(String::as_str)
    }

    /// Described options in registration order.
    pub fn specs(&self) -> Vec<OptionSpec> {
        self.descriptions
            .iter()
            .map(|(name, description)| OptionSpec {
                name: name.clone(),
                aliases: self
                    .aliases_of(name)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                default: self.defaults.get(name).cloned(),
                description: description.clone(),
            })
            .collect()
    }

    /// Tokenizes `args` into options and positional arguments.
    ///
    /// `args[0]` is the program name and is skipped. Options named in
    /// `no_value` (plus `help`) never consume the following token. Alias
    /// resolution happens before the no-value check, and entries of
    /// `no_value` are resolved the same way, so `-h` and `--help` behave
    /// identically.
    pub fn parse<I, S>(&self, args: I, no_value: &[&str]) -> ParsedOptions
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let no_value: BTreeSet<&str> = no_value
            .iter()
            .map(|name| self.resolve(name))
            .chain(std::iter::once(HELP_OPTION))
            .collect();

        let tokens: Vec<S> = args.into_iter().skip(1).collect();
        let mut values = HashMap::new();
        let mut positional = Vec::new();

        let mut cursor = 0;
        while cursor < tokens.len() {
            let token = tokens[cursor].as_ref();
            cursor += 1;

            let (raw_name, inline) = match split_token(token) {
                Token::Positional => {
                    positional.push(token.to_string());
                    continue;
                }
                Token::Option { name, inline } => (name, inline),
            };

            if raw_name.is_empty() {
                warn!("Ignoring option token '{token}' without a name");
                continue;
            }

            let name = self.resolve(raw_name);
            let value = match inline {
                Some(text) => OptionValue::Text(text.to_string()),
                None => {
                    let next: Option<&str> = tokens.get(cursor).map(|next| next.as_ref());
                    match next {
                        Some(next) if !no_value.contains(name) && !next.starts_with('-') => {
                            cursor += 1;
                            OptionValue::Text(next.to_string())
                        }
                        _ => OptionValue::Flag,
                    }
                }
            };

            values.insert(name.to_string(), value);
        }

        ParsedOptions { values, positional }
    }

    /// Looks `name` up in `parsed`, falling back to the registered default.
    ///
    /// Aliases are resolved first, so `-n` and `--name` agree.
    pub fn get(&self, parsed: &ParsedOptions, name: &str) -> Option<OptionValue> {
        let name = self.resolve(name);
        parsed
            .value(name)
            .cloned()
            .or_else(|| self.defaults.get(name).cloned().map(OptionValue::Text))
    }

    /// Defaults merged with parsed values; parsed values win.
    pub fn all(&self, parsed: &ParsedOptions) -> BTreeMap<String, OptionValue> {
        let mut merged: BTreeMap<String, OptionValue> = self
            .defaults
            .iter()
            .map(|(name, value)| (name.clone(), OptionValue::Text(value.clone())))
            .collect();
        merged.extend(
            parsed
                .values
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );
        merged
    }
}

/// Converts raw arguments to strings, replacing invalid UTF-8 with U+FFFD.
pub fn lossy_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}

/// The process arguments, program name first, via [`lossy_args`].
pub fn env_args() -> Vec<String> {
    lossy_args(std::env::args_os())
}

enum Token<'a> {
    Positional,
    Option { name: &'a str, inline: Option<&'a str> },
}

fn split_token(token: &str) -> Token<'_> {
    if let Some(long) = token.strip_prefix("--") {
        return match long.split_once('=') {
            Some((name, value)) => Token::Option {
                name,
                inline: Some(value),
            },
            None => Token::Option {
                name: long,
                inline: None,
            },
        };
    }

    match token.strip_prefix('-') {
        Some(short) => Token::Option {
            name: short,
            inline: None,
        },
        None => Token::Positional,
    }
}

/// Result of one parse pass: option values keyed by canonical name plus the
/// positional arguments in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOptions {
    values: HashMap<String, OptionValue>,
    positional: Vec<String>,
}

impl ParsedOptions {
    /// Parsed value for a canonical option name.
    pub fn value(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    /// Whether the canonical option `name` appeared in the input.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Arguments that did not belong to any option.
    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    /// Parsed option values keyed by canonical name.
    pub fn values(&self) -> &HashMap<String, OptionValue> {
        &self.values
    }

    /// Whether `--help` (or one of its aliases) was given a truthy value.
    pub fn help_requested(&self) -> bool {
        self.values
            .get(HELP_OPTION)
            .is_some_and(OptionValue::is_truthy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> OptionValue {
        OptionValue::Text(value.to_string())
    }

    #[test]
    fn long_option_with_inline_value_and_positional() {
        let registry = OptionRegistry::new();
        let parsed = registry.parse(["prog", "--name=Alice", "extra"], &[]);

        assert_eq!(parsed.values().len(), 1);
        assert_eq!(parsed.value("name"), Some(&text("Alice")));
        assert_eq!(parsed.positional(), ["extra".to_string()]);
    }

    #[test]
    fn short_option_consumes_following_value() {
        let registry = OptionRegistry::new();
        let parsed = registry.parse(["prog", "-v", "file.txt"], &[]);

        assert_eq!(parsed.value("v"), Some(&text("file.txt")));
        assert!(parsed.positional().is_empty());
    }

    #[test]
    fn empty_inline_value_is_empty_string() {
        let registry = OptionRegistry::new();
        let parsed = registry.parse(["prog", "--foo="], &[]);

        assert_eq!(parsed.value("foo"), Some(&text("")));
    }

    #[test]
    fn inline_value_splits_on_first_equals() {
        let registry = OptionRegistry::new();
        let parsed = registry.parse(["prog", "--filter=a=b"], &[]);

        assert_eq!(parsed.value("filter"), Some(&text("a=b")));
    }

    #[test]
    fn no_value_options_never_consume_next_token() {
        let registry = OptionRegistry::new();
        let parsed = registry.parse(["prog", "--verbose", "input.txt"], &["verbose"]);

        assert_eq!(parsed.value("verbose"), Some(&OptionValue::Flag));
        assert_eq!(parsed.positional(), ["input.txt".to_string()]);
    }

    #[test]
    fn option_followed_by_option_is_flag() {
        let registry = OptionRegistry::new();
        let parsed = registry.parse(["prog", "--dry-run", "--level", "3"], &[]);

        assert_eq!(parsed.value("dry-run"), Some(&OptionValue::Flag));
        assert_eq!(parsed.value("level"), Some(&text("3")));
    }

    #[test]
    fn trailing_option_is_flag() {
        let registry = OptionRegistry::new();
        let parsed = registry.parse(["prog", "-q"], &[]);

        assert_eq!(parsed.value("q"), Some(&OptionValue::Flag));
    }

    #[test]
    fn later_occurrence_overwrites_earlier() {
        let registry = OptionRegistry::new();
        let parsed = registry.parse(["prog", "--name", "a", "--name", "b"], &[]);

        assert_eq!(parsed.value("name"), Some(&text("b")));
    }

    #[test]
    fn positional_order_is_preserved() {
        let registry = OptionRegistry::new();
        let parsed = registry.parse(
            ["prog", "one", "--flag", "--key=v", "two", "-x", "--", "three"],
            &["flag"],
        );

        // "-x" is followed by "--", so it stays a flag and "--" is skipped.
        assert_eq!(
            parsed.positional(),
            ["one".to_string(), "two".to_string(), "three".to_string()]
        );
    }

    #[test]
    fn bare_dashes_are_skipped() {
        let registry = OptionRegistry::new();
        let parsed = registry.parse(["prog", "-", "--", "file"], &[]);

        assert!(parsed.values().is_empty());
        assert_eq!(parsed.positional(), ["file".to_string()]);
    }

    #[test]
    fn help_alias_resolves_and_is_flag() {
        let registry = OptionRegistry::new();
        let parsed = registry.parse(["prog", "-h", "topic"], &[]);

        assert!(parsed.help_requested());
        assert_eq!(parsed.value("help"), Some(&OptionValue::Flag));
        assert!(parsed.value("h").is_none());
        assert_eq!(parsed.positional(), ["topic".to_string()]);
    }

    #[test]
    fn help_scenario_records_no_positionals() {
        let registry = OptionRegistry::new();
        let parsed = registry.parse(["prog", "-h"], &[]);

        assert!(parsed.help_requested());
        assert!(parsed.positional().is_empty());
    }

    #[test]
    fn aliases_are_stored_under_canonical_name() {
        let mut registry = OptionRegistry::new();
        assert!(registry.add_alias("name", "n"));

        let short = registry.parse(["prog", "-n", "Bob"], &[]);
        let long = registry.parse(["prog", "--name", "Bob"], &[]);

        assert_eq!(short, long);
        assert!(short.value("n").is_none());
        assert_eq!(registry.get(&short, "n"), registry.get(&short, "name"));
        assert_eq!(registry.get(&long, "n"), Some(text("Bob")));
    }

    #[test]
    fn no_value_list_is_resolved_through_aliases() {
        let mut registry = OptionRegistry::new();
        registry.add_alias("verbose", "V");

        let parsed = registry.parse(["prog", "--verbose", "file"], &["V"]);
        assert_eq!(parsed.value("verbose"), Some(&OptionValue::Flag));

        let parsed = registry.parse(["prog", "-V", "file"], &["verbose"]);
        assert_eq!(parsed.value("verbose"), Some(&OptionValue::Flag));
        assert_eq!(parsed.positional(), ["file".to_string()]);
    }

    #[test]
    fn alias_collision_returns_false_without_overwrite() {
        let mut registry = OptionRegistry::new();
        assert!(registry.add_alias("name", "n"));
        assert!(registry.add_alias("name", "n"));
        assert!(!registry.add_alias("number", "n"));
        assert!(!registry.add_alias("host", "h"));

        assert_eq!(registry.resolve("n"), "name");
        assert_eq!(registry.resolve("h"), "help");
    }

    #[test]
    fn get_falls_back_to_default_then_absent() {
        let mut registry = OptionRegistry::new();
        registry.set_default("name", "World");
        registry.add_alias("name", "n");

        let parsed = registry.parse(["prog"], &[]);
        assert_eq!(registry.get(&parsed, "name"), Some(text("World")));
        assert_eq!(registry.get(&parsed, "n"), Some(text("World")));
        assert_eq!(registry.get(&parsed, "missing"), None);

        let parsed = registry.parse(["prog", "-n", "Ann"], &[]);
        assert_eq!(registry.get(&parsed, "name"), Some(text("Ann")));
    }

    #[test]
    fn all_merges_defaults_under_parsed_values() {
        let mut registry = OptionRegistry::new();
        registry.set_default("name", "World");
        registry.set_default("color", "auto");

        let parsed = registry.parse(["prog", "--color=never", "-q"], &[]);
        let all = registry.all(&parsed);

        assert_eq!(all.get("name"), Some(&text("World")));
        assert_eq!(all.get("color"), Some(&text("never")));
        assert_eq!(all.get("q"), Some(&OptionValue::Flag));
    }

    #[test]
    fn specs_follow_registration_order() {
        let mut registry = OptionRegistry::new();
        registry.set_description("output", "Where to write");
        registry.set_description("input", "What to read");
        registry.set_description("output", "Where to write results");
        registry.set_default("output", "-");
        registry.add_alias("output", "o");

        let specs = registry.specs();
        let names: Vec<&str> = specs.iter().map(|spec| spec.name.as_str()).collect();
        assert_eq!(names, ["output", "input"]);
        assert_eq!(specs[0].aliases, ["o".to_string()]);
        assert_eq!(specs[0].default.as_deref(), Some("-"));
        assert_eq!(specs[0].description, "Where to write results");
    }

    #[cfg(unix)]
    #[test]
    fn invalid_utf8_arguments_are_replaced_not_rejected() {
        use std::os::unix::ffi::OsStringExt;

        let args = lossy_args([
            OsString::from("prog"),
            OsString::from_vec(vec![b'-', b'-', b'n', b'=', 0xff]),
            OsString::from_vec(vec![0xfe, b'x']),
        ]);
        assert_eq!(args, ["prog", "--n=\u{FFFD}", "\u{FFFD}x"]);

        let mut registry = OptionRegistry::new();
        registry.add_alias("name", "n");
        let parsed = registry.parse(&args, &[]);
        assert_eq!(parsed.value("name"), Some(&text("\u{FFFD}")));
        assert_eq!(parsed.positional(), ["\u{FFFD}x".to_string()]);
    }

    #[test]
    fn aliases_keep_registration_order() {
        let mut registry = OptionRegistry::new();
        registry.add_alias("verbose", "v");
        registry.add_alias("verbose", "V");
        registry.add_alias("verbose", "loud");
        registry.add_alias("help", "?");

        assert_eq!(registry.aliases_of("verbose"), ["v", "V", "loud"]);
        assert_eq!(registry.aliases_of("help"), ["h", "?"]);
        assert_eq!(registry.resolve("loud"), "verbose");
    }

    #[test]
    fn truthiness_of_values() {
        assert!(OptionValue::Flag.is_truthy());
        assert!(text("yes").is_truthy());
        assert!(!text("").is_truthy());
        assert!(!text("0").is_truthy());
    }
}
