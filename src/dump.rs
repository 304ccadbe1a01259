//! Recursive, human readable dumps of structured values.
use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use crate::{
    colors::{Color, colorize},
    error::ConsoleError,
};

const DUMP_INDENT: &str = "\t";

/// Renders values as an indented tree with type annotations.
///
/// ```text
/// Object[2]
///     name => (string[5]) "Alice"
///     tags => Array[1]
///         0 => (int) 7
/// ```
#[derive(Debug, Clone, Default)]
pub struct Dumper {
    /// Paint type annotations and keys.
    pub colors: bool,
    /// Object keys that are left out of the dump.
    pub ignored_keys: BTreeSet<String>,
}

impl Dumper {
    pub fn new(colors: bool) -> Self {
        Self {
            colors,
            ignored_keys: BTreeSet::new(),
        }
    }

    /// Skips `key` wherever it appears in an object.
    pub fn ignore_key(mut self, key: impl Into<String>) -> Self {
        self.ignored_keys.insert(key.into());
        self
    }

    /// Dumps any serializable value.
    pub fn dump_value<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, ConsoleError> {
        Ok(self.dump(&serde_json::to_value(value)?))
    }

    /// Dumps a JSON value.
    pub fn dump(&self, value: &Value) -> String {
        let mut out = String::new();
        self.write_value(&mut out, value, "");
        out
    }

    fn paint(&self, text: &str, color: Color) -> String {
        colorize(text, self.colors.then_some(color))
    }

    fn write_value(&self, out: &mut String, value: &Value, indent: &str) {
        match value {
            Value::Null => out.push_str(&self.paint("NULL", Color::Gray)),
            Value::Bool(flag) => {
                out.push_str(&self.paint("(boolean)", Color::White));
                out.push_str(if *flag { " true" } else { " false" });
            }
            Value::Number(number) if number.is_f64() => {
                out.push_str(&self.paint("(double/float)", Color::LightPurple));
                out.push_str(&format!(" {number}"));
            }
            Value::Number(number) => {
                out.push_str(&self.paint("(int)", Color::LightCyan));
                out.push_str(&format!(" {number}"));
            }
            Value::String(text) => {
                out.push_str(&self.paint("(string[", Color::Green));
                out.push_str(&self.paint(&text.len().to_string(), Color::LightGreen));
                out.push_str(&self.paint("])", Color::Green));
                out.push_str(&format!(" \"{}\"", text.trim()));
            }
            Value::Array(items) => {
                out.push_str(&self.header("Array", items.len(), Color::Blue, Color::LightBlue));
                let child_indent = format!("{indent}{DUMP_INDENT}");
                for (index, item) in items.iter().enumerate() {
                    self.write_entry(out, &index.to_string(), item, &child_indent);
                }
            }
            Value::Object(map) => {
                out.push_str(&self.header("Object", map.len(), Color::Yellow, Color::Brown));
                let child_indent = format!("{indent}{DUMP_INDENT}");
                for (key, item) in map {
                    if self.ignored_keys.contains(key) {
                        continue;
                    }
                    self.write_entry(out, key, item, &child_indent);
                }
            }
        }
    }

    fn header(&self, kind: &str, len: usize, color: Color, count_color: Color) -> String {
        format!(
            "{}{}{}",
            self.paint(&format!("{kind}["), color),
            self.paint(&len.to_string(), count_color),
            self.paint("]", color)
        )
    }

    fn write_entry(&self, out: &mut String, key: &str, value: &Value, indent: &str) {
        out.push('\n');
        out.push_str(indent);
        out.push_str(&self.paint(key, Color::LightGray));
        out.push_str(" => ");
        self.write_value(out, value, indent);
    }
}
