use serde::Serialize;
use serde_json::Value;

use crate::{
    error::PlannerError,
    result::Result,
    updater::{
        Updater,
        json_path::{self, Segment},
    },
    version::Version,
};

/// Indentation of the first indented line, two spaces by default.
fn detect_indent(content: &str) -> String {
    content
        .lines()
        .skip(1)
        .find_map(|line| {
            let indent: String = line
                .chars()
                .take_while(|c| *c == ' ' || *c == '\t')
                .collect();
            (!indent.is_empty()).then_some(indent)
        })
        .unwrap_or_else(|| "  ".to_string())
}

/// Pretty prints `value` keeping the indentation and trailing newline
/// style of `original`.
pub(crate) fn to_json_string(value: &Value, original: &str) -> Result<String> {
    let indent = detect_indent(original);
    let mut buffer = Vec::new();
    let formatter =
        serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;

    let mut output = String::from_utf8(buffer)
        .map_err(|err| PlannerError::updater(err.to_string()))?;

    if original.is_empty() || original.ends_with('\n') {
        output.push('\n');
    }

    Ok(output)
}

/// Calls `visit` on every value selected by `segments`.
fn select_mut(
    value: &mut Value,
    segments: &[Segment],
    visit: &mut dyn FnMut(&mut Value),
) {
    let Some((segment, rest)) = segments.split_first() else {
        visit(value);
        return;
    };

    match segment {
        Segment::Key(key) => {
            if let Some(child) = value.get_mut(key.as_str()) {
                select_mut(child, rest, visit);
            }
        }
        Segment::Index(index) => {
            if let Some(child) = value.get_mut(*index) {
                select_mut(child, rest, visit);
            }
        }
        Segment::Wildcard => match value {
            Value::Object(map) => {
                for child in map.values_mut() {
                    select_mut(child, rest, visit);
                }
            }
            Value::Array(items) => {
                for child in items.iter_mut() {
                    select_mut(child, rest, visit);
                }
            }
            _ => {}
        },
        Segment::Descendant => {
            select_mut(value, rest, visit);
            match value {
                Value::Object(map) => {
                    for child in map.values_mut() {
                        select_mut(child, segments, visit);
                    }
                }
                Value::Array(items) => {
                    for child in items.iter_mut() {
                        select_mut(child, segments, visit);
                    }
                }
                _ => {}
            }
        }
    }
}

/// Replaces string values selected by a JSONPath expression.
#[derive(Debug, Clone)]
pub struct GenericJson {
    json_path: String,
    segments: Vec<Segment>,
    version: Version,
}

impl GenericJson {
    pub fn new(json_path: impl Into<String>, version: Version) -> Result<Self> {
        let json_path = json_path.into();
        let segments = json_path::parse(&json_path)?;
        Ok(Self {
            json_path,
            segments,
            version,
        })
    }

    pub fn json_path(&self) -> &str {
        &self.json_path
    }
}

impl Updater for GenericJson {
    fn update_content(&self, content: Option<&str>) -> Result<String> {
        let content = content.unwrap_or_default();
        let mut document: Value = serde_json::from_str(content)?;
        let version = self.version.to_string();

        select_mut(&mut document, &self.segments, &mut |value| {
            if value.is_string() {
                *value = Value::String(version.clone());
            }
        });

        to_json_string(&document, content)
    }
}
