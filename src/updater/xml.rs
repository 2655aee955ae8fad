//! Span based XML scanning shared by the POM and generic XML updaters.
//!
//! Rather than re-serialising the document, updaters record the byte range
//! of each text node and splice replacements into the original content so
//! formatting, comments and ordering are preserved exactly.
use quick_xml::{Reader, events::Event};
use std::ops::Range;

use crate::result::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct XmlElement {
    pub name: String,
    /// Byte offset where the element's start tag begins; unique per element.
    pub start: usize,
}

/// A non-blank text node and the elements enclosing it.
#[derive(Debug, Clone)]
pub(crate) struct XmlText {
    pub path: Vec<XmlElement>,
    pub span: Range<usize>,
    pub text: String,
}

impl XmlText {
    /// True when the enclosing element names are exactly `names`.
    pub fn is_at(&self, names: &[&str]) -> bool {
        self.path.len() == names.len()
            && self.path.iter().zip(names).all(|(el, name)| el.name == *name)
    }

    /// True when the enclosing element names start with `names`.
    pub fn is_under(&self, names: &[&str]) -> bool {
        self.path.len() > names.len()
            && self.path.iter().zip(names).all(|(el, name)| el.name == *name)
    }

    pub fn element_name(&self) -> &str {
        self.path.last().map(|el| el.name.as_str()).unwrap_or_default()
    }
}

fn locate(content: &str, position: usize, raw: &str) -> usize {
    if content.get(position..position + raw.len()) == Some(raw) {
        return position;
    }

    content
        .get(position..)
        .and_then(|rest| rest.find(raw))
        .map(|offset| position + offset)
        .unwrap_or(position)
}

/// Collects every non-blank text node in document order.
pub(crate) fn text_nodes(content: &str) -> Result<Vec<XmlText>> {
    let mut reader = Reader::from_str(content);
    let mut stack: Vec<XmlElement> = vec![];
    let mut nodes = vec![];

    loop {
        let position = reader.buffer_position() as usize;

        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref())
                    .to_string();
                stack.push(XmlElement {
                    name,
                    start: position,
                });
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Text(e) => {
                let raw = std::str::from_utf8(&e)?;
                let trimmed = raw.trim();
                if trimmed.is_empty() || stack.is_empty() {
                    continue;
                }

                let start = locate(content, position, raw)
                    + (raw.len() - raw.trim_start().len());

                nodes.push(XmlText {
                    path: stack.clone(),
                    span: start..start + trimmed.len(),
                    text: trimmed.to_string(),
                });
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(nodes)
}

/// Applies non-overlapping replacements to `content`.
pub(crate) fn splice(
    content: &str,
    mut replacements: Vec<(Range<usize>, String)>,
) -> String {
    replacements.sort_by_key(|(range, _)| std::cmp::Reverse(range.start));

    let mut result = content.to_string();
    for (range, value) in replacements {
        if result.get(range.clone()).is_some() {
            result.replace_range(range, &value);
        }
    }

    result
}
