//! A small JSONPath subset shared by the JSON and TOML updaters:
//! `$.a.b`, `$['a'].b`, `$.list[0]`, `$.list[*].version` and `$..version`.
use crate::{error::PlannerError, result::Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Key(String),
    Index(usize),
    Wildcard,
    /// Matches the following key at any depth.
    Descendant,
}

pub(crate) fn parse(path: &str) -> Result<Vec<Segment>> {
    let invalid = || PlannerError::configuration(format!("invalid jsonpath: {path}"));

    let rest = path.strip_prefix('$').ok_or_else(invalid)?;
    let chars: Vec<char> = rest.chars().collect();
    let mut segments = vec![];
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '.' if chars.get(i + 1) == Some(&'.') => {
                segments.push(Segment::Descendant);
                i += 1;
            }
            '.' => {
                i += 1;
                let start = i;
                while i < chars.len() && chars[i] != '.' && chars[i] != '[' {
                    i += 1;
                }
                let key: String = chars[start..i].iter().collect();
                match key.as_str() {
                    "" => return Err(invalid()),
                    "*" => segments.push(Segment::Wildcard),
                    _ => segments.push(Segment::Key(key)),
                }
            }
            '[' => {
                let end = chars[i..]
                    .iter()
                    .position(|c| *c == ']')
                    .map(|offset| i + offset)
                    .ok_or_else(invalid)?;
                let inner: String = chars[i + 1..end].iter().collect();
                let inner = inner.trim();

                if inner == "*" {
                    segments.push(Segment::Wildcard);
                } else if let Some(key) = inner
                    .strip_prefix('\'')
                    .and_then(|s| s.strip_suffix('\''))
                    .or_else(|| {
                        inner.strip_prefix('"').and_then(|s| s.strip_suffix('"'))
                    })
                {
                    segments.push(Segment::Key(key.to_string()));
                } else {
                    let index = inner.parse::<usize>().map_err(|_| invalid())?;
                    segments.push(Segment::Index(index));
                }
                i = end + 1;
            }
            _ => return Err(invalid()),
        }
    }

    if matches!(segments.last(), Some(Segment::Descendant)) {
        return Err(invalid());
    }

    Ok(segments)
}
