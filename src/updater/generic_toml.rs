use toml_edit::{DocumentMut, Item, Value};

use crate::{
    result::Result,
    updater::{
        Updater,
        json_path::{self, Segment},
    },
    version::Version,
};

enum Child {
    Key(String),
    Index(usize),
}

fn children(item: &Item) -> Vec<Child> {
    match item {
        Item::Table(table) => {
            table.iter().map(|(k, _)| Child::Key(k.to_string())).collect()
        }
        Item::Value(Value::InlineTable(table)) => {
            table.iter().map(|(k, _)| Child::Key(k.to_string())).collect()
        }
        Item::ArrayOfTables(array) => (0..array.len()).map(Child::Index).collect(),
        Item::Value(Value::Array(array)) => {
            (0..array.len()).map(Child::Index).collect()
        }
        _ => vec![],
    }
}

fn child_mut<'a>(item: &'a mut Item, child: &Child) -> Option<&'a mut Item> {
    match child {
        Child::Key(key) => item.get_mut(key.as_str()),
        Child::Index(index) => item.get_mut(*index),
    }
}

fn select_mut(
    item: &mut Item,
    segments: &[Segment],
    visit: &mut dyn FnMut(&mut Item),
) {
    let Some((segment, rest)) = segments.split_first() else {
        visit(item);
        return;
    };

    match segment {
        Segment::Key(key) => {
            if let Some(child) = item.get_mut(key.as_str()) {
                select_mut(child, rest, visit);
            }
        }
        Segment::Index(index) => {
            if let Some(child) = item.get_mut(*index) {
                select_mut(child, rest, visit);
            }
        }
        Segment::Wildcard => {
            for child in children(item) {
                if let Some(child) = child_mut(item, &child) {
                    select_mut(child, rest, visit);
                }
            }
        }
        Segment::Descendant => {
            select_mut(item, rest, visit);
            for child in children(item) {
                if let Some(child) = child_mut(item, &child) {
                    select_mut(child, segments, visit);
                }
            }
        }
    }
}

/// Replaces string values in a TOML document selected by a JSONPath
/// expression, keeping comments and formatting intact.
#[derive(Debug, Clone)]
pub struct GenericToml {
    segments: Vec<Segment>,
    version: Version,
}

impl GenericToml {
    pub fn new(json_path: &str, version: Version) -> Result<Self> {
        Ok(Self {
            segments: json_path::parse(json_path)?,
            version,
        })
    }
}

impl Updater for GenericToml {
    fn update_content(&self, content: Option<&str>) -> Result<String> {
        let mut document = content.unwrap_or_default().parse::<DocumentMut>()?;
        let version = self.version.to_string();

        select_mut(document.as_item_mut(), &self.segments, &mut |item| {
            if let Some(value) = item.as_value_mut()
                && value.is_str()
            {
                let decor = value.decor().clone();
                *value = Value::from(version.as_str());
                *value.decor_mut() = decor;
            }
        });

        Ok(document.to_string())
    }
}
