use crate::{
    error::PlannerError,
    result::Result,
    updater::{
        Updater,
        xml::{splice, text_nodes},
    },
    version::Version,
};

/// Replaces the text of elements selected by a simple XPath.
///
/// Supports absolute element paths (`/project/properties/app.version`) and
/// descendant paths (`//app.version`).
#[derive(Debug, Clone)]
pub struct GenericXml {
    xpath: String,
    version: Version,
}

impl GenericXml {
    pub fn new(xpath: impl Into<String>, version: Version) -> Result<Self> {
        let xpath = xpath.into();
        if !xpath.starts_with('/') || xpath.contains('[') || xpath.contains('@')
        {
            return Err(PlannerError::configuration(format!(
                "unsupported xpath expression: {xpath}"
            )));
        }

        Ok(Self { xpath, version })
    }

    fn selector(&self) -> (bool, Vec<&str>) {
        match self.xpath.strip_prefix("//") {
            Some(rest) => (true, rest.split('/').collect()),
            None => (false, self.xpath[1..].split('/').collect()),
        }
    }
}

impl Updater for GenericXml {
    fn update_content(&self, content: Option<&str>) -> Result<String> {
        let content = content.unwrap_or_default();
        let (descendant, names) = self.selector();

        let replacements = text_nodes(content)?
            .into_iter()
            .filter(|node| {
                if descendant {
                    node.path.len() >= names.len()
                        && node.path[node.path.len() - names.len()..]
                            .iter()
                            .zip(&names)
                            .all(|(el, name)| el.name == *name)
                } else {
                    node.is_at(&names)
                }
            })
            .map(|node| (node.span, self.version.to_string()))
            .collect();

        Ok(splice(content, replacements))
    }
}
