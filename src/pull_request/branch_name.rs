use std::fmt::Display;

/// Prefix of every release pull request branch.
pub const BRANCH_PREFIX: &str = "releasaurus--branches--";
const COMPONENT_SEPARATOR: &str = "--components--";

/// Head branch of a release pull request:
/// `releasaurus--branches--<target>[--components--<component>]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchName {
    pub target_branch: String,
    pub component: Option<String>,
}

impl BranchName {
    pub fn new(target_branch: impl Into<String>, component: Option<String>) -> Self {
        Self {
            target_branch: target_branch.into(),
            component: component.filter(|c| !c.is_empty()),
        }
    }

    pub fn parse(branch: &str) -> Option<Self> {
        let rest = branch.strip_prefix(BRANCH_PREFIX)?;

        let (target, component) = match rest.split_once(COMPONENT_SEPARATOR) {
            Some((target, component)) => (target, Some(component.to_string())),
            None => (rest, None),
        };

        (!target.is_empty()).then(|| Self::new(target, component))
    }
}

impl Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{BRANCH_PREFIX}{}", self.target_branch)?;
        if let Some(component) = &self.component {
            write!(f, "{COMPONENT_SEPARATOR}{component}")?;
        }
        Ok(())
    }
}
