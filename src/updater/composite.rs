use log::*;
use std::collections::HashMap;

use crate::{
    result::Result,
    updater::{Update, Updater},
};

/// Chains several updaters over the same file, feeding each one's output
/// into the next in declared order.
#[derive(Debug, Default)]
pub struct CompositeUpdater {
    updaters: Vec<Box<dyn Updater>>,
}

impl CompositeUpdater {
    pub fn new(updaters: Vec<Box<dyn Updater>>) -> Self {
        Self { updaters }
    }

    pub fn updaters(&self) -> &[Box<dyn Updater>] {
        &self.updaters
    }

    pub fn updaters_mut(&mut self) -> &mut [Box<dyn Updater>] {
        &mut self.updaters
    }
}

impl Updater for CompositeUpdater {
    fn update_content(&self, content: Option<&str>) -> Result<String> {
        let mut current = content.unwrap_or_default().to_string();

        for updater in self.updaters.iter() {
            current = updater.update_content(Some(&current))?;
        }

        Ok(current)
    }
}

/// Merges updates by path. Distinct paths keep their first-seen order;
/// paths seen more than once become a single [`CompositeUpdater`] update
/// whose `create_if_missing` and cached contents come from the first one.
pub fn merge_updates(updates: Vec<Update>) -> Vec<Update> {
    let mut groups: Vec<Vec<Update>> = vec![];
    let mut index: HashMap<String, usize> = HashMap::new();

    for update in updates {
        match index.get(&update.path) {
            Some(&idx) => groups[idx].push(update),
            None => {
                index.insert(update.path.clone(), groups.len());
                groups.push(vec![update]);
            }
        }
    }

    groups
        .into_iter()
        .filter_map(|mut group| {
            if group.len() == 1 {
                return group.pop();
            }

            let mut updates = group.into_iter();
            let first = updates.next()?;
            debug!("merging updates for {}", first.path);

            let mut updaters = vec![first.updater];
            updaters.extend(updates.map(|update| update.updater));

            Some(Update {
                path: first.path,
                create_if_missing: first.create_if_missing,
                updater: Box::new(CompositeUpdater::new(updaters)),
                cached_file_contents: first.cached_file_contents,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::FileContents;

    /// Appends a marker so chain order is observable.
    #[derive(Debug)]
    struct Append(&'static str);

    impl Updater for Append {
        fn update_content(&self, content: Option<&str>) -> Result<String> {
            Ok(format!("{}{}", content.unwrap_or("<none>"), self.0))
        }
    }

    #[test]
    fn test_composite_chains_in_order_with_empty_seed() {
        let composite = CompositeUpdater::new(vec![
            Box::new(Append("a")),
            Box::new(Append("b")),
        ]);
        assert_eq!(composite.update_content(None).unwrap(), "ab");
        assert_eq!(composite.update_content(Some("x")).unwrap(), "xab");
    }

    #[test]
    fn test_merge_updates_groups_by_path() {
        let updates = vec![
            Update::creating("path1", Append("1"))
                .with_cached_contents(FileContents::new("cached")),
            Update::new("path2", Append("2")),
            Update::new("path1", Append("3")),
            Update::new("path1", Append("4")),
        ];

        let merged = merge_updates(updates);
        assert_eq!(merged.len(), 2);

        assert_eq!(merged[0].path, "path1");
        assert!(merged[0].create_if_missing);
        assert_eq!(
            merged[0].cached_file_contents,
            Some(FileContents::new("cached"))
        );
        let composite = merged[0].updater_as::<CompositeUpdater>().unwrap();
        assert_eq!(composite.updaters().len(), 3);
        assert_eq!(merged[0].updater.update_content(Some("")).unwrap(), "134");

        assert_eq!(merged[1].path, "path2");
        assert!(merged[1].updater_as::<Append>().is_some());
        assert_eq!(merged[1].updater.update_content(Some("")).unwrap(), "2");
    }

    #[test]
    fn test_merge_updates_is_noop_for_disjoint_paths() {
        let merged = merge_updates(vec![
            Update::new("a", Append("1")),
            Update::new("b", Append("2")),
        ]);
        assert_eq!(
            merged.iter().map(|u| u.path.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        assert!(merged.iter().all(|u| u.updater_as::<Append>().is_some()));
    }
}
