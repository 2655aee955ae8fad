use std::collections::HashMap;

use crate::{
    error::PlannerError,
    result::Result,
    versioning::{VersioningOptions, VersioningStrategy, VersioningStrategyType},
};

/// Builds a versioning strategy from shared options.
pub type VersioningConstructor =
    Box<dyn Fn(&VersioningOptions) -> Box<dyn VersioningStrategy> + Send + Sync>;

/// String keyed strategy constructors. Pre-populated with every
/// [`VersioningStrategyType`]; callers may register additional keys.
pub struct VersioningRegistry {
    constructors: HashMap<String, VersioningConstructor>,
}

impl Default for VersioningRegistry {
    fn default() -> Self {
        let mut registry = Self {
            constructors: HashMap::new(),
        };

        for kind in VersioningStrategyType::ALL {
            registry.register(kind.to_string(), move |options| kind.build(options));
        }

        registry
    }
}

impl VersioningRegistry {
    /// Registers (or replaces) the constructor for `key`.
    pub fn register<F>(&mut self, key: impl Into<String>, constructor: F)
    where
        F: Fn(&VersioningOptions) -> Box<dyn VersioningStrategy>
            + Send
            + Sync
            + 'static,
    {
        self.constructors.insert(key.into(), Box::new(constructor));
    }

    /// Removes a registered key, returning whether it existed.
    pub fn unregister(&mut self, key: &str) -> bool {
        self.constructors.remove(key).is_some()
    }

    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> =
            self.constructors.keys().map(String::as_str).collect();
        keys.sort();
        keys
    }

    pub fn build(
        &self,
        key: &str,
        options: &VersioningOptions,
    ) -> Result<Box<dyn VersioningStrategy>> {
        let constructor = self.constructors.get(key).ok_or_else(|| {
            PlannerError::configuration(format!(
                "unknown versioning strategy: {key}"
            ))
        })?;

        Ok(constructor(options))
    }
}

impl std::fmt::Debug for VersioningRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersioningRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}
