use crate::check::Check;
use crate::{Result, VoucherError};
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a fresh check instance
pub type CheckFactory = Arc<dyn Fn() -> Box<dyn Check> + Send + Sync>;

/// Named check constructors.
///
/// Built once at startup and shared read-only with the engine.
#[derive(Clone, Default)]
pub struct CheckFactories {
    factories: HashMap<String, CheckFactory>,
}

impl CheckFactories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `name`; the first registration of a name wins
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Check> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.contains_key(&name) {
            debug!("Check {} is already registered, ignoring", name);
            return;
        }
        self.factories.insert(name, Arc::new(factory));
    }

    pub fn is_check_factory_registered(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// One new instance per requested name.
    ///
    /// Fails on the first name that is not registered.
    pub fn get_new_checks<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<HashMap<String, Box<dyn Check>>> {
        let mut checks = HashMap::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let factory = self
                .factories
                .get(name)
                .ok_or_else(|| VoucherError::UnknownCheck(name.to_string()))?;
            checks.insert(name.to_string(), factory());
        }
        Ok(checks)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for CheckFactories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckFactories")
            .field("checks", &self.names())
            .finish()
    }
}
