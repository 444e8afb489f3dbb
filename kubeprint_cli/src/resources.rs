use std::collections::BTreeMap;

use super::construct::{Construct, Stack};
use super::{ErrorKind, Result};

/// Behavioural trait for something that provides a named blueprint resource
///
/// Providers see every resource provided before them.
pub trait ResourceProvider {
    fn provide(&self, ctx: &ResourceContext) -> Result<Construct>;
}

/// Named resources of a blueprint build
pub struct ResourceContext {
    stack: Stack,
    resources: BTreeMap<String, Construct>,
}

impl ResourceContext {
    pub fn new(stack: Stack) -> Self {
        ResourceContext {
            stack,
            resources: BTreeMap::new(),
        }
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// Provide a resource once and store it by name
    pub fn add(&mut self, name: &str, provider: &dyn ResourceProvider) -> Result<Construct> {
        if self.resources.contains_key(name) {
            return Err(ErrorKind::DuplicateResource(name.to_string(), self.stack.name().to_string()).into());
        }
        debug!("Providing resource {} to {}", name, self.stack.name());
        let res = provider.provide(self)?;
        self.resources.insert(name.to_string(), res.clone());
        Ok(res)
    }

    pub fn get(&self, name: &str) -> Option<&Construct> {
        self.resources.get(name)
    }

    /// Get a resource that must have been provided
    pub fn get_required(&self, name: &str) -> Result<Construct> {
        match self.resources.get(name) {
            Some(c) => Ok(c.clone()),
            None => Err(ErrorKind::MissingResource(name.to_string(), self.stack.name().to_string()).into()),
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.resources.keys().cloned().collect()
    }
}
