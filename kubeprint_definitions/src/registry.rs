use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

use super::structs::{AddonMetadata, AddonSpec, ArchType};
use super::{ErrorKind, Result};

/// Metadata registry for the addons of a single blueprint build
///
/// Maps an addon identity to its dependencies, conflicts, capacity ordering
/// and architecture support. It is passed explicitly into every build,
/// so two builds never see each others registrations.
#[derive(Clone, Debug, Default)]
pub struct AddonRegistry {
    entries: BTreeMap<String, AddonMetadata>,
    // registration order, used when listing
    order: Vec<String>,
}

// Serializes as a map in registration order
impl Serialize for AddonRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.order.len()))?;
        for key in &self.order {
            if let Some(meta) = self.entries.get(key) {
                map.serialize_entry(key, meta)?;
            }
        }
        map.end()
    }
}

impl AddonRegistry {
    pub fn new() -> Self {
        AddonRegistry::default()
    }

    /// Build a registry from the addons of a blueprint file
    pub fn from_specs(specs: &[AddonSpec]) -> Result<AddonRegistry> {
        let mut reg = AddonRegistry::new();
        for s in specs {
            reg.register(&s.name, s.metadata())?;
        }
        Ok(reg)
    }

    /// Register metadata under an addon key
    ///
    /// Keys are write-once: registering the same key twice is an error.
    pub fn register(&mut self, key: &str, meta: AddonMetadata) -> Result<()> {
        if self.entries.contains_key(key) {
            return Err(ErrorKind::DuplicateAddon(key.to_string()).into());
        }
        trace!("Registering add-on {}: {:?}", key, meta);
        self.order.push(key.to_string());
        self.entries.insert(key.to_string(), meta);
        Ok(())
    }

    pub fn lookup(&self, key: &str) -> Option<&AddonMetadata> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Registered keys in registration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a registered addon supports an architecture
    pub fn supports(&self, key: &str, arch: ArchType) -> Result<bool> {
        match self.lookup(key) {
            Some(meta) => Ok(meta.supports_arch(arch)),
            None => Err(ErrorKind::UnknownAddon(key.to_string()).into()),
        }
    }

    /// Validate that an addon can run on the cluster architecture
    ///
    /// Unsupported addons fail in strict mode and only warn otherwise.
    pub fn validate_architecture(&self, key: &str, arch: ArchType, strict: bool) -> Result<()> {
        if self.supports(key, arch)? {
            return Ok(());
        }
        if strict {
            return Err(ErrorKind::UnsupportedArchitecture(key.to_string(), arch.to_string()).into());
        }
        warn!("add-on {} is not known to support {} - deploying anyway", key, arch);
        Ok(())
    }

    /// The registry as yaml, in registration order
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Print the registry to stdout
    pub fn print(&self) -> Result<()> {
        println!("{}", self.to_yaml()?);
        Ok(())
    }
}
