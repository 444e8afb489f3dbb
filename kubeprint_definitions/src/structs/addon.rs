use super::{verify_name, ArchType, Result};

/// Ordering metadata attached to an addon descriptor
///
/// These are read by the orchestrator when the addon is deployed.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AddonMetadata {
    /// Addons that must be scheduled before this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependsOn: Vec<String>,
    /// Addons that must not be part of the same blueprint before this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflictsWith: Vec<String>,
    /// Whether node capacity must wait for this addon
    #[serde(default)]
    pub precedeCapacity: bool,
    /// Architectures supported - all of them when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architectures: Option<Vec<ArchType>>,
}

impl AddonMetadata {
    pub fn depends_on<S: Into<String>>(mut self, addon: S) -> Self {
        self.dependsOn.push(addon.into());
        self
    }

    pub fn conflicts_with<S: Into<String>>(mut self, addon: S) -> Self {
        self.conflictsWith.push(addon.into());
        self
    }

    pub fn precede_capacity(mut self) -> Self {
        self.precedeCapacity = true;
        self
    }

    pub fn supports(mut self, archs: Vec<ArchType>) -> Self {
        self.architectures = Some(archs);
        self
    }

    /// Whether an addon with this metadata can run on `arch`
    pub fn supports_arch(&self, arch: ArchType) -> bool {
        match &self.architectures {
            Some(archs) => archs.contains(&arch),
            None => true,
        }
    }

    pub fn verify(&self, addon: &str) -> Result<()> {
        for d in &self.dependsOn {
            verify_name("dependency", d)?;
            if d == addon {
                bail!("add-on {} cannot depend on itself", addon);
            }
            if self.conflictsWith.contains(d) {
                bail!("add-on {} both depends on and conflicts with {}", addon, d);
            }
        }
        for c in &self.conflictsWith {
            verify_name("conflict", c)?;
            if c == addon {
                bail!("add-on {} cannot conflict with itself", addon);
            }
        }
        if let Some(archs) = &self.architectures {
            if archs.is_empty() {
                bail!("add-on {} must support at least one architecture", addon);
            }
        }
        Ok(())
    }
}

/// An addon as declared in a blueprint file
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct AddonSpec {
    /// Identity of the addon (must be unique within a blueprint)
    pub name: String,
    /// Namespace the addon is installed into, created alongside it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Version of the addon release
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Named blueprint resources the addon consumes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependsOn: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflictsWith: Vec<String>,
    #[serde(default)]
    pub precedeCapacity: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architectures: Option<Vec<ArchType>>,
}

impl AddonSpec {
    /// The ordering metadata of this addon
    pub fn metadata(&self) -> AddonMetadata {
        AddonMetadata {
            dependsOn: self.dependsOn.clone(),
            conflictsWith: self.conflictsWith.clone(),
            precedeCapacity: self.precedeCapacity,
            architectures: self.architectures.clone(),
        }
    }

    pub fn verify(&self) -> Result<()> {
        verify_name("add-on", &self.name)?;
        if let Some(ns) = &self.namespace {
            verify_name("namespace", ns)?;
        }
        for r in &self.resources {
            verify_name("resource", r)?;
        }
        self.metadata().verify(&self.name)
    }
}
