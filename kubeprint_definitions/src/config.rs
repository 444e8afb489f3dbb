#![allow(non_snake_case)]

use semver::Version;
use std::collections::BTreeSet;
use std::path::Path;

use super::structs::{verify_name, AddonSpec, ArchType, ResourceSpec, TeamSpec};
use super::{ErrorKind, Result, ResultExt};

/// Main blueprint, serializable from blueprint.yml
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct BlueprintConfig {
    /// Stack identity of the cluster being built
    pub name: String,

    /// Kubeprint version pin
    ///
    /// Blueprints requiring a newer kubeprint than the running one are rejected.
    pub version: Version,

    /// Architecture of the node capacity
    #[serde(default)]
    pub architecture: ArchType,

    /// Fail instead of warn on addons not supporting `architecture`
    #[serde(default)]
    pub strictArchitecture: bool,

    /// Node capacity (node groups, fargate profiles) of the cluster
    #[serde(default)]
    pub capacity: Vec<String>,

    /// Resources provided to addons before they deploy
    #[serde(default)]
    pub resources: Vec<ResourceSpec>,

    /// Addons in deployment order
    #[serde(default)]
    pub addons: Vec<AddonSpec>,

    /// Teams set up after all addons are provisioned
    #[serde(default)]
    pub teams: Vec<TeamSpec>,
}

impl BlueprintConfig {
    /// Read a blueprint file in pwd
    pub fn read() -> Result<BlueprintConfig> {
        BlueprintConfig::read_from(Path::new("blueprint.yml"))
    }

    /// Read and verify a blueprint file
    pub fn read_from(pth: &Path) -> Result<BlueprintConfig> {
        use std::fs;
        trace!("Using blueprint file in {}", pth.display());
        if !pth.exists() {
            bail!("Blueprint file {} does not exist", pth.display())
        }
        let data = fs::read_to_string(pth)?;
        let conf: BlueprintConfig = serde_yaml::from_str(&data)?;
        conf.verify()
            .chain_err(|| ErrorKind::InvalidBlueprint(conf.name.clone()))?;
        Ok(conf)
    }

    pub fn verify(&self) -> Result<()> {
        if self.name.is_empty() {
            bail!("Need to set a stack `name` for the blueprint");
        }
        BlueprintConfig::verify_version(&self.version)?;

        let mut seen = BTreeSet::new();
        for c in &self.capacity {
            verify_name("capacity", c)?;
            if !seen.insert(c) {
                bail!("capacity {} is defined twice", c);
            }
        }

        let mut resources = BTreeSet::new();
        for r in &self.resources {
            r.verify()?;
            if !resources.insert(&r.name) {
                bail!("resource {} is defined twice", r.name);
            }
        }

        let mut addons = BTreeSet::new();
        for a in &self.addons {
            a.verify()?;
            if !addons.insert(&a.name) {
                return Err(ErrorKind::DuplicateAddon(a.name.clone()).into());
            }
            for r in &a.resources {
                if !resources.contains(r) {
                    bail!("add-on {} uses undefined resource {}", a.name, r);
                }
            }
            if !a.metadata().supports_arch(self.architecture) {
                if self.strictArchitecture {
                    bail!("add-on {} does not support {}", a.name, self.architecture);
                }
                warn!("add-on {} does not declare support for {}", a.name, self.architecture);
            }
        }
        // NB: dependencies are deliberately not cross checked here
        // a missing dependency is only detected when its dependent deploys

        let mut teams = BTreeSet::new();
        for t in &self.teams {
            t.verify()?;
            if !teams.insert(&t.name) {
                bail!("team {} is defined twice", t.name);
            }
        }
        Ok(())
    }

    fn verify_version(ver: &Version) -> Result<()> {
        let current = Version::parse(env!("CARGO_PKG_VERSION"))?;
        if ver > &current {
            bail!("Your kubeprint is out of date ({} < {})", current, ver)
        }
        Ok(())
    }
}
