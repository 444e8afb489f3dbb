use std::rc::Rc;

use super::addon::AddonDescriptor;
use super::cluster::ClusterInfo;
use super::construct::{ConstructKind, DepReason, Stack};
use super::orchestrate;
use super::resources::{ResourceContext, ResourceProvider};
use super::team::Team;
use super::{AddonRegistry, AddonState, ArchType};
use super::{ErrorKind, Result};

/// Collects everything that goes into a cluster build
///
/// A builder can be cloned and built any number of times; every build gets
/// its own stack, registry and result store.
#[derive(Clone, Default)]
pub struct BlueprintBuilder {
    id: Option<String>,
    architecture: ArchType,
    strict_architecture: bool,
    capacity: Vec<String>,
    resources: Vec<(String, Rc<dyn ResourceProvider>)>,
    addons: Vec<AddonDescriptor>,
    teams: Vec<Rc<dyn Team>>,
}

impl BlueprintBuilder {
    pub fn new() -> Self {
        BlueprintBuilder::default()
    }

    /// Stack id of the cluster
    pub fn id<S: Into<String>>(mut self, id: S) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn architecture(mut self, arch: ArchType) -> Self {
        self.architecture = arch;
        self
    }

    /// Fail the build on addons not supporting the architecture
    pub fn strict_architecture(mut self, strict: bool) -> Self {
        self.strict_architecture = strict;
        self
    }

    /// Add a piece of node capacity
    pub fn capacity<S: Into<String>>(mut self, name: S) -> Self {
        self.capacity.push(name.into());
        self
    }

    pub fn resource_provider<S: Into<String>, P: ResourceProvider + 'static>(mut self, name: S, provider: P) -> Self {
        self.resources.push((name.into(), Rc::new(provider)));
        self
    }

    /// Append an addon - list order is deployment order
    pub fn addon(mut self, desc: AddonDescriptor) -> Self {
        self.addons.push(desc);
        self
    }

    pub fn addons<I: IntoIterator<Item = AddonDescriptor>>(mut self, descs: I) -> Self {
        self.addons.extend(descs);
        self
    }

    pub fn team<T: Team + 'static>(mut self, team: T) -> Self {
        self.teams.push(Rc::new(team));
        self
    }

    pub fn teams<I: IntoIterator<Item = Rc<dyn Team>>>(mut self, teams: I) -> Self {
        self.teams.extend(teams);
        self
    }

    /// Register every addon descriptor
    ///
    /// Addon identities must be unique within a blueprint.
    pub fn registry(&self) -> Result<AddonRegistry> {
        let mut reg = AddonRegistry::new();
        for desc in &self.addons {
            reg.register(&desc.id, desc.metadata.clone())?;
        }
        Ok(reg)
    }

    /// Build the cluster
    ///
    /// Resources are provided first, then addons are scheduled and joined,
    /// then teams are set up and post deploy hooks run.
    /// Nothing past a failing step runs, and nothing before it is undone.
    pub async fn build(&self) -> Result<Blueprint> {
        let mut bp = self.prepare()?;
        self.provision(&mut bp).await?;
        Ok(bp)
    }

    /// Create the stack of a build with its cluster, resources and capacity
    ///
    /// No addon has been deployed yet.
    pub fn prepare(&self) -> Result<Blueprint> {
        let id = match &self.id {
            Some(id) => id.clone(),
            None => return Err(ErrorKind::MissingBlueprintId.into()),
        };
        let registry = self.registry()?;
        info!("Building blueprint {} with {} add-ons", id, self.addons.len());

        let stack = Stack::new(&id);
        let cluster = stack.add_construct("cluster", ConstructKind::Cluster)?;

        let mut resources = ResourceContext::new(stack.clone());
        for (name, provider) in &self.resources {
            resources.add(name, provider.as_ref())?;
        }

        let mut capacity = vec![];
        for name in &self.capacity {
            let cap = stack.add_construct(&format!("capacity/{}", name), ConstructKind::Capacity)?;
            stack.add_dependency(&cap, &cluster, DepReason::Structural);
            capacity.push(cap);
        }

        let info = ClusterInfo::new(stack, cluster, self.architecture, capacity, resources);
        Ok(Blueprint { info, registry })
    }

    /// Deploy addons into a prepared blueprint, then set up teams and hooks
    ///
    /// Addon states stay recorded in the blueprint when this fails.
    pub async fn provision(&self, bp: &mut Blueprint) -> Result<()> {
        let id = bp.info.stack_name().to_string();
        orchestrate::deploy_addons(&self.addons, &bp.registry, self.strict_architecture, &mut bp.info).await?;

        let info = &bp.info;
        for team in &self.teams {
            debug!("Setting up team {} in {}", team.name(), id);
            team.setup(info)?;
        }
        for desc in &self.addons {
            if let Some(res) = desc.post_deploy(info, &self.teams) {
                debug!("Ran post deploy of {} in {}", desc.id, id);
                res?;
            }
        }
        info!("Blueprint {} built with {} constructs", id, info.stack().len());
        Ok(())
    }
}

/// A cluster build with the state of each of its addons
pub struct Blueprint {
    info: ClusterInfo,
    registry: AddonRegistry,
}

impl Blueprint {
    pub fn builder() -> BlueprintBuilder {
        BlueprintBuilder::new()
    }

    pub fn cluster_info(&self) -> &ClusterInfo {
        &self.info
    }

    pub fn stack(&self) -> &Stack {
        self.info.stack()
    }

    pub fn registry(&self) -> &AddonRegistry {
        &self.registry
    }

    pub fn addon_state(&self, addon: &str) -> Option<AddonState> {
        self.info.addon_state(addon)
    }
}
