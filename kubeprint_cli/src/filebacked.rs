use std::rc::Rc;

use super::addon::{AddOn, AddonDescriptor, Deployment};
use super::blueprint::BlueprintBuilder;
use super::cluster::ClusterInfo;
use super::construct::{Construct, ConstructKind, DepReason};
use super::resources::{ResourceContext, ResourceProvider};
use super::team::Team;
use super::{AddonSpec, BlueprintConfig, ResourceSpec, TeamSpec};
use super::Result;

/// An addon declared in a blueprint file
///
/// Installs as a single release construct on the cluster, inside its
/// namespace if it has one, after any resources it consumes.
pub struct DeclaredAddon {
    spec: AddonSpec,
}

impl DeclaredAddon {
    pub fn new(spec: AddonSpec) -> Self {
        DeclaredAddon { spec }
    }
}

impl AddOn for DeclaredAddon {
    fn deploy(&self, info: &mut ClusterInfo) -> Result<Deployment> {
        let stack = info.stack().clone();
        let release = info.add_addon_construct(&format!("addon/{}", self.spec.name))?;
        if let Some(ns) = &self.spec.namespace {
            // namespaces can be shared by several addons
            let nsc = stack.ensure_construct(&format!("namespace/{}", ns), ConstructKind::Namespace)?;
            stack.add_dependency(&nsc, info.cluster(), DepReason::Structural);
            stack.add_dependency(&release, &nsc, DepReason::Structural);
        }
        for r in &self.spec.resources {
            let rc = info.resources().get_required(r)?;
            stack.add_dependency(&release, &rc, DepReason::Structural);
        }
        Ok(Deployment::Ready(release))
    }
}

/// A team owning one namespace
pub struct NamespaceTeam {
    spec: TeamSpec,
}

impl NamespaceTeam {
    pub fn new(spec: TeamSpec) -> Self {
        NamespaceTeam { spec }
    }
}

impl Team for NamespaceTeam {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn setup(&self, info: &ClusterInfo) -> Result<()> {
        let stack = info.stack();
        let ns = stack.ensure_construct(&format!("namespace/{}", self.spec.namespace()), ConstructKind::Namespace)?;
        stack.add_dependency(&ns, info.cluster(), DepReason::Structural);
        let team = stack.add_construct(&format!("team/{}", self.spec.name), ConstructKind::Team)?;
        stack.add_dependency(&team, &ns, DepReason::Structural);
        for r in &self.spec.requires {
            match info.get_provisioned_addon(r) {
                Some(addon) => stack.add_dependency(&team, addon, DepReason::Dependency),
                None => bail!(
                    "team {} requires add-on {} which is not provisioned in {}",
                    self.spec.name,
                    r,
                    info.stack_name()
                ),
            }
        }
        Ok(())
    }
}

/// A resource declared in a blueprint file
pub struct DeclaredResource {
    spec: ResourceSpec,
}

impl DeclaredResource {
    pub fn new(spec: ResourceSpec) -> Self {
        DeclaredResource { spec }
    }
}

impl ResourceProvider for DeclaredResource {
    fn provide(&self, ctx: &ResourceContext) -> Result<Construct> {
        if let Some(k) = &self.spec.kind {
            trace!("resource {} is a {}", self.spec.name, k);
        }
        ctx.stack().add_construct(&format!("resource/{}", self.spec.name), ConstructKind::Resource)
    }
}

/// Create a builder for a blueprint file
pub fn builder(conf: &BlueprintConfig) -> BlueprintBuilder {
    let mut bp = BlueprintBuilder::new()
        .id(conf.name.clone())
        .architecture(conf.architecture)
        .strict_architecture(conf.strictArchitecture);
    for c in &conf.capacity {
        bp = bp.capacity(c.clone());
    }
    for r in &conf.resources {
        bp = bp.resource_provider(r.name.clone(), DeclaredResource::new(r.clone()));
    }
    bp = bp.addons(conf.addons.iter().map(|a| {
        AddonDescriptor::new(a.name.clone(), DeclaredAddon::new(a.clone())).with_metadata(a.metadata())
    }));
    bp.teams(
        conf.teams
            .iter()
            .map(|t| Rc::new(NamespaceTeam::new(t.clone())) as Rc<dyn Team>),
    )
}
