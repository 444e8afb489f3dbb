use futures::future::{FutureExt, LocalBoxFuture};
use std::future::Future;
use std::rc::Rc;

use super::cluster::ClusterInfo;
use super::construct::Construct;
use super::team::Team;
use super::{AddonMetadata, ArchType, Result};

/// What an addon deploy hands back to the orchestrator
pub enum Deployment {
    /// Nothing anyone can depend on - no result store entry is made
    Skipped,
    /// Deployed synchronously
    Ready(Construct),
    /// Deploy work started, handle arrives later
    Pending(LocalBoxFuture<'static, Result<Construct>>),
}

impl Deployment {
    pub fn pending<F>(fut: F) -> Deployment
    where
        F: Future<Output = Result<Construct>> + 'static,
    {
        Deployment::Pending(fut.boxed_local())
    }
}

/// Behavioural trait for a unit of cluster configuration
///
/// Ordering and conflicts are not the addon's concern;
/// they live on the `AddonDescriptor` it is registered with.
pub trait AddOn {
    /// Deploy into the cluster
    ///
    /// Invoked exactly once per build, in blueprint order.
    fn deploy(&self, info: &mut ClusterInfo) -> Result<Deployment>;
}

/// An addon that also needs a hook once every team is set up
pub trait PostDeployAddOn: AddOn {
    fn post_deploy(&self, info: &ClusterInfo, teams: &[Rc<dyn Team>]) -> Result<()>;
}

/// Registration variants of an addon
#[derive(Clone)]
pub enum AddonKind {
    Standard(Rc<dyn AddOn>),
    PostDeploy(Rc<dyn PostDeployAddOn>),
}

/// An addon registration: identity, ordering metadata and the addon itself
///
/// Cheap to clone, so the same descriptors can feed several builds.
#[derive(Clone)]
pub struct AddonDescriptor {
    pub id: String,
    pub metadata: AddonMetadata,
    pub kind: AddonKind,
}

impl AddonDescriptor {
    pub fn new<S: Into<String>, A: AddOn + 'static>(id: S, addon: A) -> Self {
        AddonDescriptor {
            id: id.into(),
            metadata: AddonMetadata::default(),
            kind: AddonKind::Standard(Rc::new(addon)),
        }
    }

    pub fn with_post_deploy<S: Into<String>, A: PostDeployAddOn + 'static>(id: S, addon: A) -> Self {
        AddonDescriptor {
            id: id.into(),
            metadata: AddonMetadata::default(),
            kind: AddonKind::PostDeploy(Rc::new(addon)),
        }
    }

    pub fn with_metadata(mut self, metadata: AddonMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn depends_on<S: Into<String>>(mut self, addon: S) -> Self {
        self.metadata = self.metadata.depends_on(addon);
        self
    }

    pub fn conflicts_with<S: Into<String>>(mut self, addon: S) -> Self {
        self.metadata = self.metadata.conflicts_with(addon);
        self
    }

    pub fn precede_capacity(mut self) -> Self {
        self.metadata = self.metadata.precede_capacity();
        self
    }

    pub fn supports(mut self, archs: Vec<ArchType>) -> Self {
        self.metadata = self.metadata.supports(archs);
        self
    }

    pub(crate) fn deploy(&self, info: &mut ClusterInfo) -> Result<Deployment> {
        match &self.kind {
            AddonKind::Standard(a) => a.deploy(info),
            AddonKind::PostDeploy(a) => a.deploy(info),
        }
    }

    /// Run the post deploy hook if this is a post deploy addon
    pub(crate) fn post_deploy(&self, info: &ClusterInfo, teams: &[Rc<dyn Team>]) -> Option<Result<()>> {
        match &self.kind {
            AddonKind::Standard(_) => None,
            AddonKind::PostDeploy(a) => Some(a.post_deploy(info, teams)),
        }
    }
}
