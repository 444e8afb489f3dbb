use futures::future::{LocalBoxFuture, Shared};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use super::construct::{Construct, ConstructKind, DepReason, Stack};
use super::resources::ResourceContext;
use super::{AddonState, ArchType};
use super::{Error, ErrorKind, Result};

/// Outcome of an addon's deployment as seen through the result store
///
/// Errors are reference counted because every waiter on the result gets a copy.
pub type DeployResult = std::result::Result<Construct, Rc<Error>>;

/// A scheduled addon result that any number of consumers can await
pub type ScheduledAddon = Shared<LocalBoxFuture<'static, DeployResult>>;

/// Cluster context handed to addons, teams and post deploy hooks
///
/// Holds the result store of one blueprint build: every scheduled addon
/// under its identity, in scheduling order. Entries are never removed.
pub struct ClusterInfo {
    stack: Stack,
    cluster: Construct,
    architecture: ArchType,
    capacity: Vec<Construct>,
    resources: ResourceContext,

    scheduled: HashMap<String, ScheduledAddon>,
    // order of scheduling which matches the addon list order
    schedule_order: Vec<String>,
    provisioned: BTreeMap<String, Construct>,
    states: BTreeMap<String, AddonState>,
}

impl ClusterInfo {
    pub fn new(
        stack: Stack,
        cluster: Construct,
        architecture: ArchType,
        capacity: Vec<Construct>,
        resources: ResourceContext,
    ) -> Self {
        ClusterInfo {
            stack,
            cluster,
            architecture,
            capacity,
            resources,
            scheduled: HashMap::new(),
            schedule_order: vec![],
            provisioned: BTreeMap::new(),
            states: BTreeMap::new(),
        }
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// The stack id used in error messages
    pub fn stack_name(&self) -> &str {
        self.stack.name()
    }

    /// The provisioned cluster construct
    pub fn cluster(&self) -> &Construct {
        &self.cluster
    }

    pub fn architecture(&self) -> ArchType {
        self.architecture
    }

    /// Node capacity constructs (node groups and the like)
    pub fn capacity(&self) -> &[Construct] {
        &self.capacity
    }

    pub fn resources(&self) -> &ResourceContext {
        &self.resources
    }

    /// Create an addon construct that sits on top of the cluster
    pub fn add_addon_construct(&self, id: &str) -> Result<Construct> {
        let c = self.stack.add_construct(id, ConstructKind::Addon)?;
        self.stack.add_dependency(&c, &self.cluster, DepReason::Structural);
        Ok(c)
    }

    /// Store the scheduled result of an addon
    ///
    /// Write-once per addon identity.
    pub fn add_scheduled_addon(&mut self, addon: &str, res: ScheduledAddon) -> Result<()> {
        if self.scheduled.contains_key(addon) {
            return Err(ErrorKind::ScheduledTwice(addon.to_string(), self.stack_name().to_string()).into());
        }
        self.schedule_order.push(addon.to_string());
        self.scheduled.insert(addon.to_string(), res);
        Ok(())
    }

    /// The scheduled result of an addon if it has been deployed
    ///
    /// The returned future may not be resolved yet.
    pub fn get_scheduled_addon(&self, addon: &str) -> Option<ScheduledAddon> {
        self.scheduled.get(addon).cloned()
    }

    pub fn has_scheduled_addon(&self, addon: &str) -> bool {
        self.scheduled.contains_key(addon)
    }

    /// All scheduled results in scheduling order
    pub fn scheduled_addons(&self) -> Vec<(String, ScheduledAddon)> {
        self.schedule_order
            .iter()
            .filter_map(|k| self.scheduled.get(k).map(|f| (k.clone(), f.clone())))
            .collect()
    }

    /// Scheduled addon names in scheduling order
    pub fn scheduled_names(&self) -> &[String] {
        &self.schedule_order
    }

    pub fn add_provisioned_addon(&mut self, addon: &str, construct: Construct) {
        self.provisioned.insert(addon.to_string(), construct);
    }

    /// A resolved addon handle - only available after the join
    pub fn get_provisioned_addon(&self, addon: &str) -> Option<&Construct> {
        self.provisioned.get(addon)
    }

    pub fn provisioned_addons(&self) -> &BTreeMap<String, Construct> {
        &self.provisioned
    }

    pub fn set_state(&mut self, addon: &str, state: AddonState) {
        trace!("add-on {} is now {}", addon, state);
        self.states.insert(addon.to_string(), state);
    }

    pub fn addon_state(&self, addon: &str) -> Option<AddonState> {
        self.states.get(addon).cloned()
    }

    pub fn addon_states(&self) -> &BTreeMap<String, AddonState> {
        &self.states
    }
}
