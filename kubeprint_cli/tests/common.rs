#![allow(dead_code)]

use futures_timer::Delay;
use std::{cell::{Cell, RefCell}, env, fs, path::Path, rc::Rc, sync::Once, time::Duration};

use kubeprint::{
    AddOn, ClusterInfo, Construct, ConstructKind, DepReason, Deployment, PostDeployAddOn, ResourceContext,
    ResourceProvider, Result, Stack, Team, ArchType, Error,
};

static START: Once = Once::new();

/// Set cwd to tests directory to be able to test blueprint files
///
/// The tests directory provides a couple of fake blueprints for verification
pub fn setup() {
    START.call_once(|| {
        let pwd = env::current_dir().unwrap();
        let pth = fs::canonicalize(Path::new(&pwd).join("..").join("tests")).unwrap();
        // loggerv::Logger::new()
        //    .verbosity(1)
        //    .module_path(true)
        //    .init()
        //    .unwrap();
        println!("Initializing tests - using testdir {}", pth.display());
        assert!(env::set_current_dir(pth).is_ok());
    });
}

/// Shared log of what happened during a build, in order
#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<String>>>);

impl Journal {
    pub fn new() -> Self {
        Journal::default()
    }

    pub fn record(&self, entry: String) {
        self.0.borrow_mut().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    /// Entries starting with a prefix, prefix stripped
    pub fn with_prefix(&self, prefix: &str) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .map(|e| e[prefix.len()..].to_string())
            .collect()
    }
}

/// A configurable addon that records its deploy in a journal
///
/// Delayed addons only create their construct once the delay has passed.
pub struct FakeAddon {
    name: String,
    journal: Journal,
    delay: Option<Duration>,
    failure: Option<String>,
    fail_now: bool,
    skip: bool,
}

impl FakeAddon {
    pub fn new(name: &str, journal: &Journal) -> Self {
        FakeAddon {
            name: name.to_string(),
            journal: journal.clone(),
            delay: None,
            failure: None,
            fail_now: false,
            skip: false,
        }
    }

    pub fn delayed(mut self, ms: u64) -> Self {
        self.delay = Some(Duration::from_millis(ms));
        self
    }

    /// Fail asynchronously
    pub fn failing(mut self, reason: &str) -> Self {
        self.failure = Some(reason.to_string());
        self
    }

    /// Fail inside deploy itself
    pub fn failing_now(mut self) -> Self {
        self.fail_now = true;
        self
    }

    /// Deploy without returning anything to track
    pub fn skipped(mut self) -> Self {
        self.skip = true;
        self
    }
}

impl AddOn for FakeAddon {
    fn deploy(&self, info: &mut ClusterInfo) -> Result<Deployment> {
        self.journal.record(format!("deploy:{}", self.name));
        if self.fail_now {
            return Err(format!("{} refused to deploy", self.name).into());
        }
        if self.skip {
            return Ok(Deployment::Skipped);
        }
        if self.delay.is_none() && self.failure.is_none() {
            let c = info.add_addon_construct(&format!("addon/{}", self.name))?;
            return Ok(Deployment::Ready(c));
        }
        Ok(Deployment::pending(resolve_later(
            info.stack().clone(),
            info.cluster().clone(),
            self.name.clone(),
            self.delay,
            self.failure.clone(),
            self.journal.clone(),
        )))
    }
}

async fn resolve_later(
    stack: Stack,
    cluster: Construct,
    name: String,
    delay: Option<Duration>,
    failure: Option<String>,
    journal: Journal,
) -> Result<Construct> {
    if let Some(d) = delay {
        Delay::new(d).await;
    }
    if let Some(reason) = failure {
        journal.record(format!("failed:{}", name));
        return Err(reason.into());
    }
    let c = stack.add_construct(&format!("addon/{}", name), ConstructKind::Addon)?;
    stack.add_dependency(&c, &cluster, DepReason::Structural);
    journal.record(format!("resolved:{}", name));
    Ok(c)
}

/// An addon with a post deploy hook
pub struct HookAddon {
    name: String,
    journal: Journal,
}

impl HookAddon {
    pub fn new(name: &str, journal: &Journal) -> Self {
        HookAddon {
            name: name.to_string(),
            journal: journal.clone(),
        }
    }
}

impl AddOn for HookAddon {
    fn deploy(&self, info: &mut ClusterInfo) -> Result<Deployment> {
        self.journal.record(format!("deploy:{}", self.name));
        let c = info.add_addon_construct(&format!("addon/{}", self.name))?;
        Ok(Deployment::Ready(c))
    }
}

impl PostDeployAddOn for HookAddon {
    fn post_deploy(&self, info: &ClusterInfo, teams: &[Rc<dyn Team>]) -> Result<()> {
        self.journal.record(format!(
            "post:{}:{}:{}",
            self.name,
            teams.len(),
            info.provisioned_addons().len()
        ));
        Ok(())
    }
}

/// A team recording what it sees at setup time
pub struct FakeTeam {
    name: String,
    journal: Journal,
}

impl FakeTeam {
    pub fn new(name: &str, journal: &Journal) -> Self {
        FakeTeam {
            name: name.to_string(),
            journal: journal.clone(),
        }
    }
}

impl Team for FakeTeam {
    fn name(&self) -> &str {
        &self.name
    }

    fn setup(&self, info: &ClusterInfo) -> Result<()> {
        self.journal.record(format!("team:{}:{}", self.name, info.provisioned_addons().len()));
        Ok(())
    }
}

/// A resource provider counting its invocations
pub struct CountingProvider {
    id: String,
    pub calls: Rc<Cell<usize>>,
}

impl CountingProvider {
    pub fn new(id: &str) -> Self {
        CountingProvider {
            id: id.to_string(),
            calls: Rc::new(Cell::new(0)),
        }
    }
}

impl ResourceProvider for CountingProvider {
    fn provide(&self, ctx: &ResourceContext) -> Result<Construct> {
        self.calls.set(self.calls.get() + 1);
        ctx.stack().add_construct(&self.id, ConstructKind::Resource)
    }
}

/// A bare cluster context for driving the orchestrator directly
pub fn cluster_info(stack: &str, capacity: &[&str]) -> ClusterInfo {
    let stack = Stack::new(stack);
    let cluster = stack.add_construct("cluster", ConstructKind::Cluster).unwrap();
    let mut caps = vec![];
    for c in capacity {
        let cap = stack.add_construct(&format!("capacity/{}", c), ConstructKind::Capacity).unwrap();
        stack.add_dependency(&cap, &cluster, DepReason::Structural);
        caps.push(cap);
    }
    let resources = ResourceContext::new(stack.clone());
    ClusterInfo::new(stack, cluster, ArchType::X86, caps, resources)
}

/// Messages of an error and every cause below it
pub fn causes(e: &Error) -> Vec<String> {
    e.iter().map(|c| c.to_string()).collect()
}
