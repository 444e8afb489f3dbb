use futures::future::{self, FutureExt, LocalBoxFuture, TryFutureExt};
use std::collections::BTreeSet;
use std::rc::Rc;

use super::addon::{AddonDescriptor, Deployment};
use super::cluster::{ClusterInfo, DeployResult, ScheduledAddon};
use super::construct::{Construct, DepReason, Stack};
use super::{AddonRegistry, AddonState};
use super::{Error, ErrorKind, Result};

/// Deploy every addon in list order, then wait for all of them
///
/// Scheduling is eager and sequential: each addon's result store entry exists
/// before the next addon deploys, even if its work has not resolved.
/// Configuration errors (missing dependency, conflict, architecture)
/// abort immediately. Asynchronous failures surface at the join.
pub async fn deploy_addons(
    addons: &[AddonDescriptor],
    registry: &AddonRegistry,
    strict_arch: bool,
    info: &mut ClusterInfo,
) -> Result<()> {
    let mut ids = BTreeSet::new();
    for desc in addons {
        if !ids.insert(&desc.id) || info.addon_state(&desc.id).is_some() {
            return Err(ErrorKind::ScheduledTwice(desc.id.clone(), info.stack_name().to_string()).into());
        }
    }
    for desc in addons {
        info.set_state(&desc.id, AddonState::Pending);
    }
    info!("Scheduling {} add-ons in {}", addons.len(), info.stack_name());
    for desc in addons {
        if let Err(e) = schedule(desc, registry, strict_arch, info) {
            error!("Failed to schedule add-on {}: {}", desc.id, e);
            info.set_state(&desc.id, AddonState::Failed);
            let unsettled = info.addon_states().values().filter(|s| !s.is_terminal()).count();
            warn!("Leaving {} add-ons unsettled in {}", unsettled, info.stack_name());
            return Err(e);
        }
    }
    join(info).await
}

/// Deploy one addon and store its result
///
/// Dependencies are checked for presence in the result store, conflicts for
/// absence, both before the addon's own deploy runs.
pub fn schedule(desc: &AddonDescriptor, registry: &AddonRegistry, strict_arch: bool, info: &mut ClusterInfo) -> Result<()> {
    let stack = info.stack_name().to_string();
    let meta = match registry.lookup(&desc.id) {
        Some(m) => m.clone(),
        None => bail!("add-on {} was not registered for {}", desc.id, stack),
    };
    match info.addon_state(&desc.id) {
        None | Some(AddonState::Pending) if !info.has_scheduled_addon(&desc.id) => {}
        _ => return Err(ErrorKind::ScheduledTwice(desc.id.clone(), stack).into()),
    }
    registry.validate_architecture(&desc.id, info.architecture(), strict_arch)?;

    let mut deps = vec![];
    for d in &meta.dependsOn {
        match info.get_scheduled_addon(d) {
            Some(res) => deps.push((d.clone(), res)),
            None => return Err(ErrorKind::MissingDependency(d.clone(), desc.id.clone(), stack).into()),
        }
    }
    for c in &meta.conflictsWith {
        if info.has_scheduled_addon(c) {
            return Err(ErrorKind::ConflictingAddon(c.clone(), desc.id.clone(), stack).into());
        }
    }

    debug!("Deploying add-on {} to {}", desc.id, stack);
    let own: LocalBoxFuture<'static, DeployResult> = match desc.deploy(info)? {
        Deployment::Skipped => {
            debug!("add-on {} returned nothing to track", desc.id);
            info.set_state(&desc.id, AddonState::Resolved);
            return Ok(());
        }
        Deployment::Ready(c) => future::ok(c).boxed_local(),
        Deployment::Pending(f) => f.map_err(Rc::new).boxed_local(),
    };
    let capacity = if meta.precedeCapacity {
        info.capacity().to_vec()
    } else {
        vec![]
    };
    let res: ScheduledAddon = attach_dependencies(
        desc.id.clone(),
        info.stack().clone(),
        own,
        deps,
        capacity,
    )
    .boxed_local()
    .shared();
    info.add_scheduled_addon(&desc.id, res)?;
    info.set_state(&desc.id, AddonState::Scheduled);
    Ok(())
}

// Wait for an addon's own result, then order it after its dependencies
//
// A dependency only counts once it has resolved successfully.
async fn attach_dependencies(
    addon: String,
    stack: Stack,
    own: LocalBoxFuture<'static, DeployResult>,
    deps: Vec<(String, ScheduledAddon)>,
    capacity: Vec<Construct>,
) -> DeployResult {
    let construct = own.await?;
    for (name, dep) in deps {
        match dep.await {
            Ok(depc) => stack.add_dependency(&construct, &depc, DepReason::Dependency),
            Err(e) => {
                let kind = ErrorKind::UnresolvedDependency(name, addon, stack.name().to_string());
                return Err(Rc::new(Error::with_chain(detach(&e), kind)));
            }
        }
    }
    for cap in &capacity {
        stack.add_dependency(cap, &construct, DepReason::Capacity);
    }
    Ok(construct)
}

// Copy a shared error into an owned chain with the same messages
//
// Results are shared between every waiter, so the original cannot be moved out.
fn detach(e: &Error) -> Error {
    let mut msgs = e.iter().map(|c| c.to_string()).collect::<Vec<_>>().into_iter().rev();
    let root: Error = ErrorKind::Msg(msgs.next().unwrap_or_default()).into();
    msgs.fold(root, |cause, msg| Error::with_chain(cause, ErrorKind::Msg(msg)))
}

/// Wait for every scheduled addon and record the outcome
///
/// All results run to completion and the first error in scheduling order
/// is returned at the end if any. There is no timeout: a result that never
/// resolves blocks the join.
pub async fn join(info: &mut ClusterInfo) -> Result<()> {
    let (names, results): (Vec<String>, Vec<ScheduledAddon>) = info.scheduled_addons().into_iter().unzip();
    info!("Waiting for {} scheduled add-ons in {}", names.len(), info.stack_name());

    let outcomes = future::join_all(results).await;
    let mut failure: Option<Error> = None;
    for (name, res) in names.into_iter().zip(outcomes) {
        match res {
            Ok(c) => {
                debug!("add-on {} provisioned as {}", name, c.id());
                info.set_state(&name, AddonState::Resolved);
                info.add_provisioned_addon(&name, c);
            }
            Err(e) => {
                warn!("add-on {} error: {}", name, e);
                info.set_state(&name, AddonState::Failed);
                if failure.is_none() {
                    let stack = info.stack_name().to_string();
                    failure = Some(Error::with_chain(detach(&e), ErrorKind::AddonFailure(name, stack)));
                }
            }
        }
    }
    // propagate first error if exists
    if let Some(e) = failure {
        return Err(e);
    }
    Ok(())
}
