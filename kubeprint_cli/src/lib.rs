#![recursion_limit = "1024"]
#![allow(renamed_and_removed_lints)]
#![allow(non_snake_case)]

#[macro_use]
extern crate serde_derive;
extern crate serde_yaml;
extern crate serde_json;
extern crate serde;

// graphing
extern crate petgraph;

#[macro_use]
extern crate log;

extern crate futures;

#[macro_use]
extern crate error_chain;
error_chain! {
    types {
        Error, ErrorKind, ResultExt, Result;
    }
    links {}
    foreign_links {
        Fmt(::std::fmt::Error);
        Io(::std::io::Error);
        Def(kubeprint_definitions::Error);
        SerdeY(serde_yaml::Error);
        SerdeJ(serde_json::Error);
    }
    errors {
        MissingBlueprintId {
            description("blueprint id not set")
            display("a blueprint needs an id before it can be built")
        }
        MissingDependency(dependency: String, addon: String, stack: String) {
            description("addon dependency not scheduled")
            display("Missing a dependency for {} for {} (required by {})", &dependency, &stack, &addon)
        }
        ConflictingAddon(conflict: String, addon: String, stack: String) {
            description("conflicting addon already scheduled")
            display("Deploying {} failed due to conflicting add-on: {} (declared by {})", &stack, &conflict, &addon)
        }
        UnresolvedDependency(dependency: String, addon: String, stack: String) {
            description("addon dependency failed to resolve")
            display("Dependency {} of {} in {} failed to resolve", &dependency, &addon, &stack)
        }
        AddonFailure(addon: String, stack: String) {
            description("addon deployment failed")
            display("Add-on {} failed to deploy in {}", &addon, &stack)
        }
        ScheduledTwice(addon: String, stack: String) {
            description("addon scheduled twice")
            display("Add-on {} is already scheduled in {}", &addon, &stack)
        }
        DuplicateConstruct(id: String, stack: String) {
            description("construct id reused")
            display("There is already a construct with id '{}' in {}", &id, &stack)
        }
        MissingResource(name: String, stack: String) {
            description("required resource not provided")
            display("Required resource {} is not provided in {}", &name, &stack)
        }
        DuplicateResource(name: String, stack: String) {
            description("resource provided twice")
            display("Resource {} is already provided in {}", &name, &stack)
        }
    }
}

extern crate kubeprint_definitions;
pub use kubeprint_definitions::{AddonMetadata, AddonRegistry, AddonSpec, AddonState, ArchType};
pub use kubeprint_definitions::{BlueprintConfig, ResourceSpec, TeamSpec};

/// The in-memory provisioning model using `petgraph`
pub mod construct;
pub use construct::{Construct, ConstructKind, DepReason, Stack};

/// Per build result store
pub mod cluster;
pub use cluster::{ClusterInfo, ScheduledAddon};

/// Addon contracts and descriptors
pub mod addon;
pub use addon::{AddOn, AddonDescriptor, Deployment, PostDeployAddOn};

/// Team contract
pub mod team;
pub use team::Team;

/// Named resource providers
pub mod resources;
pub use resources::{ResourceContext, ResourceProvider};

/// Addon scheduling and the join barrier
pub mod orchestrate;

/// Blueprint builder
pub mod blueprint;
pub use blueprint::{Blueprint, BlueprintBuilder};

/// Addons, teams and resources backed by a blueprint file
pub mod filebacked;

/// Convenience listers
pub mod list;

/// Smart initialiser with safety
///
/// Tricks the library into reading from your blueprint location.
pub fn init() -> Result<()> {
    use std::env;
    use std::path::Path;

    // Allow kubeprint calls to work from anywhere if we know where blueprints are
    if let Ok(bdir) = env::var("KUBEPRINT_DIR") {
        let pth = Path::new(&bdir);
        if !pth.is_dir() {
            bail!("KUBEPRINT_DIR must exist");
        }
        env::set_current_dir(pth)?;
    }

    Ok(())
}
