#![recursion_limit = "1024"]
#![allow(renamed_and_removed_lints)]
#![allow(non_snake_case)]

#[macro_use]
extern crate serde_derive;
extern crate serde_yaml;
extern crate serde;

#[macro_use]
extern crate log;

extern crate regex;

extern crate semver;

#[cfg(test)]
#[macro_use]
extern crate maplit;

#[macro_use]
extern crate error_chain;
error_chain! {
    types {
        Error, ErrorKind, ResultExt, Result;
    }
    links {}
    foreign_links {
        Fmt(::std::fmt::Error);
        Io(::std::io::Error) #[cfg(unix)];
        SerdeY(serde_yaml::Error);
        SemVer(semver::SemVerError);
        Regex(regex::Error);
    }
    errors {
        DuplicateAddon(addon: String) {
            description("addon registered twice")
            display("add-on '{}' is registered more than once", &addon)
        }
        UnknownAddon(addon: String) {
            description("addon not registered")
            display("add-on '{}' has not been registered", &addon)
        }
        UnsupportedArchitecture(addon: String, arch: String) {
            description("addon does not support the cluster architecture")
            display("add-on '{}' does not support the {} architecture", &addon, &arch)
        }
        InvalidBlueprint(name: String) {
            description("blueprint does not validate")
            display("blueprint {} does not validate", &name)
        }
    }
}

/// Blueprint file definition
pub mod config;
pub use config::BlueprintConfig;

/// Structs for the blueprint file and addon descriptors
pub mod structs;
pub use structs::{AddonMetadata, AddonSpec, ArchType, ResourceSpec, TeamSpec};

/// Addon metadata registry
pub mod registry;
pub use registry::AddonRegistry;

/// Internal classifications and states
mod states;
pub use states::AddonState;
