#![allow(non_snake_case)]

/// Allow normal error handling from structs
pub use super::{ErrorKind, Result, ResultExt};

// Structs that exist in the blueprint file

mod arch;
pub use self::arch::ArchType;

/// Addon descriptors and their ordering metadata
mod addon;
pub use self::addon::{AddonMetadata, AddonSpec};

mod team;
pub use self::team::TeamSpec;

mod resource;
pub use self::resource::ResourceSpec;

use regex::Regex;

/// Dns label naming used for addons, teams and resources
const NAMING_PATTERN: &str = r"^[a-z0-9]([a-z0-9\-]{0,61}[a-z0-9])?$";

/// Verify that a name can be used as a kubernetes resource name
pub fn verify_name(kind: &str, name: &str) -> Result<()> {
    let re = Regex::new(NAMING_PATTERN)?;
    if !re.is_match(name) {
        bail!("{} name '{}' must be a lowercase dns label", kind, name);
    }
    Ok(())
}
