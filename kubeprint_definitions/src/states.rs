use std::fmt;

/// Lifecycle of an addon within a single blueprint build
///
/// `Resolved` and `Failed` are terminal.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum AddonState {
    /// Known to the build, deploy not yet invoked
    Pending,
    /// Deploy invoked, result entry stored but possibly unresolved
    Scheduled,
    /// Deploy completed and its handle is available
    Resolved,
    /// Deploy returned an error, or its future did
    Failed,
}

impl AddonState {
    pub fn is_terminal(self) -> bool {
        match self {
            AddonState::Resolved | AddonState::Failed => true,
            _ => false,
        }
    }
}

impl Default for AddonState {
    fn default() -> Self {
        AddonState::Pending
    }
}

impl fmt::Display for AddonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // NB: this corresponds to serde serialization
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}
