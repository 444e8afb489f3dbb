use std::fmt;

/// Cpu architectures a cluster can run its capacity on
///
/// Forces lowercase values of this enum to be used
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ArchType {
    /// Intel and AMD 64-bit
    X86,
    /// Graviton style 64-bit ARM
    Arm,
}

impl Default for ArchType {
    fn default() -> ArchType {
        ArchType::X86
    }
}

impl fmt::Display for ArchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchType::X86 => write!(f, "x86"),
            ArchType::Arm => write!(f, "arm"),
        }
    }
}
