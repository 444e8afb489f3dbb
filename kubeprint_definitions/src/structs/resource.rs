use super::{verify_name, Result};

/// A named resource provided to the blueprint before addons deploy
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct ResourceSpec {
    /// Name addons use to look the resource up
    pub name: String,
    /// Free form kind of the resource (e.g. hosted-zone, vpc)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ResourceSpec {
    pub fn verify(&self) -> Result<()> {
        verify_name("resource", &self.name)
    }
}
