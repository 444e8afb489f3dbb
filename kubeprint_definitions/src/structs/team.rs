use super::{verify_name, Result};

/// A team declared in a blueprint file
///
/// Teams are set up after every addon has been provisioned.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct TeamSpec {
    /// Team name
    pub name: String,
    /// Namespace owned by the team - defaults to the team name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Addons the team workloads rely on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
}

impl TeamSpec {
    pub fn namespace(&self) -> String {
        self.namespace.clone().unwrap_or_else(|| self.name.clone())
    }

    pub fn verify(&self) -> Result<()> {
        verify_name("team", &self.name)?;
        verify_name("namespace", &self.namespace())?;
        for r in &self.requires {
            verify_name("add-on", r)?;
        }
        Ok(())
    }
}
