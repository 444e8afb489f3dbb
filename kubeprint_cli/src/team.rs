use super::cluster::ClusterInfo;
use super::Result;

/// A team onboarded onto the cluster
///
/// Set up in blueprint order once every scheduled addon is provisioned,
/// so `info.get_provisioned_addon` is safe to rely on here.
pub trait Team {
    fn name(&self) -> &str;

    fn setup(&self, info: &ClusterInfo) -> Result<()>;
}
