/// This file contains the `kubeprint list-*` and status printers
use super::{Blueprint, BlueprintConfig, Result};
use kubeprint_definitions::AddonRegistry;

/// Addon names of a blueprint in deployment order
pub fn addon_names(conf: &BlueprintConfig) -> Vec<String> {
    conf.addons.iter().map(|a| a.name.clone()).collect()
}

/// Print the addons of a blueprint in deployment order
pub fn addons(conf: &BlueprintConfig) -> Result<()> {
    for a in addon_names(conf) {
        println!("{}", a);
    }
    Ok(())
}

/// Print the registered metadata of every addon
pub fn registry(conf: &BlueprintConfig) -> Result<()> {
    let reg = AddonRegistry::from_specs(&conf.addons)?;
    reg.print()?;
    Ok(())
}

/// Render the state of every addon of a build
///
/// Plain output follows deployment order; addons never reached show as pending.
pub fn format_states(bp: &Blueprint, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(bp.cluster_info().addon_states())?);
    }
    let lines = bp
        .registry()
        .keys()
        .map(|name| {
            let state = bp
                .addon_state(name)
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown".into());
            format!("{:<40} {}", name, state)
        })
        .collect::<Vec<_>>();
    Ok(lines.join("\n"))
}

/// Print the final state of every addon after a build
pub fn states(bp: &Blueprint, json: bool) -> Result<()> {
    println!("{}", format_states(bp, json)?);
    Ok(())
}
