#[macro_use]
extern crate maplit;

mod common;
use crate::common::{causes, cluster_info, FakeAddon, Journal};

use kubeprint::orchestrate::{deploy_addons, schedule};
use kubeprint::{AddonDescriptor, AddonRegistry, AddonState, ArchType, Blueprint};

fn registry(descs: &[AddonDescriptor]) -> AddonRegistry {
    let mut reg = AddonRegistry::new();
    for d in descs {
        reg.register(&d.id, d.metadata.clone()).unwrap();
    }
    reg
}

#[tokio::test]
async fn deploys_in_list_order() {
    let journal = Journal::new();
    let names = vec!["e", "b", "d", "a", "c"];
    let descs: Vec<_> = names
        .iter()
        .map(|n| AddonDescriptor::new(*n, FakeAddon::new(n, &journal)))
        .collect();
    let bp = Blueprint::builder().id("ordered").addons(descs).build().await.unwrap();

    assert_eq!(journal.with_prefix("deploy:"), names);
    assert_eq!(bp.cluster_info().scheduled_names().to_vec(), names);
    for n in &names {
        assert_eq!(bp.addon_state(n), Some(AddonState::Resolved));
        assert!(bp.cluster_info().get_provisioned_addon(n).is_some());
    }
}

#[tokio::test]
async fn dependency_orders_constructs() {
    let journal = Journal::new();
    let bp = Blueprint::builder()
        .id("deps")
        .addon(AddonDescriptor::new("a", FakeAddon::new("a", &journal)))
        .addon(AddonDescriptor::new("b", FakeAddon::new("b", &journal)).depends_on("a"))
        .build()
        .await
        .unwrap();

    let info = bp.cluster_info();
    let a = info.get_provisioned_addon("a").unwrap();
    let b = info.get_provisioned_addon("b").unwrap();
    assert!(bp.stack().depends_on(b, a));
    assert!(!bp.stack().depends_on(a, b));
}

#[tokio::test]
async fn unresolved_dependency_is_awaited() {
    let journal = Journal::new();
    // a is still pending when b deploys
    let bp = Blueprint::builder()
        .id("slow-deps")
        .addon(AddonDescriptor::new("a", FakeAddon::new("a", &journal).delayed(30)))
        .addon(AddonDescriptor::new("b", FakeAddon::new("b", &journal)).depends_on("a"))
        .build()
        .await
        .unwrap();

    assert_eq!(journal.entries(), vec!["deploy:a", "deploy:b", "resolved:a"]);
    let info = bp.cluster_info();
    let a = info.get_provisioned_addon("a").unwrap();
    let b = info.get_provisioned_addon("b").unwrap();
    assert!(bp.stack().depends_on(b, a));
}

#[tokio::test]
async fn failed_dependency_fails_dependent() {
    let journal = Journal::new();
    let descs = vec![
        AddonDescriptor::new("a", FakeAddon::new("a", &journal).delayed(10).failing("boom")),
        AddonDescriptor::new("b", FakeAddon::new("b", &journal)).depends_on("a"),
        AddonDescriptor::new("c", FakeAddon::new("c", &journal)),
    ];
    let reg = registry(&descs);
    let mut info = cluster_info("failing-deps", &[]);
    let err = deploy_addons(&descs, &reg, false, &mut info).await.unwrap_err();

    assert_eq!(causes(&err), vec!["Add-on a failed to deploy in failing-deps", "boom"]);
    // the dependent carries the root cause of its dependency
    let b = info.get_scheduled_addon("b").unwrap().await.unwrap_err();
    assert_eq!(causes(&b), vec!["Dependency a of b in failing-deps failed to resolve", "boom"]);

    assert_eq!(info.addon_state("a"), Some(AddonState::Failed));
    assert_eq!(info.addon_state("b"), Some(AddonState::Failed));
    // unrelated addons still settle
    assert_eq!(info.addon_state("c"), Some(AddonState::Resolved));
    assert!(info.get_provisioned_addon("b").is_none());
    assert!(info.get_provisioned_addon("c").is_some());
}

#[tokio::test]
async fn missing_dependency() {
    let journal = Journal::new();
    let err = Blueprint::builder()
        .id("dns-stack")
        .addon(AddonDescriptor::new("external-dns", FakeAddon::new("external-dns", &journal)).depends_on("cert-manager"))
        .build()
        .await
        .err()
        .unwrap();

    let msg = err.to_string();
    assert!(msg.contains("cert-manager"));
    assert!(msg.contains("dns-stack"));
    // checked before the addon got to deploy
    assert!(journal.entries().is_empty());
}

#[tokio::test]
async fn dependency_listed_later_is_missing() {
    let journal = Journal::new();
    let descs = vec![
        AddonDescriptor::new("b", FakeAddon::new("b", &journal)).depends_on("a"),
        AddonDescriptor::new("a", FakeAddon::new("a", &journal)),
    ];
    let reg = registry(&descs);
    let mut info = cluster_info("late-deps", &[]);
    let err = deploy_addons(&descs, &reg, false, &mut info).await.unwrap_err();

    assert!(err.to_string().contains("Missing a dependency for a for late-deps"));
    assert_eq!(info.addon_state("b"), Some(AddonState::Failed));
    // nothing after the failing addon is attempted
    assert_eq!(info.addon_state("a"), Some(AddonState::Pending));
    assert!(journal.entries().is_empty());
}

#[tokio::test]
async fn conflict_detection() {
    let journal = Journal::new();
    let err = Blueprint::builder()
        .id("sync-stack")
        .addon(AddonDescriptor::new("route53-sync", FakeAddon::new("route53-sync", &journal)))
        .addon(AddonDescriptor::new("external-dns", FakeAddon::new("external-dns", &journal)).conflicts_with("route53-sync"))
        .build()
        .await
        .err()
        .unwrap();

    let msg = err.to_string();
    assert!(msg.contains("sync-stack"));
    assert!(msg.contains("route53-sync"));
    assert_eq!(journal.with_prefix("deploy:"), vec!["route53-sync"]);
}

#[tokio::test]
async fn conflicts_only_look_backwards() {
    let journal = Journal::new();
    // the conflicting addon is scheduled after the declaring one
    let bp = Blueprint::builder()
        .id("forward")
        .addon(AddonDescriptor::new("b", FakeAddon::new("b", &journal)).conflicts_with("a"))
        .addon(AddonDescriptor::new("a", FakeAddon::new("a", &journal)))
        .build()
        .await
        .unwrap();
    assert_eq!(bp.cluster_info().provisioned_addons().len(), 2);
}

#[tokio::test]
async fn unrelated_addons() {
    let journal = Journal::new();
    let bp = Blueprint::builder()
        .id("unrelated")
        .addon(AddonDescriptor::new("a", FakeAddon::new("a", &journal)))
        .addon(AddonDescriptor::new("b", FakeAddon::new("b", &journal)))
        .build()
        .await
        .unwrap();

    let info = bp.cluster_info();
    assert!(info.has_scheduled_addon("a"));
    assert!(info.has_scheduled_addon("b"));
    let a = info.get_provisioned_addon("a").unwrap();
    let b = info.get_provisioned_addon("b").unwrap();
    assert!(!bp.stack().depends_on(a, b));
    assert!(!bp.stack().depends_on(b, a));
}

#[tokio::test]
async fn join_waits_for_slow_addons() {
    let journal = Journal::new();
    let bp = Blueprint::builder()
        .id("slow")
        .addon(AddonDescriptor::new("slow", FakeAddon::new("slow", &journal).delayed(50)))
        .addon(AddonDescriptor::new("fast", FakeAddon::new("fast", &journal)))
        .build()
        .await
        .unwrap();

    // the slow addon only creates its construct after the delay
    assert!(bp.stack().find("addon/slow").is_some());
    assert_eq!(bp.addon_state("slow"), Some(AddonState::Resolved));
    assert_eq!(journal.entries().last().map(String::as_str), Some("resolved:slow"));
}

#[tokio::test]
async fn dependency_and_conflict_scenario() {
    let journal = Journal::new();
    let descs = vec![
        AddonDescriptor::new("X", FakeAddon::new("x", &journal)),
        AddonDescriptor::new("Y", FakeAddon::new("y", &journal)).depends_on("X"),
        AddonDescriptor::new("Z", FakeAddon::new("z", &journal)).conflicts_with("Y"),
    ];
    let reg = registry(&descs);
    let mut info = cluster_info("xyz", &[]);
    let err = deploy_addons(&descs, &reg, false, &mut info).await.unwrap_err();

    assert!(err.to_string().contains("Y"));
    assert_eq!(info.addon_state("Z"), Some(AddonState::Failed));
    assert_eq!(journal.with_prefix("deploy:"), vec!["x", "y"]);

    // Y was scheduled and still resolves against X
    let y = info.get_scheduled_addon("Y").unwrap().await.unwrap();
    let x = info.get_scheduled_addon("X").unwrap().await.unwrap();
    assert!(info.stack().depends_on(&y, &x));
}

#[tokio::test]
async fn duplicate_identity() {
    let journal = Journal::new();
    let err = Blueprint::builder()
        .id("dupes")
        .addon(AddonDescriptor::new("a", FakeAddon::new("a", &journal)))
        .addon(AddonDescriptor::new("a", FakeAddon::new("a", &journal)))
        .build()
        .await
        .err()
        .unwrap();
    assert!(err.to_string().contains("registered more than once"));
    assert!(journal.entries().is_empty());
}

#[tokio::test]
async fn architecture_support() {
    let journal = Journal::new();
    let builder = Blueprint::builder()
        .id("graviton")
        .architecture(ArchType::Arm)
        .addon(AddonDescriptor::new("a", FakeAddon::new("a", &journal)).supports(vec![ArchType::X86]));

    // lenient builds warn and carry on
    let bp = builder.clone().build().await.unwrap();
    assert_eq!(bp.addon_state("a"), Some(AddonState::Resolved));

    let err = builder.strict_architecture(true).build().await.err().unwrap();
    let msg = err.to_string();
    assert!(msg.contains("does not support the arm architecture"));
    assert_eq!(journal.with_prefix("deploy:"), vec!["a"]);
}

#[tokio::test]
async fn precede_capacity() {
    let journal = Journal::new();
    let descs = vec![
        AddonDescriptor::new("vpc-cni", FakeAddon::new("vpc-cni", &journal)).precede_capacity(),
        AddonDescriptor::new("dns", FakeAddon::new("dns", &journal)),
    ];
    let reg = registry(&descs);
    let mut info = cluster_info("capacity", &["ng-1", "ng-2"]);
    deploy_addons(&descs, &reg, false, &mut info).await.unwrap();

    let cni = info.get_provisioned_addon("vpc-cni").unwrap();
    let dns = info.get_provisioned_addon("dns").unwrap();
    for cap in info.capacity() {
        assert!(info.stack().depends_on(cap, cni));
        assert!(!info.stack().depends_on(cap, dns));
    }
}

#[tokio::test]
async fn deploy_error_aborts_scheduling() {
    let journal = Journal::new();
    let descs = vec![
        AddonDescriptor::new("a", FakeAddon::new("a", &journal)),
        AddonDescriptor::new("b", FakeAddon::new("b", &journal).failing_now()),
        AddonDescriptor::new("c", FakeAddon::new("c", &journal)),
    ];
    let reg = registry(&descs);
    let mut info = cluster_info("aborted", &[]);
    let err = deploy_addons(&descs, &reg, false, &mut info).await.unwrap_err();

    assert!(err.to_string().contains("b refused to deploy"));
    assert_eq!(journal.with_prefix("deploy:"), vec!["a", "b"]);
    assert_eq!(info.addon_states(), &btreemap! {
        "a".to_string() => AddonState::Scheduled,
        "b".to_string() => AddonState::Failed,
        "c".to_string() => AddonState::Pending,
    });
}

#[tokio::test]
async fn skipped_addons_leave_no_entry() {
    let journal = Journal::new();
    let descs = vec![
        AddonDescriptor::new("a", FakeAddon::new("a", &journal).skipped()),
        AddonDescriptor::new("b", FakeAddon::new("b", &journal)),
    ];
    let reg = registry(&descs);
    let mut info = cluster_info("skipping", &[]);
    deploy_addons(&descs, &reg, false, &mut info).await.unwrap();

    assert!(!info.has_scheduled_addon("a"));
    assert_eq!(info.addon_state("a"), Some(AddonState::Resolved));
    assert_eq!(info.scheduled_names().to_vec(), vec!["b"]);

    // nothing to depend on
    let descs = vec![
        AddonDescriptor::new("a", FakeAddon::new("a", &journal).skipped()),
        AddonDescriptor::new("b", FakeAddon::new("b", &journal)).depends_on("a"),
    ];
    let reg = registry(&descs);
    let mut info = cluster_info("skipping", &[]);
    let err = deploy_addons(&descs, &reg, false, &mut info).await.unwrap_err();
    assert!(err.to_string().contains("Missing a dependency for a"));
}

#[tokio::test]
async fn addons_deploy_once() {
    let journal = Journal::new();
    let descs = vec![
        AddonDescriptor::new("a", FakeAddon::new("a", &journal).skipped()),
        AddonDescriptor::new("a", FakeAddon::new("a", &journal).skipped()),
    ];
    let reg = registry(&descs[..1]);
    let mut info = cluster_info("twice", &[]);
    let err = deploy_addons(&descs, &reg, false, &mut info).await.unwrap_err();
    assert_eq!(err.to_string(), "Add-on a is already scheduled in twice");
    assert!(journal.entries().is_empty());

    // scheduling directly is guarded too, also for addons leaving no entry
    let mut info = cluster_info("twice", &[]);
    schedule(&descs[0], &reg, false, &mut info).unwrap();
    let err = schedule(&descs[1], &reg, false, &mut info).unwrap_err();
    assert_eq!(err.to_string(), "Add-on a is already scheduled in twice");
    assert_eq!(journal.with_prefix("deploy:"), vec!["a"]);
    assert_eq!(info.addon_state("a"), Some(AddonState::Resolved));
}
