// tests/resolution.rs

//! Catalog resolution tests: priority, roll-forward tiers, failures.

mod common;

use common::{sdk_catalog, STACK};
use dotnet_core_sdk::{
    expand, CatalogMatcher, Error, PriorityResolver, RollForwardPolicy, SdkResolver,
    TargetPlatform, VersionRequirement,
};
use semver::Version;

fn global_json(version: &str, policy: RollForwardPolicy) -> VersionRequirement {
    VersionRequirement::new(version, "global.json").with_roll_forward(policy)
}

#[test]
fn test_feature_policy_selects_highest_in_next_band() {
    let catalog = sdk_catalog(&["8.0.416", "9.0.307", "9.0.366", "9.0.507", "10.0.100"]);
    let matcher = CatalogMatcher::new(&catalog, TargetPlatform::host());

    let entry = matcher
        .resolve(&global_json("9.0.200", RollForwardPolicy::Feature), STACK)
        .unwrap();
    assert_eq!(entry.version, Version::new(9, 0, 366));
}

#[test]
fn test_patch_policy_failure_lists_supported_versions() {
    let catalog = sdk_catalog(&["8.0.416", "9.0.307", "9.0.366", "9.0.507", "10.0.100"]);
    let matcher = CatalogMatcher::new(&catalog, TargetPlatform::host());

    let err = matcher
        .resolve(&global_json("8.0.100", RollForwardPolicy::Patch), STACK)
        .unwrap_err();
    assert!(err.is_unsatisfied());
    let message = err.to_string();
    for v in ["8.0.416", "9.0.307", "9.0.366", "9.0.507", "10.0.100"] {
        assert!(message.contains(v), "{} missing from {}", v, message);
    }
}

#[test]
fn test_earlier_tier_beats_newer_versions() {
    let catalog = sdk_catalog(&["6.0.310", "6.1.105", "7.0.105"]);
    let matcher = CatalogMatcher::new(&catalog, TargetPlatform::host());

    let entry = matcher
        .resolve(&global_json("6.0.205", RollForwardPolicy::Major), STACK)
        .unwrap();
    assert_eq!(entry.version, Version::new(6, 0, 310));
}

#[test]
fn test_latest_policies() {
    let catalog = sdk_catalog(&["6.0.100", "6.0.428", "6.1.100", "7.0.410", "8.0.100"]);
    let matcher = CatalogMatcher::new(&catalog, TargetPlatform::host());

    let cases = [
        (RollForwardPolicy::LatestPatch, "6.0.100"),
        (RollForwardPolicy::LatestFeature, "6.0.428"),
        (RollForwardPolicy::LatestMinor, "6.1.100"),
        (RollForwardPolicy::LatestMajor, "8.0.100"),
    ];
    for (policy, expected) in cases {
        let entry = matcher.resolve(&global_json("6.0.100", policy), STACK).unwrap();
        assert_eq!(entry.version.to_string(), expected, "policy {}", policy);
    }
}

#[test]
fn test_disabled_policy_requires_exact_version() {
    let present = sdk_catalog(&["6.0.100", "6.0.101"]);
    let entry = CatalogMatcher::new(&present, TargetPlatform::host())
        .resolve(&global_json("6.0.100", RollForwardPolicy::Disabled), STACK)
        .unwrap();
    assert_eq!(entry.version, Version::new(6, 0, 100));

    let absent = sdk_catalog(&["6.0.101"]);
    let err = CatalogMatcher::new(&absent, TargetPlatform::host())
        .resolve(&global_json("6.0.100", RollForwardPolicy::Disabled), STACK)
        .unwrap_err();
    assert!(err.is_unsatisfied());
}

#[test]
fn test_policy_nesting() {
    let counts: Vec<usize> = ["patch", "feature", "minor", "major"]
        .iter()
        .map(|policy| expand("6.0.205", policy).unwrap().len())
        .collect();
    assert!(counts.windows(2).all(|w| w[0] < w[1]), "{:?}", counts);
}

#[test]
fn test_expand_rejects_bad_input() {
    assert!(matches!(expand("6.0.205", "sideways"), Err(Error::InvalidPolicy(_))));
    assert!(matches!(expand("six", "patch"), Err(Error::InvalidVersion { .. })));
}

#[test]
fn test_resolver_uses_priority_before_matching() {
    let catalog = sdk_catalog(&["1.2.3", "1.2.4"]);
    let mut unknown = VersionRequirement::new("other-version", "");
    unknown.source = None;
    let reqs = vec![
        unknown,
        VersionRequirement::new("1.2.3", "RUNTIME_VERSION"),
        VersionRequirement::new("1.2.4", "buildpack.yml"),
    ];

    let selection = SdkResolver::new(&catalog, TargetPlatform::host())
        .resolve(reqs, STACK)
        .unwrap();
    assert_eq!(selection.resolution.winner.source_tag(), "RUNTIME_VERSION");
    assert_eq!(selection.resolution.candidates.len(), 3);
    assert_eq!(selection.dependency.version, Version::new(1, 2, 3));
}

#[test]
fn test_flags_merge_across_candidates() {
    let reqs = vec![
        VersionRequirement::new("6.0.*", "buildpack.yml"),
        VersionRequirement::any().with_build(true),
    ];
    let resolution = PriorityResolver::default().resolve(reqs).unwrap();
    assert_eq!(resolution.winner.source_tag(), "buildpack.yml");
    assert!(resolution.winner.build);
    assert!(!resolution.winner.launch);
}

#[test]
fn test_wrong_stack_is_no_compatible_version() {
    let catalog = sdk_catalog(&["6.0.100"]);
    let err = CatalogMatcher::new(&catalog, TargetPlatform::host())
        .resolve(&VersionRequirement::new("6.0.100", "buildpack.yml"), "io.buildpacks.stacks.jammy")
        .unwrap_err();
    assert!(matches!(err, Error::NoCompatibleVersion { ref supported_versions, .. } if supported_versions.is_empty()));
}

#[test]
fn test_resolution_is_idempotent() {
    let catalog = sdk_catalog(&["6.0.100", "6.0.300", "6.0.428"]);
    let resolver = SdkResolver::new(&catalog, TargetPlatform::host());
    let reqs = vec![global_json("6.0.100", RollForwardPolicy::LatestFeature)];

    let first = resolver.resolve(reqs.clone(), STACK).unwrap();
    let second = resolver.resolve(reqs, STACK).unwrap();
    assert_eq!(first, second);
}
