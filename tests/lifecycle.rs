// tests/lifecycle.rs

//! Detect and build against on-disk apps and buildpack.toml catalogs.

mod common;

use common::{buildpack_toml, env, Workspace};
use dotnet_core_sdk::{build, detect, BuildpackPlan, Error, LayerDecision};
use semver::Version;

const VERSIONS: &[&str] = &["6.0.100", "6.0.136", "6.0.428", "7.0.410", "8.0.404"];

#[test]
fn test_detect_then_build_through_plan() {
    let ws = Workspace::new(&buildpack_toml(VERSIONS, None));
    ws.write("buildpack.yml", "dotnet-sdk:\n  version: \"6.0.*\"\n");

    let vars = [("BP_DOTNET_SDK_VERSION", "7.0.410")];
    let plan = detect(ws.app_path(), &env(&vars)).unwrap();
    assert_eq!(plan.requires.len(), 2);

    let buildpack_plan = BuildpackPlan {
        entries: plan.requires.clone(),
    };
    let rendered = toml::to_string(&buildpack_plan).unwrap();
    let reloaded = BuildpackPlan::parse(&rendered).unwrap();

    let result = build(&ws.context(&vars), reloaded.requirements(), None).unwrap();
    assert_eq!(result.requirement.source_tag(), "BP_DOTNET_SDK_VERSION");
    assert_eq!(result.dependency.version, Version::new(7, 0, 410));
    assert_eq!(result.decision, LayerDecision::Install);
    assert_eq!(result.bom.name, "Dotnet SDK");
    assert_eq!(result.bom.checksum.as_deref(), Some("sha256:7.0.410"));
    assert_eq!(
        result.bom.uri.as_deref(),
        Some("https://example.org/dotnet-sdk/7.0.410.tar.xz")
    );
}

#[test]
fn test_buildpack_yml_wins_over_global_json() {
    let ws = Workspace::new(&buildpack_toml(VERSIONS, None));
    ws.write("buildpack.yml", "dotnet-sdk:\n  version: 6.0\n");
    ws.write("global.json", r#"{"sdk": {"version": "8.0.100", "rollForward": "latestMajor"}}"#);

    let reqs = detect(ws.app_path(), &env(&[])).unwrap().requirements();
    let result = build(&ws.context(&[]), reqs, None).unwrap();

    assert_eq!(result.requirement.source_tag(), "buildpack.yml");
    assert_eq!(result.dependency.version, Version::new(6, 0, 428));
}

#[test]
fn test_global_json_found_above_working_dir() {
    let ws = Workspace::new(&buildpack_toml(VERSIONS, None));
    ws.write("global.json", r#"{"sdk": {"version": "6.0.100", "rollForward": "latestFeature"}}"#);
    ws.write("src/app/app.csproj", "<Project />");

    let mut ctx = ws.context(&[]);
    ctx.working_dir = ws.app_path().join("src").join("app");

    let result = build(&ctx, Vec::new(), None).unwrap();
    assert_eq!(result.requirement.source_tag(), "global.json");
    assert_eq!(result.dependency.version, Version::new(6, 0, 428));
}

#[test]
fn test_cached_layer_is_reused() {
    let ws = Workspace::new(&buildpack_toml(VERSIONS, None));
    let vars = [("BP_DOTNET_SDK_VERSION", "6.0.136")];

    let reqs = detect(ws.app_path(), &env(&vars)).unwrap().requirements();
    let result = build(&ws.context(&vars), reqs, Some("sha256:6.0.136")).unwrap();
    assert_eq!(result.decision, LayerDecision::Reuse);
}

#[test]
fn test_runtime_version_conflict() {
    let ws = Workspace::new(&buildpack_toml(VERSIONS, Some(("6.0.36", "6.0.428"))));
    let vars = [("BP_DOTNET_SDK_VERSION", "6.0.100"), ("RUNTIME_VERSION", "6.0.36")];

    let reqs = detect(ws.app_path(), &env(&vars)).unwrap().requirements();
    let err = build(&ws.context(&vars), reqs, None).unwrap_err();

    assert!(matches!(err, Error::IncompatibleRuntime { .. }));
    assert_eq!(
        err.to_string(),
        "SDK version specified in BP_DOTNET_SDK_VERSION (6.0.100) is incompatible with installed runtime version (6.0.36)"
    );
}

#[test]
fn test_runtime_version_selects_mapped_sdk() {
    let ws = Workspace::new(&buildpack_toml(VERSIONS, Some(("6.0.36", "6.0.428"))));
    let result = build(&ws.context(&[("RUNTIME_VERSION", "6.0.36")]), Vec::new(), None).unwrap();

    assert_eq!(result.requirement.source_tag(), "RUNTIME_VERSION");
    assert_eq!(result.dependency.version, Version::new(6, 0, 428));
}

#[test]
fn test_unreadable_catalog() {
    let ws = Workspace::new("[[metadata.dependencies]\nbroken");
    let err = build(&ws.context(&[]), Vec::new(), None).unwrap_err();

    assert!(matches!(err, Error::CatalogLoad { .. }));
    assert!(!err.is_unsatisfied());
}

#[test]
fn test_malformed_global_json_aborts_build() {
    let ws = Workspace::new(&buildpack_toml(VERSIONS, None));
    ws.write("global.json", "{ \"sdk\": ");

    let err = build(&ws.context(&[]), Vec::new(), None).unwrap_err();
    assert!(matches!(err, Error::Parse { ref source_name, .. } if source_name == "global.json"));
}
