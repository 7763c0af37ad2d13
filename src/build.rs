// src/build.rs

//! Build: resolve, select and describe the SDK layer
//!
//! The build combines the plan requirements from detection with the
//! build-time signals (`RUNTIME_VERSION`, `global.json`), picks the winning
//! requirement by priority, selects a catalog entry for it, and reports what
//! the SDK layer should look like. Downloading and extracting the artifact is
//! left to the caller.

use crate::catalog::{Catalog, CatalogEntry};
use crate::context::{BuildContext, TargetPlatform};
use crate::diagnostics;
use crate::error::{Error, Result};
use crate::matcher::CatalogMatcher;
use crate::priority::{PriorityResolver, PriorityTable, Resolution};
use crate::requirement::{source, PlanEntry, VersionRequirement};
use crate::sources::{GlobalJsonSource, VersionSource};
use crate::version::parse_version;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use strum_macros::{AsRefStr, Display};
use tracing::{debug, info, warn};

/// Separator between `PATH` entries on the build host
#[cfg(windows)]
pub const PATH_LIST_SEPARATOR: char = ';';
#[cfg(not(windows))]
pub const PATH_LIST_SEPARATOR: char = ':';

/// Buildpack plan handed to the build (`[[entries]]`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildpackPlan {
    #[serde(default)]
    pub entries: Vec<PlanEntry>,
}

impl BuildpackPlan {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::parse("buildpack plan", e))
    }

    pub fn requirements(&self) -> Vec<VersionRequirement> {
        self.entries.iter().cloned().map(VersionRequirement::from).collect()
    }
}

/// Whether the cached SDK layer can be kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum LayerDecision {
    Reuse,
    Install,
}

impl LayerDecision {
    /// Reuse only when the cached checksum equals the selected entry's
    pub fn decide(cached_checksum: Option<&str>, entry: &CatalogEntry) -> Self {
        match (cached_checksum, entry.content_checksum()) {
            (Some(cached), Some(selected)) if cached == selected => LayerDecision::Reuse,
            _ => LayerDecision::Install,
        }
    }
}

/// Lifecycle flags of the SDK layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerFlags {
    pub build: bool,
    pub launch: bool,
    pub cache: bool,
}

impl LayerFlags {
    pub fn new(build: bool, launch: bool) -> Self {
        Self {
            build,
            launch,
            cache: build || launch,
        }
    }
}

/// Bill-of-materials entry for the installed SDK
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomEntry {
    pub id: String,
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    #[serde(default)]
    pub stacks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl From<&CatalogEntry> for BomEntry {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            id: entry.id.clone(),
            name: entry
                .name
                .clone()
                .unwrap_or_else(|| diagnostics::SDK_DISPLAY_NAME.to_string()),
            version: entry.version.to_string(),
            checksum: entry.content_checksum().map(str::to_string),
            stacks: entry.stacks.clone(),
            uri: entry.uri.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EnvAction {
    Prepend,
    Override,
}

/// One environment change contributed by the SDK layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvModification {
    pub name: String,
    pub action: EnvAction,
    pub value: String,
}

/// `PATH` prepended with, and `DOTNET_ROOT` set to, the dotnet root
pub fn environment_modifications(dotnet_root: &Path) -> Vec<EnvModification> {
    let root = dotnet_root.display().to_string();
    vec![
        EnvModification {
            name: "PATH".to_string(),
            action: EnvAction::Prepend,
            value: root.clone(),
        },
        EnvModification {
            name: "DOTNET_ROOT".to_string(),
            action: EnvAction::Override,
            value: root,
        },
    ]
}

/// Winning requirement and the entry selected for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub resolution: Resolution,
    pub dependency: CatalogEntry,
}

/// Priority resolution followed by catalog matching
#[derive(Debug, Clone)]
pub struct SdkResolver<'a> {
    catalog: &'a Catalog,
    priorities: PriorityResolver,
    platform: TargetPlatform,
    runtime_version: Option<String>,
}

impl<'a> SdkResolver<'a> {
    pub fn new(catalog: &'a Catalog, platform: TargetPlatform) -> Self {
        Self {
            catalog,
            priorities: PriorityResolver::new(PriorityTable::dotnet_sdk()),
            platform,
            runtime_version: None,
        }
    }

    pub fn with_runtime_version(mut self, runtime_version: Option<String>) -> Self {
        self.runtime_version = runtime_version;
        self
    }

    /// Pick the winning requirement and select its catalog entry
    ///
    /// With no requirements at all, any SDK version is acceptable.
    pub fn resolve(&self, requirements: Vec<VersionRequirement>, stack: &str) -> Result<Selection> {
        let resolution = self.priorities.resolve_or_any(requirements);

        let dependency = CatalogMatcher::new(self.catalog, self.platform.clone())
            .with_runtime_version(self.runtime_version.clone())
            .resolve(&resolution.winner, stack)?;

        Ok(Selection {
            resolution,
            dependency,
        })
    }
}

/// Everything the build decided about the SDK layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    /// Winning requirement, with build/launch merged across candidates
    pub requirement: VersionRequirement,
    pub dependency: CatalogEntry,
    pub decision: LayerDecision,
    pub layer: LayerFlags,
    pub bom: BomEntry,
    pub dotnet_root: PathBuf,
    pub environment: Vec<EnvModification>,
}

/// Run the build against the catalog in the buildpack directory
pub fn build(
    ctx: &BuildContext,
    requirements: Vec<VersionRequirement>,
    cached_checksum: Option<&str>,
) -> Result<BuildResult> {
    let catalog = Catalog::load(&ctx.catalog_path())?;
    build_with_catalog(ctx, &catalog, requirements, cached_checksum)
}

/// Run the build against an already loaded catalog
pub fn build_with_catalog(
    ctx: &BuildContext,
    catalog: &Catalog,
    mut requirements: Vec<VersionRequirement>,
    cached_checksum: Option<&str>,
) -> Result<BuildResult> {
    let runtime_version = ctx
        .env
        .get_non_empty(source::RUNTIME_VERSION)
        .map(str::to_string);

    if let Some(runtime) = &runtime_version {
        let sdk = catalog.sdk_for_runtime(runtime)?;
        debug!("Runtime {} maps to SDK {}", runtime, sdk);
        requirements.push(VersionRequirement::new(sdk, source::RUNTIME_VERSION));
    }

    if let Some(req) = GlobalJsonSource.parse(&ctx.env, &ctx.working_dir)? {
        requirements.push(req);
    }

    let selection = SdkResolver::new(catalog, ctx.platform.clone())
        .with_runtime_version(runtime_version)
        .resolve(requirements, &ctx.stack)?;
    let requirement = selection.resolution.winner;
    let dependency = selection.dependency;

    info!("{}", diagnostics::selected_dependency(&requirement, &dependency));

    if requirement.source_tag() == source::BUILDPACK_YML {
        let current = parse_version(&ctx.buildpack_version)?;
        let next_major = current.major.checked_add(1).ok_or_else(|| Error::InvalidVersion {
            version: ctx.buildpack_version.clone(),
            reason: "no next major version".to_string(),
        })?;
        warn!("{}", diagnostics::buildpack_yml_deprecation(&format!("{}.0.0", next_major)));
    }

    let decision = LayerDecision::decide(cached_checksum, &dependency);
    match decision {
        LayerDecision::Reuse => info!("Reusing cached layer for {}", dependency.version),
        LayerDecision::Install => info!("Installing {} {}", dependency.id, dependency.version),
    }

    let dotnet_root = ctx.dotnet_root();
    for line in diagnostics::environment_summary(&dotnet_root, PATH_LIST_SEPARATOR).lines() {
        info!("{}", line);
    }

    Ok(BuildResult {
        layer: LayerFlags::new(requirement.build, requirement.launch),
        bom: BomEntry::from(&dependency),
        environment: environment_modifications(&dotnet_root),
        dotnet_root,
        requirement,
        dependency,
        decision,
    })
}
