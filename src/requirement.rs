// src/requirement.rs

//! Version requirements collected from version sources
//!
//! A requirement is one candidate request for the SDK. Each carries the tag
//! of the source it came from, which is all the priority resolver looks at.

use crate::rollforward::RollForwardPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dependency id of the .NET Core SDK in the catalog and the build plan
pub const SDK_DEPENDENCY: &str = "dotnet-sdk";

/// Source tags recognized by the default priority table
pub mod source {
    /// Explicit SDK version override
    pub const SDK_VERSION_ENV: &str = "BP_DOTNET_SDK_VERSION";
    /// Deprecated framework-version override (`major.minor` only)
    pub const FRAMEWORK_VERSION_ENV: &str = "BP_DOTNET_FRAMEWORK_VERSION";
    /// Installed runtime version signal
    pub const RUNTIME_VERSION: &str = "RUNTIME_VERSION";
    /// Pin file
    pub const BUILDPACK_YML: &str = "buildpack.yml";
    /// Roll-forward policy file
    pub const GLOBAL_JSON: &str = "global.json";
    /// Runtime configuration file
    pub const RUNTIME_CONFIG_JSON: &str = "runtimeconfig.json";
    /// Label shown for requirements without a source
    pub const UNKNOWN_LABEL: &str = "<unknown>";
}

/// One candidate request for a version of the SDK
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VersionRequirement {
    /// Dependency id
    pub name: String,
    /// Exact version, constraint expression, or `None` for any version
    pub version: Option<String>,
    /// Tag of the version source this came from
    pub source: Option<String>,
    /// Roll-forward policy (policy-file requirements only)
    pub roll_forward: Option<RollForwardPolicy>,
    /// Whether roll-forward may select pre-release SDKs
    pub allow_prerelease: bool,
    /// Entry must be available at build time
    pub build: bool,
    /// Entry must be available at launch time
    pub launch: bool,
}

impl VersionRequirement {
    /// A requirement for the SDK at the given version from the given source
    pub fn new(version: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: SDK_DEPENDENCY.to_string(),
            version: Some(version.into()),
            source: Some(source.into()),
            ..Self::default()
        }
    }

    /// A requirement for any SDK version with no source
    pub fn any() -> Self {
        Self {
            name: SDK_DEPENDENCY.to_string(),
            ..Self::default()
        }
    }

    pub fn with_roll_forward(mut self, policy: RollForwardPolicy) -> Self {
        self.roll_forward = Some(policy);
        self
    }

    pub fn with_build(mut self, build: bool) -> Self {
        self.build = build;
        self
    }

    pub fn with_launch(mut self, launch: bool) -> Self {
        self.launch = launch;
        self
    }

    /// Source tag, empty when unknown
    pub fn source_tag(&self) -> &str {
        self.source.as_deref().unwrap_or("")
    }

    /// Source for display, `<unknown>` when absent
    pub fn source_label(&self) -> &str {
        match self.source.as_deref() {
            None | Some("") => source::UNKNOWN_LABEL,
            Some(s) => s,
        }
    }

    /// Declared version for display and matching, `*` when absent
    pub fn version_spec(&self) -> &str {
        match self.version.as_deref() {
            None | Some("") => "*",
            Some(v) => v,
        }
    }
}

impl fmt::Display for VersionRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} (from {})", self.name, self.version_spec(), self.source_label())?;
        if let Some(policy) = self.roll_forward {
            write!(f, " [rollForward: {}]", policy)?;
        }
        Ok(())
    }
}

/// Metadata of a build plan entry as written by the lifecycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntryMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(
        default,
        rename = "version-source",
        skip_serializing_if = "Option::is_none"
    )]
    pub version_source: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub build: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub launch: bool,
}

/// One entry of a build plan (`[[entries]]` in the plan TOML)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub name: String,
    #[serde(default)]
    pub metadata: PlanEntryMetadata,
}

impl From<PlanEntry> for VersionRequirement {
    fn from(entry: PlanEntry) -> Self {
        Self {
            name: entry.name,
            version: entry.metadata.version,
            source: entry.metadata.version_source,
            build: entry.metadata.build,
            launch: entry.metadata.launch,
            ..Self::default()
        }
    }
}

impl From<&VersionRequirement> for PlanEntry {
    fn from(req: &VersionRequirement) -> Self {
        Self {
            name: req.name.clone(),
            metadata: PlanEntryMetadata {
                version: req.version.clone(),
                version_source: req.source.clone(),
                build: req.build,
                launch: req.launch,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_for_missing_source_and_version() {
        let req = VersionRequirement::any();
        assert_eq!(req.source_label(), "<unknown>");
        assert_eq!(req.source_tag(), "");
        assert_eq!(req.version_spec(), "*");
    }

    #[test]
    fn test_plan_entry_conversion() {
        let entry: PlanEntry = toml::from_str(
            r#"
            name = "dotnet-sdk"
            [metadata]
            version = "6.0.*"
            version-source = "buildpack.yml"
            launch = true
            "#,
        )
        .unwrap();

        let req = VersionRequirement::from(entry);
        assert_eq!(req.version.as_deref(), Some("6.0.*"));
        assert_eq!(req.source.as_deref(), Some("buildpack.yml"));
        assert!(req.launch);
        assert!(!req.build);
        assert_eq!(req.roll_forward, None);
    }

    #[test]
    fn test_display() {
        let req = VersionRequirement::new("8.0.100", source::GLOBAL_JSON)
            .with_roll_forward(RollForwardPolicy::LatestFeature);
        assert_eq!(
            req.to_string(),
            "dotnet-sdk 8.0.100 (from global.json) [rollForward: latestFeature]"
        );
    }
}
