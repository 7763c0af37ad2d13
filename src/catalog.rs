// src/catalog.rs

//! Dependency catalog loaded from `buildpack.toml`
//!
//! The catalog lists every installable SDK artifact plus the
//! runtime-to-SDK compatibility table. Both are read-only for the lifetime
//! of a build.
//!
//! ```toml
//! [[metadata.dependencies]]
//! id = "dotnet-sdk"
//! version = "6.0.428"
//! stacks = ["io.buildpacks.stacks.jammy"]
//! os = "linux"
//! arch = "amd64"
//! checksum = "sha256:..."
//!
//! [[metadata.runtime-to-sdks]]
//! runtime-version = "6.0.36"
//! sdks = ["6.0.428"]
//! ```

use crate::context::TargetPlatform;
use crate::error::{Error, Result};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Stack wildcard accepted by every stack
pub const ANY_STACK: &str = "*";

/// One installable artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub version: Version,
    #[serde(default)]
    pub stacks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    /// Older catalogs carry a bare SHA-256 instead of `checksum`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl CatalogEntry {
    pub fn new<S: Into<String>>(
        id: impl Into<String>,
        version: Version,
        stacks: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            id: id.into(),
            name: None,
            version,
            stacks: stacks.into_iter().map(Into::into).collect(),
            os: None,
            arch: None,
            uri: None,
            checksum: None,
            sha256: None,
        }
    }

    /// Content checksum, preferring `checksum` over `sha256`
    pub fn content_checksum(&self) -> Option<&str> {
        self.checksum.as_deref().or(self.sha256.as_deref())
    }

    /// Whether the entry supports the stack, directly or through `*`
    pub fn supports_stack(&self, stack: &str) -> bool {
        self.stacks.iter().any(|s| s == stack || s == ANY_STACK)
    }

    /// Whether the entry's platform tags accept the target
    pub fn supports_platform(&self, platform: &TargetPlatform) -> bool {
        platform.is_compatible(self.os.as_deref(), self.arch.as_deref())
    }
}

/// One row of the runtime-to-SDK compatibility table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeToSdks {
    #[serde(rename = "runtime-version")]
    pub runtime_version: String,
    #[serde(default)]
    pub sdks: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogMetadata {
    #[serde(default)]
    dependencies: Vec<CatalogEntry>,
    #[serde(default, rename = "runtime-to-sdks")]
    runtime_to_sdks: Vec<RuntimeToSdks>,
}

#[derive(Debug, Default, Deserialize)]
struct BuildpackToml {
    #[serde(default)]
    metadata: CatalogMetadata,
}

/// The dependency catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub entries: Vec<CatalogEntry>,
    pub runtime_to_sdks: Vec<RuntimeToSdks>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries,
            runtime_to_sdks: Vec::new(),
        }
    }

    pub fn with_runtime_to_sdks(mut self, rows: Vec<RuntimeToSdks>) -> Self {
        self.runtime_to_sdks = rows;
        self
    }

    /// Load the catalog from a `buildpack.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::CatalogLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::parse_named(&content, &path.display().to_string())
    }

    /// Parse catalog TOML held in memory
    pub fn parse(content: &str) -> Result<Self> {
        Self::parse_named(content, "<inline>")
    }

    fn parse_named(content: &str, path: &str) -> Result<Self> {
        let toml: BuildpackToml = toml::from_str(content).map_err(|e| Error::CatalogLoad {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        debug!(
            "Loaded catalog {} ({} dependencies, {} runtime mappings)",
            path,
            toml.metadata.dependencies.len(),
            toml.metadata.runtime_to_sdks.len()
        );

        Ok(Self {
            entries: toml.metadata.dependencies,
            runtime_to_sdks: toml.metadata.runtime_to_sdks,
        })
    }

    /// Entries for `id` that support the stack and platform, in catalog order
    pub fn compatible_entries(
        &self,
        id: &str,
        stack: &str,
        platform: &TargetPlatform,
    ) -> Vec<&CatalogEntry> {
        self.entries
            .iter()
            .filter(|entry| {
                entry.id == id && entry.supports_stack(stack) && entry.supports_platform(platform)
            })
            .collect()
    }

    /// SDK version paired with a runtime version (first listed SDK wins)
    pub fn sdk_for_runtime(&self, runtime_version: &str) -> Result<&str> {
        self.runtime_to_sdks
            .iter()
            .find(|row| row.runtime_version == runtime_version)
            .and_then(|row| row.sdks.first())
            .map(String::as_str)
            .ok_or_else(|| Error::NoRuntimeMapping(runtime_version.to_string()))
    }
}
