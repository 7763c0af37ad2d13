// src/sources/global_json.rs

//! SDK version and roll-forward policy from `global.json`
//!
//! The nearest `global.json` in the working directory or any parent wins.
//!
//! ```json
//! { "sdk": { "version": "6.0.100", "rollForward": "latestFeature", "allowPrerelease": false } }
//! ```

use super::VersionSource;
use crate::context::Environment;
use crate::error::{Error, Result};
use crate::requirement::{source, VersionRequirement};
use crate::rollforward::RollForwardPolicy;
use crate::version::parse_version;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Parsed `global.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GlobalJson {
    #[serde(default)]
    pub sdk: Option<GlobalJsonSdk>,
}

/// The `sdk` section of `global.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GlobalJsonSdk {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, rename = "allowPrerelease")]
    pub allow_prerelease: Option<bool>,
    #[serde(default, rename = "rollForward")]
    pub roll_forward: Option<String>,
}

impl GlobalJson {
    pub fn parse(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::parse(source::GLOBAL_JSON, e))
    }

    /// Convert the `sdk` section into a requirement
    ///
    /// A missing section or version yields `None`. The policy defaults to
    /// `patch`; pre-releases are allowed by default only when the declared
    /// version is itself a pre-release.
    pub fn requirement(&self) -> Result<Option<VersionRequirement>> {
        let Some(sdk) = &self.sdk else {
            return Ok(None);
        };
        let Some(version) = sdk.version.as_deref().map(str::trim).filter(|v| !v.is_empty())
        else {
            return Ok(None);
        };

        let parsed = parse_version(version).map_err(|e| Error::parse(source::GLOBAL_JSON, e))?;

        let policy = match sdk.roll_forward.as_deref() {
            Some(name) => RollForwardPolicy::parse(name)?,
            None => RollForwardPolicy::default(),
        };

        let mut req = VersionRequirement::new(version, source::GLOBAL_JSON).with_roll_forward(policy);
        req.allow_prerelease = sdk.allow_prerelease.unwrap_or(!parsed.pre.is_empty());
        Ok(Some(req))
    }
}

fn candidates(dir: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    dir.ancestors().map(|d| d.join(source::GLOBAL_JSON))
}

/// Find and parse the nearest `global.json` at or above `dir`
pub fn find_global_json(dir: &Path) -> Result<Option<GlobalJson>> {
    for path in candidates(dir) {
        if !path.is_file() {
            continue;
        }
        debug!("Found {}", path.display());
        let content = fs::read_to_string(&path)?;
        return GlobalJson::parse(&content).map(Some);
    }
    Ok(None)
}

/// Reads the nearest `global.json`
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalJsonSource;

impl VersionSource for GlobalJsonSource {
    fn name(&self) -> &str {
        source::GLOBAL_JSON
    }

    fn parse(&self, _env: &Environment, working_dir: &Path) -> Result<Option<VersionRequirement>> {
        match find_global_json(working_dir)? {
            Some(global) => global.requirement(),
            None => Ok(None),
        }
    }
}
