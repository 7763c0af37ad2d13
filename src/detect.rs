// src/detect.rs

//! Detection: declare what the buildpack provides and requires
//!
//! Detection always passes. It provides `dotnet-sdk` and, when the
//! application pins a version through the environment or `buildpack.yml`,
//! requires it at that version.

use crate::context::Environment;
use crate::error::Result;
use crate::requirement::{PlanEntry, SDK_DEPENDENCY, VersionRequirement};
use crate::sources::{self, BuildpackYmlSource, EnvironmentSource, VersionSource};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// A dependency this buildpack can provide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provision {
    pub name: String,
}

/// Build plan produced by detection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
    #[serde(default)]
    pub provides: Vec<Provision>,
    #[serde(default)]
    pub requires: Vec<PlanEntry>,
}

impl BuildPlan {
    /// Render as `plan.toml`
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    /// Requirements as version requirements, in plan order
    pub fn requirements(&self) -> Vec<VersionRequirement> {
        self.requires.iter().cloned().map(VersionRequirement::from).collect()
    }
}

/// Run detection for the application in `working_dir`
pub fn detect(working_dir: &Path, env: &Environment) -> Result<BuildPlan> {
    let detectors: [&dyn VersionSource; 2] = [&EnvironmentSource, &BuildpackYmlSource];
    let found = sources::collect(&detectors, env, working_dir)?;

    debug!("Detection found {} version requirement(s)", found.len());

    Ok(BuildPlan {
        provides: vec![Provision {
            name: SDK_DEPENDENCY.to_string(),
        }],
        requires: found.iter().map(PlanEntry::from).collect(),
    })
}
