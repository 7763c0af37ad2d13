// src/sources/mod.rs

//! Version sources
//!
//! Each source independently looks for one kind of version declaration and
//! yields at most one requirement:
//!
//! - [`EnvironmentSource`]: `BP_DOTNET_SDK_VERSION`, or the deprecated
//!   `BP_DOTNET_FRAMEWORK_VERSION`
//! - [`BuildpackYmlSource`]: `dotnet-sdk.version` in `buildpack.yml`
//! - [`GlobalJsonSource`]: `sdk.version` and `sdk.rollForward` in the nearest
//!   `global.json`
//!
//! A missing declaration is `Ok(None)`. A declaration that is present but
//! malformed is an error.

mod buildpack_yml;
mod environment;
mod global_json;

pub use buildpack_yml::BuildpackYmlSource;
pub use environment::EnvironmentSource;
pub use global_json::{find_global_json, GlobalJson, GlobalJsonSdk, GlobalJsonSource};

use crate::context::Environment;
use crate::error::Result;
use crate::requirement::VersionRequirement;
use std::path::Path;

/// A place a version requirement can be declared
pub trait VersionSource {
    /// Source tag attached to requirements from this source
    fn name(&self) -> &str;

    /// Look for a declaration
    fn parse(&self, env: &Environment, working_dir: &Path) -> Result<Option<VersionRequirement>>;
}

/// Run sources in order, collecting every requirement found
pub fn collect(
    sources: &[&dyn VersionSource],
    env: &Environment,
    working_dir: &Path,
) -> Result<Vec<VersionRequirement>> {
    let mut requirements = Vec::new();
    for source in sources {
        if let Some(req) = source.parse(env, working_dir)? {
            tracing::debug!("Version source {} declared {}", source.name(), req.version_spec());
            requirements.push(req);
        }
    }
    Ok(requirements)
}
