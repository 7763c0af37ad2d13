// src/sources/environment.rs

//! Version overrides from environment variables

use super::VersionSource;
use crate::context::Environment;
use crate::diagnostics;
use crate::error::{Error, Result};
use crate::requirement::{source, VersionRequirement};
use crate::version::{parse_version, VersionConstraint};
use std::path::Path;
use tracing::{debug, warn};

/// Reads `BP_DOTNET_SDK_VERSION`, falling back to the deprecated
/// `BP_DOTNET_FRAMEWORK_VERSION`
///
/// The SDK variable accepts any version or constraint. The framework variable
/// only contributes its `major.minor`, which becomes a `major.minor.*` constraint.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentSource;

impl VersionSource for EnvironmentSource {
    fn name(&self) -> &str {
        source::SDK_VERSION_ENV
    }

    fn parse(&self, env: &Environment, _working_dir: &Path) -> Result<Option<VersionRequirement>> {
        if let Some(value) = env.get_non_empty(source::SDK_VERSION_ENV) {
            VersionConstraint::parse(value)
                .map_err(|e| Error::parse(source::SDK_VERSION_ENV, e))?;

            if env.get_non_empty(source::FRAMEWORK_VERSION_ENV).is_some() {
                debug!(
                    "Ignoring {} because {} is set",
                    source::FRAMEWORK_VERSION_ENV,
                    source::SDK_VERSION_ENV
                );
            }
            return Ok(Some(VersionRequirement::new(value, source::SDK_VERSION_ENV)));
        }

        if let Some(value) = env.get_non_empty(source::FRAMEWORK_VERSION_ENV) {
            let version = parse_version(value).map_err(|_| {
                Error::parse(
                    source::FRAMEWORK_VERSION_ENV,
                    format!("Invalid Semantic Version '{}'", value),
                )
            })?;

            warn!(
                "{}",
                diagnostics::framework_version_deprecation(
                    source::FRAMEWORK_VERSION_ENV,
                    source::SDK_VERSION_ENV
                )
            );
            return Ok(Some(VersionRequirement::new(
                format!("{}.{}.*", version.major, version.minor),
                source::FRAMEWORK_VERSION_ENV,
            )));
        }

        Ok(None)
    }
}
