// src/sources/buildpack_yml.rs

//! Pinned SDK version from `buildpack.yml`
//!
//! ```yaml
//! dotnet-sdk:
//!   version: 6.0.*
//! ```

use super::VersionSource;
use crate::context::Environment;
use crate::error::{Error, Result};
use crate::requirement::{source, VersionRequirement};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
struct BuildpackYml {
    #[serde(default, rename = "dotnet-sdk")]
    dotnet_sdk: Option<DotnetSdkSection>,
}

#[derive(Debug, Default, Deserialize)]
struct DotnetSdkSection {
    /// Plain scalars such as `6.10` deserialize as written
    #[serde(default)]
    version: Option<String>,
}

/// Reads the pin file from the working directory
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildpackYmlSource;

impl BuildpackYmlSource {
    /// Declared version, if the file and key exist
    pub fn read_version(working_dir: &Path) -> Result<Option<String>> {
        let path = working_dir.join(source::BUILDPACK_YML);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Io(e)),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        let parsed: BuildpackYml =
            serde_yaml::from_str(&content).map_err(|e| Error::parse(source::BUILDPACK_YML, e))?;

        let Some(version) = parsed.dotnet_sdk.and_then(|section| section.version) else {
            return Ok(None);
        };

        let version = version.trim().to_string();
        Ok((!version.is_empty()).then_some(version))
    }
}

impl VersionSource for BuildpackYmlSource {
    fn name(&self) -> &str {
        source::BUILDPACK_YML
    }

    fn parse(&self, _env: &Environment, working_dir: &Path) -> Result<Option<VersionRequirement>> {
        Ok(Self::read_version(working_dir)?
            .map(|version| VersionRequirement::new(version, source::BUILDPACK_YML)))
    }
}
