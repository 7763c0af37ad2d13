// tests/common/mod.rs

//! Shared fixtures for integration tests: catalogs, buildpack and app dirs.

#![allow(dead_code)]

use dotnet_core_sdk::{BuildContext, Catalog, CatalogEntry, Environment};
use semver::Version;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const STACK: &str = "io.buildpacks.stacks.bionic";

/// Catalog with the given SDK versions, all for [`STACK`]
pub fn sdk_catalog(versions: &[&str]) -> Catalog {
    Catalog::new(
        versions
            .iter()
            .map(|v| {
                let mut entry = CatalogEntry::new("dotnet-sdk", Version::parse(v).unwrap(), [STACK]);
                entry.checksum = Some(format!("sha256:{}", v.replace('.', "")));
                entry.uri = Some(format!("https://example.org/dotnet-sdk/{}.tar.xz", v));
                entry
            })
            .collect(),
    )
}

/// buildpack.toml listing SDKs plus one runtime-to-SDK row
pub fn buildpack_toml(versions: &[&str], runtime: Option<(&str, &str)>) -> String {
    let mut out = String::from(
        "api = \"0.7\"\n\n[buildpack]\nid = \"paketo-buildpacks/dotnet-core-sdk\"\nversion = \"1.4.0\"\n",
    );
    for v in versions {
        out.push_str(&format!(
            "\n[[metadata.dependencies]]\nid = \"dotnet-sdk\"\nname = \"Dotnet SDK\"\nversion = \"{v}\"\nstacks = [\"{STACK}\"]\nchecksum = \"sha256:{v}\"\nuri = \"https://example.org/dotnet-sdk/{v}.tar.xz\"\n"
        ));
    }
    if let Some((runtime, sdk)) = runtime {
        out.push_str(&format!(
            "\n[[metadata.runtime-to-sdks]]\nruntime-version = \"{runtime}\"\nsdks = [\"{sdk}\"]\n"
        ));
    }
    out
}

pub fn env(vars: &[(&str, &str)]) -> Environment {
    vars.iter().copied().collect()
}

/// An app dir and a buildpack dir holding the given buildpack.toml
pub struct Workspace {
    pub app: TempDir,
    pub buildpack: TempDir,
}

impl Workspace {
    pub fn new(buildpack_toml: &str) -> Self {
        let app = tempfile::tempdir().unwrap();
        let buildpack = tempfile::tempdir().unwrap();
        fs::write(buildpack.path().join("buildpack.toml"), buildpack_toml).unwrap();
        Self { app, buildpack }
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.app.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    pub fn app_path(&self) -> &Path {
        self.app.path()
    }

    pub fn context(&self, vars: &[(&str, &str)]) -> BuildContext {
        BuildContext::new(self.app.path(), self.buildpack.path(), STACK, env(vars))
            .with_buildpack_version("1.4.0")
    }
}
