// src/context.rs

//! Per-invocation build inputs
//!
//! Resolution never reads the process environment directly. The binary
//! captures it once into an [`Environment`] and everything downstream works
//! from that snapshot, which keeps parsers and matchers pure.

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the target OS of catalog entries
pub const TARGET_OS_ENV: &str = "CNB_TARGET_OS";
/// Environment variable overriding the target architecture of catalog entries
pub const TARGET_ARCH_ENV: &str = "CNB_TARGET_ARCH";
/// Environment variable carrying the stack id
pub const STACK_ID_ENV: &str = "CNB_STACK_ID";
/// Environment variable carrying the buildpack directory
pub const BUILDPACK_DIR_ENV: &str = "CNB_BUILDPACK_DIR";

/// Name of the dependency catalog inside the buildpack directory
pub const CATALOG_FILE: &str = "buildpack.toml";

/// An immutable snapshot of environment variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Capture the current process environment
    pub fn capture() -> Self {
        env::vars().collect()
    }

    /// Look up a variable
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Look up a variable, treating an empty value as unset
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// The OS/architecture pair that catalog entries are filtered against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPlatform {
    pub os: String,
    pub arch: String,
}

impl TargetPlatform {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Detect the host platform using the catalog's naming (`linux`, `amd64`)
    pub fn host() -> Self {
        Self::new(env::consts::OS, Self::catalog_arch(env::consts::ARCH))
    }

    /// Target platform from `CNB_TARGET_OS`/`CNB_TARGET_ARCH`, falling back to the host
    pub fn from_env(env: &Environment) -> Self {
        let host = Self::host();
        Self {
            os: env
                .get_non_empty(TARGET_OS_ENV)
                .map(str::to_string)
                .unwrap_or(host.os),
            arch: env
                .get_non_empty(TARGET_ARCH_ENV)
                .map(str::to_string)
                .unwrap_or(host.arch),
        }
    }

    /// Translate a Rust architecture name into the catalog's naming
    fn catalog_arch(arch: &str) -> String {
        match arch {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            "x86" => "386",
            other => other,
        }
        .to_string()
    }

    /// Check if an entry's platform tags are compatible with this target
    ///
    /// Absent tags are unconstrained.
    pub fn is_compatible(&self, os: Option<&str>, arch: Option<&str>) -> bool {
        let os_ok = match os {
            None | Some("") => true,
            Some(os) => os == self.os,
        };
        let arch_ok = match arch {
            None | Some("") => true,
            Some(arch) => arch == self.arch,
        };
        os_ok && arch_ok
    }
}

/// Everything one build invocation needs to resolve the SDK
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Application source directory
    pub working_dir: PathBuf,
    /// Buildpack directory holding `buildpack.toml`
    pub buildpack_dir: PathBuf,
    /// Stack id that catalog entries must support
    pub stack: String,
    /// Version of this buildpack, used in deprecation notices
    pub buildpack_version: String,
    /// Platform that catalog entries must support
    pub platform: TargetPlatform,
    /// Environment snapshot
    pub env: Environment,
}

impl BuildContext {
    pub fn new(
        working_dir: impl Into<PathBuf>,
        buildpack_dir: impl Into<PathBuf>,
        stack: impl Into<String>,
        env: Environment,
    ) -> Self {
        let platform = TargetPlatform::from_env(&env);
        Self {
            working_dir: working_dir.into(),
            buildpack_dir: buildpack_dir.into(),
            stack: stack.into(),
            buildpack_version: env!("CARGO_PKG_VERSION").to_string(),
            platform,
            env,
        }
    }

    /// Set the buildpack version
    pub fn with_buildpack_version(mut self, version: impl Into<String>) -> Self {
        self.buildpack_version = version.into();
        self
    }

    /// Path to the dependency catalog
    pub fn catalog_path(&self) -> PathBuf {
        self.buildpack_dir.join(CATALOG_FILE)
    }

    /// Directory the SDK is exposed through inside the application
    pub fn dotnet_root(&self) -> PathBuf {
        dotnet_root(&self.working_dir)
    }
}

/// `<working-dir>/.dotnet_root`
pub fn dotnet_root(working_dir: &Path) -> PathBuf {
    working_dir.join(".dotnet_root")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_lookup() {
        let env: Environment = [("A", "1"), ("EMPTY", "")].into_iter().collect();
        assert_eq!(env.get("A"), Some("1"));
        assert_eq!(env.get("EMPTY"), Some(""));
        assert_eq!(env.get_non_empty("EMPTY"), None);
        assert_eq!(env.get("MISSING"), None);
    }

    #[test]
    fn test_target_platform_from_env_overrides_host() {
        let env: Environment = [(TARGET_OS_ENV, "linux"), (TARGET_ARCH_ENV, "arm64")]
            .into_iter()
            .collect();
        let platform = TargetPlatform::from_env(&env);
        assert_eq!(platform, TargetPlatform::new("linux", "arm64"));
    }

    #[test]
    fn test_host_arch_uses_catalog_names() {
        assert_eq!(TargetPlatform::catalog_arch("x86_64"), "amd64");
        assert_eq!(TargetPlatform::catalog_arch("aarch64"), "arm64");
        assert_eq!(TargetPlatform::catalog_arch("riscv64"), "riscv64");
    }

    #[test]
    fn test_platform_compatibility() {
        let target = TargetPlatform::new("linux", "amd64");

        // Untagged entries are compatible with everything
        assert!(target.is_compatible(None, None));
        assert!(target.is_compatible(Some("linux"), Some("amd64")));
        assert!(target.is_compatible(Some("linux"), None));
        assert!(!target.is_compatible(Some("linux"), Some("arm64")));
        assert!(!target.is_compatible(Some("windows"), Some("amd64")));
    }

    #[test]
    fn test_build_context_paths() {
        let ctx = BuildContext::new("/workspace", "/cnb/buildpacks/sdk", "bionic", Environment::default());
        assert_eq!(ctx.catalog_path(), PathBuf::from("/cnb/buildpacks/sdk/buildpack.toml"));
        assert_eq!(ctx.dotnet_root(), PathBuf::from("/workspace/.dotnet_root"));
    }
}
