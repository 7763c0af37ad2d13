// src/matcher.rs

//! Dependency selection from the catalog
//!
//! This module picks the single catalog entry that satisfies the winning
//! version requirement for a stack and platform.
//!
//! Selection criteria:
//! 1. Entry id, stack and platform must be compatible
//! 2. Plain requirements: entries satisfying the constraint, highest version wins
//! 3. Roll-forward requirements: the first tier with any hit decides, highest
//!    version within that tier wins
//! 4. With an installed runtime, the choice must also satisfy the runtime's
//!    mapped SDK version

use crate::catalog::{Catalog, CatalogEntry};
use crate::context::TargetPlatform;
use crate::error::{Error, Result};
use crate::requirement::VersionRequirement;
use crate::rollforward::{expand_constraints, RollForwardPolicy};
use crate::version::{parse_version, VersionConstraint};
use tracing::{debug, info};

/// Selects catalog entries for version requirements
#[derive(Debug, Clone)]
pub struct CatalogMatcher<'a> {
    catalog: &'a Catalog,
    platform: TargetPlatform,
    runtime_version: Option<String>,
}

impl<'a> CatalogMatcher<'a> {
    pub fn new(catalog: &'a Catalog, platform: TargetPlatform) -> Self {
        Self {
            catalog,
            platform,
            runtime_version: None,
        }
    }

    /// Cross-check selections against an installed runtime version
    pub fn with_runtime_version(mut self, runtime_version: Option<String>) -> Self {
        self.runtime_version = runtime_version.filter(|v| !v.is_empty());
        self
    }

    /// Select the best entry for `requirement` on `stack`
    pub fn resolve(&self, requirement: &VersionRequirement, stack: &str) -> Result<CatalogEntry> {
        let available = self
            .catalog
            .compatible_entries(&requirement.name, stack, &self.platform);

        debug!(
            "Matching {} against {} catalog entries for stack {} ({}/{})",
            requirement,
            available.len(),
            stack,
            self.platform.os,
            self.platform.arch
        );

        // An installed runtime pins the SDK through the compatibility table,
        // which takes over from roll-forward entirely
        if let Some(runtime_version) = &self.runtime_version {
            return self.resolve_for_runtime(requirement, stack, &available, runtime_version);
        }

        match requirement.roll_forward {
            Some(policy) => self.resolve_roll_forward(requirement, policy, stack, &available),
            None => {
                let matching = Self::satisfying(requirement, stack, &available)?;
                Ok(Self::select_highest(&matching)
                    .ok_or_else(|| Self::no_compatible(requirement, stack, &available))?
                    .clone())
            }
        }
    }

    /// Entries satisfying the requirement's version constraint
    fn satisfying<'c>(
        requirement: &VersionRequirement,
        stack: &str,
        available: &[&'c CatalogEntry],
    ) -> Result<Vec<&'c CatalogEntry>> {
        let constraint = VersionConstraint::parse(requirement.version_spec())?;
        let matching: Vec<_> = available
            .iter()
            .copied()
            .filter(|entry| constraint.satisfies(&entry.version))
            .collect();

        if matching.is_empty() {
            return Err(Self::no_compatible(requirement, stack, available));
        }
        Ok(matching)
    }

    fn resolve_roll_forward(
        &self,
        requirement: &VersionRequirement,
        policy: RollForwardPolicy,
        stack: &str,
        available: &[&CatalogEntry],
    ) -> Result<CatalogEntry> {
        let declared = parse_version(requirement.version_spec())?;
        let constraints = expand_constraints(&declared, policy)?;

        // The first tier with any match decides, even if a later tier holds
        // a newer version
        for constraint in &constraints {
            let matching: Vec<_> = available
                .iter()
                .copied()
                .filter(|entry| constraint.matches(&entry.version, requirement.allow_prerelease))
                .collect();

            if let Some(best) = Self::select_highest(&matching) {
                info!(
                    "Roll-forward '{}' matched tier '{}' ({}): {}",
                    policy,
                    constraint.name(),
                    constraint.expression,
                    best.version
                );
                return Ok(best.clone());
            }

            debug!(
                "Roll-forward tier '{}' ({}) matched nothing",
                constraint.name(),
                constraint.expression
            );
        }

        Err(Error::RollForwardExhausted {
            requested: declared.to_string(),
            policy: policy.to_string(),
            stack: stack.to_string(),
            supported_versions: Self::versions(available),
        })
    }

    fn resolve_for_runtime(
        &self,
        requirement: &VersionRequirement,
        stack: &str,
        available: &[&CatalogEntry],
        runtime_version: &str,
    ) -> Result<CatalogEntry> {
        let matching = Self::satisfying(requirement, stack, available)?;

        let mapped = self.catalog.sdk_for_runtime(runtime_version)?;
        let compatible = VersionConstraint::parse(mapped)?;
        debug!(
            "Runtime {} maps to SDK {}, checking {} candidates",
            runtime_version,
            mapped,
            matching.len()
        );

        let allowed: Vec<_> = matching
            .into_iter()
            .filter(|entry| compatible.satisfies(&entry.version))
            .collect();

        Self::select_highest(&allowed)
            .cloned()
            .ok_or_else(|| Error::IncompatibleRuntime {
                source_name: requirement.source_label().to_string(),
                requested: requirement.version_spec().to_string(),
                runtime_version: runtime_version.to_string(),
            })
    }

    /// Highest version, first in catalog order on ties
    pub fn select_highest<'c>(candidates: &[&'c CatalogEntry]) -> Option<&'c CatalogEntry> {
        candidates.iter().copied().fold(None, |best, entry| match best {
            Some(b) if b.version >= entry.version => Some(b),
            _ => Some(entry),
        })
    }

    fn versions(entries: &[&CatalogEntry]) -> Vec<String> {
        entries.iter().map(|e| e.version.to_string()).collect()
    }

    fn no_compatible(
        requirement: &VersionRequirement,
        stack: &str,
        available: &[&CatalogEntry],
    ) -> Error {
        Error::NoCompatibleVersion {
            dependency: requirement.name.clone(),
            requested: requirement.version_spec().to_string(),
            stack: stack.to_string(),
            supported_versions: Self::versions(available),
        }
    }
}
