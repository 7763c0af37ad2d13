// src/rollforward.rs

//! Roll-forward constraint expansion
//!
//! A declared SDK version plus a roll-forward policy expands into an ordered
//! list of version ranges, most restrictive first. The matcher stops at the
//! first range with any catalog hit.
//!
//! SDK patch numbers are grouped into feature bands of 100: `6.0.205` is in
//! band 2 of `6.0`, and the band's successor starts at `6.0.300`.

use crate::error::{Error, Result};
use crate::version::{parse_version, VersionConstraint};
use semver::Version;
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Number of patch versions in one feature band
pub const FEATURE_BAND_WIDTH: u64 = 100;

/// Roll-forward policies understood by `global.json`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, AsRefStr, EnumIter,
)]
#[strum(serialize_all = "camelCase")]
pub enum RollForwardPolicy {
    /// Only the declared version
    Disabled,
    /// Declared version, then the latest patch in its feature band
    #[default]
    Patch,
    /// Like `Patch`, then the next feature band
    Feature,
    /// Like `Feature`, then the first band of the next minor version
    Minor,
    /// Like `Minor`, then the first band of the next major version
    Major,
    /// Latest patch in the declared feature band
    LatestPatch,
    /// Latest band of the declared minor version
    LatestFeature,
    /// Latest minor of the declared major version
    LatestMinor,
    /// Latest version overall
    LatestMajor,
}

impl RollForwardPolicy {
    /// Parse a policy name, failing on anything unrecognized
    pub fn parse(name: &str) -> Result<Self> {
        Self::from_str(name).map_err(|_| Error::InvalidPolicy(name.to_string()))
    }
}

/// Which tier of a policy a constraint belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ConstraintTier {
    Exact,
    Patch,
    Feature,
    Minor,
    Major,
}

/// One named version range derived from a declared version and a policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollForwardConstraint {
    /// Tier label ("exact", "patch", ...)
    pub tier: ConstraintTier,
    /// Range expression, e.g. `>= 6.0.205, < 6.0.300`
    pub expression: String,
    /// Compiled form of `expression`
    pub constraint: VersionConstraint,
}

impl RollForwardConstraint {
    fn new(tier: ConstraintTier, expression: String) -> Result<Self> {
        let constraint = VersionConstraint::parse(&expression)?;
        Ok(Self {
            tier,
            expression,
            constraint,
        })
    }

    /// Human label, e.g. "patch"
    pub fn name(&self) -> &str {
        self.tier.as_ref()
    }

    /// Check a catalog version against this range
    pub fn matches(&self, version: &Version, allow_prerelease: bool) -> bool {
        self.constraint.satisfies_with(version, allow_prerelease)
    }
}

/// Feature band a patch number falls in (`805` is band 8)
pub fn feature_band(patch: u64) -> u64 {
    patch / FEATURE_BAND_WIDTH
}

/// First patch number of a feature band, `None` past `u64::MAX`
pub fn band_floor(band: u64) -> Option<u64> {
    band.checked_mul(FEATURE_BAND_WIDTH)
}

fn too_large(version: &Version) -> Error {
    Error::InvalidVersion {
        version: version.to_string(),
        reason: "version component too large to roll forward".to_string(),
    }
}

/// Expand a version string and policy name into ordered constraints
pub fn expand(version: &str, policy: &str) -> Result<Vec<RollForwardConstraint>> {
    let policy = RollForwardPolicy::parse(policy)?;
    let version = parse_version(version)?;
    expand_constraints(&version, policy)
}

/// Expand a declared version under a policy, most restrictive first
pub fn expand_constraints(
    version: &Version,
    policy: RollForwardPolicy,
) -> Result<Vec<RollForwardConstraint>> {
    use RollForwardPolicy::*;

    let (major, minor) = (version.major, version.minor);
    let band = feature_band(version.patch);
    // First patch of the band `offset` bands above the declared one
    let band_start = |offset: u64| {
        band.checked_add(offset)
            .and_then(band_floor)
            .ok_or_else(|| too_large(version))
    };
    let mut constraints = Vec::new();

    if matches!(policy, Disabled | Patch) {
        constraints.push(RollForwardConstraint::new(
            ConstraintTier::Exact,
            version.to_string(),
        )?);
    }

    if matches!(policy, Patch | Feature | Minor | Major | LatestPatch) {
        constraints.push(RollForwardConstraint::new(
            ConstraintTier::Patch,
            format!(">= {}, < {}.{}.{}", version, major, minor, band_start(1)?),
        )?);
    }

    if matches!(policy, Feature | Minor | Major) {
        constraints.push(RollForwardConstraint::new(
            ConstraintTier::Feature,
            format!(
                ">= {major}.{minor}.{}, < {major}.{minor}.{}",
                band_start(1)?,
                band_start(2)?,
            ),
        )?);
    }

    if matches!(policy, Minor | Major) {
        let next = minor.checked_add(1).ok_or_else(|| too_large(version))?;
        constraints.push(RollForwardConstraint::new(
            ConstraintTier::Minor,
            format!(
                ">= {major}.{next}.{}, < {major}.{next}.{}",
                FEATURE_BAND_WIDTH,
                2 * FEATURE_BAND_WIDTH,
            ),
        )?);
    }

    if policy == Major {
        let next = major.checked_add(1).ok_or_else(|| too_large(version))?;
        constraints.push(RollForwardConstraint::new(
            ConstraintTier::Major,
            format!(
                ">= {next}.0.{}, < {next}.0.{}",
                FEATURE_BAND_WIDTH,
                2 * FEATURE_BAND_WIDTH
            ),
        )?);
    }

    match policy {
        LatestFeature => constraints.push(RollForwardConstraint::new(
            ConstraintTier::Feature,
            format!(">= {}, <= {}.{}.*", version, major, minor),
        )?),
        LatestMinor => constraints.push(RollForwardConstraint::new(
            ConstraintTier::Minor,
            format!(">= {}, <= {}.*.*", version, major),
        )?),
        LatestMajor => constraints.push(RollForwardConstraint::new(
            ConstraintTier::Major,
            format!(">= {}", version),
        )?),
        _ => {}
    }

    Ok(constraints)
}
