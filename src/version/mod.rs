// src/version/mod.rs

//! Version handling and constraint satisfaction for SDK requirements
//!
//! This module parses the version expressions that appear in version sources
//! (`6.0.100`, `6.0.*`, `>= 6.0.205, < 6.0.300`, `~7.0.100`) and checks
//! catalog versions against them using semantic-version precedence.

use crate::error::{Error, Result};
use semver::{Prerelease, Version};
use std::fmt;

/// Parse a semantic version, tolerating a leading `v` and missing
/// minor/patch components (`6.0` becomes `6.0.0`)
pub fn parse_version(s: &str) -> Result<Version> {
    let trimmed = s.trim();
    let raw = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);

    if let Ok(v) = Version::parse(raw) {
        return Ok(v);
    }

    // Pad the numeric core out to three components and retry
    let core_end = raw.find(['-', '+']).unwrap_or(raw.len());
    let (core, suffix) = raw.split_at(core_end);
    let components = core.split('.').count();
    if !core.is_empty() && components < 3 {
        let padded = format!("{}{}{}", core, ".0".repeat(3 - components), suffix);
        if let Ok(v) = Version::parse(&padded) {
            return Ok(v);
        }
    }

    Err(Error::InvalidVersion {
        version: s.to_string(),
        reason: "Invalid Semantic Version".to_string(),
    })
}

/// A version with optional trailing components, e.g. `6`, `6.0`, `6.0.*`
#[derive(Debug, Clone, PartialEq, Eq)]
struct PartialVersion {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    pre: Prerelease,
}

impl PartialVersion {
    fn parse(constraint: &str, s: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidConstraint {
            constraint: constraint.to_string(),
            reason: reason.to_string(),
        };

        let s = s.trim();
        let s = s.strip_prefix('v').unwrap_or(s);
        if s.is_empty() {
            return Err(invalid("missing version"));
        }

        // Build metadata never takes part in matching
        let s = s.split('+').next().unwrap_or(s);
        let (core, pre) = match s.split_once('-') {
            Some((core, pre)) => {
                let pre = Prerelease::new(pre).map_err(|e| invalid(&e.to_string()))?;
                (core, pre)
            }
            None => (s, Prerelease::EMPTY),
        };

        let mut parts = [None; 3];
        let mut wildcard_seen = false;
        for (i, part) in core.split('.').enumerate() {
            if i >= 3 {
                return Err(invalid("too many version components"));
            }
            if matches!(part, "*" | "x" | "X") {
                wildcard_seen = true;
                continue;
            }
            if wildcard_seen {
                return Err(invalid("numeric component after wildcard"));
            }
            let n = part
                .parse::<u64>()
                .map_err(|_| invalid(&format!("'{}' is not a number", part)))?;
            parts[i] = Some(n);
        }

        if !pre.is_empty() && parts.iter().any(Option::is_none) {
            return Err(invalid("pre-release requires a full version"));
        }

        Ok(Self {
            major: parts[0],
            minor: parts[1],
            patch: parts[2],
            pre,
        })
    }

    fn is_full(&self) -> bool {
        self.patch.is_some()
    }

    /// Lowest version covered
    fn floor(&self) -> Version {
        let mut v = Version::new(
            self.major.unwrap_or(0),
            self.minor.unwrap_or(0),
            self.patch.unwrap_or(0),
        );
        v.pre = self.pre.clone();
        v
    }

    /// First version past the covered range, `None` when unbounded
    ///
    /// A wildcard on a component already at `u64::MAX` has nothing above it.
    fn ceiling(&self) -> Option<Version> {
        match (self.major, self.minor, self.patch) {
            (None, _, _) => None,
            (Some(major), None, _) => Some(Version::new(major.checked_add(1)?, 0, 0)),
            (Some(major), Some(minor), None) => Some(Version::new(major, minor.checked_add(1)?, 0)),
            (Some(major), Some(minor), Some(patch)) => {
                Some(Version::new(major, minor, patch.checked_add(1)?))
            }
        }
    }

    fn full(&self) -> Option<Version> {
        self.is_full().then(|| self.floor())
    }
}

/// Version constraint operators
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionConstraint {
    /// Any version is acceptable
    Any,
    /// Exact version match
    Exact(Version),
    /// Greater than
    GreaterThan(Version),
    /// Greater than or equal
    GreaterOrEqual(Version),
    /// Less than
    LessThan(Version),
    /// Less than or equal
    LessOrEqual(Version),
    /// Not equal
    NotEqual(Version),
    /// All constraints must be satisfied (ranges like ">= 1.0, < 2.0")
    All(Vec<VersionConstraint>),
    /// At least one constraint must be satisfied ("6.0.* || 7.0.*")
    AnyOf(Vec<VersionConstraint>),
}

impl VersionConstraint {
    /// Parse a version constraint string
    ///
    /// Examples:
    /// - "" or "*" or "default" → Any
    /// - "1.2.3" → Exact(1.2.3)
    /// - "6.0.*" → >= 6.0.0, < 6.1.0
    /// - ">= 6.0.205, < 6.0.300" → both bounds
    /// - "<= 6.*.*" → < 7.0.0
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s == "*" || s == "default" {
            return Ok(VersionConstraint::Any);
        }

        if s.contains("||") {
            let alternatives = s
                .split("||")
                .map(Self::parse)
                .collect::<Result<Vec<_>>>()?;
            return Ok(VersionConstraint::AnyOf(alternatives));
        }

        if s.contains(',') {
            let terms = s
                .split(',')
                .map(|term| Self::parse_single(s, term.trim()))
                .collect::<Result<Vec<_>>>()?;
            return Ok(Self::all(terms));
        }

        Self::parse_single(s, s)
    }

    fn parse_single(whole: &str, s: &str) -> Result<Self> {
        if s.is_empty() || s == "*" {
            return Ok(VersionConstraint::Any);
        }

        // Longest operators first so ">=" is not read as ">"
        let operators = [">=", "<=", "!=", "=>", "=<", ">", "<", "=", "~", "^"];
        let (op, rest) = operators
            .iter()
            .find_map(|op| s.strip_prefix(op).map(|rest| (*op, rest)))
            .unwrap_or(("", s));

        let partial = PartialVersion::parse(whole, rest)?;
        let floor = partial.floor();

        let constraint = match op {
            ">=" | "=>" => VersionConstraint::GreaterOrEqual(floor),
            ">" => match partial.full() {
                Some(v) => VersionConstraint::GreaterThan(v),
                None => match partial.ceiling() {
                    Some(c) => VersionConstraint::GreaterOrEqual(c),
                    None => VersionConstraint::AnyOf(Vec::new()),
                },
            },
            "<" => VersionConstraint::LessThan(floor),
            "<=" | "=<" => match partial.full() {
                Some(v) => VersionConstraint::LessOrEqual(v),
                None => match partial.ceiling() {
                    Some(c) => VersionConstraint::LessThan(c),
                    None => VersionConstraint::Any,
                },
            },
            "!=" => match partial.full() {
                Some(v) => VersionConstraint::NotEqual(v),
                None => {
                    return Err(Error::InvalidConstraint {
                        constraint: whole.to_string(),
                        reason: "wildcards cannot be combined with '!='".to_string(),
                    });
                }
            },
            "~" => Self::range(floor, Self::tilde_ceiling(&partial)),
            "^" => Self::range(floor, Self::caret_ceiling(&partial)),
            // "=" and bare versions
            _ => match partial.full() {
                Some(v) => VersionConstraint::Exact(v),
                None => Self::range(floor, partial.ceiling()),
            },
        };

        Ok(constraint)
    }

    /// `~1.2.3` allows patch-level changes, `~1` allows minor-level changes
    fn tilde_ceiling(partial: &PartialVersion) -> Option<Version> {
        match (partial.major, partial.minor) {
            (Some(major), Some(minor)) => Some(Version::new(major, minor.checked_add(1)?, 0)),
            (Some(major), None) => Some(Version::new(major.checked_add(1)?, 0, 0)),
            _ => None,
        }
    }

    /// `^1.2.3` allows changes that keep the left-most non-zero component
    fn caret_ceiling(partial: &PartialVersion) -> Option<Version> {
        match (partial.major, partial.minor, partial.patch) {
            (Some(0), Some(0), Some(patch)) => Some(Version::new(0, 0, patch.checked_add(1)?)),
            (Some(0), Some(minor), _) => Some(Version::new(0, minor.checked_add(1)?, 0)),
            (Some(major), _, _) => Some(Version::new(major.checked_add(1)?, 0, 0)),
            _ => None,
        }
    }

    /// Half-open range `[floor, ceiling)`
    pub fn range(floor: Version, ceiling: Option<Version>) -> Self {
        let lower = VersionConstraint::GreaterOrEqual(floor);
        match ceiling {
            Some(c) => VersionConstraint::All(vec![lower, VersionConstraint::LessThan(c)]),
            None => lower,
        }
    }

    fn all(terms: Vec<VersionConstraint>) -> Self {
        let mut flattened = Vec::with_capacity(terms.len());
        for term in terms {
            match term {
                VersionConstraint::Any => {}
                VersionConstraint::All(inner) if !inner.is_empty() => flattened.extend(inner),
                other => flattened.push(other),
            }
        }
        match flattened.len() {
            0 => VersionConstraint::Any,
            1 => flattened.remove(0),
            _ => VersionConstraint::All(flattened),
        }
    }

    /// Check if a version satisfies this constraint
    ///
    /// Pre-release versions are only accepted by exact matches or by
    /// constraints that themselves name a pre-release.
    pub fn satisfies(&self, version: &Version) -> bool {
        self.satisfies_with(version, false)
    }

    /// Like [`satisfies`](Self::satisfies), optionally admitting every pre-release
    pub fn satisfies_with(&self, version: &Version, allow_prerelease: bool) -> bool {
        if !version.pre.is_empty()
            && !allow_prerelease
            && !self.is_exact()
            && !self.mentions_prerelease()
        {
            return false;
        }
        self.matches(version)
    }

    fn matches(&self, version: &Version) -> bool {
        match self {
            VersionConstraint::Any => true,
            VersionConstraint::Exact(v) => version == v,
            VersionConstraint::GreaterThan(v) => version > v,
            VersionConstraint::GreaterOrEqual(v) => version >= v,
            VersionConstraint::LessThan(v) => version < v,
            VersionConstraint::LessOrEqual(v) => version <= v,
            VersionConstraint::NotEqual(v) => version != v,
            VersionConstraint::All(terms) => terms.iter().all(|c| c.matches(version)),
            VersionConstraint::AnyOf(alternatives) => alternatives.iter().any(|c| c.matches(version)),
        }
    }

    fn is_exact(&self) -> bool {
        matches!(self, VersionConstraint::Exact(_))
    }

    /// Whether any bound of this constraint names a pre-release
    pub fn mentions_prerelease(&self) -> bool {
        match self {
            VersionConstraint::Any => false,
            VersionConstraint::Exact(v)
            | VersionConstraint::GreaterThan(v)
            | VersionConstraint::GreaterOrEqual(v)
            | VersionConstraint::LessThan(v)
            | VersionConstraint::LessOrEqual(v)
            | VersionConstraint::NotEqual(v) => !v.pre.is_empty(),
            VersionConstraint::All(terms) | VersionConstraint::AnyOf(terms) => {
                terms.iter().any(Self::mentions_prerelease)
            }
        }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionConstraint::Any => write!(f, "*"),
            VersionConstraint::Exact(v) => write!(f, "{}", v),
            VersionConstraint::GreaterThan(v) => write!(f, "> {}", v),
            VersionConstraint::GreaterOrEqual(v) => write!(f, ">= {}", v),
            VersionConstraint::LessThan(v) => write!(f, "< {}", v),
            VersionConstraint::LessOrEqual(v) => write!(f, "<= {}", v),
            VersionConstraint::NotEqual(v) => write!(f, "!= {}", v),
            VersionConstraint::All(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", term)?;
                }
                Ok(())
            }
            VersionConstraint::AnyOf(alternatives) => {
                for (i, alt) in alternatives.iter().enumerate() {
                    if i > 0 {
                        write!(f, " || ")?;
                    }
                    write!(f, "{}", alt)?;
                }
                Ok(())
            }
        }
    }
}
