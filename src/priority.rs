// src/priority.rs

//! Source-priority resolution of version requirements
//!
//! Every version source tags its requirement with a source name. The priority
//! table maps those names (exactly, or by pattern for project files) to an
//! integer priority. The highest-priority requirement supplies the version;
//! the build/launch flags of every requirement are OR-merged onto it.

use crate::diagnostics;
use crate::requirement::{source, VersionRequirement};
use regex::Regex;
use std::cmp::Reverse;
use std::sync::LazyLock;
use tracing::{debug, info};

/// Project files: `*.csproj`, `*.fsproj`, `*.vbproj`
static PROJECT_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*\.(cs|fs|vb)proj$").unwrap());

/// Priority of the fallback entry (empty or unmatched source)
pub const FALLBACK_PRIORITY: i32 = -1;

/// How a priority table key is compared against a source tag
#[derive(Debug, Clone)]
pub enum SourceMatcher {
    /// The tag must equal this string
    Exact(String),
    /// The tag must match this pattern
    Pattern(Regex),
}

impl SourceMatcher {
    pub fn matches(&self, tag: &str) -> bool {
        match self {
            SourceMatcher::Exact(s) => s == tag,
            SourceMatcher::Pattern(re) => re.is_match(tag),
        }
    }
}

/// Ordered mapping from source tag to priority; higher wins
#[derive(Debug, Clone)]
pub struct PriorityTable {
    entries: Vec<(SourceMatcher, i32)>,
}

impl PriorityTable {
    /// A table holding only the fallback entry
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add an exact-match key
    pub fn exact(mut self, tag: impl Into<String>, priority: i32) -> Self {
        self.entries.push((SourceMatcher::Exact(tag.into()), priority));
        self
    }

    /// Add a pattern key
    pub fn pattern(mut self, pattern: Regex, priority: i32) -> Self {
        self.entries.push((SourceMatcher::Pattern(pattern), priority));
        self
    }

    /// The SDK's source priorities
    ///
    /// | source                                          | priority |
    /// |-------------------------------------------------|----------|
    /// | `BP_DOTNET_SDK_VERSION`, `BP_DOTNET_FRAMEWORK_VERSION` | 5 |
    /// | `RUNTIME_VERSION`                               | 4        |
    /// | `buildpack.yml`                                 | 3        |
    /// | `global.json`                                   | 2        |
    /// | `*.csproj`/`*.fsproj`/`*.vbproj`                | 1        |
    /// | `runtimeconfig.json`                            | 1        |
    /// | anything else                                   | -1       |
    pub fn dotnet_sdk() -> Self {
        Self::new()
            .exact(source::SDK_VERSION_ENV, 5)
            .exact(source::FRAMEWORK_VERSION_ENV, 5)
            .exact(source::RUNTIME_VERSION, 4)
            .exact(source::BUILDPACK_YML, 3)
            .exact(source::GLOBAL_JSON, 2)
            .exact(source::RUNTIME_CONFIG_JSON, 1)
            .pattern(PROJECT_FILE_RE.clone(), 1)
    }

    /// Priority of a source tag
    ///
    /// Exact keys are consulted before patterns, so a pattern can never
    /// shadow a reserved tag. The empty tag always gets the fallback.
    pub fn priority_of(&self, tag: &str) -> i32 {
        if tag.is_empty() {
            return FALLBACK_PRIORITY;
        }

        let lookup = |exact: bool| {
            self.entries
                .iter()
                .find(|(matcher, _)| {
                    matches!(matcher, SourceMatcher::Exact(_)) == exact && matcher.matches(tag)
                })
                .map(|(_, priority)| *priority)
        };

        lookup(true)
            .or_else(|| lookup(false))
            .unwrap_or(FALLBACK_PRIORITY)
    }
}

impl Default for PriorityTable {
    fn default() -> Self {
        Self::dotnet_sdk()
    }
}

/// Outcome of priority resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Highest-priority requirement with merged flags
    pub winner: VersionRequirement,
    /// Every requirement considered, in priority order
    pub candidates: Vec<VersionRequirement>,
}

/// Picks one requirement out of many by source priority
#[derive(Debug, Clone, Default)]
pub struct PriorityResolver {
    table: PriorityTable,
}

impl PriorityResolver {
    pub fn new(table: PriorityTable) -> Self {
        Self { table }
    }

    /// Choose the winning requirement
    ///
    /// Sorting is stable, so requirements of equal priority keep their input
    /// order. Returns `None` only when there are no requirements at all.
    pub fn resolve(&self, requirements: Vec<VersionRequirement>) -> Option<Resolution> {
        let resolution = self.rank(requirements)?;
        Self::report(&resolution);
        Some(resolution)
    }

    /// Like [`resolve`](Self::resolve), accepting any version when nothing
    /// was requested
    pub fn resolve_or_any(&self, requirements: Vec<VersionRequirement>) -> Resolution {
        let resolution = self.rank(requirements).unwrap_or_else(|| {
            debug!("No version requirements, accepting any SDK version");
            let winner = VersionRequirement::any();
            Resolution {
                candidates: vec![winner.clone()],
                winner,
            }
        });
        Self::report(&resolution);
        resolution
    }

    fn rank(&self, requirements: Vec<VersionRequirement>) -> Option<Resolution> {
        let mut candidates = requirements;
        candidates.sort_by_key(|req| Reverse(self.table.priority_of(req.source_tag())));

        let mut winner = candidates.first()?.clone();
        winner.build = candidates.iter().any(|req| req.build);
        winner.launch = candidates.iter().any(|req| req.launch);

        Some(Resolution { winner, candidates })
    }

    fn report(resolution: &Resolution) {
        for line in diagnostics::candidates_table(&resolution.candidates).lines() {
            info!("{}", line);
        }
        debug!("Chose version requirement {}", resolution.winner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(source: &str, version: &str) -> VersionRequirement {
        let mut r = VersionRequirement::new(version, source);
        if source.is_empty() {
            r.source = None;
        }
        r
    }

    #[test]
    fn test_default_priorities() {
        let table = PriorityTable::dotnet_sdk();
        assert_eq!(table.priority_of("BP_DOTNET_SDK_VERSION"), 5);
        assert_eq!(table.priority_of("RUNTIME_VERSION"), 4);
        assert_eq!(table.priority_of("buildpack.yml"), 3);
        assert_eq!(table.priority_of("global.json"), 2);
        assert_eq!(table.priority_of("runtimeconfig.json"), 1);
        assert_eq!(table.priority_of(""), -1);
        assert_eq!(table.priority_of("package.json"), -1);
    }

    #[test]
    fn test_project_file_pattern() {
        let table = PriorityTable::dotnet_sdk();
        assert_eq!(table.priority_of("app.csproj"), 1);
        assert_eq!(table.priority_of("src/Lib.fsproj"), 1);
        assert_eq!(table.priority_of("legacy.vbproj"), 1);
        assert_eq!(table.priority_of("app.csproj.bak"), -1);
        assert_eq!(table.priority_of("notes.proj"), -1);
    }

    #[test]
    fn test_exact_keys_win_over_patterns() {
        let table = PriorityTable::new()
            .pattern(Regex::new(".*").unwrap(), 7)
            .exact("buildpack.yml", 3);
        assert_eq!(table.priority_of("buildpack.yml"), 3);
        assert_eq!(table.priority_of("anything"), 7);
    }

    #[test]
    fn test_resolve_picks_highest_priority() {
        let resolver = PriorityResolver::new(
            PriorityTable::new()
                .exact("RUNTIME_VERSION", 4)
                .exact("buildpack.yml", 3),
        );

        let resolution = resolver
            .resolve(vec![
                req("", "other-version"),
                req("RUNTIME_VERSION", "1.2.3"),
                req("buildpack.yml", "1.2.4"),
            ])
            .unwrap();

        assert_eq!(resolution.winner, req("RUNTIME_VERSION", "1.2.3"));
        let order: Vec<_> = resolution.candidates.iter().map(|r| r.source_label()).collect();
        assert_eq!(order, vec!["RUNTIME_VERSION", "buildpack.yml", "<unknown>"]);
    }

    #[test]
    fn test_resolve_ties_keep_input_order() {
        let resolver = PriorityResolver::default();
        let resolution = resolver
            .resolve(vec![
                req("runtimeconfig.json", "6.0.0"),
                req("app.csproj", "7.0.0"),
            ])
            .unwrap();
        assert_eq!(resolution.winner.source_tag(), "runtimeconfig.json");

        let resolution = resolver
            .resolve(vec![
                req("app.csproj", "7.0.0"),
                req("runtimeconfig.json", "6.0.0"),
            ])
            .unwrap();
        assert_eq!(resolution.winner.source_tag(), "app.csproj");
    }

    #[test]
    fn test_resolve_merges_flags_from_all_requirements() {
        let resolver = PriorityResolver::default();
        let resolution = resolver
            .resolve(vec![
                req("buildpack.yml", "6.0.100"),
                VersionRequirement::any().with_build(true),
                VersionRequirement::any().with_launch(true),
            ])
            .unwrap();

        assert_eq!(resolution.winner.source_tag(), "buildpack.yml");
        assert_eq!(resolution.winner.version.as_deref(), Some("6.0.100"));
        assert!(resolution.winner.build);
        assert!(resolution.winner.launch);
    }

    #[test]
    fn test_resolve_leaves_flags_unset_when_nobody_asks() {
        let resolver = PriorityResolver::default();
        let resolution = resolver.resolve(vec![req("global.json", "8.0.100")]).unwrap();
        assert!(!resolution.winner.build);
        assert!(!resolution.winner.launch);
    }

    #[test]
    fn test_resolve_empty() {
        assert!(PriorityResolver::default().resolve(Vec::new()).is_none());
    }

    #[test]
    fn test_resolve_or_any_without_requirements() {
        let resolution = PriorityResolver::default().resolve_or_any(Vec::new());
        assert_eq!(resolution.winner, VersionRequirement::any());
        assert_eq!(resolution.candidates, vec![VersionRequirement::any()]);
        assert_eq!(
            diagnostics::candidates_table(&resolution.candidates),
            "Candidate version sources (in priority order):\n  <unknown> -> \"*\""
        );
    }

    #[test]
    fn test_resolve_or_any_matches_resolve() {
        let reqs = vec![req("global.json", "8.0.100"), req("buildpack.yml", "6.0.*")];
        let resolver = PriorityResolver::default();
        assert_eq!(
            resolver.resolve_or_any(reqs.clone()),
            resolver.resolve(reqs).unwrap()
        );
    }
}
