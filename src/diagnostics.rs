// src/diagnostics.rs

//! Human-readable build output
//!
//! These functions only format text. Callers decide where it goes (the build
//! logs it through `tracing`), which keeps the exact wording testable.

use crate::catalog::CatalogEntry;
use crate::requirement::VersionRequirement;
use std::fmt::Write;
use std::path::Path;

/// Display name of the SDK in build output
pub const SDK_DISPLAY_NAME: &str = ".NET Core SDK";

/// Heading of the candidate table
pub const CANDIDATES_HEADING: &str = "Candidate version sources (in priority order):";

/// Render the "source -> version" table for requirements in priority order
///
/// The source column is as wide as the longest source label.
pub fn candidates_table(candidates: &[VersionRequirement]) -> String {
    let width = candidates
        .iter()
        .map(|req| req.source_label().len())
        .max()
        .unwrap_or(0);

    let mut out = String::from(CANDIDATES_HEADING);
    for req in candidates {
        let _ = write!(
            out,
            "\n  {:<width$} -> \"{}\"",
            req.source_label(),
            req.version_spec(),
            width = width
        );
    }
    out
}

/// One-line summary of the selected dependency
pub fn selected_dependency(requirement: &VersionRequirement, entry: &CatalogEntry) -> String {
    format!(
        "Selected {} version (using {}): {}",
        SDK_DISPLAY_NAME,
        requirement.source_label(),
        entry.version
    )
}

/// Warning shown when the SDK version comes from `buildpack.yml`
pub fn buildpack_yml_deprecation(next_major: &str) -> String {
    format!(
        "WARNING: Setting the {} version through buildpack.yml will be deprecated soon in Dotnet Core SDK Buildpack v{}.",
        SDK_DISPLAY_NAME, next_major
    )
}

/// Warning shown when the deprecated framework-version variable is used
pub fn framework_version_deprecation(variable: &str, replacement: &str) -> String {
    format!(
        "WARNING: {} is deprecated and only its major.minor components are honored; use {} instead.",
        variable, replacement
    )
}

/// Environment the SDK layer contributes, one `NAME -> "value"` per line
pub fn environment_summary(dotnet_root: &Path, path_separator: char) -> String {
    let root = dotnet_root.display();
    format!(
        "DOTNET_ROOT -> \"{root}\"\nPATH        -> \"{root}{path_separator}$PATH\""
    )
}
