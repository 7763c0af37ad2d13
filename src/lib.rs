// src/lib.rs

//! .NET Core SDK version resolution for a cloud-native buildpack
//!
//! Several places can declare which SDK an application needs: environment
//! variables, `buildpack.yml`, `global.json`, and the installed runtime. This
//! crate collects those declarations, picks one by source priority, expands
//! `global.json` roll-forward policies into ordered version ranges, and
//! selects the matching artifact from the buildpack's dependency catalog.
//!
//! # Architecture
//!
//! - Sources: each yields at most one [`VersionRequirement`]
//! - Priority: a fixed table ranks requirements by source tag
//! - Roll-forward: policy plus version becomes a list of constraint tiers
//! - Matching: the first tier with a compatible catalog entry decides

pub mod build;
pub mod catalog;
pub mod context;
pub mod detect;
pub mod diagnostics;
mod error;
pub mod matcher;
pub mod priority;
pub mod requirement;
pub mod rollforward;
pub mod sources;
pub mod version;

pub use build::{
    build, build_with_catalog, BomEntry, BuildResult, BuildpackPlan, LayerDecision, LayerFlags,
    SdkResolver,
};
pub use catalog::{Catalog, CatalogEntry, RuntimeToSdks};
pub use context::{BuildContext, Environment, TargetPlatform};
pub use detect::{detect, BuildPlan};
pub use error::{Error, Result};
pub use matcher::CatalogMatcher;
pub use priority::{PriorityResolver, PriorityTable, Resolution};
pub use requirement::{PlanEntry, VersionRequirement, SDK_DEPENDENCY};
pub use rollforward::{expand, RollForwardConstraint, RollForwardPolicy};
pub use version::{parse_version, VersionConstraint};
