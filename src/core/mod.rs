pub mod allocator;
pub mod compat;
pub mod engine;
pub mod filter;
pub mod profile;
pub mod reconciler;

pub use crate::domain::model::{Build, CompatibilityReport, RequirementsProfile, Synthesis};
pub use compat::check_compatibility;
pub use engine::{synthesize_build, BuildEngine, BuildOutcome};
pub use profile::build_requirements_profile;
