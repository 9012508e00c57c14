use crate::catalog::Catalog;
use crate::core::allocator::allocate;
use crate::core::compat::check_compatibility;
use crate::core::filter::filter_candidates;
use crate::core::reconciler::reconcile_budget;
use crate::domain::model::{
    CompatibilityReport, OwnedParts, Preferences, RequirementsProfile, Synthesis,
};
use serde::Serialize;
use std::sync::Arc;

/// Filters, allocates and then reconciles against `budget`.
///
/// Pure over its inputs: the same profile, catalog, budget, owned set and
/// preferences always produce the same build and total.
pub fn synthesize_build(
    profile: &RequirementsProfile,
    catalog: &Catalog,
    budget: u32,
    owned: &OwnedParts,
    preferences: &Preferences,
) -> Synthesis {
    let pool = filter_candidates(profile, catalog, budget);
    tracing::debug!("{} candidate parts after filtering", pool.len());

    let mut build = allocate(profile, &pool, catalog, budget, owned, preferences);
    let reconciliation = reconcile_budget(&mut build, catalog, budget);

    Synthesis {
        build,
        total: reconciliation.total,
        total_exceeds_budget: reconciliation.total_exceeds_budget,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildOutcome {
    pub synthesis: Synthesis,
    pub compatibility: CompatibilityReport,
}

/// Runs the full build pipeline over a shared, read-only catalog.
#[derive(Debug, Clone)]
pub struct BuildEngine {
    catalog: Arc<Catalog>,
}

impl BuildEngine {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn run(
        &self,
        profile: &RequirementsProfile,
        budget: u32,
        owned: &OwnedParts,
        preferences: &Preferences,
    ) -> BuildOutcome {
        tracing::info!(
            "🔧 Synthesizing build: budget ${}, {} owned part(s), level {}",
            budget,
            owned.len(),
            preferences.level.as_str()
        );

        let synthesis = synthesize_build(profile, &self.catalog, budget, owned, preferences);
        let compatibility = check_compatibility(&synthesis.build);

        tracing::info!(
            "✅ Build ready: ${:.2} to buy, {} compatibility issue(s)",
            synthesis.total,
            compatibility.issues.len()
        );

        BuildOutcome {
            synthesis,
            compatibility,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Category, Part, RamTypeSet};

    fn catalog() -> Catalog {
        Catalog::from_parts(vec![
            Part::new("c1", Category::Cpu, "AMD", "Ryzen 5 7600", 199.0).with_socket("AM5"),
            Part::new("m1", Category::Motherboard, "MSI", "B650", 160.0)
                .with_socket("AM5")
                .with_ram_types(RamTypeSet::parse("DDR5")),
            Part::new("r1", Category::Ram, "G.Skill", "Flare 16GB", 55.0)
                .with_capacity(16)
                .with_ram_types(RamTypeSet::parse("DDR5")),
            Part::new("g1", Category::Gpu, "AMD", "RX 7600", 269.0)
                .with_vram(8)
                .with_length(267.0)
                .with_wattage(550),
            Part::new("s1", Category::Storage, "WD", "SN770 1TB", 70.0)
                .with_capacity(1000)
                .with_form_factor("M.2 NVMe"),
            Part::new("p1", Category::Psu, "Corsair", "RM650", 85.0).with_wattage(650),
            Part::new("k1", Category::Case, "NZXT", "H5", 80.0).with_max_gpu_length(365.0),
        ])
    }

    #[test]
    fn test_engine_run_produces_compatible_build() {
        let engine = BuildEngine::new(Arc::new(catalog()));
        let outcome = engine.run(
            &RequirementsProfile::default(),
            1200,
            &OwnedParts::new(),
            &Preferences::default(),
        );

        assert!(outcome.synthesis.build.is_complete());
        assert!(outcome.compatibility.compatible, "{:?}", outcome.compatibility);
        assert_eq!(outcome.synthesis.total, 918.0);
        assert!(!outcome.synthesis.total_exceeds_budget);
    }

    #[test]
    fn test_synthesize_is_deterministic() {
        let catalog = catalog();
        let profile = RequirementsProfile::default();
        let owned = OwnedParts::new();
        let prefs = Preferences::default();

        let first = synthesize_build(&profile, &catalog, 1000, &owned, &prefs);
        let second = synthesize_build(&profile, &catalog, 1000, &owned, &prefs);
        assert_eq!(first, second);
    }
}
