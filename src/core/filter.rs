use crate::catalog::Catalog;
use crate::domain::model::{Category, GpuTier, Part, RequirementsProfile};
use std::collections::BTreeMap;

/// Share of the budget a GPU may cost when the profile does not need high-tier headroom.
const GPU_BUDGET_SHARE_LIMIT: f64 = 0.80;

/// Per-category candidates after sizing filters, in catalog order.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool<'a> {
    by_category: BTreeMap<Category, Vec<&'a Part>>,
}

impl<'a> CandidatePool<'a> {
    pub fn get(&self, category: Category) -> &[&'a Part] {
        self.by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.by_category.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Whether `part` survives the sizing filters for `profile` at `budget`.
///
/// Only RAM and GPU are filtered. A zero budget disables the GPU price ceiling.
pub fn keeps_part(profile: &RequirementsProfile, part: &Part, budget: u32) -> bool {
    match part.category {
        Category::Ram => part.capacity() >= profile.recommended_ram.min(32),
        Category::Gpu => {
            let vram = part.vram();
            if profile.gpu_vram > 0 && vram < profile.gpu_vram {
                return false;
            }
            if vram < profile.gpu_tier.vram_floor_gb() {
                return false;
            }
            if budget > 0
                && profile.gpu_tier != GpuTier::High
                && part.price > f64::from(budget) * GPU_BUDGET_SHARE_LIMIT
            {
                return false;
            }
            true
        }
        _ => true,
    }
}

/// Narrows the catalog to parts meeting the profile.
///
/// A category the filters would empty falls back to its unfiltered parts, so
/// the pool is never empty for a category the catalog has parts for.
pub fn filter_candidates<'a>(
    profile: &RequirementsProfile,
    catalog: &'a Catalog,
    budget: u32,
) -> CandidatePool<'a> {
    let mut by_category = BTreeMap::new();

    for category in Category::ALL {
        let mut kept: Vec<&Part> = catalog
            .in_category(category)
            .filter(|p| keeps_part(profile, p, budget))
            .collect();

        if kept.is_empty() {
            kept = catalog.in_category(category).collect();
            if !kept.is_empty() {
                tracing::debug!(
                    "{}: no part meets the profile, using all {} catalog parts",
                    category,
                    kept.len()
                );
            }
        }

        by_category.insert(category, kept);
    }

    CandidatePool { by_category }
}
