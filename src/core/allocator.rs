use crate::catalog::parts::{cheapest_of, priciest_of};
use crate::catalog::Catalog;
use crate::core::filter::CandidatePool;
use crate::domain::model::{
    Build, Category, Level, OwnedParts, Part, Preferences, RamType, RamTypeSet,
    RequirementsProfile, StorageType,
};
use std::collections::BTreeMap;

/// Fixed budget shares, renormalized over the categories still to buy.
pub const CATEGORY_WEIGHTS: [(Category, f64); 7] = [
    (Category::Gpu, 0.42),
    (Category::Cpu, 0.20),
    (Category::Motherboard, 0.12),
    (Category::Ram, 0.10),
    (Category::Storage, 0.08),
    (Category::Psu, 0.05),
    (Category::Case, 0.03),
];

const DEFAULT_PSU_WATTAGE: u32 = 650;
const DDR5_BUDGET_THRESHOLD: u32 = 900;
const LARGE_STORAGE_BUDGET_THRESHOLD: u32 = 1800;
const SCORE_BONUS: f64 = 5000.0;

/// Per-category spending targets for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetPlan {
    budget: f64,
    allocations: BTreeMap<Category, f64>,
}

impl BudgetPlan {
    /// Splits `budget` across non-owned categories. Owned categories get nothing.
    pub fn new(budget: u32, owned: &OwnedParts) -> Self {
        let remaining: Vec<(Category, f64)> = CATEGORY_WEIGHTS
            .iter()
            .copied()
            .filter(|(c, _)| !owned.contains(*c))
            .collect();
        let weight_sum: f64 = remaining.iter().map(|(_, w)| w).sum();
        let budget = f64::from(budget);

        let allocations = remaining
            .into_iter()
            .map(|(c, w)| (c, budget * w / weight_sum))
            .collect();

        Self {
            budget,
            allocations,
        }
    }

    pub fn allocation(&self, category: Category) -> f64 {
        self.allocations.get(&category).copied().unwrap_or(0.0)
    }

    /// Price ceiling for `category`: the stretched allocation, never above the whole budget.
    pub fn cap(&self, category: Category, stretch: f64) -> f64 {
        self.budget.min(self.allocation(category) * stretch)
    }
}

/// Highest-scoring priced part at or under `cap`. First part wins score ties.
fn pick_best_within<'a, F>(items: &[&'a Part], cap: f64, score: F) -> Option<&'a Part>
where
    F: Fn(&Part) -> f64,
{
    let mut best: Option<(&Part, f64)> = None;
    for item in items.iter().copied() {
        if !item.is_priced() || item.price > cap {
            continue;
        }
        let s = score(item);
        if best.map_or(true, |(_, best_score)| s > best_score) {
            best = Some((item, s));
        }
    }
    best.map(|(p, _)| p)
}

fn is_nvme_form_factor(part: &Part) -> bool {
    let ff = part.form_factor_lower();
    ff.contains("nvme") || ff.contains("m.2")
}

pub fn cpu_score(cpu: &Part) -> f64 {
    cpu.price
}

pub fn gpu_score(gpu: &Part) -> f64 {
    f64::from(gpu.vram()) * 10_000.0 + gpu.price
}

pub fn ram_score(ram: &Part, prefer_rgb: bool) -> f64 {
    let rgb_bonus = if prefer_rgb && ram.model.to_lowercase().contains("rgb") {
        SCORE_BONUS
    } else {
        0.0
    };
    f64::from(ram.capacity()) * 100.0 + rgb_bonus + ram.price
}

pub fn storage_score(storage: &Part) -> f64 {
    let nvme_bonus = if is_nvme_form_factor(storage) {
        SCORE_BONUS
    } else {
        0.0
    };
    f64::from(storage.capacity()) + nvme_bonus + storage.price
}

fn select_cpu(pool: &CandidatePool<'_>, plan: &BudgetPlan, level: Level) -> Option<Part> {
    let cpus = pool.get(Category::Cpu);
    let stretch = if level.is_high_end() { 1.25 } else { 1.10 };
    pick_best_within(cpus, plan.cap(Category::Cpu, stretch), cpu_score)
        .or_else(|| cheapest_of(cpus.iter().copied()))
        .cloned()
}

fn boards_for_socket<'a>(
    boards: &[&'a Part],
    socket: &str,
    preferred: Option<RamTypeSet>,
) -> Option<&'a Part> {
    priciest_of(boards.iter().copied().filter(|m| {
        m.socket_str() == socket
            && preferred.map_or(true, |pr| m.ram_types.intersects(&pr))
    }))
}

fn select_motherboard(pool: &CandidatePool<'_>, cpu: Option<&Part>, budget: u32) -> Option<Part> {
    let boards = pool.get(Category::Motherboard);
    let socket = cpu.map(Part::socket_str).unwrap_or("");
    let preferred = if budget >= DDR5_BUDGET_THRESHOLD {
        RamType::Ddr5
    } else {
        RamType::Ddr4
    };

    boards_for_socket(boards, socket, Some(RamTypeSet::only(preferred)))
        .or_else(|| boards_for_socket(boards, socket, None))
        .or_else(|| {
            tracing::debug!("no motherboard for socket '{}', using cheapest", socket);
            cheapest_of(boards.iter().copied())
        })
        .cloned()
}

fn ram_fits_board(ram: &Part, board_types: &RamTypeSet) -> bool {
    board_types.is_empty() || ram.ram_types.is_empty() || ram.ram_types.intersects(board_types)
}

fn select_ram(
    pool: &CandidatePool<'_>,
    plan: &BudgetPlan,
    profile: &RequirementsProfile,
    board: Option<&Part>,
    prefs: &Preferences,
) -> Option<Part> {
    let rams = pool.get(Category::Ram);
    let board_types = board.map(|b| b.ram_types).unwrap_or_default();
    let need_gb = if prefs.level.is_high_end() {
        profile.recommended_ram.max(32)
    } else {
        profile.recommended_ram
    };

    let candidates: Vec<&Part> = rams
        .iter()
        .copied()
        .filter(|r| ram_fits_board(r, &board_types) && r.capacity() >= need_gb)
        .collect();

    let prefer_rgb = prefs.prefer_rgb;
    pick_best_within(&candidates, plan.cap(Category::Ram, 1.25), |r| {
        ram_score(r, prefer_rgb)
    })
    .or_else(|| cheapest_of(candidates.iter().copied()))
    .or_else(|| cheapest_of(rams.iter().copied()))
    .cloned()
}

fn select_gpu(
    pool: &CandidatePool<'_>,
    catalog: &Catalog,
    plan: &BudgetPlan,
    level: Level,
) -> Option<Part> {
    let gpus = pool.get(Category::Gpu);
    let stretch = if level.is_high_end() { 1.30 } else { 1.20 };
    pick_best_within(gpus, plan.cap(Category::Gpu, stretch), gpu_score)
        .or_else(|| cheapest_of(gpus.iter().copied()))
        .or_else(|| catalog.cheapest(Category::Gpu))
        .cloned()
}

fn storage_eligible(part: &Part, desired: StorageType, need_gb: u32) -> bool {
    if part.capacity() < need_gb {
        return false;
    }
    match desired {
        StorageType::Nvme => is_nvme_form_factor(part),
        StorageType::Ssd => !part.form_factor_lower().contains("hdd"),
        StorageType::Hdd => true,
    }
}

fn select_storage(
    pool: &CandidatePool<'_>,
    plan: &BudgetPlan,
    profile: &RequirementsProfile,
    budget: u32,
    level: Level,
) -> Option<Part> {
    let drives = pool.get(Category::Storage);
    let need_gb = if budget >= LARGE_STORAGE_BUDGET_THRESHOLD || level.is_high_end() {
        2000
    } else {
        1000
    };

    let mut candidates: Vec<&Part> = drives
        .iter()
        .copied()
        .filter(|s| storage_eligible(s, profile.storage_type, need_gb))
        .collect();
    if candidates.is_empty() {
        candidates = drives.to_vec();
    }

    pick_best_within(&candidates, plan.cap(Category::Storage, 1.30), storage_score)
        .or_else(|| cheapest_of(candidates.iter().copied()))
        .cloned()
}

fn select_case(pool: &CandidatePool<'_>, gpu: Option<&Part>) -> Option<Part> {
    let cases = pool.get(Category::Case);
    let gpu_length = gpu.and_then(|g| g.length_mm).filter(|len| *len > 0.0);

    let Some(length) = gpu_length else {
        return priciest_of(cases.iter().copied()).cloned();
    };

    let fitting: Vec<&Part> = cases
        .iter()
        .copied()
        .filter(|c| c.max_gpu_length_mm.unwrap_or(0.0) >= length)
        .collect();
    if fitting.is_empty() {
        tracing::debug!("no case fits a {}mm GPU, ignoring the constraint", length);
        return priciest_of(cases.iter().copied()).cloned();
    }
    priciest_of(fitting.into_iter()).cloned()
}

fn select_psu(pool: &CandidatePool<'_>, gpu: Option<&Part>, prefer_quiet: bool) -> Option<Part> {
    let psus = pool.get(Category::Psu);
    let need = gpu
        .and_then(|g| g.psu_wattage)
        .filter(|w| *w > 0)
        .unwrap_or(DEFAULT_PSU_WATTAGE);

    let mut candidates: Vec<&Part> = psus
        .iter()
        .copied()
        .filter(|p| p.psu_wattage.unwrap_or(0) >= need)
        .collect();
    if candidates.is_empty() {
        candidates = psus.to_vec();
    }
    candidates.sort_by(|a, b| a.price.total_cmp(&b.price));

    let chosen = if prefer_quiet {
        candidates.last()
    } else {
        // third-cheapest: skips both the bargain bin and the flagship
        candidates.get(2).or_else(|| candidates.last())
    };
    chosen.map(|p| (*p).clone())
}

/// Fills every category of a build: owned parts first, then one selection per
/// remaining category, then the cheapest catalog part (or a placeholder) for
/// anything still unresolved.
pub fn allocate(
    profile: &RequirementsProfile,
    pool: &CandidatePool<'_>,
    catalog: &Catalog,
    budget: u32,
    owned: &OwnedParts,
    prefs: &Preferences,
) -> Build {
    let plan = BudgetPlan::new(budget, owned);
    let mut build = Build::new();

    for category in owned.categories() {
        if let Some(part) = owned.get(category) {
            build.set_owned(part.clone());
        }
    }

    if !owned.contains(Category::Cpu) {
        if let Some(cpu) = select_cpu(pool, &plan, prefs.level) {
            build.set_selected(Category::Cpu, cpu);
        }
    }

    if !owned.contains(Category::Motherboard) {
        if let Some(board) = select_motherboard(pool, build.get(Category::Cpu), budget) {
            build.set_selected(Category::Motherboard, board);
        }
    }

    if !owned.contains(Category::Ram) {
        let ram = select_ram(pool, &plan, profile, build.get(Category::Motherboard), prefs);
        if let Some(ram) = ram {
            build.set_selected(Category::Ram, ram);
        }
    }

    if !owned.contains(Category::Gpu) {
        if let Some(gpu) = select_gpu(pool, catalog, &plan, prefs.level) {
            build.set_selected(Category::Gpu, gpu);
        }
    }

    if !owned.contains(Category::Storage) {
        if let Some(drive) = select_storage(pool, &plan, profile, budget, prefs.level) {
            build.set_selected(Category::Storage, drive);
        }
    }

    if !owned.contains(Category::Case) {
        if let Some(case) = select_case(pool, build.get(Category::Gpu)) {
            build.set_selected(Category::Case, case);
        }
    }

    if !owned.contains(Category::Psu) {
        if let Some(psu) = select_psu(pool, build.get(Category::Gpu), prefs.prefer_quiet) {
            build.set_selected(Category::Psu, psu);
        }
    }

    for category in Category::ALL {
        if build.contains(category) {
            continue;
        }
        let part = match catalog.cheapest(category) {
            Some(p) => p.clone(),
            None => {
                tracing::warn!("catalog has no {} parts, using a placeholder", category);
                Part::placeholder(category)
            }
        };
        build.set_selected(category, part);
    }

    for (category, slot) in build.iter() {
        tracing::debug!(
            "{}: {} (${:.2}){}",
            category,
            slot.part.display_name(),
            slot.part.price,
            if slot.owned { " [owned]" } else { "" }
        );
    }

    build
}
