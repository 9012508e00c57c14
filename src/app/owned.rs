use crate::app::intent::{compact, norm};
use crate::catalog::Catalog;
use crate::domain::model::{Category, OwnedParts, Part};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

const OWNERSHIP_PHRASES: [&str; 12] = [
    "i have",
    "i own",
    "already have",
    "already own",
    "i bought",
    "i already bought",
    "my gpu is",
    "my cpu is",
    "my motherboard is",
    "my ram is",
    "my psu is",
    "my case is",
];

/// Spec-sheet words that say nothing about which product is meant.
const STOP_TOKENS: [&str; 31] = [
    "atx", "itx", "matx", "e", "eatx", "gold", "platinum", "bronze", "titanium", "modular",
    "non", "semi", "airflow", "flow", "wifi", "rgb", "plus", "pro", "prime", "black", "white",
    "ddr4", "ddr5", "nvme", "ssd", "hdd", "gb", "tb", "w", "watt", "watts",
];

const DETECTION_ORDER: [Category; 7] = [
    Category::Cpu,
    Category::Gpu,
    Category::Motherboard,
    Category::Ram,
    Category::Storage,
    Category::Case,
    Category::Psu,
];

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z0-9]+").expect("token pattern"));

static GPU_MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(rtx|rdx|gtx|rx|arc)\s*-?\s*(\d{3,4})\b").expect("gpu pattern")
});

fn tokens(text: &str) -> HashSet<String> {
    let text = norm(text);
    TOKEN
        .find_iter(&text)
        .map(|m| m.as_str())
        .filter(|t| t.len() >= 3 && !STOP_TOKENS.contains(t))
        .map(str::to_string)
        .collect()
}

pub fn contains_ownership(message: &str) -> bool {
    let t = norm(message);
    OWNERSHIP_PHRASES.iter().any(|p| t.contains(p))
}

/// Catalog part of `category` the message names, if any.
///
/// A compact `brand model` or `model` substring match wins outright, in
/// catalog order. Otherwise the part sharing the most model tokens (at least
/// two) is picked, higher price breaking ties.
pub fn find_part_in_message<'a>(
    catalog: &'a Catalog,
    category: Category,
    message: &str,
) -> Option<&'a Part> {
    let msg_compact = compact(message);

    let direct = catalog.in_category(category).find(|p| {
        let brand_model = compact(&format!("{} {}", p.brand, p.model));
        let model = compact(&p.model);
        (!brand_model.is_empty() && msg_compact.contains(&brand_model))
            || (!model.is_empty() && msg_compact.contains(&model))
    });
    if direct.is_some() {
        return direct;
    }

    let msg_tokens = tokens(message);
    let mut best: Option<(usize, f64, &Part)> = None;
    for part in catalog.in_category(category) {
        let model_tokens = tokens(&part.model);
        if model_tokens.is_empty() {
            continue;
        }
        let overlap = model_tokens.intersection(&msg_tokens).count();
        if overlap < 2 {
            continue;
        }
        let better = match best {
            None => true,
            Some((o, price, _)) => overlap > o || (overlap == o && part.price > price),
        };
        if better {
            best = Some((overlap, part.price, part));
        }
    }
    best.map(|(_, _, part)| part)
}

/// Off-catalog GPU named loosely in the message, e.g. "rx 6700" or
/// "rtx-3070". Carries no id and no price.
fn gpu_from_mention(message: &str) -> Option<Part> {
    let t = norm(message);
    let caps = GPU_MENTION.captures(&t)?;
    let prefix = caps[1].to_uppercase();
    let number = &caps[2];

    let (brand, model) = match prefix.as_str() {
        "RTX" | "RDX" => ("NVIDIA", format!("GeForce RTX {}", number)),
        "GTX" => ("NVIDIA", format!("GeForce GTX {}", number)),
        "RX" => ("AMD", format!("Radeon RX {}", number)),
        "ARC" => ("Intel", format!("Arc {}", number)),
        _ => return None,
    };
    Some(Part::new("", Category::Gpu, brand, model, 0.0))
}

/// Parts the user says they already own. Empty unless the message contains
/// ownership wording.
pub fn detect_owned_parts(message: &str, catalog: &Catalog) -> OwnedParts {
    let mut owned = OwnedParts::new();
    if !contains_ownership(message) {
        return owned;
    }

    for category in DETECTION_ORDER {
        if let Some(part) = find_part_in_message(catalog, category, message) {
            owned.insert(part.clone());
        }
    }

    let msg_compact = compact(message);
    if msg_compact.contains("rtx3090") || msg_compact.contains("rdx3090") {
        owned.insert(Part::new("", Category::Gpu, "NVIDIA", "GeForce RTX 3090", 0.0));
    }

    if !owned.contains(Category::Gpu) {
        if let Some(gpu) = gpu_from_mention(message) {
            owned.insert(gpu);
        }
    }

    if !owned.is_empty() {
        tracing::debug!(categories = ?owned.categories(), "owned parts detected");
    }
    owned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::from_parts(vec![
            Part::new("cpu-1", Category::Cpu, "AMD", "Ryzen 5 7600", 199.0),
            Part::new("cpu-2", Category::Cpu, "Intel", "Core i5-13400F", 189.0),
            Part::new("gpu-1", Category::Gpu, "NVIDIA", "GeForce RTX 4060", 299.0),
            Part::new("psu-1", Category::Psu, "Corsair", "RM750e Gold Modular", 99.0),
            Part::new("psu-2", Category::Psu, "Corsair", "RM850e Gold Modular", 119.0),
            Part::new("case-1", Category::Case, "Lian Li", "Lancool 216 Airflow", 99.0),
            Part::new("case-2", Category::Case, "Lian Li", "Lancool 216 Mesh", 109.0),
        ])
    }

    #[test]
    fn test_no_ownership_wording_means_nothing_owned() {
        let owned = detect_owned_parts("build around a Ryzen 5 7600", &catalog());
        assert!(owned.is_empty());
    }

    #[test]
    fn test_direct_compact_match() {
        let owned = detect_owned_parts("I already have a ryzen5 7600 and need the rest", &catalog());
        assert_eq!(owned.get(Category::Cpu).map(|p| p.id.as_str()), Some("cpu-1"));
        assert_eq!(owned.len(), 1);
    }

    #[test]
    fn test_token_overlap_prefers_pricier_on_tie() {
        let catalog = catalog();
        // "lancool" + "216" overlap both cases; the dearer one wins
        let part = find_part_in_message(&catalog, Category::Case, "i own a lancool 216");
        assert_eq!(part.map(|p| p.id.as_str()), Some("case-2"));

        let none = find_part_in_message(&catalog, Category::Case, "i own a lancool");
        assert!(none.is_none());
    }

    #[test]
    fn test_rtx_3090_typo_is_synthesized() {
        let owned = detect_owned_parts("i have an RDX 3090 already", &catalog());
        let gpu = owned.get(Category::Gpu).unwrap();
        assert_eq!(gpu.model, "GeForce RTX 3090");
        assert_eq!(gpu.price, 0.0);
        assert!(gpu.id.is_empty());
        assert!(!gpu.is_placeholder());
    }

    #[test]
    fn test_generic_gpu_mention() {
        let owned = detect_owned_parts("I have a RX-6700 and 32GB", &catalog());
        let gpu = owned.get(Category::Gpu).unwrap();
        assert_eq!(gpu.brand, "AMD");
        assert_eq!(gpu.model, "Radeon RX 6700");

        let owned = detect_owned_parts("my gpu is an arc 770", &catalog());
        assert_eq!(owned.get(Category::Gpu).unwrap().model, "Arc 770");
    }

    #[test]
    fn test_catalog_gpu_beats_generic_pattern() {
        let owned = detect_owned_parts("i have an nvidia rtx 4060", &catalog());
        assert_eq!(owned.get(Category::Gpu).unwrap().id, "gpu-1");
    }
}
