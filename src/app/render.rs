use crate::app::lookup::RequirementRecord;
use crate::core::BuildOutcome;
use crate::domain::model::{Category, Level, OwnedParts, Part, TitleKind, TitleRequirement};
use serde::Serialize;

/// Order parts are listed in a build reply.
pub const DISPLAY_ORDER: [Category; 7] = [
    Category::Cpu,
    Category::Gpu,
    Category::Ram,
    Category::Storage,
    Category::Motherboard,
    Category::Psu,
    Category::Case,
];

pub const DEFAULT_REASON: &str = "Chosen for strong value and a balanced, practical build.";

const OVER_BUDGET_NOTE: &str = "Note: Your budget is below the cheapest full build using the current inventory. This is the closest complete build available.";

const SPECS_FOLLOW_UP: &str = "If you want, say: 'Build me a PC for this' + your budget, and I will generate a full parts list.";

/// Whole dollars print without decimals, anything else with up to two.
pub fn format_money(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        let text = format!("{:.2}", rounded);
        text.trim_end_matches('0').to_string()
    }
}

fn shows_minimum(level: Level) -> bool {
    matches!(level, Level::Minimum | Level::Both)
}

fn shows_recommended(level: Level) -> bool {
    !matches!(level, Level::Minimum)
}

fn high_end_block(lines: &mut Vec<String>, gpu_line: &str) {
    lines.extend([
        String::new(),
        "High-End (Future-Proof) Suggestion:".to_string(),
        "- RAM: 32 GB+".to_string(),
        gpu_line.to_string(),
        "- Storage: NVMe SSD preferred".to_string(),
    ]);
}

/// Requirements text for a title found in the local catalogs.
pub fn render_title_requirements(title: &TitleRequirement, level: Level) -> String {
    let mut lines = vec![title.name.clone()];

    match title.kind {
        TitleKind::Game => {
            let storage = title.storage_gb.unwrap_or(0);
            if shows_minimum(level) {
                lines.extend([
                    String::new(),
                    "Minimum Requirements:".to_string(),
                    format!("- GPU: {}", title.min_gpu.as_deref().unwrap_or("")),
                    format!("- RAM: {} GB", title.min_ram.unwrap_or(0)),
                    format!("- Storage: {} GB", storage),
                ]);
            }
            if shows_recommended(level) {
                lines.extend([
                    String::new(),
                    "Recommended Requirements:".to_string(),
                    format!("- GPU: {}", title.recommended_gpu.as_deref().unwrap_or("")),
                    format!("- RAM: {} GB", title.recommended_ram.unwrap_or(0)),
                    format!("- Storage: {} GB", storage),
                ]);
            }
            if level.is_high_end() {
                high_end_block(&mut lines, "- GPU: 16 GB VRAM class");
            }
        }
        TitleKind::App => {
            let cores = title.cpu_cores.unwrap_or(4);
            let vram = title.gpu_vram.unwrap_or(0);
            let storage = title.storage_type.map_or("SSD", |s| s.as_str());
            if shows_minimum(level) {
                lines.extend([
                    String::new(),
                    "Minimum Requirements:".to_string(),
                    format!("- CPU: {} cores (class)", cores),
                    format!("- GPU: {} GB VRAM (class)", vram),
                    format!("- RAM: {} GB", title.min_ram.unwrap_or(8)),
                    format!("- Storage: {}", storage),
                ]);
            }
            if shows_recommended(level) {
                lines.extend([
                    String::new(),
                    "Recommended Requirements:".to_string(),
                    format!("- CPU: {}+ cores (class)", cores),
                    format!("- GPU: {}+ GB VRAM (class)", vram),
                    format!("- RAM: {} GB", title.recommended_ram.unwrap_or(16)),
                    format!("- Storage: {}", storage),
                ]);
            }
            if level.is_high_end() {
                high_end_block(&mut lines, "- GPU: 12-16 GB VRAM class");
            }
        }
    }

    lines.join("\n").trim().to_string()
}

/// Requirements text for a title resolved through the cache, Steam or a heuristic.
pub fn render_record_requirements(title: &str, record: &RequirementRecord, level: Level) -> String {
    let mut lines = vec![title.to_string()];
    if shows_minimum(level) {
        lines.extend([
            String::new(),
            "Minimum Requirements:".to_string(),
            format!("- RAM: {} GB", record.min_ram),
            format!("- CPU: {} cores (class)", record.cpu_cores),
            format!("- GPU: {} GB VRAM (class)", record.gpu_vram),
            format!("- Storage: {}", record.storage_type),
        ]);
    }
    if shows_recommended(level) {
        lines.extend([
            String::new(),
            "Recommended Requirements:".to_string(),
            format!("- RAM: {} GB", record.recommended_ram),
            format!("- CPU: {}+ cores (class)", record.cpu_cores),
            format!("- GPU: {}+ GB VRAM (class)", record.gpu_vram),
            format!("- Storage: {}", record.storage_type),
        ]);
    }
    if level.is_high_end() {
        high_end_block(&mut lines, "- GPU: 16 GB VRAM class");
    }
    lines.join("\n").trim().to_string()
}

pub fn specs_guidance(requirements_text: &str) -> String {
    format!("{}\n\n{}", requirements_text, SPECS_FOLLOW_UP)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartItem {
    pub category: Category,
    pub category_slug: &'static str,
    pub csv_id: String,
    pub name: String,
    pub price_usd: f64,
    pub owned: bool,
}

impl PartItem {
    fn from_part(category: Category, part: &Part, owned: bool) -> Self {
        Self {
            category,
            category_slug: category.slug(),
            csv_id: part.id.clone(),
            name: part.display_name(),
            price_usd: part.price,
            owned,
        }
    }
}

/// A part still to be bought, as handed to a storefront cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildItem {
    #[serde(flatten)]
    pub part: PartItem,
    pub reason: String,
    pub product_match_query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildPayload {
    pub items: Vec<BuildItem>,
    pub total_usd: f64,
    pub owned_items: Vec<PartItem>,
}

/// Text and payload for a synthesized build. Owned parts are listed apart
/// and never priced into the total.
pub fn render_build(outcome: &BuildOutcome, owned: &OwnedParts) -> (String, BuildPayload) {
    let build = &outcome.synthesis.build;
    let mut items = Vec::new();
    let mut owned_items = Vec::new();
    for category in DISPLAY_ORDER {
        let part = build
            .get(category)
            .cloned()
            .unwrap_or_else(|| Part::placeholder(category));
        let is_owned = owned.contains(category) || build.is_owned(category);
        let item = PartItem::from_part(category, &part, is_owned);
        if is_owned {
            owned_items.push(item);
        } else {
            items.push(BuildItem {
                product_match_query: item.name.clone(),
                part: item,
                reason: DEFAULT_REASON.to_string(),
            });
        }
    }

    let mut lines = vec!["Custom PC Build".to_string(), String::new()];
    for item in &items {
        lines.push(format!(
            "{}: {} - ${} | Why: {}",
            item.part.category,
            item.part.name,
            format_money(item.part.price_usd),
            item.reason
        ));
    }

    if !owned_items.is_empty() {
        lines.push(String::new());
        lines.push("Owned parts (excluded from cart):".to_string());
        for item in &owned_items {
            lines.push(format!("- {}: {}", item.category, item.name));
        }
    }

    let total = outcome.synthesis.total;
    lines.extend([
        String::new(),
        format!("Total: ${}", format_money(total)),
        String::new(),
        "Summary:".to_string(),
        "1) Parts shown above are the ones you still need to buy.".to_string(),
        "2) Say 'DDR4' or 'DDR5' to force RAM/motherboard type.".to_string(),
        "3) Want cheaper or stronger? Say 'minimum' or 'high-end'.".to_string(),
    ]);

    let payload = BuildPayload {
        items,
        total_usd: (total * 100.0).round() / 100.0,
        owned_items,
    };
    (lines.join("\n"), payload)
}

/// Appends the over-budget note (only for a budget the user stated) and up
/// to two compatibility issues.
pub fn append_build_notes(text: &mut String, outcome: &BuildOutcome, budget: Option<u32>) {
    if let Some(budget) = budget {
        if outcome.synthesis.total > f64::from(budget) {
            text.push_str("\n\n");
            text.push_str(OVER_BUDGET_NOTE);
        }
    }

    let compatibility = &outcome.compatibility;
    if !compatibility.compatible && !compatibility.issues.is_empty() {
        let shown: Vec<&str> = compatibility
            .issues
            .iter()
            .take(2)
            .map(String::as_str)
            .collect();
        text.push_str("\n\nCompatibility note (best-effort): ");
        text.push_str(&shown.join("; "));
    }
}

pub fn out_of_scope_reply() -> String {
    [
        "Hey! I'm specialized in *PC builds, laptops, prebuilts, and hardware questions*, so I can't help with that topic.",
        "",
        "If you're looking for help choosing or building a PC, I'd love to help. Just share:",
        "- your budget",
        "- what you'll use the PC for (gaming / coding / CAD / editing)",
        "- and whether you already own any parts",
        "",
        "Once I have that, I'll create a setup that fits your needs perfectly.",
    ]
    .join("\n")
}

/// Forces free text into the `Name:` / `Price:` / `Why:` three-line shape.
pub fn normalize_three_line_device_answer(raw: &str) -> String {
    let mut lines: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    lines.resize(lines.len().max(3), "");

    let label = |line: &str, prefix: &str| {
        if line.to_lowercase().starts_with(&prefix.to_lowercase()) {
            line.to_string()
        } else {
            format!("{} {}", prefix, line).trim().to_string()
        }
    };

    [
        label(lines[0], "Name:"),
        label(lines[1], "Price:"),
        label(lines[2], "Why:"),
    ]
    .join("\n")
}

/// Laptop and prebuilt recommendations need a text generator, which this
/// service does not run.
pub fn device_reply(device: &str) -> String {
    normalize_three_line_device_answer(&format!(
        "(Unavailable)\n$0\nNo {} catalog is available to recommend from yet.",
        device
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Build, CompatibilityReport, StorageType, Synthesis};

    fn outcome_with(owned_gpu: bool) -> (BuildOutcome, OwnedParts) {
        let mut build = Build::new();
        let mut owned = OwnedParts::new();
        for category in Category::ALL {
            let part = Part::new(
                format!("{}-1", category.slug()),
                category,
                "Brand",
                format!("{} Model", category),
                100.0,
            );
            if owned_gpu && category == Category::Gpu {
                owned.insert(part.clone());
                build.set_owned(part);
            } else {
                build.set_selected(category, part);
            }
        }
        let total = build.purchase_total();
        let outcome = BuildOutcome {
            synthesis: Synthesis {
                build,
                total,
                total_exceeds_budget: false,
            },
            compatibility: CompatibilityReport::from_issues(Vec::new()),
        };
        (outcome, owned)
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(1200.0), "1200");
        assert_eq!(format_money(199.99), "199.99");
        assert_eq!(format_money(12.5), "12.5");
        assert_eq!(format_money(0.0), "0");
    }

    #[test]
    fn test_render_build_lists_purchases_in_display_order() {
        let (outcome, owned) = outcome_with(false);
        let (text, payload) = render_build(&outcome, &owned);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Custom PC Build");
        assert!(lines[2].starts_with("CPU: Brand CPU Model - $100 | Why: "));
        assert!(lines[3].starts_with("GPU: "));
        assert!(lines[8].starts_with("Case: "));
        assert!(text.contains("Total: $700"));
        assert_eq!(payload.items.len(), 7);
        assert_eq!(payload.total_usd, 700.0);
        assert_eq!(payload.items[0].part.category_slug, "cpu");
        assert_eq!(payload.items[0].product_match_query, "Brand CPU Model");
        assert!(payload.owned_items.is_empty());
    }

    #[test]
    fn test_owned_parts_are_listed_separately() {
        let (outcome, owned) = outcome_with(true);
        let (text, payload) = render_build(&outcome, &owned);

        assert_eq!(payload.items.len(), 6);
        assert_eq!(payload.owned_items.len(), 1);
        assert!(payload.owned_items[0].owned);
        assert!(text.contains("Owned parts (excluded from cart):\n- GPU: Brand GPU Model"));
        assert!(text.contains("Total: $600"));
    }

    #[test]
    fn test_build_notes() {
        let (mut outcome, _) = outcome_with(false);
        outcome.compatibility = CompatibilityReport::from_issues(vec![
            "Socket mismatch (AM5 vs LGA1700)".to_string(),
            "RAM type mismatch (DDR5 vs DDR4)".to_string(),
            "GPU too long (400mm > 360mm)".to_string(),
        ]);

        let mut text = String::new();
        append_build_notes(&mut text, &outcome, None);
        assert!(!text.contains("Note: Your budget"));
        assert!(text.ends_with(
            "Compatibility note (best-effort): Socket mismatch (AM5 vs LGA1700); RAM type mismatch (DDR5 vs DDR4)"
        ));

        let mut text = String::new();
        append_build_notes(&mut text, &outcome, Some(500));
        assert!(text.contains("Note: Your budget is below"));
    }

    #[test]
    fn test_requirements_levels() {
        let mut app = TitleRequirement::new("Blender", TitleKind::App);
        app.cpu_cores = Some(8);
        app.gpu_vram = Some(8);
        app.min_ram = Some(8);
        app.recommended_ram = Some(32);
        app.storage_type = Some(StorageType::Nvme);

        let minimum = render_title_requirements(&app, Level::Minimum);
        assert!(minimum.contains("Minimum Requirements:"));
        assert!(!minimum.contains("Recommended Requirements:"));

        let high = render_title_requirements(&app, Level::HighEnd);
        assert!(!high.contains("Minimum Requirements:"));
        assert!(high.contains("- RAM: 32 GB\n- Storage: NVMe"));
        assert!(high.contains("High-End (Future-Proof) Suggestion:"));

        let both = render_title_requirements(&app, Level::Both);
        assert!(both.starts_with("Blender\n\nMinimum Requirements:\n- CPU: 8 cores (class)"));
        assert!(both.contains("Recommended Requirements:"));
    }

    #[test]
    fn test_record_requirements() {
        let record = crate::app::lookup::heuristic_requirements("Valorant", TitleKind::Game);
        let text = render_record_requirements("valorant", &record, Level::Recommended);
        assert!(text.starts_with("valorant\n\nRecommended Requirements:\n- RAM: 16 GB"));
        assert!(text.contains("- GPU: 2+ GB VRAM (class)"));
    }

    #[test]
    fn test_three_line_device_answer() {
        assert_eq!(
            normalize_three_line_device_answer("Zephyrus G14\n\nprice: $1499\nGreat battery"),
            "Name: Zephyrus G14\nprice: $1499\nWhy: Great battery"
        );
        let fallback = device_reply("laptop");
        assert!(fallback.starts_with("Name: (Unavailable)\nPrice: $0\nWhy: "));
        assert_eq!(fallback.lines().count(), 3);
    }
}
