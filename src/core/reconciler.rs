use crate::catalog::parts::cheapest_of;
use crate::catalog::Catalog;
use crate::domain::model::{Build, Category};

/// Order in which categories give up quality when the build is over budget.
pub const DOWNGRADE_PRIORITY: [Category; 7] = [
    Category::Gpu,
    Category::Cpu,
    Category::Motherboard,
    Category::Ram,
    Category::Storage,
    Category::Psu,
    Category::Case,
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reconciliation {
    pub total: f64,
    pub total_exceeds_budget: bool,
    pub downgrades: usize,
}

/// Swaps purchased parts for the cheapest strictly cheaper catalog part, one
/// category at a time in [`DOWNGRADE_PRIORITY`] order, until the purchase
/// total fits `budget`. Owned slots are never touched.
///
/// Best effort: the build may still exceed the budget afterwards.
pub fn reconcile_budget(build: &mut Build, catalog: &Catalog, budget: u32) -> Reconciliation {
    let budget = f64::from(budget);
    let mut total = build.purchase_total();
    let mut downgrades = 0;

    for category in DOWNGRADE_PRIORITY {
        if total <= budget {
            break;
        }
        if build.is_owned(category) {
            continue;
        }
        let current_price = build.get(category).map_or(0.0, |p| p.price);

        let cheaper = cheapest_of(
            catalog
                .in_category(category)
                .filter(|p| p.is_priced() && p.price < current_price),
        );
        if let Some(part) = cheaper {
            tracing::debug!(
                "{}: downgrading to {} (${:.2} -> ${:.2})",
                category,
                part.display_name(),
                current_price,
                part.price
            );
            build.set_selected(category, part.clone());
            total = build.purchase_total();
            downgrades += 1;
        }
    }

    let total_exceeds_budget = total > budget;
    if total_exceeds_budget {
        tracing::warn!(
            "⚠️ Best-effort build still over budget: ${:.2} > ${:.2}",
            total,
            budget
        );
    }

    Reconciliation {
        total,
        total_exceeds_budget,
        downgrades,
    }
}
