use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The seven hardware slots every build has to fill.
///
/// Declaration order is the canonical category order used for storage and
/// iteration; rendering and downgrade passes use their own orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "CPU")]
    Cpu,
    #[serde(rename = "GPU")]
    Gpu,
    Motherboard,
    #[serde(rename = "RAM")]
    Ram,
    Storage,
    #[serde(rename = "PSU")]
    Psu,
    Case,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Cpu,
        Category::Gpu,
        Category::Motherboard,
        Category::Ram,
        Category::Storage,
        Category::Psu,
        Category::Case,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Cpu => "CPU",
            Category::Gpu => "GPU",
            Category::Motherboard => "Motherboard",
            Category::Ram => "RAM",
            Category::Storage => "Storage",
            Category::Psu => "PSU",
            Category::Case => "Case",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Category::Cpu => "cpu",
            Category::Gpu => "gpu",
            Category::Motherboard => "motherboard",
            Category::Ram => "ram",
            Category::Storage => "storage",
            Category::Psu => "psu",
            Category::Case => "case",
        }
    }

    /// Parses a catalog category cell. Unknown categories (e.g. "Cooler") yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        let v = value.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(v))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RamType {
    #[serde(rename = "DDR4")]
    Ddr4,
    #[serde(rename = "DDR5")]
    Ddr5,
}

/// Set of supported memory generations, e.g. a board that takes both DDR4 and DDR5.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RamTypeSet {
    ddr4: bool,
    ddr5: bool,
}

impl RamTypeSet {
    pub const fn empty() -> Self {
        Self {
            ddr4: false,
            ddr5: false,
        }
    }

    pub fn only(ram_type: RamType) -> Self {
        let mut set = Self::empty();
        set.insert(ram_type);
        set
    }

    /// Parses catalog text such as `DDR4`, `DDR5` or `DDR4/DDR5`.
    pub fn parse(value: &str) -> Self {
        let upper = value.to_uppercase();
        Self {
            ddr4: upper.contains("DDR4"),
            ddr5: upper.contains("DDR5"),
        }
    }

    pub fn insert(&mut self, ram_type: RamType) {
        match ram_type {
            RamType::Ddr4 => self.ddr4 = true,
            RamType::Ddr5 => self.ddr5 = true,
        }
    }

    pub fn contains(&self, ram_type: RamType) -> bool {
        match ram_type {
            RamType::Ddr4 => self.ddr4,
            RamType::Ddr5 => self.ddr5,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.ddr4 && !self.ddr5
    }

    pub fn intersects(&self, other: &RamTypeSet) -> bool {
        (self.ddr4 && other.ddr4) || (self.ddr5 && other.ddr5)
    }
}

impl fmt::Display for RamTypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.ddr4, self.ddr5) {
            (true, true) => f.write_str("DDR4/DDR5"),
            (true, false) => f.write_str("DDR4"),
            (false, true) => f.write_str("DDR5"),
            (false, false) => Ok(()),
        }
    }
}

/// Coarse GPU capability bucket; ordering is `Low < Mid < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GpuTier {
    Low,
    Mid,
    High,
}

impl GpuTier {
    /// Minimum VRAM a GPU must carry to count as this tier.
    pub fn vram_floor_gb(self) -> u32 {
        match self {
            GpuTier::High => 12,
            GpuTier::Mid => 8,
            GpuTier::Low => 4,
        }
    }

    /// Infers a tier from free-text GPU requirements ("GTX 1060", "Intel HD 620").
    pub fn infer_from_text(text: &str) -> Self {
        let s = text.to_uppercase();
        if s.contains("RTX") {
            GpuTier::High
        } else if s.contains("GTX") || s.contains("RX") || s.contains("ARC") {
            GpuTier::Mid
        } else if s.contains("HD") || s.contains("INTEL") {
            GpuTier::Low
        } else {
            GpuTier::Mid
        }
    }
}

/// Storage medium; ordering is `Hdd < Ssd < Nvme`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StorageType {
    #[serde(rename = "HDD")]
    Hdd,
    #[serde(rename = "SSD")]
    Ssd,
    #[serde(rename = "NVMe")]
    Nvme,
}

impl StorageType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "HDD" => Some(StorageType::Hdd),
            "SSD" => Some(StorageType::Ssd),
            "NVME" => Some(StorageType::Nvme),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StorageType::Hdd => "HDD",
            StorageType::Ssd => "SSD",
            StorageType::Nvme => "NVMe",
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How far above the baseline requirements a build should aim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Minimum,
    Recommended,
    #[default]
    Both,
    HighEnd,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Minimum => "minimum",
            Level::Recommended => "recommended",
            Level::Both => "both",
            Level::HighEnd => "high_end",
        }
    }

    pub fn is_high_end(self) -> bool {
        matches!(self, Level::HighEnd)
    }
}

/// Immutable catalog entry. Category-specific attributes are `None` when the
/// catalog row leaves them blank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: String,
    pub category: Category,
    pub brand: String,
    pub model: String,
    pub price: f64,
    pub socket: Option<String>,
    pub ram_types: RamTypeSet,
    /// Memory generation text as written in the catalog row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram_type: Option<String>,
    pub vram_gb: Option<u32>,
    pub length_mm: Option<f64>,
    pub max_gpu_length_mm: Option<f64>,
    pub psu_wattage: Option<u32>,
    pub capacity_gb: Option<u32>,
    pub form_factor: Option<String>,
}

impl Part {
    /// Minimal part with only identity fields set; everything optional is absent.
    pub fn new(
        id: impl Into<String>,
        category: Category,
        brand: impl Into<String>,
        model: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            brand: brand.into(),
            model: model.into(),
            price,
            socket: None,
            ram_types: RamTypeSet::empty(),
            ram_type: None,
            vram_gb: None,
            length_mm: None,
            max_gpu_length_mm: None,
            psu_wattage: None,
            capacity_gb: None,
            form_factor: None,
        }
    }

    /// Stand-in for a category the catalog has no parts for at all.
    pub fn placeholder(category: Category) -> Self {
        Self::new("", category, "", "", 0.0)
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.is_empty() && self.brand.is_empty() && self.model.is_empty()
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.model).trim().to_string()
    }

    /// Parts without a positive price never take part in priced selection.
    pub fn is_priced(&self) -> bool {
        self.price > 0.0
    }

    pub fn socket_str(&self) -> &str {
        self.socket.as_deref().unwrap_or("")
    }

    pub fn capacity(&self) -> u32 {
        self.capacity_gb.unwrap_or(0)
    }

    pub fn vram(&self) -> u32 {
        self.vram_gb.unwrap_or(0)
    }

    pub fn form_factor_lower(&self) -> String {
        self.form_factor.as_deref().unwrap_or("").to_lowercase()
    }

    pub fn with_socket(mut self, socket: impl Into<String>) -> Self {
        self.socket = Some(socket.into());
        self
    }

    pub fn with_ram_types(mut self, ram_types: RamTypeSet) -> Self {
        self.ram_types = ram_types;
        self
    }

    /// Sets both the parsed generations and the raw catalog text.
    pub fn with_ram_type(mut self, raw: &str) -> Self {
        self.ram_types = RamTypeSet::parse(raw);
        self.ram_type = Some(raw.to_string());
        self
    }

    /// Catalog text for messages, or the normalized set when no text was recorded.
    pub fn ram_type_label(&self) -> String {
        match self.ram_type.as_deref() {
            Some(raw) => raw.to_string(),
            None => self.ram_types.to_string(),
        }
    }

    pub fn with_vram(mut self, vram_gb: u32) -> Self {
        self.vram_gb = Some(vram_gb);
        self
    }

    pub fn with_length(mut self, length_mm: f64) -> Self {
        self.length_mm = Some(length_mm);
        self
    }

    pub fn with_max_gpu_length(mut self, max_gpu_length_mm: f64) -> Self {
        self.max_gpu_length_mm = Some(max_gpu_length_mm);
        self
    }

    pub fn with_wattage(mut self, watts: u32) -> Self {
        self.psu_wattage = Some(watts);
        self
    }

    pub fn with_capacity(mut self, capacity_gb: u32) -> Self {
        self.capacity_gb = Some(capacity_gb);
        self
    }

    pub fn with_form_factor(mut self, form_factor: impl Into<String>) -> Self {
        self.form_factor = Some(form_factor.into());
        self
    }
}

/// Normalized sizing requirements for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementsProfile {
    pub min_ram: u32,
    pub recommended_ram: u32,
    pub cpu_core_class: u32,
    pub gpu_vram: u32,
    pub gpu_tier: GpuTier,
    pub storage_type: StorageType,
}

impl Default for RequirementsProfile {
    fn default() -> Self {
        Self {
            min_ram: 8,
            recommended_ram: 16,
            cpu_core_class: 4,
            gpu_vram: 0,
            gpu_tier: GpuTier::Low,
            storage_type: StorageType::Ssd,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleKind {
    App,
    Game,
}

impl TitleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TitleKind::App => "app",
            TitleKind::Game => "game",
        }
    }
}

/// Requirements of one known application or game, as loaded from the catalogs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleRequirement {
    pub name: String,
    pub kind: TitleKind,
    pub min_ram: Option<u32>,
    pub recommended_ram: Option<u32>,
    pub cpu_cores: Option<u32>,
    pub gpu_vram: Option<u32>,
    pub gpu_tier: Option<GpuTier>,
    pub storage_type: Option<StorageType>,
    pub min_gpu: Option<String>,
    pub recommended_gpu: Option<String>,
    pub storage_gb: Option<u32>,
}

impl TitleRequirement {
    pub fn new(name: impl Into<String>, kind: TitleKind) -> Self {
        Self {
            name: name.into(),
            kind,
            min_ram: None,
            recommended_ram: None,
            cpu_cores: None,
            gpu_vram: None,
            gpu_tier: None,
            storage_type: None,
            min_gpu: None,
            recommended_gpu: None,
            storage_gb: None,
        }
    }
}

/// Soft preferences that steer selection without changing requirements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub level: Level,
    pub prefer_quiet: bool,
    pub prefer_rgb: bool,
}

/// Parts the user already has. Locked: never replaced, never priced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnedParts {
    parts: BTreeMap<Category, Part>,
}

impl OwnedParts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `part` as owned under its own category, replacing any earlier entry.
    pub fn insert(&mut self, part: Part) {
        self.parts.insert(part.category, part);
    }

    pub fn get(&self, category: Category) -> Option<&Part> {
        self.parts.get(&category)
    }

    pub fn contains(&self, category: Category) -> bool {
        self.parts.contains_key(&category)
    }

    pub fn categories(&self) -> Vec<Category> {
        self.parts.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }
}

impl FromIterator<Part> for OwnedParts {
    fn from_iter<I: IntoIterator<Item = Part>>(iter: I) -> Self {
        let mut owned = OwnedParts::new();
        for part in iter {
            owned.insert(part);
        }
        owned
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub part: Part,
    pub owned: bool,
}

/// Category to part mapping. Complete once the engine has run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Build {
    slots: BTreeMap<Category, Slot>,
}

impl Build {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_owned(&mut self, part: Part) {
        self.slots.insert(part.category, Slot { part, owned: true });
    }

    /// Places a purchased part in `category`. Owned slots are left untouched.
    pub fn set_selected(&mut self, category: Category, part: Part) {
        if self.is_owned(category) {
            return;
        }
        self.slots.insert(
            category,
            Slot {
                part,
                owned: false,
            },
        );
    }

    pub fn get(&self, category: Category) -> Option<&Part> {
        self.slots.get(&category).map(|s| &s.part)
    }

    pub fn slot(&self, category: Category) -> Option<&Slot> {
        self.slots.get(&category)
    }

    pub fn is_owned(&self, category: Category) -> bool {
        self.slots.get(&category).is_some_and(|s| s.owned)
    }

    pub fn contains(&self, category: Category) -> bool {
        self.slots.contains_key(&category)
    }

    pub fn is_complete(&self) -> bool {
        Category::ALL.iter().all(|c| self.slots.contains_key(c))
    }

    /// Sum of prices over purchased (non-owned) slots.
    pub fn purchase_total(&self) -> f64 {
        self.slots
            .values()
            .filter(|s| !s.owned)
            .map(|s| s.part.price)
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &Slot)> {
        self.slots.iter().map(|(c, s)| (*c, s))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    pub compatible: bool,
    pub issues: Vec<String>,
}

impl CompatibilityReport {
    pub fn from_issues(issues: Vec<String>) -> Self {
        Self {
            compatible: issues.is_empty(),
            issues,
        }
    }
}

/// Result of synthesizing a build: the build, what still has to be bought,
/// and whether the downgrade pass failed to reach the budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Synthesis {
    pub build: Build,
    pub total: f64,
    pub total_exceeds_budget: bool,
}
