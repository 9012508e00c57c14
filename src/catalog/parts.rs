use crate::domain::model::{Category, Part, RamTypeSet};
use crate::utils::error::{AssistantError, Result};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// One `parts.csv` row before validation. Every cell is optional text.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPartRow {
    id: Option<String>,
    category: Option<String>,
    brand: Option<String>,
    model: Option<String>,
    price_usd: Option<String>,
    socket: Option<String>,
    ram_type: Option<String>,
    vram_gb: Option<String>,
    length_mm: Option<String>,
    max_gpu_length_mm: Option<String>,
    psu_wattage: Option<String>,
    capacity_gb: Option<String>,
    form_factor: Option<String>,
}

/// Read-only parts catalog, loaded once at startup and shared across requests.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    parts: Vec<Part>,
}

impl Catalog {
    pub fn from_parts(parts: Vec<Part>) -> Self {
        Self { parts }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let label = path.as_ref().display().to_string();
        let file = std::fs::File::open(&path)?;
        let catalog = Self::from_reader(file, &label)?;
        tracing::info!("📦 Parts loaded: {} from {}", catalog.len(), label);
        Ok(catalog)
    }

    /// Parses and validates CSV rows. Rows with an unknown category are skipped.
    pub fn from_reader<R: Read>(reader: R, label: &str) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();

        let mut parts = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let row: RawPartRow = record.deserialize(Some(&headers))?;

            match validate_row(row) {
                Ok(Some(part)) => parts.push(part),
                Ok(None) => {
                    tracing::warn!("Skipping {} line {}: unsupported category", label, line)
                }
                Err(message) => {
                    return Err(AssistantError::CatalogError {
                        file: label.to_string(),
                        line,
                        message,
                    })
                }
            }
        }

        Ok(Self { parts })
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &Part> + '_ {
        self.parts.iter().filter(move |p| p.category == category)
    }

    /// Cheapest part of `category`; earlier catalog rows win ties.
    pub fn cheapest(&self, category: Category) -> Option<&Part> {
        cheapest_of(self.in_category(category))
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

pub(crate) fn cheapest_of<'a>(parts: impl Iterator<Item = &'a Part>) -> Option<&'a Part> {
    parts.fold(None, |best: Option<&Part>, p| match best {
        Some(b) if b.price <= p.price => Some(b),
        _ => Some(p),
    })
}

pub(crate) fn priciest_of<'a>(parts: impl Iterator<Item = &'a Part>) -> Option<&'a Part> {
    // later rows win ties, matching a stable ascending sort then taking the last
    parts.fold(None, |best: Option<&Part>, p| match best {
        Some(b) if b.price > p.price => Some(b),
        _ => Some(p),
    })
}

fn validate_row(row: RawPartRow) -> std::result::Result<Option<Part>, String> {
    let category = match row.category.as_deref().and_then(Category::parse) {
        Some(c) => c,
        None => return Ok(None),
    };

    let price = parse_number("price_usd", row.price_usd.as_deref())?.unwrap_or(0.0);
    if price < 0.0 {
        return Err(format!("price_usd must not be negative (got {})", price));
    }

    Ok(Some(Part {
        id: row.id.unwrap_or_default(),
        category,
        brand: row.brand.unwrap_or_default(),
        model: row.model.unwrap_or_default(),
        price,
        socket: non_empty(row.socket),
        ram_types: RamTypeSet::parse(row.ram_type.as_deref().unwrap_or("")),
        ram_type: non_empty(row.ram_type.map(|t| t.trim().to_string())),
        vram_gb: parse_count("vram_gb", row.vram_gb.as_deref())?,
        length_mm: parse_number("length_mm", row.length_mm.as_deref())?,
        max_gpu_length_mm: parse_number("max_gpu_length_mm", row.max_gpu_length_mm.as_deref())?,
        psu_wattage: parse_count("psu_wattage", row.psu_wattage.as_deref())?,
        capacity_gb: parse_count("capacity_gb", row.capacity_gb.as_deref())?,
        form_factor: non_empty(row.form_factor),
    }))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Empty cells are absent; anything else must be a finite number.
pub(crate) fn parse_number(field: &str, cell: Option<&str>) -> std::result::Result<Option<f64>, String> {
    let cell = match cell.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(c) => c,
    };
    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(format!("{} is not a number: '{}'", field, cell)),
    }
}

/// Whole, non-negative quantity. Decimal text such as `12.0` is truncated.
pub(crate) fn parse_count(field: &str, cell: Option<&str>) -> std::result::Result<Option<u32>, String> {
    match parse_number(field, cell)? {
        None => Ok(None),
        Some(v) if v < 0.0 => Err(format!("{} must not be negative (got {})", field, v)),
        Some(v) => Ok(Some(v as u32)),
    }
}
