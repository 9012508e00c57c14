use crate::catalog::parts::parse_count;
use crate::domain::model::{GpuTier, StorageType, TitleKind, TitleRequirement};
use crate::utils::error::{AssistantError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAppRow {
    name: Option<String>,
    min_ram: Option<String>,
    recommended_ram: Option<String>,
    cpu_cores: Option<String>,
    gpu_vram: Option<String>,
    storage_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawGameRow {
    name: Option<String>,
    min_gpu: Option<String>,
    recommended_gpu: Option<String>,
    min_ram: Option<String>,
    recommended_ram: Option<String>,
    storage: Option<String>,
}

/// Lowercased, trimmed, whitespace-collapsed lookup key.
pub fn normalize_title(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Known applications and games keyed by normalized name.
#[derive(Debug, Clone, Default)]
pub struct TitleIndex {
    apps: HashMap<String, TitleRequirement>,
    games: HashMap<String, TitleRequirement>,
}

impl TitleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, requirement: TitleRequirement) {
        let key = normalize_title(&requirement.name);
        if key.is_empty() {
            return;
        }
        match requirement.kind {
            TitleKind::App => self.apps.insert(key, requirement),
            TitleKind::Game => self.games.insert(key, requirement),
        };
    }

    pub fn app(&self, name: &str) -> Option<&TitleRequirement> {
        self.apps.get(&normalize_title(name))
    }

    pub fn game(&self, name: &str) -> Option<&TitleRequirement> {
        self.games.get(&normalize_title(name))
    }

    pub fn has_app(&self, name: &str) -> bool {
        self.app(name).is_some()
    }

    pub fn has_game(&self, name: &str) -> bool {
        self.game(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.apps.len() + self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty() && self.games.is_empty()
    }

    /// Loads both requirement catalogs. A missing file leaves that half of the index empty.
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(applications: P, games: Q) -> Result<Self> {
        let mut index = Self::new();

        match std::fs::File::open(&applications) {
            Ok(file) => {
                let label = applications.as_ref().display().to_string();
                index.load_apps(file, &label)?;
            }
            Err(e) => tracing::warn!(
                "Failed loading {}: {}",
                applications.as_ref().display(),
                e
            ),
        }

        match std::fs::File::open(&games) {
            Ok(file) => {
                let label = games.as_ref().display().to_string();
                index.load_games(file, &label)?;
            }
            Err(e) => tracing::warn!("Failed loading {}: {}", games.as_ref().display(), e),
        }

        tracing::info!(
            "📚 Requirement titles loaded: {} apps, {} games",
            index.apps.len(),
            index.games.len()
        );
        Ok(index)
    }

    pub fn load_apps<R: Read>(&mut self, reader: R, label: &str) -> Result<()> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();

        for record in rdr.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let row: RawAppRow = record.deserialize(Some(&headers))?;
            let Some(name) = row.name.filter(|n| !n.trim().is_empty()) else {
                continue;
            };

            let catalog_err = |message: String| AssistantError::CatalogError {
                file: label.to_string(),
                line,
                message,
            };

            let mut req = TitleRequirement::new(name, TitleKind::App);
            req.min_ram = parse_count("min_ram", row.min_ram.as_deref()).map_err(catalog_err)?;
            req.recommended_ram = parse_count("recommended_ram", row.recommended_ram.as_deref())
                .map_err(catalog_err)?;
            req.cpu_cores =
                parse_count("cpu_cores", row.cpu_cores.as_deref()).map_err(catalog_err)?;
            req.gpu_vram = parse_count("gpu_vram", row.gpu_vram.as_deref()).map_err(catalog_err)?;
            req.storage_type = row.storage_type.as_deref().and_then(StorageType::parse);
            self.insert(req);
        }
        Ok(())
    }

    pub fn load_games<R: Read>(&mut self, reader: R, label: &str) -> Result<()> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();

        for record in rdr.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let row: RawGameRow = record.deserialize(Some(&headers))?;
            let Some(name) = row.name.filter(|n| !n.trim().is_empty()) else {
                continue;
            };

            let catalog_err = |message: String| AssistantError::CatalogError {
                file: label.to_string(),
                line,
                message,
            };

            let min_gpu = row.min_gpu.unwrap_or_default();
            let recommended_gpu = row.recommended_gpu.unwrap_or_default();

            let mut req = TitleRequirement::new(name, TitleKind::Game);
            req.gpu_tier = Some(
                GpuTier::infer_from_text(&recommended_gpu)
                    .max(GpuTier::infer_from_text(&min_gpu)),
            );
            req.min_ram = parse_count("min_ram", row.min_ram.as_deref()).map_err(catalog_err)?;
            req.recommended_ram = parse_count("recommended_ram", row.recommended_ram.as_deref())
                .map_err(catalog_err)?;
            req.storage_gb = parse_count("storage", row.storage.as_deref()).map_err(catalog_err)?;
            req.min_gpu = Some(min_gpu).filter(|s| !s.is_empty());
            req.recommended_gpu = Some(recommended_gpu).filter(|s| !s.is_empty());
            self.insert(req);
        }
        Ok(())
    }
}
