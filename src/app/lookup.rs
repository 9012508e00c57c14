//! Requirements for titles the local catalogs do not know.
//!
//! Resolution order: the flat JSON cache, then (for games, when enabled) the
//! Steam store, then a named offline heuristic. Every resolution is written
//! back to the cache.

use crate::catalog::normalize_title;
use crate::domain::model::TitleKind;
use crate::domain::ports::{FetchedRequirements, RequirementsProvider, Storage};
use crate::utils::error::{AssistantError, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::sync::Mutex;

static BREAK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("br pattern"));
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("ws pattern"));
static RAM_GB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,3})\s*gb\s*ram").expect("ram pattern"));
static MEMORY_GB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"memory:\s*(\d{1,3})\s*gb").expect("memory pattern"));
static VRAM_GB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,3})\s*gb\s*vram").expect("vram pattern"));

/// One cached requirements answer. Missing fields fall back to defaults so
/// older cache files still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequirementRecord {
    pub name: String,
    pub kind: TitleKind,
    pub min_ram: u32,
    pub recommended_ram: u32,
    pub cpu_cores: u32,
    pub gpu_vram: u32,
    pub storage_type: String,
    pub notes: String,
    pub source_url: String,
    pub fetched_at_utc: i64,
}

impl Default for RequirementRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: TitleKind::Game,
            min_ram: 8,
            recommended_ram: 16,
            cpu_cores: 4,
            gpu_vram: 4,
            storage_type: "SSD".to_string(),
            notes: String::new(),
            source_url: String::new(),
            fetched_at_utc: 0,
        }
    }
}

impl RequirementRecord {
    fn stamped(name: &str, kind: TitleKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            fetched_at_utc: chrono::Utc::now().timestamp(),
            ..Self::default()
        }
    }

    fn from_fetched(name: &str, kind: TitleKind, fetched: FetchedRequirements) -> Self {
        Self {
            min_ram: fetched.min_ram,
            recommended_ram: fetched.recommended_ram,
            cpu_cores: fetched.cpu_cores,
            gpu_vram: fetched.gpu_vram,
            notes: "Parsed from Steam system requirements (best-effort).".to_string(),
            source_url: fetched.source_url,
            ..Self::stamped(name, kind)
        }
    }
}

pub fn cache_key(name: &str, kind: TitleKind) -> String {
    format!("{}::{}", kind.as_str(), normalize_title(name))
}

/// Offline estimate keyed on well-known title names.
pub fn heuristic_requirements(name: &str, kind: TitleKind) -> RequirementRecord {
    let lowered = name.to_lowercase();
    let (min_ram, recommended_ram, cpu_cores, gpu_vram, notes) = if lowered.contains("battlefield")
    {
        (
            16,
            32,
            6,
            8,
            "Offline estimate based on typical modern AAA shooter requirements.",
        )
    } else if lowered.contains("valorant") {
        (
            8,
            16,
            4,
            2,
            "Offline estimate (Valorant generally runs on modest hardware).",
        )
    } else if lowered.contains("matlab") {
        (
            16,
            32,
            8,
            0,
            "Offline estimate for MATLAB: CPU/RAM heavy; GPU depends on toolboxes.",
        )
    } else {
        (8, 16, 6, 6, "Offline estimate (balanced defaults).")
    };

    RequirementRecord {
        min_ram,
        recommended_ram,
        cpu_cores,
        gpu_vram,
        notes: notes.to_string(),
        ..RequirementRecord::stamped(name, kind)
    }
}

/// Turns a Steam requirements HTML fragment into one line of plain text.
pub fn strip_html(html: &str) -> String {
    let text = BREAK_TAG.replace_all(html, "\n");
    let text = ANY_TAG.replace_all(&text, " ");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

pub fn extract_ram_gb(text: &str) -> Option<u32> {
    let t = text.to_lowercase();
    RAM_GB
        .captures(&t)
        .or_else(|| MEMORY_GB.captures(&t))
        .and_then(|caps| caps[1].parse().ok())
}

pub fn extract_vram_gb(text: &str) -> Option<u32> {
    let t = text.to_lowercase();
    VRAM_GB.captures(&t).and_then(|caps| caps[1].parse().ok())
}

/// Core-count class implied by the CPU family a requirements text names.
pub fn infer_cpu_cores(text: &str) -> Option<u32> {
    let t = text.to_lowercase();
    let classes: [(&[&str], u32); 4] = [
        (&["i9", "ryzen 9"], 12),
        (&["i7", "ryzen 7"], 8),
        (&["i5", "ryzen 5"], 6),
        (&["i3", "ryzen 3"], 4),
    ];
    classes
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| t.contains(n)))
        .map(|(_, cores)| *cores)
}

/// Parses the `minimum`/`recommended` HTML blocks of a Steam app.
pub fn parse_pc_requirements(
    min_html: &str,
    rec_html: &str,
    source_url: String,
) -> FetchedRequirements {
    let min_text = strip_html(min_html);
    let rec_text = strip_html(rec_html);

    // a parsed zero counts as not stated
    let positive = |v: &u32| *v > 0;
    let min_ram = extract_ram_gb(&min_text).filter(positive).unwrap_or(8);
    let recommended_ram = extract_ram_gb(&rec_text)
        .filter(positive)
        .unwrap_or(min_ram.max(16));
    let gpu_vram = extract_vram_gb(&rec_text)
        .filter(positive)
        .or_else(|| extract_vram_gb(&min_text).filter(positive))
        .unwrap_or(6);
    let cpu_cores = infer_cpu_cores(&rec_text)
        .or_else(|| infer_cpu_cores(&min_text))
        .unwrap_or(6);

    FetchedRequirements {
        min_ram,
        recommended_ram,
        cpu_cores,
        gpu_vram,
        source_url,
    }
}

/// Steam storefront client. Only games are looked up.
pub struct SteamClient {
    client: Client,
    base_url: String,
}

impl SteamClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// App id of the first store search hit.
    async fn search(&self, term: &str) -> Result<Option<u64>> {
        let url = format!("{}/api/storesearch/", self.base_url);
        tracing::debug!("Searching Steam store: {} ({})", term, url);

        let response = self
            .client
            .get(&url)
            .query(&[("term", term), ("l", "english"), ("cc", "us")])
            .send()
            .await?
            .error_for_status()?;
        let data: serde_json::Value = response.json().await?;

        let id = data
            .get("items")
            .and_then(|items| items.get(0))
            .and_then(|item| item.get("id"));
        Ok(match id {
            Some(serde_json::Value::Number(n)) => n.as_u64(),
            Some(serde_json::Value::String(s)) => s.parse().ok(),
            _ => None,
        })
    }

    async fn app_details(&self, app_id: u64) -> Result<Option<serde_json::Value>> {
        let url = format!("{}/api/appdetails", self.base_url);
        let app_id_str = app_id.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[("appids", app_id_str.as_str()), ("l", "english"), ("cc", "us")])
            .send()
            .await?
            .error_for_status()?;
        let mut payload: serde_json::Value = response.json().await?;
        if !payload.is_object() {
            return Err(AssistantError::LookupError {
                message: format!("unexpected appdetails payload for app {}", app_id),
            });
        }

        let Some(block) = payload.get_mut(&app_id_str) else {
            return Ok(None);
        };
        if !block.get("success").and_then(|s| s.as_bool()).unwrap_or(false) {
            return Ok(None);
        }
        Ok(block.get_mut("data").map(serde_json::Value::take))
    }
}

#[async_trait]
impl RequirementsProvider for SteamClient {
    async fn fetch(&self, name: &str, kind: TitleKind) -> Result<Option<FetchedRequirements>> {
        if kind != TitleKind::Game {
            return Ok(None);
        }
        let Some(app_id) = self.search(name).await? else {
            return Ok(None);
        };
        let Some(data) = self.app_details(app_id).await? else {
            return Ok(None);
        };

        let reqs = data.get("pc_requirements");
        let html = |key: &str| {
            reqs.and_then(|r| r.get(key))
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };

        Ok(Some(parse_pc_requirements(
            &html("minimum"),
            &html("recommended"),
            format!("{}/app/{}/", self.base_url, app_id),
        )))
    }
}

fn cached_record(
    cache: &BTreeMap<String, serde_json::Value>,
    key: &str,
) -> Option<RequirementRecord> {
    cache
        .get(key)
        .and_then(|v| serde_json::from_value(v.clone()).ok())
}

/// Cache-backed resolver shared by every chat session.
pub struct RequirementsResolver<S: Storage> {
    storage: S,
    cache_path: String,
    cache: Mutex<BTreeMap<String, serde_json::Value>>,
    provider: Option<Box<dyn RequirementsProvider>>,
}

impl<S: Storage> RequirementsResolver<S> {
    /// Loads the cache file. A missing or unreadable cache starts empty.
    pub async fn open(
        storage: S,
        cache_path: impl Into<String>,
        provider: Option<Box<dyn RequirementsProvider>>,
    ) -> Self {
        let cache_path = cache_path.into();
        let cache = match storage.read_file(&cache_path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!("⚠️ Ignoring unreadable requirements cache {}: {}", cache_path, e);
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };
        tracing::info!("📚 Requirements cache: {} entr(ies) from {}", cache.len(), cache_path);

        Self {
            storage,
            cache_path,
            cache: Mutex::new(cache),
            provider,
        }
    }

    pub fn web_lookup_enabled(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn cached_len(&self) -> usize {
        self.cache.lock().await.len()
    }

    /// Never fails: lookups and cache writes degrade to the offline estimate.
    pub async fn resolve(&self, name: &str, kind: TitleKind) -> RequirementRecord {
        if name.trim().is_empty() {
            return RequirementRecord {
                notes: "No name provided.".to_string(),
                ..RequirementRecord::stamped(name, kind)
            };
        }

        let key = cache_key(name, kind);
        let legacy_key = normalize_title(name);

        {
            let mut cache = self.cache.lock().await;
            if let Some(record) = cached_record(&cache, &key) {
                return record;
            }

            if let Some(mut record) = cached_record(&cache, &legacy_key) {
                tracing::debug!("Migrating legacy cache entry '{}' to '{}'", legacy_key, key);
                record.kind = kind;
                self.remember(&mut cache, key, &record).await;
                return record;
            }
        }

        // the cache stays unlocked while the store is queried
        let record = match self.fetch_online(name, kind).await {
            Some(fetched) => RequirementRecord::from_fetched(name, kind, fetched),
            None => heuristic_requirements(name, kind),
        };

        let mut cache = self.cache.lock().await;
        if let Some(existing) = cached_record(&cache, &key) {
            return existing;
        }
        self.remember(&mut cache, key, &record).await;
        record
    }

    async fn fetch_online(&self, name: &str, kind: TitleKind) -> Option<FetchedRequirements> {
        let provider = self.provider.as_ref()?;
        match provider.fetch(name, kind).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("⚠️ Online lookup for '{}' failed: {}", name, e);
                None
            }
        }
    }

    async fn remember(
        &self,
        cache: &mut BTreeMap<String, serde_json::Value>,
        key: String,
        record: &RequirementRecord,
    ) {
        match serde_json::to_value(record) {
            Ok(value) => {
                cache.insert(key, value);
            }
            Err(e) => {
                tracing::warn!("⚠️ Could not encode requirements record: {}", e);
                return;
            }
        }

        if let Err(e) = self.persist(cache).await {
            tracing::warn!(
                "⚠️ Could not write requirements cache {}: {}",
                self.cache_path,
                e
            );
        }
    }

    async fn persist(&self, cache: &BTreeMap<String, serde_json::Value>) -> Result<()> {
        let data = serde_json::to_vec_pretty(cache)?;
        self.storage.write_file(&self.cache_path, &data).await
    }
}
