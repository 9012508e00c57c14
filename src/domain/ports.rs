use crate::domain::model::TitleKind;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Byte-level persistence for the flat requirements cache.
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn parts_path(&self) -> &str;
    fn applications_path(&self) -> &str;
    fn games_path(&self) -> &str;
    fn cache_path(&self) -> &str;
    fn allow_web_lookup(&self) -> bool;
    fn default_budget(&self) -> u32;
}

/// Requirements as scraped from an online store page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedRequirements {
    pub min_ram: u32,
    pub recommended_ram: u32,
    pub cpu_cores: u32,
    pub gpu_vram: u32,
    pub source_url: String,
}

/// Online source of system requirements for titles missing from the local catalogs.
#[async_trait]
pub trait RequirementsProvider: Send + Sync {
    /// `Ok(None)` means the provider has nothing for this title.
    async fn fetch(&self, name: &str, kind: TitleKind) -> Result<Option<FetchedRequirements>>;
}
