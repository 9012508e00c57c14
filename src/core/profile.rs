use crate::domain::model::{GpuTier, Level, RequirementsProfile, StorageType, TitleRequirement};

const CONTENT_CREATION_KEYWORDS: [&str; 4] = ["editing", "premiere", "davinci", "after effects"];

/// Builds the sizing profile for a request.
///
/// Starts from the floor defaults and only ever raises a requirement while
/// folding in matched titles. Usage text and `level` adjust the result last.
pub fn build_requirements_profile(
    titles: &[&TitleRequirement],
    usage: &str,
    level: Level,
) -> RequirementsProfile {
    let mut profile = RequirementsProfile::default();

    for title in titles {
        profile.min_ram = profile.min_ram.max(title.min_ram.unwrap_or(0));
        profile.recommended_ram = profile
            .recommended_ram
            .max(title.recommended_ram.unwrap_or(16));
        profile.cpu_core_class = profile.cpu_core_class.max(title.cpu_cores.unwrap_or(4));
        profile.gpu_vram = profile.gpu_vram.max(title.gpu_vram.unwrap_or(0));
        if let Some(tier) = title.gpu_tier {
            profile.gpu_tier = profile.gpu_tier.max(tier);
        }
        if let Some(storage) = title.storage_type {
            profile.storage_type = profile.storage_type.max(storage);
        }
    }

    let usage = usage.to_lowercase();
    if CONTENT_CREATION_KEYWORDS.iter().any(|k| usage.contains(k)) {
        profile.recommended_ram = profile.recommended_ram.max(32);
        profile.gpu_tier = GpuTier::High;
        profile.storage_type = StorageType::Nvme;
    }

    match level {
        Level::Minimum => profile.recommended_ram = profile.min_ram.max(16),
        Level::HighEnd => {
            profile.recommended_ram = profile.recommended_ram.max(32);
            profile.gpu_tier = GpuTier::High;
            profile.storage_type = StorageType::Nvme;
        }
        Level::Recommended | Level::Both => {}
    }

    tracing::debug!(?profile, "requirements profile built");
    profile
}
