use anyhow::Result;
use pc_build_assistant::app::{BuildReply, Intent, RequirementsDetail};
use pc_build_assistant::domain::model::{Category, Level};
use pc_build_assistant::utils::error::AssistantError;
use pc_build_assistant::{Assistant, AssistantConfig, ChatReply, LocalStorage, SessionState};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PARTS_CSV: &str = "\
id,category,brand,model,price_usd,socket,ram_type,vram_gb,length_mm,max_gpu_length_mm,psu_wattage,capacity_gb,form_factor
cpu-am5,CPU,AMD,Ryzen 5 7600,199,AM5,,,,,,,
cpu-lga,CPU,Intel,Core i5-12400F,149,LGA1700,,,,,,,
mb-am5,Motherboard,MSI,B650 Tomahawk,189,AM5,DDR5,,,,,,ATX
mb-lga,Motherboard,ASUS,Prime B660M-A,129,LGA1700,DDR4,,,,,,mATX
ram-ddr5,RAM,G.Skill,Flare X5 32GB,99,,DDR5,,,,,32,
ram-ddr4,RAM,Corsair,Vengeance LPX 16GB,45,,DDR4,,,,,16,
gpu-4060,GPU,NVIDIA,GeForce RTX 4060,299,,,8,240,,550,,
gpu-4070,GPU,NVIDIA,GeForce RTX 4070 Super,599,,,12,300,,650,,
ssd-1tb,Storage,WD,Black SN770 1TB,79,,,,,,,1000,M.2 NVMe
ssd-2tb,Storage,Samsung,990 EVO 2TB,149,,,,,,,2000,M.2 NVMe
psu-650,PSU,Corsair,RM650e,85,,,,,,650,,
psu-750,PSU,Corsair,RM750e,99,,,,,,750,,
psu-850,PSU,Corsair,RM850x,139,,,,,,850,,
case-h5,Case,NZXT,H5 Flow,89,,,,,365,,,
";

const GAMES_CSV: &str = "\
name,min_gpu,recommended_gpu,min_ram,recommended_ram,storage
Cyberpunk 2077,GTX 1060,RTX 2060,8,16,70
";

const APPLICATIONS_CSV: &str = "\
name,min_ram,recommended_ram,cpu_cores,gpu_vram,storage_type
Blender,8,32,8,8,NVMe
";

fn write_fixture(dir: &Path) -> Result<()> {
    fs::write(dir.join("parts.csv"), PARTS_CSV)?;
    fs::write(dir.join("games.csv"), GAMES_CSV)?;
    fs::write(dir.join("applications.csv"), APPLICATIONS_CSV)?;
    Ok(())
}

async fn assistant(dir: &TempDir) -> Result<Assistant<LocalStorage>> {
    write_fixture(dir.path())?;
    let config = AssistantConfig::default().with_data_dir(dir.path());
    Ok(Assistant::from_config(&config).await?)
}

fn expect_build(reply: ChatReply) -> BuildReply {
    match reply {
        ChatReply::CustomPc(build) => *build,
        other => panic!("expected a build reply, got {:?}", other.intent()),
    }
}

/// 完整流程：預算 1200、指定遊戲，GPU 降級後落在預算內
#[tokio::test]
async fn test_budget_build_for_known_game() -> Result<()> {
    let dir = TempDir::new()?;
    let assistant = assistant(&dir).await?;
    let mut session = SessionState::default();

    let reply = assistant
        .handle(
            &mut session,
            "Build me a gaming PC for $1200 to play Cyberpunk 2077",
        )
        .await?;
    let build = expect_build(reply);

    assert_eq!(build.intent, Intent::CustomPc);
    assert!(build.budget_provided);
    assert_eq!(build.budget_used, 1200);
    assert!(!build.total_exceeds_budget);
    assert!(build.compatibility.compatible, "{:?}", build.compatibility.issues);
    assert_eq!(build.build.items.len(), 7);
    assert!(build.build.owned_items.is_empty());
    assert_eq!(build.build.total_usd, 1093.0);

    let gpu = build
        .build
        .items
        .iter()
        .find(|item| item.part.category == Category::Gpu)
        .unwrap();
    assert_eq!(gpu.part.csv_id, "gpu-4060");

    assert!(build.response.starts_with("Custom PC Build"));
    assert!(build.response.contains("Total: $1093"));
    assert!(!build.response.contains("Note: Your budget is below"));

    assert_eq!(session.last_budget, Some(1200));
    assert_eq!(session.last_level, Some(Level::Both));
    Ok(())
}

/// 後續訊息沒有預算時沿用同一個 session 的上一個預算
#[tokio::test]
async fn test_follow_up_reuses_session_budget() -> Result<()> {
    let dir = TempDir::new()?;
    let assistant = assistant(&dir).await?;
    let mut session = SessionState::default();

    assistant
        .handle(&mut session, "Build me a gaming PC for $1200")
        .await?;
    let build = expect_build(assistant.handle(&mut session, "make the build quiet").await?);

    assert!(!build.budget_provided);
    assert_eq!(build.budget_used, 1200);
    let psu = build
        .build
        .items
        .iter()
        .find(|item| item.part.category == Category::Psu)
        .unwrap();
    assert_eq!(psu.part.csv_id, "psu-850");
    assert_eq!(build.build.total_usd, 1093.0);
    Ok(())
}

#[tokio::test]
async fn test_fresh_session_uses_default_budget() -> Result<()> {
    let dir = TempDir::new()?;
    let assistant = assistant(&dir).await?;
    let mut session = SessionState::default();

    let build = expect_build(assistant.handle(&mut session, "build me a pc").await?);

    assert!(!build.budget_provided);
    assert_eq!(build.budget_used, 1500);
    assert_eq!(session.last_budget, Some(1500));
    Ok(())
}

/// 已擁有的顯示卡不列入購物清單，也不計價
#[tokio::test]
async fn test_owned_gpu_is_excluded_from_cart() -> Result<()> {
    let dir = TempDir::new()?;
    let assistant = assistant(&dir).await?;
    let mut session = SessionState::default();

    let build = expect_build(
        assistant
            .handle(
                &mut session,
                "I already have an RTX 3090, build the rest for $1000",
            )
            .await?,
    );

    assert_eq!(build.owned_detected, vec![Category::Gpu]);
    assert_eq!(build.build.items.len(), 6);
    assert_eq!(build.build.owned_items.len(), 1);
    assert!(build.build.owned_items[0].owned);
    assert!(build
        .build
        .items
        .iter()
        .all(|item| item.part.category != Category::Gpu));
    assert_eq!(build.build.total_usd, 864.0);
    assert!(build.compatibility.compatible, "{:?}", build.compatibility.issues);
    assert!(build
        .response
        .contains("Owned parts (excluded from cart):\n- GPU: NVIDIA GeForce RTX 3090"));
    assert_eq!(session.last_owned_categories, vec![Category::Gpu]);
    Ok(())
}

#[tokio::test]
async fn test_requirements_for_catalog_application() -> Result<()> {
    let dir = TempDir::new()?;
    let assistant = assistant(&dir).await?;
    let mut session = SessionState::default();

    let reply = assistant
        .handle(&mut session, "What are the system requirements for Blender?")
        .await?;

    match &reply {
        ChatReply::Requirements {
            intent,
            requirements,
            response,
            ..
        } => {
            assert_eq!(*intent, Intent::SystemRequirements);
            assert!(matches!(requirements, RequirementsDetail::Catalog(t) if t.name == "Blender"));
            assert!(response.starts_with("Blender"));
            assert!(response.contains("- RAM: 32 GB"));
        }
        other => panic!("unexpected reply {:?}", other.intent()),
    }
    Ok(())
}

/// 目錄沒有的遊戲改用離線估計，並寫入快取檔
#[tokio::test]
async fn test_unknown_title_falls_back_and_is_cached() -> Result<()> {
    let dir = TempDir::new()?;
    let assistant = assistant(&dir).await?;
    let mut session = SessionState::default();

    let reply = assistant
        .handle(&mut session, "system requirements for Some Indie Game")
        .await?;

    let ChatReply::Requirements { requirements, .. } = reply else {
        panic!("expected a requirements reply");
    };
    let RequirementsDetail::Resolved(record) = requirements else {
        panic!("expected a resolved record");
    };
    assert_eq!(record.min_ram, 8);
    assert_eq!(record.recommended_ram, 16);
    assert_eq!(record.cpu_cores, 6);
    assert_eq!(record.gpu_vram, 6);
    assert!(record.source_url.is_empty());

    let cache: serde_json::Value =
        serde_json::from_slice(&fs::read(dir.path().join("requirements_cache.json"))?)?;
    assert!(cache.get("game::some indie game").is_some());
    assert_eq!(assistant.resolver().cached_len().await, 1);
    Ok(())
}

#[tokio::test]
async fn test_device_and_out_of_scope_replies() -> Result<()> {
    let dir = TempDir::new()?;
    let assistant = assistant(&dir).await?;
    let mut session = SessionState::default();

    let reply = assistant
        .handle(&mut session, "what's the weather today")
        .await?;
    assert_eq!(reply.intent(), Intent::OutOfScope);
    assert_eq!(session.last_level, None);

    let reply = assistant
        .handle(&mut session, "best laptop for college")
        .await?;
    assert_eq!(reply.intent(), Intent::Laptop);
    assert_eq!(reply.response().lines().count(), 3);
    assert!(reply.response().starts_with("Name: "));

    let reply = assistant
        .handle(&mut session, "any good prebuilt machines?")
        .await?;
    assert_eq!(reply.intent(), Intent::Prebuilt);
    Ok(())
}

#[tokio::test]
async fn test_empty_message_is_rejected() -> Result<()> {
    let dir = TempDir::new()?;
    let assistant = assistant(&dir).await?;
    let mut session = SessionState::default();

    let err = assistant.handle(&mut session, "   ").await.unwrap_err();
    assert!(matches!(err, AssistantError::ValidationError { .. }));
    assert_eq!(session, SessionState::default());
    Ok(())
}

#[tokio::test]
async fn test_missing_parts_catalog_fails_startup() -> Result<()> {
    let dir = TempDir::new()?;
    let config = AssistantConfig::default().with_data_dir(dir.path());

    let result = Assistant::from_config(&config).await;
    assert!(result.is_err());
    Ok(())
}
