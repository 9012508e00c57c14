use anyhow::Context;
use clap::Parser;
use pc_build_assistant::app::{RequirementsResolver, SteamClient};
use pc_build_assistant::domain::model::TitleKind;
use pc_build_assistant::domain::ports::{ConfigProvider, RequirementsProvider};
use pc_build_assistant::utils::{logger, validation::Validate};
use pc_build_assistant::{AssistantConfig, LocalStorage};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "warm_cache")]
#[command(about = "Pre-fill the requirements cache for titles missing from the catalogs")]
struct Args {
    /// Titles to resolve, e.g. "game::Battlefield 6" or "app::MATLAB" (no prefix means game)
    targets: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, default_value = "assistant.toml")]
    config: String,

    /// Directory that relative data and cache paths are resolved against
    #[arg(long)]
    data_dir: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Splits an optional `game::` / `app::` prefix off a target.
fn parse_target(raw: &str) -> (TitleKind, String) {
    let raw = raw.trim();
    if let Some((prefix, rest)) = raw.split_once("::") {
        let rest = rest.trim();
        if !rest.is_empty() {
            match prefix.trim().to_lowercase().as_str() {
                "game" => return (TitleKind::Game, rest.to_string()),
                "app" => return (TitleKind::App, rest.to_string()),
                _ => {}
            }
        }
    }
    (TitleKind::Game, raw.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    if args.targets.is_empty() {
        println!("Usage: warm_cache \"game::Battlefield 6\" \"app::MATLAB\" \"Valorant\" \"SolidWorks\"");
        println!("Tip: if you omit the prefix, it defaults to game::");
        return Ok(());
    }

    let mut config = if std::path::Path::new(&args.config).exists() {
        tracing::info!("📁 Loading configuration from: {}", args.config);
        AssistantConfig::from_file(&args.config)
            .with_context(|| format!("loading {}", args.config))?
    } else {
        let mut config = AssistantConfig::default();
        config.apply_env_overrides();
        config
    };
    if let Some(dir) = &args.data_dir {
        config = config.with_data_dir(dir);
    }

    if let Err(e) = config.validate() {
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let provider: Option<Box<dyn RequirementsProvider>> = if config.allow_web_lookup() {
        let client = SteamClient::new(
            &config.lookup.steam_base_url,
            Duration::from_secs(config.lookup.timeout_seconds),
        )
        .context("building the Steam client")?;
        Some(Box::new(client))
    } else {
        None
    };
    let resolver =
        RequirementsResolver::open(LocalStorage::default(), config.cache_path(), provider)
            .await;

    for raw in &args.targets {
        let (kind, name) = parse_target(raw);
        let record = resolver.resolve(&name, kind).await;
        println!(
            "- {}::{}: minRAM={} recRAM={} cores={} vram={} {}",
            record.kind.as_str(),
            record.name,
            record.min_ram,
            record.recommended_ram,
            record.cpu_cores,
            record.gpu_vram,
            record.source_url
        );
    }

    tracing::info!("✅ Cache now holds {} entr(ies)", resolver.cached_len().await);
    Ok(())
}
