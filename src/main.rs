use clap::Parser;
use pc_build_assistant::utils::error::{AssistantError, ErrorSeverity};
use pc_build_assistant::utils::{logger, validation::Validate};
use pc_build_assistant::{Assistant, ChatReply, CliConfig, SessionStore};
use tokio::io::{AsyncBufReadExt, BufReader};

fn report_error(context: &str, e: &AssistantError) {
    tracing::error!(
        "❌ {}: {} (Category: {:?}, Severity: {:?})",
        context,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    if exit_code > 0 {
        std::process::exit(exit_code);
    }
}

fn print_reply(reply: &ChatReply, json: bool) {
    if json {
        match serde_json::to_string_pretty(reply) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("❌ Could not encode reply: {}", e),
        }
    } else {
        println!("{}\n", reply.response());
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting pc-build-assistant");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            report_error("Configuration could not be loaded", &e);
            return Ok(());
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let assistant = match Assistant::from_config(&config).await {
        Ok(assistant) => assistant,
        Err(e) => {
            report_error("Startup failed", &e);
            return Ok(());
        }
    };

    let mut sessions = SessionStore::new();

    if let Some(message) = &cli.message {
        match assistant.handle(sessions.session(&cli.session), message).await {
            Ok(reply) => print_reply(&reply, cli.json),
            Err(e) => report_error("Message failed", &e),
        }
        return Ok(());
    }

    println!("🔧 PC build assistant ready. Type a message, or 'exit' to quit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if matches!(message, "exit" | "quit") {
            break;
        }

        match assistant.handle(sessions.session(&cli.session), message).await {
            Ok(reply) => print_reply(&reply, cli.json),
            Err(e) => {
                tracing::warn!("⚠️ {}", e);
                eprintln!("❌ {}", e.user_friendly_message());
            }
        }
    }

    Ok(())
}
