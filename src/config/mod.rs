pub mod cli;
pub mod toml_config;

pub use toml_config::AssistantConfig;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "pc-build-assistant")]
#[command(about = "Chat assistant that plans budget PC builds from a parts catalog")]
pub struct CliConfig {
    /// Path to TOML configuration file (defaults apply when absent)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory that relative data and cache paths are resolved against
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Session id used to remember budget and level between messages
    #[arg(long, default_value = "cli")]
    pub session: String,

    /// Print replies as JSON instead of text
    #[arg(long)]
    pub json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Message to answer; starts an interactive session when omitted
    pub message: Option<String>,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the TOML file (or defaults) and applies `--data-dir`.
    pub fn load_config(&self) -> crate::utils::error::Result<AssistantConfig> {
        let config = match &self.config {
            Some(path) => AssistantConfig::from_file(path)?,
            None if std::path::Path::new("assistant.toml").exists() => {
                AssistantConfig::from_file("assistant.toml")?
            }
            None => {
                let mut config = AssistantConfig::default();
                config.apply_env_overrides();
                config
            }
        };

        Ok(match &self.data_dir {
            Some(dir) => config.with_data_dir(dir),
            None => config,
        })
    }
}
