pub mod app;
pub mod catalog;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::{Assistant, ChatReply, SessionState, SessionStore};
pub use catalog::{Catalog, TitleIndex};
pub use config::{cli::LocalStorage, AssistantConfig};
pub use core::{BuildEngine, BuildOutcome};
pub use utils::error::{AssistantError, Result};
