use crate::app::intent::{
    detect_intent, detect_level, extract_budget, extract_known_titles, pick_target_name,
    preferences, Intent,
};
use crate::app::lookup::{RequirementRecord, RequirementsResolver, SteamClient};
use crate::app::owned::detect_owned_parts;
use crate::app::render::{
    append_build_notes, device_reply, out_of_scope_reply, render_build,
    render_record_requirements, render_title_requirements, specs_guidance, BuildPayload,
};
use crate::app::session::SessionState;
use crate::catalog::{Catalog, TitleIndex};
use crate::config::{cli::LocalStorage, AssistantConfig};
use crate::core::{build_requirements_profile, BuildEngine};
use crate::domain::model::{Category, CompatibilityReport, Level, TitleRequirement};
use crate::domain::ports::{ConfigProvider, RequirementsProvider, Storage};
use crate::utils::error::{AssistantError, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Structured requirements behind a requirements reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequirementsDetail {
    Catalog(TitleRequirement),
    Resolved(RequirementRecord),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildReply {
    pub intent: Intent,
    pub level: Level,
    pub response: String,
    pub build: BuildPayload,
    pub compatibility: CompatibilityReport,
    pub owned_detected: Vec<Category>,
    pub budget_provided: bool,
    pub budget_used: u32,
    pub total_exceeds_budget: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatReply {
    OutOfScope {
        intent: Intent,
        response: String,
    },
    Requirements {
        intent: Intent,
        level: Level,
        response: String,
        requirements: RequirementsDetail,
    },
    Specs {
        intent: Intent,
        level: Level,
        response: String,
    },
    Laptop {
        intent: Intent,
        response: String,
    },
    Prebuilt {
        intent: Intent,
        response: String,
    },
    CustomPc(Box<BuildReply>),
}

impl ChatReply {
    pub fn intent(&self) -> Intent {
        match self {
            ChatReply::OutOfScope { intent, .. }
            | ChatReply::Requirements { intent, .. }
            | ChatReply::Specs { intent, .. }
            | ChatReply::Laptop { intent, .. }
            | ChatReply::Prebuilt { intent, .. } => *intent,
            ChatReply::CustomPc(reply) => reply.intent,
        }
    }

    pub fn response(&self) -> &str {
        match self {
            ChatReply::OutOfScope { response, .. }
            | ChatReply::Requirements { response, .. }
            | ChatReply::Specs { response, .. }
            | ChatReply::Laptop { response, .. }
            | ChatReply::Prebuilt { response, .. } => response,
            ChatReply::CustomPc(reply) => &reply.response,
        }
    }
}

/// Answers chat messages: routes the intent, then either renders
/// requirements or runs the build engine.
pub struct Assistant<S: Storage> {
    engine: BuildEngine,
    titles: Arc<TitleIndex>,
    resolver: RequirementsResolver<S>,
    default_budget: u32,
}

impl Assistant<LocalStorage> {
    /// Loads the catalogs and the requirements cache named by `config`.
    pub async fn from_config(config: &AssistantConfig) -> Result<Self> {
        let catalog = Catalog::from_path(config.parts_path())?;
        let titles = TitleIndex::load(config.applications_path(), config.games_path())?;

        let provider: Option<Box<dyn RequirementsProvider>> = if config.allow_web_lookup() {
            tracing::info!("🌐 Web requirements lookup enabled ({})", config.lookup.steam_base_url);
            Some(Box::new(SteamClient::new(
                &config.lookup.steam_base_url,
                Duration::from_secs(config.lookup.timeout_seconds),
            )?))
        } else {
            None
        };

        let resolver =
            RequirementsResolver::open(LocalStorage::default(), config.cache_path(), provider)
                .await;

        Ok(Self::new(
            BuildEngine::new(Arc::new(catalog)),
            Arc::new(titles),
            resolver,
            config.default_budget(),
        ))
    }
}

impl<S: Storage> Assistant<S> {
    pub fn new(
        engine: BuildEngine,
        titles: Arc<TitleIndex>,
        resolver: RequirementsResolver<S>,
        default_budget: u32,
    ) -> Self {
        Self {
            engine,
            titles,
            resolver,
            default_budget,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        self.engine.catalog()
    }

    pub fn titles(&self) -> &TitleIndex {
        &self.titles
    }

    pub fn resolver(&self) -> &RequirementsResolver<S> {
        &self.resolver
    }

    pub async fn handle(&self, session: &mut SessionState, message: &str) -> Result<ChatReply> {
        if message.trim().is_empty() {
            return Err(AssistantError::ValidationError {
                message: "Message required".to_string(),
            });
        }

        let intent = detect_intent(message);
        let level = detect_level(message);
        tracing::info!("💬 intent={} level={}", intent.as_str(), level.as_str());

        if intent != Intent::OutOfScope {
            session.last_level = Some(level);
        }

        let reply = match intent {
            Intent::OutOfScope => ChatReply::OutOfScope {
                intent,
                response: out_of_scope_reply(),
            },
            Intent::SystemRequirements => {
                let (response, requirements) = self.requirements(message, level).await;
                ChatReply::Requirements {
                    intent,
                    level,
                    response,
                    requirements,
                }
            }
            Intent::HardwareSpecs => {
                let (text, _) = self.requirements(message, level).await;
                ChatReply::Specs {
                    intent,
                    level,
                    response: specs_guidance(&text),
                }
            }
            Intent::Laptop => ChatReply::Laptop {
                intent,
                response: device_reply("laptop"),
            },
            Intent::Prebuilt => ChatReply::Prebuilt {
                intent,
                response: device_reply("prebuilt PC"),
            },
            Intent::CustomPc => ChatReply::CustomPc(Box::new(self.build(session, message, level))),
        };
        Ok(reply)
    }

    async fn requirements(&self, message: &str, level: Level) -> (String, RequirementsDetail) {
        let (kind, title) = pick_target_name(message, &self.titles);

        if let Some(known) = self.titles.game(&title).or_else(|| self.titles.app(&title)) {
            return (
                render_title_requirements(known, level),
                RequirementsDetail::Catalog(known.clone()),
            );
        }

        let record = self.resolver.resolve(&title, kind).await;
        (
            render_record_requirements(&title, &record, level),
            RequirementsDetail::Resolved(record),
        )
    }

    fn build(&self, session: &mut SessionState, message: &str, level: Level) -> BuildReply {
        let stated_budget = extract_budget(message);
        let budget = stated_budget
            .or(session.last_budget)
            .unwrap_or(self.default_budget);
        session.last_budget = Some(budget);

        let owned = detect_owned_parts(message, self.engine.catalog());
        session.last_owned_categories = owned.categories();

        let (apps, games) = extract_known_titles(message, &self.titles);
        let titles: Vec<&TitleRequirement> = apps
            .iter()
            .filter_map(|name| self.titles.app(name))
            .chain(games.iter().filter_map(|name| self.titles.game(name)))
            .collect();
        let profile = build_requirements_profile(&titles, message, level);

        let outcome = self
            .engine
            .run(&profile, budget, &owned, &preferences(message, level));

        let (mut response, build) = render_build(&outcome, &owned);
        append_build_notes(&mut response, &outcome, stated_budget.map(|_| budget));

        BuildReply {
            intent: Intent::CustomPc,
            level,
            response,
            build,
            compatibility: outcome.compatibility,
            owned_detected: owned.categories(),
            budget_provided: stated_budget.is_some(),
            budget_used: budget,
            total_exceeds_budget: outcome.synthesis.total_exceeds_budget,
        }
    }
}
