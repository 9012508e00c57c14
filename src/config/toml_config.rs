use crate::domain::ports::ConfigProvider;
use crate::utils::error::{AssistantError, Result};
use crate::utils::validation::{
    validate_file_extension, validate_path, validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub data: DataConfig,
    pub lookup: LookupConfig,
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub parts: String,
    pub applications: String,
    pub games: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            parts: "parts.csv".to_string(),
            applications: "applications.csv".to_string(),
            games: "games.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub allow_web: bool,
    pub cache_path: String,
    pub steam_base_url: String,
    pub timeout_seconds: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            allow_web: false,
            cache_path: "requirements_cache.json".to_string(),
            steam_base_url: "https://store.steampowered.com".to_string(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub budget: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self { budget: 1500 }
    }
}

impl AssistantConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，`${VAR}` 先以環境變數替換
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        let mut config: Self =
            toml::from_str(&processed_content).map_err(|e| AssistantError::ConfigError {
                message: format!("TOML parsing error: {}", e),
            })?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Unset variables are left as the literal `${VAR}` text.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AssistantError::ConfigError {
            message: format!("env placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// `ALLOW_WEB_LOOKUP=1` enables the online lookup regardless of the file.
    pub fn apply_env_overrides(&mut self) {
        if std::env::var("ALLOW_WEB_LOOKUP").is_ok_and(|v| v.trim() == "1") {
            self.lookup.allow_web = true;
        }
    }

    /// Resolves relative data and cache paths against `dir`.
    pub fn with_data_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        let dir = dir.as_ref();
        let join = |p: &str| -> String {
            if Path::new(p).is_absolute() {
                p.to_string()
            } else {
                dir.join(p).to_string_lossy().into_owned()
            }
        };
        self.data.parts = join(&self.data.parts);
        self.data.applications = join(&self.data.applications);
        self.data.games = join(&self.data.games);
        self.lookup.cache_path = join(&self.lookup.cache_path);
        self
    }

    pub fn validate_config(&self) -> Result<()> {
        if self.data.parts.trim().is_empty() {
            return Err(AssistantError::MissingConfigError {
                field: "data.parts".to_string(),
            });
        }

        for (field, path) in [
            ("data.parts", &self.data.parts),
            ("data.applications", &self.data.applications),
            ("data.games", &self.data.games),
        ] {
            validate_path(field, path)?;
            validate_file_extension(field, path, &["csv"])?;
        }

        validate_path("lookup.cache_path", &self.lookup.cache_path)?;
        validate_file_extension("lookup.cache_path", &self.lookup.cache_path, &["json"])?;
        validate_url("lookup.steam_base_url", &self.lookup.steam_base_url)?;
        validate_range("lookup.timeout_seconds", self.lookup.timeout_seconds, 1, 120)?;
        validate_range("defaults.budget", self.defaults.budget, 100, 100_000)?;

        Ok(())
    }
}

impl ConfigProvider for AssistantConfig {
    fn parts_path(&self) -> &str {
        &self.data.parts
    }

    fn applications_path(&self) -> &str {
        &self.data.applications
    }

    fn games_path(&self) -> &str {
        &self.data.games
    }

    fn cache_path(&self) -> &str {
        &self.lookup.cache_path
    }

    fn allow_web_lookup(&self) -> bool {
        self.lookup.allow_web
    }

    fn default_budget(&self) -> u32 {
        self.defaults.budget
    }
}

impl Validate for AssistantConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[data]
parts = "catalog/parts.csv"
applications = "catalog/applications.csv"
games = "catalog/games.csv"

[lookup]
cache_path = "cache/requirements.json"
steam_base_url = "http://127.0.0.1:9999"
timeout_seconds = 5

[defaults]
budget = 1200
"#;

        let config = AssistantConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.parts_path(), "catalog/parts.csv");
        assert_eq!(config.cache_path(), "cache/requirements.json");
        assert_eq!(config.lookup.timeout_seconds, 5);
        assert_eq!(config.default_budget(), 1200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = AssistantConfig::from_toml_str("").unwrap();
        assert_eq!(config.data, DataConfig::default());
        assert_eq!(config.default_budget(), 1500);
        assert_eq!(config.lookup.steam_base_url, "https://store.steampowered.com");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PCB_TEST_PARTS_FILE", "/srv/data/parts.csv");

        let toml_content = r#"
[data]
parts = "${PCB_TEST_PARTS_FILE}"
games = "${PCB_TEST_UNSET_VARIABLE}"
"#;

        let config = AssistantConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.data.parts, "/srv/data/parts.csv");
        assert_eq!(config.data.games, "${PCB_TEST_UNSET_VARIABLE}");

        std::env::remove_var("PCB_TEST_PARTS_FILE");
    }

    #[test]
    fn test_config_validation() {
        let bad_url = r#"
[lookup]
steam_base_url = "invalid-url"
"#;
        let config = AssistantConfig::from_toml_str(bad_url).unwrap();
        assert!(config.validate().is_err());

        let bad_budget = r#"
[defaults]
budget = 10
"#;
        let config = AssistantConfig::from_toml_str(bad_budget).unwrap();
        assert!(config.validate().is_err());

        let bad_parts = r#"
[data]
parts = "parts.xlsx"
"#;
        let config = AssistantConfig::from_toml_str(bad_parts).unwrap();
        assert!(config.validate().is_err());

        let no_parts = r#"
[data]
parts = " "
"#;
        let config = AssistantConfig::from_toml_str(no_parts).unwrap();
        assert!(matches!(
            config.validate(),
            Err(AssistantError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AssistantConfig::from_toml_str("[data\nparts = 1").unwrap_err();
        assert!(matches!(err, AssistantError::ConfigError { .. }));
    }

    #[test]
    fn test_with_data_dir_keeps_absolute_paths() {
        let mut config = AssistantConfig::default();
        config.data.games = "/abs/games.csv".to_string();
        let config = config.with_data_dir("/srv/pc");

        assert_eq!(
            Path::new(&config.data.parts),
            Path::new("/srv/pc").join("parts.csv")
        );
        assert_eq!(config.data.games, "/abs/games.csv");
        assert_eq!(
            Path::new(&config.lookup.cache_path),
            Path::new("/srv/pc").join("requirements_cache.json")
        );
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[defaults]\nbudget = 2000\n")
            .unwrap();

        let config = AssistantConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.default_budget(), 2000);
    }
}
