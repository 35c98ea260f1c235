use crate::domain::model::{CloudProvider, ServiceCatalog};
use crate::utils::error::{DraftError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_OUTPUT_DIR: &str = "./terraform-output";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub model: ModelConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
    /// Extra services per provider, keyed by provider name (`aws`, `azure`, `gcp`).
    pub services: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub model: String,
    pub base_url: String,
    pub temperature: f64,
    pub timeout_seconds: u64,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.1,
            timeout_seconds: 120,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: String,
    pub zip: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: DEFAULT_OUTPUT_DIR.to_string(),
            zip: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub json: bool,
}

impl TomlConfig {
    /// Loads a config file, substituting `${VAR}` references first.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DraftError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DraftError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DraftError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Reads the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String> {
        let key = std::env::var(&self.model.api_key_env)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        key.ok_or_else(|| DraftError::MissingConfigError {
            field: self.model.api_key_env.clone(),
        })
    }

    /// Default catalogue seeded with the `[services]` table.
    pub fn catalog(&self) -> Result<ServiceCatalog> {
        let mut catalog = ServiceCatalog::new();
        for (provider, names) in &self.services {
            let provider: CloudProvider =
                provider
                    .parse()
                    .map_err(|_| DraftError::InvalidConfigValueError {
                        field: "services".to_string(),
                        value: provider.clone(),
                        reason: "Expected one of aws, azure, gcp".to_string(),
                    })?;
            for name in names {
                catalog.add_custom(provider, name)?;
            }
        }
        Ok(catalog)
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_base_url("model.base_url", &self.model.base_url)?;
        validation::validate_text("model.model", &self.model.model)?;
        validation::validate_text("model.api_key_env", &self.model.api_key_env)?;
        validation::validate_temperature("model.temperature", self.model.temperature)?;
        if self.model.timeout_seconds == 0 {
            return Err(DraftError::InvalidConfigValueError {
                field: "model.timeout_seconds".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be at least one second".to_string(),
            });
        }
        validation::validate_output_dir("output.directory", &self.output.directory)?;

        for provider in self.services.keys() {
            if provider.parse::<CloudProvider>().is_err() {
                return Err(DraftError::InvalidConfigValueError {
                    field: "services".to_string(),
                    value: provider.clone(),
                    reason: "Expected one of aws, azure, gcp".to_string(),
                });
            }
        }

        Ok(())
    }
}

impl Validate for TomlConfig {
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
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();

        assert_eq!(config.model.model, "gpt-4o");
        assert_eq!(config.model.temperature, 0.1);
        assert_eq!(config.model.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.output.directory, "./terraform-output");
        assert!(!config.output.zip);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[model]
model = "gpt-4o-mini"
base_url = "https://llm.internal.example.com"
temperature = 0.3
timeout_seconds = 30

[output]
directory = "./drafts"
zip = true

[logging]
json = true

[services]
aws = ["Lambda", "DynamoDB"]
gcp = ["Pub/Sub"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.model.model, "gpt-4o-mini");
        assert_eq!(config.model.timeout_seconds, 30);
        assert!(config.output.zip);
        assert!(config.logging.json);

        let catalog = config.catalog().unwrap();
        assert!(catalog.contains(CloudProvider::Aws, "lambda"));
        assert!(catalog.contains(CloudProvider::Gcp, "Pub/Sub"));
        assert!(catalog.custom_services(CloudProvider::Azure).is_empty());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TF_DRAFTER_TEST_BASE_URL", "https://proxy.example.com");

        let toml_content = r#"
[model]
base_url = "${TF_DRAFTER_TEST_BASE_URL}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.model.base_url, "https://proxy.example.com");

        std::env::remove_var("TF_DRAFTER_TEST_BASE_URL");
    }

    #[test]
    fn test_config_validation() {
        let bad_url = TomlConfig::from_toml_str("[model]\nbase_url = \"not-a-url\"\n").unwrap();
        assert!(bad_url.validate().is_err());

        let hot = TomlConfig::from_toml_str("[model]\ntemperature = 3.5\n").unwrap();
        assert!(hot.validate().is_err());

        let no_timeout = TomlConfig::from_toml_str("[model]\ntimeout_seconds = 0\n").unwrap();
        assert!(no_timeout.validate().is_err());

        let unknown = TomlConfig::from_toml_str("[services]\noracle = [\"OCI\"]\n").unwrap();
        assert!(unknown.validate().is_err());
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let config =
            TomlConfig::from_toml_str("[model]\napi_key_env = \"TF_DRAFTER_TEST_UNSET_KEY\"\n")
                .unwrap();
        std::env::remove_var("TF_DRAFTER_TEST_UNSET_KEY");

        let err = config.api_key().unwrap_err();
        assert!(
            matches!(err, DraftError::MissingConfigError { ref field } if field == "TF_DRAFTER_TEST_UNSET_KEY")
        );
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[output]\ndirectory = \"./from-file\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output.directory, "./from-file");
    }
}
