#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::collections::HashMap;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

use crate::domain::models::BackendName;
use crate::domain::models::DEFAULT_MAX_LENGTH;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    AppName,
    AppVersion,
    Backend,
    ConfigFile,
    Disabled,
    GraphqlURL,
    MaxMessageLength,
    MockMode,
    Model,
    Placeholder,
    RestToken,
    RestURL,
    ShowTimestamps,
}

impl ConfigKey {
    /// Environment variable clap falls back to for this key.
    pub fn env_var(self) -> String {
        return format!(
            "AICHATBOX_{}",
            self.to_string().to_uppercase().replace('-', "_")
        );
    }

    pub fn default_value(self) -> String {
        let config_path = dirs::config_dir()
            .unwrap_or_default()
            .join("aichatbox/config.toml");

        let res = match self {
            ConfigKey::AppName => "ZY-YD AI Tools".to_string(),
            ConfigKey::AppVersion => env!("CARGO_PKG_VERSION").to_string(),
            ConfigKey::Backend => BackendName::GraphQL.to_string(),
            ConfigKey::Disabled => "false".to_string(),
            ConfigKey::GraphqlURL => "http://localhost:8787/graphql".to_string(),
            ConfigKey::MaxMessageLength => DEFAULT_MAX_LENGTH.to_string(),
            ConfigKey::MockMode => "false".to_string(),
            ConfigKey::Model => "gpt-3.5-turbo".to_string(),
            ConfigKey::Placeholder => "Type your question...".to_string(),
            ConfigKey::RestToken => "".to_string(),
            ConfigKey::RestURL => "http://localhost:8787".to_string(),
            ConfigKey::ShowTimestamps => "true".to_string(),

            // Special
            ConfigKey::ConfigFile => config_path.to_string_lossy().to_string(),
        };

        return res;
    }
}

/// Settings resolved once at startup. Nothing reads the environment or the
/// config file after this is built; components get a copy of what they need.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub app_name: String,
    pub app_version: String,
    pub backend: BackendName,
    pub disabled: bool,
    pub graphql_url: String,
    pub max_message_length: usize,
    pub mock_mode: bool,
    pub model: String,
    pub placeholder: String,
    pub rest_token: String,
    pub rest_url: String,
    pub show_timestamps: bool,
}

fn parse_bool(key: ConfigKey, value: &str) -> Result<bool> {
    match value {
        "true" => return Ok(true),
        "false" => return Ok(false),
        _ => bail!("Config key '{key}' must be true or false, got: {value}"),
    }
}

impl Config {
    pub fn defaults() -> HashMap<ConfigKey, String> {
        return ConfigKey::iter()
            .map(|key| return (key, key.default_value()))
            .collect();
    }

    pub fn from_values(values: &HashMap<ConfigKey, String>) -> Result<Config> {
        let get = |key: ConfigKey| {
            return values
                .get(&key)
                .cloned()
                .unwrap_or_else(|| return key.default_value());
        };

        let backend_str = get(ConfigKey::Backend);
        let backend = match BackendName::parse(&backend_str) {
            Some(backend) => backend,
            None => bail!("Config key 'backend' has an invalid value: {backend_str}"),
        };

        let max_length_str = get(ConfigKey::MaxMessageLength);
        let max_message_length = match max_length_str.parse::<usize>() {
            Ok(length) if length > 0 => length,
            _ => bail!(
                "Config key 'max-message-length' must be a positive number, got: {max_length_str}"
            ),
        };

        return Ok(Config {
            app_name: get(ConfigKey::AppName),
            app_version: get(ConfigKey::AppVersion),
            backend,
            disabled: parse_bool(ConfigKey::Disabled, &get(ConfigKey::Disabled))?,
            graphql_url: get(ConfigKey::GraphqlURL),
            max_message_length,
            // Only the literal "true" turns mock mode on.
            mock_mode: get(ConfigKey::MockMode) == "true",
            model: get(ConfigKey::Model),
            placeholder: get(ConfigKey::Placeholder),
            rest_token: get(ConfigKey::RestToken),
            rest_url: get(ConfigKey::RestURL),
            show_timestamps: parse_bool(
                ConfigKey::ShowTimestamps,
                &get(ConfigKey::ShowTimestamps),
            )?,
        });
    }

    /// The backend requests go to. Mock mode wins over whatever backend is
    /// configured.
    pub fn resolved_backend(&self) -> BackendName {
        if self.mock_mode {
            return BackendName::Mock;
        }

        return self.backend;
    }

    /// Layers defaults, then the TOML config file, then CLI arguments (which
    /// fall back to `AICHATBOX_*` environment variables).
    pub async fn load(cmd: Command, clap_arg_matches: Vec<&ArgMatches>) -> Result<Config> {
        let mut values = Config::defaults();

        let mut config_file = ConfigKey::ConfigFile.default_value();
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(config_path).await?;
            let doc = toml_str.parse::<toml_edit::Document>()?;

            for key in ConfigKey::iter() {
                if let Some(val) = doc.get(&key.to_string()) {
                    // Use clap value parsers to do validation.
                    let mut possible_values = vec![];
                    if let Some(arg) = cmd
                        .get_arguments()
                        .find(|e| return e.get_long() == Some(key.to_string().as_str()))
                    {
                        possible_values = arg
                            .get_possible_values()
                            .iter()
                            .map(|e| return e.get_name().to_string())
                            .collect::<Vec<String>>();
                    }

                    if let Some(val_int) = val.as_integer() {
                        values.insert(key, val_int.to_string());
                    } else if let Some(val_bool) = val.as_bool() {
                        values.insert(key, val_bool.to_string());
                    } else if let Some(val_str) = val.as_str() {
                        if val_str.is_empty() {
                            continue;
                        }
                        if !possible_values.is_empty()
                            && !possible_values.contains(&val_str.to_string())
                        {
                            bail!(format!("config.toml has an invalid value for key '{key}': {val_str}\nPossible values are: {}", possible_values.join(", ")));
                        }
                        values.insert(key, val_str.to_string());
                    }
                }
            }
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    values.insert(key, val.to_string());
                }
            }
        }

        let config = Config::from_values(&values)?;

        tracing::debug!(
            backend = %config.resolved_backend(),
            graphql_url = %config.graphql_url,
            rest_url = %config.rest_url,
            model = %config.model,
            max_message_length = config.max_message_length,
            disabled = config.disabled,
            "config"
        );

        return Ok(config);
    }

    pub fn serialize_default(cmd: Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::ConfigFile {
                    return None;
                }

                let arg = cmd
                    .get_arguments()
                    .find(|e| return e.get_long() == Some(key.to_string().as_str()))?;

                let mut description = arg
                    .get_help()
                    .map(|help| return help.to_string())
                    .unwrap_or_default();

                description = description
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                if !arg.get_possible_values().is_empty() {
                    let possible_values = arg
                        .get_possible_values()
                        .iter()
                        .map(|e| return e.get_name().to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    description = format!("{description} [possible values: {}]", possible_values);
                }

                let mut val = key.default_value();
                if val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if val.parse::<i64>().is_ok() || val == "true" || val == "false" {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = \"{val}\"");
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}
