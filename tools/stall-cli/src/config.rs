//! CLI configuration.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use stall_checkout::SessionConfig;
use stall_observability::LogConfig;

/// File names searched for, in order, in each directory.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["stall.toml", ".stall.toml", "stall.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StallConfig {
    /// What views are shown.
    #[serde(default)]
    pub session: SessionConfig,

    /// Where the catalog comes from and how orders are answered.
    #[serde(default)]
    pub api: ApiConfig,

    /// Logging setup.
    #[serde(default)]
    pub logging: LogConfig,
}

impl StallConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if is_json(path) {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// The local shop API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Product list file. The bundled catalog is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<String>,

    /// Refuse every order.
    #[serde(default)]
    pub reject_orders: bool,

    /// Message sent with refused orders.
    #[serde(default = "default_reject_message")]
    pub reject_message: String,

    /// Make every catalog fetch fail.
    #[serde(default)]
    pub fail_catalog: bool,
}

fn default_reject_message() -> String {
    "Orders are not accepted right now".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            reject_orders: false,
            reject_message: default_reject_message(),
            fail_catalog: false,
        }
    }
}

/// Generate a default stall.toml config file.
pub fn generate_default_config() -> String {
    r#"# Stall storefront configuration

[session]
# cdn_url = "https://larek-api.nomoreparties.co/content/weblarek"
currency_label = "synapses"
priceless_label = "Priceless"

[api]
# catalog_path = "catalog.json"
reject_orders = false
reject_message = "Orders are not accepted right now"
fail_catalog = false

[logging]
level = "warn"
format = "human"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stall_observability::{LogFormat, LogLevel};

    #[test]
    fn test_default_config_parses() {
        let config: StallConfig = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config, StallConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config: StallConfig = toml::from_str(
            r#"
            [api]
            reject_orders = true

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert!(config.api.reject_orders);
        assert_eq!(config.api.reject_message, "Orders are not accepted right now");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert_eq!(config.session.currency_label, "synapses");
    }

    #[test]
    fn test_json_config() {
        let config: StallConfig =
            serde_json::from_str(r#"{"session": {"cdn_url": "https://cdn.example.com"}}"#).unwrap();
        assert_eq!(config.session.cdn_url, "https://cdn.example.com");
        assert!(!config.api.fail_catalog);
    }
}
