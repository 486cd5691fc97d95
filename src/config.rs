use clap::Parser;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config yaml: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Command line, with environment fallbacks for secrets
#[derive(Parser, Debug, Default, Clone)]
#[command(name = "storefront_checkout", about = "Storefront checkout service")]
pub struct CliArgs {
    /// Environment name; selects config/{env}.yaml
    #[arg(long, short = 'e', env = "CHECKOUT_ENV", default_value = "dev")]
    pub env: String,

    /// Explicit config file path (overrides --env)
    #[arg(long, env = "CHECKOUT_CONFIG")]
    pub config: Option<String>,

    /// Payment provider secret key
    #[arg(long, env = "MOYASAR_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Storefront base URL used for callback and return URLs
    #[arg(long, env = "FRONTEND_STORE_URL")]
    pub frontend_store_url: Option<String>,

    /// PostgreSQL connection URL (omit for in-memory simulation mode)
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Override the listening port
    #[arg(long)]
    pub port: Option<u16>,
}

impl CliArgs {
    pub fn config_path(&self) -> String {
        self.config
            .clone()
            .unwrap_or_else(|| format!("config/{}.yaml", self.env))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub server: ServerConfig,
    #[serde(default)]
    pub checkout: CheckoutConfig,
    #[serde(default)]
    pub payment: PaymentConfig,
    /// PostgreSQL connection URL; absent means simulation mode
    #[serde(default)]
    pub postgres_url: Option<String>,
    /// Seed data for simulation mode
    #[serde(default)]
    pub simulation: SimulationConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Value of Access-Control-Allow-Origin
    #[serde(default = "default_cors_allow_origin")]
    pub cors_allow_origin: String,
}

fn default_cors_allow_origin() -> String {
    "*".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CheckoutConfig {
    /// Storefront base URL, e.g. https://shop.example
    #[serde(default)]
    pub frontend_store_url: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default = "default_true")]
    pub save_card: bool,
    /// Also send the cart?success=1 / cart?canceled=1 pair
    #[serde(default)]
    pub include_return_urls: bool,
    /// Upper bound for each catalog, order store and provider call
    #[serde(default = "default_collaborator_timeout_ms")]
    pub collaborator_timeout_ms: u64,
}

fn default_currency() -> String {
    "SAR".to_string()
}

fn default_description() -> String {
    "Order payment".to_string()
}

fn default_true() -> bool {
    true
}

fn default_collaborator_timeout_ms() -> u64 {
    10_000
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            frontend_store_url: String::new(),
            currency: default_currency(),
            description: default_description(),
            save_card: true,
            include_return_urls: false,
            collaborator_timeout_ms: default_collaborator_timeout_ms(),
        }
    }
}

impl CheckoutConfig {
    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_millis(self.collaborator_timeout_ms)
    }
}

/// How the API key is presented to the provider
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// `Authorization: Bearer {key}`
    #[default]
    Bearer,
    /// HTTP basic, key as username and empty password
    Basic,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct PaymentConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub auth_scheme: AuthScheme,
    /// Normally supplied through MOYASAR_API_KEY
    #[serde(default, skip_serializing)]
    pub api_key: String,
}

fn default_api_base() -> String {
    "https://api.moyasar.com".to_string()
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            auth_scheme: AuthScheme::default(),
            api_key: String::new(),
        }
    }
}

// Keep the secret out of logs
impl std::fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("api_base", &self.api_base)
            .field("auth_scheme", &self.auth_scheme)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SimulationConfig {
    /// Known store ids; empty accepts any store
    #[serde(default)]
    pub stores: Vec<String>,
    #[serde(default)]
    pub products: Vec<SimulatedProduct>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SimulatedProduct {
    pub id: String,
    pub price: Decimal,
}

impl AppConfig {
    /// Load a YAML config file
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load the file selected by the CLI, then layer CLI/env values on top
    pub fn from_args(cli: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::load(&cli.config_path())?;
        config.apply_overrides(cli);
        Ok(config)
    }

    pub fn apply_overrides(&mut self, cli: &CliArgs) {
        if let Some(key) = &cli.api_key {
            self.payment.api_key = key.clone();
        }
        if let Some(url) = &cli.frontend_store_url {
            self.checkout.frontend_store_url = url.clone();
        }
        if let Some(url) = &cli.database_url {
            self.postgres_url = Some(url.clone());
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
    }

    /// Fail fast on settings the checkout flow cannot run without
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.payment.api_key.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "payment api key is not set (MOYASAR_API_KEY)".to_string(),
            ));
        }

        check_http_url("checkout.frontend_store_url", &self.checkout.frontend_store_url)?;
        check_http_url("payment.api_base", &self.payment.api_base)?;

        let currency = &self.checkout.currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ConfigError::Invalid(format!(
                "checkout.currency must be an ISO 4217 code, got {:?}",
                currency
            )));
        }

        if self.checkout.collaborator_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "checkout.collaborator_timeout_ms must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

fn check_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = reqwest::Url::parse(value)
        .map_err(|e| ConfigError::Invalid(format!("{} is not a valid URL ({:?}): {}", field, value, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Invalid(format!(
            "{} must be http(s), got scheme {}",
            field, other
        ))),
    }
}
