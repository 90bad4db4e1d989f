use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub company: CompanyConfig,
    pub pricing: PricingConfig,
    pub store: StoreConfig,
    pub email: EmailConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CompanyConfig {
    pub name: String,
    pub phone: String,
    /// Payment handle printed in the estimate header block.
    pub payment_handle: String,
    #[serde(default = "default_valid_days")]
    pub estimate_valid_days: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PricingConfig {
    #[serde(default = "default_rate")]
    pub default_rate_per_sq_ft: f64,
    #[serde(default = "default_minimum_charge")]
    pub minimum_charge: f64,
}

/// Remote estimates table (managed Postgres, REST interface).
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub url: String,
    pub api_key: String,
    #[serde(default = "default_table")]
    pub table: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    pub api_key: String,
    /// Sender line, e.g. `Sharp Lawn Mowing <onboarding@resend.dev>`.
    pub from: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

fn default_valid_days() -> u32 {
    7
}

fn default_rate() -> f64 {
    0.02
}

fn default_minimum_charge() -> f64 {
    50.0
}

fn default_table() -> String {
    "estimates".to_string()
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [company]
            name = "Sharp Lawn Mowing"
            phone = "(954) 787-8150"
            payment_handle = "@Breck-Wiener"

            [pricing]

            [store]
            url = "https://example.supabase.co"
            api_key = "anon-key"

            [email]
            api_key = "re_123"
            from = "Sharp Lawn Mowing <onboarding@resend.dev>"

            [server]
            port = 8787
            "#,
        )
        .unwrap();

        assert_eq!(config.company.estimate_valid_days, 7);
        assert_eq!(config.pricing.default_rate_per_sq_ft, 0.02);
        assert_eq!(config.pricing.minimum_charge, 50.0);
        assert_eq!(config.store.table, "estimates");
    }
}
