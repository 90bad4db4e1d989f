use crate::config::StoreConfig;
use crate::types::EstimateRecord;
use anyhow::{bail, Context, Result};

/// Client for the remote estimates table. The table is append-only: one
/// insert per saved estimate, no update or delete path, one attempt per
/// save with the failure surfaced to the operator.
pub struct EstimateStore {
    http: reqwest::Client,
    url: String,
    api_key: String,
    table: String,
}

impl EstimateStore {
    pub fn new(config: &StoreConfig) -> Self {
        EstimateStore {
            http: reqwest::Client::new(),
            url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            table: config.table.clone(),
        }
    }

    pub async fn insert(&self, record: &EstimateRecord) -> Result<()> {
        let endpoint = format!("{}/rest/v1/{}", self.url, self.table);
        let response = self
            .http
            .post(&endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=minimal")
            .json(&[record])
            .send()
            .await
            .context("Estimate insert request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Estimate store rejected the insert ({}): {}", status, body);
        }
        Ok(())
    }
}
