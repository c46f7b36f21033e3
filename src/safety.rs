//! Client for the extension safety-marks API.
//!
//! The service classifies extensions by id; the engine itself never calls
//! it. The CLI fetches marks and joins them to the extension index, and can
//! report locally-seen extensions back for classification.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Classification value for an extension nobody has marked yet.
pub const SAFE_UNKNOWN: i32 = -2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeMark {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Classification: negative values are unknown/pending, the rest are
    /// service-defined safety levels.
    pub safe: i32,
}

pub struct SafetyClient {
    base_url: String,
    client: reqwest::Client,
}

impl SafetyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        SafetyClient {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Fetch every known mark from the service.
    pub async fn query_necessary(&self) -> Result<Vec<SafeMark>> {
        let response = self
            .client
            .get(format!("{}/query_necessary", self.base_url))
            .send()
            .await?;
        let data = handle_response(response).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Submit a batch of locally-seen extensions for classification.
    pub async fn add_batch(&self, extensions: &[SafeMark]) -> Result<Value> {
        let response = self
            .client
            .post(format!("{}/add_batch", self.base_url))
            .json(extensions)
            .send()
            .await?;
        handle_response(response).await
    }
}

async fn handle_response(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        // the service puts a human-readable reason under "detail"
        let detail = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_string))
            .unwrap_or(body);
        bail!("API error (status {}): {}", status.as_u16(), detail);
    }
    Ok(response.json().await?)
}

/// Index marks by extension id for joining against the extension index.
pub fn mark_map(marks: Vec<SafeMark>) -> HashMap<String, SafeMark> {
    marks.into_iter().map(|m| (m.id.clone(), m)).collect()
}
