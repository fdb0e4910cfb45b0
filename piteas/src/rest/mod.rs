pub mod endpoints;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{PiteasError, Result};

/// HTTP client wrapper for the Piteas quote API and static JSON documents.
#[derive(Debug, Clone)]
pub struct PiteasHttpClient {
    client: Client,
    base_url: String,
}

impl PiteasHttpClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// GET a JSON resource relative to the base URL.
    pub async fn get<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        self.get_url(&url, query).await
    }

    /// GET a JSON resource from an absolute URL.
    pub async fn get_url<T, Q>(&self, url: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let resp = self.client.get(url).query(query).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(PiteasError::Http {
                status,
                message: body,
            });
        }

        // Decode through serde_json so malformed bodies surface as `Json`.
        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(PiteasError::Json)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
