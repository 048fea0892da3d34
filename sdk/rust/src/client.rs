use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseResponse {
    pub url: String,
    pub username: String,
    pub password: String,
    pub pool_size: i32,
    pub timeout: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityResponse {
    pub enabled: bool,
    pub token_expiration: i64,
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub name: String,
    pub description: String,
    pub version: String,
    pub enabled: bool,
    pub max_connections: i32,
    pub timeout: f64,
    pub environment: String, // One of DEVELOPMENT, TESTING, STAGING, PRODUCTION
    pub supported_formats: Vec<String>,
    pub rates: Vec<f64>,
    pub database: DatabaseResponse,
    pub security: SecurityResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseSummaryResponse {
    pub url: String,
    pub pool_size: i32,
    pub timeout: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub name: String,
    pub version: String,
    pub mode: String,
    pub timestamp: String, // RFC 3339, captured by the server per request
    pub enabled: bool,
    pub database: DatabaseSummaryResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EnvironmentInfoResponse {
    #[serde(rename_all = "camelCase")]
    Development { connection_count: i32 },
    #[serde(rename_all = "camelCase")]
    Production {
        database_url: String,
        token_expiration: i64,
    },
    #[serde(rename_all = "camelCase")]
    NonProduction {
        message: String,
        environment_name: String,
    },
}

pub struct ConfigClient {
    client: Client,
    base_url: String,
}

impl ConfigClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the full bound configuration.
    pub async fn config(&self) -> Result<ConfigResponse, Box<dyn std::error::Error>> {
        self.get_json("/api/config").await
    }

    pub async fn database(&self) -> Result<DatabaseResponse, Box<dyn std::error::Error>> {
        self.get_json("/api/config/database").await
    }

    pub async fn security(&self) -> Result<SecurityResponse, Box<dyn std::error::Error>> {
        self.get_json("/api/config/security").await
    }

    pub async fn status(&self) -> Result<StatusResponse, Box<dyn std::error::Error>> {
        self.get_json("/api/config/status").await
    }

    pub async fn environment_info(
        &self,
    ) -> Result<EnvironmentInfoResponse, Box<dyn std::error::Error>> {
        self.get_json("/api/config/environment-info").await
    }

    /// Perform a raw GET against the service, leaving status handling to the caller.
    pub async fn get(&self, path: &str) -> Result<Response, reqwest::Error> {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, Box<dyn std::error::Error>> {
        let resp = self.get(path).await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(format!("Config API returned error status {}: {}", status, text).into());
        }

        Ok(serde_json::from_str::<T>(&text)?)
    }
}
