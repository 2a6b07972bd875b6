use crate::domain::model::{Aircraft, AirportRecord, NewAircraft};
use crate::domain::ports::FleetSource;
use crate::utils::error::{OptimizerError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const AIRPORT_COLUMNS: &str = "icao,name,city,lat,lon";
const AIRCRAFT_COLUMNS: &str =
    "id,tail_number,model,current_icao,next_leg_icao,next_leg_time,user_id";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyzcompany.supabase.co`.
    pub url: String,
    /// Anon or service key; sent as `apikey`.
    pub api_key: String,
    /// Signed-in user's JWT. Falls back to `api_key` for the bearer header.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Restrict the aircraft list to one owner.
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    30
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            access_token: None,
            user_id: None,
            timeout_seconds: default_timeout(),
        }
    }
}

/// Reads and writes the `airports` and `aircraft` tables over the PostgREST API.
pub struct SupabaseSource {
    client: Client,
    rest_url: String,
    api_key: String,
    bearer: String,
    user_id: Option<String>,
}

impl SupabaseSource {
    pub fn new(config: SupabaseConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            rest_url: format!("{}/rest/v1", config.url.trim_end_matches('/')),
            bearer: config.access_token.unwrap_or_else(|| config.api_key.clone()),
            api_key: config.api_key,
            user_id: config.user_id,
        })
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.rest_url, table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.bearer)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("Supabase response status: {}", status);

        if status.is_success() {
            return Ok(response);
        }

        // PostgREST 錯誤內容是 JSON，取 message 欄位；否則保留原文
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .unwrap_or(body);

        Err(OptimizerError::DataSourceError {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl FleetSource for SupabaseSource {
    async fn fetch_airports(&self) -> Result<Vec<AirportRecord>> {
        tracing::debug!("Fetching airports from {}", self.rest_url);
        let request = self
            .request(Method::GET, "airports")
            .query(&[("select", AIRPORT_COLUMNS), ("order", "icao.asc")]);

        Ok(self.send(request).await?.json().await?)
    }

    async fn fetch_aircraft(&self) -> Result<Vec<Aircraft>> {
        tracing::debug!("Fetching aircraft from {}", self.rest_url);
        let mut request = self
            .request(Method::GET, "aircraft")
            .query(&[("select", AIRCRAFT_COLUMNS), ("order", "tail_number.asc")]);

        if let Some(user_id) = &self.user_id {
            request = request.query(&[("user_id", format!("eq.{}", user_id))]);
        }

        Ok(self.send(request).await?.json().await?)
    }

    async fn insert_aircraft(&self, aircraft: &NewAircraft) -> Result<Aircraft> {
        let mut row = aircraft.clone();
        if row.user_id.is_none() {
            row.user_id = self.user_id.clone();
        }

        let request = self
            .request(Method::POST, "aircraft")
            .header("Prefer", "return=representation")
            .json(&[row]);

        let mut created: Vec<Aircraft> = self.send(request).await?.json().await?;
        if created.is_empty() {
            return Err(OptimizerError::ProcessingError {
                message: "insert returned no rows".to_string(),
            });
        }
        Ok(created.remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn source(server: &MockServer) -> SupabaseSource {
        SupabaseSource::new(SupabaseConfig::new(server.base_url(), "anon-key")).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_airports_sends_select_and_auth_headers() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/rest/v1/airports")
                .query_param("select", AIRPORT_COLUMNS)
                .query_param("order", "icao.asc")
                .header("apikey", "anon-key")
                .header("authorization", "Bearer anon-key");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    {"icao": "KBOS", "name": "Boston Logan Intl", "city": "Boston", "lat": 42.3656, "lon": -71.0096},
                    {"icao": "KTEB", "name": "Teterboro", "city": null, "lat": 40.8501, "lon": -74.0608}
                ]));
        });

        let airports = source(&server).fetch_airports().await.unwrap();

        api_mock.assert();
        assert_eq!(airports.len(), 2);
        assert_eq!(airports[0].icao, "KBOS");
        assert_eq!(airports[1].city, None);
    }

    #[tokio::test]
    async fn test_fetch_aircraft_filters_by_user() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/rest/v1/aircraft")
                .query_param("order", "tail_number.asc")
                .query_param("user_id", "eq.user-42");
            then.status(200).json_body(serde_json::json!([
                {"id": 3, "tail_number": "N12345", "model": "Phenom 300", "current_icao": "KTEB",
                 "next_leg_icao": "KBOS", "next_leg_time": "2025-03-01T14:30:00+00:00", "user_id": "user-42"}
            ]));
        });

        let mut config = SupabaseConfig::new(server.base_url(), "anon-key");
        config.user_id = Some("user-42".to_string());
        let aircraft = SupabaseSource::new(config).unwrap().fetch_aircraft().await.unwrap();

        api_mock.assert();
        assert_eq!(aircraft.len(), 1);
        assert_eq!(aircraft[0].id, "3");
        assert_eq!(aircraft[0].model.as_deref(), Some("Phenom 300"));
    }

    #[tokio::test]
    async fn test_access_token_used_as_bearer() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/rest/v1/aircraft")
                .header("apikey", "anon-key")
                .header("authorization", "Bearer user-jwt");
            then.status(200).json_body(serde_json::json!([]));
        });

        let mut config = SupabaseConfig::new(server.base_url(), "anon-key");
        config.access_token = Some("user-jwt".to_string());
        let aircraft = SupabaseSource::new(config).unwrap().fetch_aircraft().await.unwrap();

        api_mock.assert();
        assert!(aircraft.is_empty());
    }

    #[tokio::test]
    async fn test_insert_aircraft_posts_row_and_returns_representation() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/rest/v1/aircraft")
                .header("prefer", "return=representation")
                .json_body(serde_json::json!([
                    {"tail_number": "N777", "current_icao": "KTEB", "next_leg_icao": "KBOS"}
                ]));
            then.status(201).json_body(serde_json::json!([
                {"id": "0b7c7f0e-1c1a-4b53-9d2e-3f1f5b0f2a11", "tail_number": "N777", "model": null,
                 "current_icao": "KTEB", "next_leg_icao": "KBOS", "next_leg_time": null, "user_id": null}
            ]));
        });

        let stored = source(&server)
            .insert_aircraft(&NewAircraft::new("N777", "KTEB", "KBOS"))
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(stored.id, "0b7c7f0e-1c1a-4b53-9d2e-3f1f5b0f2a11");
    }

    #[tokio::test]
    async fn test_error_status_maps_to_data_source_error() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/rest/v1/airports");
            then.status(401)
                .json_body(serde_json::json!({"message": "Invalid API key", "hint": null}));
        });

        let result = source(&server).fetch_airports().await;

        api_mock.assert();
        match result {
            Err(OptimizerError::DataSourceError { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API key");
            }
            other => panic!("expected DataSourceError, got {:?}", other.map(|a| a.len())),
        }
    }
}
