use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::currency::{RateProvider, RateTable};
use crate::core::error::ConversionError;

const API_KEY_HEADER: &str = "apikey";

// Rates provider for the apilayer "exchangerates_data" API
pub struct ApiLayerProvider {
    base_url: String,
    client: reqwest::Client,
}

impl ApiLayerProvider {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> anyhow::Result<Self> {
        let mut key = HeaderValue::from_str(api_key)?;
        key.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);

        let client = reqwest::Client::builder()
            .user_agent(concat!("fxconv/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(ApiLayerProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    success: bool,
    rates: Option<HashMap<String, f64>>,
    date: Option<NaiveDate>,
}

#[async_trait]
impl RateProvider for ApiLayerProvider {
    #[instrument(name = "ApiLayerRatesFetch", skip(self), fields(base = %base))]
    async fn fetch_rates(&self, base: &str) -> Result<RateTable, ConversionError> {
        let url = format!("{}/latest", self.base_url);
        debug!("Requesting rates from {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("base", base)])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        let data: LatestRatesResponse = match serde_json::from_str(&text) {
            Ok(data) => data,
            Err(_) if !status.is_success() => {
                return Err(ConversionError::Fetch(format!("HTTP error: {status}")));
            }
            Err(e) => {
                debug!(response = %text, "Unexpected rates payload");
                return Err(ConversionError::Fetch(format!(
                    "Failed to parse rates response: {e}"
                )));
            }
        };

        if !data.success {
            return Err(ConversionError::Fetch("Failed to fetch rates".to_string()));
        }

        let raw = data.rates.ok_or_else(|| {
            ConversionError::Fetch("Failed to parse rates response: missing rates".to_string())
        })?;

        let rates = RateTable::new(base, raw).with_date(data.date);
        if rates.is_empty() {
            return Err(ConversionError::Fetch(
                "Failed to parse rates response: no valid rates".to_string(),
            ));
        }
        Ok(rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> ApiLayerProvider {
        ApiLayerProvider::new(&server.uri(), "test-key", Duration::from_secs(5))
            .expect("Failed to build provider")
    }

    async fn create_mock_server(status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("base", "EUR"))
            .and(header("apikey", "test-key"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn test_successful_rates_fetch() {
        let mock_response = r#"{
            "success": true,
            "timestamp": 1719830400,
            "base": "EUR",
            "date": "2024-07-01",
            "rates": {
                "USD": 1.1,
                "IDR": 17000.0,
                "GBP": 0.85
            }
        }"#;
        let mock_server = create_mock_server(200, mock_response).await;

        let rates = provider(&mock_server).fetch_rates("EUR").await.unwrap();
        assert_eq!(rates.base(), "EUR");
        assert_eq!(rates.len(), 3);
        assert_eq!(rates.rate_of("USD"), Some(1.1));
        assert_eq!(rates.rate_of("IDR"), Some(17000.0));
        assert_eq!(rates.rate_of("EUR"), Some(1.0));
        assert_eq!(rates.as_of(), NaiveDate::from_ymd_opt(2024, 7, 1));
    }

    #[tokio::test]
    async fn test_api_reports_failure() {
        let mock_response = r#"{"success": false, "error": {"code": 101}}"#;
        let mock_server = create_mock_server(200, mock_response).await;

        let result = provider(&mock_server).fetch_rates("EUR").await;
        assert_eq!(
            result.unwrap_err(),
            ConversionError::Fetch("Failed to fetch rates".to_string())
        );
    }

    #[tokio::test]
    async fn test_http_error_without_payload() {
        let mock_server = create_mock_server(500, "").await;

        let result = provider(&mock_server).fetch_rates("EUR").await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 500 Internal Server Error"
        );
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mock_response = r#"{"succes": true, "rates": {}}"#;
        let mock_server = create_mock_server(200, mock_response).await;

        let result = provider(&mock_server).fetch_rates("EUR").await;
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse rates response")
        );
    }

    #[tokio::test]
    async fn test_success_without_rates_is_rejected() {
        let mock_server = create_mock_server(200, r#"{"success": true}"#).await;

        let result = provider(&mock_server).fetch_rates("EUR").await;
        assert_eq!(
            result.unwrap_err(),
            ConversionError::Fetch("Failed to parse rates response: missing rates".to_string())
        );
    }

    #[tokio::test]
    async fn test_success_with_only_invalid_rates_is_rejected() {
        let mock_response = r#"{"success": true, "rates": {"USD": 0.0, "GBP": -1.5}}"#;
        let mock_server = create_mock_server(200, mock_response).await;

        let result = provider(&mock_server).fetch_rates("EUR").await;
        assert_eq!(
            result.unwrap_err(),
            ConversionError::Fetch("Failed to parse rates response: no valid rates".to_string())
        );

        let mock_server = create_mock_server(200, r#"{"success": true, "rates": {}}"#).await;
        assert!(provider(&mock_server).fetch_rates("EUR").await.is_err());
    }

    #[tokio::test]
    async fn test_base_is_sent_as_query_parameter() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("base", "A&B"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"success": true, "rates": {"USD": 1.1}}"#),
            )
            .mount(&mock_server)
            .await;

        let rates = provider(&mock_server).fetch_rates("A&B").await.unwrap();
        assert_eq!(rates.base(), "A&B");
        assert_eq!(rates.rate_of("USD"), Some(1.1));
    }

    #[tokio::test]
    async fn test_wrong_api_key_is_rejected() {
        let mock_server = create_mock_server(200, r#"{"success": true, "rates": {"USD": 1.1}}"#).await;
        let provider =
            ApiLayerProvider::new(&mock_server.uri(), "wrong-key", Duration::from_secs(5)).unwrap();

        // wiremock answers unmatched requests with 404 and an empty body
        let result = provider.fetch_rates("EUR").await;
        assert_eq!(result.unwrap_err().to_string(), "HTTP error: 404 Not Found");
    }

    #[tokio::test]
    async fn test_transport_error() {
        // Nothing listens on port 1
        let provider =
            ApiLayerProvider::new("http://127.0.0.1:1", "test-key", Duration::from_secs(5))
                .unwrap();
        let result = provider.fetch_rates("EUR").await;
        assert!(
            result
                .unwrap_err()
                .to_string()
                .starts_with("Request error:")
        );
    }
}
