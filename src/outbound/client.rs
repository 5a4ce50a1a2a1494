use super::message::{OutboundMessage, TemplateMessage};
use crate::core::{BridgeError, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest::{Method, Request, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_API_BASE_URL: &str = "https://crm.srlines.net/api/v1";
pub const SEND_MESSAGE_ENDPOINT: &str = "/send-message";
pub const SEND_TEMPLATE_ENDPOINT: &str = "/send_templet";

/// Outbound side of the wCRM API.
#[async_trait]
pub trait WcrmApi: Send + Sync {
    async fn send_message(&self, message: &OutboundMessage) -> Result<Value>;

    async fn send_template(&self, template: &TemplateMessage) -> Result<Value>;

    /// Checks that the API key is accepted.
    async fn verify_credentials(&self) -> Result<()>;
}

/// HTTP client for the wCRM API.
///
/// The template endpoint takes the key as a bearer token; every other
/// endpoint takes it as a `token` query parameter.
pub struct WcrmClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl WcrmClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(BridgeError::Config("API key cannot be empty".to_string()));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds an authenticated request without sending it.
    pub fn build_request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Request> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, endpoint))
            .map_err(|err| BridgeError::Config(format!("invalid API URL: {err}")))?;

        let mut builder = if endpoint == SEND_TEMPLATE_ENDPOINT {
            let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|_| BridgeError::Config("API key is not a valid header value".into()))?;
            self.http
                .request(method, url)
                .header(CONTENT_TYPE, "application/json")
                .header(AUTHORIZATION, bearer)
        } else {
            url.query_pairs_mut().append_pair("token", &self.api_key);
            self.http.request(method, url)
        };

        if let Some(body) = body {
            builder = builder.json(body);
        }
        Ok(builder.build()?)
    }

    async fn call(&self, method: Method, endpoint: &str, body: Option<&Value>) -> Result<Value> {
        let request = self.build_request(method, endpoint, body)?;
        debug!(method = %request.method(), endpoint, "calling wCRM API");

        let response = self.http.execute(request).await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(endpoint, status = status.as_u16(), "wCRM API rejected request");
            return Err(BridgeError::Upstream(format!("{endpoint} returned {status}: {text}")));
        }

        if text.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}

#[async_trait]
impl WcrmApi for WcrmClient {
    async fn send_message(&self, message: &OutboundMessage) -> Result<Value> {
        let body = message.to_request_body();
        debug!(to = %message.to, kind = message.content.kind(), "sending message");
        self.call(Method::POST, SEND_MESSAGE_ENDPOINT, Some(&body)).await
    }

    async fn send_template(&self, template: &TemplateMessage) -> Result<Value> {
        let body = template.to_request_body();
        self.call(Method::POST, SEND_TEMPLATE_ENDPOINT, Some(&body)).await
    }

    async fn verify_credentials(&self) -> Result<()> {
        self.call(Method::GET, SEND_MESSAGE_ENDPOINT, None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> WcrmClient {
        WcrmClient::new(DEFAULT_API_BASE_URL, "k3y", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_message_endpoint_uses_token_query() {
        let request = client()
            .build_request(Method::POST, SEND_MESSAGE_ENDPOINT, Some(&json!({"a": 1})))
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://crm.srlines.net/api/v1/send-message?token=k3y"
        );
        assert!(request.headers().get(AUTHORIZATION).is_none());
        assert_eq!(
            request.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_token_is_appended_to_existing_query() {
        let request = client()
            .build_request(Method::GET, "/send-message?dry_run=1", None)
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://crm.srlines.net/api/v1/send-message?dry_run=1&token=k3y"
        );
    }

    #[test]
    fn test_template_endpoint_uses_bearer_header() {
        let request = client()
            .build_request(Method::POST, SEND_TEMPLATE_ENDPOINT, Some(&json!({})))
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://crm.srlines.net/api/v1/send_templet"
        );
        assert_eq!(request.headers().get(AUTHORIZATION).unwrap(), "Bearer k3y");
        assert_eq!(
            request.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_empty_api_key_is_rejected() {
        assert!(matches!(
            WcrmClient::new(DEFAULT_API_BASE_URL, " ", Duration::from_secs(5)),
            Err(BridgeError::Config(_))
        ));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = WcrmClient::new("http://localhost:9999/api/", "k", Duration::from_secs(1))
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:9999/api");
    }
}
