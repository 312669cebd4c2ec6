//! Default JSON-over-HTTP transport
//!
//! Resolves requests against a base endpoint and speaks JSON both ways.
//! Non-success statuses are returned as responses, not errors; the
//! pipeline decides what they mean.

use super::{Dispatch, DeferredResponse, RawResponse, Request, Transport, TransportError};
use crate::config::ClientConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        format!(
            "{}... [truncated, {} bytes total]",
            &body[..MAX_LOG_BODY_LENGTH],
            body.len()
        )
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP transport for JSON service APIs
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Create a transport against a base endpoint with default settings.
    pub fn new(endpoint: &str) -> Result<Self, TransportError> {
        Self::with_config(endpoint, &ClientConfig::default())
    }

    /// Create a transport against a base endpoint with explicit settings.
    pub fn with_config(endpoint: &str, config: &ClientConfig) -> Result<Self, TransportError> {
        let endpoint =
            Url::parse(endpoint).map_err(|e| TransportError::Endpoint(e.to_string()))?;

        let client = Client::builder()
            .user_agent(config.effective_user_agent())
            .timeout(config.effective_timeout())
            .build()
            .map_err(|e| TransportError::Send(e.to_string()))?;

        Ok(Self { client, endpoint })
    }

    /// Resolve the request path and query against the base endpoint.
    fn request_url(&self, request: &Request) -> Result<Url, TransportError> {
        let mut url = self
            .endpoint
            .join(request.path.trim_start_matches('/'))
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        if !request.query.is_empty() {
            let encoded: Vec<String> = request
                .query
                .iter()
                .map(|(key, value)| {
                    format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
                })
                .collect();
            url.set_query(Some(&encoded.join("&")));
        }

        Ok(url)
    }
}

/// One round trip; owns its inputs so it can run on a spawned task.
async fn round_trip(client: Client, url: Url, request: Request) -> Result<RawResponse, TransportError> {
    let method = reqwest::Method::from_bytes(request.method.as_bytes())
        .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

    let mut builder = client.request(method, url);
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(body) = &request.body {
        if !body.is_null() {
            builder = builder.json(body);
        }
    }

    let response = builder
        .send()
        .await
        .map_err(|e| TransportError::Send(e.to_string()))?;

    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

    if !(200..300).contains(&status) {
        tracing::warn!("service error: {} - {}", status, sanitize_for_log(&body));
    }

    // Handle empty response
    if body.is_empty() {
        return Ok(RawResponse {
            status,
            body: Value::Null,
        });
    }

    let body = serde_json::from_str(&body).unwrap_or(Value::String(body));

    Ok(RawResponse { status, body })
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request, deferred: bool) -> Result<Dispatch, TransportError> {
        let url = self.request_url(&request)?;
        tracing::debug!("{} {}", request.method, url);

        if deferred {
            let client = self.client.clone();
            Ok(Dispatch::Deferred(DeferredResponse::spawn(round_trip(
                client, url, request,
            ))))
        } else {
            let response = round_trip(self.client.clone(), url, request).await?;
            Ok(Dispatch::Response(response))
        }
    }
}
