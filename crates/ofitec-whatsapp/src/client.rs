// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the WhatsApp Business Cloud API.
//!
//! Provides [`WhatsAppClient`], which posts messages to the Graph API
//! `/{phone_number_id}/messages` endpoint and implements the generic
//! [`MessageChannel`] trait for the dispatcher.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use ofitec_core::OfitecError;
use ofitec_core::traits::MessageChannel;
use ofitec_core::types::{MessageType, ProviderMessageId};

/// Base URL for the Graph API.
const API_BASE_URL: &str = "https://graph.facebook.com";

/// Channel name used in logs, message records, and rate-limiter state.
pub const CHANNEL_NAME: &str = "whatsapp";

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    messages: Vec<SentMessageId>,
}

#[derive(Debug, Deserialize)]
struct SentMessageId {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// WhatsApp Business Cloud API client.
#[derive(Debug, Clone)]
pub struct WhatsAppClient {
    client: reqwest::Client,
    endpoint: String,
    default_language: String,
}

impl WhatsAppClient {
    /// Build a client for one business phone number.
    ///
    /// `base_url` overrides the Graph API host, used by tests and
    /// gateway sandboxes.
    pub fn new(
        access_token: &str,
        api_version: &str,
        phone_number_id: &str,
        default_language: &str,
        base_url: Option<&str>,
    ) -> Result<Self, OfitecError> {
        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {access_token}");
        headers.insert(
            reqwest::header::AUTHORIZATION,
            HeaderValue::from_str(&bearer)
                .map_err(|e| OfitecError::Config(format!("invalid access token: {e}")))?,
        );
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| OfitecError::Channel {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        let base = base_url.unwrap_or(API_BASE_URL).trim_end_matches('/');
        Ok(Self {
            client,
            endpoint: format!("{base}/{api_version}/{phone_number_id}/messages"),
            default_language: default_language.to_string(),
        })
    }

    /// Post one message payload and extract the provider message id.
    async fn post_message(
        &self,
        payload: serde_json::Value,
    ) -> Result<ProviderMessageId, OfitecError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| OfitecError::Channel {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .map(|e| e.message)
                .unwrap_or(body);
            warn!(status = %status, %detail, "send rejected by provider");
            return Err(OfitecError::channel(format!(
                "provider returned {status}: {detail}"
            )));
        }

        let parsed: SendResponse = response.json().await.map_err(|e| OfitecError::Channel {
            message: format!("malformed provider response: {e}"),
            source: Some(Box::new(e)),
        })?;

        let id = parsed
            .messages
            .into_iter()
            .next()
            .map(|m| m.id)
            .ok_or_else(|| OfitecError::channel("provider response carried no message id"))?;

        debug!(provider_id = %id, "message accepted by provider");
        Ok(ProviderMessageId(id))
    }

    fn text_payload(&self, to_phone: &str, body: &str) -> serde_json::Value {
        json!({
            "messaging_product": "whatsapp",
            "to": to_phone,
            "type": "text",
            "text": { "body": body, "preview_url": false },
        })
    }

    /// Template sends carry the template name as the body; free
    /// parameters are not used by the engine's fixed templates.
    fn template_payload(&self, to_phone: &str, template_name: &str) -> serde_json::Value {
        json!({
            "messaging_product": "whatsapp",
            "to": to_phone,
            "type": "template",
            "template": {
                "name": template_name,
                "language": { "code": self.default_language },
            },
        })
    }
}

#[async_trait]
impl MessageChannel for WhatsAppClient {
    fn name(&self) -> &str {
        CHANNEL_NAME
    }

    async fn send(
        &self,
        to_phone: &str,
        body: &str,
        message_type: MessageType,
    ) -> Result<ProviderMessageId, OfitecError> {
        let payload = match message_type {
            MessageType::Template => self.template_payload(to_phone, body),
            _ => self.text_payload(to_phone, body),
        };
        self.post_message(payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> WhatsAppClient {
        WhatsAppClient::new(
            "test-token",
            "v18.0",
            "123456",
            "es",
            Some(&server.uri()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn text_send_returns_provider_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v18.0/123456/messages"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_partial_json(serde_json::json!({
                "messaging_product": "whatsapp",
                "to": "+56911111111",
                "type": "text",
                "text": { "body": "hola" },
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "messaging_product": "whatsapp",
                "messages": [{ "id": "wamid.HBgM" }],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server).await;
        let id = client
            .send("+56911111111", "hola", MessageType::Text)
            .await
            .unwrap();
        assert_eq!(id.0, "wamid.HBgM");
    }

    #[tokio::test]
    async fn template_send_uses_template_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "type": "template",
                "template": { "name": "recordatorio_accion", "language": { "code": "es" } },
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "messages": [{ "id": "wamid.tpl" }],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server).await;
        let id = client
            .send("+56911111111", "recordatorio_accion", MessageType::Template)
            .await
            .unwrap();
        assert_eq!(id.0, "wamid.tpl");
    }

    #[tokio::test]
    async fn provider_error_surfaces_as_channel_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": { "message": "Invalid OAuth access token" },
            })))
            .mount(&server)
            .await;

        let client = client(&server).await;
        let err = client
            .send("+56911111111", "hola", MessageType::Text)
            .await
            .unwrap_err();
        match err {
            OfitecError::Channel { message, .. } => {
                assert!(message.contains("Invalid OAuth access token"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_message_id_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "messages": [] })),
            )
            .mount(&server)
            .await;

        let client = client(&server).await;
        assert!(
            client
                .send("+56911111111", "hola", MessageType::Text)
                .await
                .is_err()
        );
    }
}
