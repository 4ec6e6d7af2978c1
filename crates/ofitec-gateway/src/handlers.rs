// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook request handlers.
//!
//! The provider expects a `200` once an event batch was accepted;
//! anything else makes it replay the batch. Per-message processing
//! errors are therefore logged and swallowed, while authentication
//! failures reject the whole request.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use tracing::{debug, info, warn};

use ofitec_notify::delivery;
use ofitec_whatsapp::signature::{self, SIGNATURE_HEADER};
use ofitec_whatsapp::webhook::WebhookPayload;

use crate::server::GatewayState;

/// GET /webhook: subscription handshake.
///
/// Echoes `hub.challenge` when the mode is `subscribe` and the verify
/// token matches; otherwise `403`.
pub async fn verify_webhook(
    State(state): State<GatewayState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mode = params.get("hub.mode").map(String::as_str);
    let token = params.get("hub.verify_token").map(String::as_str);
    let challenge = params.get("hub.challenge").cloned().unwrap_or_default();

    match (&state.verify_token, mode, token) {
        (Some(expected), Some("subscribe"), Some(token)) if token == expected => {
            info!("webhook subscription verified");
            (StatusCode::OK, challenge).into_response()
        }
        _ => {
            warn!(?mode, "webhook verification rejected");
            StatusCode::FORBIDDEN.into_response()
        }
    }
}

/// POST /webhook: inbound messages and delivery-status callbacks.
pub async fn receive_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(app_secret) = &state.app_secret {
        let header_value = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !signature::verify_signature(app_secret, &body, header_value) {
            warn!("webhook signature rejected");
            return StatusCode::UNAUTHORIZED.into_response();
        }
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(error) => {
            warn!(%error, "malformed webhook payload");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let now = Utc::now();
    for message in payload.inbound_messages() {
        let Some(text) = message.body() else {
            debug!(kind = %message.kind, "ignoring non-text inbound message");
            continue;
        };
        let provider_id = message.provider_id();
        let context_id = message.context_id();
        if let Err(error) = state
            .processor
            .handle_inbound(&message.from, text, &provider_id, context_id.as_ref(), now)
            .await
        {
            warn!(%error, provider_id = %provider_id.0, "inbound processing failed");
        }
    }

    for status in payload.status_updates() {
        let provider_id = ofitec_core::types::ProviderMessageId(status.id.clone());
        if let Err(error) =
            delivery::record_status_callback(&state.db, &provider_id, &status.status, now).await
        {
            warn!(%error, provider_id = %status.id, "status callback failed");
        }
    }

    (StatusCode::OK, "EVENT_RECEIVED").into_response()
}
