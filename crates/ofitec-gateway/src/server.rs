// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook HTTP server built on axum.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use ofitec_commands::CommandProcessor;
use ofitec_core::OfitecError;
use ofitec_storage::Database;

use crate::handlers;

/// Shared state for the webhook handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub db: Database,
    pub processor: Arc<CommandProcessor>,
    /// Token echoed back during the subscription handshake. `None`
    /// rejects every handshake.
    pub verify_token: Option<String>,
    /// App secret for body signatures. `None` disables the check,
    /// for local development only.
    pub app_secret: Option<String>,
}

/// Build the webhook router.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/webhook", get(handlers::verify_webhook))
        .route("/webhook", post(handlers::receive_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn start_server(bind_address: &str, state: GatewayState) -> Result<(), OfitecError> {
    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .map_err(|e| OfitecError::Channel {
            message: format!("failed to bind gateway to {bind_address}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("webhook server listening on {bind_address}");

    axum::serve(listener, router(state))
        .await
        .map_err(|e| OfitecError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
