// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the WhatsApp webhook.
//!
//! Serves the subscription handshake, authenticates signed POST
//! bodies, and forwards inbound replies and delivery callbacks to the
//! command processor and message trail.

pub mod handlers;
pub mod server;

pub use server::{GatewayState, router, start_server};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{TimeZone, Utc};
    use tower::ServiceExt;

    use ofitec_commands::CommandProcessor;
    use ofitec_core::types::{
        ActionCategory, ActionDraft, ActionStatus, ActionType, DeliveryStatus, MessageType,
        Priority, ProviderMessageId, SourceRef,
    };
    use ofitec_storage::Database;
    use ofitec_storage::queries::{actions, channel_state, messages};
    use ofitec_test_utils::MockChannel;

    use super::*;

    struct Fixture {
        db: Database,
        state: GatewayState,
        action_id: i64,
    }

    /// Gateway over an in-memory database with one notified action.
    async fn fixture(app_secret: Option<&str>) -> Fixture {
        let db = Database::in_memory().await.unwrap();
        let channel = Arc::new(MockChannel::new());
        channel_state::ensure(&db, "mock-channel", 100).await.unwrap();

        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let draft = ActionDraft {
            title: "t".into(),
            description: "d".into(),
            action_type: ActionType::Urgent,
            priority: Priority::High,
            category: ActionCategory::Risk,
            source: SourceRef::for_project(1),
            confidence_score: 90.0,
            impact_score: 7.0,
            urgency_score: 8.0,
            recommended_actions: String::new(),
            expected_benefits: String::new(),
            required_resources: String::new(),
            suggested_date: now.date_naive(),
            deadline: None,
            engine: "Risk Analysis Engine v2.0".into(),
            assignee: None,
        };
        let action_id = actions::insert(&db, &draft, now).await.unwrap();
        let message_id = messages::insert_outbound(
            &db,
            Some(action_id),
            "+56911111111",
            "aviso",
            MessageType::Text,
            now,
        )
        .await
        .unwrap();
        messages::mark_sent(&db, message_id, &ProviderMessageId("wamid.out.1".into()), now)
            .await
            .unwrap();

        let state = GatewayState {
            db: db.clone(),
            processor: Arc::new(CommandProcessor::new(db.clone(), channel)),
            verify_token: Some("verify-me".into()),
            app_secret: app_secret.map(String::from),
        };
        Fixture {
            db,
            state,
            action_id,
        }
    }

    fn reply_payload(body_text: &str) -> String {
        serde_json::json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "changes": [{
                    "value": {
                        "messages": [{
                            "from": "56911111111",
                            "id": "wamid.in.1",
                            "timestamp": "1767972800",
                            "type": "text",
                            "text": { "body": body_text },
                            "context": { "id": "wamid.out.1" }
                        }]
                    },
                    "field": "messages"
                }]
            }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn handshake_echoes_challenge_for_valid_token() {
        let f = fixture(None).await;
        let response = router(f.state)
            .oneshot(
                Request::get(
                    "/webhook?hub.mode=subscribe&hub.verify_token=verify-me&hub.challenge=12345",
                )
                .body(Body::empty())
                .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"12345");
    }

    #[tokio::test]
    async fn handshake_rejects_bad_token() {
        let f = fixture(None).await;
        let response = router(f.state)
            .oneshot(
                Request::get("/webhook?hub.mode=subscribe&hub.verify_token=wrong&hub.challenge=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unsigned_post_is_unauthorized_when_secret_is_set() {
        let f = fixture(Some("app-secret")).await;
        let response = router(f.state)
            .oneshot(
                Request::post("/webhook")
                    .header("content-type", "application/json")
                    .body(Body::from(reply_payload("ok")))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn signed_reply_drives_the_action() {
        let f = fixture(Some("app-secret")).await;
        let payload = reply_payload("ok");
        let signature = ofitec_whatsapp::signature::sign("app-secret", payload.as_bytes());

        let response = router(f.state.clone())
            .oneshot(
                Request::post("/webhook")
                    .header("content-type", "application/json")
                    .header("x-hub-signature-256", signature)
                    .body(Body::from(payload))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let action = actions::get(&f.db, f.action_id).await.unwrap().unwrap();
        assert_eq!(action.status, ActionStatus::InProgress);
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let f = fixture(Some("app-secret")).await;
        let payload = "not json";
        let signature = ofitec_whatsapp::signature::sign("app-secret", payload.as_bytes());

        let response = router(f.state)
            .oneshot(
                Request::post("/webhook")
                    .header("x-hub-signature-256", signature)
                    .body(Body::from(payload))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn status_callback_updates_the_message_trail() {
        let f = fixture(None).await;
        let payload = serde_json::json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "changes": [{
                    "value": {
                        "statuses": [{
                            "id": "wamid.out.1",
                            "status": "read",
                            "timestamp": "1767973000",
                            "recipient_id": "56911111111"
                        }]
                    },
                    "field": "messages"
                }]
            }]
        })
        .to_string();

        let response = router(f.state)
            .oneshot(
                Request::post("/webhook")
                    .header("content-type", "application/json")
                    .body(Body::from(payload))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let message = messages::find_outbound_by_provider_id(
            &f.db,
            &ProviderMessageId("wamid.out.1".into()),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(message.status, DeliveryStatus::Read);
    }

    #[tokio::test]
    async fn free_text_reply_is_accepted_without_side_effects() {
        let f = fixture(None).await;
        let response = router(f.state.clone())
            .oneshot(
                Request::post("/webhook")
                    .header("content-type", "application/json")
                    .body(Body::from(reply_payload("voy en camino")))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let action = actions::get(&f.db, f.action_id).await.unwrap().unwrap();
        assert_eq!(action.status, ActionStatus::Pending);
    }
}
