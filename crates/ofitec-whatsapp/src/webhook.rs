// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cloud API webhook payload types.
//!
//! Deserialization is permissive: the provider adds fields over time
//! and each change batch may carry messages, statuses, or neither.

use serde::Deserialize;

use ofitec_core::types::ProviderMessageId;

/// Top-level webhook body for `object = "whatsapp_business_account"`.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Change {
    pub value: ChangeValue,
    #[serde(default)]
    pub field: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub messages: Vec<InboundMessage>,
    #[serde(default)]
    pub statuses: Vec<StatusUpdate>,
}

/// One user message delivered to the business number.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    pub from: String,
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub text: Option<TextBody>,
    /// Present when the user replied to a specific message.
    pub context: Option<Context>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextBody {
    pub body: String,
}

/// Reply context quoting an earlier message.
#[derive(Debug, Clone, Deserialize)]
pub struct Context {
    pub id: Option<String>,
}

/// Delivery-status callback for an outbound message.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub id: String,
    pub status: String,
}

impl WebhookPayload {
    /// All inbound messages across every entry and change.
    pub fn inbound_messages(&self) -> impl Iterator<Item = &InboundMessage> {
        self.entry
            .iter()
            .flat_map(|e| &e.changes)
            .flat_map(|c| &c.value.messages)
    }

    /// All status updates across every entry and change.
    pub fn status_updates(&self) -> impl Iterator<Item = &StatusUpdate> {
        self.entry
            .iter()
            .flat_map(|e| &e.changes)
            .flat_map(|c| &c.value.statuses)
    }
}

impl InboundMessage {
    pub fn provider_id(&self) -> ProviderMessageId {
        ProviderMessageId(self.id.clone())
    }

    /// Provider id of the message this one replies to, if any.
    pub fn context_id(&self) -> Option<ProviderMessageId> {
        self.context
            .as_ref()
            .and_then(|c| c.id.clone())
            .map(ProviderMessageId)
    }

    /// Text body for `type = "text"` messages.
    pub fn body(&self) -> Option<&str> {
        self.text.as_ref().map(|t| t.body.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_inbound_reply_with_context() {
        let raw = r#"{
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "102",
                "changes": [{
                    "value": {
                        "messaging_product": "whatsapp",
                        "metadata": { "display_phone_number": "560000", "phone_number_id": "123" },
                        "contacts": [{ "profile": { "name": "Ana" }, "wa_id": "56911111111" }],
                        "messages": [{
                            "from": "56911111111",
                            "id": "wamid.in.1",
                            "timestamp": "1767972800",
                            "text": { "body": "ok" },
                            "type": "text",
                            "context": { "from": "560000", "id": "wamid.out.1" }
                        }]
                    },
                    "field": "messages"
                }]
            }]
        }"#;

        let payload: WebhookPayload = serde_json::from_str(raw).unwrap();
        assert_eq!(payload.object, "whatsapp_business_account");

        let messages: Vec<_> = payload.inbound_messages().collect();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].from, "56911111111");
        assert_eq!(messages[0].body(), Some("ok"));
        assert_eq!(messages[0].provider_id().0, "wamid.in.1");
        assert_eq!(messages[0].context_id().unwrap().0, "wamid.out.1");
        assert_eq!(payload.status_updates().count(), 0);
    }

    #[test]
    fn parses_status_callbacks() {
        let raw = r#"{
            "object": "whatsapp_business_account",
            "entry": [{
                "changes": [{
                    "value": {
                        "statuses": [
                            { "id": "wamid.out.1", "status": "delivered",
                              "timestamp": "1767972900", "recipient_id": "56911111111" },
                            { "id": "wamid.out.1", "status": "read",
                              "timestamp": "1767973000", "recipient_id": "56911111111" }
                        ]
                    },
                    "field": "messages"
                }]
            }]
        }"#;

        let payload: WebhookPayload = serde_json::from_str(raw).unwrap();
        let statuses: Vec<_> = payload.status_updates().collect();
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].status, "delivered");
        assert_eq!(statuses[1].status, "read");
    }

    #[test]
    fn non_text_message_without_context_parses() {
        let raw = r#"{
            "object": "whatsapp_business_account",
            "entry": [{
                "changes": [{
                    "value": {
                        "messages": [{
                            "from": "56911111111",
                            "id": "wamid.in.2",
                            "timestamp": "1767972800",
                            "type": "image",
                            "image": { "id": "media-1", "mime_type": "image/jpeg" }
                        }]
                    },
                    "field": "messages"
                }]
            }]
        }"#;

        let payload: WebhookPayload = serde_json::from_str(raw).unwrap();
        let messages: Vec<_> = payload.inbound_messages().collect();
        assert_eq!(messages[0].kind, "image");
        assert!(messages[0].body().is_none());
        assert!(messages[0].context_id().is_none());
    }

    #[test]
    fn empty_payload_is_fine() {
        let payload: WebhookPayload = serde_json::from_str(r#"{"object":"x","entry":[]}"#).unwrap();
        assert_eq!(payload.inbound_messages().count(), 0);
    }
}
