// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock messaging channel for deterministic testing.
//!
//! `MockChannel` implements `MessageChannel`, capturing outbound messages
//! for assertion and failing on demand per phone or globally.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use ofitec_core::traits::MessageChannel;
use ofitec_core::types::{MessageType, ProviderMessageId};
use ofitec_core::OfitecError;

/// One captured outbound send.
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub to_phone: String,
    pub body: String,
    pub message_type: MessageType,
}

/// A mock messaging channel for testing.
///
/// Captures every `send()` call; sends can be made to fail for specific
/// phone numbers or across the board.
pub struct MockChannel {
    sent: Mutex<Vec<SentMessage>>,
    failing_phones: Mutex<HashSet<String>>,
    fail_all: AtomicBool,
}

impl MockChannel {
    /// Create a mock channel where every send succeeds.
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing_phones: Mutex::new(HashSet::new()),
            fail_all: AtomicBool::new(false),
        }
    }

    /// Make sends to the given phone fail with a channel error.
    pub async fn fail_phone(&self, phone: impl Into<String>) {
        self.failing_phones.lock().await.insert(phone.into());
    }

    /// Make every send fail until cleared.
    pub fn fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    /// All messages captured so far.
    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    /// Number of captured messages.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Drop all captured messages.
    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageChannel for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    async fn send(
        &self,
        to_phone: &str,
        body: &str,
        message_type: MessageType,
    ) -> Result<ProviderMessageId, OfitecError> {
        if self.fail_all.load(Ordering::SeqCst)
            || self.failing_phones.lock().await.contains(to_phone)
        {
            return Err(OfitecError::channel(format!(
                "mock delivery failure for {to_phone}"
            )));
        }

        self.sent.lock().await.push(SentMessage {
            to_phone: to_phone.to_string(),
            body: body.to_string(),
            message_type,
        });
        Ok(ProviderMessageId(format!("mock-{}", uuid::Uuid::new_v4())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_captures_outbound_messages() {
        let channel = MockChannel::new();
        let id = channel
            .send("+56911111111", "hola", MessageType::Text)
            .await
            .unwrap();
        assert!(id.0.starts_with("mock-"));

        let sent = channel.sent_messages().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to_phone, "+56911111111");
        assert_eq!(sent[0].body, "hola");
    }

    #[tokio::test]
    async fn failing_phone_rejects_only_that_phone() {
        let channel = MockChannel::new();
        channel.fail_phone("+56900000000").await;

        assert!(
            channel
                .send("+56900000000", "x", MessageType::Text)
                .await
                .is_err()
        );
        assert!(
            channel
                .send("+56911111111", "x", MessageType::Text)
                .await
                .is_ok()
        );
        assert_eq!(channel.sent_count().await, 1);
    }

    #[tokio::test]
    async fn fail_all_rejects_everything() {
        let channel = MockChannel::new();
        channel.fail_all(true);
        assert!(channel.send("+1", "x", MessageType::Text).await.is_err());

        channel.fail_all(false);
        assert!(channel.send("+1", "x", MessageType::Text).await.is_ok());
    }
}
