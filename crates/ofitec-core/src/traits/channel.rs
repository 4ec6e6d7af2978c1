// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel trait for outbound messaging providers (WhatsApp Business, etc.).

use async_trait::async_trait;

use crate::error::OfitecError;
use crate::types::{MessageType, ProviderMessageId};

/// Provider-agnostic send primitive used by the notification dispatcher.
///
/// A successful send returns the provider-assigned message id, which is
/// later correlated against delivery-status callbacks and inbound replies.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Short channel name used in logs and message records.
    fn name(&self) -> &str;

    /// Deliver one message to a normalized phone identity.
    async fn send(
        &self,
        to_phone: &str,
        body: &str,
        message_type: MessageType,
    ) -> Result<ProviderMessageId, OfitecError>;
}
