// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp Business Cloud API integration.
//!
//! [`WhatsAppClient`] implements the outbound
//! [`MessageChannel`](ofitec_core::traits::MessageChannel); [`webhook`]
//! holds the inbound payload types and [`signature`] the request
//! authentication, both consumed by the gateway.

pub mod client;
pub mod signature;
pub mod webhook;

pub use client::{CHANNEL_NAME, WhatsAppClient};
pub use webhook::WebhookPayload;
