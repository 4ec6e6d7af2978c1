// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the OFITEC next-action engine.
//!
//! Provides the domain types (actions, notification messages, priorities),
//! the shared error type, and the collaborator traits implemented by the
//! storage and channel crates.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::OfitecError;
pub use traits::{
    BudgetStore, IncidentStore, MessageChannel, ProjectStore, ReportStore, RiskStore,
};
pub use types::{
    Action, ActionCategory, ActionDraft, ActionStatus, ActionType, DeliveryStatus, Direction,
    MessageType, NotificationMessage, Priority, ProjectScope, ProviderMessageId, Recipient,
    Severity, SourceRef,
};
