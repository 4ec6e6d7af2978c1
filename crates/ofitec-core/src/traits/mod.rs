// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits consumed by the engine, collectors, and dispatcher.

pub mod channel;
pub mod stores;

pub use channel::MessageChannel;
pub use stores::{
    BudgetRecord, BudgetStore, IncidentRecord, IncidentState, IncidentStore, IncidentType,
    ProjectRecord, ProjectStore, ReportRecord, ReportState, ReportStore, RiskRecord, RiskStatus,
    RiskStore,
};
