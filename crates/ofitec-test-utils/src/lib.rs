// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for the OFITEC workspace.
//!
//! Provides a mock messaging channel and in-memory domain stores so
//! collector, dispatcher, and command tests run without a database or
//! network access.

pub mod mock_channel;
pub mod mock_stores;

pub use mock_channel::{MockChannel, SentMessage};
pub use mock_stores::{
    MockBudgetStore, MockIncidentStore, MockProjectStore, MockReportStore, MockRiskStore, budget,
    incident, project, report, risk,
};
