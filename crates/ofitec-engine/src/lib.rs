// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Next-action engine: aggregation, lifecycle, and summaries.
//!
//! The [`ActionEngine`] drives the collectors and persists their drafts;
//! [`transitions`] applies lifecycle moves triggered by inbound commands
//! or operators; [`dashboard`] assembles the status summary.

pub mod aggregator;
pub mod dashboard;
pub mod transitions;

pub use aggregator::{ActionEngine, AnalysisReport, EngineSettings, GenerationReport};
pub use dashboard::{DashboardSummary, summary};
