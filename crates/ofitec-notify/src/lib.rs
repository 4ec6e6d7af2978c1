// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification dispatch for the next-action engine.
//!
//! The [`Dispatcher`] fans an action out to its recipients through a
//! [`MessageChannel`](ofitec_core::traits::MessageChannel), recording
//! every attempt in the message trail. [`retry`] re-sends failures,
//! [`delivery`] applies provider status callbacks, and [`render`] owns
//! the Spanish message copy.

pub mod delivery;
pub mod dispatcher;
pub mod phone;
pub mod render;
pub mod retry;

pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use retry::{RetryOutcome, retry_failed};
