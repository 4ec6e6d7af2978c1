// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the next-action engine.
//!
//! A single [`Database`] handle owns the connection; every read and
//! write goes through tokio-rusqlite's writer thread. Query functions
//! are grouped per table family under [`queries`], and the read-side
//! domain traits are implemented by [`queries::domain::SqliteDomainStores`].

pub mod database;
pub mod migrations;
pub mod queries;

pub use database::Database;
pub use queries::domain::SqliteDomainStores;
