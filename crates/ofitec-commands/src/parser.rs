// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply command vocabulary.
//!
//! Field crews answer notifications with single words. Matching is
//! case-insensitive on the trimmed body; anything longer than a known
//! keyword is treated as free text and ignored.

use ofitec_core::types::ActionStatus;

/// A recognized reply command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// "ok", "entendido", "confirmado", "aceptar".
    Confirm,
    /// "completado", "terminado", "listo", "done".
    Complete,
    /// "cancelar", "cancel", "rechazar".
    Cancel,
}

impl Command {
    /// The lifecycle state this command drives the action into.
    pub fn target_status(self) -> ActionStatus {
        match self {
            Command::Confirm => ActionStatus::InProgress,
            Command::Complete => ActionStatus::Completed,
            Command::Cancel => ActionStatus::Cancelled,
        }
    }
}

/// Parse a reply body into a command, if it matches the vocabulary.
pub fn parse(body: &str) -> Option<Command> {
    match body.trim().to_lowercase().as_str() {
        "ok" | "entendido" | "confirmado" | "aceptar" => Some(Command::Confirm),
        "completado" | "terminado" | "listo" | "done" => Some(Command::Complete),
        "cancelar" | "cancel" | "rechazar" => Some(Command::Cancel),
        _ => None,
    }
}
