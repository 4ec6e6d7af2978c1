// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound reply handling: parse single-word commands, correlate them
//! to the notification they answer, and drive the action lifecycle.

pub mod parser;
pub mod processor;

pub use parser::{Command, parse};
pub use processor::{CommandOutcome, CommandProcessor};
