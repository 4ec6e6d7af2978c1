// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Phone identity normalization.
//!
//! The provider expects E.164-style handles. Normalization here is
//! deliberately minimal: trim and ensure a leading `+`. Digit
//! validation is the provider's job and its errors surface through the
//! send path.

/// Normalize a raw phone string, or `None` when it is blank.
pub fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('+') {
        Some(trimmed.to_string())
    } else {
        Some(format!("+{trimmed}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_plus_prefix_when_missing() {
        assert_eq!(normalize("56912345678").as_deref(), Some("+56912345678"));
        assert_eq!(normalize("+56912345678").as_deref(), Some("+56912345678"));
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(normalize("  56912345678 ").as_deref(), Some("+56912345678"));
    }

    #[test]
    fn blank_is_none() {
        assert!(normalize("").is_none());
        assert!(normalize("   ").is_none());
    }
}
