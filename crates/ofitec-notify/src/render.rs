// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Spanish WhatsApp message copy.
//!
//! The wording here is user-facing contract shared with the field teams;
//! change it only together with them.

use ofitec_core::types::{Action, ActionStatus, Priority};

/// Emoji shown before the headline, by priority.
pub fn priority_emoji(priority: Priority) -> &'static str {
    match priority {
        Priority::Critical => "🚨",
        Priority::High => "⚡",
        Priority::Medium => "📋",
        Priority::Low => "📝",
    }
}

/// Spanish priority label.
pub fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::Critical => "CRÍTICA",
        Priority::High => "ALTA",
        Priority::Medium => "MEDIA",
        Priority::Low => "BAJA",
    }
}

/// Render the full action notification sent to each recipient.
///
/// `project_name` is `None` for general actions, rendered as "General".
pub fn action_notification(action: &Action, project_name: Option<&str>) -> String {
    let emoji = priority_emoji(action.priority);
    let project = project_name.unwrap_or("General");
    let description = if action.description.is_empty() {
        "Sin descripción"
    } else {
        &action.description
    };
    let deadline = action
        .deadline
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "Inmediata".to_string());
    let benefits = if action.expected_benefits.is_empty() {
        "No especificado"
    } else {
        &action.expected_benefits
    };

    format!(
        "{emoji} *ACCIÓN REQUERIDA - OFITEC*\n\
         \n\
         🏗️ *Proyecto:* {project}\n\
         \n\
         📋 *Acción:* {title}\n\
         \n\
         📝 *Descripción:* {description}\n\
         \n\
         🔥 *Prioridad:* {label}\n\
         \n\
         📅 *Fecha límite:* {deadline}\n\
         \n\
         💰 *Impacto estimado:* {benefits}\n\
         \n\
         *Responde con:*\n\
         ✅ *OK* - Confirmar que iniciarás la acción\n\
         🎉 *COMPLETADO* - Si ya está terminada\n\
         ❌ *CANCELAR* - Si no puedes realizarla\n\
         \n\
         ¡Gracias por tu atención inmediata! 🙏",
        title = action.title,
        label = priority_label(action.priority),
    )
}

/// Confirmation reply sent after an inbound command was applied.
pub fn command_confirmation(status: ActionStatus) -> Option<&'static str> {
    match status {
        ActionStatus::InProgress => Some("✅ Acción confirmada. Gracias por tu respuesta."),
        ActionStatus::Completed => Some("🎉 Acción completada exitosamente. ¡Excelente trabajo!"),
        ActionStatus::Cancelled => Some("❌ Acción cancelada. Si necesitas ayuda, avísanos."),
        ActionStatus::Pending => None,
    }
}
