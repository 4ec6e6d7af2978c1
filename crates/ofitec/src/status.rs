// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ofitec status` command implementation.

use chrono::Utc;

use ofitec_core::OfitecError;
use ofitec_engine::DashboardSummary;

use crate::app::App;

fn render_text(summary: &DashboardSummary) -> String {
    let mut out = String::new();
    out.push_str("Acciones\n");
    out.push_str(&format!("  pendientes:        {}\n", summary.counts.pending));
    out.push_str(&format!(
        "  en progreso:       {}\n",
        summary.counts.in_progress
    ));
    out.push_str(&format!(
        "  completadas hoy:   {}\n",
        summary.counts.completed_today
    ));
    out.push_str(&format!(
        "  críticas (P1):     {}\n",
        summary.counts.critical_pending
    ));
    out.push_str(&format!(
        "  altas (P2):        {}\n",
        summary.counts.high_pending
    ));

    out.push_str("Mensajes de hoy\n");
    out.push_str(&format!("  enviados:          {}\n", summary.traffic.sent));
    out.push_str(&format!("  recibidos:         {}\n", summary.traffic.received));

    if summary.urgent.is_empty() {
        out.push_str("Sin acciones urgentes pendientes\n");
    } else {
        out.push_str("Acciones urgentes\n");
        for action in &summary.urgent {
            out.push_str(&format!(
                "  [P{}] #{} {} (sugerida {})\n",
                action.priority.rank(),
                action.id,
                action.title,
                action.suggested_date.format("%d/%m/%Y"),
            ));
        }
    }
    out
}

fn render_json(summary: &DashboardSummary) -> serde_json::Value {
    serde_json::json!({
        "actions": {
            "pending": summary.counts.pending,
            "in_progress": summary.counts.in_progress,
            "completed_today": summary.counts.completed_today,
            "critical_pending": summary.counts.critical_pending,
            "high_pending": summary.counts.high_pending,
        },
        "messages_today": {
            "sent": summary.traffic.sent,
            "received": summary.traffic.received,
        },
        "urgent": summary.urgent,
    })
}

/// Run the `ofitec status` command.
pub async fn run_status(app: &App, json: bool) -> Result<(), OfitecError> {
    let summary = ofitec_engine::summary(&app.db, Utc::now()).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&render_json(&summary))
            .map_err(|e| OfitecError::Internal(format!("status serialization: {e}")))?);
    } else {
        print!("{}", render_text(&summary));
    }
    Ok(())
}
