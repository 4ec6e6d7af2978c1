// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ofitec serve` command implementation.
//!
//! Runs the webhook server and a periodic background cycle: purge and
//! regenerate actions, send reminders for unnotified urgent ones, and
//! retry failed deliveries.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info};

use ofitec_commands::CommandProcessor;
use ofitec_core::OfitecError;
use ofitec_core::types::ProjectScope;
use ofitec_gateway::GatewayState;
use ofitec_notify::retry_failed;

use crate::app::App;

/// Run the webhook server and the periodic sweep until shutdown.
pub async fn run_serve(app: App) -> Result<(), OfitecError> {
    let channel = app.channel()?;
    let dispatcher = Arc::new(app.dispatcher().await?);
    let engine = Arc::new(app.engine());

    let state = GatewayState {
        db: app.db.clone(),
        processor: Arc::new(CommandProcessor::new(app.db.clone(), channel.clone())),
        verify_token: app.config.whatsapp.verify_token.clone(),
        app_secret: app.config.whatsapp.app_secret.clone(),
    };

    let sweep_interval = Duration::from_secs(app.config.engine.sweep_interval_secs);
    let reminder_batch = app.config.engine.reminder_batch;
    let db = app.db.clone();

    let sweep = {
        let dispatcher = dispatcher.clone();
        let engine = engine.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let now = Utc::now();

                match engine.run_analysis(ProjectScope::All, now).await {
                    Ok(report) => info!(
                        purged = report.purged,
                        created = report.generation.created.len(),
                        skipped = report.generation.skipped,
                        "analysis cycle finished"
                    ),
                    Err(error) => error!(%error, "analysis cycle failed"),
                }

                match dispatcher.notify_pending(reminder_batch, now).await {
                    Ok(results) if !results.is_empty() => {
                        info!(actions = results.len(), "reminder sweep finished");
                    }
                    Ok(_) => {}
                    Err(error) => error!(%error, "reminder sweep failed"),
                }

                if let Err(error) = retry_failed(&db, &channel, reminder_batch, now).await {
                    error!(%error, "retry pass failed");
                }
            }
        })
    };

    let result = ofitec_gateway::start_server(&app.config.gateway.bind_address, state).await;
    sweep.abort();
    result
}
