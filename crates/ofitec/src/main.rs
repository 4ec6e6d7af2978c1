// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OFITEC next-best-action engine command line.

mod app;
mod serve;
mod status;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;

use ofitec_core::OfitecError;
use ofitec_core::types::ProjectScope;

use crate::app::App;

/// OFITEC - recommendation engine for construction project management.
#[derive(Parser, Debug)]
#[command(name = "ofitec", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one analysis cycle: purge stale actions, then generate new ones.
    Generate {
        /// Restrict the analysis to one project.
        #[arg(long)]
        project: Option<i64>,
    },
    /// Send notifications: one action by id, or all pending urgent ones.
    Notify {
        /// Action id to notify; omit to sweep pending actions.
        #[arg(long)]
        action: Option<i64>,
    },
    /// Re-send failed outbound messages still under the retry bound.
    Retry,
    /// Delete completed and cancelled actions past the retention window.
    Purge,
    /// Show action counts, urgent actions, and today's message traffic.
    Status {
        /// Output machine-readable JSON.
        #[arg(long)]
        json: bool,
    },
    /// Run the webhook server and periodic analysis sweep.
    Serve,
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ofitec={log_level},warn")));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(cli: Cli, app: App) -> Result<(), OfitecError> {
    match cli.command {
        Commands::Generate { project } => {
            let scope = project.map_or(ProjectScope::All, ProjectScope::Project);
            let report = app.engine().run_analysis(scope, Utc::now()).await?;
            println!(
                "purged {} stale, created {} actions, skipped {} duplicates",
                report.purged,
                report.generation.created.len(),
                report.generation.skipped
            );
        }
        Commands::Notify { action } => {
            let dispatcher = app.dispatcher().await?;
            match action {
                Some(id) => {
                    let outcome = dispatcher.notify_action(id, Utc::now()).await?;
                    println!(
                        "action {id}: {} delivered, {} failed",
                        outcome.delivered, outcome.failed
                    );
                }
                None => {
                    let results = dispatcher
                        .notify_pending(app.config.engine.reminder_batch, Utc::now())
                        .await?;
                    println!("notified {} pending actions", results.len());
                }
            }
        }
        Commands::Retry => {
            let channel = app.channel()?;
            let outcome = ofitec_notify::retry_failed(
                &app.db,
                &channel,
                app.config.engine.reminder_batch,
                Utc::now(),
            )
            .await?;
            println!(
                "retried {} messages, {} delivered",
                outcome.attempted, outcome.delivered
            );
        }
        Commands::Purge => {
            let purged = app.engine().purge_stale(Utc::now()).await?;
            println!("purged {purged} stale actions");
        }
        Commands::Status { json } => {
            status::run_status(&app, json).await?;
        }
        Commands::Serve => {
            info!("starting webhook server");
            serve::run_serve(app).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ofitec_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            ofitec_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.agent.log_level);

    let app = match App::init(config).await {
        Ok(app) => app,
        Err(error) => {
            eprintln!("ofitec: {error}");
            std::process::exit(1);
        }
    };

    if let Err(error) = run(cli, app).await {
        eprintln!("ofitec: {error}");
        std::process::exit(1);
    }
}
