// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared wiring for the subcommands.

use std::sync::Arc;

use ofitec_collectors::{
    CommunicationCollector, FinancialCollector, IncidentCollector, ProgressCollector,
    RiskCollector, SignalCollector,
};
use ofitec_config::OfitecConfig;
use ofitec_core::OfitecError;
use ofitec_core::traits::MessageChannel;
use ofitec_engine::{ActionEngine, EngineSettings};
use ofitec_notify::Dispatcher;
use ofitec_storage::{Database, SqliteDomainStores};
use ofitec_whatsapp::WhatsAppClient;

/// Opened database plus the collaborators every command needs.
pub struct App {
    pub config: OfitecConfig,
    pub db: Database,
    pub stores: Arc<SqliteDomainStores>,
    channel: Option<Arc<dyn MessageChannel>>,
}

impl App {
    /// Open the database and build the channel if WhatsApp is enabled.
    pub async fn init(config: OfitecConfig) -> Result<Self, OfitecError> {
        let db = Database::open(&config.storage.database_path).await?;
        let stores = Arc::new(SqliteDomainStores::new(db.clone()));

        let channel: Option<Arc<dyn MessageChannel>> = if config.whatsapp.enabled {
            let client = WhatsAppClient::new(
                &config.whatsapp.access_token,
                &config.whatsapp.api_version,
                &config.whatsapp.phone_number_id,
                &config.whatsapp.default_language,
                config.whatsapp.base_url.as_deref(),
            )?;
            Some(Arc::new(client))
        } else {
            None
        };

        Ok(Self {
            config,
            db,
            stores,
            channel,
        })
    }

    /// The five collectors wired to the SQLite domain stores.
    pub fn collectors(&self) -> Vec<Arc<dyn SignalCollector>> {
        vec![
            Arc::new(RiskCollector::new(self.stores.clone())),
            Arc::new(FinancialCollector::new(
                self.stores.clone(),
                self.stores.clone(),
            )),
            Arc::new(IncidentCollector::new(self.stores.clone())),
            Arc::new(ProgressCollector::new(
                self.stores.clone(),
                self.stores.clone(),
            )),
            Arc::new(CommunicationCollector::new(self.stores.clone())),
        ]
    }

    pub fn engine(&self) -> ActionEngine {
        ActionEngine::new(
            self.db.clone(),
            self.collectors(),
            EngineSettings {
                dedupe_pending: self.config.engine.dedupe_pending,
                retention_days: self.config.engine.retention_days,
            },
        )
    }

    /// The outbound channel, or a config error pointing at the fix.
    pub fn channel(&self) -> Result<Arc<dyn MessageChannel>, OfitecError> {
        self.channel.clone().ok_or_else(|| {
            OfitecError::Config(
                "no messaging channel configured; set [whatsapp] enabled = true".into(),
            )
        })
    }

    /// A dispatcher over the configured channel, with its rate-limiter
    /// row synced to the configured limit.
    pub async fn dispatcher(&self) -> Result<Dispatcher, OfitecError> {
        if !self.config.notify.enabled {
            return Err(OfitecError::Config(
                "notifications are disabled; set [notify] enabled = true".into(),
            ));
        }
        let dispatcher = Dispatcher::new(self.db.clone(), self.channel()?, self.stores.clone());
        dispatcher
            .register_channel(self.config.notify.rate_limit)
            .await?;
        Ok(dispatcher)
    }
}
