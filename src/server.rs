//! Server bootstrap: wires the store, bus, timers and discovery together and
//! runs until the process is interrupted.

use crate::bus::BusSession;
use crate::config::ServerConfig;
use crate::discovery::DiscoveryHandler;
use crate::dispatch::Dispatcher;
use crate::publisher::Publisher;
use crate::store::{JsonFileStore, RegistryStore};
use crate::timer::TimerEngine;
use crate::topics::TopicRouter;
use anyhow::Context;
use std::sync::Arc;

pub struct SignageServer {
    config: ServerConfig,
}

impl SignageServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let config = self.config;
        let store = Arc::new(JsonFileStore::new(
            config.clients_file.clone(),
            config.rooms_file.clone(),
        ));

        // Timer rooms are fixed for the lifetime of the process
        let rooms = store
            .list_known_rooms()
            .await
            .with_context(|| format!("Failed to load rooms from {}", config.rooms_file.display()))?;

        let router = TopicRouter::new(&config.namespace);
        let session = BusSession::connect(&config, &router.subscriptions())
            .context("Failed to configure MQTT client")?;
        let publisher = Publisher::new(session.sink(), router.clone());

        let timers = Arc::new(TimerEngine::new(rooms, &publisher));
        let discovery = Arc::new(DiscoveryHandler::new(store, publisher, &config));
        let dispatcher = Dispatcher::new(router, timers.clone(), discovery);

        let room_names: Vec<&str> = timers.registry().rooms().collect();
        tracing::info!(
            namespace = %config.namespace,
            rooms = ?room_names,
            clients_file = %config.clients_file.display(),
            "Signage server starting"
        );

        tokio::select! {
            () = session.run(dispatcher) => {},
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for shutdown signal")?;
                tracing::info!("Shutdown requested, stopping");
            },
        }

        Ok(())
    }
}
