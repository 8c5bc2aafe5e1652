//! Device discovery: onboarding messages for clients and dashboards.
//!
//! A client announcing itself gets the media cache URL, then its room name.
//! Unknown clients are registered in the default room with a generated name
//! through the store's atomic upsert, so concurrent announcements of the same
//! uuid agree on one record. Store failures fail open: the client is still
//! told to use the default room.

use crate::config::{AdvertisedUrls, ServerConfig};
use crate::error::{Result, SignageError};
use crate::log_discovery_operation;
use crate::log_error;
use crate::message::DiscoveryRequest;
use crate::publisher::Publisher;
use crate::store::{ClientRecord, RegistryStore, DEFAULT_ROOM};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub struct DiscoveryHandler<S> {
    store: Arc<S>,
    publisher: Publisher,
    urls: AdvertisedUrls,
    store_timeout: Duration,
}

impl<S: RegistryStore> DiscoveryHandler<S> {
    pub fn new(store: Arc<S>, publisher: Publisher, config: &ServerConfig) -> Self {
        Self {
            store,
            publisher,
            urls: config.advertised_urls(),
            store_timeout: config.store_timeout(),
        }
    }

    pub async fn on_discovery(&self, request: DiscoveryRequest) -> Result<()> {
        match request {
            DiscoveryRequest::Client { uuid } => self.onboard_client(&uuid).await,
            DiscoveryRequest::Dashboard => {
                tracing::info!("Dashboard discovered, advertising URLs");
                self.publisher.dashboard_urls(&self.urls)
            },
        }
    }

    async fn onboard_client(&self, uuid: &str) -> Result<()> {
        self.publisher
            .client_media_cache_url(uuid, &self.urls.media_cache)?;

        let room = match self.resolve(uuid).await {
            Ok(record) => record.room_name,
            Err(e) if e.is_store_failure() => {
                log_error!(e, "resolve client room, falling back to default");
                DEFAULT_ROOM.to_string()
            },
            Err(e) => return Err(e),
        };

        self.publisher.client_room_name(uuid, &room)
    }

    /// Existing complete record, or the one created for this uuid.
    async fn resolve(&self, uuid: &str) -> Result<ClientRecord> {
        if let Some(record) = self.bounded(self.store.get(uuid)).await? {
            log_discovery_operation!("known_client", uuid, record.client_name);
            return Ok(record);
        }

        let candidate = ClientRecord::placeholder(uuid);
        let stored = self
            .bounded(self.store.upsert_if_absent(candidate.clone()))
            .await?;

        if stored == candidate {
            log_discovery_operation!("registered_client", uuid, stored.client_name);
        } else {
            log_discovery_operation!("concurrent_registration", uuid, stored.client_name);
        }
        Ok(stored)
    }

    async fn bounded<T>(&self, operation: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.store_timeout, operation)
            .await
            .map_err(|_| SignageError::StoreTimeout(self.store_timeout))?
    }
}
