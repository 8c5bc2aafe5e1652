//! Outbound message emission.
//!
//! Components never talk to the bus client directly. They go through
//! [`Publisher`], which wraps every payload in the `{value: ...}` envelope
//! and picks the topic. All outbound messages are retained.

use crate::config::AdvertisedUrls;
use crate::error::Result;
use crate::message::Envelope;
use crate::topics::TopicRouter;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
    pub retain: bool,
}

/// Transport boundary for outbound messages.
///
/// `send` must not block: implementations queue the message and return.
pub trait BusSink: Send + Sync {
    fn send(&self, message: OutboundMessage) -> Result<()>;
}

#[derive(Clone)]
pub struct Publisher {
    sink: Arc<dyn BusSink>,
    topics: TopicRouter,
}

impl Publisher {
    pub fn new(sink: Arc<dyn BusSink>, topics: TopicRouter) -> Self {
        Self { sink, topics }
    }

    fn publish_retained<T: Serialize>(&self, topic: String, value: T) -> Result<()> {
        let payload = Envelope::new(value).to_bytes()?;
        tracing::trace!(topic = %topic, "Publishing retained");
        self.sink.send(OutboundMessage {
            topic,
            payload,
            retain: true,
        })
    }

    pub fn timer_seconds(&self, room: &str, seconds: u64) -> Result<()> {
        self.publish_retained(self.topics.timer_seconds(room), seconds)
    }

    pub fn client_media_cache_url(&self, uuid: &str, url: &str) -> Result<()> {
        self.publish_retained(self.topics.client_media_cache_url(uuid), url)
    }

    pub fn client_room_name(&self, uuid: &str, room: &str) -> Result<()> {
        self.publish_retained(self.topics.client_room_name(uuid), room)
    }

    /// Advertise the media cache, rooms and clients URLs to dashboards.
    ///
    /// Retained so a dashboard connecting later sees them without a new discovery.
    pub fn dashboard_urls(&self, urls: &AdvertisedUrls) -> Result<()> {
        self.publish_retained(self.topics.dashboard_media_cache_url(), &urls.media_cache)?;
        self.publish_retained(self.topics.dashboard_rooms_url(), &urls.rooms)?;
        self.publish_retained(self.topics.dashboard_clients_url(), &urls.clients)
    }
}
