//! Single dispatch point for inbound bus messages.
//!
//! Every failure while handling one message is logged and swallowed here, so
//! a bad payload or an unknown room never stops processing of later messages.

use crate::discovery::DiscoveryHandler;
use crate::error::Result;
use crate::log_error;
use crate::message::{parse_control, parse_discovery, parse_seconds};
use crate::store::RegistryStore;
use crate::timer::TimerEngine;
use crate::topics::{TopicEvent, TopicRouter};
use std::sync::Arc;
use tokio::task::JoinHandle;

pub struct Dispatcher<S> {
    router: TopicRouter,
    timers: Arc<TimerEngine>,
    discovery: Arc<DiscoveryHandler<S>>,
}

impl<S: RegistryStore> Dispatcher<S> {
    pub fn new(
        router: TopicRouter,
        timers: Arc<TimerEngine>,
        discovery: Arc<DiscoveryHandler<S>>,
    ) -> Self {
        Self {
            router,
            timers,
            discovery,
        }
    }

    /// Handle one inbound message.
    ///
    /// Timer commands have taken effect when this returns. Discovery runs on
    /// its own task so registry store latency does not hold up the next
    /// message; its handle is returned for callers that want to wait.
    pub async fn dispatch(&self, topic: &str, payload: &[u8]) -> Option<JoinHandle<()>> {
        match self.handle(topic, payload).await {
            Ok(task) => task,
            Err(e) => {
                log_error!(e, topic);
                None
            },
        }
    }

    async fn handle(&self, topic: &str, payload: &[u8]) -> Result<Option<JoinHandle<()>>> {
        let event = match self.router.route(topic) {
            Ok(event) => event,
            Err(reason) => {
                tracing::warn!(topic = %topic, reason = %reason, "Dropping message on unroutable topic");
                return Ok(None);
            },
        };

        match event {
            TopicEvent::DeviceDiscovery => {
                let request = parse_discovery(payload)?;
                let discovery = self.discovery.clone();
                let task = tokio::spawn(async move {
                    if let Err(e) = discovery.on_discovery(request).await {
                        log_error!(e, "device discovery");
                    }
                });
                Ok(Some(task))
            },
            TopicEvent::SetSeconds { room } => {
                let seconds = parse_seconds(payload)?;
                self.timers.set_seconds(&room, seconds).await?;
                Ok(None)
            },
            TopicEvent::Control { room } => {
                let action = parse_control(payload)?;
                tracing::debug!(room = %room, action = %action, "Timer control");
                self.timers.control(&room, action).await?;
                Ok(None)
            },
        }
    }
}
