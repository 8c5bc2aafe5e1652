//! MQTT session: subscriptions, inbound pump and outbound sink.
//!
//! Reconnection is rumqttc's: polling the event loop after an error
//! reconnects. Subscriptions are re-issued on every ConnAck so a broker
//! restart does not leave the server deaf. A subscribe request that does not
//! fit in the request channel (full of publishes queued during an outage)
//! stays pending and is retried after each later event.

use crate::config::ServerConfig;
use crate::dispatch::Dispatcher;
use crate::error::{Result, SignageError};
use crate::publisher::{BusSink, OutboundMessage};
use crate::store::RegistryStore;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

const REQUEST_CAPACITY: usize = 256;
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Outbound half: queues publishes on the rumqttc request channel
pub struct MqttSink {
    client: AsyncClient,
}

impl BusSink for MqttSink {
    fn send(&self, message: OutboundMessage) -> Result<()> {
        self.client
            .try_publish(
                message.topic,
                QoS::AtLeastOnce,
                message.retain,
                message.payload,
            )
            .map_err(|e| SignageError::Bus(e.to_string()))
    }
}

pub struct BusSession {
    client: AsyncClient,
    eventloop: EventLoop,
    subscriptions: Vec<String>,
    /// Subscriptions not yet accepted by the request channel, in order
    pending: VecDeque<String>,
}

impl BusSession {
    /// Build the client. No I/O happens until [`BusSession::run`] polls.
    pub fn connect(config: &ServerConfig, subscriptions: &[String]) -> Result<Self> {
        let broker = config.broker()?;
        let client_id = config.client_id();

        let mut options = MqttOptions::new(client_id.clone(), broker.host.clone(), broker.port);
        options.set_keep_alive(config.keep_alive());
        options.set_clean_session(true);

        let (client, eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);

        tracing::info!(
            broker = %format!("{}:{}", broker.host, broker.port),
            client_id = %client_id,
            "MQTT client configured"
        );

        Ok(Self {
            client,
            eventloop,
            subscriptions: subscriptions.to_vec(),
            pending: VecDeque::new(),
        })
    }

    pub fn sink(&self) -> Arc<MqttSink> {
        Arc::new(MqttSink {
            client: self.client.clone(),
        })
    }

    /// Pump inbound messages into the dispatcher until the task is cancelled.
    ///
    /// Never returns: connection errors are retried and per-message failures
    /// are handled by the dispatcher.
    pub async fn run<S: RegistryStore>(mut self, dispatcher: Dispatcher<S>) {
        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    tracing::info!("Connected to MQTT broker, subscribing to topics");
                    self.on_connected();
                    continue;
                },
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    tracing::debug!(
                        topic = %publish.topic,
                        bytes = publish.payload.len(),
                        "Inbound message"
                    );
                    dispatcher.dispatch(&publish.topic, &publish.payload).await;
                },
                Ok(Event::Incoming(Packet::SubAck(ack))) => {
                    tracing::debug!(pkid = ack.pkid, "Subscription acknowledged");
                },
                Ok(_) => {},
                Err(e) => {
                    tracing::error!(error = %e, "MQTT connection error, retrying");
                    // The next ConnAck re-issues every subscription
                    self.pending.clear();
                    tokio::time::sleep(RECONNECT_DELAY).await;
                    continue;
                },
            }

            if !self.pending.is_empty() {
                self.flush_pending();
            }
        }
    }

    fn on_connected(&mut self) {
        self.pending = self.subscriptions.iter().cloned().collect();
        self.flush_pending();
        if !self.pending.is_empty() {
            tracing::warn!(
                pending = self.pending.len(),
                "Request channel full, subscriptions deferred"
            );
        }
    }

    fn flush_pending(&mut self) {
        let client = &self.client;
        flush_subscriptions(&mut self.pending, |topic| {
            client
                .try_subscribe(topic, QoS::AtLeastOnce)
                .map_err(|e| SignageError::Bus(format!("subscribe {}: {}", topic, e)))
        });
    }
}

/// Issue pending subscriptions in order, stopping at the first refusal.
fn flush_subscriptions<F>(pending: &mut VecDeque<String>, mut subscribe: F)
where
    F: FnMut(&str) -> Result<()>,
{
    while let Some(topic) = pending.front() {
        match subscribe(topic) {
            Ok(()) => {
                tracing::info!(topic = %topic, "Subscribed");
                pending.pop_front();
            },
            Err(e) => {
                tracing::debug!(error = %e, "Subscribe request deferred");
                break;
            },
        }
    }
}
