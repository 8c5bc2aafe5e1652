#[cfg(test)]
pub mod test_helpers {
    use crate::error::{Result, SignageError};
    use crate::publisher::{BusSink, OutboundMessage, Publisher};
    use crate::store::{ClientRecord, RegistryStore};
    use crate::topics::TopicRouter;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tracing::field::{Field, Visit};
    use tracing::subscriber::DefaultGuard;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    /// Bus sink that keeps every outbound message in memory
    #[derive(Default)]
    pub struct RecordingSink {
        messages: Mutex<Vec<OutboundMessage>>,
        fail: bool,
    }

    impl RecordingSink {
        pub fn failing() -> Self {
            Self {
                messages: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        pub fn messages(&self) -> Vec<OutboundMessage> {
            self.messages.lock().unwrap().clone()
        }

        /// Decoded `value` of each message sent to `topic`, in order
        pub fn values(&self, topic: &str) -> Vec<serde_json::Value> {
            self.messages()
                .into_iter()
                .filter(|m| m.topic == topic)
                .map(|m| {
                    let envelope: serde_json::Value = serde_json::from_slice(&m.payload).unwrap();
                    envelope["value"].clone()
                })
                .collect()
        }

        pub fn topics(&self) -> Vec<String> {
            self.messages().into_iter().map(|m| m.topic).collect()
        }
    }

    impl BusSink for RecordingSink {
        fn send(&self, message: OutboundMessage) -> Result<()> {
            if self.fail {
                return Err(SignageError::Bus("sink closed".into()));
            }
            self.messages.lock().unwrap().push(message);
            Ok(())
        }
    }

    pub fn recording_publisher() -> (Arc<RecordingSink>, Publisher) {
        let sink = Arc::new(RecordingSink::default());
        let publisher = Publisher::new(sink.clone(), TopicRouter::new("ar-signage"));
        (sink, publisher)
    }

    /// In-memory registry store with injectable latency and failures
    #[derive(Default)]
    pub struct MemoryStore {
        clients: tokio::sync::Mutex<BTreeMap<String, ClientRecord>>,
        rooms: Vec<String>,
        get_delay: Option<Duration>,
        fail_writes: bool,
        fail_reads: bool,
        pub creates: AtomicUsize,
    }

    impl MemoryStore {
        pub fn with_rooms(rooms: &[&str]) -> Self {
            Self {
                rooms: rooms.iter().map(|r| r.to_string()).collect(),
                ..Default::default()
            }
        }

        pub fn with_get_delay(mut self, delay: Duration) -> Self {
            self.get_delay = Some(delay);
            self
        }

        pub fn failing_writes(mut self) -> Self {
            self.fail_writes = true;
            self
        }

        pub fn failing_reads(mut self) -> Self {
            self.fail_reads = true;
            self
        }

        pub async fn insert(&self, record: ClientRecord) {
            self.clients
                .lock()
                .await
                .insert(record.uuid.clone(), record);
        }

        pub fn create_count(&self) -> usize {
            self.creates.load(Ordering::SeqCst)
        }
    }

    impl RegistryStore for MemoryStore {
        async fn get(&self, uuid: &str) -> Result<Option<ClientRecord>> {
            if let Some(delay) = self.get_delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_reads {
                return Err(SignageError::RegistryStore("read failed".into()));
            }
            Ok(self.clients.lock().await.get(uuid).cloned())
        }

        async fn upsert_if_absent(&self, record: ClientRecord) -> Result<ClientRecord> {
            if self.fail_writes {
                return Err(SignageError::RegistryStore("write failed".into()));
            }
            let mut clients = self.clients.lock().await;
            if let Some(existing) = clients.get(&record.uuid) {
                return Ok(existing.clone());
            }
            self.creates.fetch_add(1, Ordering::SeqCst);
            clients.insert(record.uuid.clone(), record.clone());
            Ok(record)
        }

        async fn list_known_rooms(&self) -> Result<Vec<String>> {
            Ok(self.rooms.clone())
        }

        async fn list(&self) -> Result<Vec<ClientRecord>> {
            Ok(self.clients.lock().await.values().cloned().collect())
        }
    }

    /// Fields of one captured log event, plus its `level`
    pub type CapturedEvent = BTreeMap<String, String>;

    /// Tracing layer that keeps every event on the current thread in memory
    #[derive(Clone, Default)]
    pub struct LogCapture {
        events: Arc<Mutex<Vec<CapturedEvent>>>,
    }

    impl LogCapture {
        /// Capture events until the guard is dropped
        pub fn install(&self) -> DefaultGuard {
            let subscriber = tracing_subscriber::registry().with(self.clone());
            tracing::subscriber::set_default(subscriber)
        }

        pub fn events(&self) -> Vec<CapturedEvent> {
            self.events.lock().unwrap().clone()
        }

        /// `code` field of each ERROR event, in order
        pub fn error_codes(&self) -> Vec<String> {
            self.events()
                .into_iter()
                .filter(|e| e.get("level").map(String::as_str) == Some("ERROR"))
                .filter_map(|mut e| e.remove("code"))
                .collect()
        }
    }

    struct FieldRecorder<'a>(&'a mut CapturedEvent);

    impl Visit for FieldRecorder<'_> {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.0.insert(field.name().to_string(), value.to_string());
        }

        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            self.0.insert(field.name().to_string(), format!("{:?}", value));
        }
    }

    impl<S: Subscriber> Layer<S> for LogCapture {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = CapturedEvent::new();
            let level: &Level = event.metadata().level();
            fields.insert("level".into(), level.to_string());
            event.record(&mut FieldRecorder(&mut fields));
            self.events.lock().unwrap().push(fields);
        }
    }
}
