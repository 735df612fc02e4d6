use super::{Backend, BackendError};
use crate::counters::{CounterKeys, Language};
use async_trait::async_trait;
use std::{collections::HashMap, time::Duration};
use tokio::{sync::Mutex, time::sleep};

pub const NAME: &str = "Demo Data";

/// Process-local stand-in for the remote store. Delays emulate network latency.
pub struct InMemoryBackend {
    data: Mutex<HashMap<String, u64>>,
    read_latency: Duration,
    write_latency: Duration,
}

impl InMemoryBackend {
    pub fn new(read_latency: Duration, write_latency: Duration) -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
            read_latency,
            write_latency,
        }
    }

    /// Seeds the fixed demo figures under the tracker's own keys.
    pub fn with_demo_data(
        keys: &CounterKeys,
        read_latency: Duration,
        write_latency: Duration,
    ) -> Self {
        let seed = [
            (keys.total_visits.clone(), 3500),
            (keys.today_visits.clone(), 85),
            (keys.discord_clicks.clone(), 120),
            (Language::Pt.key().to_string(), 450),
            (Language::En.key().to_string(), 300),
            (Language::Tr.key().to_string(), 150),
        ];
        Self {
            data: Mutex::new(seed.into_iter().collect()),
            read_latency,
            write_latency,
        }
    }

    pub async fn snapshot(&self) -> HashMap<String, u64> {
        self.data.lock().await.clone()
    }
}

#[async_trait]
impl Backend for InMemoryBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn get(&self, key: &str) -> Result<u64, BackendError> {
        sleep(self.read_latency).await;
        let data = self.data.lock().await;
        Ok(data.get(key).copied().unwrap_or_default())
    }

    async fn increment(&self, key: &str, amount: u64) -> Result<u64, BackendError> {
        sleep(self.write_latency).await;
        let mut data = self.data.lock().await;
        let entry = data.entry(key.to_string()).or_default();
        *entry = entry.saturating_add(amount);
        Ok(*entry)
    }
}
