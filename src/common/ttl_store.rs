// src/common/ttl_store.rs
//
// Armazenamento chave-valor em memória com expiração por entrada.
// O relógio é injetado para que a política de expiração seja testável.

use std::{collections::HashMap, hash::Hash, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct TtlStore<K, V> {
    entries: Arc<Mutex<HashMap<K, Entry<V>>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlStore<K, V>
where
    K: Eq + Hash + Send,
    V: Clone + Send,
{
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sobrescreve qualquer valor anterior (last-write-wins).
    pub async fn insert(&self, key: K, value: V) {
        let expires_at = self.clock.now() + self.ttl;
        let mut entries = self.entries.lock().await;
        entries.insert(key, Entry { value, expires_at });
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Leitura de uso único: a entrada sai do mapa mesmo se já tiver expirado.
    pub async fn take(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        entries
            .remove(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value)
    }

    pub async fn remove(&self, key: &K) {
        self.entries.lock().await.remove(key);
    }

    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }
}


#[cfg(test)]
mod tests {
    use super::test_clock::ManualClock;
    use super::*;

    fn store(clock: &Arc<ManualClock>) -> TtlStore<String, u32> {
        TtlStore::with_clock(Duration::minutes(5), clock.clone())
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let clock = Arc::new(ManualClock::new());
        let store = store(&clock);
        store.insert("k".into(), 1).await;

        clock.advance(Duration::minutes(4));
        assert_eq!(store.get(&"k".to_string()).await, Some(1));

        clock.advance(Duration::minutes(2));
        assert_eq!(store.get(&"k".to_string()).await, None);
        assert_eq!(store.purge_expired().await, 0);
    }

    #[tokio::test]
    async fn insert_overwrites_and_resets_expiry() {
        let clock = Arc::new(ManualClock::new());
        let store = store(&clock);
        store.insert("k".into(), 1).await;
        clock.advance(Duration::minutes(4));
        store.insert("k".into(), 2).await;
        clock.advance(Duration::minutes(4));

        assert_eq!(store.get(&"k".to_string()).await, Some(2));
    }

    #[tokio::test]
    async fn take_is_single_use() {
        let clock = Arc::new(ManualClock::new());
        let store = store(&clock);
        store.insert("session".into(), 7).await;

        assert_eq!(store.take(&"session".to_string()).await, Some(7));
        assert_eq!(store.take(&"session".to_string()).await, None);
    }

    #[tokio::test]
    async fn take_of_expired_entry_returns_none() {
        let clock = Arc::new(ManualClock::new());
        let store = store(&clock);
        store.insert("session".into(), 7).await;
        clock.advance(Duration::minutes(6));

        assert_eq!(store.take(&"session".to_string()).await, None);
    }

    #[tokio::test]
    async fn purge_removes_only_expired() {
        let clock = Arc::new(ManualClock::new());
        let store = store(&clock);
        store.insert("old".into(), 1).await;
        clock.advance(Duration::minutes(3));
        store.insert("new".into(), 2).await;
        clock.advance(Duration::minutes(3));

        assert_eq!(store.purge_expired().await, 1);
        assert_eq!(store.get(&"new".to_string()).await, Some(2));
    }
}
