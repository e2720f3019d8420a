//! Keyed lazy-initialization cache for expensive shared resources
//!
//! Resources are built on first use by a [`ResourceFactory`] and shared by
//! every caller afterwards. Lookups take a shared read on the resource map;
//! only a miss touches the per-key lock, so unrelated keys are constructed in
//! parallel while racing callers for the same key wait for a single build.

use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::{counter, histogram};
use tokio::sync::{Mutex, RwLock};

use crate::domain::DomainError;

/// Builds the resource for a key from its configuration
#[async_trait]
pub trait ResourceFactory<C, R: ?Sized>: Send + Sync {
    /// Construct a new resource. May be slow and may fail.
    async fn create(&self, config: &C) -> Result<Arc<R>, DomainError>;
}

/// Lifecycle of a single key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    /// Nothing built yet, or the last attempt failed
    Unbound,
    /// A caller currently holds the key's lock and is running the factory
    Constructing,
    /// Resource is stored; terminal
    Bound,
}

impl std::fmt::Display for KeyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyState::Unbound => write!(f, "unbound"),
            KeyState::Constructing => write!(f, "constructing"),
            KeyState::Bound => write!(f, "bound"),
        }
    }
}

/// Configuration for the lazy cache
#[derive(Debug, Clone)]
pub struct LazyCacheConfig {
    /// Name used in log events and metric labels
    pub name: String,
    /// Upper bound on waiting for another caller's construction
    pub lock_timeout: Option<Duration>,
}

impl Default for LazyCacheConfig {
    fn default() -> Self {
        Self {
            name: "resource".to_string(),
            lock_timeout: None,
        }
    }
}

impl LazyCacheConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = Some(timeout);
        self
    }
}

type KeyLock = Arc<Mutex<()>>;

/// Keyed cache that constructs each resource at most once
pub struct LazyKeyedCache<K, C, R: ?Sized> {
    resources: RwLock<HashMap<K, Arc<R>>>,
    /// Write side doubles as the guard for lock creation
    locks: RwLock<HashMap<K, KeyLock>>,
    factory: Arc<dyn ResourceFactory<C, R>>,
    config: LazyCacheConfig,
}

impl<K, C, R: ?Sized> Debug for LazyKeyedCache<K, C, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyKeyedCache")
            .field("name", &self.config.name)
            .field("lock_timeout", &self.config.lock_timeout)
            .finish()
    }
}

impl<K, C, R> LazyKeyedCache<K, C, R>
where
    K: Eq + Hash + Clone + Display + Send + Sync,
    C: Send + Sync,
    R: ?Sized + Send + Sync,
{
    /// Create an empty cache with default configuration
    pub fn new(factory: Arc<dyn ResourceFactory<C, R>>) -> Self {
        Self::with_config(factory, LazyCacheConfig::default())
    }

    /// Create an empty cache with the given configuration
    pub fn with_config(factory: Arc<dyn ResourceFactory<C, R>>, config: LazyCacheConfig) -> Self {
        Self {
            resources: RwLock::new(HashMap::new()),
            locks: RwLock::new(HashMap::new()),
            factory,
            config,
        }
    }

    /// Get the resource for `key`, building it from `config` on first use.
    ///
    /// `config` is only read when the key is not bound yet; once a resource
    /// exists it is returned regardless of the config passed.
    pub async fn get(&self, key: &K, config: &C) -> Result<Arc<R>, DomainError> {
        if let Some(resource) = self.lookup(key).await {
            counter!("resource_cache_hits_total", "cache" => self.config.name.clone()).increment(1);
            tracing::debug!(cache = %self.config.name, key = %key, "Resource cache hit");
            return Ok(resource);
        }

        counter!("resource_cache_misses_total", "cache" => self.config.name.clone()).increment(1);

        let lock = self.get_lock(key).await;
        let _guard = match self.config.lock_timeout {
            Some(timeout) => tokio::time::timeout(timeout, lock.lock())
                .await
                .map_err(|_| {
                    tracing::warn!(
                        cache = %self.config.name,
                        key = %key,
                        timeout_ms = timeout.as_millis() as u64,
                        "Timed out waiting for resource construction"
                    );
                    DomainError::lock_timeout(key.to_string(), timeout)
                })?,
            None => lock.lock().await,
        };

        // Another caller may have finished while we waited for the lock
        if let Some(resource) = self.lookup(key).await {
            tracing::debug!(
                cache = %self.config.name,
                key = %key,
                "Resource constructed by concurrent caller"
            );
            return Ok(resource);
        }

        self.construct(key, config).await
    }

    /// Return the resource for `key` if it has already been built
    pub async fn lookup(&self, key: &K) -> Option<Arc<R>> {
        self.resources.read().await.get(key).cloned()
    }

    /// Check whether `key` is bound
    pub async fn contains(&self, key: &K) -> bool {
        self.resources.read().await.contains_key(key)
    }

    /// Current lifecycle state of `key`
    pub async fn state(&self, key: &K) -> KeyState {
        if self.contains(key).await {
            return KeyState::Bound;
        }

        let lock = self.locks.read().await.get(key).cloned();

        match lock {
            Some(lock) if lock.try_lock().is_err() => KeyState::Constructing,
            _ => KeyState::Unbound,
        }
    }

    /// Keys with a stored resource
    pub async fn keys(&self) -> Vec<K> {
        self.resources.read().await.keys().cloned().collect()
    }

    /// Number of stored resources
    pub async fn len(&self) -> usize {
        self.resources.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.resources.read().await.is_empty()
    }

    /// Number of per-key locks ever created
    pub async fn lock_count(&self) -> usize {
        self.locks.read().await.len()
    }

    /// Get or create the lock for `key`; at most one lock ever exists per key
    async fn get_lock(&self, key: &K) -> KeyLock {
        if let Some(lock) = self.locks.read().await.get(key) {
            return lock.clone();
        }

        let mut locks = self.locks.write().await;
        locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Run the factory and bind the result. Caller must hold the key's lock.
    async fn construct(&self, key: &K, config: &C) -> Result<Arc<R>, DomainError> {
        let started = Instant::now();
        tracing::info!(cache = %self.config.name, key = %key, "Constructing resource");

        match self.factory.create(config).await {
            Ok(resource) => {
                let elapsed = started.elapsed();
                self.resources
                    .write()
                    .await
                    .insert(key.clone(), resource.clone());

                counter!("resource_cache_constructions_total", "cache" => self.config.name.clone())
                    .increment(1);
                histogram!(
                    "resource_cache_construction_duration_seconds",
                    "cache" => self.config.name.clone()
                )
                .record(elapsed.as_secs_f64());

                tracing::info!(
                    cache = %self.config.name,
                    key = %key,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Resource constructed"
                );

                Ok(resource)
            }
            Err(e) => {
                counter!(
                    "resource_cache_construction_failures_total",
                    "cache" => self.config.name.clone()
                )
                .increment(1);

                tracing::warn!(
                    cache = %self.config.name,
                    key = %key,
                    error = %e,
                    "Resource construction failed"
                );

                Err(DomainError::construction(key.to_string(), e))
            }
        }
    }
}
