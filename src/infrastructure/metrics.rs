//! Prometheus recorder for the cache counters and construction timings

use std::sync::Arc;

use metrics::gauge;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::MetricsConfig;

/// Handle to the installed Prometheus recorder
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Metrics in the Prometheus text exposition format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Install the global Prometheus recorder
///
/// Without a recorder every `counter!` and `histogram!` call is a no-op.
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::debug!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("embedding_cache_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!("Prometheus metrics initialized");

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use crate::infrastructure::lazy_cache::{LazyCacheConfig, LazyKeyedCache, ResourceFactory};
    use async_trait::async_trait;

    struct StaticFactory;

    #[async_trait]
    impl ResourceFactory<String, String> for StaticFactory {
        async fn create(&self, config: &String) -> Result<Arc<String>, DomainError> {
            Ok(Arc::new(config.clone()))
        }
    }

    #[test]
    fn test_disabled_installs_nothing() {
        assert!(init_metrics(&MetricsConfig { enabled: false }).is_none());
    }

    #[test]
    fn test_cache_activity_is_recorded() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async {
                let factory: Arc<dyn ResourceFactory<String, String>> = Arc::new(StaticFactory);
                let cache = LazyKeyedCache::with_config(factory, LazyCacheConfig::new("recorded"));
                let key = "k".to_string();
                let config = "v".to_string();

                cache.get(&key, &config).await.unwrap();
                cache.get(&key, &config).await.unwrap();
            });
        });

        let rendered = handle.render();
        assert!(rendered.contains("resource_cache_misses_total{cache=\"recorded\"} 1"));
        assert!(rendered.contains("resource_cache_hits_total{cache=\"recorded\"} 1"));
        assert!(rendered.contains("resource_cache_constructions_total{cache=\"recorded\"} 1"));
        assert!(rendered.contains("resource_cache_construction_duration_seconds"));
    }
}
