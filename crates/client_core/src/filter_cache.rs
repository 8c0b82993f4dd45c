use std::sync::Arc;

use shared::domain::FilterVocabulary;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::gateway::{Gateway, GatewayError};

/// Lazily loaded, read-only filter vocabulary with an explicit refresh.
#[derive(Default)]
pub struct FilterCache {
    loaded: Mutex<Option<Arc<FilterVocabulary>>>,
}

impl FilterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached vocabulary, loading it on first use. A failed load is logged and
    /// yields an empty vocabulary that is not cached.
    pub async fn get_or_load(&self, gateway: &dyn Gateway) -> Arc<FilterVocabulary> {
        let mut guard = self.loaded.lock().await;
        if let Some(vocabulary) = guard.as_ref() {
            return Arc::clone(vocabulary);
        }

        match gateway.fetch_filters().await {
            Ok(vocabulary) => {
                let vocabulary = Arc::new(vocabulary);
                info!(
                    states = vocabulary.states().count(),
                    "filter vocabulary loaded"
                );
                *guard = Some(Arc::clone(&vocabulary));
                vocabulary
            }
            Err(err) => {
                warn!("failed to load filter vocabulary: {err}");
                Arc::new(FilterVocabulary::default())
            }
        }
    }

    /// Reloads from the gateway. The previous vocabulary stays cached on failure.
    pub async fn refresh(&self, gateway: &dyn Gateway) -> Result<Arc<FilterVocabulary>, GatewayError> {
        let mut guard = self.loaded.lock().await;
        let vocabulary = Arc::new(gateway.fetch_filters().await?);
        *guard = Some(Arc::clone(&vocabulary));
        Ok(vocabulary)
    }

    pub async fn current(&self) -> Option<Arc<FilterVocabulary>> {
        self.loaded.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::BTreeMap,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use async_trait::async_trait;
    use shared::protocol::{QueryParams, ResultPage};

    use super::*;

    struct CountingGateway {
        calls: AtomicUsize,
        fail_first: bool,
    }

    impl CountingGateway {
        fn new(fail_first: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_first,
            }
        }
    }

    #[async_trait]
    impl Gateway for CountingGateway {
        async fn fetch_filters(&self) -> Result<FilterVocabulary, GatewayError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_first && call == 0 {
                return Err(GatewayError::Transport("connection refused".into()));
            }
            Ok(FilterVocabulary::new(BTreeMap::from([(
                "StateA".to_string(),
                vec!["D1".to_string()],
            )])))
        }

        async fn fetch_records(&self, _params: &QueryParams) -> Result<ResultPage, GatewayError> {
            Ok(ResultPage::default())
        }
    }

    #[tokio::test]
    async fn loads_once_and_serves_cached_copy() {
        let gateway = CountingGateway::new(false);
        let cache = FilterCache::new();

        let first = cache.get_or_load(&gateway).await;
        let second = cache.get_or_load(&gateway).await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_load_degrades_to_empty_and_is_retried() {
        let gateway = CountingGateway::new(true);
        let cache = FilterCache::new();

        assert!(cache.get_or_load(&gateway).await.is_empty());
        assert!(cache.current().await.is_none());

        let retried = cache.get_or_load(&gateway).await;
        assert!(retried.states().any(|state| state == "StateA"));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn refresh_replaces_cached_vocabulary() {
        let gateway = CountingGateway::new(false);
        let cache = FilterCache::new();

        let first = cache.get_or_load(&gateway).await;
        let refreshed = cache.refresh(&gateway).await.expect("refresh");

        assert!(!Arc::ptr_eq(&first, &refreshed));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 2);
    }
}
