//! Fetch orchestration: turns query state into gateway round trips and commits
//! results only for the most recently issued request.

use std::sync::Arc;

use shared::{
    domain::FilterVocabulary,
    error::QueryError,
    protocol::{QueryParams, ResultPage},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    filter_cache::FilterCache,
    gateway::{Gateway, GatewayError},
    query_state::QueryState,
    view::DashboardView,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Error(String),
    Success,
}

impl FetchStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Committed,
    Failed(String),
    /// A newer request was issued before this one resolved.
    Superseded,
    Rejected(QueryError),
    /// Intent not applicable in the current state (e.g. no next page).
    Ignored,
}

#[derive(Debug, Clone)]
pub enum DashboardEvent {
    Vocabulary(Arc<FilterVocabulary>),
    Query(QueryState),
    Status(FetchStatus),
    Page { page: ResultPage, query: QueryState },
}

struct DashboardState {
    query: QueryState,
    page: ResultPage,
    status: FetchStatus,
    latest_request: u64,
}

pub struct Dashboard {
    gateway: Arc<dyn Gateway>,
    filters: FilterCache,
    inner: Mutex<DashboardState>,
    events: broadcast::Sender<DashboardEvent>,
}

impl Dashboard {
    pub fn new(gateway: Arc<dyn Gateway>) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            gateway,
            filters: FilterCache::new(),
            inner: Mutex::new(DashboardState {
                query: QueryState::default(),
                page: ResultPage::default(),
                status: FetchStatus::Idle,
                latest_request: 0,
            }),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: DashboardEvent) {
        let _ = self.events.send(event);
    }

    /// Initial mount: vocabulary and first unfiltered page, concurrently.
    pub async fn startup(&self) -> RefreshOutcome {
        let (_, outcome) = futures::join!(self.load_filters(), self.refresh(0));
        outcome
    }

    pub async fn load_filters(&self) -> Arc<FilterVocabulary> {
        let vocabulary = self.filters.get_or_load(self.gateway.as_ref()).await;
        self.emit(DashboardEvent::Vocabulary(Arc::clone(&vocabulary)));
        vocabulary
    }

    pub async fn reload_filters(&self) -> Result<Arc<FilterVocabulary>, GatewayError> {
        match self.filters.refresh(self.gateway.as_ref()).await {
            Ok(vocabulary) => {
                self.emit(DashboardEvent::Vocabulary(Arc::clone(&vocabulary)));
                Ok(vocabulary)
            }
            Err(err) => {
                warn!("failed to reload filter vocabulary: {err}");
                Err(err)
            }
        }
    }

    pub async fn select_state(&self, state: &str) {
        let query = {
            let mut guard = self.inner.lock().await;
            guard.query.set_state(state);
            guard.query.clone()
        };
        self.emit(DashboardEvent::Query(query));
    }

    pub async fn select_district(&self, district: &str) -> Result<(), QueryError> {
        let query = {
            let mut guard = self.inner.lock().await;
            guard.query.set_district(district)?;
            guard.query.clone()
        };
        self.emit(DashboardEvent::Query(query));
        Ok(())
    }

    pub async fn apply_filters(&self) -> RefreshOutcome {
        self.refresh(0).await
    }

    /// Next page of the result set on screen, even if the selection has
    /// changed since it was fetched.
    pub async fn next_page(&self) -> RefreshOutcome {
        let target = {
            let guard = self.inner.lock().await;
            if guard.status.is_loading() {
                None
            } else {
                guard.query.next_page()
            }
        };
        match target {
            Some(params) => self.fetch(params).await,
            None => RefreshOutcome::Ignored,
        }
    }

    pub async fn previous_page(&self) -> RefreshOutcome {
        let target = {
            let guard = self.inner.lock().await;
            if guard.status.is_loading() {
                None
            } else {
                guard.query.previous_page()
            }
        };
        match target {
            Some(params) => self.fetch(params).await,
            None => RefreshOutcome::Ignored,
        }
    }

    /// Fetches the page at `offset` for the current selection.
    pub async fn refresh(&self, offset: u64) -> RefreshOutcome {
        let params = {
            let guard = self.inner.lock().await;
            guard.query.params_at(offset)
        };
        match params {
            Ok(params) => self.fetch(params).await,
            Err(err) => {
                warn!(offset, "refusing refresh: {err}");
                RefreshOutcome::Rejected(err)
            }
        }
    }

    /// Only the most recently issued fetch may commit; anything that resolves
    /// after a newer one was issued is dropped, success or failure alike.
    /// On failure the previous page stays in place.
    async fn fetch(&self, params: QueryParams) -> RefreshOutcome {
        let request_id = {
            let mut guard = self.inner.lock().await;
            guard.latest_request += 1;
            guard.status = FetchStatus::Loading;
            guard.latest_request
        };
        self.emit(DashboardEvent::Status(FetchStatus::Loading));
        let offset = params.offset();
        debug!(
            request_id,
            offset,
            state = params.filter.state(),
            district = params.filter.district(),
            "issuing records query"
        );

        let result = self.gateway.fetch_records(&params).await;

        let mut guard = self.inner.lock().await;
        if request_id != guard.latest_request {
            debug!(
                request_id,
                latest_request = guard.latest_request,
                "discarding stale records response"
            );
            return RefreshOutcome::Superseded;
        }

        match result {
            Ok(page) => {
                info!(
                    offset,
                    total = page.total,
                    records = page.records.len(),
                    "records page committed"
                );
                guard.query.commit(&params, page.total);
                guard.page = page;
                guard.status = FetchStatus::Success;
                self.emit(DashboardEvent::Page {
                    page: guard.page.clone(),
                    query: guard.query.clone(),
                });
                self.emit(DashboardEvent::Status(FetchStatus::Success));
                RefreshOutcome::Committed
            }
            Err(err) => {
                let message = err.user_message();
                warn!(offset, "records query failed: {err}");
                guard.status = FetchStatus::Error(message.clone());
                self.emit(DashboardEvent::Status(guard.status.clone()));
                RefreshOutcome::Failed(message)
            }
        }
    }

    pub async fn status(&self) -> FetchStatus {
        self.inner.lock().await.status.clone()
    }

    pub async fn query(&self) -> QueryState {
        self.inner.lock().await.query.clone()
    }

    pub async fn page(&self) -> ResultPage {
        self.inner.lock().await.page.clone()
    }

    pub async fn snapshot(&self) -> DashboardView {
        let vocabulary = self.filters.current().await.unwrap_or_default();
        let guard = self.inner.lock().await;
        DashboardView {
            vocabulary,
            query: guard.query.clone(),
            page: guard.page.clone(),
            status: guard.status.clone(),
        }
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
