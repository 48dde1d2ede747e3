use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::Page;
use crate::error::PortalError;
use crate::notifier::Notifier;

/// Anything that can serve one page of a collection for a scope
#[async_trait]
pub trait PagedSource: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;
    type Scope: Copy + Eq + Debug + Display + Send + Sync + 'static;

    /// Plural noun used in failure notices
    fn label(&self) -> &str;

    async fn fetch_page(
        &self,
        page: u32,
        page_size: u32,
        scope: Self::Scope,
    ) -> Result<Page<Self::Item>, PortalError>;
}

/// Receiver of the "data changed, fetch again" signal sent after a mutation
#[async_trait]
pub trait RefreshSignal: Send + Sync {
    async fn signal_refresh(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Loaded,
    Errored,
}

/// What `refresh` does when the current page comes back empty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyPagePolicy {
    Stay,
    #[default]
    StepBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded,
    Errored,
    /// A newer fetch was dispatched before this one returned
    Stale,
}

#[derive(Debug, Clone)]
pub struct ListSnapshot<T, S> {
    pub status: LoadStatus,
    pub direction: S,
    pub page: u32,
    pub collection: Page<T>,
    pub last_error: Option<String>,
}

/// Page numbers `current - radius ..= current + radius`, clipped to `1..=total`
pub fn page_window(current: u32, total: u32, radius: u32) -> Vec<u32> {
    let total = total.max(1);
    let current = current.clamp(1, total);
    let start = current.saturating_sub(radius).max(1);
    let end = current.saturating_add(radius).min(total);
    (start..=end).collect()
}

/// `direction` and `page` describe `collection`; `requested` is the scope of
/// the latest dispatch and only becomes `direction` once its fetch succeeds
struct ListState<T, S> {
    status: LoadStatus,
    direction: S,
    requested: S,
    page: u32,
    collection: Page<T>,
    last_error: Option<String>,
}

/// Paginated list state machine over a [`PagedSource`].
///
/// Every fetch is tagged with a sequence number. Only the response to the most
/// recently dispatched fetch is applied; earlier ones are dropped when they
/// arrive, so a slow response can never overwrite newer state.
pub struct ListController<S: PagedSource> {
    source: Arc<S>,
    notifier: Arc<dyn Notifier>,
    page_size: u32,
    window_radius: u32,
    empty_page_policy: EmptyPagePolicy,
    latest: AtomicU64,
    state: Mutex<ListState<S::Item, S::Scope>>,
}

impl<S: PagedSource> ListController<S> {
    pub fn new(source: Arc<S>, notifier: Arc<dyn Notifier>, direction: S::Scope, page_size: u32) -> Self {
        Self {
            source,
            notifier,
            page_size: page_size.max(1),
            window_radius: 2,
            empty_page_policy: EmptyPagePolicy::default(),
            latest: AtomicU64::new(0),
            state: Mutex::new(ListState {
                status: LoadStatus::Idle,
                direction,
                requested: direction,
                page: 1,
                collection: Page::empty(),
                last_error: None,
            }),
        }
    }

    pub fn with_window_radius(mut self, radius: u32) -> Self {
        self.window_radius = radius;
        self
    }

    pub fn with_empty_page_policy(mut self, policy: EmptyPagePolicy) -> Self {
        self.empty_page_policy = policy;
        self
    }

    fn lock(&self) -> MutexGuard<'_, ListState<S::Item, S::Scope>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn status(&self) -> LoadStatus {
        self.lock().status
    }

    pub fn direction(&self) -> S::Scope {
        self.lock().direction
    }

    pub fn current_page(&self) -> u32 {
        self.lock().page
    }

    pub fn items(&self) -> Vec<S::Item> {
        self.lock().collection.items.clone()
    }

    pub fn snapshot(&self) -> ListSnapshot<S::Item, S::Scope> {
        let state = self.lock();
        ListSnapshot {
            status: state.status,
            direction: state.direction,
            page: state.page,
            collection: state.collection.clone(),
            last_error: state.last_error.clone(),
        }
    }

    pub fn page_window(&self) -> Vec<u32> {
        let state = self.lock();
        page_window(state.page, state.collection.total_pages, self.window_radius)
    }

    /// Initial fetch for the current direction and page
    pub async fn load(&self) -> FetchOutcome {
        let (page, direction) = {
            let state = self.lock();
            (state.page, state.direction)
        };
        self.fetch(page, direction).await
    }

    /// Always restarts at page 1
    pub async fn switch_direction(&self, direction: S::Scope) -> FetchOutcome {
        self.fetch(1, direction).await
    }

    /// `None` when `page` is outside `1..=total_pages`; state is left untouched
    pub async fn go_to_page(&self, page: u32) -> Option<FetchOutcome> {
        let direction = {
            let state = self.lock();
            if page < 1 || page > state.collection.total_pages {
                tracing::debug!(page, total = state.collection.total_pages, "ignoring out-of-range page");
                return None;
            }
            state.requested
        };
        Some(self.fetch(page, direction).await)
    }

    /// Re-fetch the current (direction, page), stepping back once if the page emptied
    pub async fn refresh(&self) -> FetchOutcome {
        let (page, direction) = {
            let state = self.lock();
            (state.page, state.direction)
        };

        let outcome = self.fetch(page, direction).await;
        if outcome != FetchOutcome::Loaded || self.empty_page_policy != EmptyPagePolicy::StepBack {
            return outcome;
        }

        let step_back = {
            let state = self.lock();
            state.collection.is_empty() && page > 1
        };
        if step_back {
            tracing::debug!(page, "current page emptied, stepping back");
            return self.fetch(page - 1, direction).await;
        }
        outcome
    }

    async fn fetch(&self, page: u32, direction: S::Scope) -> FetchOutcome {
        let sequence = {
            let mut state = self.lock();
            state.status = LoadStatus::Loading;
            state.requested = direction;
            self.latest.fetch_add(1, Ordering::SeqCst) + 1
        };

        let result = self.source.fetch_page(page, self.page_size, direction).await;

        let failure = {
            let mut state = self.lock();
            if sequence != self.latest.load(Ordering::SeqCst) {
                tracing::debug!(sequence, page, %direction, "discarding stale response");
                return FetchOutcome::Stale;
            }

            match result {
                Ok(collection) => {
                    state.direction = direction;
                    state.page = collection.current_page;
                    state.collection = collection;
                    state.status = LoadStatus::Loaded;
                    state.last_error = None;
                    return FetchOutcome::Loaded;
                }
                Err(err) => {
                    // previous collection stays visible under its own scope
                    state.requested = state.direction;
                    state.status = LoadStatus::Errored;
                    state.last_error = Some(err.user_message());
                    err
                }
            }
        };

        tracing::warn!(page, %direction, source = self.source.label(), "list fetch failed: {}", failure);
        self.notifier
            .error(&format!("Failed to fetch {} {}", direction, self.source.label()));
        FetchOutcome::Errored
    }
}

#[async_trait]
impl<S: PagedSource> RefreshSignal for ListController<S> {
    async fn signal_refresh(&self) {
        self.refresh().await;
    }
}
