//! # List Controller
//!
//! Composes the parameter store, the debouncer, the query cache and the view
//! state machine into one list screen. A driver task watches three sources:
//!
//! 1. parameter store changes (decoded into a new [`ListQuery`]),
//! 2. cache invalidation events for this resource,
//! 3. completion of its own fetch tasks.
//!
//! Each fetch is tagged with a sequence number. A response is applied only if
//! its tag is the latest and its query still matches the one decoded from
//! the parameter store; anything else is dropped. Starting a new fetch also
//! aborts the older ones still pending.

use crate::client::QueryClient;
use crate::debounce::Debouncer;
use crate::error::QueryError;
use crate::message::CacheEvent;
use crate::params::{ParamOp, ParamStore, Params};
use crate::query::{ListDefaults, ListQuery, ListResult, KEYWORD, PAGE};
use crate::resource::ListResource;
use crate::view::{ListState, TableEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

/// Default quiet period before a keyword is committed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(350);

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub defaults: ListDefaults,
    pub debounce: Duration,
}

impl ControllerOptions {
    pub fn for_resource<R: ListResource>() -> Self {
        Self {
            defaults: R::defaults(),
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.defaults = self.defaults.with_limit(limit);
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

/// One live list screen for resource `R`.
///
/// Dropping the controller tears the screen down: the driver, its pending
/// fetch tasks and the debounce timer are all aborted.
pub struct ListController<R: ListResource> {
    params: ParamStore,
    state: watch::Receiver<ListState<R>>,
    debouncer: Arc<Debouncer>,
    defaults: ListDefaults,
    driver: JoinHandle<()>,
}

impl<R: ListResource> ListController<R> {
    pub fn spawn(params: ParamStore, cache: QueryClient, options: ControllerOptions) -> Self {
        let defaults = options.defaults;
        let mut param_changes = params.subscribe();
        let initial = decode::<R>(&param_changes.borrow_and_update(), &defaults);
        let (state_tx, state) = watch::channel(ListState::Idle(initial.clone()));

        let commit_store = params.clone();
        let debouncer = Arc::new(Debouncer::spawn(
            initial.keyword.clone().unwrap_or_default(),
            options.debounce,
            move |keyword| {
                let params = commit_store.clone();
                async move {
                    let ops = vec![ParamOp::set(KEYWORD, keyword), ParamOp::remove(PAGE)];
                    if let Err(e) = params.apply(ops).await {
                        warn!(error = %e, "Keyword commit failed");
                    }
                }
            },
        ));

        let driver = Driver::<R> {
            cache: cache.clone(),
            defaults: defaults.clone(),
            debouncer: debouncer.clone(),
            state: state_tx,
            current: initial,
            seq: 0,
            tasks: JoinSet::new(),
        };
        let driver = tokio::spawn(driver.run(param_changes, cache.subscribe()));

        Self {
            params,
            state,
            debouncer,
            defaults,
            driver,
        }
    }

    pub fn state(&self) -> ListState<R> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState<R>> {
        self.state.clone()
    }

    /// The query the parameter store currently describes.
    pub fn query(&self) -> ListQuery {
        decode::<R>(&self.params.snapshot(), &self.defaults)
    }

    /// Feeds one keystroke of the search box.
    pub fn on_keyword_input(&self, raw: impl Into<String>) {
        self.debouncer.on_change(raw);
    }

    /// What the search box shows right now.
    pub fn keyword_input(&self) -> String {
        self.debouncer.raw_value()
    }

    pub async fn handle(&self, event: TableEvent) -> Result<(), QueryError> {
        debug!(resource = R::NAME, ?event, "Table event");
        self.params.apply(event.into_ops()).await.map(|_| ())
    }

    /// Replaces a filter and goes back to the first page.
    pub async fn set_filter(&self, key: &str, values: Vec<String>) -> Result<(), QueryError> {
        self.params
            .apply(vec![ParamOp::set_all(key, values), ParamOp::remove(PAGE)])
            .await
            .map(|_| ())
    }

    pub async fn clear_filter(&self, key: &str) -> Result<(), QueryError> {
        self.set_filter(key, Vec::new()).await
    }

    /// Resolves once the screen is loaded or failed for the current query.
    pub async fn wait_until_settled(&self) -> Result<ListState<R>, QueryError> {
        let mut state = self.state.clone();
        let settled = state
            .wait_for(|s| s.is_settled() && *s.query() == self.query())
            .await
            .map_err(|_| QueryError::CacheClosed)?;
        Ok(settled.clone())
    }
}

impl<R: ListResource> Drop for ListController<R> {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

fn decode<R: ListResource>(params: &Params, defaults: &ListDefaults) -> ListQuery {
    ListQuery::decode(params.pairs(), defaults, R::filters())
}

type FetchOutcome<R> = (u64, ListQuery, Result<ListResult<R>, QueryError>);

struct Driver<R: ListResource> {
    cache: QueryClient,
    defaults: ListDefaults,
    debouncer: Arc<Debouncer>,
    state: watch::Sender<ListState<R>>,
    current: ListQuery,
    seq: u64,
    tasks: JoinSet<FetchOutcome<R>>,
}

impl<R: ListResource> Driver<R> {
    async fn run(
        mut self,
        mut params: watch::Receiver<Params>,
        mut events: broadcast::Receiver<CacheEvent>,
    ) {
        info!(resource = R::NAME, query = %self.current.to_query_string(), "List screen started");
        self.start_fetch();

        loop {
            tokio::select! {
                changed = params.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = params.borrow_and_update().clone();
                    self.on_params(&snapshot);
                }
                event = events.recv() => match event {
                    Ok(CacheEvent::Invalidated { resource }) if resource == R::NAME => {
                        debug!(resource = R::NAME, "Refetching after invalidation");
                        self.start_fetch();
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(resource = R::NAME, skipped, "Missed cache events, refetching");
                        self.start_fetch();
                    }
                    Err(RecvError::Closed) => break,
                },
                Some(joined) = self.tasks.join_next() => match joined {
                    Ok((seq, query, result)) => self.complete(seq, query, result),
                    Err(e) if e.is_cancelled() => {}
                    Err(e) => warn!(resource = R::NAME, error = %e, "Fetch task failed"),
                },
            }
        }

        info!(resource = R::NAME, "List screen stopped");
    }

    fn on_params(&mut self, params: &Params) {
        let query = decode::<R>(params, &self.defaults);

        let keyword = query.keyword.clone().unwrap_or_default();
        if keyword != self.debouncer.committed_value() {
            self.debouncer.reset(keyword);
        }

        if query != self.current {
            self.current = query;
            self.start_fetch();
        }
    }

    fn start_fetch(&mut self) {
        self.tasks.abort_all();
        self.seq += 1;

        let query = self.current.clone();
        let previous = self.state.borrow().result().cloned();
        debug!(resource = R::NAME, seq = self.seq, query = %query.to_query_string(), "Fetching list");
        self.state.send_replace(ListState::Fetching {
            query: query.clone(),
            previous,
        });

        let cache = self.cache.clone();
        let seq = self.seq;
        self.tasks.spawn(async move {
            let result = cache.fetch_list::<R>(R::NAME, &query).await;
            (seq, query, result)
        });
    }

    fn complete(&mut self, seq: u64, query: ListQuery, result: Result<ListResult<R>, QueryError>) {
        if seq != self.seq || query != self.current {
            debug!(resource = R::NAME, seq, latest = self.seq, "Discarded stale response");
            return;
        }
        let next = match result {
            Ok(result) => {
                debug!(resource = R::NAME, rows = result.data.len(), total = result.total, "Loaded");
                ListState::Loaded {
                    query,
                    result: Arc::new(result),
                }
            }
            Err(error) => {
                warn!(resource = R::NAME, error = %error, "List fetch failed");
                ListState::Failed { query, error }
            }
        };
        self.state.send_replace(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::CacheKey;
    use crate::mock::MockFetcher;
    use crate::params::ParamActor;
    use crate::query::FilterSpec;
    use crate::QueryCache;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, Deserialize, PartialEq)]
    struct Row {
        id: String,
    }

    impl ListResource for Row {
        const NAME: &'static str = "rows";

        fn filters() -> &'static [FilterSpec] {
            const FILTERS: &[FilterSpec] = &[FilterSpec::one_of("status", &["open", "closed"])];
            FILTERS
        }

        fn id(&self) -> &str {
            &self.id
        }
    }

    fn key(qs: &str) -> CacheKey {
        CacheKey::list(
            "rows",
            ListQuery::from_query_string(qs, &ListDefaults::default(), Row::filters()),
        )
    }

    fn page(ids: &[&str], total: u64) -> serde_json::Value {
        let data: Vec<_> = ids.iter().map(|id| json!({ "id": id })).collect();
        json!({ "data": data, "total": total, "page": 1, "limit": 10 })
    }

    fn setup(qs: &str, mock: &MockFetcher) -> (ParamStore, QueryClient, ListController<Row>) {
        let (params_actor, params) = ParamActor::new(Params::parse(qs), 16);
        tokio::spawn(params_actor.run());
        let (cache, client) = QueryCache::new(mock.clone(), 16, Duration::from_secs(5));
        tokio::spawn(cache.run());
        let controller =
            ListController::<Row>::spawn(params.clone(), client.clone(), ControllerOptions::for_resource::<Row>());
        (params, client, controller)
    }

    #[tokio::test]
    async fn test_initial_fetch_uses_decoded_defaults() {
        let mock = MockFetcher::new();
        mock.expect(key("")).return_ok(page(&["a"], 1));
        let (_params, _client, controller) = setup("", &mock);

        let state = controller.wait_until_settled().await.unwrap();
        assert_eq!(state.query().page, 1);
        assert_eq!(state.render().rows, &[Row { id: "a".into() }]);
    }

    #[tokio::test]
    async fn test_failure_settles_instead_of_loading_forever() {
        let mock = MockFetcher::new();
        mock.expect(key(""))
            .return_err(QueryError::Network("connection refused".into()));
        let (_params, _client, controller) = setup("", &mock);

        let state = controller.wait_until_settled().await.unwrap();
        assert!(matches!(state.error(), Some(QueryError::Network(_))));
        assert!(!state.is_fetching());
    }

    #[tokio::test]
    async fn test_filter_change_refetches_from_first_page() {
        let mock = MockFetcher::new();
        mock.expect(key("page=3")).return_ok(page(&["a"], 30));
        mock.expect(key("status=open")).return_ok(page(&["b"], 1));
        let (params, _client, controller) = setup("page=3", &mock);
        controller.wait_until_settled().await.unwrap();

        controller
            .set_filter("status", vec!["open".into()])
            .await
            .unwrap();
        let state = controller.wait_until_settled().await.unwrap();

        assert_eq!(params.get("page"), None);
        assert_eq!(state.render().rows[0].id, "b");
        mock.verify();
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let mock = MockFetcher::new();
        let slow = mock.expect(key("")).hold().return_ok(page(&["old"], 1));
        mock.expect(key("status=closed")).return_ok(page(&["new"], 1));
        let (params, _client, controller) = setup("", &mock);
        mock.wait_for_calls(&key(""), 1).await;

        params.set("status", "closed").await.unwrap();
        let state = controller.wait_until_settled().await.unwrap();
        assert_eq!(state.render().rows[0].id, "new");

        slow.release();
        tokio::task::yield_now().await;
        let state = controller.state();
        assert_eq!(state.query().filter("status").and_then(|f| f.first()), Some("closed"));
        assert_eq!(state.render().rows[0].id, "new");
    }

    /// A write racing the spawn is either in the initial query or wakes the driver.
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_write_during_spawn_is_not_lost() {
        for _ in 0..50 {
            let mock = MockFetcher::new();
            mock.expect(key("")).return_ok(page(&["a"], 1));
            mock.expect(key("status=closed")).return_ok(page(&["c"], 1));
            let (params_actor, params) = ParamActor::new(Params::parse(""), 16);
            tokio::spawn(params_actor.run());
            let (cache, client) = QueryCache::new(mock.clone(), 16, Duration::from_secs(5));
            tokio::spawn(cache.run());

            let writer = {
                let params = params.clone();
                tokio::spawn(async move { params.set("status", "closed").await })
            };
            let controller = ListController::<Row>::spawn(
                params.clone(),
                client,
                ControllerOptions::for_resource::<Row>(),
            );
            writer.await.unwrap().unwrap();

            let state = tokio::time::timeout(Duration::from_secs(2), controller.wait_until_settled())
                .await
                .expect("screen settled on the latest params")
                .unwrap();
            assert_eq!(state.query().filter("status").and_then(|f| f.first()), Some("closed"));
            assert_eq!(state.render().rows[0].id, "c");
        }
    }

    #[tokio::test]
    async fn test_invalidation_refetches_same_query() {
        let mock = MockFetcher::new();
        mock.expect(key("")).return_ok(page(&["a", "b"], 2));
        mock.expect(key("")).return_ok(page(&["a"], 1));
        let (_params, client, controller) = setup("", &mock);
        controller.wait_until_settled().await.unwrap();

        let mut states = controller.subscribe();
        client.invalidate_resource("rows", Some("b")).await.unwrap();
        states
            .wait_for(|s| matches!(s, ListState::Loaded { result, .. } if result.total == 1))
            .await
            .unwrap();

        assert_eq!(mock.calls(&key("")), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keyword_typing_commits_once() {
        let mock = MockFetcher::new();
        mock.expect(key("")).return_ok(page(&[], 0));
        mock.expect(key("keyword=dune")).return_ok(page(&["d"], 1));
        let (params, _client, controller) = setup("", &mock);
        controller.wait_until_settled().await.unwrap();

        for raw in ["d", "du", "dun", "dune"] {
            controller.on_keyword_input(raw);
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert_eq!(controller.keyword_input(), "dune");
        assert_eq!(params.get("keyword"), None);

        tokio::time::sleep(Duration::from_millis(400)).await;
        let state = controller.wait_until_settled().await.unwrap();

        assert_eq!(params.get("keyword").as_deref(), Some("dune"));
        assert_eq!(state.render().rows.len(), 1);
        assert_eq!(mock.total_calls(), 2);
    }

    #[tokio::test]
    async fn test_navigation_resets_keyword_input() {
        let mock = MockFetcher::new();
        mock.expect(key("keyword=old")).return_ok(page(&[], 0));
        mock.expect(key("keyword=new")).return_ok(page(&[], 0));
        let (params, _client, controller) = setup("keyword=old", &mock);
        controller.wait_until_settled().await.unwrap();
        assert_eq!(controller.keyword_input(), "old");

        params.navigate("keyword=new").await.unwrap();
        controller.wait_until_settled().await.unwrap();

        assert_eq!(controller.keyword_input(), "new");
    }
}
