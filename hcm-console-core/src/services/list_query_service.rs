//! 分页列表查询控制器
//!
//! 每个资源表格持有一个控制器：负责分页、排序、过滤状态，并以“列表 + 总数”
//! 两个并发请求拉取数据。

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::traits::ResourceTransport;
use crate::types::{
    FilterExpr, ListPage, ListQueryConfig, ListRequest, PageRequest, Pagination, Sort, SortOrder,
};
use crate::utils::flatten_record;

/// Snapshot of everything a fetch depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub filter: FilterExpr,
    pub pagination: Pagination,
    pub sort: Option<Sort>,
    /// Extra top-level request arguments.
    pub extra: Map<String, Value>,
}

impl ListQuery {
    /// Bounded page request.
    pub fn page_request(&self) -> ListRequest {
        ListRequest {
            page: PageRequest::page(&self.pagination, self.sort.as_ref()),
            filter: self.filter.clone(),
            extra: self.extra.clone(),
        }
    }

    /// Count-only request over the same filter.
    pub fn count_request(&self) -> ListRequest {
        ListRequest {
            page: PageRequest::count_only(),
            filter: self.filter.clone(),
            extra: self.extra.clone(),
        }
    }
}

/// Fetch strategy of a list controller.
///
/// The default is [`PairedFetcher`]; views with unusual endpoints supply
/// their own and still get the controller's loading/suppression lifecycle.
#[async_trait]
pub trait ListFetcher: Send + Sync {
    async fn fetch(&self, collection: &str, query: &ListQuery) -> CoreResult<ListPage>;
}

/// Default strategy: a page request and a count request issued concurrently.
pub struct PairedFetcher {
    transport: Arc<dyn ResourceTransport>,
}

impl PairedFetcher {
    #[must_use]
    pub fn new(transport: Arc<dyn ResourceTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl ListFetcher for PairedFetcher {
    async fn fetch(&self, collection: &str, query: &ListQuery) -> CoreResult<ListPage> {
        let page_request = query.page_request();
        let count_request = query.count_request();

        let (list, count) = futures::future::try_join(
            self.transport.fetch_list(collection, &page_request),
            self.transport.fetch_count(collection, &count_request),
        )
        .await?;

        Ok(ListPage {
            records: list.into_records(),
            count,
        })
    }
}

/// State a list view renders from.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQueryState {
    pub filter: FilterExpr,
    pub pagination: Pagination,
    pub sort: Option<Sort>,
    /// Flattened rows of the current page only.
    pub items: Vec<Map<String, Value>>,
    /// True while the fetch for the current state is outstanding.
    pub loading: bool,
    /// True while a filter-driven fetch is in flight; page and size events are ignored.
    pub suppress_next_page_event: bool,
}

/// Result of one handler call.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The fetch completed and its result is what `items` now shows.
    Applied,
    /// Ignored: a filter-driven fetch was in flight.
    Suppressed,
    /// The fetch completed after a newer one was issued; its result was dropped.
    Stale,
    /// The fetch failed; previous `items` and `count` were kept.
    Failed(CoreError),
}

struct Inner {
    state: ListQueryState,
    collection: String,
    /// Bumped on every fetch; only the latest epoch may write results.
    epoch: u64,
    /// Epoch of the filter fetch that opened the suppression window.
    suppress_epoch: Option<u64>,
}

/// 分页列表查询控制器
pub struct ListQueryController {
    ctx: Arc<ServiceContext>,
    fetcher: Arc<dyn ListFetcher>,
    config: ListQueryConfig,
    extra: Map<String, Value>,
    inner: Mutex<Inner>,
}

impl ListQueryController {
    /// 创建控制器（默认并发拉取列表与总数）
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>, collection: impl Into<String>, filter: FilterExpr) -> Self {
        let config = ListQueryConfig::default();
        let fetcher: Arc<dyn ListFetcher> = Arc::new(PairedFetcher::new(Arc::clone(&ctx.transport)));
        Self {
            ctx,
            fetcher,
            config,
            extra: Map::new(),
            inner: Mutex::new(Inner {
                state: ListQueryState {
                    filter,
                    pagination: Pagination::new(config.default_page_size),
                    sort: None,
                    items: Vec::new(),
                    loading: false,
                    suppress_next_page_event: false,
                },
                collection: collection.into(),
                epoch: 0,
                suppress_epoch: None,
            }),
        }
    }

    /// 使用自定义拉取方法
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn ListFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// 使用自定义分页配置（初始页大小随之改变）
    #[must_use]
    pub fn with_config(mut self, config: ListQueryConfig) -> Self {
        self.config = config;
        self.lock().state.pagination.limit = config.default_page_size.max(1);
        self
    }

    /// 每次请求附带的额外参数
    #[must_use]
    pub fn with_extra_args(mut self, extra: Map<String, Value>) -> Self {
        self.extra = extra;
        self
    }

    // ===== 读取状态 =====

    pub fn state(&self) -> ListQueryState {
        self.lock().state.clone()
    }

    pub fn items(&self) -> Vec<Map<String, Value>> {
        self.lock().state.items.clone()
    }

    pub fn pagination(&self) -> Pagination {
        self.lock().state.pagination
    }

    pub fn is_loading(&self) -> bool {
        self.lock().state.loading
    }

    pub fn collection(&self) -> String {
        self.lock().collection.clone()
    }

    // ===== 事件处理 =====

    /// 首次加载（视图挂载时）
    pub async fn load(&self) -> FetchOutcome {
        self.dispatch("load", |_| true).await
    }

    /// 过滤条件变化：页码重置为 1，页大小重置为 `filter_reset_page_size`，
    /// 在本次请求结束前忽略翻页与改页大小事件。
    pub async fn set_filter(&self, filter: FilterExpr) -> FetchOutcome {
        let reset_size = self.config.filter_reset_page_size.max(1);
        self.dispatch("filter", move |inner| {
            inner.state.filter = filter;
            inner.state.pagination.current = 1;
            inner.state.pagination.limit = reset_size;
            inner.state.suppress_next_page_event = true;
            inner.suppress_epoch = Some(inner.epoch + 1);
            true
        })
        .await
    }

    /// 页码变化
    pub async fn set_page(&self, current: u32) -> FetchOutcome {
        self.dispatch("page", move |inner| {
            if inner.state.suppress_next_page_event {
                return false;
            }
            inner.state.pagination.current = current.max(1);
            true
        })
        .await
    }

    /// 页大小变化
    ///
    /// 当前页码保持不变，可能超出新的总页数；此时后端返回空页，视图需要容忍。
    pub async fn set_page_size(&self, limit: u32) -> FetchOutcome {
        self.dispatch("page size", move |inner| {
            if inner.state.suppress_next_page_event {
                return false;
            }
            inner.state.pagination.limit = limit.max(1);
            true
        })
        .await
    }

    /// 排序变化：页码重置为 1
    pub async fn set_sort(&self, field: impl Into<String>, order: SortOrder) -> FetchOutcome {
        let field = field.into();
        self.dispatch("sort", move |inner| {
            inner.state.pagination.current = 1;
            inner.state.sort = Some(Sort { field, order });
            true
        })
        .await
    }

    /// 切换资源类型（tab）后重新拉取
    ///
    /// 分页、过滤、排序保持不变，不做页码钳制：请求的页可能超出新集合的总数，
    /// 结果以后端返回为准。
    pub async fn refetch_for_collection_switch(&self, collection: impl Into<String>) -> FetchOutcome {
        let collection = collection.into();
        self.dispatch("collection switch", move |inner| {
            inner.collection = collection;
            true
        })
        .await
    }

    /// 以当前状态重新拉取
    pub async fn refetch(&self) -> FetchOutcome {
        self.dispatch("refetch", |_| true).await
    }

    /// Apply `mutate` and, unless it declines, run one fetch round-trip.
    ///
    /// The lock is only held for the synchronous parts on either side of the
    /// network wait.
    async fn dispatch<F>(&self, event: &'static str, mutate: F) -> FetchOutcome
    where
        F: FnOnce(&mut Inner) -> bool,
    {
        let (epoch, collection, query) = {
            let mut inner = self.lock();
            if !mutate(&mut *inner) {
                log::debug!("[list] {event} ignored while a filter fetch is in flight");
                return FetchOutcome::Suppressed;
            }
            inner.epoch += 1;
            inner.state.loading = true;
            let query = ListQuery {
                filter: inner.state.filter.clone(),
                pagination: inner.state.pagination,
                sort: inner.state.sort.clone(),
                extra: self.extra.clone(),
            };
            (inner.epoch, inner.collection.clone(), query)
        };

        log::debug!(
            "[list] {event}: fetching {collection} page {} (limit {}, epoch {epoch})",
            query.pagination.current,
            query.pagination.limit
        );
        let result = self.fetcher.fetch(&collection, &query).await;

        let outcome = {
            let mut inner = self.lock();
            if inner.suppress_epoch.is_some_and(|opened| epoch >= opened) {
                inner.suppress_epoch = None;
                inner.state.suppress_next_page_event = false;
            }

            if inner.epoch != epoch {
                log::debug!(
                    "[list] dropping stale result for {collection} (epoch {epoch}, current {})",
                    inner.epoch
                );
                return FetchOutcome::Stale;
            }

            inner.state.loading = false;
            match result {
                Ok(page) => {
                    inner.state.items = page.records.iter().map(flatten_record).collect();
                    inner.state.pagination.count = page.count;
                    FetchOutcome::Applied
                }
                Err(err) => FetchOutcome::Failed(match err {
                    CoreError::Fetch(_) => err,
                    other => CoreError::Fetch(other.user_message()),
                }),
            }
        };

        if let FetchOutcome::Failed(err) = &outcome {
            self.ctx.report_error(&format!("list {collection}"), err);
        }
        outcome
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
