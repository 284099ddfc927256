//! 测试辅助模块
//!
//! 提供 mock 协作者和便捷的测试工厂方法。

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::channel::oneshot;
use serde_json::{json, Value};

use crate::error::{CoreError, CoreResult};
use crate::services::{ListFetcher, ListQuery, ServiceContext};
use crate::traits::{IdentityTranslator, Navigator, Notice, Notifier, ResourceTransport};
use crate::types::{ListPage, ListRequest, ListResponse, SubmitTarget};

// ===== MockTransport =====

/// In-memory transport serving a fixed dataset, recording every call.
pub struct MockTransport {
    records: Vec<Value>,
    list_requests: Mutex<Vec<(String, ListRequest)>>,
    count_requests: Mutex<Vec<(String, ListRequest)>>,
    submissions: Mutex<Vec<(SubmitTarget, Value)>>,
    attachments: Mutex<Vec<Value>>,
    /// 如果 Some，下一次 count 请求返回此错误
    count_error: Mutex<Option<String>>,
    /// 如果 Some，下一次 submit / attach 返回此错误
    submit_error: Mutex<Option<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<Value>) -> Self {
        Self {
            records,
            list_requests: Mutex::new(Vec::new()),
            count_requests: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
            attachments: Mutex::new(Vec::new()),
            count_error: Mutex::new(None),
            submit_error: Mutex::new(None),
        }
    }

    pub fn fail_next_count(&self, message: &str) {
        *self.count_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_next_submit(&self, message: &str) {
        *self.submit_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn list_requests(&self) -> Vec<(String, ListRequest)> {
        self.list_requests.lock().unwrap().clone()
    }

    pub fn count_requests(&self) -> Vec<(String, ListRequest)> {
        self.count_requests.lock().unwrap().clone()
    }

    pub fn submissions(&self) -> Vec<(SubmitTarget, Value)> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn attachments(&self) -> Vec<Value> {
        self.attachments.lock().unwrap().clone()
    }

    fn take_submit_error(&self) -> CoreResult<()> {
        match self.submit_error.lock().unwrap().take() {
            Some(message) => Err(CoreError::Transport {
                status: 500,
                message,
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ResourceTransport for MockTransport {
    async fn fetch_list(
        &self,
        collection: &str,
        request: &ListRequest,
    ) -> CoreResult<ListResponse> {
        self.list_requests
            .lock()
            .unwrap()
            .push((collection.to_string(), request.clone()));
        let start = usize::try_from(request.page.start.unwrap_or(0)).unwrap();
        let limit = request.page.limit.unwrap_or(u32::MAX) as usize;
        let details = self.records.iter().skip(start).take(limit).cloned().collect();
        Ok(ListResponse {
            details: Some(details),
            list: None,
            count: None,
        })
    }

    async fn fetch_count(&self, collection: &str, request: &ListRequest) -> CoreResult<u64> {
        self.count_requests
            .lock()
            .unwrap()
            .push((collection.to_string(), request.clone()));
        if let Some(message) = self.count_error.lock().unwrap().take() {
            return Err(CoreError::Transport {
                status: 503,
                message,
            });
        }
        Ok(self.records.len() as u64)
    }

    async fn submit(&self, target: &SubmitTarget, payload: &Value) -> CoreResult<()> {
        self.submissions
            .lock()
            .unwrap()
            .push((target.clone(), payload.clone()));
        self.take_submit_error()
    }

    async fn attach_disk(&self, payload: &Value) -> CoreResult<()> {
        self.attachments.lock().unwrap().push(payload.clone());
        self.take_submit_error()
    }
}

// ===== MockNotifier / MockNavigator =====

pub struct MockNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            notices: Mutex::new(Vec::new()),
        }
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

pub struct MockNavigator {
    paths: Mutex<Vec<String>>,
}

impl MockNavigator {
    pub fn new() -> Self {
        Self {
            paths: Mutex::new(Vec::new()),
        }
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

impl Navigator for MockNavigator {
    fn go_to(&self, path: &str) {
        self.paths.lock().unwrap().push(path.to_string());
    }
}

// ===== GatedFetcher =====

/// Fetcher whose calls block until the test releases them, in call order.
pub struct GatedFetcher {
    gates: Mutex<VecDeque<oneshot::Receiver<CoreResult<ListPage>>>>,
    calls: AtomicUsize,
}

impl GatedFetcher {
    /// Fetcher plus one sender per expected call.
    pub fn new(n: usize) -> (Arc<Self>, Vec<oneshot::Sender<CoreResult<ListPage>>>) {
        let (senders, receivers): (Vec<_>, VecDeque<_>) = (0..n).map(|_| oneshot::channel()).unzip();
        let fetcher = Arc::new(Self {
            gates: Mutex::new(receivers),
            calls: AtomicUsize::new(0),
        });
        (fetcher, senders)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ListFetcher for GatedFetcher {
    async fn fetch(&self, _collection: &str, _query: &ListQuery) -> CoreResult<ListPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().unwrap().pop_front();
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(CoreError::Fetch("gate dropped".to_string()))),
            None => Err(CoreError::Fetch("no gate left".to_string())),
        }
    }
}

// ===== 工厂方法 =====

pub struct TestContext {
    pub ctx: Arc<ServiceContext>,
    pub transport: Arc<MockTransport>,
    pub notifier: Arc<MockNotifier>,
    pub navigator: Arc<MockNavigator>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_transport(Arc::new(MockTransport::new()))
    }

    pub fn with_transport(transport: Arc<MockTransport>) -> Self {
        let notifier = Arc::new(MockNotifier::new());
        let navigator = Arc::new(MockNavigator::new());
        let ctx = Arc::new(ServiceContext::new(
            Arc::clone(&transport) as Arc<dyn ResourceTransport>,
            Arc::clone(&notifier) as Arc<dyn Notifier>,
            Arc::clone(&navigator) as Arc<dyn Navigator>,
            Arc::new(IdentityTranslator),
        ));
        Self {
            ctx,
            transport,
            notifier,
            navigator,
        }
    }
}

/// `n` disk records with ids `disk-0..disk-{n-1}`.
pub fn disk_records(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| {
            json!({
                "id": format!("disk-{i}"),
                "vendor": "aws",
                "spec": { "disk_size": 50 }
            })
        })
        .collect()
}
