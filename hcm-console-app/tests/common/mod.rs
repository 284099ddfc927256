#![allow(dead_code, clippy::expect_used, clippy::unwrap_used)]
//! Shared mock collaborators for the integration tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use hcm_console_app::{AppState, AppStateBuilder};
use hcm_console_core::error::{CoreError, CoreResult};
use hcm_console_core::traits::{Navigator, Notice, Notifier, ResourceTransport};
use hcm_console_core::types::{Condition, ListRequest, ListResponse, SubmitTarget, Vendor};

/// In-memory transport serving one collection of records.
#[derive(Default)]
pub struct MockTransport {
    records: Vec<Value>,
    fail_submit: Mutex<Option<String>>,
    fail_attach: Mutex<Option<String>>,
    attach_delay: Option<Duration>,
    pub list_requests: Mutex<Vec<(String, ListRequest)>>,
    pub submissions: Mutex<Vec<(SubmitTarget, Value)>>,
    pub attachments: Mutex<Vec<Value>>,
}

impl MockTransport {
    pub fn with_records(records: Vec<Value>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    /// Attach calls take `delay` before answering.
    pub fn with_attach_delay(mut self, delay: Duration) -> Self {
        self.attach_delay = Some(delay);
        self
    }

    pub fn fail_next_submit(&self, message: &str) {
        *self.fail_submit.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_next_attach(&self, message: &str) {
        *self.fail_attach.lock().unwrap() = Some(message.to_string());
    }

    pub fn submissions(&self) -> Vec<(SubmitTarget, Value)> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn attachments(&self) -> Vec<Value> {
        self.attachments.lock().unwrap().clone()
    }

    pub fn list_requests(&self) -> Vec<(String, ListRequest)> {
        self.list_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResourceTransport for MockTransport {
    async fn fetch_list(&self, collection: &str, request: &ListRequest) -> CoreResult<ListResponse> {
        self.list_requests
            .lock()
            .unwrap()
            .push((collection.to_string(), request.clone()));
        let start = request.page.start.unwrap_or(0) as usize;
        let limit = request.page.limit.unwrap_or(u32::MAX) as usize;
        Ok(ListResponse {
            details: Some(self.records.iter().skip(start).take(limit).cloned().collect()),
            ..ListResponse::default()
        })
    }

    async fn fetch_count(&self, _collection: &str, _request: &ListRequest) -> CoreResult<u64> {
        Ok(self.records.len() as u64)
    }

    async fn submit(&self, target: &SubmitTarget, payload: &Value) -> CoreResult<()> {
        if let Some(message) = self.fail_submit.lock().unwrap().take() {
            return Err(CoreError::Transport {
                status: 500,
                message,
            });
        }
        self.submissions
            .lock()
            .unwrap()
            .push((target.clone(), payload.clone()));
        Ok(())
    }

    async fn attach_disk(&self, payload: &Value) -> CoreResult<()> {
        if let Some(delay) = self.attach_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = self.fail_attach.lock().unwrap().take() {
            return Err(CoreError::Transport {
                status: 400,
                message,
            });
        }
        self.attachments.lock().unwrap().push(payload.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn go_to(&self, path: &str) {
        self.paths.lock().unwrap().push(path.to_string());
    }
}

pub struct Harness {
    pub state: AppState,
    pub transport: Arc<MockTransport>,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
}

impl Harness {
    pub fn new(transport: MockTransport) -> Self {
        let transport = Arc::new(transport);
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let state = AppStateBuilder::new()
            .transport(transport.clone())
            .notifier(notifier.clone())
            .navigator(navigator.clone())
            .build()
            .expect("app state");
        Self {
            state,
            transport,
            notifier,
            navigator,
        }
    }
}

pub fn condition(vendor: Vendor) -> Condition {
    Condition {
        biz_id: Some(100),
        cloud_account_id: Some("account-1".to_string()),
        vendor: Some(vendor),
        region: Some("region-1".to_string()),
        resource_group: Some("group-1".to_string()),
    }
}

/// Disks `disk-0..n`; every third one is attached to a host.
pub fn disks(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| {
            let instance = if i % 3 == 2 { json!("cvm-x") } else { json!("") };
            json!({
                "id": format!("disk-{i}"),
                "spec": { "disk_size": 50 },
                "instance_id": instance
            })
        })
        .collect()
}
