//! Transport abstraction Trait

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CoreResult;
use crate::types::{ListRequest, ListResponse, SubmitTarget};

/// Transport/store layer
///
/// Owns the wire format; the core only consumes the fields listed in the
/// request and response types. Failures come back as `CoreError` carrying a
/// human-readable message.
#[async_trait]
pub trait ResourceTransport: Send + Sync {
    /// Fetch one page of a resource collection
    ///
    /// # Arguments
    /// * `collection` - Resource collection (e.g. `disks`, `cvms`)
    /// * `request` - Page bounds, sort and filter
    async fn fetch_list(&self, collection: &str, request: &ListRequest)
        -> CoreResult<ListResponse>;

    /// Count the records of a collection matching the request's filter
    async fn fetch_count(&self, collection: &str, request: &ListRequest) -> CoreResult<u64>;

    /// Submit a create application
    async fn submit(&self, target: &SubmitTarget, payload: &Value) -> CoreResult<()>;

    /// Attach a disk to a host
    async fn attach_disk(&self, payload: &Value) -> CoreResult<()>;
}
