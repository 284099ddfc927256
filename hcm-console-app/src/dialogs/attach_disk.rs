//! 主机挂载云硬盘对话框

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use hcm_console_core::error::{CoreError, CoreResult};
use hcm_console_core::services::{FetchOutcome, ListQueryController, ServiceContext};
use hcm_console_core::traits::Notice;
use hcm_console_core::types::{FilterExpr, FilterRule, ListQueryConfig, Vendor};

/// 云硬盘集合
pub const DISK_COLLECTION: &str = "disks";

/// The host disks are attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostDetail {
    /// 主机 ID
    pub id: String,
    pub vendor: Vendor,
    pub account_id: String,
    pub zone: String,
    pub region: String,
    /// 资源组（仅 Azure）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group_name: Option<String>,
}

/// Azure 磁盘缓存类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CachingType {
    None,
    ReadOnly,
    ReadWrite,
}

impl CachingType {
    pub fn all() -> &'static [CachingType] {
        &[CachingType::None, CachingType::ReadOnly, CachingType::ReadWrite]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::ReadOnly => "ReadOnly",
            Self::ReadWrite => "ReadWrite",
        }
    }
}

impl fmt::Display for CachingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CachingType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::Precondition(format!("未知的缓存类型: {s}")))
    }
}

/// Disks in the host's vendor, account, zone and region (and resource group on Azure).
pub fn disk_filter(host: &HostDetail) -> FilterExpr {
    let mut filter = FilterExpr::and(vec![
        FilterRule::eq("vendor", host.vendor.as_str()),
        FilterRule::eq("account_id", host.account_id.as_str()),
        FilterRule::eq("zone", host.zone.as_str()),
        FilterRule::eq("region", host.region.as_str()),
    ]);
    if host.vendor == Vendor::Azure {
        filter = filter.with(FilterRule::eq(
            "resource_group_name",
            host.resource_group_name.clone().unwrap_or_default(),
        ));
    }
    filter
}

fn is_unattached(disk: &Map<String, Value>) -> bool {
    match disk.get("instance_id") {
        None | Some(Value::Null) => true,
        Some(Value::String(id)) => id.is_empty(),
        Some(_) => false,
    }
}

/// 挂载云硬盘
pub struct AttachDiskDialog {
    ctx: Arc<ServiceContext>,
    host: HostDetail,
    list: ListQueryController,
    selected: Option<String>,
    device_name: String,
    caching_type: Option<CachingType>,
    confirming: AtomicBool,
}

impl AttachDiskDialog {
    pub fn new(ctx: Arc<ServiceContext>, host: HostDetail) -> Self {
        let list = ListQueryController::new(Arc::clone(&ctx), DISK_COLLECTION, disk_filter(&host));
        Self {
            ctx,
            host,
            list,
            selected: None,
            device_name: String::new(),
            caching_type: None,
            confirming: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ListQueryConfig) -> Self {
        self.list = self.list.with_config(config);
        self
    }

    pub fn host(&self) -> &HostDetail {
        &self.host
    }

    /// Underlying list: page, page-size and sort events go straight to it.
    pub fn list(&self) -> &ListQueryController {
        &self.list
    }

    pub async fn load(&self) -> FetchOutcome {
        self.list.load().await
    }

    /// Disks of the current page that are not attached to any host.
    pub fn unattached_disks(&self) -> Vec<Map<String, Value>> {
        self.list.items().into_iter().filter(is_unattached).collect()
    }

    /// Select a disk of the current page. Attached or unknown disks are refused.
    pub fn select(&mut self, disk_id: &str) -> bool {
        let known = self
            .unattached_disks()
            .iter()
            .any(|d| d.get("id").and_then(Value::as_str) == Some(disk_id));
        if known {
            self.selected = Some(disk_id.to_string());
        }
        known
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// 设备名称（仅 AWS）
    pub fn set_device_name(&mut self, name: impl Into<String>) {
        self.device_name = name.into();
    }

    /// 缓存类型（仅 Azure）
    pub fn set_caching_type(&mut self, caching: CachingType) {
        self.caching_type = Some(caching);
    }

    pub fn is_confirming(&self) -> bool {
        self.confirming.load(Ordering::SeqCst)
    }

    /// Attach payload, or the first unmet precondition.
    pub fn attach_payload(&self) -> CoreResult<Value> {
        let disk_id = self
            .selected
            .clone()
            .ok_or_else(|| CoreError::Precondition("请先选择云硬盘".to_string()))?;

        let mut payload = Map::new();
        payload.insert("disk_id".to_string(), Value::String(disk_id));
        payload.insert("cvm_id".to_string(), Value::String(self.host.id.clone()));

        match self.host.vendor {
            Vendor::Aws => {
                let name = self.device_name.trim();
                if name.is_empty() {
                    return Err(CoreError::Precondition("请先输入设备名称".to_string()));
                }
                payload.insert("device_name".to_string(), Value::String(name.to_string()));
            }
            Vendor::Azure => {
                let caching = self
                    .caching_type
                    .ok_or_else(|| CoreError::Precondition("请先选择缓存类型".to_string()))?;
                payload.insert(
                    "caching_type".to_string(),
                    Value::String(caching.as_str().to_string()),
                );
            }
            _ => {}
        }
        Ok(Value::Object(payload))
    }

    /// 确认挂载
    ///
    /// Preconditions are checked before any network call; every failure is
    /// also reported to the user.
    pub async fn confirm(&self) -> CoreResult<()> {
        let payload = match self.attach_payload() {
            Ok(payload) => payload,
            Err(err) => {
                self.ctx.report_error("attach disk", &err);
                return Err(err);
            }
        };

        if self.confirming.swap(true, Ordering::SeqCst) {
            let err = CoreError::Precondition("正在挂载".to_string());
            self.ctx.report_error("attach disk", &err);
            return Err(err);
        }
        log::info!("[attach-disk] {payload}");
        let result = self.ctx.transport.attach_disk(&payload).await;
        self.confirming.store(false, Ordering::SeqCst);

        match result {
            Ok(()) => {
                self.ctx
                    .notifier
                    .notify(Notice::success(self.ctx.t("挂载成功", &[])));
                Ok(())
            }
            Err(err) => {
                self.ctx.report_error("attach disk", &err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn host(vendor: Vendor) -> HostDetail {
        HostDetail {
            id: "cvm-1".to_string(),
            vendor,
            account_id: "acc".to_string(),
            zone: "z1".to_string(),
            region: "r1".to_string(),
            resource_group_name: Some("rg".to_string()),
        }
    }

    #[test]
    fn filter_adds_resource_group_for_azure_only() {
        assert_eq!(disk_filter(&host(Vendor::Aws)).rules.len(), 4);

        let azure = disk_filter(&host(Vendor::Azure));
        assert_eq!(azure.rules.len(), 5);
        assert_eq!(
            azure.rules[4],
            FilterRule::eq("resource_group_name", "rg")
        );
    }

    #[test]
    fn attached_disks_are_hidden() {
        let free = json!({ "id": "d1", "instance_id": "" });
        let none = json!({ "id": "d2" });
        let used = json!({ "id": "d3", "instance_id": "cvm-9" });
        for (disk, expected) in [(free, true), (none, true), (used, false)] {
            let Value::Object(map) = disk else { unreachable!() };
            assert_eq!(is_unattached(&map), expected);
        }
    }

    #[test]
    fn caching_type_parses_known_values() {
        assert_eq!("ReadOnly".parse::<CachingType>().unwrap(), CachingType::ReadOnly);
        assert!("readonly".parse::<CachingType>().is_err());
    }
}
