#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Attach-disk dialog against the mock transport.

mod common;

use hcm_console_app::dialogs::{CachingType, HostDetail};
use hcm_console_core::error::CoreError;
use hcm_console_core::services::FetchOutcome;
use hcm_console_core::traits::Theme;
use hcm_console_core::types::{FilterRule, Vendor};
use std::time::Duration;

use serde_json::json;

use common::{disks, Harness, MockTransport};

fn host(vendor: Vendor) -> HostDetail {
    HostDetail {
        id: "cvm-1".to_string(),
        vendor,
        account_id: "account-1".to_string(),
        zone: "zone-a".to_string(),
        region: "region-1".to_string(),
        resource_group_name: Some("group-1".to_string()),
    }
}

#[tokio::test]
async fn lists_only_unattached_disks() {
    let harness = Harness::new(MockTransport::with_records(disks(6)));
    let dialog = harness.state.attach_disk_dialog(host(Vendor::Azure));

    assert_eq!(dialog.load().await, FetchOutcome::Applied);

    let ids: Vec<String> = dialog
        .unattached_disks()
        .iter()
        .map(|d| d["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["disk-0", "disk-1", "disk-3", "disk-4"]);
    // fields nested under `spec` are lifted onto the rows
    assert_eq!(dialog.unattached_disks()[0]["disk_size"], json!(50));

    let (collection, request) = &harness.transport.list_requests()[0];
    assert_eq!(collection, "disks");
    assert!(request
        .filter
        .rules
        .contains(&FilterRule::eq("resource_group_name", "group-1")));
}

#[tokio::test]
async fn preconditions_block_the_network_call() {
    let harness = Harness::new(MockTransport::with_records(disks(3)));
    let mut dialog = harness.state.attach_disk_dialog(host(Vendor::Aws));
    dialog.load().await;

    let err = dialog.confirm().await.unwrap_err();
    assert_eq!(err, CoreError::Precondition("请先选择云硬盘".to_string()));

    assert!(!dialog.select("disk-2"), "attached disk cannot be chosen");
    assert!(dialog.select("disk-0"));
    let err = dialog.confirm().await.unwrap_err();
    assert_eq!(err, CoreError::Precondition("请先输入设备名称".to_string()));

    assert!(harness.transport.attachments().is_empty());
    assert_eq!(harness.notifier.notices().len(), 2);
    assert!(!dialog.is_confirming());

    dialog.set_device_name("/dev/sdf");
    dialog.confirm().await.unwrap();
    assert_eq!(
        harness.transport.attachments(),
        vec![json!({ "disk_id": "disk-0", "cvm_id": "cvm-1", "device_name": "/dev/sdf" })]
    );
    assert_eq!(harness.notifier.notices()[2].theme, Theme::Success);
}

#[tokio::test]
async fn azure_requires_caching_type() {
    let harness = Harness::new(MockTransport::with_records(disks(2)));
    let mut dialog = harness.state.attach_disk_dialog(host(Vendor::Azure));
    dialog.load().await;
    dialog.select("disk-1");

    assert_eq!(
        dialog.confirm().await.unwrap_err(),
        CoreError::Precondition("请先选择缓存类型".to_string())
    );

    dialog.set_caching_type(CachingType::ReadOnly);
    dialog.confirm().await.unwrap();
    assert_eq!(harness.transport.attachments()[0]["caching_type"], json!("ReadOnly"));
}

#[tokio::test]
async fn transport_failure_shows_backend_message() {
    let harness = Harness::new(MockTransport::with_records(disks(2)));
    harness.transport.fail_next_attach("disk is being created");
    let mut dialog = harness.state.attach_disk_dialog(host(Vendor::TCloud));
    dialog.load().await;
    dialog.select("disk-0");

    assert!(dialog.confirm().await.is_err());
    let notices = harness.notifier.notices();
    assert_eq!(notices[0].theme, Theme::Error);
    assert_eq!(notices[0].message, "disk is being created");
    assert!(!dialog.is_confirming());
}

#[tokio::test]
async fn overlapping_confirm_is_refused_and_reported() {
    let transport =
        MockTransport::with_records(disks(2)).with_attach_delay(Duration::from_millis(20));
    let harness = Harness::new(transport);
    let mut dialog = harness.state.attach_disk_dialog(host(Vendor::TCloud));
    dialog.load().await;
    dialog.select("disk-0");

    let (first, second) = tokio::join!(dialog.confirm(), dialog.confirm());
    assert!(first.is_ok());
    assert_eq!(second.unwrap_err(), CoreError::Precondition("正在挂载".to_string()));

    assert_eq!(harness.transport.attachments().len(), 1);
    let themes: Vec<Theme> = harness.notifier.notices().iter().map(|n| n.theme).collect();
    assert_eq!(themes, vec![Theme::Error, Theme::Success]);
    assert!(!dialog.is_confirming());
}
