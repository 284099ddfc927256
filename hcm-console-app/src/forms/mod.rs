//! 资源申请表单

mod cvm;
mod vpc;

pub use cvm::{cvm_schema, data_disk_defaults, gcp_data_disk_defaults, CvmForm, CVM_VOLATILE_KEYS};
pub use vpc::{vpc_schema, VpcForm};

use serde_json::{Map, Value};

use hcm_console_core::error::{CoreError, CoreResult};
use hcm_console_core::services::Validator;
use hcm_console_core::types::{Condition, SubmitTarget, Vendor};

/// 资源名称规则说明
pub const NAME_RULE_MESSAGE: &str = "不超过60个字符，允许字母、数字、中文字符，'-'、'_'、'.'";

/// Letters, digits, CJK, `-`, `_` and `.`; length is checked by `MaxLength(60)`.
pub fn name_rule() -> CoreResult<Validator> {
    Validator::pattern(r"^[\w\x{4e00}-\x{9fa5}\-.]*$", NAME_RULE_MESSAGE)
}

/// The condition must be fully selected before anything is sent.
pub(crate) fn require_vendor(cond: &Condition) -> CoreResult<Vendor> {
    match cond.vendor {
        Some(vendor) if !cond.is_empty() => Ok(vendor),
        _ => Err(CoreError::Precondition(
            "请先选择业务、云账号、云厂商和地域".to_string(),
        )),
    }
}

pub(crate) fn submit_target(cond: &Condition, kind: &str) -> CoreResult<SubmitTarget> {
    Ok(SubmitTarget::new(require_vendor(cond)?, kind))
}

/// 附加业务 ID、账号 ID 与地域
pub(crate) fn attach_context(cond: &Condition, payload: &mut Map<String, Value>) {
    payload.insert("bk_biz_id".to_string(), cond.biz_id.map_or(Value::Null, Value::from));
    payload.insert(
        "account_id".to_string(),
        cond.cloud_account_id.clone().map_or(Value::Null, Value::String),
    );
    payload.insert(
        "region".to_string(),
        cond.region.clone().map_or(Value::Null, Value::String),
    );
}

/// Azure 资源组
pub(crate) fn attach_resource_group(cond: &Condition, payload: &mut Map<String, Value>) {
    payload.insert(
        "resource_group_name".to_string(),
        cond.resource_group.clone().map_or(Value::Null, Value::String),
    );
}
