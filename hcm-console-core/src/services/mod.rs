//! 业务逻辑服务层

mod cidr_constraint;
mod field_visibility;
mod list_query_service;
mod submission_service;
mod vendor_form;

pub use cidr_constraint::{
    AddressBlock, CidrClass, CidrConstraint, ComponentRange, OCTET_RANGE, SUBNET_BLOCK_RANGE,
    SUBNET_MASK_RANGE,
};
pub use field_visibility::{
    active_fields, active_ids, as_integer, validate_active, ActiveField, FieldDescriptor,
    SelectionState, Validator, Visibility,
};
pub use list_query_service::{
    FetchOutcome, ListFetcher, ListQuery, ListQueryController, ListQueryState, PairedFetcher,
};
pub use submission_service::{
    FormSubmission, SubmissionFlow, SubmitOutcome, SubmitState, DEFAULT_SUCCESS_PATH,
};
pub use vendor_form::{FormSchema, VendorForm};

use std::sync::Arc;

use crate::error::CoreError;
use crate::traits::{Navigator, Notice, Notifier, ResourceTransport, Translator};

/// 服务上下文 - 持有所有协作者
///
/// 平台层需要创建此上下文，并注入平台特定的传输、通知、导航与翻译实现。
pub struct ServiceContext {
    /// 传输层
    pub transport: Arc<dyn ResourceTransport>,
    /// 通知
    pub notifier: Arc<dyn Notifier>,
    /// 导航
    pub navigator: Arc<dyn Navigator>,
    /// 翻译
    pub translator: Arc<dyn Translator>,
}

impl ServiceContext {
    /// 创建服务上下文
    #[must_use]
    pub fn new(
        transport: Arc<dyn ResourceTransport>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        Self {
            transport,
            notifier,
            navigator,
            translator,
        }
    }

    /// 翻译文案
    pub fn t(&self, key: &str, params: &[(&str, &str)]) -> String {
        self.translator.translate(key, params)
    }

    /// 记录错误并弹出错误通知
    ///
    /// 预期内的错误（用户输入等）记 `warn`，其余记 `error`。
    pub fn report_error(&self, action: &str, err: &CoreError) {
        if err.is_expected() {
            log::warn!("{action} rejected: {err}");
        } else {
            log::error!("{action} failed: {err}");
        }
        self.notifier.notify(Notice::error(err.user_message()));
    }
}
