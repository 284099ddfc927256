//! 控制台配置

use serde::{Deserialize, Serialize};

use hcm_console_core::error::{CoreError, CoreResult};
use hcm_console_core::services::DEFAULT_SUCCESS_PATH;
use hcm_console_core::types::ListQueryConfig;

/// Console-wide settings. Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsoleConfig {
    /// API 前缀，例如 `https://hcm.example.com`
    pub api_prefix: String,
    /// 列表分页配置
    pub list_query: ListQueryConfig,
    /// 申请提交成功后的跳转路径
    pub success_path: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_prefix: String::new(),
            list_query: ListQueryConfig::default(),
            success_path: DEFAULT_SUCCESS_PATH.to_string(),
        }
    }
}

impl ConsoleConfig {
    /// # Errors
    /// Returns `CoreError::InvalidConfig` on malformed JSON or a zero page size.
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CoreError::InvalidConfig(format!("invalid console config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CoreResult<()> {
        if self.list_query.default_page_size == 0 || self.list_query.filter_reset_page_size == 0 {
            return Err(CoreError::InvalidConfig(
                "page sizes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
