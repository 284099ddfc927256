//! HCM Console Core Library
//!
//! 资源管理控制台的领域层，包括：
//! - 列表查询控制器（分页、排序、过滤，请求按序号防乱序）
//! - 按云厂商参数化的表单引擎（初始值、条件变化时的字段重置）
//! - 字段可见性与校验
//! - VPC 网段约束
//! - 表单提交流程
//!
//! 本库与平台无关：传输、通知、导航、翻译都通过 trait 注入。

pub mod error;
pub mod services;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult};
pub use services::ServiceContext;
pub use traits::{Navigator, Notifier, ResourceTransport, Translator};
