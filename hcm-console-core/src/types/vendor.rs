//! 云厂商与条件元组

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Cloud vendor supported by the console.
///
/// Each vendor ships its own shape for the same logical resource, so most
/// form and payload code branches on this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    /// Tencent Cloud
    #[serde(rename = "tcloud")]
    TCloud,
    /// Amazon Web Services
    Aws,
    /// Microsoft Azure
    Azure,
    /// Google Cloud Platform
    Gcp,
    /// Huawei Cloud
    Huawei,
}

impl Vendor {
    /// All vendors, in display order.
    pub fn all() -> &'static [Vendor] {
        &[
            Vendor::TCloud,
            Vendor::Aws,
            Vendor::Azure,
            Vendor::Gcp,
            Vendor::Huawei,
        ]
    }

    /// Wire identifier (`"tcloud"`, `"aws"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Vendor::TCloud => "tcloud",
            Vendor::Aws => "aws",
            Vendor::Azure => "azure",
            Vendor::Gcp => "gcp",
            Vendor::Huawei => "huawei",
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Vendor {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Vendor::all()
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| CoreError::UnknownVendor(s.to_string()))
    }
}

/// 条件元组：业务、账号、厂商、地域（Azure 另有资源组）
///
/// 表单与列表的配置由它决定；任一字段变化都会触发表单易变字段的重置。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// 业务 ID
    pub biz_id: Option<i64>,
    /// 云账号 ID
    pub cloud_account_id: Option<String>,
    /// 云厂商
    pub vendor: Option<Vendor>,
    /// 地域
    pub region: Option<String>,
    /// 资源组（仅 Azure）
    pub resource_group: Option<String>,
}

impl Condition {
    /// 条件是否尚未选全（业务、账号、厂商、地域任一缺失）
    pub fn is_empty(&self) -> bool {
        self.biz_id.is_none()
            || self.cloud_account_id.as_deref().is_none_or(str::is_empty)
            || self.vendor.is_none()
            || self.region.as_deref().is_none_or(str::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_parses_wire_names() {
        for vendor in Vendor::all() {
            assert_eq!(vendor.as_str().parse::<Vendor>().unwrap(), *vendor);
        }
        assert!(matches!(
            "alibaba".parse::<Vendor>(),
            Err(CoreError::UnknownVendor(_))
        ));
    }

    #[test]
    fn vendor_serializes_lowercase() {
        let json = serde_json::to_string(&Vendor::TCloud).unwrap();
        assert_eq!(json, "\"tcloud\"");
        let v: Vendor = serde_json::from_str("\"huawei\"").unwrap();
        assert_eq!(v, Vendor::Huawei);
    }

    #[test]
    fn condition_emptiness() {
        let mut cond = Condition::default();
        assert!(cond.is_empty());

        cond.biz_id = Some(2);
        cond.cloud_account_id = Some("acc-1".to_string());
        cond.vendor = Some(Vendor::Aws);
        cond.region = Some(String::new());
        assert!(cond.is_empty());

        cond.region = Some("ap-guangzhou".to_string());
        assert!(!cond.is_empty());
    }
}
