//! 表单相关类型定义

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Vendor;

/// A validation failure bound to one property path (e.g. `subnet.name`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// 属性路径
    pub property: String,
    /// 可读错误信息
    pub message: String,
}

impl FieldError {
    pub fn new(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            message: message.into(),
        }
    }
}

/// Field-level errors of one validation pass, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(pub Vec<FieldError>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub fn extend(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// First error reported for `property`.
    pub fn get(&self, property: &str) -> Option<&FieldError> {
        self.0.iter().find(|e| e.property == property)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.property, e.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Where a create request is sent: `vendors/{vendor}/applications/types/{kind}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitTarget {
    pub vendor: Vendor,
    /// 申请单类型，例如 `create_cvm`
    pub kind: String,
}

impl SubmitTarget {
    pub fn new(vendor: Vendor, kind: impl Into<String>) -> Self {
        Self {
            vendor,
            kind: kind.into(),
        }
    }
}
