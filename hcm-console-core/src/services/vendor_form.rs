//! 按云厂商参数化的表单状态
//!
//! 初始值 = 厂商无关的 base 叠加该厂商的 diff；条件（业务、账号、厂商、地域）
//! 变化时只重置一组固定的易变字段，用户在其它字段上的输入保持不变。

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};
use crate::types::{Condition, FieldErrors, Vendor};
use crate::utils::{get_path, set_path};

/// Defaults of one form: a vendor-invariant base plus per-vendor overlays.
#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    base: Map<String, Value>,
    vendor_diff: HashMap<Vendor, Map<String, Value>>,
    volatile_keys: Vec<String>,
}

fn expect_object(what: &str, value: Value) -> CoreResult<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(CoreError::InvalidConfig(format!(
            "{what} must be a JSON object, got {other}"
        ))),
    }
}

impl FormSchema {
    /// Schema with the given vendor-invariant defaults.
    pub fn new(base: Value) -> CoreResult<Self> {
        Ok(Self {
            base: expect_object("form base", base)?,
            ..Self::default()
        })
    }

    /// Overlay for `vendor`. Its keys may add fields the base does not have.
    pub fn with_vendor_diff(mut self, vendor: Vendor, diff: Value) -> CoreResult<Self> {
        let diff = expect_object(&format!("{vendor} diff"), diff)?;
        self.vendor_diff.insert(vendor, diff);
        Ok(self)
    }

    /// Keys restored to vendor defaults whenever the condition changes.
    #[must_use]
    pub fn with_volatile_keys(mut self, keys: &[&str]) -> Self {
        self.volatile_keys = keys.iter().map(ToString::to_string).collect();
        self
    }

    /// `base` shallow-merged with `vendor`'s diff (diff keys win).
    ///
    /// Pure: called both for the initial state and on every reset.
    pub fn resolve(&self, vendor: Option<Vendor>) -> Map<String, Value> {
        let mut resolved = self.base.clone();
        if let Some(diff) = vendor.and_then(|v| self.vendor_diff.get(&v)) {
            for (key, value) in diff {
                resolved.insert(key.clone(), value.clone());
            }
        }
        resolved
    }

    /// `keys(base) ∪ keys(diff[vendor])`
    pub fn field_keys(&self, vendor: Option<Vendor>) -> BTreeSet<String> {
        self.resolve(vendor).into_iter().map(|(k, _)| k).collect()
    }

    pub fn volatile_keys(&self) -> &[String] {
        &self.volatile_keys
    }
}

/// Live state of one form session.
pub struct VendorForm {
    schema: Arc<FormSchema>,
    condition: Condition,
    state: Map<String, Value>,
    errors: FieldErrors,
}

impl VendorForm {
    /// 以条件中的厂商默认值初始化表单
    pub fn new(schema: Arc<FormSchema>, condition: Condition) -> Self {
        let state = schema.resolve(condition.vendor);
        Self {
            schema,
            condition,
            state,
            errors: FieldErrors::default(),
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    pub fn vendor(&self) -> Option<Vendor> {
        self.condition.vendor
    }

    pub fn state(&self) -> &Map<String, Value> {
        &self.state
    }

    /// Mutable access to one field of the current field set (表现层双向绑定用).
    ///
    /// Fields cannot be added or removed through it.
    pub fn field_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.state.get_mut(key)
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        get_path(&self.state, path)
    }

    /// Write `value` at `path`.
    ///
    /// Refused (`false`) when the top-level key is not part of the current
    /// vendor's field set.
    pub fn set(&mut self, path: &str, value: Value) -> bool {
        let key = path.split('.').next().unwrap_or(path);
        if !self.state.contains_key(key) {
            log::debug!("[form] {key} is not a field for {:?}", self.condition.vendor);
            return false;
        }
        set_path(&mut self.state, path, value)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn set_errors(&mut self, errors: FieldErrors) {
        self.errors = errors;
    }

    /// 清除字段校验错误
    pub fn clear_validate(&mut self) {
        self.errors.clear();
    }

    /// 条件变化
    ///
    /// Side effects, in order:
    /// 1. the field set becomes `keys(base) ∪ keys(diff[vendor])`: fields of the
    ///    previous vendor's shape are dropped, new ones get their defaults;
    /// 2. every volatile key is restored to the new vendor's default;
    /// 3. pending field errors are cleared.
    ///
    /// All of it happens before returning, so the field set and the errors
    /// never disagree. Returns `false` (and does nothing) when the condition
    /// did not actually change.
    pub fn on_condition_changed(&mut self, condition: Condition) -> bool {
        if condition == self.condition {
            return false;
        }
        let previous = self.condition.vendor;
        self.condition = condition;
        self.reset_volatile();
        log::debug!(
            "[form] condition changed (vendor {previous:?} -> {:?}), volatile fields reset",
            self.condition.vendor
        );
        true
    }

    /// Restore the volatile subset to the current vendor's defaults.
    pub fn reset_volatile(&mut self) {
        let defaults = self.schema.resolve(self.condition.vendor);

        self.state.retain(|key, _| defaults.contains_key(key));
        for (key, value) in &defaults {
            if !self.state.contains_key(key) {
                self.state.insert(key.clone(), value.clone());
            }
        }

        for key in self.schema.volatile_keys() {
            match defaults.get(key) {
                Some(value) => {
                    self.state.insert(key.clone(), value.clone());
                }
                None => {
                    self.state.remove(key);
                }
            }
        }

        self.clear_validate();
    }

    /// Restore one top-level field to the current vendor's default.
    ///
    /// A key the current vendor does not define is removed.
    pub fn reset_field(&mut self, key: &str) {
        let defaults = self.schema.resolve(self.condition.vendor);
        match defaults.get(key) {
            Some(value) => {
                self.state.insert(key.to_string(), value.clone());
            }
            None => {
                self.state.remove(key);
            }
        }
    }
}
