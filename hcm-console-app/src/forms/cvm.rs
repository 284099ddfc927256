//! 主机（CVM）创建申请表单

use std::sync::Arc;

use serde_json::{json, Map, Value};

use hcm_console_core::error::{CoreError, CoreResult};
use hcm_console_core::services::{
    active_fields, as_integer, validate_active, ActiveField, FieldDescriptor, FormSchema, FormSubmission,
    SelectionState, Validator, VendorForm, Visibility,
};
use hcm_console_core::types::{Condition, FieldError, FieldErrors, SubmitTarget, Vendor};

use super::{attach_context, attach_resource_group, name_rule, require_vendor, submit_target};

/// Fields restored to vendor defaults whenever the condition changes.
pub const CVM_VOLATILE_KEYS: &[&str] = &[
    "zone",
    "instance_type",
    "cloud_image_id",
    "cloud_vpc_id",
    "cloud_subnet_id",
    "cloud_security_group_ids",
    "data_disk",
    "public_ip_assigned",
    "instance_charge_type",
    "auto_renew",
];

/// 新增数据盘的默认行
pub fn data_disk_defaults() -> Value {
    json!({ "disk_type": "", "disk_size_gb": 50, "disk_count": 1 })
}

/// GCP 数据盘多出名称、模式和自动删除
pub fn gcp_data_disk_defaults() -> Value {
    json!({
        "disk_type": "",
        "disk_size_gb": 50,
        "disk_count": 1,
        "disk_name": "",
        "mode": "READ_WRITE",
        "auto_delete": false
    })
}

/// Defaults of the CVM form.
pub fn cvm_schema() -> CoreResult<FormSchema> {
    let schema = FormSchema::new(json!({
        "zone": [],
        "name": "",
        "instance_type": "",
        "cloud_image_id": "",
        "cloud_vpc_id": "",
        "cloud_subnet_id": "",
        "system_disk": { "disk_type": "", "disk_size_gb": 50 },
        "data_disk": [],
        "password": "",
        "confirmed_password": "",
        "purchase_duration": { "count": 1, "unit": "m" },
        "required_count": 1,
        "memo": ""
    }))?
    .with_vendor_diff(
        Vendor::TCloud,
        json!({
            "instance_charge_type": "PREPAID",
            "public_ip_assigned": false,
            "cloud_security_group_ids": [],
            "auto_renew": false
        }),
    )?
    .with_vendor_diff(
        Vendor::Aws,
        json!({ "public_ip_assigned": false, "cloud_security_group_ids": [] }),
    )?
    .with_vendor_diff(
        Vendor::Azure,
        json!({ "username": "", "cloud_security_group_ids": "" }),
    )?
    .with_vendor_diff(Vendor::Gcp, json!({ "data_disk": [] }))?
    .with_vendor_diff(
        Vendor::Huawei,
        json!({
            "public_ip_assigned": false,
            "instance_charge_type": "prePaid",
            "cloud_security_group_ids": [],
            "auto_renew": false
        }),
    )?
    .with_volatile_keys(CVM_VOLATILE_KEYS);
    Ok(schema)
}

fn prepaid_vendors() -> Visibility {
    Visibility::VendorIn(vec![Vendor::TCloud, Vendor::Huawei])
}

fn cvm_tree() -> CoreResult<Vec<FieldDescriptor>> {
    Ok(vec![
        FieldDescriptor::group("network", "网络与地域").children(vec![
            FieldDescriptor::field("可用区", "zone").required(),
            FieldDescriptor::field("所属VPC", "cloud_vpc_id").required(),
            FieldDescriptor::field("子网", "cloud_subnet_id").required(),
            FieldDescriptor::field("自动分配公网IP", "public_ip_assigned").visible_when(
                Visibility::VendorIn(vec![Vendor::TCloud, Vendor::Aws, Vendor::Huawei]),
            ),
            FieldDescriptor::field("安全组", "cloud_security_group_ids")
                .required()
                .visible_when(Visibility::except(Vendor::Gcp)),
        ]),
        FieldDescriptor::group("instance", "实例配置").children(vec![
            FieldDescriptor::field("名称", "name")
                .required()
                .validate(Validator::MaxLength(60))
                .validate(name_rule()?),
            FieldDescriptor::field("机型", "instance_type").required(),
            FieldDescriptor::field("镜像", "cloud_image_id").required(),
            FieldDescriptor::group("system_disk", "系统盘").children(vec![
                FieldDescriptor::field("系统盘类型", "system_disk.disk_type").required(),
                FieldDescriptor::field("系统盘大小", "system_disk.disk_size_gb").required(),
            ]),
            FieldDescriptor::field("数据盘", "data_disk"),
        ]),
        FieldDescriptor::group("login", "登录").children(vec![
            FieldDescriptor::field("用户名", "username")
                .required()
                .visible_when(Visibility::only(Vendor::Azure)),
            FieldDescriptor::field("密码", "password").required(),
            FieldDescriptor::field("确认密码", "confirmed_password")
                .required()
                .validate(Validator::custom("两次输入的密码不一致", |value, form| {
                    form.get("password") == Some(value)
                })),
        ]),
        FieldDescriptor::group("billing", "计费").children(vec![
            FieldDescriptor::field("计费模式", "instance_charge_type")
                .required()
                .visible_when(prepaid_vendors()),
            FieldDescriptor::field("购买时长", "purchase_duration.count")
                .required()
                .visible_when(prepaid_vendors())
                .validate(Validator::Range { min: 1, max: 60 }),
            FieldDescriptor::field("自动续费", "auto_renew").visible_when(prepaid_vendors()),
            FieldDescriptor::field("购买数量", "required_count")
                .required()
                .validate(Validator::Range { min: 1, max: 100 }),
            FieldDescriptor::field("申请单备注", "memo").validate(Validator::MaxLength(255)),
        ]),
    ])
}

/// 主机创建表单
pub struct CvmForm {
    form: VendorForm,
    tree: Vec<FieldDescriptor>,
}

impl CvmForm {
    pub fn new(condition: Condition) -> CoreResult<Self> {
        Ok(Self {
            form: VendorForm::new(Arc::new(cvm_schema()?), condition),
            tree: cvm_tree()?,
        })
    }

    pub fn form(&self) -> &VendorForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut VendorForm {
        &mut self.form
    }

    pub fn selection(&self) -> SelectionState {
        SelectionState::new(self.form.vendor())
    }

    /// Fields visible for the current vendor.
    pub fn active_fields(&self) -> Vec<ActiveField<'_>> {
        active_fields(&self.tree, &self.selection())
    }

    /// See [`VendorForm::on_condition_changed`].
    pub fn on_condition_changed(&mut self, condition: Condition) -> bool {
        self.form.on_condition_changed(condition)
    }

    /// Append a data-disk row with the vendor's defaults.
    pub fn add_data_disk(&mut self) {
        let row = if self.form.vendor() == Some(Vendor::Gcp) {
            gcp_data_disk_defaults()
        } else {
            data_disk_defaults()
        };
        match self.form.field_mut("data_disk") {
            Some(Value::Array(rows)) => rows.push(row),
            _ => {
                self.form.set("data_disk", Value::Array(vec![row]));
            }
        }
    }

    pub fn remove_data_disk(&mut self, index: usize) {
        if let Some(Value::Array(rows)) = self.form.field_mut("data_disk") {
            if index < rows.len() {
                rows.remove(index);
            }
        }
    }

    /// Vendor-specific save payload built from the live form.
    pub fn save_data(&self) -> CoreResult<Value> {
        let cond = self.form.condition();
        let vendor = require_vendor(cond)?;

        let mut payload: Map<String, Value> = self.form.state().clone();
        let duration = payload.remove("purchase_duration");
        let public_ip = payload.remove("public_ip_assigned");
        attach_context(cond, &mut payload);

        let zone = match payload.get("zone") {
            Some(Value::Array(zones)) => zones.first().cloned().unwrap_or(Value::Null),
            Some(other) => other.clone(),
            None => Value::Null,
        };
        payload.insert("zone".to_string(), zone);

        match vendor {
            Vendor::TCloud | Vendor::Huawei => {
                payload.insert("public_ip_assigned".to_string(), public_ip.unwrap_or(Value::Bool(false)));
                payload.insert(
                    "instance_charge_paid_period".to_string(),
                    Value::from(paid_period(duration.as_ref())?),
                );
            }
            Vendor::Aws => {
                payload.insert("public_ip_assigned".to_string(), public_ip.unwrap_or(Value::Bool(false)));
            }
            Vendor::Azure => {
                attach_resource_group(cond, &mut payload);
                let groups = match payload.remove("cloud_security_group_ids") {
                    Some(Value::Array(groups)) => Value::Array(groups),
                    Some(group) => Value::Array(vec![group]),
                    None => Value::Array(Vec::new()),
                };
                payload.insert("cloud_security_group_ids".to_string(), groups);
            }
            Vendor::Gcp => {}
        }

        Ok(Value::Object(payload))
    }
}

/// 购买时长折算为月
///
/// `count` may be a number or numeric text; anything else is a validation error.
fn paid_period(duration: Option<&Value>) -> CoreResult<i64> {
    let count = duration
        .and_then(|d| d.get("count"))
        .and_then(as_integer)
        .ok_or_else(|| {
            CoreError::Validation(FieldErrors(vec![FieldError::new(
                "purchase_duration.count",
                "购买时长必须为整数",
            )]))
        })?;
    let months = match duration.and_then(|d| d.get("unit")).and_then(Value::as_str) {
        Some("y") => 12,
        _ => 1,
    };
    Ok(count * months)
}

impl FormSubmission for CvmForm {
    fn validate(&mut self) -> FieldErrors {
        let errors = validate_active(&self.active_fields(), self.form.state());
        self.form.set_errors(errors.clone());
        errors
    }

    fn payload(&self) -> CoreResult<Value> {
        self.save_data()
    }

    fn target(&self) -> CoreResult<SubmitTarget> {
        submit_target(self.form.condition(), "create_cvm")
    }
}
