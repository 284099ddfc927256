//! VPC 创建申请表单

use std::sync::Arc;

use serde_json::{json, Map, Value};

use hcm_console_core::error::{CoreError, CoreResult};
use hcm_console_core::services::{
    active_fields, validate_active, ActiveField, AddressBlock, CidrConstraint, FieldDescriptor,
    FormSchema, FormSubmission, SelectionState, Validator, VendorForm, Visibility,
};
use hcm_console_core::types::{Condition, FieldError, FieldErrors, SubmitTarget, Vendor};
use hcm_console_core::utils::{get_path, set_path};

use super::{attach_context, attach_resource_group, name_rule, require_vendor, submit_target};

const VPC_CIDR: &str = "ipv4_cidr";
const SUBNET_CIDR: &str = "subnet.ipv4_cidr";

/// Defaults of the VPC form.
pub fn vpc_schema() -> CoreResult<FormSchema> {
    let schema = FormSchema::new(json!({
        "name": "",
        "ip_source_type": 0,
        "ipv4_cidr": [10, 0, 0, 0, 16],
        "bk_cloud_id": null,
        "subnet": {
            "name": "",
            "ipv4_cidr": [10, 0, 0, 0, 24],
            "zone": "",
            "ipv6_enable": false,
            "private_ip_google_access": false,
            "enable_flow_logs": false
        }
    }))?
    .with_vendor_diff(Vendor::Aws, json!({ "type": 0, "instance_tenancy": "default" }))?
    .with_vendor_diff(
        Vendor::Azure,
        json!({ "bastion_host_enable": false, "ddos_enable": false, "firewall_enable": false }),
    )?
    .with_vendor_diff(Vendor::Gcp, json!({ "routing_mode": "REGIONAL" }))?;
    Ok(schema)
}

fn vpc_tree() -> CoreResult<Vec<FieldDescriptor>> {
    let azure_only = || Visibility::only(Vendor::Azure);
    Ok(vec![
        FieldDescriptor::group("type", "VPC类型")
            .visible_when(Visibility::only(Vendor::Aws))
            .children(vec![FieldDescriptor::field("类型", "type")]),
        FieldDescriptor::group("network", "VPC网络信息").children(vec![
            FieldDescriptor::field("名称", "name")
                .required()
                .validate(Validator::MaxLength(60))
                .validate(name_rule()?),
            FieldDescriptor::field("IP来源类型", "ip_source_type")
                .required()
                .visible_when(Visibility::VendorIn(vec![
                    Vendor::TCloud,
                    Vendor::Azure,
                    Vendor::Huawei,
                ])),
            FieldDescriptor::field("IPv4 CIDR", VPC_CIDR)
                .required()
                .visible_when(Visibility::except(Vendor::Gcp)),
            FieldDescriptor::field("管控区域", "bk_cloud_id").required(),
            FieldDescriptor::field("BastionHost", "bastion_host_enable").visible_when(azure_only()),
            FieldDescriptor::field("DDoS 保护标准", "ddos_enable").visible_when(azure_only()),
            FieldDescriptor::field("防火墙", "firewall_enable").visible_when(azure_only()),
            FieldDescriptor::field("租期", "instance_tenancy")
                .required()
                .visible_when(Visibility::only(Vendor::Aws)),
            FieldDescriptor::group("enterprise_project", "企业项目")
                .visible_when(Visibility::only(Vendor::Huawei)),
            FieldDescriptor::field("动态路由模式", "routing_mode")
                .required()
                .visible_when(Visibility::only(Vendor::Gcp)),
        ]),
        FieldDescriptor::group("subnet", "初始子网信息")
            .visible_when(Visibility::except(Vendor::Aws))
            .children(vec![
                FieldDescriptor::field("名称", "subnet.name")
                    .required()
                    .validate(Validator::MaxLength(60))
                    .validate(name_rule()?),
                FieldDescriptor::field("IPv4 CIDR", SUBNET_CIDR).required(),
                FieldDescriptor::field("可用区", "subnet.zone")
                    .required()
                    .visible_when(Visibility::only(Vendor::TCloud)),
                FieldDescriptor::field("子网IPv6网段", "subnet.ipv6_enable")
                    .visible_when(Visibility::only(Vendor::Huawei)),
                FieldDescriptor::group("route_table", "关联路由表")
                    .visible_when(Visibility::VendorIn(vec![Vendor::TCloud, Vendor::Huawei])),
                FieldDescriptor::field("专用访问通道", "subnet.private_ip_google_access")
                    .visible_when(Visibility::only(Vendor::Gcp)),
                FieldDescriptor::field("流日志", "subnet.enable_flow_logs")
                    .visible_when(Visibility::only(Vendor::Gcp)),
                FieldDescriptor::group("firewall_rules", "防火墙规则")
                    .visible_when(Visibility::only(Vendor::Gcp)),
            ]),
    ])
}

/// Bound property paths of the visible fields, in pre-order.
fn visible_properties(active: &[ActiveField<'_>]) -> Vec<String> {
    let mut paths = Vec::new();
    for field in active {
        if let Some(property) = &field.descriptor.property {
            paths.push(property.clone());
        }
        paths.extend(visible_properties(&field.children));
    }
    paths
}

/// VPC 创建表单
pub struct VpcForm {
    form: VendorForm,
    tree: Vec<FieldDescriptor>,
}

impl VpcForm {
    pub fn new(condition: Condition) -> CoreResult<Self> {
        let mut vpc = Self {
            form: VendorForm::new(Arc::new(vpc_schema()?), condition),
            tree: vpc_tree()?,
        };
        let first = vpc.cidr()?.blocks[0];
        vpc.set_cidr_component(0, first)?;
        Ok(vpc)
    }

    pub fn form(&self) -> &VendorForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut VendorForm {
        &mut self.form
    }

    pub fn active_fields(&self) -> Vec<ActiveField<'_>> {
        active_fields(&self.tree, &SelectionState::new(self.form.vendor()))
    }

    fn constraint(&self) -> CidrConstraint {
        CidrConstraint::new(self.form.vendor())
    }

    /// 条件变化：字段集按新厂商重建，子网可用区随地域失效
    pub fn on_condition_changed(&mut self, condition: Condition) -> bool {
        if !self.form.on_condition_changed(condition) {
            return false;
        }
        self.form.set("subnet.zone", Value::String(String::new()));
        true
    }

    pub fn cidr(&self) -> CoreResult<AddressBlock> {
        self.block_at(VPC_CIDR)
    }

    pub fn subnet_cidr(&self) -> CoreResult<AddressBlock> {
        self.block_at(SUBNET_CIDR)
    }

    fn block_at(&self, path: &str) -> CoreResult<AddressBlock> {
        let value = self.form.get(path).ok_or_else(|| {
            CoreError::Validation(FieldErrors(vec![FieldError::new(path, "missing address block")]))
        })?;
        AddressBlock::from_value(value)
    }

    /// Edit one VPC CIDR component (`0..=3` blocks, `4` mask).
    ///
    /// A new block 1 re-applies the class constraints; blocks 1 and 2 are
    /// mirrored into the subnet CIDR.
    pub fn set_cidr_component(&mut self, index: usize, value: u16) -> CoreResult<()> {
        let mut block = self.cidr()?;
        match index {
            0..=3 => block.blocks[index] = value,
            4 => block.mask = value,
            _ => return Err(component_error(VPC_CIDR, index)),
        }
        if index == 0 {
            let class = self.constraint().on_first_block_changed(&mut block)?;
            log::debug!("[vpc] first block {} -> {class:?}", block.blocks[0]);
        }
        self.form.set(VPC_CIDR, block.to_value());

        if index <= 1 {
            let mut subnet = self.subnet_cidr()?;
            block.mirror_into(&mut subnet);
            self.form.set(SUBNET_CIDR, subnet.to_value());
        }
        Ok(())
    }

    /// Edit one subnet CIDR component. Blocks 1 and 2 follow the VPC CIDR.
    pub fn set_subnet_component(&mut self, index: usize, value: u16) -> CoreResult<()> {
        let mut subnet = self.subnet_cidr()?;
        match index {
            0 | 1 => {
                return Err(CoreError::Precondition(
                    "子网前两段跟随 VPC CIDR".to_string(),
                ))
            }
            2 | 3 => subnet.blocks[index] = value,
            4 => subnet.mask = value,
            _ => return Err(component_error(SUBNET_CIDR, index)),
        }
        self.form.set(SUBNET_CIDR, subnet.to_value());
        Ok(())
    }

    /// Tree validation plus the range checks of both address blocks.
    fn collect_errors(&self) -> FieldErrors {
        let active = self.active_fields();
        let mut errors = validate_active(&active, self.form.state());
        let ids = visible_ids(&active);

        if ids.contains(&VPC_CIDR) && errors.get(VPC_CIDR).is_none() {
            match self.cidr() {
                Ok(block) => errors.extend(self.constraint().validate(VPC_CIDR, &block)),
                Err(CoreError::Validation(e)) => errors.extend(e),
                Err(e) => errors.push(FieldError::new(VPC_CIDR, e.to_string())),
            }
        }
        if ids.contains(&SUBNET_CIDR) && errors.get(SUBNET_CIDR).is_none() {
            match self.subnet_cidr() {
                Ok(block) => errors.extend(CidrConstraint::validate_subnet(SUBNET_CIDR, &block)),
                Err(CoreError::Validation(e)) => errors.extend(e),
                Err(e) => errors.push(FieldError::new(SUBNET_CIDR, e.to_string())),
            }
        }
        errors
    }

    /// Vendor-specific save payload: only visible fields, CIDRs as `a.b.c.d/m`.
    pub fn save_data(&self) -> CoreResult<Value> {
        let cond = self.form.condition();
        let vendor = require_vendor(cond)?;
        let active = self.active_fields();

        let mut payload = Map::new();
        for path in visible_properties(&active) {
            if let Some(value) = get_path(self.form.state(), &path) {
                set_path(&mut payload, &path, value.clone());
            }
        }
        for path in [VPC_CIDR, SUBNET_CIDR] {
            if get_path(&payload, path).is_some() {
                let cidr = self.block_at(path)?.to_cidr_string();
                set_path(&mut payload, path, Value::String(cidr));
            }
        }

        attach_context(cond, &mut payload);
        if vendor == Vendor::Azure {
            attach_resource_group(cond, &mut payload);
        }
        Ok(Value::Object(payload))
    }
}

fn component_error(property: &str, index: usize) -> CoreError {
    CoreError::Validation(FieldErrors(vec![FieldError::new(
        format!("{property}.{index}"),
        "no such address component",
    )]))
}

impl FormSubmission for VpcForm {
    fn validate(&mut self) -> FieldErrors {
        let errors = self.collect_errors();
        self.form.set_errors(errors.clone());
        errors
    }

    fn payload(&self) -> CoreResult<Value> {
        self.save_data()
    }

    fn target(&self) -> CoreResult<SubmitTarget> {
        submit_target(self.form.condition(), "create_vpc")
    }
}

fn visible_ids<'a>(active: &'a [ActiveField<'a>]) -> Vec<&'a str> {
    let mut ids = Vec::new();
    for field in active {
        ids.push(field.id());
        ids.extend(visible_ids(&field.children));
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcm_console_core::services::active_ids;

    fn cond(vendor: Vendor) -> Condition {
        Condition {
            biz_id: Some(3),
            cloud_account_id: Some("acc-9".to_string()),
            vendor: Some(vendor),
            region: Some("r1".to_string()),
            resource_group: Some("rg-9".to_string()),
        }
    }

    fn filled(vendor: Vendor) -> VpcForm {
        let mut vpc = VpcForm::new(cond(vendor)).unwrap();
        let f = vpc.form_mut();
        f.set("name", json!("vpc-01"));
        f.set("bk_cloud_id", json!(0));
        f.set("subnet.name", json!("subnet-01"));
        f.set("subnet.zone", json!("ap-guangzhou-3"));
        vpc
    }

    #[test]
    fn aws_hides_subnet_group_and_shows_tenancy() {
        let vpc = VpcForm::new(cond(Vendor::Aws)).unwrap();
        let ids = active_ids(&vpc.active_fields());
        assert!(ids.contains(&"type".to_string()));
        assert!(ids.contains(&"instance_tenancy".to_string()));
        assert!(!ids.iter().any(|id| id.starts_with("subnet")));
    }

    #[test]
    fn gcp_hides_vpc_cidr() {
        let vpc = VpcForm::new(cond(Vendor::Gcp)).unwrap();
        let ids = active_ids(&vpc.active_fields());
        assert!(!ids.contains(&VPC_CIDR.to_string()));
        assert!(ids.contains(&"routing_mode".to_string()));
        assert!(ids.contains(&"firewall_rules".to_string()));
    }

    #[test]
    fn first_block_change_constrains_and_mirrors() {
        let mut vpc = VpcForm::new(cond(Vendor::Huawei)).unwrap();
        vpc.set_cidr_component(4, 8).unwrap();
        vpc.set_cidr_component(0, 192).unwrap();

        assert_eq!(vpc.cidr().unwrap().to_cidr_string(), "192.168.0.0/16");
        assert_eq!(vpc.subnet_cidr().unwrap().to_cidr_string(), "192.168.0.0/24");

        vpc.set_cidr_component(0, 172).unwrap();
        vpc.set_cidr_component(1, 20).unwrap();
        let subnet = vpc.subnet_cidr().unwrap();
        assert_eq!((subnet.blocks[0], subnet.blocks[1]), (172, 20));
    }

    #[test]
    fn subnet_mirrored_blocks_are_read_only() {
        let mut vpc = VpcForm::new(cond(Vendor::TCloud)).unwrap();
        assert!(matches!(
            vpc.set_subnet_component(1, 5),
            Err(CoreError::Precondition(_))
        ));
        vpc.set_subnet_component(2, 5).unwrap();
        assert_eq!(vpc.subnet_cidr().unwrap().blocks[2], 5);
    }

    #[test]
    fn tcloud_mask_below_table_is_invalid() {
        let mut vpc = filled(Vendor::TCloud);
        assert!(vpc.validate().is_empty());

        vpc.set_cidr_component(4, 10).unwrap();
        let errors = vpc.validate();
        assert!(errors.get("ipv4_cidr.4").is_some());
        assert_eq!(vpc.form().errors(), &errors);
    }

    #[test]
    fn missing_cidr_is_reported_once() {
        let mut vpc = filled(Vendor::Huawei);
        vpc.form_mut().set(VPC_CIDR, Value::Null);

        let errors = vpc.validate();
        let on_cidr: Vec<_> = errors.iter().filter(|e| e.property == VPC_CIDR).collect();
        assert_eq!(on_cidr.len(), 1);
    }

    #[test]
    fn payload_keeps_visible_fields_and_formats_cidr() {
        let vpc = filled(Vendor::Azure);
        let payload = vpc.save_data().unwrap();

        assert_eq!(payload["ipv4_cidr"], json!("10.0.0.0/16"));
        assert_eq!(payload["subnet"]["ipv4_cidr"], json!("10.0.0.0/24"));
        assert_eq!(payload["resource_group_name"], json!("rg-9"));
        assert_eq!(payload["bastion_host_enable"], json!(false));
        assert_eq!(payload["account_id"], json!("acc-9"));
        // tcloud-only zone is dropped
        assert!(payload["subnet"].get("zone").is_none());
        assert!(payload.get("routing_mode").is_none());
    }

    #[test]
    fn aws_payload_has_no_subnet() {
        let payload = filled(Vendor::Aws).save_data().unwrap();
        assert!(payload.get("subnet").is_none());
        assert_eq!(payload["instance_tenancy"], json!("default"));
        assert!(payload.get("resource_group_name").is_none());
    }

    #[test]
    fn region_change_clears_subnet_zone() {
        let mut vpc = filled(Vendor::TCloud);
        let mut next = cond(Vendor::TCloud);
        next.region = Some("r2".to_string());
        assert!(vpc.on_condition_changed(next));
        assert_eq!(vpc.form().get("subnet.zone"), Some(&json!("")));
        assert_eq!(vpc.form().get("name"), Some(&json!("vpc-01")));
    }
}
