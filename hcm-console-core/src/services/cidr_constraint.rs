//! 网段（CIDR）分段输入的跨字段约束
//!
//! 地址块拆成 `[block1, block2, block3, block4, mask]` 五个输入。block1 只能是
//! 私有网段的首段（10 / 172 / 192），它决定 block2 与掩码的合法范围；
//! 其中腾讯云使用单独的掩码范围表。

use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::services::field_visibility::as_integer;
use crate::types::{FieldError, FieldErrors, Vendor};

/// Inclusive range of one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentRange {
    pub min: u16,
    pub max: u16,
}

impl ComponentRange {
    pub const fn new(min: u16, max: u16) -> Self {
        Self { min, max }
    }

    pub fn contains(self, value: u16) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn clamp(self, value: u16) -> u16 {
        value.clamp(self.min, self.max)
    }
}

/// Subnet blocks 3 and 4 and any free octet.
pub const OCTET_RANGE: ComponentRange = ComponentRange::new(0, 255);
/// Subnet block 1.
pub const SUBNET_BLOCK_RANGE: ComponentRange = ComponentRange::new(1, 255);
/// Subnet mask.
pub const SUBNET_MASK_RANGE: ComponentRange = ComponentRange::new(1, 32);

/// Private address class selected by block 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CidrClass {
    /// 10.0.0.0/8
    Ten,
    /// 172.16.0.0/12
    OneSevenTwo,
    /// 192.168.0.0/16
    OneNineTwo,
}

impl CidrClass {
    pub fn all() -> &'static [CidrClass] {
        &[CidrClass::Ten, CidrClass::OneSevenTwo, CidrClass::OneNineTwo]
    }

    pub fn from_first_block(block: u16) -> Option<Self> {
        match block {
            10 => Some(Self::Ten),
            172 => Some(Self::OneSevenTwo),
            192 => Some(Self::OneNineTwo),
            _ => None,
        }
    }

    pub fn first_block(self) -> u16 {
        match self {
            Self::Ten => 10,
            Self::OneSevenTwo => 172,
            Self::OneNineTwo => 192,
        }
    }

    /// Legal range of block 2.
    pub fn second_block_range(self) -> ComponentRange {
        match self {
            Self::Ten => ComponentRange::new(0, 255),
            Self::OneSevenTwo => ComponentRange::new(16, 31),
            Self::OneNineTwo => ComponentRange::new(168, 168),
        }
    }
}

/// An address block as five integer components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressBlock {
    pub blocks: [u16; 4],
    pub mask: u16,
}

impl AddressBlock {
    pub fn new(blocks: [u16; 4], mask: u16) -> Self {
        Self { blocks, mask }
    }

    /// Parse a five-element array of numbers or numeric strings.
    pub fn from_value(value: &Value) -> CoreResult<Self> {
        let items = value
            .as_array()
            .filter(|items| items.len() == 5)
            .ok_or_else(|| {
                CoreError::Validation(FieldErrors(vec![FieldError::new(
                    "ipv4_cidr",
                    "address block needs four blocks and a mask",
                )]))
            })?;

        let mut parts = [0_u16; 5];
        for (i, item) in items.iter().enumerate() {
            parts[i] = as_integer(item)
                .and_then(|n| u16::try_from(n).ok())
                .ok_or_else(|| {
                    CoreError::Validation(FieldErrors(vec![FieldError::new(
                        format!("ipv4_cidr.{i}"),
                        format!("{item} is not a valid number"),
                    )]))
                })?;
        }
        Ok(Self::new([parts[0], parts[1], parts[2], parts[3]], parts[4]))
    }

    pub fn to_value(self) -> Value {
        Value::Array(
            self.blocks
                .iter()
                .chain(std::iter::once(&self.mask))
                .map(|n| Value::from(*n))
                .collect(),
        )
    }

    /// `a.b.c.d/m`
    pub fn to_cidr_string(self) -> String {
        let [a, b, c, d] = self.blocks;
        format!("{a}.{b}.{c}.{d}/{}", self.mask)
    }

    /// Copy blocks 1 and 2 into a dependent block (parent to dependent only).
    pub fn mirror_into(self, dependent: &mut AddressBlock) {
        dependent.blocks[0] = self.blocks[0];
        dependent.blocks[1] = self.blocks[1];
    }
}

/// Vendor-dependent constraint tables for a VPC address block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CidrConstraint {
    vendor: Option<Vendor>,
}

impl CidrConstraint {
    pub fn new(vendor: Option<Vendor>) -> Self {
        Self { vendor }
    }

    /// Legal mask range for `class`; Tencent Cloud has its own table.
    pub fn mask_range(self, class: CidrClass) -> ComponentRange {
        match (self.vendor, class) {
            (Some(Vendor::TCloud), CidrClass::Ten | CidrClass::OneSevenTwo) => {
                ComponentRange::new(12, 28)
            }
            (_, CidrClass::Ten) => ComponentRange::new(8, 28),
            (_, CidrClass::OneSevenTwo) => ComponentRange::new(12, 28),
            (_, CidrClass::OneNineTwo) => ComponentRange::new(16, 28),
        }
    }

    /// Re-establish the block 2 / mask constraints after block 1 changed.
    ///
    /// - 192: block 2 is forced to 168, a mask below the class minimum is raised to it;
    /// - 172: block 2 is left as entered, a mask below the class minimum is raised to it;
    /// - otherwise: block 2 is clamped into the class range in both directions.
    pub fn on_first_block_changed(self, block: &mut AddressBlock) -> CoreResult<CidrClass> {
        let class = CidrClass::from_first_block(block.blocks[0]).ok_or_else(|| {
            CoreError::Validation(FieldErrors(vec![FieldError::new(
                "ipv4_cidr.0",
                format!("{} is not a private address class", block.blocks[0]),
            )]))
        })?;

        let mask_min = self.mask_range(class).min;
        match class {
            CidrClass::OneNineTwo => {
                block.blocks[1] = 168;
                block.mask = block.mask.max(mask_min);
            }
            CidrClass::OneSevenTwo => {
                block.mask = block.mask.max(mask_min);
            }
            CidrClass::Ten => {
                block.blocks[1] = class.second_block_range().clamp(block.blocks[1]);
            }
        }
        Ok(class)
    }

    /// Range check of every component, errors keyed `{property}.{index}`.
    pub fn validate(self, property: &str, block: &AddressBlock) -> FieldErrors {
        let mut errors = FieldErrors::default();
        let Some(class) = CidrClass::from_first_block(block.blocks[0]) else {
            errors.push(FieldError::new(
                format!("{property}.0"),
                "first block must be 10, 172 or 192",
            ));
            return errors;
        };

        let ranges = [
            (1, block.blocks[1], class.second_block_range()),
            (2, block.blocks[2], OCTET_RANGE),
            (3, block.blocks[3], OCTET_RANGE),
            (4, block.mask, self.mask_range(class)),
        ];
        push_out_of_range(&mut errors, property, &ranges);
        errors
    }

    /// Range check of a subnet block (free entry within octet and mask bounds).
    pub fn validate_subnet(property: &str, block: &AddressBlock) -> FieldErrors {
        let mut errors = FieldErrors::default();
        let ranges = [
            (0, block.blocks[0], SUBNET_BLOCK_RANGE),
            (1, block.blocks[1], OCTET_RANGE),
            (2, block.blocks[2], OCTET_RANGE),
            (3, block.blocks[3], OCTET_RANGE),
            (4, block.mask, SUBNET_MASK_RANGE),
        ];
        push_out_of_range(&mut errors, property, &ranges);
        errors
    }
}

fn push_out_of_range(
    errors: &mut FieldErrors,
    property: &str,
    ranges: &[(usize, u16, ComponentRange)],
) {
    for (index, value, range) in ranges {
        if !range.contains(*value) {
            errors.push(FieldError::new(
                format!("{property}.{index}"),
                format!("must be between {} and {}", range.min, range.max),
            ));
        }
    }
}
