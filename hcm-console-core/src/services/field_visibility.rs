//! 声明式字段可见性模型
//!
//! 表单由一棵 [`FieldDescriptor`] 树描述，每个节点带一个基于当前选择
//! （厂商、子选项）的可见性谓词。节点的实际可见性是它自身与所有祖先谓词的合取：
//! 父节点不可见时，整棵子树都不会被求值。

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};
use crate::types::{FieldError, FieldErrors, Vendor};
use crate::utils::get_path;

/// Values the visibility predicates read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    pub vendor: Option<Vendor>,
    /// Sub-choices made elsewhere in the form, by key.
    pub choices: HashMap<String, Value>,
}

impl SelectionState {
    pub fn new(vendor: Option<Vendor>) -> Self {
        Self {
            vendor,
            choices: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_choice(mut self, key: impl Into<String>, value: Value) -> Self {
        self.choices.insert(key.into(), value);
        self
    }

    pub fn choice(&self, key: &str) -> Option<&Value> {
        self.choices.get(key)
    }
}

type Predicate = Arc<dyn Fn(&SelectionState) -> bool + Send + Sync>;

/// Visibility predicate of one node.
#[derive(Clone)]
pub enum Visibility {
    Always,
    /// Shown only for the listed vendors (hidden while no vendor is chosen).
    VendorIn(Vec<Vendor>),
    /// Hidden for the listed vendors (shown while no vendor is chosen).
    VendorNotIn(Vec<Vendor>),
    /// Shown when a sub-choice has exactly this value.
    ChoiceEquals { key: String, value: Value },
    Custom(Predicate),
}

impl Visibility {
    pub fn only(vendor: Vendor) -> Self {
        Self::VendorIn(vec![vendor])
    }

    pub fn except(vendor: Vendor) -> Self {
        Self::VendorNotIn(vec![vendor])
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&SelectionState) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    pub fn is_visible(&self, selection: &SelectionState) -> bool {
        match self {
            Self::Always => true,
            Self::VendorIn(vendors) => selection.vendor.is_some_and(|v| vendors.contains(&v)),
            Self::VendorNotIn(vendors) => selection.vendor.is_none_or(|v| !vendors.contains(&v)),
            Self::ChoiceEquals { key, value } => selection.choice(key) == Some(value),
            Self::Custom(f) => f(selection),
        }
    }
}

impl fmt::Debug for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "Always"),
            Self::VendorIn(v) => f.debug_tuple("VendorIn").field(v).finish(),
            Self::VendorNotIn(v) => f.debug_tuple("VendorNotIn").field(v).finish(),
            Self::ChoiceEquals { key, value } => f
                .debug_struct("ChoiceEquals")
                .field("key", key)
                .field("value", value)
                .finish(),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

type Check = Arc<dyn Fn(&Value, &Map<String, Value>) -> bool + Send + Sync>;

/// Rule applied to a visible field's value.
#[derive(Clone)]
pub enum Validator {
    Pattern { regex: Regex, message: String },
    /// Maximum length in characters.
    MaxLength(usize),
    /// Inclusive numeric range.
    Range { min: i64, max: i64 },
    /// Arbitrary check over the value and the whole form (e.g. password confirmation).
    Custom { message: String, check: Check },
}

impl Validator {
    pub fn pattern(pattern: &str, message: impl Into<String>) -> CoreResult<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| CoreError::InvalidConfig(format!("bad pattern {pattern}: {e}")))?;
        Ok(Self::Pattern {
            regex,
            message: message.into(),
        })
    }

    pub fn custom<F>(message: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value, &Map<String, Value>) -> bool + Send + Sync + 'static,
    {
        Self::Custom {
            message: message.into(),
            check: Arc::new(check),
        }
    }

    /// Error message if `value` breaks this rule.
    fn check(&self, label: &str, value: &Value, form: &Map<String, Value>) -> Option<String> {
        match self {
            Self::Pattern { regex, message } => {
                let text = value.as_str()?;
                (!regex.is_match(text)).then(|| message.clone())
            }
            Self::MaxLength(max) => {
                let len = value.as_str()?.chars().count();
                (len > *max).then(|| format!("{label} must be at most {max} characters"))
            }
            Self::Range { min, max } => match as_integer(value) {
                Some(n) if (*min..=*max).contains(&n) => None,
                _ => Some(format!("{label} must be between {min} and {max}")),
            },
            Self::Custom { message, check } => (!check(value, form)).then(|| message.clone()),
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern { regex, .. } => f.debug_tuple("Pattern").field(&regex.as_str()).finish(),
            Self::MaxLength(n) => f.debug_tuple("MaxLength").field(n).finish(),
            Self::Range { min, max } => f
                .debug_struct("Range")
                .field("min", min)
                .field("max", max)
                .finish(),
            Self::Custom { message, .. } => f.debug_tuple("Custom").field(message).finish(),
        }
    }
}

/// Integer held either as a JSON number or as numeric text (number inputs yield both).
pub fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(obj)) => obj.is_empty(),
        Some(_) => false,
    }
}

/// One node of a form tree: a field, a composite of sub-fields, or a group.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub id: String,
    pub label: String,
    pub required: bool,
    /// Property path of the bound value; `None` for groups and static rows.
    pub property: Option<String>,
    pub visible: Visibility,
    pub validators: Vec<Validator>,
    pub children: Vec<FieldDescriptor>,
}

impl FieldDescriptor {
    /// A field bound to `property`; its id is the property path.
    pub fn field(label: impl Into<String>, property: impl Into<String>) -> Self {
        let property = property.into();
        Self {
            id: property.clone(),
            label: label.into(),
            required: false,
            property: Some(property),
            visible: Visibility::Always,
            validators: Vec::new(),
            children: Vec::new(),
        }
    }

    /// A node with no bound value (group header, static text, composite wrapper).
    pub fn group(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            required: false,
            property: None,
            visible: Visibility::Always,
            validators: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn visible_when(mut self, visible: Visibility) -> Self {
        self.visible = visible;
        self
    }

    #[must_use]
    pub fn validate(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    #[must_use]
    pub fn children(mut self, children: Vec<FieldDescriptor>) -> Self {
        self.children = children;
        self
    }
}

/// A visible node with its visible children.
#[derive(Debug, Clone)]
pub struct ActiveField<'a> {
    pub descriptor: &'a FieldDescriptor,
    pub children: Vec<ActiveField<'a>>,
}

impl ActiveField<'_> {
    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    /// Pre-order search for a visible node by id.
    pub fn find(&self, id: &str) -> Option<&Self> {
        if self.id() == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }
}

/// Visible subset of `tree` for `selection`.
///
/// A node whose predicate is false is pruned with its whole subtree; the
/// children of a hidden node are never evaluated.
pub fn active_fields<'a>(
    tree: &'a [FieldDescriptor],
    selection: &SelectionState,
) -> Vec<ActiveField<'a>> {
    tree.iter()
        .filter(|node| node.visible.is_visible(selection))
        .map(|node| ActiveField {
            descriptor: node,
            children: active_fields(&node.children, selection),
        })
        .collect()
}

/// Collect visible ids in pre-order.
pub fn active_ids(active: &[ActiveField<'_>]) -> Vec<String> {
    let mut ids = Vec::new();
    for field in active {
        ids.push(field.id().to_string());
        ids.extend(active_ids(&field.children));
    }
    ids
}

/// Validate the visible fields of a form, in pre-order.
///
/// Hidden fields are never validated. A blank required field reports only
/// the required error; a blank optional field is skipped.
pub fn validate_active(active: &[ActiveField<'_>], form: &Map<String, Value>) -> FieldErrors {
    let mut errors = FieldErrors::default();
    for field in active {
        let node = field.descriptor;
        if let Some(property) = &node.property {
            let value = get_path(form, property);
            if is_blank(value) {
                if node.required {
                    errors.push(FieldError::new(
                        property.clone(),
                        format!("{} is required", node.label),
                    ));
                }
            } else if let Some(value) = value {
                if let Some(message) = node
                    .validators
                    .iter()
                    .find_map(|v| v.check(&node.label, value, form))
                {
                    errors.push(FieldError::new(property.clone(), message));
                }
            }
        }
        errors.extend(validate_active(&field.children, form));
    }
    errors
}
