//! 类型定义模块

mod filter;
mod form;
mod pagination;
mod vendor;

pub use filter::{AtomRule, FilterExpr, FilterRule, LogicOp, RuleOp};
pub use form::{FieldError, FieldErrors, SubmitTarget};
pub use pagination::{
    ListPage, ListQueryConfig, ListRequest, ListResponse, PageRequest, Pagination, Sort,
    SortOrder, DEFAULT_PAGE_SIZE, FILTER_RESET_PAGE_SIZE,
};
pub use vendor::{Condition, Vendor};
