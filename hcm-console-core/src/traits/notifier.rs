//! 通知与导航协作者

use serde::{Deserialize, Serialize};

/// 通知主题
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Success,
    Error,
}

/// 一条通知消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub theme: Theme,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            theme: Theme::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            theme: Theme::Error,
            message: message.into(),
        }
    }
}

/// 通知协作者（即发即弃）
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// 导航协作者（即发即弃）
pub trait Navigator: Send + Sync {
    fn go_to(&self, path: &str);
}

/// 丢弃所有通知，用于不需要提示的场景
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notice: Notice) {}
}

/// 忽略所有跳转
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn go_to(&self, _path: &str) {}
}
