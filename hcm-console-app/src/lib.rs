//! Platform-agnostic application bootstrap for the HCM console.
//!
//! Provides `AppState` (service container), `AppStateBuilder` (collaborator
//! injection) and the concrete resource forms and dialogs built on the core
//! engines.

pub mod adapters;
pub mod config;
pub mod dialogs;
pub mod forms;

use std::sync::Arc;

use hcm_console_core::error::{CoreError, CoreResult};
use hcm_console_core::services::{ListQueryController, ServiceContext, SubmissionFlow};
use hcm_console_core::traits::{
    IdentityTranslator, Navigator, NoopNavigator, NoopNotifier, Notifier, ResourceTransport,
    Translator,
};
use hcm_console_core::types::{Condition, FilterExpr};

pub use config::ConsoleConfig;

use dialogs::{AttachDiskDialog, HostDetail};
use forms::{CvmForm, VpcForm};

/// Platform-agnostic application state.
///
/// Holds the `ServiceContext` and the console configuration. Every frontend
/// constructs this once at startup via `AppStateBuilder`, then asks it for
/// list controllers, forms and dialogs.
pub struct AppState {
    /// Service context (holds all collaborators)
    pub ctx: Arc<ServiceContext>,
    /// Console configuration
    pub config: ConsoleConfig,
}

impl AppState {
    /// 资源列表控制器（使用配置中的分页大小）
    pub fn list_controller(
        &self,
        collection: impl Into<String>,
        filter: FilterExpr,
    ) -> ListQueryController {
        ListQueryController::new(Arc::clone(&self.ctx), collection, filter)
            .with_config(self.config.list_query)
    }

    /// 提交流程（成功后跳转到配置的路径）
    pub fn submission_flow(&self) -> SubmissionFlow {
        SubmissionFlow::new(Arc::clone(&self.ctx)).with_success_path(self.config.success_path.clone())
    }

    pub fn cvm_form(&self, condition: Condition) -> CoreResult<CvmForm> {
        CvmForm::new(condition)
    }

    pub fn vpc_form(&self, condition: Condition) -> CoreResult<VpcForm> {
        VpcForm::new(condition)
    }

    pub fn attach_disk_dialog(&self, host: HostDetail) -> AttachDiskDialog {
        AttachDiskDialog::new(Arc::clone(&self.ctx), host).with_config(self.config.list_query)
    }
}

/// Builder for constructing `AppState` with platform-specific collaborators.
///
/// # Required
/// - `transport`: how resources are fetched and submitted
///
/// # Optional
/// - `notifier`: defaults to `NoopNotifier`
/// - `navigator`: defaults to `NoopNavigator`
/// - `translator`: defaults to `IdentityTranslator`
/// - `config`: defaults to `ConsoleConfig::default()`
pub struct AppStateBuilder {
    transport: Option<Arc<dyn ResourceTransport>>,
    notifier: Option<Arc<dyn Notifier>>,
    navigator: Option<Arc<dyn Navigator>>,
    translator: Option<Arc<dyn Translator>>,
    config: ConsoleConfig,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            transport: None,
            notifier: None,
            navigator: None,
            translator: None,
            config: ConsoleConfig::default(),
        }
    }

    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn ResourceTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    #[must_use]
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    #[must_use]
    pub fn translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    #[must_use]
    pub fn config(mut self, config: ConsoleConfig) -> Self {
        self.config = config;
        self
    }

    /// Use the reqwest transport against `config.api_prefix`.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidConfig` if the HTTP client cannot be built.
    #[cfg(feature = "http-transport")]
    pub fn http_transport(self) -> CoreResult<Self> {
        let transport = adapters::HttpTransport::new(self.config.api_prefix.clone())?;
        Ok(self.transport(Arc::new(transport)))
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidConfig` if the transport is missing.
    pub fn build(self) -> CoreResult<AppState> {
        let transport = self
            .transport
            .ok_or_else(|| CoreError::InvalidConfig("transport is required".to_string()))?;
        let notifier = self.notifier.unwrap_or_else(|| Arc::new(NoopNotifier));
        let navigator = self.navigator.unwrap_or_else(|| Arc::new(NoopNavigator));
        let translator = self
            .translator
            .unwrap_or_else(|| Arc::new(IdentityTranslator));

        log::debug!(
            "console state ready (api prefix {:?}, page size {})",
            self.config.api_prefix,
            self.config.list_query.default_page_size
        );

        Ok(AppState {
            ctx: Arc::new(ServiceContext::new(
                transport, notifier, navigator, translator,
            )),
            config: self.config,
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
