//! 表单提交流程
//!
//! `Idle → Validating → (Invalid → Idle) | (Submitting → Success | Failure → Idle)`

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::traits::Notice;
use crate::types::{FieldErrors, SubmitTarget};
use crate::utils::payload_for_log;

/// Where the console goes after a successful application.
pub const DEFAULT_SUCCESS_PATH: &str = "/service/my-apply";

/// Submission state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Validating,
    Submitting,
}

/// Result of one submit attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent.
    Invalid(FieldErrors),
    /// The transport accepted the payload and navigation happened.
    Submitted,
    /// Transform or transport failed; the user stays on the form.
    Failed(CoreError),
    /// A submission is already running.
    Busy,
}

/// A form the submission flow can drive.
pub trait FormSubmission {
    /// Validate the visible fields; the form keeps the errors for display.
    fn validate(&mut self) -> FieldErrors;

    /// Vendor-specific save payload. Only called on a valid form.
    fn payload(&self) -> CoreResult<Value>;

    /// Endpoint the payload goes to.
    fn target(&self) -> CoreResult<SubmitTarget>;
}

/// 提交流程（校验 → 转换 → 提交 → 跳转或报错）
pub struct SubmissionFlow {
    ctx: Arc<ServiceContext>,
    success_path: String,
    state: Mutex<SubmitState>,
}

impl SubmissionFlow {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self {
            ctx,
            success_path: DEFAULT_SUCCESS_PATH.to_string(),
            state: Mutex::new(SubmitState::Idle),
        }
    }

    /// 提交成功后的跳转路径
    #[must_use]
    pub fn with_success_path(mut self, path: impl Into<String>) -> Self {
        self.success_path = path.into();
        self
    }

    pub fn state(&self) -> SubmitState {
        *self.lock()
    }

    /// True only while the save call is outstanding.
    pub fn is_submitting(&self) -> bool {
        self.state() == SubmitState::Submitting
    }

    /// Validate, transform and submit `form`.
    ///
    /// An invalid form never reaches the transform or the transport. Every
    /// path ends back in `Idle`.
    pub async fn submit<F>(&self, form: &mut F) -> SubmitOutcome
    where
        F: FormSubmission + ?Sized,
    {
        {
            let mut state = self.lock();
            if *state != SubmitState::Idle {
                log::debug!("[submit] ignored, already {:?}", *state);
                return SubmitOutcome::Busy;
            }
            *state = SubmitState::Validating;
        }

        let errors = form.validate();
        if !errors.is_empty() {
            log::warn!("[submit] validation failed: {errors}");
            self.set_state(SubmitState::Idle);
            return SubmitOutcome::Invalid(errors);
        }

        let prepared = form.target().and_then(|target| Ok((target, form.payload()?)));
        let (target, payload) = match prepared {
            Ok(prepared) => prepared,
            Err(err) => {
                self.set_state(SubmitState::Idle);
                self.ctx.report_error("prepare submission", &err);
                return SubmitOutcome::Failed(err);
            }
        };

        self.set_state(SubmitState::Submitting);
        log::info!(
            "[submit] {} -> {}: {}",
            target.vendor,
            target.kind,
            payload_for_log(&payload)
        );
        let result = self.ctx.transport.submit(&target, &payload).await;
        self.set_state(SubmitState::Idle);

        match result {
            Ok(()) => {
                self.ctx
                    .notifier
                    .notify(Notice::success(self.ctx.t("提交成功", &[])));
                self.ctx.navigator.go_to(&self.success_path);
                SubmitOutcome::Submitted
            }
            Err(err) => {
                let err = match err {
                    CoreError::Submission(_) => err,
                    other => CoreError::Submission(other.user_message()),
                };
                self.ctx.report_error(&format!("submit {}", target.kind), &err);
                SubmitOutcome::Failed(err)
            }
        }
    }

    fn set_state(&self, next: SubmitState) {
        *self.lock() = next;
    }

    fn lock(&self) -> MutexGuard<'_, SubmitState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
