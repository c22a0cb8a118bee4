//! Fallback policy for failed submissions.
//!
//! A failed recommendation never reaches the user as an error: the caller
//! hands the `Result` to [`ErrorRecovery::recover_with_demo`], which reports
//! the failure and substitutes the static demo response. Keeping this as an
//! explicit step makes the substitution visible where the result is consumed.

use crate::demo::demo_response;
use crate::{CoreError, ErrorReporter, RecommendationResponse};
use std::time::Duration;
use tracing::info;

/// Pause before showing the demo response, so a fast failure does not flash
/// the loading panel.
pub const DEFAULT_FALLBACK_DELAY: Duration = Duration::from_millis(800);

/// Result of a recovery attempt
#[derive(Debug)]
pub enum RecoveryResult<T> {
    /// The operation produced its own value
    Recovered(T),
    /// The operation failed and a substitute value is used instead
    Degraded { value: T, cause: CoreError },
}

impl<T> RecoveryResult<T> {
    pub fn is_degraded(&self) -> bool {
        matches!(self, RecoveryResult::Degraded { .. })
    }

    pub fn into_value(self) -> T {
        match self {
            RecoveryResult::Recovered(value) | RecoveryResult::Degraded { value, .. } => value,
        }
    }

    pub fn cause(&self) -> Option<&CoreError> {
        match self {
            RecoveryResult::Recovered(_) => None,
            RecoveryResult::Degraded { cause, .. } => Some(cause),
        }
    }
}

pub struct ErrorRecovery {
    fallback_delay: Duration,
    reporter: ErrorReporter,
}

impl ErrorRecovery {
    pub fn new(fallback_delay: Duration) -> Self {
        Self {
            fallback_delay,
            reporter: ErrorReporter::new(),
        }
    }

    /// Passes a live response through, or reports the error and yields the
    /// demo response after the fallback delay.
    pub async fn recover_with_demo(
        &self,
        result: Result<RecommendationResponse, CoreError>,
    ) -> RecoveryResult<RecommendationResponse> {
        match result {
            Ok(response) => RecoveryResult::Recovered(response),
            Err(cause) => {
                self.reporter.report_error(&cause);
                info!("Substituting demo response after {:?}", self.fallback_delay);
                tokio::time::sleep(self.fallback_delay).await;
                RecoveryResult::Degraded {
                    value: demo_response(),
                    cause,
                }
            }
        }
    }

    /// The demo response on request, after the same delay as a fallback.
    pub async fn demo(&self) -> RecommendationResponse {
        tokio::time::sleep(self.fallback_delay).await;
        demo_response()
    }
}

impl Default for ErrorRecovery {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_DELAY)
    }
}
