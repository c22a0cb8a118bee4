use crate::api::ApiClient;
use crate::config::RetrySettings;
use scriptify_core::{CoreError, ErrorExt, RecommendationRequest, RecommendationResponse};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Fixed wait between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            delay: Duration::from_secs(5),
        }
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            delay: Duration::from_millis(settings.delay_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RetryState {
    Attempting(u32),
    Retrying { attempt: u32, delay: Duration },
    Success,
    Failed,
}

impl RetryState {
    /// Text shown to the user while the controller is in this state.
    pub fn status_message(&self) -> Option<String> {
        match self {
            RetryState::Retrying { delay, .. } => Some(format!(
                "Calentando el modelo… reintentamos en {}s ⏳",
                delay.as_secs()
            )),
            _ => None,
        }
    }
}

pub type RetryObserver = Arc<dyn Fn(&RetryState) + Send + Sync>;

/// Runs an operation, retrying once more after a fixed delay when the
/// service reports a cold model (HTTP 504). Every other failure is returned
/// on the spot.
#[derive(Clone, Default)]
pub struct RetryController {
    policy: RetryPolicy,
    observer: Option<RetryObserver>,
}

impl fmt::Debug for RetryController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryController")
            .field("policy", &self.policy)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl RetryController {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: RetryObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    fn notify(&self, state: RetryState) {
        if let Some(observer) = &self.observer {
            observer(&state);
        }
    }

    pub async fn execute<F, Fut, T>(&self, operation_name: &str, operation: F) -> Result<T, CoreError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let mut attempt = 1;

        loop {
            self.notify(RetryState::Attempting(attempt));
            debug!("Attempt {} for {}", attempt, operation_name);

            match operation().await {
                Ok(result) => {
                    if attempt > 1 {
                        info!("Operation {} succeeded on attempt {}", operation_name, attempt);
                    }
                    self.notify(RetryState::Success);
                    return Ok(result);
                }
                Err(error) if error.is_retryable() && attempt < self.policy.max_attempts => {
                    warn!(
                        "Retrying {} in {:?} due to: {}",
                        operation_name, self.policy.delay, error
                    );
                    self.notify(RetryState::Retrying {
                        attempt,
                        delay: self.policy.delay,
                    });
                    sleep(self.policy.delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    error!(
                        "Operation {} failed on attempt {}/{}: {}",
                        operation_name, attempt, self.policy.max_attempts, error
                    );
                    self.notify(RetryState::Failed);
                    return Err(error);
                }
            }
        }
    }

    pub async fn recommend(
        &self,
        client: &ApiClient,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResponse, CoreError> {
        self.execute("recommend", || client.recommend(request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording_observer() -> (RetryObserver, Arc<Mutex<Vec<RetryState>>>) {
        let states = Arc::new(Mutex::new(Vec::new()));
        let sink = states.clone();
        let observer: RetryObserver = Arc::new(move |state: &RetryState| {
            sink.lock().unwrap().push(state.clone());
        });
        (observer, states)
    }

    #[test]
    fn test_retry_policy_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 2);
        assert_eq!(policy.delay, Duration::from_secs(5));
    }

    #[test]
    fn test_policy_from_settings() {
        let policy = RetryPolicy::from(&RetrySettings {
            max_attempts: 0,
            delay_ms: 250,
        });
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.delay, Duration::from_millis(250));
    }

    #[test]
    fn test_status_message_only_while_retrying() {
        let retrying = RetryState::Retrying {
            attempt: 1,
            delay: Duration::from_secs(5),
        };
        assert_eq!(
            retrying.status_message().as_deref(),
            Some("Calentando el modelo… reintentamos en 5s ⏳")
        );
        assert_eq!(RetryState::Attempting(1).status_message(), None);
        assert_eq!(RetryState::Failed.status_message(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt() {
        let (observer, states) = recording_observer();
        let controller = RetryController::default().with_observer(observer);

        let result = controller
            .execute("test_operation", || async { Ok::<i32, CoreError>(42) })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(
            *states.lock().unwrap(),
            vec![RetryState::Attempting(1), RetryState::Success]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_cold_starts_exhaust_attempts() {
        let (observer, states) = recording_observer();
        let controller = RetryController::default().with_observer(observer);
        let attempts = Arc::new(Mutex::new(Vec::new()));
        let start = tokio::time::Instant::now();

        let result = controller
            .execute("test_operation", || {
                let attempts = attempts.clone();
                async move {
                    attempts.lock().unwrap().push(start.elapsed());
                    let n = attempts.lock().unwrap().len();
                    Err::<i32, CoreError>(CoreError::http(504, format!("cold {n}")))
                }
            })
            .await;

        let attempts = attempts.lock().unwrap();
        assert_eq!(attempts.len(), 2, "no third attempt");
        assert!(attempts[1] >= Duration::from_secs(5));

        match result {
            Err(CoreError::Http { status, body }) => {
                assert_eq!(status, 504);
                assert_eq!(body, "cold 2");
            }
            other => panic!("expected the second attempt's error, got {other:?}"),
        }

        assert_eq!(
            *states.lock().unwrap(),
            vec![
                RetryState::Attempting(1),
                RetryState::Retrying {
                    attempt: 1,
                    delay: Duration::from_secs(5)
                },
                RetryState::Attempting(2),
                RetryState::Failed,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cold_start_then_success() {
        let controller = RetryController::default();
        let count = Arc::new(Mutex::new(0));

        let result = controller
            .execute("test_operation", || {
                let count = count.clone();
                async move {
                    let mut count = count.lock().unwrap();
                    *count += 1;
                    if *count == 1 {
                        Err(CoreError::http(504, "warming"))
                    } else {
                        Ok("ready")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "ready");
        assert_eq!(*count.lock().unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_errors_are_not_retried() {
        let controller = RetryController::default();
        let count = Arc::new(Mutex::new(0));

        let result = controller
            .execute("test_operation", || {
                let count = count.clone();
                async move {
                    *count.lock().unwrap() += 1;
                    Err::<(), CoreError>(CoreError::http(503, "unavailable"))
                }
            })
            .await;

        assert!(matches!(result, Err(CoreError::Http { status: 503, .. })));
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_policy_surfaces_cold_start() {
        let controller = RetryController::new(RetryPolicy {
            max_attempts: 1,
            delay: Duration::from_secs(5),
        });
        let count = Arc::new(Mutex::new(0));

        let result = controller
            .execute("test_operation", || {
                let count = count.clone();
                async move {
                    *count.lock().unwrap() += 1;
                    Err::<(), CoreError>(CoreError::http(504, "cold"))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(*count.lock().unwrap(), 1);
    }
}
