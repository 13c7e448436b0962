//! Bounded timeout and retry around external gateway calls.
//!
//! None of the external services are assumed reliable: every call gets a
//! deadline, expiry becomes a retryable [`RagError::GatewayTimeout`], and the
//! retry budget is fixed up front so a flaky gateway surfaces as a failed
//! query rather than hanging or silently returning an empty answer.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, timeout};
use tracing::warn;

use crate::config::PipelineConfig;
use crate::error::{RagError, Result};

/// First retry delay; doubles on each subsequent attempt.
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);

/// Deadline and retry budget for one class of gateway calls.
#[derive(Debug, Clone, Copy)]
pub struct GatewayPolicy {
    /// Per-attempt deadline.
    pub timeout: Duration,
    /// Number of retries after the first attempt fails.
    pub retries: u32,
}

impl GatewayPolicy {
    /// Derive the policy from pipeline configuration.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self { timeout: config.gateway_timeout(), retries: config.gateway_retries }
    }
}

/// Run a gateway call under `policy`, retrying retryable failures with
/// exponential backoff.
///
/// `gateway` names the service for logs and timeout errors. Non-retryable
/// errors propagate immediately.
pub async fn call_gateway<T, F, Fut>(gateway: &str, policy: GatewayPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut backoff = INITIAL_BACKOFF;
    let mut attempt = 0;
    loop {
        let outcome = match timeout(policy.timeout, op()).await {
            Ok(result) => result,
            Err(_) => Err(RagError::GatewayTimeout {
                gateway: gateway.to_string(),
                timeout_secs: policy.timeout.as_secs(),
            }),
        };

        match outcome {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < policy.retries => {
                attempt += 1;
                warn!(gateway, attempt, error = %e, "gateway call failed, retrying");
                sleep(backoff).await;
                backoff *= 2;
            }
            Err(e) => return Err(e),
        }
    }
}
