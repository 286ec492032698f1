// src/utils/http.rs

//! HTTP client utilities.

use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, Request, Response};
use reqwest::{Method, StatusCode};
use url::Url;

use crate::error::Result;
use crate::utils::retry::{RetryDecision, RetryPolicy, RetryState, TransientFailure};

/// Statuses the remote side uses for overload and gateway trouble.
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

pub fn is_retryable(status: StatusCode) -> bool {
    RETRYABLE_STATUSES.contains(&status.as_u16())
}

/// Create a configured blocking HTTP client.
pub fn create_client(user_agent: &str, timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Join an API path onto a base URL, keeping any path prefix of the base.
pub fn endpoint(base: &str, path: &str) -> Result<Url> {
    let base = if base.ends_with('/') {
        Url::parse(base)?
    } else {
        Url::parse(&format!("{base}/"))?
    };
    Ok(base.join(path.trim_start_matches('/'))?)
}

/// Status-code retries performed below the application.
///
/// Waits `factor * 2^(n-1)` before retry `n`.
pub fn transport_policy(max_retries: u32, backoff_factor: Duration) -> RetryPolicy {
    RetryPolicy::new(max_retries, backoff_factor / 2)
}

/// Execute a request, retrying GET and POST on retryable statuses.
///
/// The last response is returned as-is once the budget is spent, so callers
/// still see the final status. Transport errors are not retried here.
pub fn send_with_retry(
    client: &Client,
    request: Request,
    policy: RetryPolicy,
) -> reqwest::Result<Response> {
    let retry_allowed = matches!(*request.method(), Method::GET | Method::POST);
    let mut state = RetryState::new(if retry_allowed {
        policy
    } else {
        RetryPolicy::none()
    });

    let mut pending = request;
    loop {
        // Bodies built from bytes are always clonable.
        let Some(next) = pending.try_clone() else {
            return client.execute(pending);
        };

        let response = client.execute(pending)?;
        let status = response.status();
        if !is_retryable(status) {
            return Ok(response);
        }

        match state.on_failure(TransientFailure::Status(status.as_u16())) {
            RetryDecision::Retry { retry, wait } => {
                log::debug!(
                    "{} {} returned {}, transport retry {} in {:?}",
                    next.method(),
                    next.url(),
                    status,
                    retry,
                    wait
                );
                thread::sleep(wait);
                pending = next;
            }
            RetryDecision::GiveUp { .. } => return Ok(response),
        }
    }
}
