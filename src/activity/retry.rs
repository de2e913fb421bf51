//! Retry handling for transient API failures.

use crate::Result;
use core::time::Duration;
use ohno::app_err;
use reqwest::{Response, StatusCode};

const LOG_TARGET: &str = "activity::retry";

/// Fixed-delay retry policy for requests that fail transiently.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,

    /// Pause between consecutive attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_secs(3),
        }
    }
}

impl RetryPolicy {
    /// Run `request` until it yields a successful response, a permanent
    /// failure, or the attempt budget is exhausted.
    pub async fn execute<F, Fut>(&self, url: &str, mut request: F) -> Result<Response>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = reqwest::Result<Response>>,
    {
        let mut attempt = 1;
        loop {
            match request().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) if is_transient_status(&response) => {
                    if attempt >= self.max_attempts {
                        return Err(app_err!(
                            "giving up on {url} after {attempt} attempts, last status {}",
                            response.status()
                        ));
                    }

                    log::debug!(target: LOG_TARGET,
                        "transient status {} from {url}, attempt {attempt} of {}, retrying in {:?}",
                        response.status(), self.max_attempts, self.delay);
                }
                Ok(response) => {
                    return Err(app_err!("request to {url} failed with status {}", response.status()));
                }
                Err(err) if err.is_connect() || err.is_timeout() => {
                    if attempt >= self.max_attempts {
                        return Err(app_err!("giving up on {url} after {attempt} attempts: {err}"));
                    }

                    log::debug!(target: LOG_TARGET,
                        "connection failure for {url}, attempt {attempt} of {}, retrying in {:?}: {err}",
                        self.max_attempts, self.delay);
                }
                Err(err) => return Err(app_err!("request to {url} failed: {err}")),
            }

            tokio::time::sleep(self.delay).await;
            attempt += 1;
        }
    }
}

/// Whether a non-success response is worth retrying.
///
/// Server errors and explicit throttling responses are transient. A 403 only
/// counts when the headers carry rate-limit evidence, since GitHub also uses
/// 403 for plain permission denials.
fn is_transient_status(response: &Response) -> bool {
    let status = response.status();
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }

    if status == StatusCode::FORBIDDEN {
        let headers = response.headers();
        return headers.contains_key("retry-after")
            || headers
                .get("x-ratelimit-remaining")
                .is_some_and(|v| v.as_bytes() == b"0");
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            delay: Duration::from_millis(1),
        }
    }

    async fn execute_against(server: &MockServer, policy: RetryPolicy) -> Result<Response> {
        let client = reqwest::Client::new();
        let url = format!("{}/thing", server.uri());
        policy.execute(&url, || client.get(&url).send()).await
    }

    #[tokio::test]
    async fn test_success_needs_no_retry() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/thing"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = execute_against(&mock_server, fast_policy(3)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_recovers_from_transient_server_errors() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/thing"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/thing"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let result = execute_against(&mock_server, fast_policy(5)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_gives_up_after_attempt_budget() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/thing"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&mock_server)
            .await;

        let result = execute_against(&mock_server, fast_policy(3)).await;
        assert!(result.is_err());
        mock_server.verify().await;
    }

    #[tokio::test]
    async fn test_client_error_fails_immediately() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/thing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = execute_against(&mock_server, fast_policy(5)).await;
        assert!(result.is_err());
        mock_server.verify().await;
    }

    #[tokio::test]
    async fn test_rate_limited_forbidden_is_retried() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/thing"))
            .respond_with(ResponseTemplate::new(403).insert_header("x-ratelimit-remaining", "0"))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/thing"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let result = execute_against(&mock_server, fast_policy(3)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_plain_forbidden_fails_immediately() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/thing"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = execute_against(&mock_server, fast_policy(5)).await;
        assert!(result.is_err());
        mock_server.verify().await;
    }
}
