//! Tests for `RetryingClient`.

use super::{
    HttpClient, HttpError, HttpRequest, HttpResponse, IsRetryable, RetryPolicy, RetryingClient,
};
use crate::time::{InstantSleeper, Sleeper, TokioSleeper};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock HTTP client that returns a configurable sequence of responses.
#[derive(Debug)]
struct MockClient {
    responses: Mutex<Vec<Result<HttpResponse, HttpError>>>,
    call_count: AtomicUsize,
}

impl MockClient {
    fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            call_count: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl HttpClient for MockClient {
    async fn request(&self, _req: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.responses.lock().unwrap().remove(0)
    }
}

impl HttpClient for Arc<MockClient> {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        (**self).request(req).await
    }
}

/// Sleeper that records requested delays without waiting.
#[derive(Debug, Clone, Default)]
struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

fn status(code: u16) -> Result<HttpResponse, HttpError> {
    Ok(response(code, None))
}

fn response(code: u16, retry_after: Option<&str>) -> HttpResponse {
    let mut headers = http::HeaderMap::new();
    if let Some(value) = retry_after {
        headers.insert(http::header::RETRY_AFTER, value.parse().unwrap());
    }
    HttpResponse::new(http::StatusCode::from_u16(code).unwrap(), headers, vec![])
}

fn request() -> HttpRequest {
    HttpRequest::new(
        http::Method::POST,
        url::Url::parse("https://example.com/api/v2/").unwrap(),
    )
}

fn client(
    mock: &Arc<MockClient>,
    max_attempts: i64,
) -> (RetryingClient<Arc<MockClient>, RecordingSleeper>, RecordingSleeper) {
    let mut policy = RetryPolicy::new().with_max_attempts(max_attempts);
    policy.validate().unwrap();

    let sleeper = RecordingSleeper::default();
    let client = policy
        .build_client(Arc::clone(mock))
        .unwrap()
        .with_sleeper(sleeper.clone());
    (client, sleeper)
}

mod retry_loop {
    use super::*;

    #[tokio::test]
    async fn success_on_first_attempt_does_not_sleep() {
        let mock = Arc::new(MockClient::new(vec![status(200)]));
        let (client, sleeper) = client(&mock, 4);

        let resp = client.request(request()).await.unwrap();

        assert_eq!(resp.status, http::StatusCode::OK);
        assert_eq!(mock.calls(), 1);
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn transient_errors_are_retried_with_backoff() {
        let mock = Arc::new(MockClient::new(vec![
            Err(HttpError::Timeout),
            Err(HttpError::Timeout),
            status(200),
        ]));
        let (client, sleeper) = client(&mock, 4);

        let resp = client.request(request()).await.unwrap();

        assert!(resp.is_success());
        assert_eq!(mock.calls(), 3);
        assert_eq!(
            sleeper.delays(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[tokio::test]
    async fn server_errors_are_retried() {
        let mock = Arc::new(MockClient::new(vec![status(503), status(502), status(204)]));
        let (client, _sleeper) = client(&mock, 4);

        let resp = client.request(request()).await.unwrap();

        assert_eq!(resp.status, http::StatusCode::NO_CONTENT);
        assert_eq!(mock.calls(), 3);
    }

    #[tokio::test]
    async fn client_errors_are_returned_without_retry() {
        let mock = Arc::new(MockClient::new(vec![status(404)]));
        let (client, sleeper) = client(&mock, 4);

        let resp = client.request(request()).await.unwrap();

        assert_eq!(resp.status, http::StatusCode::NOT_FOUND);
        assert_eq!(mock.calls(), 1);
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn invalid_url_fails_immediately() {
        let mock = Arc::new(MockClient::new(vec![Err(HttpError::InvalidUrl(
            "bad".to_string(),
        ))]));
        let (client, _sleeper) = client(&mock, 4);

        let result = client.request(request()).await;

        assert!(matches!(result, Err(HttpError::InvalidUrl(_))));
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let mock = Arc::new(MockClient::new(vec![
            Err(HttpError::Timeout),
            Err(HttpError::Timeout),
            Err(HttpError::Timeout),
        ]));
        let (client, sleeper) = client(&mock, 3);

        let result = client.request(request()).await;

        assert!(matches!(result, Err(HttpError::GaveUp { attempts: 3, .. })));
        assert_eq!(mock.calls(), 3);
        assert_eq!(sleeper.delays().len(), 2);
    }

    #[tokio::test]
    async fn single_attempt_never_sleeps() {
        let mock = Arc::new(MockClient::new(vec![status(500)]));
        let (client, sleeper) = client(&mock, 1);

        let result = client.request(request()).await;

        match result {
            Err(HttpError::GaveUp {
                attempts,
                last_error,
            }) => {
                assert_eq!(attempts, 1);
                assert!(last_error.contains("500"), "{last_error}");
            }
            other => panic!("expected GaveUp, got {other:?}"),
        }
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn retry_after_header_sets_delay() {
        let mock = Arc::new(MockClient::new(vec![
            Ok(response(429, Some("5"))),
            status(200),
        ]));
        let (client, sleeper) = client(&mock, 4);

        client.request(request()).await.unwrap();

        assert_eq!(sleeper.delays(), vec![Duration::from_secs(5)]);
    }

    #[tokio::test]
    async fn instant_sleeper_can_be_used() {
        let mock = Arc::new(MockClient::new(vec![Err(HttpError::Timeout), status(200)]));
        let mut policy = RetryPolicy::new();
        policy.validate().unwrap();
        let client = policy
            .build_client(Arc::clone(&mock))
            .unwrap()
            .with_sleeper(InstantSleeper);

        assert!(client.request(request()).await.is_ok());
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn default_sleeper_waits_between_attempts() {
        let mock = Arc::new(MockClient::new(vec![Err(HttpError::Timeout), status(200)]));
        let mut policy = RetryPolicy::new().with_wait_min(Duration::from_secs(3));
        policy.validate().unwrap();
        let client: RetryingClient<_, TokioSleeper> =
            policy.build_client(Arc::clone(&mock)).unwrap();

        let start = tokio::time::Instant::now();
        client.request(request()).await.unwrap();

        assert!(start.elapsed() >= Duration::from_secs(3));
    }
}

mod is_retryable {
    use super::*;

    #[test]
    fn transient_errors_are_retryable() {
        assert!(HttpError::Timeout.is_retryable());
        assert!(HttpError::Connection("refused".into()).is_retryable());
    }

    #[test]
    fn permanent_errors_are_not_retryable() {
        assert!(!HttpError::InvalidUrl("x".to_string()).is_retryable());
        assert!(
            !HttpError::GaveUp {
                attempts: 1,
                last_error: String::new()
            }
            .is_retryable()
        );
    }

    #[test]
    fn retryable_statuses() {
        for code in [408, 429, 500, 502, 503, 504] {
            assert!(response(code, None).is_retryable(), "{code}");
        }
    }

    #[test]
    fn non_retryable_statuses() {
        for code in [200, 301, 400, 401, 404, 501] {
            assert!(!response(code, None).is_retryable(), "{code}");
        }
    }
}
