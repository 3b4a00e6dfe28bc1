//! Poller driving probes over a `RemoteStateSource` trait object

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::time::Instant;
use wedtest_common::{
    changed_from, probe_fn, sample_fn, until_count, Error, Poller, Readiness, Remote, RemoteError,
    RemoteStateSource, Result,
};

/// Scroll offset that advances by ten pixels every `step` queries
struct DriftingPage {
    queries: AtomicI64,
    step: i64,
}

impl DriftingPage {
    fn new(step: i64) -> Self {
        Self {
            queries: AtomicI64::new(0),
            step,
        }
    }
}

#[async_trait]
impl RemoteStateSource for DriftingPage {
    async fn execute(&self, script: &str, _args: &[Value]) -> std::result::Result<Value, RemoteError> {
        if script.contains("throw") {
            return Err(RemoteError::new("javascript error: boom"));
        }
        let n = self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(json!((n / self.step) * 10))
    }

    async fn window_handles(&self) -> std::result::Result<Vec<String>, RemoteError> {
        Ok(vec![])
    }
}

fn scroll_top() -> impl wedtest_common::Probe<Remote, Output = i64, Error = Error> {
    sample_fn::<Remote, i64, Error, _>(|remote: &Remote| {
        Box::pin(async move {
            let value = remote.execute("return window.scrollY;", &[]).await?;
            Ok(value.as_i64().unwrap_or_default())
        })
    })
}

#[tokio::test(start_paused = true)]
async fn test_changed_value_is_returned() {
    let page = DriftingPage::new(3);
    let remote: &Remote = &page;
    let poller = Poller::new(Duration::from_secs(5), Duration::from_millis(100));

    let prior = 0;
    let value = poller
        .wait(remote, changed_from(scroll_top(), prior))
        .await
        .unwrap();

    assert_eq!(value, 10);
    assert_ne!(value, prior);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_names_elapsed_and_limit() {
    let page = DriftingPage::new(1_000);
    let remote: &Remote = &page;
    let poller = Poller::default();
    let start = Instant::now();

    let err = poller
        .wait_timeout(
            remote,
            changed_from(scroll_top(), 0),
            Duration::from_millis(500),
        )
        .await
        .unwrap_err();

    assert!(err.is_timeout());
    match err {
        Error::Timeout(timeout) => {
            assert_eq!(timeout.limit, Duration::from_millis(500));
            assert_eq!(timeout.elapsed, start.elapsed());
            assert!(timeout.to_string().contains("limit: 500ms"));
        }
        other => panic!("Expected timeout, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_remote_error_is_returned_unchanged() {
    let page = DriftingPage::new(1);
    let remote: &Remote = &page;

    let probe = probe_fn::<Remote, (), Error, _>(|remote: &Remote| {
        Box::pin(async move {
            remote.execute("throw new Error('boom');", &[]).await?;
            Ok(Readiness::NotReady)
        })
    });
    let err = Poller::default().wait(remote, probe).await.unwrap_err();

    match err {
        Error::Remote(e) => assert_eq!(e.message, "javascript error: boom"),
        other => panic!("Expected remote error, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_count_wait_on_empty_collection() {
    let page = DriftingPage::new(1);
    let remote: &Remote = &page;

    let windows = probe_fn::<Remote, usize, Error, _>(|remote: &Remote| {
        Box::pin(async move { Ok(Readiness::Ready(remote.window_handles().await?.len())) })
    });
    let count: Result<usize> = Poller::default().wait(remote, until_count(windows, 0)).await;

    assert_eq!(count.unwrap(), 0);
}
