// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use asc_core::fake::{FakeSiteLister, FakeTrigger};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a test with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::default();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

#[test]
fn traced_trigger_logs_span_and_timing() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedTrigger::new(FakeTrigger::new());
        traced
            .fire("https://a.example/wp-cron.php", Duration::from_millis(10))
            .await
    });

    assert!(result.is_ok());
    assert!(logs.contains("trigger.fire"), "Logs:\n{}", logs);
    assert!(logs.contains("https://a.example/wp-cron.php"), "Logs:\n{}", logs);
    assert!(logs.contains("elapsed_ms"), "Logs:\n{}", logs);
}

#[test]
fn traced_trigger_logs_failures() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeTrigger::new();
        fake.fail_site("https://down.example");
        TracedTrigger::new(fake)
            .fire("https://down.example/wp-cron.php", Duration::from_millis(10))
            .await
    });

    assert!(result.is_err());
    assert!(logs.contains("fire failed"), "Logs:\n{}", logs);
    assert!(logs.contains("connection refused"), "Logs:\n{}", logs);
}

#[test]
fn traced_lister_logs_page_size() {
    let (logs, result) = with_tracing(|| async {
        TracedSiteLister::new(FakeSiteLister::with_sites(7))
            .list(0, 50)
            .await
    });

    assert_eq!(result.unwrap().len(), 7);
    assert!(logs.contains("sites.list"), "Logs:\n{}", logs);
    assert!(logs.contains("returned=7"), "Logs:\n{}", logs);
}

#[tokio::test]
async fn traced_wrappers_pass_results_through() {
    let fake = FakeSiteLister::with_sites(3);
    fake.fail_at_offset(3);
    let traced = TracedSiteLister::new(fake.clone());

    assert_eq!(traced.list(0, 3).await.unwrap().len(), 3);
    assert!(traced.list(3, 3).await.is_err());
    assert_eq!(fake.calls().len(), 2);
}
