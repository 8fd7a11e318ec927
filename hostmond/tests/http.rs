use hostmond::{AppState, StatReader, api, exporter::METRIC_NAMES};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

struct TestServer {
    base_url: String,
    stop: oneshot::Sender<()>,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

async fn start(reader: StatReader) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let (stop, stopped) = oneshot::channel::<()>();
    let state = Arc::new(AppState::new(reader));

    let handle = tokio::spawn(api::serve(listener, state, async move {
        let _ = stopped.await;
    }));

    TestServer {
        base_url,
        stop,
        handle,
    }
}

impl TestServer {
    async fn shutdown(self) {
        let _ = self.stop.send(());
        self.handle.await.unwrap().unwrap();
    }
}

#[tokio::test]
async fn health_and_metrics_over_http() {
    let mut meminfo = NamedTempFile::new().unwrap();
    write!(meminfo, "MemTotal:  2048 kB\nMemAvailable:  512 kB\n").unwrap();
    let mut stat = NamedTempFile::new().unwrap();
    writeln!(stat, "cpu  100 0 0 200 50 0 0 0").unwrap();

    let server = start(StatReader::new(meminfo.path(), stat.path())).await;

    let health = reqwest::get(format!("{}/health", server.base_url))
        .await
        .unwrap();
    assert_eq!(health.status(), reqwest::StatusCode::OK);
    assert_eq!(health.text().await.unwrap(), "ok");

    let metrics = reqwest::get(format!("{}/metrics", server.base_url))
        .await
        .unwrap();
    assert_eq!(metrics.status(), reqwest::StatusCode::OK);
    let body = metrics.text().await.unwrap();

    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), METRIC_NAMES.len());
    for (line, name) in lines.iter().zip(METRIC_NAMES) {
        let (key, value) = line.split_once(' ').unwrap();
        assert_eq!(key, name);
        assert!(value.parse::<f64>().is_ok(), "non-numeric line: {line}");
    }
    assert!(body.contains("node_memory_total_kb 2048\n"));
    assert!(body.contains("node_memory_used_kb 1536\n"));
    assert!(body.contains("node_memory_available_kb 512\n"));
    // The stat file never changes, so no ticks elapse in the window.
    assert!(body.ends_with("node_cpu_usage_percent 0.00\n"));

    server.shutdown().await;
}

#[tokio::test]
async fn metrics_with_missing_proc_files() {
    let dir = tempfile::tempdir().unwrap();
    let server = start(StatReader::new(
        dir.path().join("meminfo"),
        dir.path().join("stat"),
    ))
    .await;

    let body = reqwest::get(format!("{}/metrics", server.base_url))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert_eq!(body.lines().count(), METRIC_NAMES.len());
    assert!(body.contains("node_memory_total_kb 0\n"));
    assert!(body.ends_with("node_cpu_usage_percent 0.00\n"));

    server.shutdown().await;
}

#[tokio::test]
async fn concurrent_metrics_requests_sample_independently() {
    let dir = tempfile::tempdir().unwrap();
    let server = start(StatReader::new(
        dir.path().join("meminfo"),
        dir.path().join("stat"),
    ))
    .await;

    let url = format!("{}/metrics", server.base_url);
    let started = std::time::Instant::now();
    let (a, b) = tokio::join!(reqwest::get(&url), reqwest::get(&url));
    let elapsed = started.elapsed();

    assert_eq!(a.unwrap().status(), reqwest::StatusCode::OK);
    assert_eq!(b.unwrap().status(), reqwest::StatusCode::OK);
    // Both windows overlap instead of running back to back.
    assert!(elapsed < hostmond::sampler::SAMPLE_INTERVAL * 2, "{elapsed:?}");

    server.shutdown().await;
}
