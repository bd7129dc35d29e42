//! Integration tests for the download pipeline and full runs
//!
//! These tests use wiremock to serve documents and check what ends up on
//! disk after the pipeline drains its queue.

use doc_harvest::config::{Config, DownloadConfig};
use doc_harvest::download::DownloadPipeline;
use doc_harvest::manifest::{DownloadItem, DownloadQueue};
use doc_harvest::runner::{run, RunOptions, EXIT_DOWNLOAD_FAILURES, EXIT_OK};
use doc_harvest::state::{DownloadStatus, PipelineState};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

fn item(server: &MockServer, name: &str, directory: &Path) -> DownloadItem {
    DownloadItem {
        location: Url::parse(&format!("{}/{}", server.uri(), name)).unwrap(),
        directory: directory.to_path_buf(),
    }
}

#[tokio::test]
async fn test_failed_download_does_not_halt_queue() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        "/a.pdf",
        ResponseTemplate::new(200).set_body_bytes(b"first".to_vec()),
    )
    .await;
    mount(&mock_server, "/b.pdf", ResponseTemplate::new(500)).await;
    mount(
        &mock_server,
        "/c.pdf",
        ResponseTemplate::new(200).set_body_bytes(b"third".to_vec()),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let queue: DownloadQueue = ["a.pdf", "b.pdf", "c.pdf"]
        .iter()
        .map(|name| item(&mock_server, name, dir.path()))
        .collect();

    let mut pipeline = DownloadPipeline::new(
        &DownloadConfig::default(),
        Client::new(),
        CancellationToken::new(),
    );
    let report = pipeline.start(queue).await;

    assert_eq!(report.total(), 3);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);

    let statuses: Vec<_> = report.outcomes().iter().map(|o| o.status).collect();
    assert_eq!(
        statuses,
        vec![
            DownloadStatus::Succeeded,
            DownloadStatus::Failed,
            DownloadStatus::Succeeded
        ]
    );

    assert_eq!(std::fs::read(dir.path().join("a.pdf")).unwrap(), b"first");
    assert!(!dir.path().join("b.pdf").exists());
    assert_eq!(std::fs::read(dir.path().join("c.pdf")).unwrap(), b"third");

    assert_eq!(pipeline.state(), PipelineState::Terminated);
    assert_eq!(pipeline.transitions().last(), Some(&PipelineState::Terminated));
}

#[tokio::test]
async fn test_shared_file_name_failure_keeps_earlier_download() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        "/new/report.pdf",
        ResponseTemplate::new(200).set_body_bytes(b"good".to_vec()),
    )
    .await;
    mount(&mock_server, "/old/report.pdf", ResponseTemplate::new(404)).await;

    let dir = tempfile::tempdir().unwrap();
    let queue: DownloadQueue = ["new/report.pdf", "old/report.pdf"]
        .iter()
        .map(|name| item(&mock_server, name, dir.path()))
        .collect();

    let mut pipeline = DownloadPipeline::new(
        &DownloadConfig::default(),
        Client::new(),
        CancellationToken::new(),
    );
    let report = pipeline.start(queue).await;

    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed(), 1);
    assert_eq!(std::fs::read(dir.path().join("report.pdf")).unwrap(), b"good");
    assert!(!dir.path().join("report (1).pdf").exists());
    assert!(!dir.path().join("report (1).pdf.part").exists());
}

#[tokio::test]
async fn test_shared_file_name_downloads_are_kept_apart() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        "/new/report.pdf",
        ResponseTemplate::new(200)
            .set_body_bytes(b"new".to_vec())
            .set_delay(Duration::from_millis(30)),
    )
    .await;
    mount(
        &mock_server,
        "/old/report.pdf",
        ResponseTemplate::new(200)
            .set_body_bytes(b"old".to_vec())
            .set_delay(Duration::from_millis(30)),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let queue: DownloadQueue = ["new/report.pdf", "old/report.pdf"]
        .iter()
        .map(|name| item(&mock_server, name, dir.path()))
        .collect();

    let config = DownloadConfig {
        concurrency: 2,
        ..DownloadConfig::default()
    };
    let mut pipeline = DownloadPipeline::new(&config, Client::new(), CancellationToken::new());
    let report = pipeline.start(queue).await;

    assert!(report.all_succeeded());
    assert_eq!(std::fs::read(dir.path().join("report.pdf")).unwrap(), b"new");
    assert_eq!(
        std::fs::read(dir.path().join("report (1).pdf")).unwrap(),
        b"old"
    );

    let destinations: Vec<_> = report
        .outcomes()
        .iter()
        .filter_map(|o| o.destination.clone())
        .collect();
    assert_eq!(destinations.len(), 2);
    assert_ne!(destinations[0], destinations[1]);
}

#[tokio::test]
async fn test_single_item_transitions() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        "/only.pdf",
        ResponseTemplate::new(200).set_body_bytes(b"%PDF".to_vec()),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let queue: DownloadQueue = std::iter::once(item(&mock_server, "only.pdf", dir.path())).collect();

    let mut pipeline = DownloadPipeline::new(
        &DownloadConfig::default(),
        Client::new(),
        CancellationToken::new(),
    );
    pipeline.start(queue).await;

    assert_eq!(
        pipeline.transitions(),
        &[
            PipelineState::Idle,
            PipelineState::Draining,
            PipelineState::Idle,
            PipelineState::Terminated
        ]
    );
}

#[tokio::test]
async fn test_default_pipeline_is_sequential() {
    let mock_server = MockServer::start().await;
    for name in ["/1.pdf", "/2.pdf", "/3.pdf", "/4.pdf"] {
        mount(
            &mock_server,
            name,
            ResponseTemplate::new(200)
                .set_body_bytes(b"%PDF".to_vec())
                .set_delay(Duration::from_millis(20)),
        )
        .await;
    }

    let dir = tempfile::tempdir().unwrap();
    let queue: DownloadQueue = ["1.pdf", "2.pdf", "3.pdf", "4.pdf"]
        .iter()
        .map(|name| item(&mock_server, name, dir.path()))
        .collect();

    let mut pipeline = DownloadPipeline::new(
        &DownloadConfig::default(),
        Client::new(),
        CancellationToken::new(),
    );
    let report = pipeline.start(queue).await;

    assert!(report.all_succeeded());
    assert_eq!(pipeline.peak_in_flight(), 1);
    assert_eq!(pipeline.transitions().first(), Some(&PipelineState::Idle));
}

#[tokio::test]
async fn test_bounded_concurrency_is_respected() {
    let mock_server = MockServer::start().await;
    let names = ["1.pdf", "2.pdf", "3.pdf", "4.pdf", "5.pdf", "6.pdf"];
    for name in names {
        mount(
            &mock_server,
            &format!("/{}", name),
            ResponseTemplate::new(200)
                .set_body_bytes(b"%PDF".to_vec())
                .set_delay(Duration::from_millis(50)),
        )
        .await;
    }

    let dir = tempfile::tempdir().unwrap();
    let queue: DownloadQueue = names
        .iter()
        .map(|name| item(&mock_server, name, dir.path()))
        .collect();

    let config = DownloadConfig {
        concurrency: 2,
        ..DownloadConfig::default()
    };
    let mut pipeline = DownloadPipeline::new(&config, Client::new(), CancellationToken::new());
    let report = pipeline.start(queue).await;

    assert_eq!(report.succeeded(), names.len());
    assert!(pipeline.peak_in_flight() <= 2);
}

#[tokio::test]
async fn test_full_run_writes_documents_under_titles() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        "/index.html",
        ResponseTemplate::new(200).set_body_string(
            "<html><head><title>Report</title></head><body>\
             <a href=\"a.pdf\">A</a><a href=\"sub.html\">Sub</a></body></html>",
        ),
    )
    .await;
    mount(
        &mock_server,
        "/sub.html",
        ResponseTemplate::new(200).set_body_string(
            "<html><head><title>Sub</title></head><body>\
             <a href=\"c.pdf\">C</a></body></html>",
        ),
    )
    .await;
    mount(
        &mock_server,
        "/a.pdf",
        ResponseTemplate::new(200).set_body_bytes(b"alpha".to_vec()),
    )
    .await;
    mount(
        &mock_server,
        "/c.pdf",
        ResponseTemplate::new(200).set_body_bytes(b"gamma".to_vec()),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let manifest_path = dir.path().join("fileManifest.txt");
    let mut config = Config::default();
    config.seeds = vec![format!("{}/index.html", mock_server.uri())];
    config.output.root_dir = dir.path().to_string_lossy().into_owned();
    config.output.manifest_path = manifest_path.to_string_lossy().into_owned();

    let summary = run(&config, RunOptions::default(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.pages, 2);
    assert_eq!(summary.documents, 2);
    assert_eq!(summary.exit_status(), EXIT_OK);
    assert!(summary.run_root.starts_with(dir.path()));

    let report_dir = summary.run_root.join("Report");
    assert_eq!(std::fs::read(report_dir.join("a.pdf")).unwrap(), b"alpha");
    assert_eq!(
        std::fs::read(report_dir.join("Sub").join("c.pdf")).unwrap(),
        b"gamma"
    );

    let dump: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&manifest_path).unwrap()).unwrap();
    assert_eq!(dump[&config.seeds[0]]["title"], "Report");
}

#[tokio::test]
async fn test_crawl_only_run_skips_downloads() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        "/index.html",
        ResponseTemplate::new(200).set_body_string(
            "<html><head><title>Report</title></head><body>\
             <a href=\"a.pdf\">A</a></body></html>",
        ),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.seeds = vec![format!("{}/index.html", mock_server.uri())];
    config.output.root_dir = dir.path().to_string_lossy().into_owned();
    config.output.manifest_path = dir
        .path()
        .join("fileManifest.txt")
        .to_string_lossy()
        .into_owned();

    let summary = run(
        &config,
        RunOptions { crawl_only: true },
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert!(summary.report.is_none());
    assert_eq!(summary.documents, 1);
    assert_eq!(std::fs::read_dir(&summary.run_root).unwrap().count(), 0);
}

#[tokio::test]
async fn test_run_with_failed_download_reports_failure() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        "/index.html",
        ResponseTemplate::new(200).set_body_string(
            "<html><head><title>Report</title></head><body>\
             <a href=\"gone.pdf\">Gone</a></body></html>",
        ),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.seeds = vec![format!("{}/index.html", mock_server.uri())];
    config.output.root_dir = dir.path().to_string_lossy().into_owned();
    config.output.manifest_path = dir
        .path()
        .join("fileManifest.txt")
        .to_string_lossy()
        .into_owned();

    let summary = run(&config, RunOptions::default(), CancellationToken::new())
        .await
        .unwrap();

    let report = summary.report.as_ref().unwrap();
    assert_eq!(report.failed(), 1);
    assert_eq!(summary.exit_status(), EXIT_DOWNLOAD_FAILURES);
}
