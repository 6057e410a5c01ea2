//! Integration test: full resolution against a local catalog server over curl.
//!
//! Search listing → detail page → interstitial page → redirected binary, with
//! the first candidate failing so fallback to the next one is exercised.

mod common;

use apkdl_core::config::ApkdlConfig;
use apkdl_core::http::CurlTransport;
use apkdl_core::package::PackageKind;
use apkdl_core::progress::Progress;
use apkdl_core::query::GoogleTranslator;
use apkdl_core::{FailureKind, Orchestrator, ResolutionResult};
use common::catalog_server::{self, Route};
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

const SEARCH_HTML: &str = r#"
<html><body>
  <div class="first"><a href="/broken/com.broken" title="Broken Game">Broken</a></div>
  <div class="first"><a href="/skyrace/com.example.skyrace" title="Sky Race 3D">Sky</a></div>
  <div class="first"><a href="https://elsewhere.example/x/y" title="Off-site">Off</a></div>
</body></html>
"#;

const DETAIL_HTML: &str = r#"
<html><head><meta property="og:image" content="/icons/skyrace.png=w128"></head><body>
  <span class="version">Version: 2.4.1</span>
  <p class="author">Example Studio</p>
  <a class="download-btn" href="/skyrace/com.example.skyrace/download">Download XAPK</a>
</body></html>
"#;

const INTERSTITIAL_HTML: &str = r#"
<html><body><p>Your download will start shortly.</p>
  <a id="download_link" href="/go/com.example.skyrace">click here</a>
</body></html>
"#;

fn config_for(base_url: &str) -> ApkdlConfig {
    let mut cfg = ApkdlConfig::default();
    cfg.catalog_base_url = base_url.to_string();
    cfg.catalog_domain = "127.0.0.1".to_string();
    cfg.translation.endpoint = format!("{}/translate_a/single", base_url);
    cfg.timeouts.connect_secs = 5;
    cfg.timeouts.page_secs = 10;
    cfg.timeouts.search_secs = 10;
    cfg.timeouts.download_secs = 30;
    cfg
}

fn files_in(dir: &Path) -> Vec<String> {
    if !dir.exists() {
        return Vec::new();
    }
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn falls_back_to_second_candidate_and_downloads_xapk() {
    let body: Vec<u8> = (0u8..200).cycle().take(256 * 1024).collect();
    let server = catalog_server::start(vec![
        ("/search", Route::html(SEARCH_HTML)),
        ("/broken/com.broken", Route::status(500)),
        ("/skyrace/com.example.skyrace", Route::html(DETAIL_HTML)),
        ("/skyrace/com.example.skyrace/download", Route::html(INTERSTITIAL_HTML)),
        ("/go/com.example.skyrace", Route::redirect("/files/skyrace")),
        (
            "/files/skyrace",
            Route::binary(
                body.clone(),
                Some("attachment; filename=\"Sky_Race_3D_2.4.1.xapk\""),
            ),
        ),
    ]);
    let cfg = config_for(&server.base_url);
    let downloads = tempdir().unwrap();
    let transport = CurlTransport::new(cfg.timeouts.connect(), Some(cfg.chunk_size_bytes));
    let translator = GoogleTranslator::new(&transport, &cfg);
    let orchestrator =
        Orchestrator::new(&cfg, &transport, &translator, downloads.path().to_path_buf());

    let mut last = None;
    let result = orchestrator
        .resolve("sky race", &mut |p: &Progress| last = Some(*p))
        .expect("resolve");

    let meta = match &result {
        ResolutionResult::Success(meta) => meta.clone(),
        other => panic!("expected success, got {:?}", other),
    };
    assert_eq!(meta.title, "Sky Race 3D");
    assert_eq!(meta.version, "2.4.1");
    assert_eq!(meta.developer, "Example Studio");
    assert_eq!(
        meta.icon_url.as_deref(),
        Some(format!("{}/icons/skyrace.png", server.base_url).as_str())
    );
    assert_eq!(meta.file_kind, PackageKind::Xapk);
    assert!(meta.has_expansion_data);
    assert_eq!(meta.file_name, "Sky_Race_3D.xapk");
    assert_eq!(meta.size_bytes, body.len() as u64);
    assert_eq!(meta.size_label, "0.25 MB");

    assert_eq!(std::fs::read(downloads.path().join("Sky_Race_3D.xapk")).unwrap(), body);
    assert_eq!(files_in(downloads.path()), ["Sky_Race_3D.xapk"]);

    let last = last.expect("progress reported");
    assert_eq!(last.bytes_done, body.len() as u64);
    assert_eq!(last.percent(), 100.0);

    let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
    assert_eq!(json["fileType"], "XAPK");
    assert_eq!(json["hasOBB"], true);
    assert_eq!(json["filename"], "Sky_Race_3D.xapk");

    let requests = server.requests();
    assert_eq!(requests[0], "/search?q=sky+race");
    assert!(!requests.iter().any(|r| r.starts_with("/translate_a")));
    assert!(!requests.iter().any(|r| r.contains("elsewhere")));
}

#[test]
fn arabic_query_is_translated_before_search() {
    let server = catalog_server::start(vec![
        (
            "/translate_a/single",
            Route::html(r#"[[["Sky ","سماء",null,null,1],["Race","سباق",null,null,1]],null,"ar"]"#),
        ),
        ("/search", Route::html("<p>No results found</p>")),
    ]);
    let cfg = config_for(&server.base_url);
    let downloads = tempdir().unwrap();
    let transport = CurlTransport::new(cfg.timeouts.connect(), None);
    let translator = GoogleTranslator::new(&transport, &cfg);
    let orchestrator =
        Orchestrator::new(&cfg, &transport, &translator, downloads.path().to_path_buf());

    let result = orchestrator.resolve("سباق السماء", &mut |_| {}).expect("resolve");
    match result {
        ResolutionResult::Failure { kind, message } => {
            assert_eq!(kind, FailureKind::NotFound);
            assert!(message.contains("'سباق السماء'"));
        }
        other => panic!("expected not-found, got {:?}", other),
    }

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].starts_with("/translate_a/single?client=gtx&sl=ar&tl=en&dt=t&q="));
    assert_eq!(requests[1], "/search?q=Sky+Race");
}

#[test]
fn every_candidate_failing_download_leaves_no_files() {
    let server = catalog_server::start(vec![
        (
            "/search",
            Route::html(r#"<div class="first"><a href="/skyrace/com.example.skyrace" title="Sky Race 3D">Sky</a></div>"#),
        ),
        ("/skyrace/com.example.skyrace", Route::html(DETAIL_HTML)),
        ("/skyrace/com.example.skyrace/download", Route::html(INTERSTITIAL_HTML)),
        ("/go/com.example.skyrace", Route::status(500)),
    ]);
    let cfg = config_for(&server.base_url);
    let downloads = tempdir().unwrap();
    let target = downloads.path().join("packages");
    let transport = CurlTransport::new(cfg.timeouts.connect(), None);
    let translator = GoogleTranslator::new(&transport, &cfg);
    let orchestrator = Orchestrator::new(&cfg, &transport, &translator, target.clone());

    let result = orchestrator.resolve("sky race", &mut |_| {}).expect("resolve");
    match result {
        ResolutionResult::Failure { kind, message } => {
            assert_eq!(kind, FailureKind::AllAttemptsFailed);
            assert!(message.contains("'sky race'"));
        }
        other => panic!("expected exhaustion, got {:?}", other),
    }
    assert!(files_in(&target).is_empty());
}

#[test]
fn unreachable_catalog_is_not_found() {
    let mut cfg = config_for("http://127.0.0.1:9");
    cfg.timeouts.connect_secs = 2;
    let downloads = tempdir().unwrap();
    let transport = CurlTransport::new(cfg.timeouts.connect(), None);
    let translator = GoogleTranslator::new(&transport, &cfg);
    let orchestrator =
        Orchestrator::new(&cfg, &transport, &translator, downloads.path().to_path_buf());

    match orchestrator.resolve("anything", &mut |_| {}).expect("resolve") {
        ResolutionResult::Failure { kind, .. } => assert_eq!(kind, FailureKind::NotFound),
        other => panic!("expected not-found, got {:?}", other),
    }
}

const STUCK_DETAIL_HTML: &str = r#"
<html><body>
  <span class="version">Version: 1.0</span>
  <a class="download-btn" href="/stuck/com.example.stuck/download">Download APK</a>
</body></html>
"#;

const STUCK_INTERSTITIAL_HTML: &str =
    r#"<a id="download_link" href="/files/stuck.apk">click here</a>"#;

#[test]
fn stalled_download_is_soft_and_next_candidate_wins() {
    let body: Vec<u8> = (0u8..50).cycle().take(32 * 1024).collect();
    let server = catalog_server::start(vec![
        (
            "/search",
            Route::html(
                r#"<div class="first"><a href="/stuck/com.example.stuck" title="Stuck App">S</a></div>
                   <div class="first"><a href="/skyrace/com.example.skyrace" title="Sky Race 3D">R</a></div>"#,
            ),
        ),
        ("/stuck/com.example.stuck", Route::html(STUCK_DETAIL_HTML)),
        ("/stuck/com.example.stuck/download", Route::html(STUCK_INTERSTITIAL_HTML)),
        ("/files/stuck.apk", Route::stalled(vec![1u8; 64 * 1024], 512)),
        ("/skyrace/com.example.skyrace", Route::html(DETAIL_HTML)),
        ("/skyrace/com.example.skyrace/download", Route::html(INTERSTITIAL_HTML)),
        ("/go/com.example.skyrace", Route::binary(body.clone(), None)),
    ]);
    let mut cfg = config_for(&server.base_url);
    cfg.timeouts.stall_secs = 1;
    cfg.timeouts.stall_min_bytes_per_sec = 1024;
    let downloads = tempdir().unwrap();
    let transport = CurlTransport::new(cfg.timeouts.connect(), None);
    let translator = GoogleTranslator::new(&transport, &cfg);
    let orchestrator =
        Orchestrator::new(&cfg, &transport, &translator, downloads.path().to_path_buf());

    let result = orchestrator.resolve("app", &mut |_| {}).expect("resolve");
    match result {
        ResolutionResult::Success(meta) => {
            assert_eq!(meta.title, "Sky Race 3D");
            assert_eq!(meta.size_bytes, body.len() as u64);
        }
        other => panic!("expected fallback success, got {:?}", other),
    }
    assert_eq!(files_in(downloads.path()), ["Sky_Race_3D.apk"]);
    assert!(server.requests().iter().any(|r| r == "/files/stuck.apk"));
}

#[test]
fn steady_stream_outlasting_stall_window_completes() {
    let body: Vec<u8> = (0u8..100).cycle().take(30 * 1024).collect();
    let server = catalog_server::start(vec![
        (
            "/search",
            Route::html(r#"<div class="first"><a href="/skyrace/com.example.skyrace" title="Sky Race 3D">R</a></div>"#),
        ),
        ("/skyrace/com.example.skyrace", Route::html(DETAIL_HTML)),
        ("/skyrace/com.example.skyrace/download", Route::html(INTERSTITIAL_HTML)),
        (
            "/go/com.example.skyrace",
            Route::trickle(body.clone(), 1024, Duration::from_millis(100)),
        ),
    ]);
    let mut cfg = config_for(&server.base_url);
    cfg.timeouts.stall_secs = 1;
    cfg.timeouts.stall_min_bytes_per_sec = 1024;
    let downloads = tempdir().unwrap();
    let transport = CurlTransport::new(cfg.timeouts.connect(), None);
    let translator = GoogleTranslator::new(&transport, &cfg);
    let orchestrator =
        Orchestrator::new(&cfg, &transport, &translator, downloads.path().to_path_buf());

    let result = orchestrator.resolve("sky race", &mut |_| {}).expect("resolve");
    match result {
        ResolutionResult::Success(meta) => assert_eq!(meta.size_bytes, body.len() as u64),
        other => panic!("expected success, got {:?}", other),
    }
    assert_eq!(std::fs::read(downloads.path().join("Sky_Race_3D.apk")).unwrap(), body);
}
