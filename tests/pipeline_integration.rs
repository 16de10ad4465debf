//! End-to-end runs against a local HTTP server

use axum::{http::StatusCode, routing::get, Router};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

use epg_merge::{Config, Pipeline, PipelineError};

struct Route {
    path: &'static str,
    status: StatusCode,
    body: Vec<u8>,
}

fn ok(path: &'static str, body: impl Into<Vec<u8>>) -> Route {
    Route {
        path,
        status: StatusCode::OK,
        body: body.into(),
    }
}

fn status(path: &'static str, status: StatusCode) -> Route {
    Route {
        path,
        status,
        body: b"error".to_vec(),
    }
}

/// Serve `routes` on an ephemeral port and return the base URL
async fn serve(routes: Vec<Route>) -> String {
    let mut router = Router::new();
    for route in routes {
        let Route { path, status, body } = route;
        router = router.route(
            path,
            get(move || {
                let body = body.clone();
                async move { (status, body) }
            }),
        );
    }

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

fn write_sources(dir: &Path, sources: &[(&str, String)]) {
    let list: Vec<serde_json::Value> = sources
        .iter()
        .map(|(country, url)| serde_json::json!({ "country": country, "url": url }))
        .collect();
    write(dir, "epg_sources.json", &serde_json::to_string(&list).unwrap());
}

fn config_for(dir: &TempDir) -> Config {
    Config {
        base_dir: dir.path().to_path_buf(),
        fetch_timeout: Duration::from_secs(10),
        ..Config::default()
    }
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

const NEWS_MAPPING: &str = r#"[
    {"name": "News 2", "tvg_id": "n2", "stream_url": "http://x/n2"},
    {"name": "News 10", "tvg_id": "n10", "stream_url": "http://x/n10"}
]"#;

#[tokio::test]
async fn test_end_to_end_merge_and_playlist() {
    let base = serve(vec![ok(
        "/epg.xml",
        r#"<tv><channel id="n2"/><programme channel="n2"/><channel id="zzz"/></tv>"#,
    )])
    .await;
    let dir = TempDir::new().unwrap();
    write(dir.path(), "mapping.json", NEWS_MAPPING);
    write_sources(dir.path(), &[("UK", format!("{base}/epg.xml"))]);

    let summary = Pipeline::new(config_for(&dir)).unwrap().run().await.unwrap();

    assert_eq!(summary.programme_count, 1);
    assert_eq!(summary.channel_count, 1);
    assert_eq!(summary.playlist_entries, 2);
    assert!(summary.failed_sources.is_empty());

    assert_eq!(
        read(&summary.epg_path),
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<tv generator-info-name=\"Custom EPG Merger\" generator-info-url=\"https://example.com\">\n",
            "  <channel id=\"n2\"/>\n",
            "  <programme channel=\"n2\"/>\n",
            "</tv>\n",
        )
    );
    assert_eq!(
        read(&summary.playlist_path),
        concat!(
            "#EXTM3U x-tvg-url=\"https://example.com/epg.xml\"\n",
            "#EXTINF:-1 tvg-id=\"n2\" tvg-logo=\"\" group-title=\"Uncategorized\",News 2\n",
            "http://x/n2\n",
            "#EXTINF:-1 tvg-id=\"n10\" tvg-logo=\"\" group-title=\"Uncategorized\",News 10\n",
            "http://x/n10",
        )
    );
}

#[tokio::test]
async fn test_failing_source_is_isolated() {
    let base = serve(vec![
        status("/broken.xml", StatusCode::INTERNAL_SERVER_ERROR),
        ok(
            "/good.xml",
            r#"<tv><channel id="n10"/><programme channel="n10"/><programme channel="n10"/></tv>"#,
        ),
    ])
    .await;
    let dir = TempDir::new().unwrap();
    write(dir.path(), "mapping.json", NEWS_MAPPING);
    write_sources(
        dir.path(),
        &[
            ("A", format!("{base}/broken.xml")),
            ("B", format!("{base}/good.xml")),
        ],
    );

    let summary = Pipeline::new(config_for(&dir)).unwrap().run().await.unwrap();

    assert_eq!(summary.programme_count, 2);
    assert_eq!(summary.failed_sources.len(), 1);
    assert_eq!(summary.failed_sources[0].country, "A");
    assert!(summary.failed_sources[0].error.contains("500"));

    let epg = read(&summary.epg_path);
    assert!(epg.contains(r#"<channel id="n10"/>"#));
    assert!(!epg.contains("n2"));
}

#[tokio::test]
async fn test_unparseable_source_is_isolated() {
    let base = serve(vec![
        ok("/html", "<<<< definitely not a guide"),
        ok("/good.xml", r#"<tv><programme channel="n2"><title>Headlines</title></programme></tv>"#),
    ])
    .await;
    let dir = TempDir::new().unwrap();
    write(dir.path(), "mapping.json", NEWS_MAPPING);
    write_sources(
        dir.path(),
        &[("Bad", format!("{base}/html")), ("Good", format!("{base}/good.xml"))],
    );

    let summary = Pipeline::new(config_for(&dir)).unwrap().run().await.unwrap();

    assert_eq!(summary.programme_count, 1);
    assert_eq!(summary.failed_sources.len(), 1);
    assert_eq!(summary.failed_sources[0].country, "Bad");
    assert!(read(&summary.epg_path).contains("<title>Headlines</title>"));
}

#[tokio::test]
async fn test_failure_report_masks_credentials() {
    let base = serve(Vec::new()).await;
    let dir = TempDir::new().unwrap();
    write(dir.path(), "mapping.json", NEWS_MAPPING);
    write_sources(
        dir.path(),
        &[("Private", format!("{base}/xmltv.php?username=alice&password=secret"))],
    );

    let summary = Pipeline::new(config_for(&dir)).unwrap().run().await.unwrap();

    assert_eq!(summary.failed_sources.len(), 1);
    let failure = &summary.failed_sources[0];
    assert!(failure.url.contains("username=****&password=****"));
    assert!(!failure.url.contains("secret"));
    assert!(!failure.error.contains("secret"));
    assert!(failure.error.contains("404"));
}

#[tokio::test]
async fn test_reruns_are_byte_identical() {
    let base = serve(vec![ok(
        "/epg.xml",
        r#"<tv><channel id="n2"><display-name>News &amp; Weather</display-name></channel><programme start="20240101060000 +0000" channel="n2"><title>Morning</title></programme></tv>"#,
    )])
    .await;
    let dir = TempDir::new().unwrap();
    write(dir.path(), "mapping.json", NEWS_MAPPING);
    write_sources(dir.path(), &[("UK", format!("{base}/epg.xml"))]);
    let pipeline = Pipeline::new(config_for(&dir)).unwrap();

    let first = pipeline.run().await.unwrap();
    let epg = std::fs::read(&first.epg_path).unwrap();
    let playlist = std::fs::read(&first.playlist_path).unwrap();

    let second = pipeline.run().await.unwrap();
    assert_eq!(std::fs::read(&second.epg_path).unwrap(), epg);
    assert_eq!(std::fs::read(&second.playlist_path).unwrap(), playlist);
}

#[tokio::test]
async fn test_missing_mapping_is_fatal_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    write_sources(dir.path(), &[("UK", "http://127.0.0.1:9/epg.xml".to_string())]);
    let config = config_for(&dir);

    let err = Pipeline::new(config.clone())
        .unwrap()
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::ConfigLoad { .. }));
    assert!(!config.epg_output_path().exists());
    assert!(!config.m3u_output_path().exists());
}

#[tokio::test]
async fn test_channels_without_stream_are_left_out_of_playlist() {
    let base = serve(vec![ok("/epg.xml", "<tv/>")]).await;
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "mapping.json",
        r#"[
            {"name": "Radio 1", "tvg_id": "r1"},
            {"name": "TV 1", "tvg_id": "t1", "stream_url": "http://x/t1", "category": "TV"}
        ]"#,
    );
    write_sources(dir.path(), &[("UK", format!("{base}/epg.xml"))]);

    let summary = Pipeline::new(config_for(&dir)).unwrap().run().await.unwrap();

    let playlist = read(&summary.playlist_path);
    assert_eq!(summary.playlist_entries, 1);
    assert_eq!(playlist.lines().count(), 3);
    assert!(!playlist.contains("Radio 1"));
    assert!(playlist.contains(r#"group-title="TV",TV 1"#));
}

#[tokio::test]
async fn test_custom_file_names_and_base_url() {
    let base = serve(vec![ok("/epg.xml", r#"<tv><channel id="n2"/></tv>"#)]).await;
    let dir = TempDir::new().unwrap();
    write(dir.path(), "channels.json", NEWS_MAPPING);
    write(
        dir.path(),
        "feeds.json",
        &format!(r#"[{{"country":"UK","url":"{base}/epg.xml"}}]"#),
    );
    let config = Config {
        base_url: "https://tv.example.net/".to_string(),
        mapping_filename: "channels.json".to_string(),
        epg_sources_filename: "feeds.json".to_string(),
        local_epg_filename: "public/guide.xml".to_string(),
        local_m3u_filename: "public/list.m3u".to_string(),
        ..config_for(&dir)
    };

    let summary = Pipeline::new(config).unwrap().run().await.unwrap();

    assert_eq!(summary.epg_path, dir.path().join("public/guide.xml"));
    let playlist = read(&summary.playlist_path);
    assert!(playlist.starts_with(r#"#EXTM3U x-tvg-url="https://tv.example.net/guide.xml""#));
    assert!(read(&summary.epg_path).contains(r#"generator-info-url="https://tv.example.net/""#));
}

#[cfg(feature = "compression-gzip")]
#[tokio::test]
async fn test_gzip_feed_is_decompressed() {
    use flate2::{write::GzEncoder, Compression};
    use std::io::Write;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(br#"<tv><channel id="n2"/><programme channel="n2"/><programme channel="n10"/></tv>"#)
        .unwrap();
    let compressed = encoder.finish().unwrap();

    let base = serve(vec![ok("/epg.xml.gz", compressed)]).await;
    let dir = TempDir::new().unwrap();
    write(dir.path(), "mapping.json", NEWS_MAPPING);
    write_sources(dir.path(), &[("UK", format!("{base}/epg.xml.gz"))]);

    let summary = Pipeline::new(config_for(&dir)).unwrap().run().await.unwrap();

    assert_eq!(summary.programme_count, 2);
    assert!(summary.failed_sources.is_empty());
}
