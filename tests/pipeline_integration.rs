mod common;

use common::{closed_port, spawn_catalog_server, spawn_ftp_server, spawn_silent_server, FtpBehaviour};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use vavoo_iptv::{
    config::Config,
    errors::{AppError, SourceError},
    sources::{HttpCatalog, StaticCatalog},
    PlaylistPipeline,
};

fn config_for(catalog: SocketAddr, route: &str) -> Config {
    let mut config = Config::default();
    config.catalog.url = format!("http://{catalog}{route}");
    config.catalog.timeout = Duration::from_secs(5);
    config.publish.timeout = Duration::from_secs(5);
    config
}

fn http_pipeline(config: &Config, output: &Path) -> PlaylistPipeline {
    let catalog = HttpCatalog::new(&config.catalog).unwrap();
    PlaylistPipeline::new(Box::new(catalog), config, output.to_path_buf()).unwrap()
}

#[tokio::test]
async fn test_fetch_map_and_write() {
    let catalog = spawn_catalog_server().await;
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("Vavoo-IPTV.m3u8");
    let config = config_for(catalog, "/channels");

    let report = http_pipeline(&config, &output).run().await.unwrap();

    assert_eq!(report.catalog_size, 5);
    assert_eq!(report.catalog_skipped, 1);
    assert_eq!(report.playlist.entries_written, 4);
    assert_eq!(report.playlist.entries_skipped, 0);
    assert_eq!(report.published, None);

    let content = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1 + 4 * 4);
    assert!(lines[0].starts_with("#EXTM3U8 x-url-tvg="));

    // ProSieben block
    assert_eq!(lines[1], "#EXTVLCOPT:http-user-agent=VAVOO/2.6");
    assert_eq!(lines[2], "#EXTVLCOPT:http-referrer=https://vavoo.tv/");
    assert!(lines[3].starts_with("#EXTINF:-1 group-title=\"Germany\" "));
    assert!(lines[3].ends_with("tvg-name=\"ProSieben\", ProSieben"));
    assert_eq!(lines[4], "https://huhu.to/play/123/index.m3u8");

    // BILD TV ignores the (empty) id
    assert!(lines[7].ends_with(", BILD TV"));
    assert_eq!(lines[8], "https://bild.personalstream.tv/v1/master.m3u8");

    // Everything missing
    assert!(lines[11].starts_with("#EXTINF:-1 group-title=\"Unbekannt\" "));
    assert!(lines[11].ends_with(", Unbekannter Kanal"));
    assert_eq!(lines[12], "https://example.com/placeholder.m3u8");

    // Numeric id
    assert!(lines[15].ends_with(", Sky Cinema Action"));
    assert_eq!(lines[16], "https://huhu.to/play/77/index.m3u8");
}

#[tokio::test]
async fn test_non_array_catalog_writes_nothing() {
    let catalog = spawn_catalog_server().await;
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("Vavoo-IPTV.m3u8");
    let config = config_for(catalog, "/object");

    let err = http_pipeline(&config, &output).run().await.unwrap_err();

    assert!(matches!(err, AppError::Source(SourceError::Format { .. })));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_html_catalog_is_format_error() {
    let catalog = spawn_catalog_server().await;
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("Vavoo-IPTV.m3u8");
    let config = config_for(catalog, "/html");

    let err = http_pipeline(&config, &output).run().await.unwrap_err();

    assert!(matches!(err, AppError::Source(SourceError::Format { .. })));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_server_error_keeps_previous_playlist() {
    let catalog = spawn_catalog_server().await;
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("Vavoo-IPTV.m3u8");
    std::fs::write(&output, "previous run\n").unwrap();
    let config = config_for(catalog, "/broken");

    let err = http_pipeline(&config, &output).run().await.unwrap_err();

    match err {
        AppError::Source(source) => {
            assert!(source.is_network());
            assert!(matches!(source, SourceError::Http { status: 500, .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "previous run\n");
}

#[tokio::test]
async fn test_unreachable_catalog_is_network_error() {
    let port = closed_port().await;
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("Vavoo-IPTV.m3u8");
    let config = config_for(SocketAddr::from(([127, 0, 0, 1], port)), "/channels");

    let err = http_pipeline(&config, &output).run().await.unwrap_err();

    assert!(matches!(err, AppError::Source(ref source) if source.is_network()));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_publish_after_write() {
    let (ftp, recording) = spawn_ftp_server(FtpBehaviour::default()).await;
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("Vavoo-IPTV.m3u8");

    let mut config = Config::default();
    config.publish.host = Some(ftp.ip().to_string());
    config.publish.port = ftp.port();
    config.publish.username = Some("anna".to_string());
    config.publish.password = Some("geheim".to_string());
    config.publish.remote_path = "/htdocs".to_string();
    config.publish.timeout = Duration::from_secs(5);

    let catalog = StaticCatalog::new(vec![serde_json::json!({
        "id": "123", "name": "ProSieben HD|E", "country": "Germany"
    })]);
    let pipeline = PlaylistPipeline::new(Box::new(catalog), &config, output.clone()).unwrap();
    assert!(pipeline.publishes());

    let report = pipeline.run().await.unwrap();

    assert_eq!(report.published, Some(true));
    let upload = report.upload.unwrap();
    assert_eq!(upload.remote_file, "Vavoo-IPTV.m3u8");
    assert_eq!(upload.remote_dir, "/htdocs");

    let recording = recording.lock().unwrap();
    let local = std::fs::read(&output).unwrap();
    assert_eq!(recording.uploads, vec![("Vavoo-IPTV.m3u8".to_string(), local)]);
}

#[tokio::test]
async fn test_failed_publish_keeps_playlist() {
    let port = closed_port().await;
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("Vavoo-IPTV.m3u8");

    let mut config = Config::default();
    config.publish.host = Some("127.0.0.1".to_string());
    config.publish.port = port;
    config.publish.username = Some("anna".to_string());
    config.publish.password = Some("geheim".to_string());
    config.publish.timeout = Duration::from_secs(5);

    let catalog = StaticCatalog::new(vec![serde_json::json!({"id": "1", "name": "ZDF"})]);
    let pipeline = PlaylistPipeline::new(Box::new(catalog), &config, output.clone()).unwrap();

    let report = pipeline.run().await.unwrap();

    assert_eq!(report.published, Some(false));
    assert!(report.upload.is_none());
    assert_eq!(report.playlist.entries_written, 1);
    assert!(output.exists());
}

#[tokio::test]
async fn test_silent_catalog_times_out() {
    let server = spawn_silent_server().await;
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("Vavoo-IPTV.m3u8");
    let mut config = config_for(server, "/channels");
    config.catalog.timeout = Duration::from_millis(500);

    let err = http_pipeline(&config, &output).run().await.unwrap_err();

    assert!(matches!(err, AppError::Source(SourceError::Timeout { .. })));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_control_characters_never_reach_the_file() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("Vavoo-IPTV.m3u8");
    let catalog = StaticCatalog::new(vec![
        serde_json::json!({"id": "12\n34", "name": "ZDF", "country": "Germany"}),
        serde_json::json!({"id": "5", "name": "ARD", "country": "Germany\r\nEvil"}),
        serde_json::json!({"id": "6", "name": "Das Erste", "country": "Germany"}),
    ]);
    let pipeline =
        PlaylistPipeline::new(Box::new(catalog), &Config::default(), output.clone()).unwrap();

    let report = pipeline.run().await.unwrap();

    assert_eq!(report.playlist.entries_written, 1);
    assert_eq!(report.playlist.entries_skipped, 2);
    let content = std::fs::read_to_string(&output).unwrap();
    assert_eq!(content.lines().count(), 1 + 4);
    assert!(!content.contains('\r'));
}

#[tokio::test]
async fn test_write_failure_skips_publish() {
    let (ftp, recording) = spawn_ftp_server(FtpBehaviour::default()).await;
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("not-a-directory");
    std::fs::write(&blocker, "x").unwrap();

    let mut config = Config::default();
    config.publish.host = Some(ftp.ip().to_string());
    config.publish.port = ftp.port();
    config.publish.username = Some("anna".to_string());
    config.publish.password = Some("geheim".to_string());
    config.publish.timeout = Duration::from_secs(5);

    let catalog = StaticCatalog::new(vec![serde_json::json!({"id": "1", "name": "ZDF"})]);
    let pipeline = PlaylistPipeline::new(
        Box::new(catalog),
        &config,
        blocker.join("Vavoo-IPTV.m3u8"),
    )
    .unwrap();

    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(err, AppError::Playlist(_)));
    let recording = recording.lock().unwrap();
    assert!(!recording.connected);
    assert!(recording.commands.is_empty());
}
