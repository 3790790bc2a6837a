use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use gamever_core::{ErrorKind, GameverError, RepoCoordinates};

use super::*;

static TEST_ROOT_COUNTER: AtomicU64 = AtomicU64::new(0);

const CATALOG_FIXTURE: &str = r#"[
  {
    "name": "v2",
    "tag_name": "v2.0.0",
    "zipball_url": "https://api.github.com/repos/jonasb2510/first-go-game/zipball/v2.0.0",
    "assets": [
      {
        "name": "skin.zip",
        "browser_download_url": "https://github.com/jonasb2510/first-go-game/releases/download/v2.0.0/skin.zip",
        "size": 42,
        "digest": "sha256:abc"
      }
    ]
  },
  {
    "name": null,
    "tag_name": "v1.0.0",
    "zipball_url": "https://api.github.com/repos/jonasb2510/first-go-game/zipball/v1.0.0",
    "assets": []
  },
  {
    "name": "   ",
    "tag_name": "v0.9.0",
    "zipball_url": null
  }
]"#;

fn test_root(label: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system time")
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "gamever-remote-tests-{label}-{}-{}-{}",
        std::process::id(),
        nanos,
        TEST_ROOT_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    fs::create_dir_all(&path).expect("must create test root");
    path
}

fn start_one_shot_http_server(
    status_line: &'static str,
    payload: Vec<u8>,
    with_content_length: bool,
) -> (String, std::thread::JoinHandle<String>) {
    let listener =
        std::net::TcpListener::bind("127.0.0.1:0").expect("must bind one-shot test server");
    let address = listener
        .local_addr()
        .expect("must read one-shot test server address");
    let base = format!("http://{address}");
    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("must accept test client");
        let mut request_buffer = [0_u8; 2048];
        let read = std::io::Read::read(&mut stream, &mut request_buffer).unwrap_or(0);
        let request = String::from_utf8_lossy(&request_buffer[..read]).to_string();

        let headers = if with_content_length {
            format!(
                "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                payload.len()
            )
        } else {
            format!("HTTP/1.1 {status_line}\r\nConnection: close\r\n\r\n")
        };
        std::io::Write::write_all(&mut stream, headers.as_bytes())
            .expect("must write test response headers");
        std::io::Write::write_all(&mut stream, &payload)
            .expect("must write test response payload");
        std::io::Write::flush(&mut stream).expect("must flush test response payload");
        request
    });

    (base, handle)
}

#[test]
fn parse_releases_keeps_order_and_falls_back_to_tag_name() {
    let releases = parse_releases(CATALOG_FIXTURE, "fixture").expect("must parse");

    assert_eq!(releases.len(), 2, "release without zipball must be skipped");
    assert_eq!(releases[0].display_name, "v2");
    assert_eq!(releases[0].assets.len(), 1);
    assert_eq!(releases[0].assets[0].name, "skin.zip");
    assert_eq!(releases[0].assets[0].size, Some(42));
    assert_eq!(releases[0].assets[0].sha256(), Some("abc"));
    assert_eq!(releases[1].display_name, "v1.0.0");
    assert!(releases[1].assets.is_empty());
}

#[test]
fn parse_releases_reports_decode_failure_as_network_kind() {
    let err = parse_releases("{\"message\": \"Not Found\"}", "fixture")
        .expect_err("object payload must fail");
    assert!(matches!(err, GameverError::Decode { .. }));
    assert_eq!(err.kind(), ErrorKind::Network);
}

#[test]
fn list_releases_requests_repository_endpoint() {
    let (base, server) =
        start_one_shot_http_server("200 OK", CATALOG_FIXTURE.as_bytes().to_vec(), true);
    let client = build_client().expect("must build client");
    let catalog = ReleaseCatalog::with_api_root(
        client,
        &RepoCoordinates::new("jonasb2510", "first-go-game"),
        &base,
    );

    let releases = catalog.list_releases().expect("must list releases");
    let request = server.join().expect("server thread must join");

    assert!(
        request.starts_with("GET /repos/jonasb2510/first-go-game/releases "),
        "unexpected request: {request}"
    );
    assert!(request.to_ascii_lowercase().contains("user-agent: gamever/"));
    assert!(request.contains("application/vnd.github+json"));
    assert_eq!(
        releases
            .iter()
            .map(|release| release.display_name.as_str())
            .collect::<Vec<_>>(),
        vec!["v2", "v1.0.0"]
    );
}

#[test]
fn list_releases_surfaces_non_success_status() {
    let (base, server) = start_one_shot_http_server("403 Forbidden", b"{}".to_vec(), true);
    let catalog = ReleaseCatalog::with_api_root(
        build_client().expect("must build client"),
        &RepoCoordinates::default(),
        &base,
    );

    let err = catalog.list_releases().expect_err("403 must fail");
    server.join().expect("server thread must join");

    match &err {
        GameverError::Http { status, .. } => assert_eq!(*status, 403),
        other => panic!("expected http error, got {other:?}"),
    }
    assert!(err.to_string().contains("fetch releases failed"));
}

#[test]
fn list_releases_surfaces_connection_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("must bind");
    let address = listener.local_addr().expect("must read address");
    drop(listener);

    let catalog = ReleaseCatalog::with_api_root(
        build_client().expect("must build client"),
        &RepoCoordinates::default(),
        &format!("http://{address}"),
    );
    let err = catalog.list_releases().expect_err("closed port must fail");
    assert_eq!(err.kind(), ErrorKind::Network);
}

#[test]
fn download_to_path_reports_progress_with_known_total() {
    let root = test_root("download-known");
    let payload = b"gamever-progress-known-total".to_vec();
    let (base, server) = start_one_shot_http_server("200 OK", payload.clone(), true);
    let destination = root.join("artifact.bin");
    let mut observed = Vec::new();

    let downloaded = download_to_path(
        &build_client().expect("must build client"),
        &format!("{base}/artifact.bin"),
        &destination,
        |downloaded, total| observed.push((downloaded, total)),
    )
    .expect("download must succeed");
    server.join().expect("server thread must join");

    assert_eq!(downloaded, payload.len() as u64);
    assert_eq!(fs::read(&destination).expect("must read download"), payload);
    assert!(!root.join("artifact.bin.part").exists());
    let last = observed.last().expect("must have progress events");
    assert_eq!(last.0, payload.len() as u64);
    assert_eq!(last.1, Some(payload.len() as u64));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn download_to_path_streams_without_content_length() {
    let root = test_root("download-unknown");
    let payload = vec![7_u8; 20_000];
    let (base, server) = start_one_shot_http_server("200 OK", payload.clone(), false);
    let destination = root.join("artifact.bin");
    let mut observed = Vec::new();

    download_to_path(
        &build_client().expect("must build client"),
        &format!("{base}/artifact.bin"),
        &destination,
        |downloaded, total| observed.push((downloaded, total)),
    )
    .expect("download must succeed");
    server.join().expect("server thread must join");

    assert_eq!(fs::read(&destination).expect("must read download"), payload);
    assert!(observed.len() > 2, "chunked progress expected");
    assert_eq!(observed.last().expect("progress").1, None);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn download_to_path_leaves_no_file_on_http_error() {
    let root = test_root("download-404");
    let (base, server) = start_one_shot_http_server("404 Not Found", Vec::new(), true);
    let destination = root.join("artifact.bin");

    let err = download_to_path(
        &build_client().expect("must build client"),
        &format!("{base}/artifact.bin"),
        &destination,
        |_downloaded, _total| {},
    )
    .expect_err("404 must fail");
    server.join().expect("server thread must join");

    assert!(matches!(err, GameverError::Http { status: 404, .. }));
    assert!(!destination.exists());
    assert!(!root.join("artifact.bin.part").exists());

    let _ = fs::remove_dir_all(&root);
}
