use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use super::*;

static TEST_ROOT_COUNTER: AtomicU64 = AtomicU64::new(0);

fn test_root(label: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system time")
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "gamever-core-tests-{label}-{}-{}-{}",
        std::process::id(),
        nanos,
        TEST_ROOT_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    path
}

#[test]
fn validate_version_name_accepts_release_style_names() {
    for name in ["v1", "1.1.0", "First Go Game 0.3", "beta-2 (hotfix)"] {
        validate_version_name(name).expect("name must be accepted");
    }
}

#[test]
fn validate_version_name_rejects_empty_and_separators() {
    for name in ["", "   ", "a/b", "a\\b", ".", ".."] {
        let err = validate_version_name(name).expect_err("name must be rejected");
        assert_eq!(err.kind(), ErrorKind::Validation, "name={name:?}");
    }
}

#[test]
fn releases_url_and_wrapper_prefix_follow_coordinates() {
    let coordinates = RepoCoordinates::new("JonasB2510", "first-go-game");
    assert_eq!(
        coordinates.releases_url("https://api.github.com/"),
        "https://api.github.com/repos/JonasB2510/first-go-game/releases"
    );
    assert_eq!(
        coordinates.archive_wrapper_prefix(),
        "jonasb2510-first-go-game"
    );
}

#[test]
fn release_asset_exposes_sha256_digest_only() {
    let mut asset = ReleaseAsset::new("skin.zip", "https://example.test/skin.zip");
    assert_eq!(asset.sha256(), None);

    asset.digest = Some("sha256:abc123".to_string());
    assert_eq!(asset.sha256(), Some("abc123"));

    asset.digest = Some("md5:abc123".to_string());
    assert_eq!(asset.sha256(), None);
}

#[test]
fn metadata_document_uses_metadata_section() {
    let metadata = VersionMetadata::new("v2");
    let raw = metadata.to_toml_string().expect("must serialize");
    assert!(raw.contains("[metadata]"), "unexpected document: {raw}");
    assert!(raw.contains("version = \"v2\""), "unexpected document: {raw}");

    let parsed = VersionMetadata::from_toml_str(&raw).expect("must parse");
    assert_eq!(parsed, metadata);
}

#[test]
fn metadata_read_reports_missing_file_as_io() {
    let root = test_root("metadata-missing");
    let err = VersionMetadata::read_from(&root.join(METADATA_FILE_NAME))
        .expect_err("missing metadata must fail");
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn config_is_created_lazily_with_default_download_dir() {
    let root = test_root("config-lazy");
    let store = ConfigStore::new(&root);

    let config = store.load().expect("must load config");
    assert_eq!(config.download_dir, root.join("versions"));
    assert_eq!(config.selected_version, "");
    assert!(config.download_dir.is_dir());
    assert!(store.config_path().is_file());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn config_selected_version_round_trips_and_keeps_download_dir() {
    let root = test_root("config-select");
    let store = ConfigStore::new(&root);

    store.set_selected_version("1.1.0").expect("must persist");
    let config = store.load().expect("must load");
    assert_eq!(config.selected_version, "1.1.0");
    assert_eq!(config.download_dir, root.join("versions"));

    let raw = fs::read_to_string(store.config_path()).expect("must read config");
    assert!(raw.contains("[settings]"), "unexpected config: {raw}");
    assert!(raw.contains("version = \"1.1.0\""), "unexpected config: {raw}");

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn replace_selected_version_skips_write_when_selection_moved_on() {
    let root = test_root("config-replace");
    let store = ConfigStore::new(&root);
    store.set_selected_version("0.6").expect("user choice");
    let before = fs::read_to_string(store.config_path()).expect("must read config");

    let replaced = store
        .replace_selected_version("0.5", "9.0")
        .expect("conditional write must not fail");

    assert!(!replaced);
    assert_eq!(store.selected_version().expect("must load"), "0.6");
    assert_eq!(
        fs::read_to_string(store.config_path()).expect("must read config"),
        before
    );

    assert!(store
        .replace_selected_version("0.6", "9.0")
        .expect("conditional write must not fail"));
    assert_eq!(store.selected_version().expect("must load"), "9.0");

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn config_reads_partial_settings_documents() {
    let root = test_root("config-partial");
    fs::create_dir_all(&root).expect("must create root");
    let store = ConfigStore::new(&root);
    fs::write(store.config_path(), "[settings]\nversion = \"v1\"\n").expect("must write");

    let config = store.load().expect("must load");
    assert_eq!(config.selected_version, "v1");
    assert_eq!(config.download_dir, root.join("versions"));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn set_download_dir_creates_directory_before_persisting() {
    let root = test_root("config-download-dir");
    let store = ConfigStore::new(root.join("config"));
    let custom = root.join("custom").join("versions");

    let stored = store.set_download_dir(&custom).expect("must persist");
    assert!(custom.is_dir());
    assert_eq!(stored, fs::canonicalize(&custom).expect("must canonicalize"));
    assert_eq!(store.download_dir().expect("must load"), stored);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn ensure_download_dir_resets_missing_directory() {
    let root = test_root("config-ensure");
    let store = ConfigStore::new(root.join("config"));
    let custom = root.join("custom");
    store.set_download_dir(&custom).expect("must persist");
    fs::remove_dir_all(&custom).expect("must remove custom dir");

    let status = store.ensure_download_dir().expect("must recover");
    match status {
        DownloadDirStatus::Reset { reset_to, .. } => {
            assert_eq!(reset_to, store.default_download_dir());
            assert!(reset_to.is_dir());
        }
        other => panic!("expected reset, got {other:?}"),
    }
    assert_eq!(
        store.download_dir().expect("must load"),
        store.default_download_dir()
    );

    let status = store.ensure_download_dir().expect("must stay present");
    assert_eq!(
        status,
        DownloadDirStatus::Present(store.default_download_dir())
    );

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn corrupt_config_surfaces_decode_error() {
    let root = test_root("config-corrupt");
    fs::create_dir_all(&root).expect("must create root");
    let store = ConfigStore::new(&root);
    fs::write(store.config_path(), "settings = [").expect("must write");

    let err = store.load().expect_err("corrupt config must fail");
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err.to_string().contains("failed to decode config"));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn launch_descriptor_is_optional() {
    let root = test_root("descriptor-absent");
    fs::create_dir_all(&root).expect("must create root");

    let path = root.join(DESCRIPTOR_FILE_NAME);

    assert_eq!(
        LaunchDescriptor::load_optional(&path).expect("absence is not an error"),
        None
    );
    let effective = LaunchDescriptor::load_or_builtin(&path).expect("must fall back");
    assert_eq!(effective, LaunchDescriptor::builtin());
    assert_eq!(effective.default_mode_name(), Some("host"));
    assert_eq!(effective.mode_names(), vec!["host", "join"]);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn launch_descriptor_parses_modes_and_argument_defaults() {
    let content = r#"
default_mode = "join"

[modes.host]
label = "Host"

[[modes.host.args]]
name = "port"
default = "9000"
label = "Port"

[modes.join]

[[modes.join.args]]
name = "address"
"#;

    let descriptor = LaunchDescriptor::from_toml_str(content).expect("must parse");
    assert_eq!(descriptor.default_mode_name(), Some("join"));

    let host = descriptor.mode("host").expect("host mode");
    let port = host.primary_argument().expect("port argument");
    assert_eq!(port.default, "9000");
    assert_eq!(port.display_label(), "Port");

    let join = descriptor.mode("join").expect("join mode");
    let address = join.primary_argument().expect("address argument");
    assert_eq!(address.default, "");
    assert_eq!(address.display_label(), "address");
}

#[test]
fn launch_descriptor_rejects_unknown_default_mode() {
    let content = "default_mode = \"spectate\"\n\n[modes.host]\n";
    let err = LaunchDescriptor::from_toml_str(content).expect_err("must reject");
    assert!(err.contains("spectate"), "unexpected error: {err}");

    let err = LaunchDescriptor::from_toml_str("").expect_err("empty descriptor must fail");
    assert!(err.contains("at least one mode"), "unexpected error: {err}");
}

#[test]
fn verify_sha256_file_detects_mismatch() {
    let root = test_root("digest");
    fs::create_dir_all(&root).expect("must create root");
    let path = root.join("payload.bin");
    fs::write(&path, b"payload").expect("must write payload");

    let expected = "239f59ed55e737c77147cf55ad0c1b030b6d7ee748a7426952f9b852d5a935e5";
    assert_eq!(sha256_file_hex(&path).expect("must hash"), expected);
    verify_sha256_file(&path, expected).expect("digest must match");
    verify_sha256_file(&path, &expected.to_ascii_uppercase()).expect("case-insensitive match");

    let other = "d9298a10d1b0735837dc4bd85dac641b0f3cef27a47e5d53a54f2f3f5b2fcffa";
    let err = verify_sha256_file(&path, other).expect_err("must mismatch");
    assert!(matches!(err, GameverError::Integrity { .. }));
    assert_eq!(err.kind(), ErrorKind::Network);

    let _ = fs::remove_dir_all(&root);
}
