use dashflow::{initialize, Config, DashflowError, ScreenKind};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn toml_file_overrides_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
debounce_quiet_ms = 250
default_page_size = 25
trace_level = "debug"
data_dir = "/var/lib/dashflow"
"#
    )
    .unwrap();

    let config = Config::from_toml_file(file.path()).unwrap();
    assert_eq!(config.debounce_quiet(), Duration::from_millis(250));
    assert_eq!(config.default_page_size, 25);
    assert_eq!(config.export_poll_interval(), Duration::from_millis(3000));
    assert_eq!(config.trace_level.as_deref(), Some("debug"));
    assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/dashflow")));

    let state = initialize(&config, ScreenKind::GeoConfig).unwrap();
    assert_eq!(state.pagination().page_size, 25);
}

#[test]
fn empty_toml_is_the_default_config() {
    assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
}

#[test]
fn unknown_keys_and_zero_page_size_are_rejected() {
    assert!(matches!(Config::from_toml_str("page_size = 5"), Err(DashflowError::Config(_))));
    assert!(matches!(
        Config::from_toml_str("default_page_size = 0"),
        Err(DashflowError::Config(_))
    ));
    assert!(matches!(
        Config::from_toml_str("debounce_quiet_ms = \"fast\""),
        Err(DashflowError::Config(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::from_toml_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, DashflowError::Io(_)));
}

#[test]
fn string_map_is_parsed_leniently() {
    let map: BTreeMap<String, String> = [
        ("default_page_size", "0"),
        ("export_poll_interval_ms", "1500"),
        ("trace_level", "  "),
        ("data_dir", "~/dash"),
        ("theme", "ignored"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let config = Config::from_map(&map);
    assert_eq!(config.default_page_size, 10);
    assert_eq!(config.export_poll_interval(), Duration::from_millis(1500));
    assert_eq!(config.trace_level, None);
    assert_eq!(config.data_dir, Some(PathBuf::from("~/dash")));
}

#[test]
fn zero_page_size_cannot_build_a_screen() {
    let config = Config {
        default_page_size: 0,
        ..Config::default()
    };
    assert!(matches!(
        initialize(&config, ScreenKind::Reports),
        Err(DashflowError::InvalidPageSize(0))
    ));
}
