use glossa_core::config::load_from_str;
use glossa_logger::LoggerConfig;
use std::path::Path;
use std::thread;
use std::time::Duration;

#[test]
fn test_logging_section_drives_file_logging() {
    let dir = tempfile::tempdir().unwrap();
    let stale = dir.path().join("engine.log.2020-01-01");
    std::fs::write(&stale, "").unwrap();

    let yaml = format!(
        r#"
supported_locales: [uk, en]
default_locale: uk
logging:
  level: "info,glossa_core=debug"
  console: false
  log_dir: "{}"
  file_prefix: engine.log
  max_files: 1
  cleanup_interval_secs: 1
"#,
        dir.path().display()
    );
    let config = load_from_str(&yaml).unwrap();
    let logger = LoggerConfig::from_engine_config(&config).unwrap();

    let guard = logger.init().unwrap();
    assert!(guard.is_some());
    tracing::warn!(locale = "uk", "catalog warning for the log file");
    drop(guard);

    // the initial cleanup pass runs on a background thread
    thread::sleep(Duration::from_millis(500));
    assert!(!Path::new(&stale).exists());

    let logs: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(logs.len(), 1);
    let content = std::fs::read_to_string(&logs[0]).unwrap();
    assert!(content.contains("catalog warning for the log file"));

    // a second subscriber cannot be installed
    assert!(LoggerConfig::new().enable_file(false).init().is_err());
}

#[test]
fn test_missing_section_uses_defaults() {
    let config = load_from_str("supported_locales: [uk]\ndefault_locale: uk\n").unwrap();
    assert!(LoggerConfig::from_engine_config(&config).is_ok());
}
