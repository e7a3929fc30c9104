use crate::config::{LoggingConfig, Section};
use std::{
    collections::HashMap,
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::{filter::Targets, fmt};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};

// -------- level helpers --------
fn parse_tracing_level(s: &str) -> Option<tracing::Level> {
    match s.to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        "off" | "none" => None,
        _ => Some(Level::INFO),
    }
}

fn level_filter(s: &str) -> LevelFilter {
    parse_tracing_level(s)
        .map(LevelFilter::from_level)
        .unwrap_or(LevelFilter::OFF)
}

/// Returns true if target == crate_name or target starts with "crate_name::"
fn matches_crate_prefix(target: &str, crate_name: &str) -> bool {
    target == crate_name
        || target
            .strip_prefix(crate_name)
            .is_some_and(|rest| rest.starts_with("::"))
}

// -------- rotating writer for files --------
#[derive(Clone)]
struct RotWriter(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl Write for RotWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("log writer poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("log writer poisoned"))?
            .flush()
    }
}

// A writer handle that may be None (drops writes)
struct RoutedWriterHandle(Option<RotWriter>);

impl Write for RoutedWriterHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.0 {
            Some(w) => w.write(buf),
            // drop silently; pretend we wrote everything
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.0 {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }
}

/// Route log records to different files by target prefix.
#[derive(Default)]
struct MultiFileRouter {
    default: Option<RotWriter>,
    by_prefix: HashMap<String, RotWriter>,
}

impl MultiFileRouter {
    fn resolve_for(&self, target: &str) -> Option<RotWriter> {
        self.by_prefix
            .iter()
            .filter(|(prefix, _)| matches_crate_prefix(target, prefix))
            // the longest prefix wins so "users_store::domain" beats "users_store"
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, w)| w.clone())
            .or_else(|| self.default.clone())
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_prefix.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for MultiFileRouter {
    type Writer = RoutedWriterHandle;

    fn make_writer(&'a self) -> Self::Writer {
        RoutedWriterHandle(self.default.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        RoutedWriterHandle(self.resolve_for(meta.target()))
    }
}

// -------- path resolution helpers --------

/// Resolve a log file path against `base_dir`.
/// Absolute paths are kept as-is; relative paths are joined with `base_dir`.
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

/// Create a rotating writer for log files, ensuring the parent directory exists.
fn create_rotating_writer_at_path(log_path: &Path, max_bytes: usize) -> std::io::Result<RotWriter> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let rot = FileRotate::new(
        log_path,
        AppendTimestamp::default(FileLimit::Age(chrono::Duration::days(1))),
        ContentLimit::BytesSurpassed(max_bytes),
        Compression::None,
        #[cfg(unix)]
        None, // file permissions (Unix only)
    );

    Ok(RotWriter(Arc::new(Mutex::new(rot))))
}

fn create_file_writer(name: &str, section: &Section, base_dir: &Path) -> Option<RotWriter> {
    if section.file.trim().is_empty() {
        return None;
    }

    let max_bytes = section.max_size_mb.unwrap_or(100) * 1024 * 1024;
    let log_path = resolve_log_path(&section.file, base_dir);

    match create_rotating_writer_at_path(&log_path, max_bytes as usize) {
        Ok(writer) => Some(writer),
        Err(e) => {
            eprintln!(
                "Failed to init log file for '{}': {} ({})",
                name,
                log_path.to_string_lossy(),
                e
            );
            None
        }
    }
}

// -------- filters --------

fn build_console_targets(cfg: &LoggingConfig) -> Targets {
    let default = cfg
        .get("default")
        .map(|s| level_filter(&s.console_level))
        .unwrap_or(LevelFilter::OFF);

    cfg.iter()
        .filter(|(name, _)| name.as_str() != "default")
        .fold(Targets::new().with_default(default), |targets, (name, s)| {
            targets.with_target(name.clone(), level_filter(&s.console_level))
        })
}

fn build_file_targets(cfg: &LoggingConfig, router: &MultiFileRouter) -> Targets {
    let default = match (cfg.get("default"), router.default.is_some()) {
        (Some(s), true) => level_filter(&s.file_level),
        _ => LevelFilter::OFF,
    };

    cfg.iter()
        .filter(|(name, _)| name.as_str() != "default")
        .fold(Targets::new().with_default(default), |targets, (name, s)| {
            let level = if router.by_prefix.contains_key(name) {
                level_filter(&s.file_level)
            } else {
                default
            };
            targets.with_target(name.clone(), level)
        })
}

fn build_file_router(cfg: &LoggingConfig, base_dir: &Path) -> MultiFileRouter {
    let mut router = MultiFileRouter::default();
    for (name, section) in cfg {
        let Some(writer) = create_file_writer(name, section, base_dir) else {
            continue;
        };
        if name == "default" {
            router.default = Some(writer);
        } else {
            router.by_prefix.insert(name.clone(), writer);
        }
    }
    router
}

// -------- public init --------

/// Initialize logging from a configuration.
/// - `cfg`: LoggingConfig containing the logging sections
/// - `base_dir`: base directory used to resolve relative log file paths
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    use tracing_subscriber::{layer::SubscriberExt, prelude::*, Registry};

    // Bridge `log` → `tracing` *before* installing the subscriber
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        init_default_logging();
        return;
    }

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(build_console_targets(cfg));

    let router = build_file_router(cfg, base_dir);
    let file_layer = if router.is_empty() {
        None
    } else {
        let targets = build_file_targets(cfg, &router);
        Some(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(true)
                .with_level(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_writer(router)
                .with_filter(targets),
        )
    };

    let _ = Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

fn init_default_logging() {
    let _ = fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_max_level(Level::WARN)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .try_init();
}

// =================== tests ===================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_logging_config;
    use tempfile::tempdir;

    fn section(console: &str, file: &str, file_level: &str) -> Section {
        Section {
            console_level: console.into(),
            file: file.into(),
            file_level: file_level.into(),
            max_size_mb: Some(1),
        }
    }

    #[test]
    fn test_logging_level_parsing() {
        assert_eq!(parse_tracing_level("trace"), Some(Level::TRACE));
        assert_eq!(parse_tracing_level("DEBUG"), Some(Level::DEBUG));
        assert_eq!(parse_tracing_level("Info"), Some(Level::INFO));
        assert_eq!(parse_tracing_level("warn"), Some(Level::WARN));
        assert_eq!(parse_tracing_level("ERROR"), Some(Level::ERROR));
        assert_eq!(parse_tracing_level("off"), None);
        assert_eq!(parse_tracing_level("none"), None);
        assert_eq!(parse_tracing_level("invalid"), Some(Level::INFO)); // defaults to INFO
        assert_eq!(level_filter("off"), LevelFilter::OFF);
    }

    #[test]
    fn test_matches_crate_prefix() {
        assert!(matches_crate_prefix("users_store", "users_store"));
        assert!(matches_crate_prefix("users_store::domain::cache", "users_store"));
        assert!(!matches_crate_prefix("users_store_ext", "users_store"));
        assert!(!matches_crate_prefix("runtime", "users_store"));
    }

    #[test]
    fn test_file_paths_resolved_against_base_dir() {
        let tmp = tempdir().unwrap();
        let base_dir = tmp.path();

        let resolved = resolve_log_path("logs/test.log", base_dir);
        assert!(resolved.starts_with(base_dir));
        assert!(resolved.ends_with("logs/test.log"));

        let absolute = base_dir.join("abs.log");
        let kept = resolve_log_path(absolute.to_str().unwrap(), Path::new("/elsewhere"));
        assert_eq!(kept, absolute);
    }

    #[test]
    fn test_create_rotating_writer_at_path_creates_parent() {
        let tmp = tempdir().unwrap();
        let p = tmp.path().join("nested/dir/app.log");

        let res = create_rotating_writer_at_path(&p, 128 * 1024);
        assert!(res.is_ok(), "writer should be created");
        assert!(p.parent().unwrap().exists(), "parent dir must be created");
    }

    #[test]
    fn test_router_prefers_longest_prefix_then_default() {
        let tmp = tempdir().unwrap();
        let mut cfg = default_logging_config();
        cfg.insert("default".into(), section("info", "logs/all.log", "debug"));
        cfg.insert("users_store".into(), section("info", "logs/store.log", "debug"));
        cfg.insert(
            "users_store::infra".into(),
            section("info", "logs/http.log", "trace"),
        );

        let router = build_file_router(&cfg, tmp.path());
        assert!(router.default.is_some());
        assert_eq!(router.by_prefix.len(), 2);

        let infra = router.resolve_for("users_store::infra::http").unwrap();
        let expected = &router.by_prefix["users_store::infra"];
        assert!(Arc::ptr_eq(&infra.0, &expected.0));

        let domain = router.resolve_for("users_store::domain").unwrap();
        assert!(Arc::ptr_eq(&domain.0, &router.by_prefix["users_store"].0));

        let other = router.resolve_for("reqwest::connect").unwrap();
        assert!(Arc::ptr_eq(&other.0, &router.default.as_ref().unwrap().0));
    }

    #[test]
    fn test_sections_without_file_are_skipped() {
        let tmp = tempdir().unwrap();
        let cfg = default_logging_config();
        let router = build_file_router(&cfg, tmp.path());
        assert!(router.is_empty());

        let mut handle = RoutedWriterHandle(None);
        assert_eq!(handle.write(b"dropped").unwrap(), 7);
        assert!(handle.flush().is_ok());
    }
}
