use std::{
    env, fs, io,
    net::SocketAddr,
    panic,
    path::{Path, PathBuf},
    str::FromStr,
    thread,
    time::{Duration, SystemTime},
};
use tokio::net::TcpListener;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

const DEFAULT_LOG_DIR: &str = "/var/log/reactor";

/// Keeps the non-blocking file writer alive; drop it only at process exit.
pub struct TracingGuards {
    _file_guard: Option<WorkerGuard>,
}

pub fn init_tracing(service_name: &str) -> TracingGuards {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_root = PathBuf::from(env_or("LOG_DIR", DEFAULT_LOG_DIR.to_string())).join(service_name);
    let stdout_layer = fmt::layer().with_writer(io::stdout);

    let file_sink = open_file_sink(&log_root, service_name);
    let file_guard = match file_sink {
        Some((writer, guard)) => {
            let subscriber = Registry::default()
                .with(filter)
                .with(stdout_layer)
                .with(fmt::layer().with_ansi(false).with_writer(writer));
            let _ = tracing::subscriber::set_global_default(subscriber);
            Some(guard)
        }
        None => {
            let subscriber = Registry::default().with(filter).with(stdout_layer);
            let _ = tracing::subscriber::set_global_default(subscriber);
            None
        }
    };

    if file_guard.is_some() {
        let retention_days = env_or("LOG_RETENTION_DAYS", 14u64);
        let cleanup_interval = env_or("LOG_CLEANUP_INTERVAL_MINUTES", 360u64);
        spawn_log_cleanup(log_root, retention_days, cleanup_interval);
    } else {
        tracing::warn!(dir = %log_root.display(), "file logging unavailable, stdout only");
    }

    TracingGuards {
        _file_guard: file_guard,
    }
}

fn open_file_sink(
    log_root: &Path,
    service_name: &str,
) -> Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    fs::create_dir_all(log_root).ok()?;
    // The rolling appender panics when the directory is not writable.
    let appender = panic::catch_unwind(|| {
        tracing_appender::rolling::daily(log_root, format!("{service_name}.log"))
    })
    .ok()?;
    Some(tracing_appender::non_blocking(appender))
}

/// Typed environment lookup; absent or unparsable values fall back to `default`.
pub fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<T>().ok())
        .unwrap_or(default)
}

/// Like [`env_or`] for strings, but treats an empty value as absent.
pub fn env_non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn spawn_log_cleanup(log_root: PathBuf, retention_days: u64, cleanup_interval_minutes: u64) {
    if retention_days == 0 || cleanup_interval_minutes == 0 {
        return;
    }

    let retention = Duration::from_secs(retention_days * 24 * 60 * 60);
    let interval = Duration::from_secs(cleanup_interval_minutes * 60);

    thread::spawn(move || loop {
        if let Some(cutoff) = SystemTime::now().checked_sub(retention) {
            cleanup_old_logs(&log_root, cutoff);
        }
        thread::sleep(interval);
    });
}

fn cleanup_old_logs(root: &Path, cutoff: SystemTime) {
    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            cleanup_old_logs(&path, cutoff);
            continue;
        }
        let modified = fs::metadata(&path).and_then(|metadata| metadata.modified());
        if matches!(modified, Ok(modified) if modified < cutoff) {
            let _ = fs::remove_file(&path);
        }
    }
}

/// Binds on all interfaces. Failure is left to the caller, which treats it as fatal.
pub async fn bind_listener(port: u16) -> io::Result<TcpListener> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    TcpListener::bind(addr).await
}

pub async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "sigterm handler unavailable");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }

    tracing::info!("shutdown signal received");
}
