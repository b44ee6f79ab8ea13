use std::backtrace::Backtrace;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::panic::PanicHookInfo;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, Once, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

pub const LOG_FILTER_ENV: &str = "GHSCOUT_LOG";
const DEFAULT_LOG_FILTER: &str = "debug";

static OPEN_LOG: Mutex<Option<DiagnosticsLog>> = Mutex::new(None);
static PANIC_HOOK: Once = Once::new();

fn open_log() -> MutexGuard<'static, Option<DiagnosticsLog>> {
    OPEN_LOG.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One `<epoch_ms>.log` file under the diagnostics directory.
struct DiagnosticsLog {
    path: PathBuf,
    file: File,
}

impl DiagnosticsLog {
    fn create(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create diagnostics directory {}", dir.display()))?;

        let started = epoch_millis();
        let path = dir.join(format!("{started}.log"));
        let mut file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&path)
            .with_context(|| format!("failed to create diagnostics log at {}", path.display()))?;

        let argv: Vec<String> = std::env::args().collect();
        let header = format!(
            "ghscout diagnostics start\nversion={}\nstart_epoch_ms={started}\npid={}\nargv={argv:?}\n",
            env!("CARGO_PKG_VERSION"),
            std::process::id(),
        );
        file.write_all(header.as_bytes())
            .and_then(|()| file.flush())
            .with_context(|| format!("failed to write diagnostics header to {}", path.display()))?;

        Ok(Self { path, file })
    }

    fn line(&mut self, text: &str) {
        let _ = writeln!(self.file, "[{}] {text}", epoch_millis());
        let _ = self.file.flush();
    }
}

/// Process-wide diagnostics. When enabled, `tracing` events and panics are
/// appended to `~/.config/ghscout/diagnostics/<epoch_ms>.log`; nothing is
/// ever written to the terminal the browser is drawing on.
pub struct DiagnosticsSession {
    path: Option<PathBuf>,
}

impl DiagnosticsSession {
    pub fn initialize(enabled: bool) -> Result<Self> {
        PANIC_HOOK.call_once(|| std::panic::set_hook(Box::new(report_panic)));

        if !enabled {
            *open_log() = None;
            return Ok(Self { path: None });
        }

        let config_path = ghscout_core::config::resolve_config_path()
            .context("failed to resolve ghscout config path for diagnostics")?;
        let log = DiagnosticsLog::create(&diagnostics_dir(&config_path)?)?;
        let path = log.path.clone();
        *open_log() = Some(log);

        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_env(LOG_FILTER_ENV)
                    .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
            )
            .with_writer(|| LogWriter)
            .with_ansi(false)
            .try_init()
            .map_err(|error| anyhow!("failed to install diagnostics logger: {error}"))?;

        Ok(Self { path: Some(path) })
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    pub fn record<S: AsRef<str>>(&self, entry: S) {
        if let Some(log) = open_log().as_mut() {
            log.line(entry.as_ref());
        }
    }
}

fn diagnostics_dir(config_path: &Path) -> Result<PathBuf> {
    config_path
        .parent()
        .map(|dir| dir.join("diagnostics"))
        .ok_or_else(|| {
            anyhow!(
                "failed to resolve diagnostics directory from config path {}",
                config_path.display()
            )
        })
}

/// `tracing` output sink; drops everything while no log is open.
struct LogWriter;

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match open_log().as_mut() {
            Some(log) => log.file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match open_log().as_mut() {
            Some(log) => log.file.flush(),
            None => Ok(()),
        }
    }
}

fn report_panic(info: &PanicHookInfo<'_>) {
    let message = info
        .payload()
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| info.payload().downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic payload");
    let location = info
        .location()
        .map(|at| format!("{}:{}:{}", at.file(), at.line(), at.column()))
        .unwrap_or_else(|| "unknown".to_string());

    let mut guard = open_log();
    let path = match guard.as_mut() {
        Some(log) => {
            log.line("panic captured");
            log.line(&format!("panic_message={message}"));
            log.line(&format!("panic_location={location}"));
            log.line(&format!("panic_backtrace={:?}", Backtrace::force_capture()));
            Some(log.path.clone())
        }
        None => None,
    };
    drop(guard);

    eprintln!("Fatal internal error in ghscout.");
    match path {
        Some(path) => eprintln!("Diagnostics written to {}", path.display()),
        None => eprintln!("Run `ghscout --diagnostics` to capture a diagnostics log."),
    }
}

fn epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}
