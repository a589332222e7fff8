use anyhow::{anyhow, Context, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// `<dir>/<name>_<YYYYmmdd_HHMMSS>.log`
pub fn log_file_path(dir: &Path, name: &str) -> PathBuf {
    let ts = chrono::Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("{}_{}.log", name, ts))
}

/// 標準エラーとログファイルの両方に書く。`RUST_LOG` が無ければ info
pub fn init_logging(name: &str, log_dir: &str) -> Result<PathBuf> {
    let dir = Path::new(log_dir);
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log dir {}", dir.display()))?;
    let path = log_file_path(dir, name);
    let file = File::create(&path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::io::stderr.and(Mutex::new(file)))
        .try_init()
        .map_err(|e| anyhow!("Failed to init logging: {}", e))?;

    Ok(path)
}
