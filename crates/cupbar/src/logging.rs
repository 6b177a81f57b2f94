use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_NAME: &str = "cupbar.log";
const ENV_LOG_LEVEL: &str = "CUPBAR_LOG_LEVEL";
const ENV_LOG_STDOUT: &str = "CUPBAR_LOG_STDOUT";

pub struct LogOptions {
    pub debug: bool,
    pub log_dir: PathBuf,
    /// Allows `CUPBAR_LOG_STDOUT` to mirror events to stderr. Never set while
    /// the terminal UI owns the screen.
    pub allow_stderr: bool,
}

/// Keeps the log file open for the lifetime of the process.
pub struct LogGuard {
    file: Option<Arc<Mutex<File>>>,
}

impl LogGuard {
    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }
}

struct MultiWriter {
    stderr: Option<io::Stderr>,
    file: Option<Arc<Mutex<File>>>,
}

impl Write for MultiWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(stderr) = &mut self.stderr {
            let _ = stderr.write_all(buf);
        }
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.write_all(buf);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(stderr) = &mut self.stderr {
            let _ = stderr.flush();
        }
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
        Ok(())
    }
}

pub fn init_logging(options: &LogOptions) -> Option<LogGuard> {
    let level = if options.debug {
        "debug".to_string()
    } else if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
        level
    } else {
        "info".to_string()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let guard = match open_log_file(&options.log_dir) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("log_file_error: {err}");
            LogGuard { file: None }
        }
    };
    let file = guard.file.clone();
    let mirror = options.allow_stderr && env_true(ENV_LOG_STDOUT);
    let make_writer = BoxMakeWriter::new(move || MultiWriter {
        stderr: mirror.then(io::stderr),
        file: file.clone(),
    });
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(make_writer)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return None;
    }
    Some(guard)
}

fn open_log_file(log_dir: &Path) -> io::Result<LogGuard> {
    if log_dir.as_os_str().is_empty() {
        return Ok(LogGuard { file: None });
    }
    std::fs::create_dir_all(log_dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(LOG_FILE_NAME))?;
    Ok(LogGuard {
        file: Some(Arc::new(Mutex::new(file))),
    })
}

fn env_true(key: &str) -> bool {
    match std::env::var(key) {
        Ok(value) => matches!(
            value.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_is_created_under_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("state").join("cupbar");
        let guard = open_log_file(&nested).unwrap();
        assert!(guard.has_file());
        assert!(nested.join(LOG_FILE_NAME).exists());
    }

    #[test]
    fn empty_directory_disables_file_logging() {
        let guard = open_log_file(Path::new("")).unwrap();
        assert!(!guard.has_file());
    }

    #[test]
    fn writer_appends_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let guard = open_log_file(dir.path()).unwrap();
        let mut writer = MultiWriter {
            stderr: None,
            file: guard.file.clone(),
        };
        writer.write_all(b"event=one\n").unwrap();
        writer.write_all(b"event=two\n").unwrap();
        writer.flush().unwrap();
        let contents = std::fs::read_to_string(dir.path().join(LOG_FILE_NAME)).unwrap();
        assert_eq!(contents, "event=one\nevent=two\n");
    }
}
